use {
    anyhow::Result,
    clap::Parser,
    encblock::{
        cli::{Cli, Command, default_config_path},
        config::Config,
        print_new_salt, run, setup_logger,
    },
};

fn main() -> Result<()> {
    let cli = Cli::parse();
    if cli.command == Command::GenerateSalt {
        print_new_salt();
        return Ok(());
    }

    let config_path = if let Some(path) = &cli.config {
        path.clone()
    } else {
        default_config_path()?
    };
    let config = Config::load(&config_path)?;
    setup_logger(config.log_file.as_deref(), &config.log_filter)?;
    run(cli, config)
}

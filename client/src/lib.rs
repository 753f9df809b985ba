pub mod cli;
pub mod config;

use {
    anyhow::{Result, bail},
    cli::Command,
    config::{BackendConfig, Config},
    encblock_protocol::{
        Cid,
        credentials::{Password, Salt},
    },
    encblock_sdk::{
        Blockstore, EncBlockstore, Error,
        backend::{FsBlockstore, SledBlockstore},
        content,
    },
    fs_err::{File, OpenOptions},
    std::{
        io::{self, BufReader, BufWriter, Write},
        path::Path,
        sync::Mutex,
    },
    tracing::{info, warn},
    tracing_subscriber::{EnvFilter, fmt, prelude::*},
};

type Store = EncBlockstore<Box<dyn Blockstore>>;

#[cfg(feature = "keyring")]
fn fetch_keyring_password() -> Result<Password> {
    const KEYRING_SERVICE: &str = "encblock";
    const KEYRING_USER: &str = "encblock_password";

    let entry = keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER)?;
    match entry.get_password() {
        Ok(password) => Ok(Password::new(password)?),
        Err(keyring::Error::NoEntry) => {
            info!("password not found in keyring");
            let password = prompt_password()?;
            let text = zeroize::Zeroizing::new(String::from_utf8(password.as_bytes().to_vec())?);
            match entry.set_password(&text) {
                Ok(()) => info!("password saved to keyring"),
                Err(err) => warn!("failed to save password in keyring: {err}"),
            }
            Ok(password)
        }
        Err(err) => Err(err.into()),
    }
}

#[cfg(not(feature = "keyring"))]
fn fetch_keyring_password() -> Result<Password> {
    bail!("`use_keyring` is set, but encblock was built without keyring support")
}

fn prompt_password() -> Result<Password> {
    let value = rpassword::prompt_password("Input password: ")?;
    if value.is_empty() {
        bail!("no value provided");
    }
    Ok(Password::new(value)?)
}

fn password(config: &Config) -> Result<Password> {
    if config.use_keyring && config.password.is_some() {
        bail!(
            "invalid config: if `use_keyring` is true, \
            `password` cannot be specified in the config"
        );
    }
    if config.use_keyring {
        fetch_keyring_password()
    } else if let Some(password) = &config.password {
        Ok(password.clone())
    } else {
        prompt_password()
    }
}

fn open_backend(config: &BackendConfig) -> Result<Box<dyn Blockstore>> {
    Ok(match config {
        BackendConfig::Fs { path } => {
            fs_err::create_dir_all(path)?;
            Box::new(FsBlockstore::new(path.clone())?)
        }
        BackendConfig::Sled { path } => Box::new(SledBlockstore::open(path)?),
    })
}

/// Prints a new random salt for the config file.
#[inline]
pub fn print_new_salt() {
    #[expect(clippy::print_stdout, reason = "command output")]
    {
        println!("{}", Salt::generate().display_base64());
    }
}

#[inline]
pub fn run(cli: cli::Cli, config: Config) -> Result<()> {
    if cli.command == Command::GenerateSalt {
        print_new_salt();
        return Ok(());
    }

    let password = password(&config)?;
    let mut store = EncBlockstore::new(open_backend(&config.backend)?);
    store.init(&password, &config.salt)?;
    drop(password);
    store.open()?;

    let result = handle_command(cli.command, &store, &config);
    if let Err(err) = &result
        && let Some(Error::Authentication(cid)) = err.downcast_ref::<Error>()
    {
        warn!(
            %cid,
            "block cannot be decrypted: the password or salt is wrong, \
            or the stored data was damaged"
        );
    }
    store.inner().flush()?;
    store.close()?;
    result
}

fn handle_command(command: Command, store: &Store, config: &Config) -> Result<()> {
    match command {
        Command::Add { local_path } => {
            let file = BufReader::new(File::open(&local_path)?);
            let cid = content::add_reader(store, file, config.chunk_size()?)?;
            info!(%cid, path = %local_path.display(), "added file");
            #[expect(clippy::print_stdout, reason = "command output")]
            {
                println!("{cid}");
            }
        }
        Command::Cat { cid, output } => {
            if let Some(output) = output {
                write_file(store, &cid, &output)?;
            } else {
                let mut stdout = io::stdout().lock();
                content::cat(store, &cid, &mut stdout)?;
                stdout.flush()?;
            }
        }
        Command::Has { cid } => {
            let found = store.has(&cid)?;
            #[expect(clippy::print_stdout, reason = "command output")]
            {
                println!("{found}");
            }
        }
        Command::Rm { cid } => {
            store.delete(&cid)?;
            info!(%cid, "removed block");
        }
        Command::Verify { cid } => {
            let size = content::cat(store, &cid, io::sink())?;
            info!(%cid, size, "all blocks are intact");
        }
        Command::GenerateSalt => bail!("generate-salt does not use the store"),
    }
    Ok(())
}

fn write_file(store: &Store, cid: &Cid, path: &Path) -> Result<()> {
    let mut output = BufWriter::new(File::create(path)?);
    let size = content::cat(store, cid, &mut output)?;
    output.flush()?;
    info!(%cid, size, path = %path.display(), "wrote file");
    Ok(())
}

fn log_writer(log_file: Option<&Path>) -> Result<Box<dyn Write + Send>> {
    Ok(if let Some(path) = log_file {
        Box::new(OpenOptions::new().create(true).append(true).open(path)?)
    } else {
        // Stdout is reserved for command output.
        Box::new(io::stderr())
    })
}

#[inline]
pub fn setup_logger(log_file: Option<&Path>, log_filter: &str) -> Result<()> {
    let fmt_layer = fmt::layer()
        .with_ansi(log_file.is_none())
        .with_writer(Mutex::new(log_writer(log_file)?));
    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(EnvFilter::try_new(log_filter)?)
        .init();
    Ok(())
}

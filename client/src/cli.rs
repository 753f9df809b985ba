use {
    anyhow::{Result, anyhow},
    clap::{Parser, Subcommand},
    encblock_protocol::Cid,
    std::path::PathBuf,
};

/// Stores files in an encrypted content-addressed block store.
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Cli {
    /// Path to the config file. Defaults to `encblock.json5` in the user config directory.
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum Command {
    /// Print a new random salt for the config file.
    GenerateSalt,
    /// Store a file and print its identifier.
    Add { local_path: PathBuf },
    /// Write the content of a stored file to stdout or to a file.
    Cat {
        cid: Cid,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Check whether a block is present. Does not need a correct password.
    Has { cid: Cid },
    /// Remove a single block.
    Rm { cid: Cid },
    /// Read and authenticate every block of a file without writing it anywhere.
    Verify { cid: Cid },
}

#[inline]
pub fn default_config_path() -> Result<PathBuf> {
    let dir = dirs::config_dir().ok_or_else(|| anyhow!("cannot find config dir"))?;
    Ok(dir.join("encblock.json5"))
}

use {
    anyhow::{Context as _, Result},
    byte_unit::Byte,
    encblock_protocol::credentials::{Password, Salt},
    encblock_sdk::content::DEFAULT_CHUNK_SIZE,
    serde::Deserialize,
    std::path::{Path, PathBuf},
};

/// Where encrypted blocks are kept.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackendConfig {
    /// One file per block under `path`.
    Fs { path: PathBuf },
    /// A sled database at `path`.
    Sled { path: PathBuf },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub backend: BackendConfig,
    pub salt: Salt,
    #[serde(default)]
    pub password: Option<Password>,
    #[serde(default)]
    pub use_keyring: bool,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: Byte,
    #[serde(default)]
    pub log_file: Option<PathBuf>,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_chunk_size() -> Byte {
    Byte::from_u64(DEFAULT_CHUNK_SIZE as u64)
}

fn default_log_filter() -> String {
    "info".into()
}

impl Config {
    #[inline]
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs_err::read_to_string(path)?;
        json5::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
    }

    #[inline]
    pub fn chunk_size(&self) -> Result<usize> {
        Ok(usize::try_from(self.chunk_size.as_u64())?)
    }
}

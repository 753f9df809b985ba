use {
    anyhow::{Context as _, Result, ensure},
    serde::{Serialize, de::DeserializeOwned},
};

fn config() -> bincode::config::Configuration {
    bincode::config::standard()
}

#[inline]
pub fn serialize<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    bincode::serde::encode_to_vec(value, config()).context("failed to encode value")
}

/// Decodes a value, rejecting any bytes left over after it.
#[inline]
pub fn deserialize<T: DeserializeOwned>(data: &[u8]) -> Result<T> {
    let (value, len) =
        bincode::serde::decode_from_slice(data, config()).context("failed to decode value")?;
    ensure!(
        len == data.len(),
        "trailing data found: {} bytes",
        data.len().saturating_sub(len),
    );
    Ok(value)
}

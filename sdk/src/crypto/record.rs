//! Binary layout of an encrypted block as persisted in the underlying store.

use byteorder::{ByteOrder, LE};

/// Record format marker ("enb1").
pub const MAGIC_NUMBER: u32 = 0x3162_6e65;
pub const MAGIC_LEN: usize = 4;
pub const NONCE_LEN: usize = 24;
pub const TAG_LEN: usize = 16;

/// Bytes added to the plaintext length by encryption.
pub const OVERHEAD: usize = MAGIC_LEN + NONCE_LEN + TAG_LEN;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    #[error("record is too short: got {0} bytes, expected at least {OVERHEAD}")]
    TooShort(usize),
    #[error("magic number mismatch: {0:#010x}")]
    BadMagic(u32),
}

/// Parsed view of a stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordRef<'a> {
    pub nonce: &'a [u8; NONCE_LEN],
    /// Ciphertext followed by the authentication tag.
    pub sealed: &'a [u8],
}

#[must_use]
#[inline]
pub fn encode(nonce: &[u8; NONCE_LEN], sealed: &[u8]) -> Vec<u8> {
    let mut magic = [0u8; MAGIC_LEN];
    LE::write_u32(&mut magic, MAGIC_NUMBER);
    let mut output = Vec::with_capacity(MAGIC_LEN + NONCE_LEN + sealed.len());
    output.extend_from_slice(&magic);
    output.extend_from_slice(nonce);
    output.extend_from_slice(sealed);
    output
}

#[inline]
pub fn decode(data: &[u8]) -> Result<RecordRef<'_>, RecordError> {
    if data.len() < OVERHEAD {
        return Err(RecordError::TooShort(data.len()));
    }
    let too_short = RecordError::TooShort(data.len());
    let (magic, rest) = data.split_first_chunk::<MAGIC_LEN>().ok_or(too_short)?;
    let magic = LE::read_u32(magic);
    if magic != MAGIC_NUMBER {
        return Err(RecordError::BadMagic(magic));
    }
    let (nonce, sealed) = rest.split_first_chunk::<NONCE_LEN>().ok_or(too_short)?;
    Ok(RecordRef { nonce, sealed })
}

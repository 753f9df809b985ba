use {
    crate::crypto::{
        kdf::KeyMaterial,
        record::{self, NONCE_LEN, RecordError},
    },
    chacha20poly1305::{
        Key, XChaCha20Poly1305, XNonce,
        aead::{Aead, AeadCore, KeyInit, OsRng, Payload},
    },
    encblock_protocol::Cid,
    zeroize::ZeroizeOnDrop,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum OpenError {
    #[error("malformed record: {0}")]
    Malformed(#[from] RecordError),
    #[error("authentication tag mismatch")]
    TagMismatch,
}

/// Encrypts and decrypts block payloads into stored records.
///
/// Holds its own copy of the key, which is wiped when the cipher is dropped.
pub struct Cipher {
    inner: XChaCha20Poly1305,
}

// `XChaCha20Poly1305` zeroizes its key in `Drop`.
impl ZeroizeOnDrop for Cipher {}

impl Cipher {
    #[must_use]
    #[inline]
    pub fn new(key: &KeyMaterial) -> Self {
        Self {
            inner: XChaCha20Poly1305::new(Key::from_slice(key.as_bytes())),
        }
    }

    /// Encrypts `plaintext` under a fresh random nonce and returns the encoded record.
    #[inline]
    pub fn seal(&self, cid: &Cid, plaintext: &[u8]) -> Result<Vec<u8>, chacha20poly1305::Error> {
        let nonce = XChaCha20Poly1305::generate_nonce(&mut OsRng);
        let aad = cid.to_bytes();
        let sealed = self.inner.encrypt(
            &nonce,
            Payload {
                msg: plaintext,
                aad: &aad,
            },
        )?;
        let nonce: &[u8; NONCE_LEN] = nonce.as_ref();
        Ok(record::encode(nonce, &sealed))
    }

    /// Decodes and decrypts a record produced by [`Cipher::seal`] for the same `cid`.
    #[inline]
    pub fn open(&self, cid: &Cid, data: &[u8]) -> Result<Vec<u8>, OpenError> {
        let record = record::decode(data)?;
        let aad = cid.to_bytes();
        self.inner
            .decrypt(
                XNonce::from_slice(record.nonce),
                Payload {
                    msg: record.sealed,
                    aad: &aad,
                },
            )
            .map_err(|chacha20poly1305::Error| OpenError::TagMismatch)
    }
}

//! Block payloads are encrypted with XChaCha20-Poly1305.
//!
//! The 256-bit key is derived from a password and a salt with Argon2id using a fixed,
//! versioned parameter set ([`kdf::KDF_V1`]), so the same password and salt produce the
//! same key on every run.
//!
//! Every block is encrypted with a fresh random 192-bit nonce taken from the OS RNG.
//! With nonces of this size, random generation is safe for any realistic number of blocks.
//! The content identifier of the block is passed as associated data, so a record cannot be
//! moved to another identifier without failing authentication.
//!
//! Each encrypted block is stored as a single record:
//!
//! - magic number (32 bits, little endian) - record format marker
//! - nonce (192 bits)
//! - ciphertext (same length as the plaintext)
//! - authentication tag (128 bits)
//!
//! Identifiers, existence of blocks and their sizes are not hidden.

mod cipher;
pub mod kdf;
pub mod record;

pub use cipher::Cipher;
pub use kdf::KeyMaterial;

//! Encrypted-at-rest block storage for content-addressed data.
//!
//! [`EncBlockstore`] wraps any [`Blockstore`] and encrypts block payloads with a key
//! derived from a password, leaving content identifiers untouched.

pub mod backend;
pub mod content;
pub mod crypto;
mod error;
mod store;

pub use {
    backend::Blockstore,
    error::{Error, Result, StoreState},
    store::EncBlockstore,
};

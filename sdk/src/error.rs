use {
    derive_more::Display,
    encblock_protocol::{Cid, credentials::WeakSecretError},
};

/// Lifecycle state of an [`EncBlockstore`](crate::EncBlockstore).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum StoreState {
    #[display("uninitialized")]
    Uninitialized,
    #[display("initialized")]
    Initialized,
    #[display("open")]
    Open,
    #[display("closed")]
    Closed,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    WeakSecret(#[from] WeakSecretError),
    #[error("cannot {operation}: store is {state}{}", hint(.operation, .state))]
    InvalidState {
        operation: &'static str,
        state: StoreState,
    },
    #[error("block not found: {0}")]
    NotFound(Cid),
    /// The record exists but is corrupted, was tampered with, or was written
    /// with a different key. Must be treated as data loss.
    #[error("failed to authenticate block {0}")]
    Authentication(Cid),
    #[error("failed to encrypt block {0}")]
    Encryption(Cid),
    #[error("underlying block store failed")]
    Store(#[source] anyhow::Error),
}

fn hint(operation: &str, state: &StoreState) -> &'static str {
    if operation == "open" && *state == StoreState::Uninitialized {
        " (must init before open)"
    } else {
        ""
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

use {
    crate::{
        backend::Blockstore,
        crypto::{Cipher, KeyMaterial, kdf},
        error::{Error, Result, StoreState},
    },
    encblock_protocol::{
        Cid,
        credentials::{Password, Salt},
    },
    std::{fmt, mem},
    tracing::{debug, info, warn},
};

enum Lifecycle {
    Uninitialized,
    Initialized(KeyMaterial),
    Open { key: KeyMaterial, cipher: Cipher },
    Closed(KeyMaterial),
}

impl Lifecycle {
    fn state(&self) -> StoreState {
        match self {
            Self::Uninitialized => StoreState::Uninitialized,
            Self::Initialized(_) => StoreState::Initialized,
            Self::Open { .. } => StoreState::Open,
            Self::Closed(_) => StoreState::Closed,
        }
    }
}

fn invalid_state(operation: &'static str, state: StoreState) -> Error {
    Error::InvalidState { operation, state }
}

/// Block store wrapper that encrypts payloads before they reach `S`.
///
/// Identifiers are passed to the underlying store unchanged, so a caller that
/// computes identifiers from plaintext can use this store like any other.
///
/// The store must be initialized with [`init`](Self::init) and then
/// [`open`](Self::open)ed before any data operation. Lifecycle methods take `&mut self`,
/// data operations take `&self` and may run concurrently.
///
/// The derived key is kept until the store is dropped, so it can be reopened after
/// [`close`](Self::close) without deriving the key again.
pub struct EncBlockstore<S> {
    inner: S,
    lifecycle: Lifecycle,
}

impl<S> fmt::Debug for EncBlockstore<S> {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncBlockstore")
            .field("state", &self.lifecycle.state())
            .finish_non_exhaustive()
    }
}

impl<S: Blockstore> EncBlockstore<S> {
    #[must_use]
    #[inline]
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            lifecycle: Lifecycle::Uninitialized,
        }
    }

    #[must_use]
    #[inline]
    pub fn state(&self) -> StoreState {
        self.lifecycle.state()
    }

    /// Underlying store. Payloads read from it are encrypted records.
    #[must_use]
    #[inline]
    pub fn inner(&self) -> &S {
        &self.inner
    }

    #[must_use]
    #[inline]
    pub fn into_inner(self) -> S {
        self.inner
    }

    /// Derives the store key. Only allowed once, on an uninitialized store.
    #[inline]
    pub fn init(&mut self, password: &Password, salt: &Salt) -> Result<()> {
        let state = self.state();
        if state != StoreState::Uninitialized {
            return Err(invalid_state("init", state));
        }
        self.lifecycle = Lifecycle::Initialized(kdf::derive(password, salt));
        info!("encrypted block store initialized");
        Ok(())
    }

    /// Same as [`init`](Self::init), for a password and a salt that have not been validated.
    #[inline]
    pub fn init_from_bytes(&mut self, password: &[u8], salt: &[u8]) -> Result<()> {
        let state = self.state();
        if state != StoreState::Uninitialized {
            return Err(invalid_state("init", state));
        }
        self.init(&Password::new(password)?, &Salt::new(salt)?)
    }

    #[inline]
    pub fn open(&mut self) -> Result<()> {
        let key = match mem::replace(&mut self.lifecycle, Lifecycle::Uninitialized) {
            Lifecycle::Initialized(key) | Lifecycle::Closed(key) => key,
            other => {
                let state = other.state();
                self.lifecycle = other;
                return Err(invalid_state("open", state));
            }
        };
        self.lifecycle = Lifecycle::Open {
            cipher: Cipher::new(&key),
            key,
        };
        info!("encrypted block store opened");
        Ok(())
    }

    /// Drops the active cipher, wiping its copy of the key. The store can be opened
    /// again later.
    #[inline]
    pub fn close(&mut self) -> Result<()> {
        match mem::replace(&mut self.lifecycle, Lifecycle::Uninitialized) {
            Lifecycle::Open { key, cipher } => {
                drop(cipher);
                self.lifecycle = Lifecycle::Closed(key);
                info!("encrypted block store closed");
                Ok(())
            }
            other => {
                let state = other.state();
                self.lifecycle = other;
                Err(invalid_state("close", state))
            }
        }
    }

    fn cipher(&self, operation: &'static str) -> Result<&Cipher> {
        match &self.lifecycle {
            Lifecycle::Open { cipher, .. } => Ok(cipher),
            other => Err(invalid_state(operation, other.state())),
        }
    }

    /// Encrypts `plaintext` and stores it under `cid`.
    ///
    /// Every call uses a new nonce, so storing the same content twice produces
    /// different records that decrypt to the same plaintext.
    #[inline]
    pub fn put(&self, cid: &Cid, plaintext: &[u8]) -> Result<()> {
        let record = self
            .cipher("put")?
            .seal(cid, plaintext)
            .map_err(|chacha20poly1305::Error| Error::Encryption(*cid))?;
        self.inner.put(cid, &record).map_err(Error::Store)?;
        debug!(%cid, len = plaintext.len(), "stored encrypted block");
        Ok(())
    }

    /// Reads and decrypts the block stored under `cid`.
    ///
    /// Returns [`Error::Authentication`] if the record cannot be verified with the
    /// current key. No plaintext is returned in this case.
    #[inline]
    pub fn get(&self, cid: &Cid) -> Result<Vec<u8>> {
        let cipher = self.cipher("get")?;
        let record = self
            .inner
            .get(cid)
            .map_err(Error::Store)?
            .ok_or(Error::NotFound(*cid))?;
        match cipher.open(cid, &record) {
            Ok(plaintext) => {
                debug!(%cid, len = plaintext.len(), "read encrypted block");
                Ok(plaintext)
            }
            Err(err) => {
                warn!(%cid, %err, "failed to authenticate block");
                Err(Error::Authentication(*cid))
            }
        }
    }

    #[inline]
    pub fn has(&self, cid: &Cid) -> Result<bool> {
        self.cipher("has")?;
        self.inner.has(cid).map_err(Error::Store)
    }

    #[inline]
    pub fn delete(&self, cid: &Cid) -> Result<()> {
        self.cipher("delete")?;
        self.inner.delete(cid).map_err(Error::Store)?;
        debug!(%cid, "deleted block");
        Ok(())
    }
}

/// Lets the encrypted store stand in for a plain one. Missing blocks are reported as
/// `None`; every other [`Error`] is passed through and can be recovered with
/// [`anyhow::Error::downcast_ref`].
impl<S: Blockstore> Blockstore for EncBlockstore<S> {
    #[inline]
    fn put(&self, cid: &Cid, data: &[u8]) -> anyhow::Result<()> {
        Ok(Self::put(self, cid, data)?)
    }

    #[inline]
    fn get(&self, cid: &Cid) -> anyhow::Result<Option<Vec<u8>>> {
        match Self::get(self, cid) {
            Ok(data) => Ok(Some(data)),
            Err(Error::NotFound(_)) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    #[inline]
    fn has(&self, cid: &Cid) -> anyhow::Result<bool> {
        Ok(Self::has(self, cid)?)
    }

    #[inline]
    fn delete(&self, cid: &Cid) -> anyhow::Result<()> {
        Ok(Self::delete(self, cid)?)
    }

    #[inline]
    fn flush(&self) -> anyhow::Result<()> {
        self.inner.flush()
    }
}

use {
    argon2::{Algorithm, Argon2, Params, Version},
    encblock_protocol::credentials::{Password, Salt, WeakSecretError},
    std::fmt,
    zeroize::{Zeroize, ZeroizeOnDrop},
};

/// Length of the derived key in bytes.
pub const KEY_LEN: usize = 32;

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

/// Parameters used by every store. Changing them changes every derived key,
/// so a new parameter set must get a new name.
pub const KDF_V1: KdfParams = KdfParams {
    memory_kib: 19 * 1024,
    iterations: 2,
    parallelism: 1,
};

impl KdfParams {
    #[inline]
    pub fn derive(&self, password: &Password, salt: &Salt) -> Result<KeyMaterial, argon2::Error> {
        let params = Params::new(
            self.memory_kib,
            self.iterations,
            self.parallelism,
            Some(KEY_LEN),
        )?;
        let mut key = KeyMaterial { key: [0; KEY_LEN] };
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params).hash_password_into(
            password.as_bytes(),
            salt.as_bytes(),
            &mut key.key,
        )?;
        Ok(key)
    }
}

/// Symmetric key derived from a password and a salt.
///
/// Wiped from memory on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct KeyMaterial {
    key: [u8; KEY_LEN],
}

impl KeyMaterial {
    #[must_use]
    #[inline]
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.key
    }
}

impl fmt::Debug for KeyMaterial {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial").finish()
    }
}

/// Derives the store key with [`KDF_V1`].
///
/// Cannot fail: the parameters are fixed and both inputs already passed validation.
#[must_use]
#[inline]
#[expect(
    clippy::expect_used,
    reason = "KDF_V1 is a valid parameter set and inputs are length-checked"
)]
pub fn derive(password: &Password, salt: &Salt) -> KeyMaterial {
    KDF_V1
        .derive(password, salt)
        .expect("argon2 rejected KDF_V1 parameters")
}

/// Same as [`derive`], for inputs that have not been validated yet.
#[inline]
pub fn derive_from_bytes(password: &[u8], salt: &[u8]) -> Result<KeyMaterial, WeakSecretError> {
    Ok(derive(&Password::new(password)?, &Salt::new(salt)?))
}

use {
    anyhow::Result,
    base64::{Engine, display::Base64Display, prelude::BASE64_URL_SAFE_NO_PAD},
    derive_more::Display,
    rand::RngCore,
    serde::{Deserialize, Deserializer, Serialize, Serializer, de},
    std::{
        borrow::Cow,
        fmt::{self, Debug},
    },
    zeroize::Zeroizing,
};

/// Minimal accepted length of a password or a salt, in bytes.
///
/// This is a floor, not a strength guarantee.
pub const MIN_SECRET_LEN: usize = 16;

/// Length of salts produced by [`Salt::generate`].
const GENERATED_SALT_LEN: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SecretKind {
    #[display("password")]
    Password,
    #[display("salt")]
    Salt,
}

/// A password or a salt is shorter than [`MIN_SECRET_LEN`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{kind} is too short: got {len} bytes, expected at least {MIN_SECRET_LEN}")]
pub struct WeakSecretError {
    pub kind: SecretKind,
    pub len: usize,
}

fn check_len(kind: SecretKind, value: &[u8]) -> Result<(), WeakSecretError> {
    if value.len() < MIN_SECRET_LEN {
        return Err(WeakSecretError {
            kind,
            len: value.len(),
        });
    }
    Ok(())
}

/// Password used to derive the encryption key of a store.
///
/// The bytes are wiped from memory when the value is dropped.
#[derive(Clone)]
pub struct Password(Zeroizing<Vec<u8>>);

impl Password {
    #[inline]
    pub fn new(value: impl Into<Vec<u8>>) -> Result<Self, WeakSecretError> {
        let value = Zeroizing::new(value.into());
        check_len(SecretKind::Password, &value)?;
        Ok(Self(value))
    }

    #[must_use]
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Debug for Password {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Password").finish()
    }
}

impl<'de> Deserialize<'de> for Password {
    #[inline]
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Zeroizing::new(String::deserialize(deserializer)?);
        Self::new(value.as_bytes()).map_err(de::Error::custom)
    }
}

/// Salt mixed into key derivation.
///
/// Not secret, but it must be the same every time the store is opened.
/// The textual form is unpadded URL-safe base64.
#[derive(Clone, PartialEq, Eq)]
pub struct Salt(Vec<u8>);

impl Salt {
    #[inline]
    pub fn new(value: impl Into<Vec<u8>>) -> Result<Self, WeakSecretError> {
        let value = value.into();
        check_len(SecretKind::Salt, &value)?;
        Ok(Self(value))
    }

    #[must_use]
    #[inline]
    pub fn generate() -> Self {
        let mut value = vec![0u8; GENERATED_SALT_LEN];
        rand::rng().fill_bytes(&mut value);
        Self(value)
    }

    #[inline]
    pub fn from_base64(value: &str) -> Result<Self> {
        let bytes = BASE64_URL_SAFE_NO_PAD.decode(value)?;
        Ok(Self::new(bytes)?)
    }

    #[must_use]
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[must_use]
    #[inline]
    pub fn display_base64(&self) -> impl fmt::Display + '_ {
        Base64Display::new(&self.0, &BASE64_URL_SAFE_NO_PAD)
    }
}

impl Debug for Salt {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Salt({})", self.display_base64())
    }
}

impl Serialize for Salt {
    #[inline]
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.display_base64().to_string().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Salt {
    #[inline]
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Self::from_base64(&Cow::<'_, str>::deserialize(deserializer)?).map_err(de::Error::custom)
    }
}

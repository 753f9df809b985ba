//! Types shared by every layer of the encrypted block store: content identifiers
//! and validated secrets.

pub mod credentials;
pub mod encoding;

use {
    anyhow::{Error, Result, bail, ensure},
    base64::{Engine, prelude::BASE64_URL_SAFE_NO_PAD},
    serde::{Deserialize, Deserializer, Serialize, Serializer, de},
    sha2::{Digest, Sha256},
    std::{borrow::Cow, fmt, str::FromStr},
};

const CID_VERSION: u8 = 1;
pub const DIGEST_LEN: usize = 32;
const HEADER_LEN: usize = 2;

/// Length of a binary-encoded [`Cid`].
pub const CID_LEN: usize = HEADER_LEN + DIGEST_LEN;

/// Kind of data stored in a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Codec {
    /// A slice of file content.
    Raw = 1,
    /// An encoded file manifest listing the chunks of a file.
    Manifest = 2,
}

impl TryFrom<u8> for Codec {
    type Error = Error;

    #[inline]
    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(Self::Raw),
            2 => Ok(Self::Manifest),
            _ => bail!("invalid value for Codec: {value}"),
        }
    }
}

impl From<Codec> for u8 {
    #[inline]
    fn from(value: Codec) -> Self {
        match value {
            Codec::Raw => 1,
            Codec::Manifest => 2,
        }
    }
}

/// Content identifier of a block.
///
/// Computed from the plaintext bytes of the block, so the same content always
/// has the same identifier, whether or not it is encrypted at rest.
///
/// Binary layout: version (1 byte), codec (1 byte), SHA-256 digest (32 bytes).
/// The string form is the binary layout in unpadded URL-safe base64.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cid {
    codec: Codec,
    digest: [u8; DIGEST_LEN],
}

impl Cid {
    #[must_use]
    #[inline]
    pub fn for_block(codec: Codec, data: &[u8]) -> Self {
        Self {
            codec,
            digest: Sha256::digest(data).into(),
        }
    }

    #[must_use]
    #[inline]
    pub fn codec(&self) -> Codec {
        self.codec
    }

    #[must_use]
    #[inline]
    pub fn digest(&self) -> &[u8; DIGEST_LEN] {
        &self.digest
    }

    /// Returns true if `data` hashes to this identifier.
    #[must_use]
    #[inline]
    pub fn matches(&self, data: &[u8]) -> bool {
        Self::for_block(self.codec, data) == *self
    }

    #[must_use]
    #[inline]
    pub fn to_bytes(&self) -> [u8; CID_LEN] {
        let mut bytes = [0u8; CID_LEN];
        let (header, digest) = bytes.split_at_mut(HEADER_LEN);
        header.copy_from_slice(&[CID_VERSION, self.codec.into()]);
        digest.copy_from_slice(&self.digest);
        bytes
    }

    #[inline]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        ensure!(
            bytes.len() == CID_LEN,
            "invalid cid length; got {}, expected {CID_LEN}",
            bytes.len(),
        );
        let (header, digest) = bytes.split_at(HEADER_LEN);
        let &[version, codec] = header else {
            bail!("truncated cid header");
        };
        ensure!(
            version == CID_VERSION,
            "unsupported cid version: {version}"
        );
        Ok(Self {
            codec: codec.try_into()?,
            digest: digest.try_into()?,
        })
    }
}

impl fmt::Display for Cid {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", BASE64_URL_SAFE_NO_PAD.encode(self.to_bytes()))
    }
}

impl fmt::Debug for Cid {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cid({self})")
    }
}

impl FromStr for Cid {
    type Err = Error;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_bytes(&BASE64_URL_SAFE_NO_PAD.decode(s)?)
    }
}

impl Serialize for Cid {
    #[inline]
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_string().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Cid {
    #[inline]
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Cow::<'_, str>::deserialize(deserializer)?
            .parse()
            .map_err(de::Error::custom)
    }
}

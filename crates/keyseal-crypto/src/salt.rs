//! Salt sources: a fixed default or fresh OS randomness
//!
//! Salts are not secret, but any ciphertext a salt helped protect is useless
//! without it: persist or transmit the salt next to the data.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::{fill_random, CryptoError, CryptoResult};

/// Fixed, pre-shared salt for single-deployment convenience paths.
///
/// Every caller that relies on it derives comparable keys from equal inputs.
/// Never use it where two parties expect independent protection.
pub const DEFAULT_SALT: [u8; 16] = *b"keyseal-salt-v01";

/// Below this many bytes a salt still works but is flagged in the logs.
pub const MIN_RECOMMENDED_SALT_LEN: usize = 8;

/// Longest salt `random_salt` will generate.
pub const MAX_SALT_LEN: usize = 1024;

/// Default length for freshly generated salts.
pub const DEFAULT_SALT_LEN: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Salt {
    bytes: Vec<u8>,
}

impl Salt {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    pub fn from_hex(s: &str) -> CryptoResult<Self> {
        Ok(Self::from_bytes(hex::decode(s.trim())?))
    }

    pub fn from_base64(s: &str) -> CryptoResult<Self> {
        Ok(Self::from_bytes(STANDARD.decode(s.trim())?))
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn is_default(&self) -> bool {
        self.bytes == DEFAULT_SALT
    }

    pub(crate) fn warn_if_weak(&self) {
        if self.is_default() {
            tracing::warn!("deriving with the fixed default salt");
        } else if self.len() < MIN_RECOMMENDED_SALT_LEN {
            tracing::warn!(
                salt_len = self.len(),
                min = MIN_RECOMMENDED_SALT_LEN,
                "salt shorter than recommended"
            );
        }
    }
}

impl From<&[u8]> for Salt {
    fn from(bytes: &[u8]) -> Self {
        Self::from_bytes(bytes)
    }
}

impl From<Vec<u8>> for Salt {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from_bytes(bytes)
    }
}

impl AsRef<[u8]> for Salt {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

/// The fixed [`DEFAULT_SALT`].
pub fn default_salt() -> Salt {
    Salt::from_bytes(DEFAULT_SALT)
}

/// `length` bytes from the OS random source.
pub fn random_salt(length: usize) -> CryptoResult<Salt> {
    if length == 0 || length > MAX_SALT_LEN {
        return Err(CryptoError::InvalidParameters(format!(
            "salt length {length} outside 1..={MAX_SALT_LEN}"
        )));
    }
    let mut bytes = vec![0u8; length];
    fill_random(&mut bytes)?;
    let salt = Salt::from_bytes(bytes);
    salt.warn_if_weak();
    Ok(salt)
}

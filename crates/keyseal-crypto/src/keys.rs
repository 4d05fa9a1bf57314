//! 256-bit symmetric keys

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use zeroize::Zeroize;

use crate::error::{fill_random, CryptoError, CryptoResult};
use crate::KEY_SIZE;

/// A 256-bit symmetric key. Zeroized on drop.
///
/// Carries no record of how it was made: a random draw, ECDH+HKDF, or a
/// password hash all produce the same type. Callers keep the salt and
/// parameters themselves.
#[derive(Clone)]
pub struct SymmetricKey {
    bytes: [u8; KEY_SIZE],
}

impl SymmetricKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    pub fn from_slice(bytes: &[u8]) -> CryptoResult<Self> {
        let bytes: [u8; KEY_SIZE] = bytes.try_into().map_err(|_| CryptoError::KeyFormat {
            expected: KEY_SIZE,
            actual: bytes.len(),
        })?;
        Ok(Self { bytes })
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.bytes)
    }

    pub fn from_base64(s: &str) -> CryptoResult<Self> {
        let mut raw = STANDARD.decode(s.trim())?;
        let key = Self::from_slice(&raw);
        raw.zeroize();
        key
    }
}

impl Drop for SymmetricKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymmetricKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Generate a random 256-bit symmetric key.
pub fn generate_symmetric_key() -> CryptoResult<SymmetricKey> {
    let mut bytes = [0u8; KEY_SIZE];
    fill_random(&mut bytes)?;
    Ok(SymmetricKey::from_bytes(bytes))
}

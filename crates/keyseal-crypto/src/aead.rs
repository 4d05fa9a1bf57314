//! AEAD sealing into a single self-contained envelope
//!
//! Envelope format (binary):
//! ```text
//! [12 bytes: random nonce][N bytes: ciphertext][16 bytes: tag]
//! ```
//!
//! Nothing besides the key is needed to open an envelope. Both suites share
//! the layout, so the suite must be agreed out of band (or recorded, as
//! `ExportBundle` does).

use std::fmt;
use std::str::FromStr;

use aes_gcm::Aes256Gcm;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chacha20poly1305::{
    aead::{generic_array::GenericArray, Aead, AeadCore, KeyInit, Payload},
    ChaCha20Poly1305,
};
use serde::{Deserialize, Serialize};

use crate::error::{fill_random, CryptoError, CryptoResult};
use crate::keys::SymmetricKey;
use crate::{NONCE_SIZE, TAG_SIZE};

/// 256-bit-key AEAD ciphers with a 96-bit nonce and 128-bit tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CipherSuite {
    #[default]
    #[serde(rename = "chacha20-poly1305")]
    ChaCha20Poly1305,
    #[serde(rename = "aes-256-gcm")]
    Aes256Gcm,
}

impl CipherSuite {
    pub fn name(&self) -> &'static str {
        match self {
            CipherSuite::ChaCha20Poly1305 => "chacha20-poly1305",
            CipherSuite::Aes256Gcm => "aes-256-gcm",
        }
    }
}

impl fmt::Display for CipherSuite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CipherSuite {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "chacha20-poly1305" | "chacha20poly1305" => Ok(CipherSuite::ChaCha20Poly1305),
            "aes-256-gcm" | "aes256gcm" => Ok(CipherSuite::Aes256Gcm),
            other => Err(CryptoError::InvalidParameters(format!(
                "unknown cipher suite: {other}"
            ))),
        }
    }
}

/// Opaque `nonce || ciphertext || tag` blob. Do not reorder or truncate.
#[derive(Clone, PartialEq, Eq)]
pub struct SealedEnvelope {
    bytes: Vec<u8>,
}

impl SealedEnvelope {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    pub fn from_base64(s: &str) -> CryptoResult<Self> {
        Ok(Self::from_bytes(STANDARD.decode(s.trim())?))
    }
}

impl From<Vec<u8>> for SealedEnvelope {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from_bytes(bytes)
    }
}

impl AsRef<[u8]> for SealedEnvelope {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for SealedEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SealedEnvelope")
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Seals and opens envelopes under one cipher suite.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AeadCipher {
    suite: CipherSuite,
}

impl AeadCipher {
    pub fn new(suite: CipherSuite) -> Self {
        Self { suite }
    }

    pub fn suite(&self) -> CipherSuite {
        self.suite
    }

    /// Envelope bytes added on top of the plaintext.
    pub const fn overhead() -> usize {
        NONCE_SIZE + TAG_SIZE
    }

    /// Seal under a fresh random nonce. Two calls never return the same envelope.
    pub fn seal(&self, plaintext: &[u8], key: &SymmetricKey) -> CryptoResult<SealedEnvelope> {
        self.seal_with_aad(plaintext, &[], key)
    }

    pub fn open(&self, envelope: &SealedEnvelope, key: &SymmetricKey) -> CryptoResult<Vec<u8>> {
        self.open_with_aad(envelope, &[], key)
    }

    /// Seal, binding `aad` into the tag. The same `aad` must be given to open.
    pub fn seal_with_aad(
        &self,
        plaintext: &[u8],
        aad: &[u8],
        key: &SymmetricKey,
    ) -> CryptoResult<SealedEnvelope> {
        let mut nonce = [0u8; NONCE_SIZE];
        fill_random(&mut nonce)?;

        let payload = Payload { msg: plaintext, aad };
        let ciphertext = match self.suite {
            CipherSuite::ChaCha20Poly1305 => encrypt::<ChaCha20Poly1305>(key, &nonce, payload),
            CipherSuite::Aes256Gcm => encrypt::<Aes256Gcm>(key, &nonce, payload),
        }?;

        let mut bytes = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        bytes.extend_from_slice(&nonce);
        bytes.extend_from_slice(&ciphertext);

        tracing::debug!(
            suite = self.suite.name(),
            plaintext_len = plaintext.len(),
            envelope_len = bytes.len(),
            "sealed envelope"
        );
        Ok(SealedEnvelope { bytes })
    }

    /// Open an envelope sealed with `aad`.
    ///
    /// Every failure (short blob, wrong key, flipped bit, AAD mismatch) is
    /// `CryptoError::Authentication`, and no plaintext is released.
    pub fn open_with_aad(
        &self,
        envelope: &SealedEnvelope,
        aad: &[u8],
        key: &SymmetricKey,
    ) -> CryptoResult<Vec<u8>> {
        let bytes = envelope.as_bytes();
        if bytes.len() < NONCE_SIZE + TAG_SIZE {
            tracing::debug!(suite = self.suite.name(), "envelope authentication failed");
            return Err(CryptoError::Authentication);
        }

        let (nonce, ciphertext) = bytes.split_at(NONCE_SIZE);
        let payload = Payload {
            msg: ciphertext,
            aad,
        };
        let opened = match self.suite {
            CipherSuite::ChaCha20Poly1305 => decrypt::<ChaCha20Poly1305>(key, nonce, payload),
            CipherSuite::Aes256Gcm => decrypt::<Aes256Gcm>(key, nonce, payload),
        };

        match opened {
            Some(plaintext) => {
                tracing::debug!(
                    suite = self.suite.name(),
                    plaintext_len = plaintext.len(),
                    "opened envelope"
                );
                Ok(plaintext)
            }
            None => {
                tracing::debug!(suite = self.suite.name(), "envelope authentication failed");
                Err(CryptoError::Authentication)
            }
        }
    }
}

fn encrypt<C: Aead + KeyInit>(
    key: &SymmetricKey,
    nonce: &[u8; NONCE_SIZE],
    payload: Payload<'_, '_>,
) -> CryptoResult<Vec<u8>> {
    let cipher = C::new_from_slice(key.as_bytes())
        .map_err(|e| CryptoError::InvalidParameters(format!("AEAD key: {e}")))?;
    let nonce = GenericArray::<u8, <C as AeadCore>::NonceSize>::from_slice(nonce);
    cipher
        .encrypt(nonce, payload)
        .map_err(|_| CryptoError::InvalidParameters("plaintext too large for AEAD".into()))
}

fn decrypt<C: Aead + KeyInit>(
    key: &SymmetricKey,
    nonce: &[u8],
    payload: Payload<'_, '_>,
) -> Option<Vec<u8>> {
    let cipher = C::new_from_slice(key.as_bytes()).ok()?;
    let nonce = GenericArray::<u8, <C as AeadCore>::NonceSize>::from_slice(nonce);
    cipher.decrypt(nonce, payload).ok()
}

/// Seal with the default suite (ChaCha20-Poly1305).
pub fn seal(plaintext: &[u8], key: &SymmetricKey) -> CryptoResult<SealedEnvelope> {
    AeadCipher::default().seal(plaintext, key)
}

/// Open with the default suite (ChaCha20-Poly1305).
pub fn open(envelope: &SealedEnvelope, key: &SymmetricKey) -> CryptoResult<Vec<u8>> {
    AeadCipher::default().open(envelope, key)
}

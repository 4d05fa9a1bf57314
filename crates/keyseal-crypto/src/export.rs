//! Password-protected export/import of arbitrary payloads
//!
//! Two shapes:
//! - `SecureExport::export_encrypted` returns a bare envelope sealed under a
//!   key derived from the password and the exporter's fixed salt. The caller
//!   keeps track of that salt.
//! - `BundleExport::export_bundle` draws a fresh salt per export and records
//!   it, with the KDF and cipher suite, in a JSON `ExportBundle`. The
//!   matching `import_bundle` needs only the password.

use std::path::Path;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::aead::{AeadCipher, CipherSuite, SealedEnvelope};
use crate::error::{CryptoError, CryptoResult};
use crate::keys::SymmetricKey;
use crate::password::{derive_key_from_password_with, PasswordKdf};
use crate::salt::{default_salt, random_salt, Salt, DEFAULT_SALT_LEN};

/// Current `ExportBundle` format version
pub const BUNDLE_VERSION: u32 = 1;

#[derive(Debug, Clone)]
pub struct SecureExport {
    salt: Salt,
    kdf: PasswordKdf,
    cipher: AeadCipher,
}

impl SecureExport {
    /// Exporter bound to a caller-supplied salt, using SHA-256 and ChaCha20-Poly1305.
    pub fn new(salt: Salt) -> Self {
        Self {
            salt,
            kdf: PasswordKdf::default(),
            cipher: AeadCipher::default(),
        }
    }

    /// Exporter bound to the fixed default salt.
    ///
    /// Anything exported this way is comparable with any other default-salt
    /// export of the same password. Single-tenant convenience only.
    pub fn with_default_salt() -> Self {
        Self::new(default_salt())
    }

    pub fn with_kdf(mut self, kdf: PasswordKdf) -> Self {
        self.kdf = kdf;
        self
    }

    pub fn with_cipher(mut self, suite: CipherSuite) -> Self {
        self.cipher = AeadCipher::new(suite);
        self
    }

    pub fn salt(&self) -> &Salt {
        &self.salt
    }

    pub fn kdf(&self) -> &PasswordKdf {
        &self.kdf
    }

    pub fn cipher(&self) -> &AeadCipher {
        &self.cipher
    }

    fn key_for(&self, password: &SecretString, salt: &Salt) -> CryptoResult<SymmetricKey> {
        password_key(password, salt, &self.kdf)
    }

    pub fn export_encrypted(
        &self,
        password: &SecretString,
        data: &[u8],
    ) -> CryptoResult<SealedEnvelope> {
        let key = self.key_for(password, &self.salt)?;
        self.cipher.seal(data, &key)
    }

    pub fn import_decrypted(
        &self,
        password: &SecretString,
        envelope: &SealedEnvelope,
    ) -> CryptoResult<Vec<u8>> {
        let key = self.key_for(password, &self.salt)?;
        self.cipher.open(envelope, &key)
    }

    /// Seal and write the envelope bytes verbatim to `path`.
    pub fn export_to_file(
        &self,
        path: &Path,
        password: &SecretString,
        data: &[u8],
    ) -> CryptoResult<SealedEnvelope> {
        let envelope = self.export_encrypted(password, data)?;
        write_file(path, envelope.as_bytes())?;
        tracing::info!(path = %path.display(), bytes = envelope.len(), "wrote encrypted export");
        Ok(envelope)
    }

    pub fn import_from_file(&self, path: &Path, password: &SecretString) -> CryptoResult<Vec<u8>> {
        let envelope = SealedEnvelope::from_bytes(std::fs::read(path)?);
        self.import_decrypted(password, &envelope)
    }
}

fn password_key(password: &SecretString, salt: &Salt, kdf: &PasswordKdf) -> CryptoResult<SymmetricKey> {
    if !kdf.is_iterated() {
        tracing::warn!("password export using single-round SHA-256; prefer argon2id");
    }
    derive_key_from_password_with(password, salt, kdf)
}

/// Exporter that draws a fresh salt for every bundle.
#[derive(Debug, Clone)]
pub struct BundleExport {
    kdf: PasswordKdf,
    cipher: AeadCipher,
    salt_len: usize,
}

impl Default for BundleExport {
    fn default() -> Self {
        Self::new()
    }
}

impl BundleExport {
    /// SHA-256 KDF, ChaCha20-Poly1305, 16-byte salts.
    pub fn new() -> Self {
        Self {
            kdf: PasswordKdf::default(),
            cipher: AeadCipher::default(),
            salt_len: DEFAULT_SALT_LEN,
        }
    }

    pub fn with_kdf(mut self, kdf: PasswordKdf) -> Self {
        self.kdf = kdf;
        self
    }

    pub fn with_cipher(mut self, suite: CipherSuite) -> Self {
        self.cipher = AeadCipher::new(suite);
        self
    }

    pub fn with_salt_len(mut self, len: usize) -> Self {
        self.salt_len = len;
        self
    }

    /// Seal under a fresh random salt recorded in the returned bundle.
    pub fn export_bundle(&self, password: &SecretString, data: &[u8]) -> CryptoResult<ExportBundle> {
        let salt = random_salt(self.salt_len)?;
        let key = password_key(password, &salt, &self.kdf)?;
        let envelope = self.cipher.seal(data, &key)?;

        Ok(ExportBundle {
            version: BUNDLE_VERSION,
            kdf: self.kdf,
            cipher: self.cipher.suite(),
            salt: salt.to_base64(),
            envelope: envelope.to_base64(),
        })
    }

    pub fn export_bundle_to_file(
        &self,
        path: &Path,
        password: &SecretString,
        data: &[u8],
    ) -> CryptoResult<ExportBundle> {
        let bundle = self.export_bundle(password, data)?;
        write_file(path, &bundle.to_bytes()?)?;
        tracing::info!(path = %path.display(), kdf = bundle.kdf.name(), "wrote export bundle");
        Ok(bundle)
    }
}

/// Open `bundle` with the parameters it records.
pub fn import_bundle(password: &SecretString, bundle: &ExportBundle) -> CryptoResult<Vec<u8>> {
    bundle.open(password)
}

/// A sealed payload plus everything needed to re-derive its key from the password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportBundle {
    /// Bundle format version
    pub version: u32,
    /// Password KDF and its parameters
    pub kdf: PasswordKdf,
    /// AEAD suite used for `envelope`
    pub cipher: CipherSuite,
    /// KDF salt (base64)
    pub salt: String,
    /// Sealed envelope (base64)
    pub envelope: String,
}

impl ExportBundle {
    /// Re-derive the key from `password` and open the envelope.
    pub fn open(&self, password: &SecretString) -> CryptoResult<Vec<u8>> {
        if self.version != BUNDLE_VERSION {
            return Err(CryptoError::InvalidParameters(format!(
                "unsupported bundle version {} (expected {BUNDLE_VERSION})",
                self.version
            )));
        }
        let salt = Salt::from_base64(&self.salt)?;
        let envelope = SealedEnvelope::from_base64(&self.envelope)?;
        let key = derive_key_from_password_with(password, &salt, &self.kdf)?;
        AeadCipher::new(self.cipher).open(&envelope, &key)
    }

    /// Serialize to JSON bytes
    pub fn to_bytes(&self) -> CryptoResult<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// Deserialize from JSON bytes
    pub fn from_bytes(data: &[u8]) -> CryptoResult<Self> {
        Ok(serde_json::from_slice(data)?)
    }

    pub fn read_from_file(path: &Path) -> CryptoResult<Self> {
        Self::from_bytes(&std::fs::read(path)?)
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> CryptoResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, bytes)?;
    Ok(())
}

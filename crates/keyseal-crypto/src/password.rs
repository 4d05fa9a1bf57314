//! Password → symmetric key
//!
//! Deterministic: the same password and salt always give the same key, so
//! the password alone reconstructs it at decrypt time.
//!
//! `PasswordKdf::Sha256` is a single SHA-256 over `utf8(password) || salt`.
//! It is the compatibility baseline and is cheap to brute-force.
//! `PasswordKdf::Argon2id` is the hardened option.

use argon2::{Algorithm, Argon2, Params, Version};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{CryptoError, CryptoResult};
use crate::keys::SymmetricKey;
use crate::salt::Salt;
use crate::KEY_SIZE;

/// Argon2id parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    /// Memory cost in KiB (default: 65536 = 64 MiB)
    pub mem_cost_kib: u32,
    /// Time cost / iterations (default: 3)
    pub time_cost: u32,
    /// Parallelism (default: 4)
    pub parallelism: u32,
}

/// Upper bound on Argon2id memory cost (1 GiB)
pub const MAX_MEM_COST_KIB: u32 = 1024 * 1024;

/// Upper bound on Argon2id passes
pub const MAX_TIME_COST: u32 = 16;

/// Upper bound on Argon2id lanes
pub const MAX_PARALLELISM: u32 = 64;

impl KdfParams {
    /// Reject costs outside `1..=MAX_*`.
    ///
    /// Parameters may come from an untrusted bundle, so this runs before any
    /// memory is allocated for the hash.
    pub fn check_bounds(&self) -> CryptoResult<()> {
        let checks = [
            ("mem_cost_kib", self.mem_cost_kib, MAX_MEM_COST_KIB),
            ("time_cost", self.time_cost, MAX_TIME_COST),
            ("parallelism", self.parallelism, MAX_PARALLELISM),
        ];
        for (name, value, max) in checks {
            if value == 0 || value > max {
                return Err(CryptoError::InvalidParameters(format!(
                    "Argon2id {name} = {value} outside 1..={max}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            mem_cost_kib: 65536,
            time_cost: 3,
            parallelism: 4,
        }
    }
}

/// Which password hash to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "algorithm", rename_all = "lowercase")]
pub enum PasswordKdf {
    /// Single-round SHA-256. Minimum baseline.
    #[default]
    Sha256,
    /// Argon2id (v0x13). Salt must be at least 8 bytes.
    Argon2id(KdfParams),
}

impl PasswordKdf {
    pub fn name(&self) -> &'static str {
        match self {
            PasswordKdf::Sha256 => "sha256",
            PasswordKdf::Argon2id(_) => "argon2id",
        }
    }

    pub fn is_iterated(&self) -> bool {
        !matches!(self, PasswordKdf::Sha256)
    }
}

/// Baseline derivation: `SHA-256(utf8(password) || salt)`.
pub fn derive_key_from_password(password: &SecretString, salt: &Salt) -> CryptoResult<SymmetricKey> {
    derive_key_from_password_with(password, salt, &PasswordKdf::Sha256)
}

/// Derive a key with an explicitly chosen KDF.
pub fn derive_key_from_password_with(
    password: &SecretString,
    salt: &Salt,
    kdf: &PasswordKdf,
) -> CryptoResult<SymmetricKey> {
    let password = password.expose_secret();
    if password.is_empty() {
        return Err(CryptoError::EmptyPassword);
    }
    salt.warn_if_weak();

    let key = match kdf {
        PasswordKdf::Sha256 => {
            let mut hasher = Sha256::new();
            hasher.update(password.as_bytes());
            hasher.update(salt.as_bytes());
            SymmetricKey::from_bytes(hasher.finalize().into())
        }
        PasswordKdf::Argon2id(params) => argon2id(password.as_bytes(), salt.as_bytes(), params)?,
    };

    tracing::debug!(kdf = kdf.name(), salt_len = salt.len(), "derived key from password");
    Ok(key)
}

fn argon2id(password: &[u8], salt: &[u8], params: &KdfParams) -> CryptoResult<SymmetricKey> {
    params.check_bounds()?;
    let argon2_params = Params::new(
        params.mem_cost_kib,
        params.time_cost,
        params.parallelism,
        Some(KEY_SIZE),
    )
    .map_err(|e| CryptoError::InvalidParameters(format!("Argon2id params: {e}")))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params);

    let mut key = [0u8; KEY_SIZE];
    argon2
        .hash_password_into(password, salt, &mut key)
        .map_err(|e| CryptoError::InvalidParameters(format!("Argon2id: {e}")))?;
    let derived = SymmetricKey::from_bytes(key);
    zeroize::Zeroize::zeroize(&mut key);
    Ok(derived)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_argon2() -> PasswordKdf {
        PasswordKdf::Argon2id(KdfParams {
            mem_cost_kib: 1024,
            time_cost: 1,
            parallelism: 1,
        })
    }

    #[test]
    fn test_sha256_deterministic() {
        let password = SecretString::from("test-passphrase-123");
        let salt = Salt::from_bytes([1u8; 16].to_vec());

        let key1 = derive_key_from_password(&password, &salt).unwrap();
        let key2 = derive_key_from_password(&password, &salt).unwrap();

        assert_eq!(key1.as_bytes(), key2.as_bytes(), "KDF must be deterministic");
    }

    #[test]
    fn test_sha256_matches_plain_digest() {
        let password = SecretString::from("hunter2");
        let salt = Salt::from_bytes(b"pepper".to_vec());

        let key = derive_key_from_password(&password, &salt).unwrap();
        let expected: [u8; 32] = Sha256::digest(b"hunter2pepper").into();

        assert_eq!(key.as_bytes(), &expected);
    }

    #[test]
    fn test_different_passwords_and_salts() {
        let salt = Salt::from_bytes([1u8; 16].to_vec());
        let a = derive_key_from_password(&SecretString::from("passphrase-a"), &salt).unwrap();
        let b = derive_key_from_password(&SecretString::from("passphrase-b"), &salt).unwrap();
        assert_ne!(a.as_bytes(), b.as_bytes(), "different passwords must differ");

        let password = SecretString::from("same-passphrase");
        let c = derive_key_from_password(&password, &Salt::from_bytes([1u8; 16].to_vec())).unwrap();
        let d = derive_key_from_password(&password, &Salt::from_bytes([2u8; 16].to_vec())).unwrap();
        assert_ne!(c.as_bytes(), d.as_bytes(), "different salts must differ");
    }

    #[test]
    fn test_empty_password_rejected() {
        let salt = Salt::from_bytes([1u8; 16].to_vec());
        let result = derive_key_from_password(&SecretString::from(""), &salt);
        assert!(matches!(result, Err(CryptoError::EmptyPassword)));

        let result = derive_key_from_password_with(&SecretString::from(""), &salt, &fast_argon2());
        assert!(matches!(result, Err(CryptoError::EmptyPassword)));
    }

    #[test]
    fn test_argon2id_deterministic_and_distinct_from_sha256() {
        let password = SecretString::from("correct horse");
        let salt = Salt::from_bytes([3u8; 16].to_vec());

        let a1 = derive_key_from_password_with(&password, &salt, &fast_argon2()).unwrap();
        let a2 = derive_key_from_password_with(&password, &salt, &fast_argon2()).unwrap();
        let s = derive_key_from_password(&password, &salt).unwrap();

        assert_eq!(a1.as_bytes(), a2.as_bytes());
        assert_ne!(a1.as_bytes(), s.as_bytes());
    }

    #[test]
    fn test_argon2id_short_salt_rejected() {
        let password = SecretString::from("correct horse");
        let salt = Salt::from_bytes(vec![1, 2, 3]);

        let result = derive_key_from_password_with(&password, &salt, &fast_argon2());
        assert!(matches!(result, Err(CryptoError::InvalidParameters(_))));
    }

    #[test]
    fn test_argon2id_cost_bounds() {
        assert!(KdfParams::default().check_bounds().is_ok());

        let password = SecretString::from("correct horse");
        let salt = Salt::from_bytes([3u8; 16].to_vec());
        let oversized = [
            KdfParams { mem_cost_kib: 268_435_455, time_cost: 1, parallelism: 1 },
            KdfParams { mem_cost_kib: 1024, time_cost: u32::MAX, parallelism: 1 },
            KdfParams { mem_cost_kib: 1024, time_cost: 1, parallelism: MAX_PARALLELISM + 1 },
            KdfParams { mem_cost_kib: 1024, time_cost: 0, parallelism: 1 },
        ];
        for params in oversized {
            let result =
                derive_key_from_password_with(&password, &salt, &PasswordKdf::Argon2id(params));
            assert!(
                matches!(result, Err(CryptoError::InvalidParameters(_))),
                "{params:?} must be rejected before hashing"
            );
        }
    }

    #[test]
    fn test_kdf_serde_shape() {
        let json = serde_json::to_string(&fast_argon2()).unwrap();
        assert!(json.contains("\"algorithm\":\"argon2id\""));
        let back: PasswordKdf = serde_json::from_str(&json).unwrap();
        assert_eq!(back, fast_argon2());

        let sha: PasswordKdf = serde_json::from_str(r#"{"algorithm":"sha256"}"#).unwrap();
        assert_eq!(sha, PasswordKdf::Sha256);
    }
}

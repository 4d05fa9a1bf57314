//! keyseal-crypto: key agreement and AEAD envelopes
//!
//! Data flow:
//! ```text
//! generate_key_pair ──► export/import (base64) ──► derive_shared_key(local, remote, salt)
//!                                                        │  X25519 + HKDF-SHA256
//!                                                        ▼
//! derive_key_from_password(password, salt) ─────► SymmetricKey ──► AeadCipher::seal/open
//!                                                                    nonce(12) || ct || tag(16)
//! ```
//!
//! Every derivation that two sides must agree on takes an explicit `Salt`.
//! The same salt has to reach both calls; nothing here can detect a mismatch
//! before the envelope fails to open.

pub mod aead;
pub mod agreement;
pub mod codec;
pub mod error;
pub mod export;
pub mod keypair;
pub mod keys;
pub mod password;
pub mod salt;

pub use aead::{open, seal, AeadCipher, CipherSuite, SealedEnvelope};
pub use agreement::derive_shared_key;
pub use codec::{export_private_key, export_public_key, import_private_key, import_public_key};
pub use error::{CryptoError, CryptoResult};
pub use export::{import_bundle, BundleExport, ExportBundle, SecureExport};
pub use keypair::{generate_key_pair, KeyPair, PrivateKey, PublicKey};
pub use keys::{generate_symmetric_key, SymmetricKey};
pub use password::{
    derive_key_from_password, derive_key_from_password_with, KdfParams, PasswordKdf,
    MAX_MEM_COST_KIB, MAX_PARALLELISM, MAX_TIME_COST,
};
pub use salt::{default_salt, random_salt, Salt, MAX_SALT_LEN};

pub use secrecy::SecretString;

/// Size of every key in bytes (X25519 scalar, X25519 point, symmetric key)
pub const KEY_SIZE: usize = 32;

/// Size of the AEAD nonce (96-bit)
pub const NONCE_SIZE: usize = 12;

/// Size of the AEAD authentication tag
pub const TAG_SIZE: usize = 16;

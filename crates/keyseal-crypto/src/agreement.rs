//! X25519 key agreement + HKDF-SHA256
//!
//! ```text
//! shared = X25519(local_private, remote_public)
//! key    = HKDF-SHA256(salt = salt, ikm = shared, info = "", L = 32)
//! ```
//!
//! Both parties get the same key only if they pass the same salt. A salt
//! mismatch is not detected here: each side silently derives a different key
//! and the failure shows up later as `CryptoError::Authentication` on open.

use hkdf::Hkdf;
use sha2::Sha256;

use crate::error::{CryptoError, CryptoResult};
use crate::keypair::{PrivateKey, PublicKey};
use crate::keys::SymmetricKey;
use crate::salt::Salt;
use crate::KEY_SIZE;

/// Derive the symmetric key shared between `local_private` and the owner of
/// `remote_public`.
///
/// `derive_shared_key(a.private, b.public, s) == derive_shared_key(b.private, a.public, s)`.
///
/// Fails with `CryptoError::KeyAgreement` if the exchange is non-contributory
/// (the remote point has low order).
pub fn derive_shared_key(
    local_private: &PrivateKey,
    remote_public: &PublicKey,
    salt: &Salt,
) -> CryptoResult<SymmetricKey> {
    let shared = local_private.secret().diffie_hellman(remote_public.point());
    if !shared.was_contributory() {
        tracing::warn!("key agreement rejected non-contributory remote public key");
        return Err(CryptoError::KeyAgreement);
    }

    salt.warn_if_weak();
    let okm = hkdf_sha256(salt.as_bytes(), shared.as_bytes())?;
    tracing::debug!(salt_len = salt.len(), "derived shared key");
    Ok(SymmetricKey::from_bytes(okm))
}

/// HKDF-SHA256 with empty info and a 32-byte output.
fn hkdf_sha256(salt: &[u8], ikm: &[u8]) -> CryptoResult<[u8; KEY_SIZE]> {
    let hkdf = Hkdf::<Sha256>::new(Some(salt), ikm);
    let mut okm = [0u8; KEY_SIZE];
    hkdf.expand(&[], &mut okm)
        .map_err(|e| CryptoError::InvalidParameters(format!("HKDF expand failed: {e}")))?;
    Ok(okm)
}

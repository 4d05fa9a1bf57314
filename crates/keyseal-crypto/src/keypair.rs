//! X25519 key pairs

use x25519_dalek::StaticSecret;

use crate::error::{fill_random, CryptoResult};
use crate::KEY_SIZE;

/// An X25519 private scalar. Zeroized on drop.
///
/// Capability-bearing secret: store it the way you would a keychain entry.
#[derive(Clone)]
pub struct PrivateKey {
    secret: StaticSecret,
}

impl PrivateKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self {
            secret: StaticSecret::from(bytes),
        }
    }

    /// Raw 32-byte scalar, exactly as it was generated or imported.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        self.secret.as_bytes()
    }

    /// The matching public key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            point: x25519_dalek::PublicKey::from(&self.secret),
        }
    }

    pub(crate) fn secret(&self) -> &StaticSecret {
        &self.secret
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// An X25519 public point. Safe to broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicKey {
    point: x25519_dalek::PublicKey,
}

impl PublicKey {
    /// Wraps raw point bytes without validation; use `codec::import_public_key`
    /// for untrusted input.
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self {
            point: x25519_dalek::PublicKey::from(bytes),
        }
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        self.point.as_bytes()
    }

    pub(crate) fn point(&self) -> &x25519_dalek::PublicKey {
        &self.point
    }
}

/// A private key and the public key computed from it. Immutable once built.
#[derive(Debug, Clone)]
pub struct KeyPair {
    private: PrivateKey,
    public: PublicKey,
}

impl KeyPair {
    pub fn from_private(private: PrivateKey) -> Self {
        let public = private.public_key();
        Self { private, public }
    }

    pub fn private_key(&self) -> &PrivateKey {
        &self.private
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    pub fn into_parts(self) -> (PrivateKey, PublicKey) {
        (self.private, self.public)
    }
}

/// Generate a fresh X25519 key pair from the OS random source.
///
/// Fails only with `CryptoError::Entropy`, which callers must treat as fatal.
pub fn generate_key_pair() -> CryptoResult<KeyPair> {
    let mut scalar = [0u8; KEY_SIZE];
    fill_random(&mut scalar)?;
    let private = PrivateKey::from_bytes(scalar);
    zeroize::Zeroize::zeroize(&mut scalar);

    let pair = KeyPair::from_private(private);
    tracing::debug!("generated X25519 key pair");
    Ok(pair)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keypair_generation() {
        let a = generate_key_pair().unwrap();
        let b = generate_key_pair().unwrap();

        assert_ne!(a.private_key().as_bytes(), b.private_key().as_bytes());
        assert_ne!(a.public_key(), b.public_key());
    }

    #[test]
    fn test_public_derived_from_private() {
        let pair = generate_key_pair().unwrap();
        let rebuilt = PrivateKey::from_bytes(*pair.private_key().as_bytes());

        assert_eq!(&rebuilt.public_key(), pair.public_key());
    }

    #[test]
    fn test_rfc7748_public_key() {
        // RFC 7748 section 6.1, Alice
        let scalar: [u8; 32] =
            hex::decode("77076d0a7318a57d3c16c17251b26645df4c2f87ebc0992ab177fba51db92c2a")
                .unwrap()
                .try_into()
                .unwrap();
        let public = PrivateKey::from_bytes(scalar).public_key();

        assert_eq!(
            hex::encode(public.as_bytes()),
            "8520f0098930a754748b7ddcb43ef75a0dbf3a0d26381af4eba4a98eaa9b4e6a"
        );
    }

    #[test]
    fn test_private_debug_redacted() {
        let pair = generate_key_pair().unwrap();
        assert!(format!("{:?}", pair.private_key()).contains("REDACTED"));
    }
}

//! Base64 key export/import
//!
//! Keys travel as standard-alphabet, padded base64 of their raw 32 bytes.
//! Storage and transport layers must keep the string verbatim, padding
//! included.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use x25519_dalek::StaticSecret;
use zeroize::Zeroize;

use crate::error::{CryptoError, CryptoResult};
use crate::keypair::{PrivateKey, PublicKey};
use crate::KEY_SIZE;

pub fn export_private_key(key: &PrivateKey) -> String {
    STANDARD.encode(key.as_bytes())
}

pub fn export_public_key(key: &PublicKey) -> String {
    STANDARD.encode(key.as_bytes())
}

/// Decode a private key exported by [`export_private_key`].
///
/// Every 32-byte string is a usable X25519 scalar, so only the length is checked.
pub fn import_private_key(encoded: &str) -> CryptoResult<PrivateKey> {
    let mut raw = STANDARD.decode(encoded.trim())?;
    let bytes = to_key_bytes(&raw);
    raw.zeroize();
    let mut bytes = bytes?;
    let key = PrivateKey::from_bytes(bytes);
    bytes.zeroize();
    Ok(key)
}

/// Decode a public key exported by [`export_public_key`], rejecting
/// low-order points.
pub fn import_public_key(encoded: &str) -> CryptoResult<PublicKey> {
    let raw = STANDARD.decode(encoded.trim())?;
    let key = PublicKey::from_bytes(to_key_bytes(&raw)?);
    if is_low_order(&key) {
        tracing::warn!("rejected low-order public key on import");
        return Err(CryptoError::LowOrderPoint);
    }
    Ok(key)
}

fn to_key_bytes(raw: &[u8]) -> CryptoResult<[u8; KEY_SIZE]> {
    raw.try_into().map_err(|_| CryptoError::KeyFormat {
        expected: KEY_SIZE,
        actual: raw.len(),
    })
}

/// A point of order dividing 8 maps every clamped scalar to the identity,
/// so any fixed probe scalar exposes it.
pub(crate) fn is_low_order(key: &PublicKey) -> bool {
    let probe = StaticSecret::from([1u8; KEY_SIZE]);
    !probe.diffie_hellman(key.point()).was_contributory()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keypair::generate_key_pair;

    #[test]
    fn test_private_key_roundtrip() {
        let pair = generate_key_pair().unwrap();
        let exported = export_private_key(pair.private_key());
        let imported = import_private_key(&exported).unwrap();

        assert_eq!(imported.as_bytes(), pair.private_key().as_bytes());
        assert_eq!(&imported.public_key(), pair.public_key());
    }

    #[test]
    fn test_public_key_roundtrip() {
        let pair = generate_key_pair().unwrap();
        let exported = export_public_key(pair.public_key());
        let imported = import_public_key(&exported).unwrap();

        assert_eq!(&imported, pair.public_key());
    }

    #[test]
    fn test_export_is_padded_base64() {
        let pair = generate_key_pair().unwrap();
        let exported = export_public_key(pair.public_key());

        // 32 bytes -> 44 chars with one '=' of padding
        assert_eq!(exported.len(), 44);
        assert!(exported.ends_with('='));
    }

    #[test]
    fn test_import_malformed_base64() {
        let result = import_public_key("this is *not* base64");
        assert!(matches!(result, Err(CryptoError::Decode(_))));

        let result = import_private_key("@@@@");
        assert!(matches!(result, Err(CryptoError::Decode(_))));
    }

    #[test]
    fn test_import_wrong_length() {
        let short = STANDARD.encode([9u8; 31]);
        assert!(matches!(
            import_public_key(&short),
            Err(CryptoError::KeyFormat {
                expected: 32,
                actual: 31
            })
        ));

        let long = STANDARD.encode([9u8; 33]);
        assert!(matches!(
            import_private_key(&long),
            Err(CryptoError::KeyFormat {
                expected: 32,
                actual: 33
            })
        ));
    }

    #[test]
    fn test_import_rejects_low_order_points() {
        // identity (u = 0) and the order-2 point (u = 1)
        let mut one = [0u8; 32];
        one[0] = 1;
        for point in [[0u8; 32], one] {
            let encoded = STANDARD.encode(point);
            assert!(
                matches!(import_public_key(&encoded), Err(CryptoError::LowOrderPoint)),
                "low-order point must be rejected"
            );
        }
    }

    #[test]
    fn test_import_trims_whitespace() {
        let pair = generate_key_pair().unwrap();
        let exported = format!("{}\n", export_public_key(pair.public_key()));
        assert_eq!(&import_public_key(&exported).unwrap(), pair.public_key());
    }
}

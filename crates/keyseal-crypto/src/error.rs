use thiserror::Error;

pub type CryptoResult<T> = Result<T, CryptoError>;

/// Every failure the core can report.
///
/// Messages never include key material or plaintext.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("decode error: {0}")]
    Decode(String),

    #[error("invalid key length: expected {expected} bytes, got {actual}")]
    KeyFormat { expected: usize, actual: usize },

    #[error("invalid key: low-order curve point")]
    LowOrderPoint,

    #[error("key agreement failed: remote public key rejected")]
    KeyAgreement,

    /// Uniform for wrong key, tampering, truncation and AAD mismatch.
    #[error("authentication failed")]
    Authentication,

    #[error("password must not be empty")]
    EmptyPassword,

    #[error("secure random source unavailable: {0}")]
    Entropy(String),

    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CryptoError {
    /// Only an entropy failure is unrecoverable; the caller must abort.
    pub fn is_fatal(&self) -> bool {
        matches!(self, CryptoError::Entropy(_))
    }

    /// Stable label for log fields and programmatic branching.
    pub fn kind(&self) -> &'static str {
        match self {
            CryptoError::Decode(_) => "decode",
            CryptoError::KeyFormat { .. } | CryptoError::LowOrderPoint => "key_format",
            CryptoError::KeyAgreement => "key_agreement",
            CryptoError::Authentication => "authentication",
            CryptoError::EmptyPassword => "empty_password",
            CryptoError::Entropy(_) => "entropy",
            CryptoError::InvalidParameters(_) => "invalid_parameters",
            CryptoError::Io(_) => "io",
        }
    }
}

impl From<base64::DecodeError> for CryptoError {
    fn from(e: base64::DecodeError) -> Self {
        CryptoError::Decode(format!("base64: {e}"))
    }
}

impl From<hex::FromHexError> for CryptoError {
    fn from(e: hex::FromHexError) -> Self {
        CryptoError::Decode(format!("hex: {e}"))
    }
}

impl From<serde_json::Error> for CryptoError {
    fn from(e: serde_json::Error) -> Self {
        CryptoError::Decode(format!("json: {e}"))
    }
}

/// Fill `buf` from the OS random source, surfacing exhaustion instead of panicking.
pub(crate) fn fill_random(buf: &mut [u8]) -> CryptoResult<()> {
    use rand::RngCore;
    rand::rngs::OsRng
        .try_fill_bytes(buf)
        .map_err(|e| CryptoError::Entropy(e.to_string()))
}

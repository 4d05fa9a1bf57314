use thiserror::Error;

pub type KeysealResult<T> = Result<T, KeysealError>;

#[derive(Debug, Error)]
pub enum KeysealError {
    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

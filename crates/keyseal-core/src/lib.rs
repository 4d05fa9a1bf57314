pub mod config;
pub mod error;

pub use config::KeysealConfig;
pub use error::{KeysealError, KeysealResult};

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{KeysealError, KeysealResult};

/// Longest salt the CLI will request
const MAX_SALT_LEN: usize = 1024;

/// Top-level configuration (loaded from keyseal.toml)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeysealConfig {
    pub logging: LoggingConfig,
    pub crypto: CryptoConfig,
}

impl KeysealConfig {
    /// Load from `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> KeysealResult<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| KeysealError::Config(format!("parsing {}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> KeysealResult<()> {
        match self.logging.format.as_str() {
            "text" | "json" => {}
            other => {
                return Err(KeysealError::Config(format!(
                    "logging.format must be \"text\" or \"json\", got \"{other}\""
                )))
            }
        }
        match self.crypto.password_kdf.as_str() {
            "sha256" | "argon2id" => {}
            other => {
                return Err(KeysealError::Config(format!(
                    "crypto.password_kdf must be \"sha256\" or \"argon2id\", got \"{other}\""
                )))
            }
        }
        match self.crypto.cipher.to_ascii_lowercase().as_str() {
            "chacha20-poly1305" | "chacha20poly1305" | "aes-256-gcm" | "aes256gcm" => {}
            _ => {
                return Err(KeysealError::Config(format!(
                    "crypto.cipher must be \"chacha20-poly1305\" or \"aes-256-gcm\", got \"{}\"",
                    self.crypto.cipher
                )))
            }
        }
        let argon2 = [
            ("argon2_mem_cost_kib", self.crypto.argon2_mem_cost_kib),
            ("argon2_time_cost", self.crypto.argon2_time_cost),
            ("argon2_parallelism", self.crypto.argon2_parallelism),
        ];
        for (name, value) in argon2 {
            if value == 0 {
                return Err(KeysealError::Config(format!("crypto.{name} must be > 0")));
            }
        }
        if self.crypto.salt_len == 0 || self.crypto.salt_len > MAX_SALT_LEN {
            return Err(KeysealError::Config(format!(
                "crypto.salt_len must be in 1..={MAX_SALT_LEN}"
            )));
        }
        Ok(())
    }

    pub fn to_toml(&self) -> KeysealResult<String> {
        toml::to_string_pretty(self).map_err(|e| KeysealError::Config(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (default: info)
    pub level: String,
    /// Log format: "json" or "text"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

/// Cipher and key-derivation choices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CryptoConfig {
    /// AEAD suite: "chacha20-poly1305" (default) or "aes-256-gcm"
    pub cipher: String,
    /// Password KDF: "sha256" (single round) or "argon2id"
    pub password_kdf: String,
    /// Argon2id memory cost in KiB (default: 65536 = 64 MiB)
    pub argon2_mem_cost_kib: u32,
    /// Argon2id time cost (iterations, default: 3)
    pub argon2_time_cost: u32,
    /// Argon2id parallelism (default: 4)
    pub argon2_parallelism: u32,
    /// Length in bytes of freshly generated salts (default: 16)
    pub salt_len: usize,
}

impl Default for CryptoConfig {
    fn default() -> Self {
        Self {
            cipher: "chacha20-poly1305".into(),
            password_kdf: "sha256".into(),
            argon2_mem_cost_kib: 65536,
            argon2_time_cost: 3,
            argon2_parallelism: 4,
            salt_len: 16,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
[logging]
level = "debug"
format = "json"

[crypto]
cipher = "aes-256-gcm"
password_kdf = "argon2id"
argon2_mem_cost_kib = 131072
argon2_time_cost = 4
argon2_parallelism = 8
salt_len = 32
"#;
        let config: KeysealConfig = toml::from_str(toml_str).unwrap();

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.crypto.cipher, "aes-256-gcm");
        assert_eq!(config.crypto.password_kdf, "argon2id");
        assert_eq!(config.crypto.argon2_mem_cost_kib, 131072);
        assert_eq!(config.crypto.argon2_parallelism, 8);
        assert_eq!(config.crypto.salt_len, 32);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_defaults() {
        let config: KeysealConfig = toml::from_str("").unwrap();

        assert_eq!(config, KeysealConfig::default());
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.crypto.cipher, "chacha20-poly1305");
        assert_eq!(config.crypto.password_kdf, "sha256");
        assert_eq!(config.crypto.salt_len, 16);
    }

    #[test]
    fn test_parse_partial_config() {
        let toml_str = r#"
[crypto]
password_kdf = "argon2id"
"#;
        let config: KeysealConfig = toml::from_str(toml_str).unwrap();

        // Overridden
        assert_eq!(config.crypto.password_kdf, "argon2id");
        // Defaults
        assert_eq!(config.crypto.argon2_time_cost, 3);
        assert_eq!(config.logging.format, "text");
    }

    #[test]
    fn test_validate_rejects_unknown_values() {
        let mut config = KeysealConfig::default();
        config.crypto.password_kdf = "md5".into();
        assert!(matches!(config.validate(), Err(KeysealError::Config(_))));

        let mut config = KeysealConfig::default();
        config.logging.format = "xml".into();
        assert!(config.validate().is_err());

        let mut config = KeysealConfig::default();
        config.crypto.salt_len = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_cipher_and_argon2_costs() {
        let mut config = KeysealConfig::default();
        config.crypto.cipher = "AES256GCM".into();
        assert!(config.validate().is_ok());

        config.crypto.cipher = "rot13".into();
        assert!(matches!(config.validate(), Err(KeysealError::Config(_))));

        for zeroed in 0..3 {
            let mut config = KeysealConfig::default();
            match zeroed {
                0 => config.crypto.argon2_mem_cost_kib = 0,
                1 => config.crypto.argon2_time_cost = 0,
                _ => config.crypto.argon2_parallelism = 0,
            }
            assert!(config.validate().is_err(), "zero argon2 cost #{zeroed} accepted");
        }

        let mut config = KeysealConfig::default();
        config.crypto.salt_len = 4096;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_rejects_unknown_cipher() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("keyseal.toml");
        std::fs::write(&path, "[crypto]\ncipher = \"des\"\n").unwrap();

        assert!(matches!(
            KeysealConfig::load(&path),
            Err(KeysealError::Config(_))
        ));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = KeysealConfig::load(&tmp.path().join("absent.toml")).unwrap();
        assert_eq!(config, KeysealConfig::default());
    }

    #[test]
    fn test_load_invalid_toml() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("keyseal.toml");
        std::fs::write(&path, "[crypto\nsalt_len = ").unwrap();

        assert!(matches!(
            KeysealConfig::load(&path),
            Err(KeysealError::Config(_))
        ));
    }

    #[test]
    fn test_serialize_roundtrip() {
        let config = KeysealConfig::default();
        let toml_str = config.to_toml().unwrap();
        let parsed: KeysealConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(config, parsed);
    }
}

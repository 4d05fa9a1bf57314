//! keyseal: key agreement and sealed-envelope CLI
//!
//! Commands:
//!   keygen [--out <dir>]                         - new X25519 key pair (base64)
//!   salt [--len N]                               - fresh random salt (base64)
//!   derive --private K --public K --salt HEX     - shared key (base64)
//!   seal/open --key K --input F --output F       - AEAD envelope over a file
//!   export/import --input F --output F           - password-protected bundle
//!   config show                                  - effective configuration
//!
//! Key arguments take base64 directly or `@path` to read it from a file.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use secrecy::SecretString;
use std::path::{Path, PathBuf};
use tracing::info;

use keyseal_core::config::{CryptoConfig, KeysealConfig};
use keyseal_crypto::{
    derive_shared_key, export_private_key, export_public_key, generate_key_pair,
    import_bundle, import_private_key, import_public_key, random_salt, AeadCipher, BundleExport,
    CipherSuite, ExportBundle, KdfParams, PasswordKdf, Salt, SealedEnvelope, SymmetricKey,
};

// ── CLI structure ──────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "keyseal", version, about = "X25519 key agreement and AEAD envelopes")]
struct Cli {
    /// Path to keyseal.toml configuration file
    #[arg(long, short = 'c', env = "KEYSEAL_CONFIG", default_value = "keyseal.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long, env = "KEYSEAL_LOG")]
    log: Option<String>,

    /// Log format; overrides the config file
    #[arg(long, env = "KEYSEAL_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Debug, ValueEnum)]
enum LogFormat {
    Json,
    Text,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate an X25519 key pair
    Keygen {
        /// Write private.key and public.key into this directory instead of printing
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Print a fresh random salt (base64)
    Salt {
        /// Salt length in bytes (default: crypto.salt_len)
        #[arg(long)]
        len: Option<usize>,
    },

    /// Derive the shared symmetric key for a local private key and a remote public key
    Derive {
        /// Local private key (base64 or @path)
        #[arg(long)]
        private: String,
        /// Remote public key (base64 or @path)
        #[arg(long)]
        public: String,
        /// Salt as hex; both parties must use the same value
        #[arg(long)]
        salt: String,
    },

    /// Seal a file under a symmetric key
    Seal {
        #[command(flatten)]
        io: EnvelopeArgs,
    },

    /// Open a sealed file
    Open {
        #[command(flatten)]
        io: EnvelopeArgs,
    },

    /// Password-protect a file as a JSON export bundle
    Export {
        #[arg(long, short = 'i')]
        input: PathBuf,
        #[arg(long, short = 'o')]
        output: PathBuf,
    },

    /// Recover a file from an export bundle
    Import {
        #[arg(long, short = 'i')]
        input: PathBuf,
        #[arg(long, short = 'o')]
        output: PathBuf,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Args, Debug)]
struct EnvelopeArgs {
    /// Symmetric key (base64 or @path)
    #[arg(long, short = 'k')]
    key: String,
    #[arg(long, short = 'i')]
    input: PathBuf,
    #[arg(long, short = 'o')]
    output: PathBuf,
    /// Associated data bound into the tag
    #[arg(long, default_value = "")]
    aad: String,
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the active configuration (merged defaults + config file)
    Show,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = KeysealConfig::load(&cli.config)
        .with_context(|| format!("loading config: {}", cli.config.display()))?;

    let level = cli.log.clone().unwrap_or_else(|| config.logging.level.clone());
    let format = cli.log_format.clone().unwrap_or(match config.logging.format.as_str() {
        "json" => LogFormat::Json,
        _ => LogFormat::Text,
    });
    init_logging(&level, &format);

    match cli.command {
        Commands::Keygen { out } => cmd_keygen(out.as_deref()),
        Commands::Salt { len } => cmd_salt(len.unwrap_or(config.crypto.salt_len)),
        Commands::Derive {
            private,
            public,
            salt,
        } => cmd_derive(&private, &public, &salt),
        Commands::Seal { io } => cmd_seal(&config.crypto, &io),
        Commands::Open { io } => cmd_open(&config.crypto, &io),
        Commands::Export { input, output } => cmd_export(&config.crypto, &input, &output),
        Commands::Import { input, output } => cmd_import(&input, &output),
        Commands::Config {
            action: ConfigAction::Show,
        } => cmd_config_show(&config, &cli.config),
    }
}

fn init_logging(level: &str, format: &LogFormat) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}

// ── Config → crypto parameters ────────────────────────────────────────────────

fn cipher_suite(config: &CryptoConfig) -> Result<CipherSuite> {
    config
        .cipher
        .parse::<CipherSuite>()
        .with_context(|| format!("crypto.cipher = \"{}\"", config.cipher))
}

fn password_kdf(config: &CryptoConfig) -> Result<PasswordKdf> {
    match config.password_kdf.as_str() {
        "sha256" => Ok(PasswordKdf::Sha256),
        "argon2id" => Ok(PasswordKdf::Argon2id(KdfParams {
            mem_cost_kib: config.argon2_mem_cost_kib,
            time_cost: config.argon2_time_cost,
            parallelism: config.argon2_parallelism,
        })),
        other => anyhow::bail!("unknown crypto.password_kdf: {other}"),
    }
}

/// Resolve a key argument: literal base64, or `@path` to read it from a file.
fn key_arg(arg: &str) -> Result<String> {
    match arg.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading key file: {path}")),
        None => Ok(arg.to_string()),
    }
}

fn read_password(confirm: bool) -> Result<SecretString> {
    if let Ok(password) = std::env::var("KEYSEAL_PASSWORD") {
        return Ok(SecretString::from(password));
    }
    let password = rpassword::prompt_password("Password: ").context("reading password")?;
    if confirm {
        let again = rpassword::prompt_password("Confirm password: ").context("reading password")?;
        if again != password {
            anyhow::bail!("passwords do not match");
        }
    }
    Ok(SecretString::from(password))
}

// ── Commands ──────────────────────────────────────────────────────────────────

fn cmd_keygen(out: Option<&Path>) -> Result<()> {
    let pair = generate_key_pair()?;
    let private = export_private_key(pair.private_key());
    let public = export_public_key(pair.public_key());

    match out {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating dir: {}", dir.display()))?;
            let private_path = dir.join("private.key");
            write_private(&private_path, private.as_bytes())?;
            std::fs::write(dir.join("public.key"), &public)
                .with_context(|| format!("writing {}", dir.join("public.key").display()))?;
            info!(dir = %dir.display(), "wrote key pair");
            println!("{public}");
        }
        None => {
            println!("private: {private}");
            println!("public:  {public}");
        }
    }
    Ok(())
}

#[cfg(unix)]
fn write_private(path: &Path, contents: &[u8]) -> Result<()> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
        .with_context(|| format!("creating {}", path.display()))?;
    file.write_all(contents)
        .with_context(|| format!("writing {}", path.display()))
}

#[cfg(not(unix))]
fn write_private(path: &Path, contents: &[u8]) -> Result<()> {
    std::fs::write(path, contents).with_context(|| format!("writing {}", path.display()))
}

fn cmd_salt(len: usize) -> Result<()> {
    println!("{}", random_salt(len)?.to_base64());
    Ok(())
}

fn cmd_derive(private: &str, public: &str, salt: &str) -> Result<()> {
    let private = import_private_key(&key_arg(private)?).context("importing private key")?;
    let public = import_public_key(&key_arg(public)?).context("importing public key")?;
    let salt = Salt::from_hex(salt).context("parsing salt hex")?;

    let key = derive_shared_key(&private, &public, &salt)?;
    println!("{}", key.to_base64());
    Ok(())
}

fn cmd_seal(config: &CryptoConfig, io: &EnvelopeArgs) -> Result<()> {
    let key = SymmetricKey::from_base64(&key_arg(&io.key)?).context("parsing key")?;
    let cipher = AeadCipher::new(cipher_suite(config)?);
    let data = std::fs::read(&io.input)
        .with_context(|| format!("reading {}", io.input.display()))?;

    let envelope = cipher.seal_with_aad(&data, io.aad.as_bytes(), &key)?;
    std::fs::write(&io.output, envelope.as_bytes())
        .with_context(|| format!("writing {}", io.output.display()))?;
    info!(output = %io.output.display(), bytes = envelope.len(), "sealed");
    Ok(())
}

fn cmd_open(config: &CryptoConfig, io: &EnvelopeArgs) -> Result<()> {
    let key = SymmetricKey::from_base64(&key_arg(&io.key)?).context("parsing key")?;
    let cipher = AeadCipher::new(cipher_suite(config)?);
    let envelope = SealedEnvelope::from_bytes(
        std::fs::read(&io.input).with_context(|| format!("reading {}", io.input.display()))?,
    );

    let data = cipher.open_with_aad(&envelope, io.aad.as_bytes(), &key)?;
    std::fs::write(&io.output, &data)
        .with_context(|| format!("writing {}", io.output.display()))?;
    info!(output = %io.output.display(), bytes = data.len(), "opened");
    Ok(())
}

fn cmd_export(config: &CryptoConfig, input: &Path, output: &Path) -> Result<()> {
    let data = std::fs::read(input).with_context(|| format!("reading {}", input.display()))?;
    let password = read_password(true)?;

    let exporter = BundleExport::new()
        .with_kdf(password_kdf(config)?)
        .with_cipher(cipher_suite(config)?)
        .with_salt_len(config.salt_len);
    exporter.export_bundle_to_file(output, &password, &data)?;
    Ok(())
}

fn cmd_import(input: &Path, output: &Path) -> Result<()> {
    let bundle = ExportBundle::read_from_file(input)
        .with_context(|| format!("reading bundle {}", input.display()))?;
    let password = read_password(false)?;

    let data = import_bundle(&password, &bundle)?;
    std::fs::write(output, &data).with_context(|| format!("writing {}", output.display()))?;
    info!(output = %output.display(), bytes = data.len(), "imported");
    Ok(())
}

fn cmd_config_show(config: &KeysealConfig, config_path: &Path) -> Result<()> {
    if config_path.exists() {
        println!("# Configuration from: {}", config_path.display());
    } else {
        println!("# Configuration: defaults (no file at {})", config_path.display());
    }
    println!();
    print!("{}", config.to_toml()?);
    Ok(())
}

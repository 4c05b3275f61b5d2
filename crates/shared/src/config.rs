//! Application configuration management.

use std::collections::HashMap;
use std::path::PathBuf;

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration.
///
/// Every section has defaults, so an empty configuration source is valid.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Deployment environment.
    #[serde(default)]
    pub environment: Environment,
    /// Identifier generation settings.
    #[serde(default)]
    pub numbering: NumberingConfig,
    /// Double-entry and reconciliation settings.
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Attachment storage settings.
    #[serde(default)]
    pub storage: StorageSettings,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development: internal error details are exposed.
    #[default]
    Development,
    /// Production: internal error details are hidden from clients.
    Production,
}

impl Environment {
    /// Returns true if internal error details may be shown to clients.
    #[must_use]
    pub const fn exposes_internal_errors(self) -> bool {
        matches!(self, Self::Development)
    }
}

/// Identifier generation configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct NumberingConfig {
    /// Zero-padding width of sequence counters (`0001` for width 4).
    #[serde(default = "default_sequence_width")]
    pub sequence_width: usize,
    /// Prefix overrides keyed by entity kind name (e.g. `cash_payment = "CPV"`).
    ///
    /// An empty string removes the mapping for that kind.
    #[serde(default)]
    pub prefixes: HashMap<String, String>,
}

fn default_sequence_width() -> usize {
    4
}

impl Default for NumberingConfig {
    fn default() -> Self {
        Self {
            sequence_width: default_sequence_width(),
            prefixes: HashMap::new(),
        }
    }
}

/// Ledger configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Maximum accepted difference between debit and credit totals,
    /// and between statement and adjusted balances.
    #[serde(default = "default_balance_tolerance")]
    pub balance_tolerance: Decimal,
    /// Default currency code for vouchers that do not name one.
    #[serde(default = "default_currency")]
    pub default_currency: String,
}

fn default_balance_tolerance() -> Decimal {
    Decimal::new(1, 2)
}

fn default_currency() -> String {
    "USD".to_string()
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            balance_tolerance: default_balance_tolerance(),
            default_currency: default_currency(),
        }
    }
}

/// Attachment storage backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// In-process memory (tests, seeder).
    #[default]
    Memory,
    /// Local filesystem rooted at `StorageSettings::root`.
    LocalFs,
}

/// Attachment storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Storage backend.
    #[serde(default)]
    pub backend: StorageBackend,
    /// Root directory for the filesystem backend.
    #[serde(default = "default_storage_root")]
    pub root: PathBuf,
    /// Maximum attachment size in bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    /// Allowed MIME types; empty means the built-in default list.
    #[serde(default)]
    pub allowed_mime_types: Vec<String>,
}

fn default_storage_root() -> PathBuf {
    PathBuf::from("./data/attachments")
}

fn default_max_file_size() -> u64 {
    10 * 1024 * 1024
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            root: default_storage_root(),
            max_file_size: default_max_file_size(),
            allowed_mime_types: Vec::new(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

fn default_log_filter() -> String {
    "tallybook=debug,seeder=info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Loads configuration from config files and the environment.
    ///
    /// Sources, later ones overriding earlier ones:
    /// `config/default`, `config/{RUN_MODE}`, then `TALLYBOOK__SECTION__KEY` variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("TALLYBOOK")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

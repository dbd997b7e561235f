//! Configuration loading and path resolution
//!
//! Bootstrap settings come from a TOML file. Each path setting resolves in
//! priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. OS-dependent compiled default (fallback)
//!
//! A missing TOML file is not fatal: a warning is logged and defaults are used.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, warn};

pub const DEFAULT_PR_PORT: u16 = 5810;
pub const DEFAULT_IP_PORT: u16 = 5811;

pub const DATA_FILE_ENV: &str = "MEDREC_DATA_FILE";
pub const DATABASE_ENV: &str = "MEDREC_DATABASE";
pub const MODEL_ENV: &str = "MEDREC_MODEL";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub model: ModelConfig,

    /// User-input literal lists for the premium model
    #[serde(default)]
    pub literals: Literals,
}

/// Which store implementation backs the patient registry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Single JSON object file
    #[default]
    Json,
    /// Single SQLite table
    Sqlite,
}

impl StorageBackend {
    pub fn as_str(self) -> &'static str {
        match self {
            StorageBackend::Json => "json",
            StorageBackend::Sqlite => "sqlite",
        }
    }
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(StorageBackend::Json),
            "sqlite" => Ok(StorageBackend::Sqlite),
            other => Err(format!("unknown storage backend '{}', expected json or sqlite", other)),
        }
    }
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// JSON store file (json backend)
    #[serde(default)]
    pub data_file: Option<PathBuf>,

    /// SQLite database file (sqlite backend)
    #[serde(default)]
    pub database_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_pr_port")]
    pub pr_port: u16,

    #[serde(default = "default_ip_port")]
    pub ip_port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            pr_port: DEFAULT_PR_PORT,
            ip_port: DEFAULT_IP_PORT,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); RUST_LOG overrides
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelConfig {
    /// Premium classifier JSON file
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Allowed occupations and city tier lists
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Literals {
    #[serde(default = "default_occupations")]
    pub occupations: Vec<String>,

    #[serde(default = "default_tier_1_cities")]
    pub tier_1_cities: Vec<String>,

    #[serde(default = "default_tier_2_cities")]
    pub tier_2_cities: Vec<String>,
}

impl Default for Literals {
    fn default() -> Self {
        Self {
            occupations: default_occupations(),
            tier_1_cities: default_tier_1_cities(),
            tier_2_cities: default_tier_2_cities(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_pr_port() -> u16 {
    DEFAULT_PR_PORT
}

fn default_ip_port() -> u16 {
    DEFAULT_IP_PORT
}

fn default_log_level() -> String {
    "info".to_string()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_occupations() -> Vec<String> {
    strings(&[
        "retired",
        "freelancer",
        "student",
        "government_job",
        "business_owner",
        "unemployed",
        "private_job",
    ])
}

fn default_tier_1_cities() -> Vec<String> {
    strings(&[
        "Mumbai", "Delhi", "Bangalore", "Chennai", "Kolkata", "Hyderabad", "Pune",
    ])
}

fn default_tier_2_cities() -> Vec<String> {
    strings(&[
        "Jaipur", "Chandigarh", "Indore", "Lucknow", "Patna", "Ranchi", "Visakhapatnam",
        "Coimbatore", "Bhopal", "Nagpur", "Vadodara", "Surat", "Rajkot", "Jodhpur", "Raipur",
        "Amritsar", "Varanasi", "Agra", "Dehradun", "Mysore", "Jabalpur", "Guwahati",
        "Thiruvananthapuram", "Ludhiana", "Nashik", "Allahabad", "Udaipur", "Aurangabad",
        "Hubli", "Belgaum", "Salem", "Vijayawada", "Tiruchirappalli", "Bhavnagar", "Gwalior",
        "Dhanbad", "Bareilly", "Aligarh", "Gaya", "Kozhikode", "Warangal", "Kolhapur",
        "Bilaspur", "Jalandhar", "Noida", "Guntur", "Asansol", "Siliguri",
    ])
}

impl TomlConfig {
    /// Parse a TOML file; a missing or malformed file is an error
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
    }

    /// Explicit path must exist; the default location may be absent
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            let config = Self::load(path)?;
            info!("Loaded configuration from {}", path.display());
            return Ok(config);
        }

        match default_config_path() {
            Some(path) if path.exists() => {
                let config = Self::load(&path)?;
                info!("Loaded configuration from {}", path.display());
                Ok(config)
            }
            Some(path) => {
                warn!(
                    "No config file at {}, using built-in defaults",
                    path.display()
                );
                Ok(Self::default())
            }
            None => {
                warn!("Could not determine config directory, using built-in defaults");
                Ok(Self::default())
            }
        }
    }
}

/// `<config_dir>/medrec/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("medrec").join("config.toml"))
}

/// OS-dependent data directory
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("medrec"))
        .unwrap_or_else(|| PathBuf::from("./medrec_data"))
}

/// Resolve one path setting through CLI, environment, TOML, then default
pub fn resolve_path(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    toml_value: Option<&Path>,
    default: impl FnOnce() -> PathBuf,
) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Some(path) = toml_value {
        return path.to_path_buf();
    }

    // Priority 4: compiled default
    default()
}

impl StorageConfig {
    pub fn resolve_data_file(&self, cli_arg: Option<&Path>) -> PathBuf {
        resolve_path(cli_arg, DATA_FILE_ENV, self.data_file.as_deref(), || {
            default_data_dir().join("patient_data.json")
        })
    }

    pub fn resolve_database_path(&self, cli_arg: Option<&Path>) -> PathBuf {
        resolve_path(cli_arg, DATABASE_ENV, self.database_path.as_deref(), || {
            default_data_dir().join("patient_database.db")
        })
    }
}

impl ModelConfig {
    pub fn resolve_path(&self, cli_arg: Option<&Path>) -> PathBuf {
        resolve_path(cli_arg, MODEL_ENV, self.path.as_deref(), || {
            default_data_dir().join("insurance_premium_model.json")
        })
    }
}

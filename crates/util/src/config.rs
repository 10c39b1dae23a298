use std::{env, fmt, net::SocketAddr};

use ssl_dashboard_core::classifier::DEFAULT_EXPIRING_SOON_DAYS;

use super::server_bind_address;

/// Application runtime environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
    Test,
}

impl Environment {
    fn from_str(value: &str) -> Result<Self, ConfigError> {
        match value {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            "test" => Ok(Self::Test),
            other => Err(ConfigError::InvalidEnvironment(other.to_string())),
        }
    }

    /// Returns the canonical name used for logging/metrics labels.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Test => "test",
        }
    }
}

/// How SSL statuses are reported on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusMode {
    /// Report the status stored when the record was last written.
    #[default]
    Snapshot,
    /// Derive the status from the expiry date at request time.
    Recompute,
}

impl StatusMode {
    fn from_str(value: &str) -> Result<Self, ConfigError> {
        match value {
            "snapshot" => Ok(Self::Snapshot),
            "recompute" => Ok(Self::Recompute),
            other => Err(ConfigError::InvalidStatusMode(other.to_string())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Snapshot => "snapshot",
            Self::Recompute => "recompute",
        }
    }
}

/// Runtime configuration resolved from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub environment: Environment,
    pub status_mode: StatusMode,
    pub expiring_soon_days: i64,
    pub seed_sample_domains: bool,
}

impl AppConfig {
    /// Constructs the configuration by reading and validating environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let env_value = env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
        let environment = Environment::from_str(&env_value)?;
        let bind_addr = server_bind_address().map_err(ConfigError::BindAddress)?;

        let status_mode = match env::var("SSL_STATUS_MODE") {
            Ok(value) => StatusMode::from_str(&value)?,
            Err(_) => StatusMode::default(),
        };

        let expiring_soon_days = match env::var("SSL_EXPIRING_SOON_DAYS") {
            Ok(value) => value
                .parse::<i64>()
                .ok()
                .filter(|days| *days >= 0)
                .ok_or(ConfigError::InvalidExpiringSoonDays(value))?,
            Err(_) => DEFAULT_EXPIRING_SOON_DAYS,
        };

        let seed_sample_domains = match env::var("SEED_SAMPLE_DOMAINS") {
            Ok(value) => parse_flag(&value).ok_or(ConfigError::InvalidSeedFlag(value))?,
            Err(_) => true,
        };

        Ok(Self {
            bind_addr,
            environment,
            status_mode,
            expiring_soon_days,
            seed_sample_domains,
        })
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Errors that can occur during configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    InvalidEnvironment(String),
    BindAddress(std::net::AddrParseError),
    InvalidStatusMode(String),
    InvalidExpiringSoonDays(String),
    InvalidSeedFlag(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEnvironment(value) => write!(
                f,
                "APP_ENV must be one of 'development', 'production', or 'test' (got {value})"
            ),
            Self::BindAddress(err) => write!(f, "invalid APP_BIND_ADDR value: {err}"),
            Self::InvalidStatusMode(value) => write!(
                f,
                "SSL_STATUS_MODE must be 'snapshot' or 'recompute' (got {value})"
            ),
            Self::InvalidExpiringSoonDays(value) => write!(
                f,
                "SSL_EXPIRING_SOON_DAYS must be a non-negative integer (got {value})"
            ),
            Self::InvalidSeedFlag(value) => {
                write!(f, "SEED_SAMPLE_DOMAINS must be a boolean (got {value})")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use bloodreach_core::{Latency, StatsOffsets};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Where donor records are kept.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageBackend {
    /// A JSON key-value file at `DATA_PATH`.
    File,
    /// Process memory. Everything is lost on exit.
    Memory,
    /// PostgreSQL at `DATABASE_URL`.
    Postgres,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "file" => Ok(StorageBackend::File),
            "memory" => Ok(StorageBackend::Memory),
            "postgres" => Ok(StorageBackend::Postgres),
            other => Err(format!("'{}' is not one of file, memory, postgres", other)),
        }
    }
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub app_name: String,
    pub storage_backend: StorageBackend,
    pub data_path: PathBuf,
    pub database_url: Option<String>,
    pub admin_emails: Vec<String>,
    pub latency: Latency,
    pub stats_offsets: StatsOffsets,
    pub cors_origin: String,
    /// Lifetime of a login session, both cookie and stored record.
    pub session_max_age: chrono::Duration,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Server Settings ---
        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let cors_origin = std::env::var("CORS_ORIGIN")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());

        // --- Storage Settings ---
        let app_name = std::env::var("APP_NAME").unwrap_or_else(|_| "bloodreach".to_string());

        let storage_backend = std::env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "file".to_string())
            .parse::<StorageBackend>()
            .map_err(|e| ConfigError::InvalidValue("STORAGE_BACKEND".to_string(), e))?;

        let data_path = std::env::var("DATA_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data/bloodreach.json"));

        let database_url = std::env::var("DATABASE_URL").ok();
        if storage_backend == StorageBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::MissingVar("DATABASE_URL".to_string()));
        }

        // --- Identity Settings ---
        let admin_emails = parse_email_list(
            &std::env::var("ADMIN_EMAILS").unwrap_or_else(|_| "iyeasin44@gmail.com".to_string()),
        );
        let session_max_age = parse_u64_var("SESSION_MAX_AGE_SECS", 30 * 24 * 60 * 60)?;
        let session_max_age = i64::try_from(session_max_age)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .ok_or_else(|| {
                ConfigError::InvalidValue(
                    "SESSION_MAX_AGE_SECS".to_string(),
                    format!("{} seconds is out of range", session_max_age),
                )
            })?;

        // --- Repository Tuning ---
        let latency = Latency {
            read: Duration::from_millis(parse_u64_var("READ_LATENCY_MS", 500)?),
            register: Duration::from_millis(parse_u64_var("REGISTER_LATENCY_MS", 800)?),
        };
        let stats_offsets = StatsOffsets {
            total_donors: parse_u64_var("STATS_TOTAL_OFFSET", 12_400)?,
            lives_saved: parse_u64_var("STATS_LIVES_OFFSET", 35_000)?,
        };

        Ok(Self {
            bind_address,
            log_level,
            app_name,
            storage_backend,
            data_path,
            database_url,
            admin_emails,
            latency,
            stats_offsets,
            cors_origin,
            session_max_age,
        })
    }
}

fn parse_u64_var(name: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}

/// Splits a comma separated list, dropping blanks.
fn parse_email_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|email| !email.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_list_is_trimmed_and_blank_free() {
        assert_eq!(
            parse_email_list(" a@x.org, ,b@y.org,"),
            vec!["a@x.org".to_string(), "b@y.org".to_string()]
        );
    }

    #[test]
    fn storage_backend_names_are_case_insensitive() {
        assert_eq!("Memory".parse::<StorageBackend>(), Ok(StorageBackend::Memory));
        assert_eq!("postgres".parse::<StorageBackend>(), Ok(StorageBackend::Postgres));
        assert!("sqlite".parse::<StorageBackend>().is_err());
    }
}

//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;

use thiserror::Error;

use crate::messages::Locale;

/// Default Firestore REST endpoint.
pub const DEFAULT_FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com/v1";

/// Configuration that cannot be turned into a running server.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("unsupported value {value:?} for {var}")]
    Invalid { var: &'static str, value: String },
}

/// Connection settings for a Firestore database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirestoreSettings {
    /// Google Cloud project id
    pub project_id: String,
    /// Database id, `(default)` unless a named database is used
    pub database: String,
    /// Web API key sent as the `key` query parameter
    pub api_key: Option<String>,
    /// REST endpoint, overridable for the emulator
    pub base_url: String,
}

/// Which document store backs the students collection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StoreBackend {
    /// In-process store; contents are lost on restart
    #[default]
    Memory,
    /// Cloud Firestore over REST
    Firestore(FirestoreSettings),
}

impl StoreBackend {
    pub fn name(&self) -> &'static str {
        match self {
            StoreBackend::Memory => "memory",
            StoreBackend::Firestore(_) => "firestore",
        }
    }
}

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Document store backend
    pub backend: StoreBackend,
    /// Collection holding the student documents
    pub collection: String,
    /// Language of public error messages
    pub locale: Locale,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `STORE_BACKEND` - `memory` or `firestore` (default: memory)
    /// - `STUDENTS_COLLECTION` - Collection name (default: students)
    /// - `MESSAGE_LOCALE` - `en` or `ko` (default: en)
    /// - `FIRESTORE_PROJECT_ID` - Required for the firestore backend
    /// - `FIRESTORE_DATABASE` - Database id (default: `(default)`)
    /// - `FIRESTORE_API_KEY` - Optional web API key
    /// - `FIRESTORE_BASE_URL` - REST endpoint (default: the public API)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Creates a Config reading variables through `lookup`.
    ///
    /// Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        let locale = match var("MESSAGE_LOCALE") {
            Some(tag) => Locale::from_tag(&tag).ok_or(ConfigError::Invalid {
                var: "MESSAGE_LOCALE",
                value: tag,
            })?,
            None => defaults.locale,
        };

        let backend = match var("STORE_BACKEND").map(|v| v.to_ascii_lowercase()) {
            None => StoreBackend::Memory,
            Some(name) if name == "memory" => StoreBackend::Memory,
            Some(name) if name == "firestore" => StoreBackend::Firestore(FirestoreSettings {
                project_id: var("FIRESTORE_PROJECT_ID")
                    .ok_or(ConfigError::Missing("FIRESTORE_PROJECT_ID"))?,
                database: var("FIRESTORE_DATABASE").unwrap_or_else(|| "(default)".to_string()),
                api_key: var("FIRESTORE_API_KEY"),
                base_url: var("FIRESTORE_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_FIRESTORE_BASE_URL.to_string()),
            }),
            Some(name) => {
                return Err(ConfigError::Invalid {
                    var: "STORE_BACKEND",
                    value: name,
                })
            }
        };

        Ok(Self {
            server_port: var("SERVER_PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
            backend,
            collection: var("STUDENTS_COLLECTION").unwrap_or(defaults.collection),
            locale,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            backend: StoreBackend::Memory,
            collection: "students".to_string(),
            locale: Locale::En,
        }
    }
}

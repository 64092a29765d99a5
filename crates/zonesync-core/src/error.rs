//! Error types for zonesync
//!
//! This module defines all error types used throughout the crate.

use std::net::Ipv4Addr;

use thiserror::Error;

/// Result type alias for zonesync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for zonesync
#[derive(Error, Debug)]
pub enum Error {
    /// A hostname has IPs to prune but the zone holds no record for it.
    ///
    /// The two snapshots were not taken consistently; the run must abort
    /// instead of dropping the prune.
    #[error("inconsistent change for {hostname}: pruning {pruned:?} but the zone has no record")]
    InconsistentChange {
        /// Hostname the change belongs to
        hostname: String,
        /// IPs the change wanted to remove
        pruned: Vec<Ipv4Addr>,
    },

    /// A change for a hostname without a record carries nothing to create
    #[error("empty change for {hostname}: no record exists and no addresses to add")]
    EmptyChange {
        /// Hostname the change belongs to
        hostname: String,
    },

    /// The zone snapshot holds more than one address record for a hostname
    #[error("zone snapshot holds more than one address record for {hostname}")]
    DuplicateRecord {
        /// Hostname seen twice
        hostname: String,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Instance directory errors
    #[error("Instance directory error: {0}")]
    Directory(String),

    /// Zone store errors
    #[error("Zone store error: {0}")]
    ZoneStore(String),

    /// Provider-specific error
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// I/O errors (config files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an instance directory error
    pub fn directory(msg: impl Into<String>) -> Self {
        Self::Directory(msg.into())
    }

    /// Create a zone store error
    pub fn zone_store(msg: impl Into<String>) -> Self {
        Self::ZoneStore(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Whether the error comes from the snapshot pipeline rather than a collaborator
    pub fn is_inconsistency(&self) -> bool {
        matches!(
            self,
            Self::InconsistentChange { .. } | Self::EmptyChange { .. } | Self::DuplicateRecord { .. }
        )
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

//! Configuration types for zonesync
//!
//! This module defines all configuration structures used throughout the crate.
//! A [`SyncConfig`] can be built in code (the CLI does this from flags) or
//! loaded from a JSON file.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::model::{HostRecord, ZoneRecord, ZoneRef};
use crate::traits::HostFilter;

/// Largest batch a Route53-style provider accepts in one call
pub const MAX_BATCH_SIZE: usize = 1000;

/// Main zonesync configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Zone to reconcile
    pub zone: ZoneConfig,

    /// Host selection criteria
    #[serde(default)]
    pub filter: HostFilter,

    /// Instance directory configuration
    #[serde(default)]
    pub directory: DirectoryConfig,

    /// Zone store configuration
    #[serde(default)]
    pub zone_store: ZoneStoreConfig,

    /// Optional engine settings
    #[serde(default)]
    pub engine: EngineConfig,
}

impl SyncConfig {
    /// Create a configuration for a zone with defaults everywhere else
    pub fn new(zone_id: impl Into<String>, zone_name: impl Into<String>) -> Self {
        Self {
            zone: ZoneConfig::new(zone_id, zone_name),
            filter: HostFilter::default(),
            directory: DirectoryConfig::default(),
            zone_store: ZoneStoreConfig::default(),
            engine: EngineConfig::default(),
        }
    }

    /// Load a configuration from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, crate::Error> {
        let contents = std::fs::read_to_string(path)?;
        let config: SyncConfig = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.zone.validate()?;
        self.engine.validate()?;
        self.directory.validate()?;
        self.zone_store.validate()?;

        if self.filter.hostname_tag.trim().is_empty() {
            return Err(crate::Error::config("Hostname tag cannot be empty"));
        }

        Ok(())
    }
}

/// Zone identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneConfig {
    /// Provider zone identifier (e.g. "Z0123456789" or "/hostedzone/Z0123456789")
    pub zone_id: String,

    /// Zone name (e.g. "example.com")
    pub zone_name: String,
}

impl ZoneConfig {
    /// Create a zone configuration
    pub fn new(zone_id: impl Into<String>, zone_name: impl Into<String>) -> Self {
        Self {
            zone_id: zone_id.into(),
            zone_name: zone_name.into(),
        }
    }

    /// Validate the zone configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.zone_id.trim().is_empty() {
            return Err(crate::Error::config("Zone ID cannot be empty"));
        }
        if self.zone_name.trim_end_matches('.').is_empty() {
            return Err(crate::Error::config("Zone name cannot be empty"));
        }
        Ok(())
    }

    /// Zone reference handed to collaborators
    pub fn zone_ref(&self) -> ZoneRef {
        ZoneRef::new(self.zone_id.clone(), self.zone_name.clone())
    }
}

/// Instance directory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DirectoryConfig {
    /// EC2 instances
    Ec2 {
        /// AWS region (falls back to the environment)
        #[serde(default)]
        region: Option<String>,
    },

    /// Fixed list of hosts
    Static {
        /// Hosts to publish
        hosts: Vec<HostRecord>,
    },

    /// Custom directory
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl DirectoryConfig {
    /// Validate the directory configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            DirectoryConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(crate::Error::config(
                        "Custom directory factory cannot be empty",
                    ));
                }
                if config.is_null() {
                    return Err(crate::Error::config(
                        "Custom directory config cannot be null",
                    ));
                }
                Ok(())
            }
            DirectoryConfig::Ec2 { .. } | DirectoryConfig::Static { .. } => Ok(()),
        }
    }

    /// Get the directory type name
    pub fn type_name(&self) -> &str {
        match self {
            DirectoryConfig::Ec2 { .. } => "ec2",
            DirectoryConfig::Static { .. } => "static",
            DirectoryConfig::Custom { factory, .. } => factory,
        }
    }
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        DirectoryConfig::Ec2 { region: None }
    }
}

/// Zone store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ZoneStoreConfig {
    /// Route53 hosted zone
    Route53 {
        /// AWS region (falls back to the environment)
        #[serde(default)]
        region: Option<String>,
    },

    /// In-memory zone (not persistent)
    Memory {
        /// Records the zone starts with
        #[serde(default)]
        records: Vec<ZoneRecord>,
    },

    /// Custom zone store
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl ZoneStoreConfig {
    /// Validate the zone store configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ZoneStoreConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(crate::Error::config(
                        "Custom zone store factory cannot be empty",
                    ));
                }
                if config.is_null() {
                    return Err(crate::Error::config(
                        "Custom zone store config cannot be null",
                    ));
                }
                Ok(())
            }
            ZoneStoreConfig::Route53 { .. } | ZoneStoreConfig::Memory { .. } => Ok(()),
        }
    }

    /// Get the zone store type name
    pub fn type_name(&self) -> &str {
        match self {
            ZoneStoreConfig::Route53 { .. } => "route53",
            ZoneStoreConfig::Memory { .. } => "memory",
            ZoneStoreConfig::Custom { factory, .. } => factory,
        }
    }
}

impl Default for ZoneStoreConfig {
    fn default() -> Self {
        ZoneStoreConfig::Route53 { region: None }
    }
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum number of mutations per zone store call
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// TTL of records the engine creates (in seconds)
    #[serde(default = "default_ttl")]
    pub default_ttl: u32,

    /// Compute and log the plan without submitting it
    #[serde(default)]
    pub dry_run: bool,
}

impl EngineConfig {
    /// Validate the engine configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.batch_size == 0 || self.batch_size > MAX_BATCH_SIZE {
            return Err(crate::Error::config(format!(
                "Batch size must be between 1 and {}. Got: {}",
                MAX_BATCH_SIZE, self.batch_size
            )));
        }
        if self.default_ttl == 0 {
            return Err(crate::Error::config("Default TTL must be > 0"));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            default_ttl: default_ttl(),
            dry_run: false,
        }
    }
}

fn default_batch_size() -> usize {
    100
}

fn default_ttl() -> u32 {
    crate::model::DEFAULT_TTL
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = SyncConfig::new("Z123", "example.com");
        assert!(config.validate().is_ok());
        assert_eq!(config.engine.batch_size, 100);
        assert_eq!(config.engine.default_ttl, 300);
        assert!(!config.engine.dry_run);
        assert_eq!(config.directory.type_name(), "ec2");
        assert_eq!(config.zone_store.type_name(), "route53");
    }

    #[test]
    fn test_batch_size_bounds() {
        let mut config = SyncConfig::new("Z123", "example.com");
        config.engine.batch_size = 0;
        assert!(config.validate().is_err());

        config.engine.batch_size = MAX_BATCH_SIZE + 1;
        assert!(config.validate().is_err());

        config.engine.batch_size = MAX_BATCH_SIZE;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_zone_rejected() {
        assert!(SyncConfig::new("", "example.com").validate().is_err());
        assert!(SyncConfig::new("Z123", ".").validate().is_err());
    }

    #[test]
    fn test_custom_factory_required() {
        let mut config = SyncConfig::new("Z123", "example.com");
        config.zone_store = ZoneStoreConfig::Custom {
            factory: String::new(),
            config: serde_json::json!({}),
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zone_ref_normalizes_name() {
        let zone = ZoneConfig::new("Z123", "example.com.").zone_ref();
        assert_eq!(zone.zone_name(), "example.com");
        assert_eq!(zone.zone_id(), "Z123");
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "zone": {{"zone_id": "Z123", "zone_name": "example.com"}},
                "filter": {{"hostname_tag": "Hostname", "name_is_fqdn": true}},
                "directory": {{"type": "static", "hosts": [{{"hostname": "web1", "ip_address": "10.0.0.1"}}]}},
                "zone_store": {{"type": "memory"}},
                "engine": {{"batch_size": 10, "dry_run": true}}
            }}"#
        )
        .unwrap();

        let config = SyncConfig::from_json_file(file.path()).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.filter.hostname_tag, "Hostname");
        assert!(config.filter.name_is_fqdn);
        assert_eq!(config.directory.type_name(), "static");
        assert_eq!(config.zone_store.type_name(), "memory");
        assert_eq!(config.engine.batch_size, 10);
        assert_eq!(config.engine.default_ttl, 300);
        assert!(config.engine.dry_run);
    }

    #[test]
    fn test_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = SyncConfig::from_json_file(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, crate::Error::Io(_)));
    }
}

// # Instance Directory Trait
//
// Defines the interface for enumerating the hosts that should be published.
//
// ## Implementations
//
// - EC2 instances: `zonesync-directory-ec2` crate
// - Fixed host list: `StaticDirectory` in this crate
//
// ## Usage
//
// ```rust,ignore
// use zonesync_core::{HostFilter, InstanceDirectory};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let directory = /* InstanceDirectory implementation */;
//
//     let hosts = directory.list_hosts(&HostFilter::default()).await?;
//     for host in &hosts {
//         println!("{}", host);
//     }
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use tracing::warn;

use crate::model::{HostSnapshot, normalize_hostname};

/// Criteria a directory applies when listing hosts
///
/// Each directory interprets the fields that make sense for it; a fixed
/// host list ignores them all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostFilter {
    /// Tag holding the hostname
    #[serde(default = "default_hostname_tag")]
    pub hostname_tag: String,

    /// Whether the tag value is an FQDN (only its first label is used)
    #[serde(default)]
    pub name_is_fqdn: bool,

    /// Networks whose instances are included
    #[serde(default)]
    pub vpc_ids: Vec<String>,

    /// Whether instances outside any network are included
    #[serde(default)]
    pub include_classic: bool,
}

impl HostFilter {
    /// Create a filter reading hostnames from the given tag
    pub fn new(hostname_tag: impl Into<String>) -> Self {
        Self {
            hostname_tag: hostname_tag.into(),
            ..Self::default()
        }
    }

    /// Treat tag values as FQDNs
    pub fn with_fqdn_names(mut self, name_is_fqdn: bool) -> Self {
        self.name_is_fqdn = name_is_fqdn;
        self
    }

    /// Restrict to the given networks
    pub fn with_vpc_ids(mut self, vpc_ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.vpc_ids = vpc_ids.into_iter().map(Into::into).collect();
        self
    }

    /// Include instances outside any network
    pub fn with_classic(mut self, include_classic: bool) -> Self {
        self.include_classic = include_classic;
        self
    }

    /// Whether an instance in the given network passes the filter
    pub fn accepts_network(&self, vpc_id: Option<&str>) -> bool {
        match vpc_id {
            Some(vpc_id) => self.vpc_ids.iter().any(|id| id == vpc_id),
            None => self.include_classic,
        }
    }

    /// Hostname carried by a tag value
    ///
    /// In FQDN mode only the first label is kept. The result goes through
    /// [`normalize_hostname`], so it is exactly the name the zone reports
    /// back. Returns `None` (with a warning for non-empty values) when the
    /// value cannot be published as a single label.
    pub fn hostname_from_tag(&self, tag_value: &str) -> Option<String> {
        let value = tag_value.trim();
        let hostname = if self.name_is_fqdn {
            value.split('.').next().unwrap_or_default()
        } else {
            value
        };

        let normalized = normalize_hostname(hostname);
        if normalized.is_none() && !value.is_empty() {
            warn!(
                "Ignoring {} tag value {:?}: not a single-label hostname",
                self.hostname_tag, tag_value
            );
        }
        normalized
    }
}

impl Default for HostFilter {
    fn default() -> Self {
        Self {
            hostname_tag: default_hostname_tag(),
            name_is_fqdn: false,
            vpc_ids: Vec::new(),
            include_classic: false,
        }
    }
}

fn default_hostname_tag() -> String {
    "Name".to_string()
}

/// Trait for instance directory implementations
///
/// # Contract
///
/// - Returns a complete snapshot; no duplicate (hostname, IP) pairs
/// - Performs no retries; failures are returned to the caller
/// - Holds its own client handles, constructed from configuration
#[async_trait]
pub trait InstanceDirectory: Send + Sync {
    /// List every host that should be published
    ///
    /// # Parameters
    ///
    /// - `filter`: Selection criteria
    ///
    /// # Returns
    ///
    /// - `Ok(HostSnapshot)`: The live inventory
    /// - `Err(Error)`: If listing failed
    async fn list_hosts(&self, filter: &HostFilter) -> Result<HostSnapshot, crate::Error>;

    /// Get the directory name (for logging/debugging)
    fn directory_name(&self) -> &'static str;
}

/// Helper trait for constructing directories from configuration
#[async_trait]
pub trait InstanceDirectoryFactory: Send + Sync {
    /// Create an InstanceDirectory instance from configuration
    async fn create(
        &self,
        config: &crate::config::DirectoryConfig,
    ) -> Result<Box<dyn InstanceDirectory>, crate::Error>;
}

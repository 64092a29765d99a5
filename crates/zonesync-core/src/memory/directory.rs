// # Static Directory
//
// Instance directory backed by a fixed host list. The filter is ignored:
// the list is already the inventory.

use async_trait::async_trait;
use tracing::warn;

use crate::Error;
use crate::config::DirectoryConfig;
use crate::model::{HostRecord, HostSnapshot, normalize_hostname};
use crate::traits::{HostFilter, InstanceDirectory, InstanceDirectoryFactory};

/// Directory returning a fixed snapshot
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    hosts: HostSnapshot,
}

impl StaticDirectory {
    /// Create a directory serving the given hosts
    pub fn new(hosts: HostSnapshot) -> Self {
        Self { hosts }
    }
}

#[async_trait]
impl InstanceDirectory for StaticDirectory {
    async fn list_hosts(&self, _filter: &HostFilter) -> Result<HostSnapshot, Error> {
        Ok(self.hosts.clone())
    }

    fn directory_name(&self) -> &'static str {
        "static"
    }
}

/// Snapshot of configured hosts under their canonical hostnames
///
/// Hosts whose name cannot be published as a single label are dropped.
fn normalize_hosts(hosts: &[HostRecord]) -> HostSnapshot {
    hosts
        .iter()
        .filter_map(|host| match normalize_hostname(host.hostname()) {
            Some(hostname) => Some(HostRecord::new(hostname, host.ip_address())),
            None => {
                warn!("Ignoring static host {}: not a single-label hostname", host);
                None
            }
        })
        .collect()
}

/// Factory for creating static directories
pub struct StaticDirectoryFactory;

#[async_trait]
impl InstanceDirectoryFactory for StaticDirectoryFactory {
    async fn create(&self, config: &DirectoryConfig) -> Result<Box<dyn InstanceDirectory>, Error> {
        match config {
            DirectoryConfig::Static { hosts } => Ok(Box::new(StaticDirectory::new(
                normalize_hosts(hosts),
            ))),
            _ => Err(Error::config("Invalid config for static directory")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[tokio::test]
    async fn test_static_directory_ignores_filter() {
        let hosts: HostSnapshot = [HostRecord::new("web1", Ipv4Addr::new(10, 0, 0, 1))]
            .into_iter()
            .collect();
        let directory = StaticDirectory::new(hosts.clone());

        let filter = HostFilter::new("Other").with_vpc_ids(["vpc-1"]);
        assert_eq!(directory.list_hosts(&filter).await.unwrap(), hosts);
    }

    #[tokio::test]
    async fn test_factory_dedupes_hosts() {
        let host = HostRecord::new("web1", Ipv4Addr::new(10, 0, 0, 1));
        let config = DirectoryConfig::Static {
            hosts: vec![host.clone(), host],
        };

        let directory = StaticDirectoryFactory.create(&config).await.unwrap();
        let hosts = directory.list_hosts(&HostFilter::default()).await.unwrap();
        assert_eq!(hosts.len(), 1);
    }

    #[tokio::test]
    async fn test_factory_normalizes_hostnames() {
        let config = DirectoryConfig::Static {
            hosts: vec![
                HostRecord::new("Web1", Ipv4Addr::new(10, 0, 0, 1)),
                HostRecord::new("web1.prod", Ipv4Addr::new(10, 0, 0, 2)),
                HostRecord::new("*", Ipv4Addr::new(10, 0, 0, 3)),
            ],
        };

        let directory = StaticDirectoryFactory.create(&config).await.unwrap();
        let hosts = directory.list_hosts(&HostFilter::default()).await.unwrap();
        let expected: HostSnapshot = [HostRecord::new("web1", Ipv4Addr::new(10, 0, 0, 1))]
            .into_iter()
            .collect();
        assert_eq!(hosts, expected);
    }

    #[tokio::test]
    async fn test_factory_rejects_other_config() {
        let config = DirectoryConfig::Ec2 { region: None };
        assert!(StaticDirectoryFactory.create(&config).await.is_err());
    }
}

// # EC2 Instance Directory
//
// This crate provides an EC2 implementation of `InstanceDirectory` for
// zonesync.
//
// ## Selection
//
// An instance is published when all of the following hold:
//
// - It is running (`instance-state-code` 16)
// - It carries the hostname tag (server-side `tag-key` filter)
// - Its VPC is one of the configured VPCs, or it has no VPC and classic
//   instances are included
// - It has a private IPv4 address
//
// The hostname is the tag value, or its first label when tag values are
// FQDNs. Pagination follows `NextToken` until the listing is complete.

use std::net::Ipv4Addr;

use async_trait::async_trait;
use aws_sdk_ec2::Client;
use aws_sdk_ec2::error::DisplayErrorContext;
use aws_sdk_ec2::types::{Filter, Instance};
use tracing::debug;
use zonesync_core::config::DirectoryConfig;
use zonesync_core::model::{HostRecord, HostSnapshot};
use zonesync_core::registry::Registry;
use zonesync_core::traits::{HostFilter, InstanceDirectory, InstanceDirectoryFactory};
use zonesync_core::{Error, Result};

/// EC2 state code of a running instance
const RUNNING_STATE_CODE: &str = "16";

const DIRECTORY: &str = "ec2";

/// EC2 instance directory
pub struct Ec2Directory {
    client: Client,
}

impl std::fmt::Debug for Ec2Directory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ec2Directory")
            .field("region", &self.client.config().region())
            .field("credentials", &"<REDACTED>")
            .finish()
    }
}

impl Ec2Directory {
    /// Create a directory around an existing SDK client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Create a directory from the AWS environment
    pub async fn from_env(region: Option<String>) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(aws_config::Region::new(region));
        }
        let sdk_config = loader.load().await;
        Self::new(Client::new(&sdk_config))
    }
}

/// Server-side filters for a listing
pub fn describe_filters(filter: &HostFilter) -> Vec<Filter> {
    vec![
        Filter::builder()
            .name("instance-state-code")
            .values(RUNNING_STATE_CODE)
            .build(),
        Filter::builder()
            .name("tag-key")
            .values(&filter.hostname_tag)
            .build(),
    ]
}

/// Host published for an instance, if any
///
/// Applies the client-side part of the selection: network, hostname tag and
/// private address.
pub fn host_from_instance(filter: &HostFilter, instance: &Instance) -> Option<HostRecord> {
    let instance_id = instance.instance_id().unwrap_or("<unknown>");

    if !filter.accepts_network(instance.vpc_id()) {
        debug!(
            "Skipping {}: network {:?} not selected",
            instance_id,
            instance.vpc_id()
        );
        return None;
    }

    let hostname = instance
        .tags()
        .iter()
        .find(|tag| tag.key() == Some(filter.hostname_tag.as_str()))
        .and_then(|tag| tag.value())
        .and_then(|value| filter.hostname_from_tag(value))?;

    let ip_address = match instance.private_ip_address().map(str::parse::<Ipv4Addr>) {
        Some(Ok(ip)) => ip,
        Some(Err(e)) => {
            debug!("Skipping {}: invalid private address: {}", instance_id, e);
            return None;
        }
        None => {
            debug!("Skipping {}: no private address", instance_id);
            return None;
        }
    };

    Some(HostRecord::new(hostname, ip_address))
}

#[async_trait]
impl InstanceDirectory for Ec2Directory {
    async fn list_hosts(&self, filter: &HostFilter) -> Result<HostSnapshot> {
        let mut hosts = HostSnapshot::new();
        let mut next_token: Option<String> = None;
        let mut instances = 0usize;

        loop {
            let page = self
                .client
                .describe_instances()
                .set_filters(Some(describe_filters(filter)))
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|e| {
                    Error::provider(
                        DIRECTORY,
                        format!("DescribeInstances failed: {}", DisplayErrorContext(&e)),
                    )
                })?;

            for instance in page.reservations().iter().flat_map(|r| r.instances()) {
                instances += 1;
                if let Some(host) = host_from_instance(filter, instance) {
                    hosts.insert(host);
                }
            }

            match page.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_string()),
                _ => break,
            }
        }

        debug!(
            "{} running instance(s) tagged {}, {} host(s) selected",
            instances,
            filter.hostname_tag,
            hosts.len()
        );
        Ok(hosts)
    }

    fn directory_name(&self) -> &'static str {
        DIRECTORY
    }
}

/// Factory for creating EC2 directories
pub struct Ec2Factory;

#[async_trait]
impl InstanceDirectoryFactory for Ec2Factory {
    async fn create(&self, config: &DirectoryConfig) -> Result<Box<dyn InstanceDirectory>> {
        match config {
            DirectoryConfig::Ec2 { region } => {
                Ok(Box::new(Ec2Directory::from_env(region.clone()).await))
            }
            _ => Err(Error::config("Invalid config for EC2 directory")),
        }
    }
}

/// Register the EC2 directory with a registry
pub fn register(registry: &Registry) {
    registry.register_directory(DIRECTORY, Box::new(Ec2Factory));
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_ec2::types::Tag;

    fn instance(name: Option<&str>, ip: Option<&str>, vpc: Option<&str>) -> Instance {
        let mut builder = Instance::builder()
            .instance_id("i-0123")
            .set_private_ip_address(ip.map(String::from))
            .set_vpc_id(vpc.map(String::from))
            .tags(Tag::builder().key("Team").value("infra").build());
        if let Some(name) = name {
            builder = builder.tags(Tag::builder().key("Name").value(name).build());
        }
        builder.build()
    }

    fn filter() -> HostFilter {
        HostFilter::new("Name").with_vpc_ids(["vpc-1"])
    }

    #[test]
    fn test_selected_instance() {
        let host = host_from_instance(
            &filter(),
            &instance(Some("web1"), Some("10.0.0.1"), Some("vpc-1")),
        );
        assert_eq!(host, Some(HostRecord::new("web1", Ipv4Addr::new(10, 0, 0, 1))));
    }

    #[test]
    fn test_fqdn_tag_keeps_first_label() {
        let filter = filter().with_fqdn_names(true);
        let host = host_from_instance(
            &filter,
            &instance(Some("web1.prod.example.com"), Some("10.0.0.1"), Some("vpc-1")),
        );
        assert_eq!(host.map(|h| h.hostname().to_string()), Some("web1".to_string()));
    }

    #[test]
    fn test_network_selection() {
        let outside = instance(Some("web1"), Some("10.0.0.1"), Some("vpc-2"));
        assert!(host_from_instance(&filter(), &outside).is_none());

        let classic = instance(Some("web1"), Some("10.0.0.1"), None);
        assert!(host_from_instance(&filter(), &classic).is_none());
        assert!(host_from_instance(&filter().with_classic(true), &classic).is_some());
    }

    #[test]
    fn test_missing_tag_or_address() {
        assert!(host_from_instance(&filter(), &instance(None, Some("10.0.0.1"), Some("vpc-1"))).is_none());
        assert!(host_from_instance(&filter(), &instance(Some("web1"), None, Some("vpc-1"))).is_none());
        assert!(host_from_instance(&filter(), &instance(Some(""), Some("10.0.0.1"), Some("vpc-1"))).is_none());
        assert!(host_from_instance(&filter(), &instance(Some("web1.prod"), Some("10.0.0.1"), Some("vpc-1"))).is_none());
    }

    #[test]
    fn test_describe_filters() {
        let filters = describe_filters(&HostFilter::new("Hostname"));
        assert_eq!(filters[0].name(), Some("instance-state-code"));
        assert_eq!(filters[0].values(), ["16".to_string()]);
        assert_eq!(filters[1].name(), Some("tag-key"));
        assert_eq!(filters[1].values(), ["Hostname".to_string()]);
    }

    #[tokio::test]
    async fn test_factory_rejects_other_config() {
        let config = DirectoryConfig::Static { hosts: vec![] };
        assert!(Ec2Factory.create(&config).await.is_err());
    }

    #[test]
    fn test_register() {
        let registry = Registry::new();
        register(&registry);
        assert!(registry.has_directory("ec2"));
    }
}

// # Route53 Zone Store
//
// This crate provides a Route53 implementation of `ZoneStore` for zonesync.
//
// ## Behavior
//
// - Lists every `A` record set of a hosted zone, following
//   `NextRecordName` / `NextRecordType` until the listing is complete
// - Submits one `ChangeResourceRecordSets` call per batch; Route53 applies
//   a batch atomically
// - Alias records, routing-policy record sets (those carrying a
//   `SetIdentifier`), the apex and multi-label names are left alone
// - No retry or backoff beyond what the SDK transport does; a failed call
//   is returned to the reconciler and the run aborts
//
// ## Credentials
//
// Credentials and region come from the standard AWS provider chain
// (environment, profile, instance metadata). They are never logged.
//
// ## API Reference
//
// - ListResourceRecordSets: GET `/2013-04-01/hostedzone/:id/rrset`
// - ChangeResourceRecordSets: POST `/2013-04-01/hostedzone/:id/rrset`

use std::net::Ipv4Addr;

use async_trait::async_trait;
use aws_sdk_route53::Client;
use aws_sdk_route53::error::DisplayErrorContext;
use aws_sdk_route53::types::{
    Change, ChangeAction, ChangeBatch, ResourceRecord, ResourceRecordSet, RrType,
};
use tracing::{debug, info, warn};
use zonesync_core::config::ZoneStoreConfig;
use zonesync_core::model::{DEFAULT_TTL, MutationAction, ZoneRecord, ZoneRef};
use zonesync_core::registry::Registry;
use zonesync_core::traits::{ZoneStore, ZoneStoreFactory};
use zonesync_core::{Error, Result};

/// Prefix Route53 puts in front of hosted zone identifiers
const HOSTED_ZONE_PREFIX: &str = "/hostedzone/";

const PROVIDER: &str = "route53";

/// Hosted zone id in the `/hostedzone/<id>` form
pub fn normalize_zone_id(zone_id: &str) -> String {
    if zone_id.starts_with(HOSTED_ZONE_PREFIX) {
        zone_id.to_string()
    } else {
        format!("{}{}", HOSTED_ZONE_PREFIX, zone_id)
    }
}

/// Route53 zone store
///
/// Holds one SDK client. The client carries credentials, so the Debug
/// implementation only shows the region.
pub struct Route53ZoneStore {
    client: Client,
}

impl std::fmt::Debug for Route53ZoneStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route53ZoneStore")
            .field("region", &self.client.config().region())
            .field("credentials", &"<REDACTED>")
            .finish()
    }
}

impl Route53ZoneStore {
    /// Create a store around an existing SDK client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Create a store from the AWS environment
    ///
    /// # Parameters
    ///
    /// - `region`: Region override; the provider chain decides when `None`
    pub async fn from_env(region: Option<String>) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(aws_config::Region::new(region));
        }
        let sdk_config = loader.load().await;
        Self::new(Client::new(&sdk_config))
    }
}

/// Convert one listed record set into a zone record
///
/// # Returns
///
/// - `Ok(Some(record))`: A plain `A` record for a hostname of the zone
/// - `Ok(None)`: A record set the reconciler does not manage
/// - `Err(Error)`: An `A` record whose value is not an IPv4 address
pub fn zone_record_from_set(zone: &ZoneRef, set: &ResourceRecordSet) -> Result<Option<ZoneRecord>> {
    if set.r#type() != &RrType::A {
        return Ok(None);
    }
    if set.alias_target().is_some() || set.set_identifier().is_some() {
        warn!(
            "Skipping {}: alias and routing-policy records are not managed",
            set.name()
        );
        return Ok(None);
    }

    // Route53 escapes special characters (e.g. `\052` for a wildcard)
    if set.name().contains('\\') {
        debug!("Skipping {}: escaped name", set.name());
        return Ok(None);
    }
    let Some(hostname) = zone.hostname_of(set.name()) else {
        if set.name().trim_end_matches('.').eq_ignore_ascii_case(zone.zone_name()) {
            debug!("Skipping zone apex {}", set.name());
        } else {
            warn!("Skipping {}: not a single-label host of the zone", set.name());
        }
        return Ok(None);
    };

    let values = set
        .resource_records()
        .iter()
        .map(|record| {
            record.value().parse::<Ipv4Addr>().map_err(|e| {
                Error::provider(
                    PROVIDER,
                    format!("Invalid A value {:?} in {}: {}", record.value(), set.name(), e),
                )
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let ttl = set
        .ttl()
        .and_then(|ttl| u32::try_from(ttl).ok())
        .unwrap_or(DEFAULT_TTL);

    Ok(Some(ZoneRecord {
        name: set.name().to_string(),
        hostname,
        ttl,
        values,
    }))
}

/// Convert a zone record into an SDK record set
pub fn record_set(record: &ZoneRecord) -> Result<ResourceRecordSet> {
    let values = record
        .values
        .iter()
        .map(|ip| ResourceRecord::builder().value(ip.to_string()).build())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(build_error)?;

    ResourceRecordSet::builder()
        .name(&record.name)
        .r#type(RrType::A)
        .ttl(i64::from(record.ttl))
        .set_resource_records(Some(values))
        .build()
        .map_err(build_error)
}

/// Convert a mutation into an SDK change
pub fn change(mutation: &MutationAction) -> Result<Change> {
    let action = match mutation {
        MutationAction::Create(_) => ChangeAction::Create,
        MutationAction::Upsert(_) => ChangeAction::Upsert,
        MutationAction::Delete(_) => ChangeAction::Delete,
    };

    Change::builder()
        .action(action)
        .resource_record_set(record_set(mutation.record())?)
        .build()
        .map_err(build_error)
}

/// Convert a batch of mutations into one SDK change batch, in order
pub fn change_batch(batch: &[MutationAction]) -> Result<ChangeBatch> {
    let changes = batch.iter().map(change).collect::<Result<Vec<_>>>()?;

    ChangeBatch::builder()
        .set_changes(Some(changes))
        .build()
        .map_err(build_error)
}

fn build_error(e: aws_sdk_route53::error::BuildError) -> Error {
    Error::provider(PROVIDER, format!("Failed to build request: {}", e))
}

#[async_trait]
impl ZoneStore for Route53ZoneStore {
    async fn list_records(&self, zone: &ZoneRef) -> Result<Vec<ZoneRecord>> {
        let zone_id = normalize_zone_id(zone.zone_id());
        let mut records = Vec::new();
        let mut start_name: Option<String> = None;
        let mut start_type: Option<RrType> = None;
        let mut pages = 0usize;

        loop {
            let page = self
                .client
                .list_resource_record_sets()
                .hosted_zone_id(&zone_id)
                .set_start_record_name(start_name.take())
                .set_start_record_type(start_type.take())
                .send()
                .await
                .map_err(|e| {
                    Error::provider(
                        PROVIDER,
                        format!("ListResourceRecordSets failed: {}", DisplayErrorContext(&e)),
                    )
                })?;
            pages += 1;

            for set in page.resource_record_sets() {
                if let Some(record) = zone_record_from_set(zone, set)? {
                    records.push(record);
                }
            }

            if !page.is_truncated() {
                break;
            }
            match page.next_record_name() {
                Some(name) => {
                    start_name = Some(name.to_string());
                    start_type = page.next_record_type().cloned();
                }
                None => {
                    warn!("Truncated listing without NextRecordName, stopping");
                    break;
                }
            }
        }

        debug!(
            "Listed {} A record(s) in {} page(s) from {}",
            records.len(),
            pages,
            zone_id
        );
        Ok(records)
    }

    async fn apply_batch(&self, zone: &ZoneRef, batch: &[MutationAction]) -> Result<()> {
        let zone_id = normalize_zone_id(zone.zone_id());

        let output = self
            .client
            .change_resource_record_sets()
            .hosted_zone_id(&zone_id)
            .change_batch(change_batch(batch)?)
            .send()
            .await
            .map_err(|e| {
                Error::provider(
                    PROVIDER,
                    format!("ChangeResourceRecordSets failed: {}", DisplayErrorContext(&e)),
                )
            })?;

        if let Some(info) = output.change_info() {
            info!(
                "Route53 accepted {} change(s): {} ({:?})",
                batch.len(),
                info.id(),
                info.status()
            );
        }
        Ok(())
    }

    fn store_name(&self) -> &'static str {
        PROVIDER
    }
}

/// Factory for creating Route53 zone stores
pub struct Route53Factory;

#[async_trait]
impl ZoneStoreFactory for Route53Factory {
    async fn create(&self, config: &ZoneStoreConfig) -> Result<Box<dyn ZoneStore>> {
        match config {
            ZoneStoreConfig::Route53 { region } => {
                Ok(Box::new(Route53ZoneStore::from_env(region.clone()).await))
            }
            _ => Err(Error::config("Invalid config for Route53 zone store")),
        }
    }
}

/// Register the Route53 zone store with a registry
///
/// # Example
///
/// ```rust,no_run
/// use zonesync_core::registry::Registry;
///
/// let registry = Registry::new();
/// zonesync_provider_route53::register(&registry);
/// assert!(registry.has_zone_store("route53"));
/// ```
pub fn register(registry: &Registry) {
    registry.register_zone_store(PROVIDER, Box::new(Route53Factory));
}

// # Zone Store Trait
//
// Defines the interface for reading and mutating address records in a zone.
//
// ## Implementations
//
// - Route53: `zonesync-provider-route53` crate
// - In-memory: `MemoryZoneStore` in this crate

use async_trait::async_trait;

use crate::model::{MutationAction, ZoneRecord, ZoneRef};

/// Trait for zone store implementations
///
/// # Contract
///
/// - `list_records` returns every address record of the zone, fully
///   paginated, each keyed by its hostname
/// - `apply_batch` submits one batch as a single provider call
/// - No retry or backoff: a failed call is returned as an error and the
///   run aborts. The next run converges from whatever state was left.
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
#[async_trait]
pub trait ZoneStore: Send + Sync {
    /// List the address records of a zone
    ///
    /// # Parameters
    ///
    /// - `zone`: The zone to read
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<ZoneRecord>)`: Complete snapshot at call time
    /// - `Err(Error)`: If listing failed
    async fn list_records(&self, zone: &ZoneRef) -> Result<Vec<ZoneRecord>, crate::Error>;

    /// Apply one batch of mutations
    ///
    /// # Parameters
    ///
    /// - `zone`: The zone to mutate
    /// - `batch`: Mutations in plan order
    ///
    /// # Returns
    ///
    /// - `Ok(())`: The provider accepted the batch
    /// - `Err(Error)`: If the submission failed
    async fn apply_batch(&self, zone: &ZoneRef, batch: &[MutationAction])
    -> Result<(), crate::Error>;

    /// Get the store name (for logging/debugging)
    fn store_name(&self) -> &'static str;
}

/// Helper trait for constructing zone stores from configuration
#[async_trait]
pub trait ZoneStoreFactory: Send + Sync {
    /// Create a ZoneStore instance from configuration
    async fn create(
        &self,
        config: &crate::config::ZoneStoreConfig,
    ) -> Result<Box<dyn ZoneStore>, crate::Error>;
}

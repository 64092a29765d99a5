// # Memory Zone Store
//
// In-memory implementation of ZoneStore.
//
// ## Semantics
//
// Batches are applied the way a Route53-style provider applies them:
// - CREATE fails if the hostname already has a record
// - DELETE fails unless the stored record matches exactly
// - UPSERT replaces the stored record
// - A batch is atomic: if any mutation fails, nothing in it is applied
//
// ## Crash Behavior
//
// All state is lost on restart. The store holds a single zone; the zone
// reference passed to each call is only used for logging.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::Error;
use crate::config::ZoneStoreConfig;
use crate::model::{MutationAction, ZoneRecord, ZoneRef};
use crate::traits::{ZoneStore, ZoneStoreFactory};

#[derive(Debug, Default)]
struct MemoryZone {
    records: BTreeMap<String, ZoneRecord>,
    applied: Vec<Vec<MutationAction>>,
}

/// In-memory zone store
///
/// Clones share the same zone, so a test can keep a handle while the
/// reconciler owns another.
///
/// # Example
///
/// ```rust,no_run
/// use zonesync_core::{MemoryZoneStore, ZoneRef, ZoneStore};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = MemoryZoneStore::new();
///     let zone = ZoneRef::new("Z123", "example.com");
///
///     let records = store.list_records(&zone).await?;
///     assert!(records.is_empty());
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryZoneStore {
    inner: Arc<RwLock<MemoryZone>>,
}

impl MemoryZoneStore {
    /// Create an empty zone
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a zone holding the given records
    ///
    /// A later record with the same hostname replaces an earlier one; the
    /// factory rejects such configurations before they get here.
    pub fn with_records(records: impl IntoIterator<Item = ZoneRecord>) -> Self {
        let zone = MemoryZone {
            records: records
                .into_iter()
                .map(|record| (record.hostname.clone(), record))
                .collect(),
            applied: Vec::new(),
        };
        Self {
            inner: Arc::new(RwLock::new(zone)),
        }
    }

    /// Current records in hostname order
    pub async fn records(&self) -> Vec<ZoneRecord> {
        self.inner.read().await.records.values().cloned().collect()
    }

    /// Every batch applied so far, in order
    pub async fn applied_batches(&self) -> Vec<Vec<MutationAction>> {
        self.inner.read().await.applied.clone()
    }
}

fn apply_mutation(
    records: &mut BTreeMap<String, ZoneRecord>,
    mutation: &MutationAction,
) -> Result<(), Error> {
    let record = mutation.record();
    match mutation {
        MutationAction::Create(_) => {
            if records.contains_key(&record.hostname) {
                return Err(Error::zone_store(format!(
                    "cannot create {}: record already exists",
                    record.name
                )));
            }
            records.insert(record.hostname.clone(), record.clone());
        }
        MutationAction::Upsert(_) => {
            records.insert(record.hostname.clone(), record.clone());
        }
        MutationAction::Delete(_) => {
            if records.get(&record.hostname) != Some(record) {
                return Err(Error::zone_store(format!(
                    "cannot delete {}: no matching record",
                    record.name
                )));
            }
            records.remove(&record.hostname);
        }
    }
    Ok(())
}

#[async_trait]
impl ZoneStore for MemoryZoneStore {
    async fn list_records(&self, _zone: &ZoneRef) -> Result<Vec<ZoneRecord>, Error> {
        Ok(self.records().await)
    }

    async fn apply_batch(&self, zone: &ZoneRef, batch: &[MutationAction]) -> Result<(), Error> {
        let mut guard = self.inner.write().await;

        let mut staged = guard.records.clone();
        for mutation in batch {
            apply_mutation(&mut staged, mutation)?;
        }

        tracing::debug!(
            "Applied {} mutation(s) to in-memory zone {}",
            batch.len(),
            zone.zone_name()
        );
        guard.records = staged;
        guard.applied.push(batch.to_vec());
        Ok(())
    }

    fn store_name(&self) -> &'static str {
        "memory"
    }
}

/// Factory for creating in-memory zone stores
pub struct MemoryZoneStoreFactory;

#[async_trait]
impl ZoneStoreFactory for MemoryZoneStoreFactory {
    async fn create(&self, config: &ZoneStoreConfig) -> Result<Box<dyn ZoneStore>, Error> {
        match config {
            ZoneStoreConfig::Memory { records } => {
                let mut seen = BTreeSet::new();
                if let Some(duplicate) = records
                    .iter()
                    .find(|record| !seen.insert(record.hostname.as_str()))
                {
                    return Err(Error::config(format!(
                        "Memory zone lists {} more than once",
                        duplicate.hostname
                    )));
                }
                Ok(Box::new(MemoryZoneStore::with_records(records.clone())))
            }
            _ => Err(Error::config("Invalid config for memory zone store")),
        }
    }
}

//! Plan builder
//!
//! Runs diff → merge → render over every hostname that changed and returns
//! the mutations in hostname order.

use std::collections::BTreeMap;

use crate::engine::diff::{SnapshotDiff, diff};
use crate::engine::merge::{ChangeSet, merge};
use crate::engine::render::render;
use crate::error::{Error, Result};
use crate::model::{HostSnapshot, MutationAction, ZoneRecord, ZoneRef};

/// Zone records keyed by hostname
pub type RecordIndex = BTreeMap<String, ZoneRecord>;

/// Mutation plan of one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    /// Diff the plan was derived from
    pub diff: SnapshotDiff,
    /// Mutations in hostname order
    pub mutations: Vec<MutationAction>,
}

impl Plan {
    /// Whether the zone is already converged
    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }
}

/// Key zone records by hostname
///
/// # Errors
///
/// [`Error::DuplicateRecord`] if two records share a hostname.
pub fn index_records(records: &[ZoneRecord]) -> Result<RecordIndex> {
    let mut index = RecordIndex::new();
    for record in records {
        if index
            .insert(record.hostname.clone(), record.clone())
            .is_some()
        {
            return Err(Error::DuplicateRecord {
                hostname: record.hostname.clone(),
            });
        }
    }
    Ok(index)
}

/// Builds mutation plans for one zone
#[derive(Debug, Clone)]
pub struct PlanBuilder {
    zone: ZoneRef,
    default_ttl: u32,
}

impl PlanBuilder {
    /// Create a plan builder
    pub fn new(zone: ZoneRef, default_ttl: u32) -> Self {
        Self { zone, default_ttl }
    }

    /// Render every merged change against the existing records
    ///
    /// Hostnames are visited in lexicographic order.
    pub fn build(&self, changes: &ChangeSet, existing: &RecordIndex) -> Result<Vec<MutationAction>> {
        changes
            .values()
            .map(|change| {
                render(
                    change,
                    existing.get(&change.hostname),
                    &self.zone,
                    self.default_ttl,
                )
            })
            .collect()
    }

    /// Full pipeline from the live inventory and the zone's records
    pub fn plan(&self, live: &HostSnapshot, records: &[ZoneRecord]) -> Result<Plan> {
        let existing = index_records(records)?;
        let zone_hosts = HostSnapshot::from_zone_records(records);

        let diff = diff(live, &zone_hosts);
        let changes = merge(&diff.to_add, &diff.to_prune);
        let mutations = self.build(&changes, &existing)?;

        Ok(Plan { diff, mutations })
    }
}

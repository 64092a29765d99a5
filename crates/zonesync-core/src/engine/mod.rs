//! Reconciliation engine
//!
//! The pipeline is pure and synchronous:
//!
//! ```text
//! InstanceDirectory ──► HostSnapshot (live) ─┐
//!                                            ├─► diff ─► merge ─► render ─► plan ─► batches ─► ZoneStore
//! ZoneStore ──► ZoneRecords ─► HostSnapshot ─┘
//! ```
//!
//! [`Reconciler`] drives one run over the collaborators:
//!
//! 1. List live hosts and zone records
//! 2. Build the mutation plan
//! 3. Submit batches one at a time, in plan order, stopping at the first failure
//!    (or log them in dry-run mode)
//!
//! No retries happen here. A run that aborts half-way leaves the zone
//! partially updated and the next run converges further.

pub mod batch;
pub mod diff;
pub mod merge;
pub mod plan;
pub mod render;

pub use batch::BatchSubmitter;
pub use diff::{SnapshotDiff, diff};
pub use merge::{ChangeSet, merge};
pub use plan::{Plan, PlanBuilder, RecordIndex, index_records};
pub use render::render;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info};

use crate::config::SyncConfig;
use crate::error::Result;
use crate::model::{ChangeAction, MutationAction, ZoneRef};
use crate::traits::{HostFilter, InstanceDirectory, ZoneStore};
use crate::wire::ChangeBatch;

/// Outcome of one reconciliation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// When the run finished
    pub finished_at: DateTime<Utc>,
    /// Hosts reported by the directory
    pub live_hosts: usize,
    /// Address records found in the zone
    pub zone_records: usize,
    /// (hostname, IP) pairs missing from the zone
    pub hosts_to_add: usize,
    /// (hostname, IP) pairs no longer live
    pub hosts_to_prune: usize,
    /// Mutations in plan order
    pub mutations: Vec<MutationAction>,
    /// Batches accepted by the zone store (0 in dry-run mode)
    pub batches_submitted: usize,
    /// Whether the plan was only logged
    pub dry_run: bool,
}

impl ReconcileReport {
    /// Number of planned mutations of a kind
    pub fn count(&self, action: ChangeAction) -> usize {
        self.mutations
            .iter()
            .filter(|mutation| mutation.action() == action)
            .count()
    }

    /// Whether the zone already matched the directory
    pub fn is_converged(&self) -> bool {
        self.mutations.is_empty()
    }
}

/// Drives reconciliation runs for one zone
///
/// ## Lifecycle
///
/// 1. Create with [`Reconciler::new()`]
/// 2. Call [`Reconciler::run()`] once per reconciliation
///
/// Each run fetches fresh snapshots; nothing is carried between runs.
pub struct Reconciler {
    /// Source of the live inventory
    directory: Box<dyn InstanceDirectory>,

    /// Zone being reconciled
    zone_store: Box<dyn ZoneStore>,

    zone: ZoneRef,
    filter: HostFilter,
    planner: PlanBuilder,
    submitter: BatchSubmitter,
    dry_run: bool,
}

impl Reconciler {
    /// Create a reconciler
    ///
    /// # Parameters
    ///
    /// - `directory`: Instance directory implementation
    /// - `zone_store`: Zone store implementation
    /// - `config`: zonesync configuration (validated here)
    pub fn new(
        directory: Box<dyn InstanceDirectory>,
        zone_store: Box<dyn ZoneStore>,
        config: &SyncConfig,
    ) -> Result<Self> {
        config.validate()?;

        let zone = config.zone.zone_ref();
        Ok(Self {
            directory,
            zone_store,
            planner: PlanBuilder::new(zone.clone(), config.engine.default_ttl),
            submitter: BatchSubmitter::new(config.engine.batch_size)?,
            zone,
            filter: config.filter.clone(),
            dry_run: config.engine.dry_run,
        })
    }

    /// Run one reconciliation
    ///
    /// # Returns
    ///
    /// - `Ok(ReconcileReport)`: Every batch was accepted (or logged)
    /// - `Err(Error)`: The first collaborator failure or inconsistency,
    ///   unchanged. Batches applied before it stay applied.
    pub async fn run(&self) -> Result<ReconcileReport> {
        let started_at = Utc::now();
        info!(
            "Reconciling zone {} ({}) from {} into {}{}",
            self.zone.zone_name(),
            self.zone.zone_id(),
            self.directory.directory_name(),
            self.zone_store.store_name(),
            if self.dry_run { " [DRY-RUN]" } else { "" }
        );

        let live = self.directory.list_hosts(&self.filter).await?;
        let records = self.zone_store.list_records(&self.zone).await?;
        info!(
            "Snapshots loaded: {} live host(s), {} zone record(s)",
            live.len(),
            records.len()
        );

        let plan = self.planner.plan(&live, &records)?;
        info!(
            "Plan: {} pair(s) to add, {} pair(s) to prune, {} mutation(s)",
            plan.diff.to_add.len(),
            plan.diff.to_prune.len(),
            plan.mutations.len()
        );
        for mutation in &plan.mutations {
            debug!("Planned {}", mutation);
        }

        let batches_submitted = if plan.is_empty() {
            info!("Zone already converged, nothing to submit");
            0
        } else if self.dry_run {
            self.log_batches(&plan.mutations)?;
            0
        } else {
            self.submit(&plan.mutations).await?
        };

        let report = ReconcileReport {
            started_at,
            finished_at: Utc::now(),
            live_hosts: live.len(),
            zone_records: records.len(),
            hosts_to_add: plan.diff.to_add.len(),
            hosts_to_prune: plan.diff.to_prune.len(),
            mutations: plan.mutations,
            batches_submitted,
            dry_run: self.dry_run,
        };

        info!(
            "Reconciliation finished: {} create, {} upsert, {} delete, {} batch(es) submitted",
            report.count(ChangeAction::Create),
            report.count(ChangeAction::Upsert),
            report.count(ChangeAction::Delete),
            report.batches_submitted
        );
        Ok(report)
    }

    /// Submit batches sequentially, stopping at the first failure
    async fn submit(&self, mutations: &[MutationAction]) -> Result<usize> {
        let total = self.submitter.batch_count(mutations.len());
        let mut submitted = 0;

        for (index, batch) in self.submitter.batches(mutations).enumerate() {
            info!(
                "Submitting batch {}/{} ({} change(s)) to {}",
                index + 1,
                total,
                batch.len(),
                self.zone_store.store_name()
            );

            if let Err(e) = self.zone_store.apply_batch(&self.zone, batch).await {
                error!(
                    "Batch {}/{} failed after {} batch(es) applied: {}",
                    index + 1,
                    total,
                    submitted,
                    e
                );
                return Err(e);
            }
            submitted += 1;
        }

        Ok(submitted)
    }

    /// Log the wire form of every batch without submitting
    fn log_batches(&self, mutations: &[MutationAction]) -> Result<()> {
        let rendered = self
            .submitter
            .submit(mutations, |batch| ChangeBatch::from_mutations(batch).to_json());

        for (index, batch) in rendered.into_iter().enumerate() {
            info!("[DRY-RUN] Would submit batch {}: {}", index + 1, batch?);
        }
        Ok(())
    }
}

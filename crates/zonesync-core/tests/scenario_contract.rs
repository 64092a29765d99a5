//! Contract Test: Reconciliation Scenarios
//!
//! Constraints verified:
//! - A host missing from the zone becomes a CREATE with the default TTL
//! - A changed address becomes an UPSERT of the existing record
//! - A host gone from the directory becomes a DELETE of the record as stored
//! - A converged zone produces no mutations and no submissions

mod common;

use common::*;
use zonesync_core::model::{ChangeAction, HostSnapshot, MutationAction};
use zonesync_core::wire::ChangeBatch;
use zonesync_core::{MemoryZoneStore, Reconciler};

async fn run(
    live: HostSnapshot,
    existing: Vec<zonesync_core::ZoneRecord>,
) -> (zonesync_core::ReconcileReport, FlakyZoneStore) {
    let store = FlakyZoneStore::new(MemoryZoneStore::with_records(existing));
    let reconciler = Reconciler::new(
        Box::new(CountingDirectory::new(live)),
        Box::new(store.clone()),
        &config(),
    )
    .expect("reconciler construction succeeds");

    let report = reconciler.run().await.expect("run succeeds");
    (report, store)
}

#[tokio::test]
async fn missing_host_is_created() {
    let (report, store) = run(hosts(&[("web1", 1)]), vec![]).await;

    assert_eq!(
        report.mutations,
        vec![MutationAction::Create(record("web1", &[1]))]
    );

    let submitted = store.attempts();
    assert_eq!(submitted.len(), 1);
    let wire = serde_json::to_value(ChangeBatch::from_mutations(&submitted[0])).unwrap();
    assert_eq!(
        wire,
        serde_json::json!({
            "Changes": [{
                "Action": "CREATE",
                "ResourceRecordSet": {
                    "Name": "web1.example.com.",
                    "Type": "A",
                    "TTL": 300,
                    "ResourceRecords": [{"Value": "10.0.0.1"}]
                }
            }]
        })
    );
}

#[tokio::test]
async fn changed_address_is_upserted() {
    let (report, store) = run(hosts(&[("web1", 2)]), vec![record("web1", &[1])]).await;

    assert_eq!(report.hosts_to_add, 1);
    assert_eq!(report.hosts_to_prune, 1);
    assert_eq!(
        report.mutations,
        vec![MutationAction::Upsert(record("web1", &[2]))]
    );
    assert_eq!(store.records().await, vec![record("web1", &[2])]);
}

#[tokio::test]
async fn vanished_host_is_deleted() {
    let (report, store) = run(HostSnapshot::new(), vec![record("web1", &[1])]).await;

    assert_eq!(
        report.mutations,
        vec![MutationAction::Delete(record("web1", &[1]))]
    );
    assert!(store.records().await.is_empty());
}

#[tokio::test]
async fn converged_zone_submits_nothing() {
    let (report, store) = run(
        hosts(&[("web1", 1), ("web2", 2)]),
        vec![record("web1", &[1]), record("web2", &[2])],
    )
    .await;

    assert!(report.is_converged());
    assert_eq!(report.batches_submitted, 0);
    assert_eq!(store.apply_call_count(), 0);
}

#[tokio::test]
async fn mixed_plan_is_sorted_by_hostname() {
    let (report, _store) = run(
        hosts(&[("app", 1), ("web", 2), ("web", 3)]),
        vec![record("db", &[9]), record("web", &[2])],
    )
    .await;

    let summary: Vec<(ChangeAction, &str)> = report
        .mutations
        .iter()
        .map(|mutation| (mutation.action(), mutation.hostname()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (ChangeAction::Create, "app"),
            (ChangeAction::Delete, "db"),
            (ChangeAction::Upsert, "web"),
        ]
    );
    assert_eq!(
        report.mutations[2].record().values,
        vec![ip(2), ip(3)],
        "upsert values are the union in ascending order"
    );
}

#[tokio::test]
async fn upsert_keeps_existing_ttl() {
    let mut existing = record("web1", &[1]);
    existing.ttl = 60;

    let (report, _store) = run(hosts(&[("web1", 1), ("web1", 2)]), vec![existing]).await;

    let upsert = &report.mutations[0];
    assert_eq!(upsert.action(), ChangeAction::Upsert);
    assert_eq!(upsert.record().ttl, 60);
    assert_eq!(upsert.record().values, vec![ip(1), ip(2)]);
}

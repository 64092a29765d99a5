//! Test doubles and common utilities for reconciliation contract tests
//!
//! This module provides minimal collaborators that record how the
//! reconciler drives them.

#![allow(dead_code)]

use async_trait::async_trait;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use zonesync_core::error::{Error, Result};
use zonesync_core::model::{HostRecord, HostSnapshot, MutationAction, ZoneRecord, ZoneRef};
use zonesync_core::traits::{HostFilter, InstanceDirectory, ZoneStore};
use zonesync_core::{MemoryZoneStore, SyncConfig};

/// Zone every contract test reconciles
pub const ZONE_ID: &str = "Z0123456789";
pub const ZONE_NAME: &str = "example.com";

pub fn zone() -> ZoneRef {
    ZoneRef::new(ZONE_ID, ZONE_NAME)
}

pub fn config() -> SyncConfig {
    SyncConfig::new(ZONE_ID, ZONE_NAME)
}

pub fn ip(last: u8) -> Ipv4Addr {
    Ipv4Addr::new(10, 0, 0, last)
}

/// Snapshot from (hostname, last octet) pairs
pub fn hosts(pairs: &[(&str, u8)]) -> HostSnapshot {
    pairs
        .iter()
        .map(|(hostname, last)| HostRecord::new(*hostname, ip(*last)))
        .collect()
}

/// Zone record with TTL 300 and the given last octets
pub fn record(hostname: &str, lasts: &[u8]) -> ZoneRecord {
    ZoneRecord::new(&zone(), hostname, 300, lasts.iter().map(|last| ip(*last)))
}

/// Directory returning a fixed snapshot and counting calls
pub struct CountingDirectory {
    hosts: HostSnapshot,
    list_call_count: Arc<AtomicUsize>,
}

impl CountingDirectory {
    pub fn new(hosts: HostSnapshot) -> Self {
        Self {
            hosts,
            list_call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a directory sharing counters with another one
    pub fn sharing_counters_with(other: &CountingDirectory, hosts: HostSnapshot) -> Self {
        Self {
            hosts,
            list_call_count: Arc::clone(&other.list_call_count),
        }
    }

    pub fn list_call_count(&self) -> usize {
        self.list_call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InstanceDirectory for CountingDirectory {
    async fn list_hosts(&self, _filter: &HostFilter) -> Result<HostSnapshot> {
        self.list_call_count.fetch_add(1, Ordering::SeqCst);
        Ok(self.hosts.clone())
    }

    fn directory_name(&self) -> &'static str {
        "counting"
    }
}

/// Directory that always fails
pub struct FailingDirectory;

#[async_trait]
impl InstanceDirectory for FailingDirectory {
    async fn list_hosts(&self, _filter: &HostFilter) -> Result<HostSnapshot> {
        Err(Error::directory("describe instances denied"))
    }

    fn directory_name(&self) -> &'static str {
        "failing"
    }
}

/// Zone store wrapping a [`MemoryZoneStore`] that rejects one batch
///
/// Every `apply_batch` call is recorded, including the rejected one.
#[derive(Clone)]
pub struct FlakyZoneStore {
    inner: MemoryZoneStore,
    fail_on_batch: Option<usize>,
    attempts: Arc<Mutex<Vec<Vec<MutationAction>>>>,
}

impl FlakyZoneStore {
    /// Store that never fails
    pub fn new(inner: MemoryZoneStore) -> Self {
        Self {
            inner,
            fail_on_batch: None,
            attempts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Store that rejects the batch with the given zero-based index
    pub fn failing_on(inner: MemoryZoneStore, batch_index: usize) -> Self {
        Self {
            fail_on_batch: Some(batch_index),
            ..Self::new(inner)
        }
    }

    /// Batches submitted so far, in order
    pub fn attempts(&self) -> Vec<Vec<MutationAction>> {
        self.attempts.lock().unwrap().clone()
    }

    /// Records currently held by the wrapped store
    pub async fn records(&self) -> Vec<ZoneRecord> {
        self.inner.records().await
    }

    pub fn apply_call_count(&self) -> usize {
        self.attempts.lock().unwrap().len()
    }
}

#[async_trait]
impl ZoneStore for FlakyZoneStore {
    async fn list_records(&self, zone: &ZoneRef) -> Result<Vec<ZoneRecord>> {
        self.inner.list_records(zone).await
    }

    async fn apply_batch(&self, zone: &ZoneRef, batch: &[MutationAction]) -> Result<()> {
        let index = {
            let mut attempts = self.attempts.lock().unwrap();
            attempts.push(batch.to_vec());
            attempts.len() - 1
        };

        if self.fail_on_batch == Some(index) {
            return Err(Error::zone_store(format!("batch {} rejected", index)));
        }
        self.inner.apply_batch(zone, batch).await
    }

    fn store_name(&self) -> &'static str {
        "flaky"
    }
}

/// Zone store serving a fixed record list, which may hold duplicates
#[derive(Clone)]
pub struct FixedZoneStore {
    records: Vec<ZoneRecord>,
    apply_call_count: Arc<AtomicUsize>,
}

impl FixedZoneStore {
    pub fn new(records: Vec<ZoneRecord>) -> Self {
        Self {
            records,
            apply_call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn apply_call_count(&self) -> usize {
        self.apply_call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ZoneStore for FixedZoneStore {
    async fn list_records(&self, _zone: &ZoneRef) -> Result<Vec<ZoneRecord>> {
        Ok(self.records.clone())
    }

    async fn apply_batch(&self, _zone: &ZoneRef, _batch: &[MutationAction]) -> Result<()> {
        self.apply_call_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn store_name(&self) -> &'static str {
        "fixed"
    }
}

/// Zone store that reports records the way a remote provider lists them
///
/// Each record's hostname is re-derived from its name; records whose name
/// does not map to a hostname of the zone are not listed.
#[derive(Clone)]
pub struct ListingZoneStore {
    inner: MemoryZoneStore,
}

impl ListingZoneStore {
    pub fn new(inner: MemoryZoneStore) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ZoneStore for ListingZoneStore {
    async fn list_records(&self, zone: &ZoneRef) -> Result<Vec<ZoneRecord>> {
        Ok(self
            .inner
            .list_records(zone)
            .await?
            .into_iter()
            .filter_map(|record| {
                let hostname = zone.hostname_of(&record.name)?;
                Some(ZoneRecord { hostname, ..record })
            })
            .collect())
    }

    async fn apply_batch(&self, zone: &ZoneRef, batch: &[MutationAction]) -> Result<()> {
        self.inner.apply_batch(zone, batch).await
    }

    fn store_name(&self) -> &'static str {
        "listing"
    }
}

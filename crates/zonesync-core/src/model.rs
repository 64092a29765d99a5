//! Data model shared by the engine and its collaborators
//!
//! - [`HostRecord`] / [`HostSnapshot`]: the (hostname, IP) pairs compared between runs
//! - [`ZoneRecord`]: one address record as the zone store holds it
//! - [`HostChange`]: the merged per-hostname delta
//! - [`MutationAction`]: one rendered zone mutation

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::net::Ipv4Addr;

/// Record type of every record this crate manages
pub const RECORD_TYPE: &str = "A";

/// Default TTL for records created by the engine
pub const DEFAULT_TTL: u32 = 300;

static NO_ADDRESSES: BTreeSet<Ipv4Addr> = BTreeSet::new();

/// Canonical form of a hostname the zone can publish
///
/// Hostnames are a single lowercase label of ASCII letters, digits, `-` and
/// `_`. Anything else (dots, wildcards, characters a provider would escape)
/// cannot be read back from the zone under the same name and yields `None`.
pub fn normalize_hostname(raw: &str) -> Option<String> {
    let hostname = raw.trim().to_ascii_lowercase();
    let valid = !hostname.is_empty()
        && hostname
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');

    valid.then_some(hostname)
}

/// An immutable (hostname, IP address) pair
///
/// Equality, ordering and hashing are structural, so two records for the same
/// hostname with different addresses coexist in a [`HostSnapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HostRecord {
    hostname: String,
    ip_address: Ipv4Addr,
}

impl HostRecord {
    /// Create a new host record
    pub fn new(hostname: impl Into<String>, ip_address: Ipv4Addr) -> Self {
        Self {
            hostname: hostname.into(),
            ip_address,
        }
    }

    /// The short hostname (no zone suffix)
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// The address bound to the hostname
    pub fn ip_address(&self) -> Ipv4Addr {
        self.ip_address
    }
}

impl fmt::Display for HostRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.hostname, self.ip_address)
    }
}

/// A duplicate-free set of [`HostRecord`] captured at one point in time
///
/// Iteration is in (hostname, address) order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HostSnapshot {
    hosts: BTreeSet<HostRecord>,
}

impl HostSnapshot {
    /// Create an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Flatten zone records into the (hostname, IP) pairs they publish
    pub fn from_zone_records<'a>(records: impl IntoIterator<Item = &'a ZoneRecord>) -> Self {
        records
            .into_iter()
            .flat_map(|record| record.host_records())
            .collect()
    }

    /// Insert a record, returning false if it was already present
    pub fn insert(&mut self, host: HostRecord) -> bool {
        self.hosts.insert(host)
    }

    /// Whether the snapshot contains the record
    pub fn contains(&self, host: &HostRecord) -> bool {
        self.hosts.contains(host)
    }

    /// Records present here and absent from `other`
    pub fn difference(&self, other: &HostSnapshot) -> HostSnapshot {
        self.hosts.difference(&other.hosts).cloned().collect()
    }

    /// Iterate the records in order
    pub fn iter(&self) -> impl Iterator<Item = &HostRecord> {
        self.hosts.iter()
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    /// Whether the snapshot is empty
    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}

impl FromIterator<HostRecord> for HostSnapshot {
    fn from_iter<I: IntoIterator<Item = HostRecord>>(iter: I) -> Self {
        Self {
            hosts: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for HostSnapshot {
    type Item = HostRecord;
    type IntoIter = std::collections::btree_set::IntoIter<HostRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.hosts.into_iter()
    }
}

impl<'a> IntoIterator for &'a HostSnapshot {
    type Item = &'a HostRecord;
    type IntoIter = std::collections::btree_set::Iter<'a, HostRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.hosts.iter()
    }
}

/// Identity of the zone a run reconciles
///
/// The zone name is kept without its trailing dot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneRef {
    zone_id: String,
    zone_name: String,
}

impl ZoneRef {
    /// Create a zone reference
    pub fn new(zone_id: impl Into<String>, zone_name: impl Into<String>) -> Self {
        let zone_name: String = zone_name.into();
        Self {
            zone_id: zone_id.into(),
            zone_name: zone_name.trim_end_matches('.').to_string(),
        }
    }

    /// Provider identifier of the zone
    pub fn zone_id(&self) -> &str {
        &self.zone_id
    }

    /// Zone name without trailing dot (e.g. `example.com`)
    pub fn zone_name(&self) -> &str {
        &self.zone_name
    }

    /// Dot-terminated record name for a hostname in this zone
    pub fn fqdn(&self, hostname: &str) -> String {
        format!("{}.{}.", hostname, self.zone_name)
    }

    /// Hostname of a record name in this zone
    ///
    /// Returns `None` for the apex, for names outside the zone and for
    /// multi-label hostnames. Matching is case-insensitive and the result
    /// is lowercase.
    pub fn hostname_of(&self, record_name: &str) -> Option<String> {
        let name = record_name.to_ascii_lowercase();
        let name = name.strip_suffix('.').unwrap_or(&name);
        let suffix = format!(".{}", self.zone_name.to_ascii_lowercase());
        let hostname = name.strip_suffix(suffix.as_str())?;

        normalize_hostname(hostname)
    }
}

/// One address record as held by the zone store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneRecord {
    /// Dot-terminated FQDN, exactly as the provider reports it
    pub name: String,
    /// Hostname the record is keyed by
    pub hostname: String,
    /// Time-to-live in seconds
    pub ttl: u32,
    /// Published addresses
    pub values: Vec<Ipv4Addr>,
}

impl ZoneRecord {
    /// Build a fresh record for a hostname in a zone
    pub fn new(
        zone: &ZoneRef,
        hostname: impl Into<String>,
        ttl: u32,
        values: impl IntoIterator<Item = Ipv4Addr>,
    ) -> Self {
        let hostname = hostname.into();
        Self {
            name: zone.fqdn(&hostname),
            hostname,
            ttl,
            values: values.into_iter().collect(),
        }
    }

    /// A new record with every field of this one except `values`
    pub fn with_values(&self, values: impl IntoIterator<Item = Ipv4Addr>) -> Self {
        Self {
            name: self.name.clone(),
            hostname: self.hostname.clone(),
            ttl: self.ttl,
            values: values.into_iter().collect(),
        }
    }

    /// The (hostname, IP) pairs this record publishes
    pub fn host_records(&self) -> impl Iterator<Item = HostRecord> + '_ {
        self.values
            .iter()
            .map(|ip| HostRecord::new(self.hostname.clone(), *ip))
    }
}

/// Per-hostname merge of the diff sets
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostChange {
    /// Hostname the change applies to
    pub hostname: String,
    /// Addresses live in the directory but missing from the zone
    pub to_add: Option<BTreeSet<Ipv4Addr>>,
    /// Addresses in the zone but no longer live
    pub to_prune: Option<BTreeSet<Ipv4Addr>>,
}

impl HostChange {
    /// Create an empty change for a hostname
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            to_add: None,
            to_prune: None,
        }
    }

    /// Addresses to add (empty when absent)
    pub fn added(&self) -> &BTreeSet<Ipv4Addr> {
        self.to_add.as_ref().unwrap_or(&NO_ADDRESSES)
    }

    /// Addresses to prune (empty when absent)
    pub fn pruned(&self) -> &BTreeSet<Ipv4Addr> {
        self.to_prune.as_ref().unwrap_or(&NO_ADDRESSES)
    }
}

/// Kind of a zone mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeAction {
    /// Create a record that does not exist yet
    Create,
    /// Replace the values of an existing record
    Upsert,
    /// Remove an existing record
    Delete,
}

impl ChangeAction {
    /// Wire name of the action
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeAction::Create => "CREATE",
            ChangeAction::Upsert => "UPSERT",
            ChangeAction::Delete => "DELETE",
        }
    }
}

impl fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One rendered zone mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationAction {
    /// Brand-new record for a hostname missing from the zone
    Create(ZoneRecord),
    /// Existing record with its values replaced
    Upsert(ZoneRecord),
    /// Existing record, unmodified, to be removed
    Delete(ZoneRecord),
}

impl MutationAction {
    /// Kind of this mutation
    pub fn action(&self) -> ChangeAction {
        match self {
            MutationAction::Create(_) => ChangeAction::Create,
            MutationAction::Upsert(_) => ChangeAction::Upsert,
            MutationAction::Delete(_) => ChangeAction::Delete,
        }
    }

    /// The record carried by this mutation
    pub fn record(&self) -> &ZoneRecord {
        match self {
            MutationAction::Create(record)
            | MutationAction::Upsert(record)
            | MutationAction::Delete(record) => record,
        }
    }

    /// Hostname the mutation targets
    pub fn hostname(&self) -> &str {
        &self.record().hostname
    }
}

impl fmt::Display for MutationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let record = self.record();
        let values: Vec<String> = record.values.iter().map(|ip| ip.to_string()).collect();
        write!(f, "{} {} [{}]", self.action(), record.name, values.join(", "))
    }
}

//! Record renderer
//!
//! Applies one hostname's [`HostChange`] to its existing record and picks
//! the mutation:
//!
//! | existing | new address set | mutation |
//! |----------|-----------------|----------|
//! | none     | -               | CREATE   |
//! | some     | empty           | DELETE   |
//! | some     | non-empty       | UPSERT   |
//!
//! Addresses in a rendered record are in ascending order so identical input
//! renders identically.

use std::collections::BTreeSet;
use std::net::Ipv4Addr;

use tracing::debug;

use crate::error::{Error, Result};
use crate::model::{HostChange, MutationAction, ZoneRecord, ZoneRef};

/// Render the mutation for one hostname
///
/// # Parameters
///
/// - `change`: Merged change for the hostname
/// - `existing`: The zone's current record for the hostname, if any
/// - `zone`: Zone the record lives in
/// - `default_ttl`: TTL for records created here
///
/// # Errors
///
/// - [`Error::InconsistentChange`] if addresses are pruned from a hostname
///   the zone has no record for
/// - [`Error::EmptyChange`] if there is no record and nothing to add
pub fn render(
    change: &HostChange,
    existing: Option<&ZoneRecord>,
    zone: &ZoneRef,
    default_ttl: u32,
) -> Result<MutationAction> {
    let mutation = match existing {
        Some(existing) => {
            let new_ips: BTreeSet<Ipv4Addr> = existing
                .values
                .iter()
                .chain(change.added())
                .filter(|ip| !change.pruned().contains(*ip))
                .copied()
                .collect();

            if new_ips.is_empty() {
                MutationAction::Delete(existing.clone())
            } else {
                MutationAction::Upsert(existing.with_values(new_ips))
            }
        }
        None => {
            if !change.pruned().is_empty() {
                return Err(Error::InconsistentChange {
                    hostname: change.hostname.clone(),
                    pruned: change.pruned().iter().copied().collect(),
                });
            }
            if change.added().is_empty() {
                return Err(Error::EmptyChange {
                    hostname: change.hostname.clone(),
                });
            }

            MutationAction::Create(ZoneRecord::new(
                zone,
                change.hostname.clone(),
                default_ttl,
                change.added().iter().copied(),
            ))
        }
    };

    debug!("Rendered {}", mutation);
    Ok(mutation)
}

//! Per-hostname merge of the diff sets
//!
//! A zone mutation must carry the whole new record for a name, so the
//! per-IP diff is regrouped by hostname before rendering.

use std::collections::BTreeMap;

use crate::model::{HostChange, HostSnapshot};

/// Hostname-keyed changes, iterated in hostname order
pub type ChangeSet = BTreeMap<String, HostChange>;

/// Group the diff sets by hostname
///
/// Every hostname of either input appears exactly once. A hostname only
/// present in `to_add` has `to_prune == None` and vice versa.
pub fn merge(to_add: &HostSnapshot, to_prune: &HostSnapshot) -> ChangeSet {
    let mut changes = ChangeSet::new();

    for host in to_add {
        change_for(&mut changes, host.hostname())
            .to_add
            .get_or_insert_with(Default::default)
            .insert(host.ip_address());
    }

    for host in to_prune {
        change_for(&mut changes, host.hostname())
            .to_prune
            .get_or_insert_with(Default::default)
            .insert(host.ip_address());
    }

    changes
}

fn change_for<'a>(changes: &'a mut ChangeSet, hostname: &str) -> &'a mut HostChange {
    changes
        .entry(hostname.to_string())
        .or_insert_with(|| HostChange::new(hostname))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::HostRecord;
    use std::collections::BTreeSet;
    use std::net::Ipv4Addr;

    fn ip(last: u8) -> Ipv4Addr {
        Ipv4Addr::new(10, 0, 0, last)
    }

    fn snapshot(hosts: &[(&str, u8)]) -> HostSnapshot {
        hosts
            .iter()
            .map(|(name, last)| HostRecord::new(*name, ip(*last)))
            .collect()
    }

    #[test]
    fn test_empty_merge() {
        assert!(merge(&HostSnapshot::new(), &HostSnapshot::new()).is_empty());
    }

    #[test]
    fn test_groups_by_hostname() {
        let to_add = snapshot(&[("web1", 2), ("web1", 3), ("db1", 5)]);
        let to_prune = snapshot(&[("web1", 1), ("old", 9)]);

        let changes = merge(&to_add, &to_prune);
        assert_eq!(changes.len(), 3);

        let web1 = &changes["web1"];
        assert_eq!(web1.to_add, Some(BTreeSet::from([ip(2), ip(3)])));
        assert_eq!(web1.to_prune, Some(BTreeSet::from([ip(1)])));

        let db1 = &changes["db1"];
        assert_eq!(db1.to_add, Some(BTreeSet::from([ip(5)])));
        assert_eq!(db1.to_prune, None);

        let old = &changes["old"];
        assert_eq!(old.to_add, None);
        assert_eq!(old.to_prune, Some(BTreeSet::from([ip(9)])));
    }

    #[test]
    fn test_keys_are_ordered() {
        let to_add = snapshot(&[("zeta", 1), ("alpha", 2), ("mid", 3)]);
        let merged = merge(&to_add, &HostSnapshot::new());
        let keys: Vec<&str> = merged
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, vec!["alpha", "mid", "zeta"]);
    }
}

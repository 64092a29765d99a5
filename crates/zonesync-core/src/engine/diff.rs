//! Snapshot differ
//!
//! `to_add = live − zone`, `to_prune = zone − live`, compared on the full
//! (hostname, IP) pair.

use crate::model::HostSnapshot;

/// Result of comparing the live inventory with the zone
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotDiff {
    /// Pairs live in the directory but absent from the zone
    pub to_add: HostSnapshot,
    /// Pairs in the zone that are no longer live
    pub to_prune: HostSnapshot,
}

impl SnapshotDiff {
    /// Whether the zone already matches the inventory
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_prune.is_empty()
    }
}

/// Compare the live inventory with the zone
pub fn diff(live: &HostSnapshot, zone: &HostSnapshot) -> SnapshotDiff {
    SnapshotDiff {
        to_add: live.difference(zone),
        to_prune: zone.difference(live),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::HostRecord;
    use std::net::Ipv4Addr;

    fn host(name: &str, last: u8) -> HostRecord {
        HostRecord::new(name, Ipv4Addr::new(10, 0, 0, last))
    }

    #[test]
    fn test_empty_inputs() {
        let result = diff(&HostSnapshot::new(), &HostSnapshot::new());
        assert!(result.is_empty());
    }

    #[test]
    fn test_same_snapshot_is_noop() {
        let snapshot: HostSnapshot = [host("web1", 1), host("web2", 2)].into_iter().collect();
        assert!(diff(&snapshot, &snapshot).is_empty());
    }

    #[test]
    fn test_changed_address_shows_on_both_sides() {
        let live: HostSnapshot = [host("web1", 2)].into_iter().collect();
        let zone: HostSnapshot = [host("web1", 1)].into_iter().collect();

        let result = diff(&live, &zone);
        assert_eq!(result.to_add, [host("web1", 2)].into_iter().collect());
        assert_eq!(result.to_prune, [host("web1", 1)].into_iter().collect());
    }

    #[test]
    fn test_partial_overlap() {
        let live: HostSnapshot = [host("web1", 1), host("web1", 2), host("db1", 5)]
            .into_iter()
            .collect();
        let zone: HostSnapshot = [host("web1", 1), host("old", 9)].into_iter().collect();

        let result = diff(&live, &zone);
        assert_eq!(result.to_add.len(), 2);
        assert!(result.to_add.contains(&host("web1", 2)));
        assert!(result.to_add.contains(&host("db1", 5)));
        assert_eq!(result.to_prune, [host("old", 9)].into_iter().collect());
    }
}

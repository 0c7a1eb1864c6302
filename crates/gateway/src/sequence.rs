//! Ordering of concurrent list refreshes.
//!
//! Two refreshes of the same listing can finish out of order. Each refresh
//! takes a [`Ticket`] before it starts; [`SnapshotStore::accept`] only
//! replaces a snapshot when the finishing refresh started after the one that
//! produced it.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use moka::ops::compute::{CompResult, Op};
use moka::policy::EvictionPolicy;
use moka::sync::Cache;

/// Position of a request in issue order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

/// Issues strictly increasing tickets.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    issued: AtomicU64,
}

impl RequestSequencer {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            issued: AtomicU64::new(0),
        }
    }

    pub fn issue(&self) -> Ticket {
        Ticket(self.issued.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

/// Default number of keys a [`SnapshotStore`] keeps.
pub const DEFAULT_SNAPSHOT_CAPACITY: u64 = 256;

/// Last-known-good values keyed by query, guarded by ticket order.
///
/// Holds about `capacity` keys; past that the least recently used key is
/// evicted.
pub struct SnapshotStore<T> {
    snapshots: Cache<String, (Ticket, T)>,
}

impl<T> SnapshotStore<T>
where
    T: Clone + Send + Sync + 'static,
{
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_SNAPSHOT_CAPACITY)
    }

    #[must_use]
    pub fn with_capacity(capacity: u64) -> Self {
        Self {
            snapshots: Cache::builder()
                .max_capacity(capacity.max(1))
                .eviction_policy(EvictionPolicy::lru())
                .build(),
        }
    }

    /// Store `value` for `key` unless a newer ticket already wrote it.
    ///
    /// Returns `false` when the value was discarded as superseded. Writes to
    /// one key are serialized, so the ticket check and the replace are atomic.
    pub fn accept(&self, key: &str, ticket: Ticket, value: T) -> bool {
        let result = self
            .snapshots
            .entry_by_ref(key)
            .and_compute_with(|current| match current {
                Some(entry) if entry.value().0 > ticket => Op::Nop,
                _ => Op::Put((ticket, value)),
            });
        !matches!(result, CompResult::Unchanged(_))
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<T> {
        self.snapshots.get(key).map(|(_, value)| value)
    }

    /// Number of stored keys, after pending evictions are applied.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.snapshots.run_pending_tasks();
        self.snapshots.entry_count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for SnapshotStore<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for SnapshotStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapshotStore")
            .field("entries", &self.snapshots.entry_count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tickets_increase() {
        let sequencer = RequestSequencer::new();
        let first = sequencer.issue();
        let second = sequencer.issue();
        assert!(second > first);
        assert_eq!(first.value(), 1);
    }

    #[test]
    fn test_late_older_response_is_discarded() {
        let sequencer = RequestSequencer::new();
        let store = SnapshotStore::new();

        let slow = sequencer.issue();
        let fast = sequencer.issue();

        assert!(store.accept("q=usb", fast, "fresh"));
        assert!(!store.accept("q=usb", slow, "stale"));
        assert_eq!(store.get("q=usb"), Some("fresh"));
    }

    #[test]
    fn test_keys_are_independent() {
        let sequencer = RequestSequencer::new();
        let store = SnapshotStore::new();

        let older = sequencer.issue();
        let newer = sequencer.issue();
        assert!(store.accept("page=2", newer, 2));
        assert!(store.accept("page=1", older, 1));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_equal_ticket_rewrites() {
        let sequencer = RequestSequencer::new();
        let store = SnapshotStore::new();

        let ticket = sequencer.issue();
        assert!(store.accept("q=usb", ticket, 1));
        assert!(store.accept("q=usb", ticket, 2));
        assert_eq!(store.get("q=usb"), Some(2));
    }

    #[test]
    fn test_concurrent_writers_keep_newest_ticket() {
        let sequencer = RequestSequencer::new();
        let store = SnapshotStore::new();
        let tickets: Vec<_> = (0..32).map(|_| sequencer.issue()).collect();
        let newest = tickets.iter().copied().max().map(Ticket::value);

        std::thread::scope(|scope| {
            for ticket in tickets.iter().rev() {
                let store = &store;
                scope.spawn(move || store.accept("q=ssd", *ticket, ticket.value()));
            }
        });

        assert_eq!(store.get("q=ssd"), newest);
    }

    #[test]
    fn test_capacity_evicts_least_recent_key() {
        let sequencer = RequestSequencer::new();
        let store = SnapshotStore::with_capacity(2);

        store.accept("a", sequencer.issue(), 1);
        store.accept("b", sequencer.issue(), 2);
        store.accept("a", sequencer.issue(), 3);
        store.accept("c", sequencer.issue(), 4);

        assert_eq!(store.len(), 2);
        assert_eq!(store.get("b"), None);
        assert_eq!(store.get("a"), Some(3));
        assert_eq!(store.get("c"), Some(4));
    }
}

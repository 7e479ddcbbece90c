// ── Generic reactive keyed collection ──
//
// Lock-free concurrent storage with O(1) lookups and push-based
// change notification via `watch` channels.

use std::hash::Hash;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::watch;

/// A lock-free, reactive collection for a single entity type.
///
/// Uses `DashMap` for O(1) concurrent lookups and a `watch` channel
/// for push-based change notification. Every mutation rebuilds the
/// key-ordered snapshot that subscribers receive.
pub(crate) struct Collection<K, V>
where
    K: Eq + Hash + Ord + Clone + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    by_key: DashMap<K, Arc<V>>,

    /// Full snapshot ordered by key, rebuilt on mutation.
    snapshot: watch::Sender<Arc<Vec<Arc<V>>>>,
}

impl<K, V> Collection<K, V>
where
    K: Eq + Hash + Ord + Clone + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    pub(crate) fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            by_key: DashMap::new(),
            snapshot,
        }
    }

    /// Insert or replace an entity. Returns `true` if the key was new.
    pub(crate) fn upsert(&self, key: K, entity: V) -> bool {
        let is_new = self.by_key.insert(key, Arc::new(entity)).is_none();
        self.rebuild_snapshot();
        is_new
    }

    /// Remove an entity by key. Returns the removed entity if it existed.
    pub(crate) fn remove(&self, key: &K) -> Option<Arc<V>> {
        let removed = self.by_key.remove(key).map(|(_, v)| v);
        if removed.is_some() {
            self.rebuild_snapshot();
        }
        removed
    }

    /// Drop every entry whose value fails `keep`.
    pub(crate) fn retain(&self, mut keep: impl FnMut(&K, &V) -> bool) {
        let before = self.by_key.len();
        self.by_key.retain(|k, v| keep(k, &**v));
        if self.by_key.len() != before {
            self.rebuild_snapshot();
        }
    }

    pub(crate) fn get(&self, key: &K) -> Option<Arc<V>> {
        self.by_key.get(key).map(|r| Arc::clone(r.value()))
    }

    pub(crate) fn contains(&self, key: &K) -> bool {
        self.by_key.contains_key(key)
    }

    /// Get the current snapshot (cheap `Arc` clone).
    pub(crate) fn snapshot(&self) -> Arc<Vec<Arc<V>>> {
        self.snapshot.borrow().clone()
    }

    /// Subscribe to snapshot changes via a `watch::Receiver`.
    pub(crate) fn subscribe(&self) -> watch::Receiver<Arc<Vec<Arc<V>>>> {
        self.snapshot.subscribe()
    }

    /// Remove all entities.
    pub(crate) fn clear(&self) {
        self.by_key.clear();
        self.rebuild_snapshot();
    }

    pub(crate) fn len(&self) -> usize {
        self.by_key.len()
    }

    #[allow(dead_code)]
    pub(crate) fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    // ── Private helpers ──────────────────────────────────────────────

    /// Collect all values in key order and broadcast to subscribers.
    fn rebuild_snapshot(&self) {
        let mut entries: Vec<(K, Arc<V>)> = self
            .by_key
            .iter()
            .map(|r| (r.key().clone(), Arc::clone(r.value())))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        let values: Vec<Arc<V>> = entries.into_iter().map(|(_, v)| v).collect();
        // `send_modify` updates unconditionally, even with zero receivers.
        self.snapshot.send_modify(|snap| *snap = Arc::new(values));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn upsert_returns_true_for_new_key() {
        let col: Collection<u16, String> = Collection::new();
        assert!(col.upsert(1, "hello".into()));
    }

    #[test]
    fn upsert_returns_false_for_existing_key() {
        let col: Collection<u16, String> = Collection::new();
        col.upsert(1, "hello".into());
        assert!(!col.upsert(1, "world".into()));
        assert_eq!(*col.get(&1).unwrap(), "world");
    }

    #[test]
    fn snapshot_is_ordered_by_key() {
        let col: Collection<u16, &'static str> = Collection::new();
        col.upsert(3, "c");
        col.upsert(1, "a");
        col.upsert(2, "b");

        let snap = col.snapshot();
        let values: Vec<&str> = snap.iter().map(|v| **v).collect();
        assert_eq!(values, vec!["a", "b", "c"]);
    }

    #[test]
    fn remove_and_retain() {
        let col: Collection<u32, u32> = Collection::new();
        for n in 1..=5 {
            col.upsert(n, n * 10);
        }
        assert_eq!(*col.remove(&1).unwrap(), 10);
        assert!(col.remove(&1).is_none());

        col.retain(|k, _| *k <= 3);
        assert_eq!(col.len(), 2);
        assert!(col.contains(&2));
        assert!(!col.contains(&4));
    }

    #[test]
    fn clear_empties_everything() {
        let col: Collection<String, u8> = Collection::new();
        col.upsert("a".into(), 1);
        col.upsert("b".into(), 2);
        assert_eq!(col.len(), 2);

        col.clear();
        assert!(col.is_empty());
        assert!(col.snapshot().is_empty());
    }

    #[tokio::test]
    async fn subscriber_receives_updates() {
        let col: Collection<u16, String> = Collection::new();
        let mut rx = col.subscribe();
        assert!(rx.borrow_and_update().is_empty());

        col.upsert(1, "x".into());
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().len(), 1);
    }
}

use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard, PoisonError};

use lru::LruCache;

use crate::coordinate::{Coordinate, PlaceKey};

/// Storage for resolved coordinates, shared between concurrent lookups.
///
/// Implementations must be cheap to call from async code: no blocking I/O and
/// no locks held beyond the map operation itself.
pub trait CoordinateCache: Send + Sync {
    fn get(&self, key: &PlaceKey) -> Option<Coordinate>;
    fn insert(&self, key: PlaceKey, coordinate: Coordinate);
    fn len(&self) -> usize;
    fn capacity(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Bounded in-memory cache that evicts the least recently used entry.
pub struct LruCoordinateCache {
    entries: Mutex<LruCache<PlaceKey, Coordinate>>,
    capacity: NonZeroUsize,
}

impl LruCoordinateCache {
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            capacity,
        }
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<PlaceKey, Coordinate>> {
        // Entries are plain values, so a panic mid-operation cannot leave them
        // inconsistent.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CoordinateCache for LruCoordinateCache {
    fn get(&self, key: &PlaceKey) -> Option<Coordinate> {
        self.lock().get(key).copied()
    }

    fn insert(&self, key: PlaceKey, coordinate: Coordinate) {
        self.lock().put(key, coordinate);
    }

    fn len(&self) -> usize {
        self.lock().len()
    }

    fn capacity(&self) -> usize {
        self.capacity.get()
    }
}

impl std::fmt::Debug for LruCoordinateCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LruCoordinateCache")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(city: &str) -> PlaceKey {
        PlaceKey::new(city, "SP")
    }

    fn coord(lat: f64) -> Coordinate {
        Coordinate::new(lat, -46.0).unwrap()
    }

    #[test]
    fn stores_and_returns_entries() {
        let cache = LruCoordinateCache::new(4);
        assert!(cache.is_empty());
        cache.insert(key("Santos"), coord(-23.96));
        assert_eq!(cache.get(&key("Santos")), Some(coord(-23.96)));
        assert_eq!(cache.get(&key("Campinas")), None);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn evicts_least_recently_used() {
        let cache = LruCoordinateCache::new(2);
        cache.insert(key("A"), coord(1.0));
        cache.insert(key("B"), coord(2.0));
        // Touch A so B becomes the eviction candidate.
        assert!(cache.get(&key("A")).is_some());
        cache.insert(key("C"), coord(3.0));

        assert_eq!(cache.len(), 2);
        assert!(cache.get(&key("A")).is_some());
        assert!(cache.get(&key("B")).is_none());
        assert!(cache.get(&key("C")).is_some());
    }

    #[test]
    fn zero_capacity_holds_one_entry() {
        let cache = LruCoordinateCache::new(0);
        assert_eq!(cache.capacity(), 1);
        cache.insert(key("A"), coord(1.0));
        cache.insert(key("B"), coord(2.0));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn reinsert_overwrites() {
        let cache = LruCoordinateCache::new(2);
        cache.insert(key("A"), coord(1.0));
        cache.insert(key("A"), coord(1.5));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&key("A")), Some(coord(1.5)));
    }
}

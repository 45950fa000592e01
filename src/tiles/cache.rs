use crate::{
    core::geo::TileCoord,
    prelude::{HashMap, HashSet},
};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

const DEFAULT_CAPACITY: usize = 512;
/// Failed downloads after which a tile is no longer requested
const MAX_FAILURES: u32 = 4;
/// Wait after the first failure; doubles with every further one
const RETRY_BACKOFF: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy)]
struct Failure {
    count: u32,
    retry_at: Instant,
}

#[derive(Debug)]
struct CacheState {
    tiles: LruCache<TileCoord, Arc<[u8]>>,
    /// Requested but not yet delivered
    pending: HashSet<TileCoord>,
    failed: HashMap<TileCoord, Failure>,
    backoff: Duration,
}

/// Downloaded tile images with LRU eviction, shared between the UI thread
/// and download threads.
///
/// Tiles that fail are held back with a doubling delay and given up on
/// after [`MAX_FAILURES`] attempts.
#[derive(Debug, Clone)]
pub struct TileCache {
    state: Arc<Mutex<CacheState>>,
}

impl TileCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            state: Arc::new(Mutex::new(CacheState {
                tiles: LruCache::new(capacity),
                pending: HashSet::default(),
                failed: HashMap::default(),
                backoff: RETRY_BACKOFF,
            })),
        }
    }

    /// Changes the delay before a failed tile is requested again
    pub fn with_retry_backoff(self, backoff: Duration) -> Self {
        self.lock().backoff = backoff;
        self
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn get(&self, coord: &TileCoord) -> Option<Arc<[u8]>> {
        self.lock().tiles.get(coord).cloned()
    }

    pub fn insert(&self, coord: TileCoord, data: Vec<u8>) {
        let mut state = self.lock();
        state.pending.remove(&coord);
        state.failed.remove(&coord);
        state.tiles.put(coord, data.into());
    }

    /// Claims a tile for download; `false` when it is cached, already on
    /// its way, waiting out a failure or given up on
    pub fn mark_pending(&self, coord: TileCoord) -> bool {
        let mut state = self.lock();
        if state.tiles.contains(&coord) {
            return false;
        }
        if let Some(failure) = state.failed.get(&coord) {
            if failure.count >= MAX_FAILURES || Instant::now() < failure.retry_at {
                return false;
            }
        }
        state.pending.insert(coord)
    }

    /// Releases a claim after a failed download and holds the tile back
    pub fn mark_failed(&self, coord: &TileCoord) {
        let mut state = self.lock();
        state.pending.remove(coord);

        let backoff = state.backoff;
        let count = state.failed.get(coord).map_or(0, |failure| failure.count) + 1;
        let delay = backoff.saturating_mul(1 << (count - 1).min(16));
        state.failed.insert(
            *coord,
            Failure {
                count,
                retry_at: Instant::now() + delay,
            },
        );
        if count >= MAX_FAILURES {
            log::warn!("giving up on tile {:?} after {} failures", coord, count);
        }
    }

    /// Drops tile bytes that turned out to be unusable; counts as a failure
    pub fn discard(&self, coord: &TileCoord) {
        self.lock().tiles.pop(coord);
        self.mark_failed(coord);
    }

    /// Number of failed downloads recorded for a tile
    pub fn failures(&self, coord: &TileCoord) -> u32 {
        self.lock().failed.get(coord).map_or(0, |failure| failure.count)
    }

    pub fn is_pending(&self, coord: &TileCoord) -> bool {
        self.lock().pending.contains(coord)
    }

    pub fn contains(&self, coord: &TileCoord) -> bool {
        self.lock().tiles.contains(coord)
    }

    pub fn clear(&self) {
        let mut state = self.lock();
        state.tiles.clear();
        state.pending.clear();
        state.failed.clear();
    }

    pub fn len(&self) -> usize {
        self.lock().tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.lock().tiles.cap().get()
    }
}

impl Default for TileCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let cache = TileCache::new(2);
        let coord = TileCoord::new(1, 2, 3);
        assert!(cache.is_empty());

        cache.insert(coord, vec![1, 2, 3]);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&coord).as_deref(), Some(&[1u8, 2, 3][..]));

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_lru_eviction() {
        let cache = TileCache::new(2);
        let coord1 = TileCoord::new(1, 1, 1);
        let coord2 = TileCoord::new(2, 2, 2);
        let coord3 = TileCoord::new(3, 3, 3);

        cache.insert(coord1, vec![1]);
        cache.insert(coord2, vec![2]);
        cache.insert(coord3, vec![3]);
        assert_eq!(cache.len(), 2);
        assert!(!cache.contains(&coord1));
        assert!(cache.contains(&coord2));
        assert!(cache.contains(&coord3));
    }

    #[test]
    fn test_pending_claims() {
        let cache = TileCache::default();
        let coord = TileCoord::new(150, 100, 8);

        assert!(cache.mark_pending(coord));
        assert!(!cache.mark_pending(coord));
        assert!(cache.is_pending(&coord));

        cache.insert(coord, vec![0]);
        assert!(!cache.is_pending(&coord));
        assert!(!cache.mark_pending(coord));
    }

    #[test]
    fn test_failed_tile_waits_before_retry() {
        let cache = TileCache::default();
        let coord = TileCoord::new(150, 100, 8);

        assert!(cache.mark_pending(coord));
        cache.mark_failed(&coord);
        assert!(!cache.is_pending(&coord));
        assert_eq!(cache.failures(&coord), 1);
        assert!(!cache.mark_pending(coord));
        assert!(!cache.mark_pending(coord));
    }

    #[test]
    fn test_failing_tile_is_given_up() {
        let cache = TileCache::new(8).with_retry_backoff(Duration::ZERO);
        let coord = TileCoord::new(3, 4, 5);

        for _ in 0..MAX_FAILURES {
            assert!(cache.mark_pending(coord));
            cache.mark_failed(&coord);
        }
        assert_eq!(cache.failures(&coord), MAX_FAILURES);
        assert!(!cache.mark_pending(coord));

        // A later delivery still counts
        cache.insert(coord, vec![1]);
        assert_eq!(cache.failures(&coord), 0);
        assert!(cache.contains(&coord));
    }

    #[test]
    fn test_discard_drops_bytes_and_allows_one_refetch() {
        let cache = TileCache::new(8).with_retry_backoff(Duration::ZERO);
        let coord = TileCoord::new(1, 1, 1);
        cache.insert(coord, b"not an image".to_vec());
        assert!(!cache.mark_pending(coord));

        cache.discard(&coord);
        assert!(!cache.contains(&coord));
        assert_eq!(cache.failures(&coord), 1);
        assert!(cache.mark_pending(coord));
    }

    #[test]
    fn test_zero_capacity_still_holds_a_tile() {
        let cache = TileCache::new(0);
        assert_eq!(cache.capacity(), 1);
    }
}

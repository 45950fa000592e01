use super::{cache::TileCache, source::TileSource};
use crate::{core::geo::TileCoord, MapError, Result};
use once_cell::sync::Lazy;
use reqwest::blocking::Client;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const MAX_ATTEMPTS: usize = 2;

/// Shared blocking HTTP client; public tile servers reject requests without
/// a User-Agent.
static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .user_agent(concat!("reliefmap/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap_or_else(|e| {
            log::warn!("falling back to default http client: {}", e);
            Client::new()
        })
});

type Delivery = (TileCoord, Result<Vec<u8>>);

/// Fetches one tile body
pub fn fetch_tile(url: &str) -> Result<Vec<u8>> {
    let resp = HTTP_CLIENT.get(url).send().map_err(MapError::from)?;
    if !resp.status().is_success() {
        return Err(MapError::Tile(format!("HTTP {} for {}", resp.status(), url)).into());
    }
    Ok(resp.bytes().map_err(MapError::from)?.to_vec())
}

/// Downloads tiles on detached threads and collects them into a [`TileCache`].
///
/// Failed downloads are retried once, then reported to the cache, which
/// holds the tile back before it may be requested again.
pub struct TileLoader {
    source: Arc<dyn TileSource>,
    cache: TileCache,
    tx: Sender<Delivery>,
    rx: Receiver<Delivery>,
}

impl TileLoader {
    pub fn new(source: Arc<dyn TileSource>, cache: TileCache) -> Self {
        let (tx, rx) = channel();
        Self {
            source,
            cache,
            tx,
            rx,
        }
    }

    pub fn cache(&self) -> &TileCache {
        &self.cache
    }

    /// Starts a download unless the tile is cached or already requested
    pub fn request(&self, coord: TileCoord) -> bool {
        if !self.cache.mark_pending(coord) {
            return false;
        }

        let url = self.source.url(coord);
        let tx = self.tx.clone();
        thread::spawn(move || {
            let mut attempt = 0;
            let result = loop {
                attempt += 1;
                log::debug!("fetch tile {:?} attempt {}", coord, attempt);
                match fetch_tile(&url) {
                    Ok(data) => break Ok(data),
                    Err(e) => {
                        log::warn!("tile {:?} download failed on attempt {}: {}", coord, attempt, e);
                        if attempt >= MAX_ATTEMPTS {
                            break Err(e);
                        }
                        thread::sleep(Duration::from_millis(100));
                    }
                }
            };
            let _ = tx.send((coord, result));
        });
        true
    }

    /// Moves finished downloads into the cache; returns the tiles that arrived
    pub fn poll(&self) -> Vec<TileCoord> {
        let mut arrived = Vec::new();
        for (coord, result) in self.rx.try_iter() {
            match result {
                Ok(data) => {
                    log::debug!("downloaded tile {:?} ({} bytes)", coord, data.len());
                    self.cache.insert(coord, data);
                    arrived.push(coord);
                }
                Err(e) => {
                    log::warn!("tile {:?} failed: {}", coord, e);
                    self.cache.mark_failed(&coord);
                }
            }
        }
        arrived
    }

    #[cfg(test)]
    fn deliver(&self, coord: TileCoord, result: Result<Vec<u8>>) {
        let _ = self.tx.send((coord, result));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Unreachable;

    impl TileSource for Unreachable {
        fn url(&self, coord: TileCoord) -> String {
            format!("http://127.0.0.1:9/{}/{}/{}.png", coord.z, coord.x, coord.y)
        }
    }

    fn loader() -> TileLoader {
        TileLoader::new(Arc::new(Unreachable), TileCache::new(8))
    }

    #[test]
    fn test_poll_moves_tiles_into_cache() {
        let loader = loader();
        let coord = TileCoord::new(1, 1, 1);
        assert!(loader.cache().mark_pending(coord));

        loader.deliver(coord, Ok(vec![7, 7]));
        assert_eq!(loader.poll(), vec![coord]);
        assert!(loader.cache().contains(&coord));
        assert!(!loader.request(coord));
    }

    #[test]
    fn test_failure_holds_tile_back() {
        let loader = loader();
        let coord = TileCoord::new(2, 2, 2);
        assert!(loader.cache().mark_pending(coord));

        loader.deliver(coord, Err(MapError::Tile("boom".into()).into()));
        assert!(loader.poll().is_empty());
        assert!(!loader.cache().is_pending(&coord));
        assert_eq!(loader.cache().failures(&coord), 1);
        assert!(!loader.request(coord));
    }

    #[test]
    fn test_dead_tile_is_fetched_once() {
        let loader = loader();
        let coord = TileCoord::new(4, 4, 4);
        let deadline = std::time::Instant::now() + Duration::from_secs(30);

        let mut started = 0;
        for _ in 0..3 {
            if loader.request(coord) {
                started += 1;
            }
            while loader.cache().is_pending(&coord) && std::time::Instant::now() < deadline {
                thread::sleep(Duration::from_millis(20));
                loader.poll();
            }
        }
        assert_eq!(started, 1);
        assert_eq!(loader.cache().failures(&coord), 1);
    }

    #[test]
    fn test_duplicate_requests_are_ignored() {
        let loader = loader();
        let coord = TileCoord::new(3, 3, 3);
        assert!(loader.request(coord));
        assert!(!loader.request(coord));
    }
}

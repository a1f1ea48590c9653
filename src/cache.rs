//! Content hashing and the serve-mode page cache.
//!
//! # Hashes
//!
//! Everything is SHA-256 rendered as lowercase hex:
//!
//! - **asset versions**: the first [`VERSION_LEN`] characters of the hash of
//!   `style.css` / `folio.js`, appended as `?v=` so browsers refetch only
//!   when the file changes.
//! - **content fingerprint**: hash of the snapshot's JSON form, printed by
//!   `folio check` and `folio fetch` so two fetches can be compared at a
//!   glance.
//! - **ETag**: hash of a rendered page.
//!
//! # Page cache
//!
//! Serve mode renders the published page at most once per revalidation
//! interval. The cached page lives behind a `tokio::sync::RwLock`; readers
//! share it while fresh, and the first request after expiry takes the write
//! lock, re-checks, and re-renders while later requests wait for the result.
//! Draft requests never touch the cache.
//!
//! There is no invalidation hook: edits show up once the interval expires
//! (or immediately in draft mode).

use crate::types::Snapshot;
use sha2::{Digest, Sha256};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

pub const VERSION_LEN: usize = 10;

pub fn hash_bytes(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Short cache-busting version for a static asset.
pub fn asset_version(bytes: &[u8]) -> String {
    let mut hash = hash_bytes(bytes);
    hash.truncate(VERSION_LEN);
    hash
}

/// Content fingerprint of a snapshot.
pub fn fingerprint(snapshot: &Snapshot) -> Result<String, serde_json::Error> {
    Ok(hash_bytes(&serde_json::to_vec(snapshot)?))
}

/// One rendered page.
#[derive(Debug, Clone)]
pub struct CachedPage {
    pub html: String,
    /// Quoted strong validator, ready for the `ETag` header.
    pub etag: String,
    rendered_at: Instant,
}

impl CachedPage {
    pub fn new(html: String) -> Self {
        let etag = format!("\"{}\"", &hash_bytes(html.as_bytes())[..16]);
        Self {
            html,
            etag,
            rendered_at: Instant::now(),
        }
    }

    fn is_fresh(&self, interval: Duration) -> bool {
        self.rendered_at.elapsed() < interval
    }
}

/// Hit and render counters.
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU32,
    renders: AtomicU32,
}

impl CacheStats {
    pub fn hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn render(&self) {
        self.renders.fetch_add(1, Ordering::Relaxed);
    }

    pub fn hits(&self) -> u32 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn renders(&self) -> u32 {
        self.renders.load(Ordering::Relaxed)
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (hits, renders) = (self.hits(), self.renders());
        if hits > 0 {
            write!(f, "{} cached, {} rendered ({} total)", hits, renders, hits + renders)
        } else {
            write!(f, "{} rendered", renders)
        }
    }
}

/// The published page, reused for `interval`.
#[derive(Debug)]
pub struct PageCache {
    interval: Duration,
    page: RwLock<Option<Arc<CachedPage>>>,
    stats: CacheStats,
}

impl PageCache {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            page: RwLock::new(None),
            stats: CacheStats::default(),
        }
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// The cached page if it is still fresh.
    pub async fn fresh(&self) -> Option<Arc<CachedPage>> {
        self.page
            .read()
            .await
            .as_ref()
            .filter(|p| p.is_fresh(self.interval))
            .cloned()
    }

    /// Return the fresh page, or render and store a new one.
    ///
    /// A failed render leaves the previous entry in place and returns the
    /// error.
    pub async fn get_or_render<F, Fut, E>(&self, render: F) -> Result<Arc<CachedPage>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, E>>,
    {
        if let Some(page) = self.fresh().await {
            self.stats.hit();
            return Ok(page);
        }

        let mut slot = self.page.write().await;
        // Another request may have rendered while this one waited for the lock
        if let Some(page) = slot.as_ref().filter(|p| p.is_fresh(self.interval)) {
            self.stats.hit();
            return Ok(page.clone());
        }

        let page = Arc::new(CachedPage::new(render().await?));
        self.stats.render();
        *slot = Some(page.clone());
        Ok(page)
    }
}

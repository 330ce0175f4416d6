//! Read-mostly cache for the loaded catalog with time-based invalidation.
//!
//! Readers load an `Arc` snapshot through `arc-swap` with no locking. A
//! snapshot older than its TTL is replaced on the next [`CatalogCache::get_or_load`].
//! The fallback table gets its own (short) TTL so a recovered network is
//! picked up quickly.
//!
//! Two concurrent callers that both see an expired snapshot will both load;
//! the last store wins. Loads are idempotent, so that is acceptable.

use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwapOption;
use tracing::debug;

use crate::loader::CatalogSource;
use crate::models::{Catalog, CatalogOrigin};

/// Default lifetime of a remotely loaded catalog.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Default lifetime of the fallback catalog.
pub const DEFAULT_FALLBACK_TTL: Duration = Duration::from_secs(60);

struct Snapshot {
    catalog: Arc<Catalog>,
    loaded_at: Instant,
}

/// Holds the most recently loaded catalog.
pub struct CatalogCache {
    slot: ArcSwapOption<Snapshot>,
    ttl: Duration,
    fallback_ttl: Duration,
}

impl Default for CatalogCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL, DEFAULT_FALLBACK_TTL)
    }
}

impl CatalogCache {
    /// Creates an empty cache.
    pub fn new(ttl: Duration, fallback_ttl: Duration) -> Self {
        Self {
            slot: ArcSwapOption::empty(),
            ttl,
            fallback_ttl,
        }
    }

    /// Returns the cached catalog if still fresh, otherwise loads a new one
    /// from `source` and caches it.
    pub async fn get_or_load<S>(&self, source: &S) -> Arc<Catalog>
    where
        S: CatalogSource + ?Sized,
    {
        if let Some(catalog) = self.peek() {
            return catalog;
        }
        let catalog = Arc::new(source.load().await);
        self.slot.store(Some(Arc::new(Snapshot {
            catalog: Arc::clone(&catalog),
            loaded_at: Instant::now(),
        })));
        catalog
    }

    /// The cached catalog, if present and not expired. Never loads.
    pub fn peek(&self) -> Option<Arc<Catalog>> {
        let snapshot = self.slot.load_full()?;
        let ttl = match snapshot.catalog.origin() {
            CatalogOrigin::Remote => self.ttl,
            CatalogOrigin::Fallback => self.fallback_ttl,
        };
        if snapshot.loaded_at.elapsed() < ttl {
            Some(Arc::clone(&snapshot.catalog))
        } else {
            debug!(age = ?snapshot.loaded_at.elapsed(), "cached catalog expired");
            None
        }
    }

    /// Drops the cached catalog; the next read reloads.
    pub fn invalidate(&self) {
        self.slot.store(None);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::loader::fallback_catalog;
    use crate::models::SymbolRecord;

    struct CountingSource {
        loads: AtomicUsize,
        origin: CatalogOrigin,
    }

    impl CountingSource {
        fn new(origin: CatalogOrigin) -> Self {
            Self {
                loads: AtomicUsize::new(0),
                origin,
            }
        }
    }

    #[async_trait]
    impl CatalogSource for CountingSource {
        async fn load(&self) -> Catalog {
            self.loads.fetch_add(1, Ordering::SeqCst);
            match self.origin {
                CatalogOrigin::Remote => Catalog::new(
                    vec![SymbolRecord::new("NSE:TCS-EQ", "Tata Consultancy", 0)],
                    CatalogOrigin::Remote,
                ),
                CatalogOrigin::Fallback => fallback_catalog(),
            }
        }
    }

    #[tokio::test]
    async fn fresh_snapshot_is_reused() {
        let cache = CatalogCache::default();
        let source = CountingSource::new(CatalogOrigin::Remote);

        let first = cache.get_or_load(&source).await;
        let second = cache.get_or_load(&source).await;

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(source.loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn expired_snapshot_reloads() {
        let cache = CatalogCache::new(Duration::ZERO, Duration::ZERO);
        let source = CountingSource::new(CatalogOrigin::Remote);

        cache.get_or_load(&source).await;
        cache.get_or_load(&source).await;

        assert_eq!(source.loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn fallback_uses_its_own_ttl() {
        let cache = CatalogCache::new(DEFAULT_TTL, Duration::ZERO);
        let source = CountingSource::new(CatalogOrigin::Fallback);

        cache.get_or_load(&source).await;
        assert!(cache.peek().is_none());
        cache.get_or_load(&source).await;

        assert_eq!(source.loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn invalidate_forces_reload() {
        let cache = CatalogCache::default();
        let source = CountingSource::new(CatalogOrigin::Remote);

        cache.get_or_load(&source).await;
        assert!(cache.peek().is_some());
        cache.invalidate();
        assert!(cache.peek().is_none());
        cache.get_or_load(&source).await;

        assert_eq!(source.loads.load(Ordering::SeqCst), 2);
    }
}

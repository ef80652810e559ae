//! Driver shapes
//!
//! The codecs never see user shapes directly: they work on the driver, the
//! shape redacted for conveying in any role, task and area, then expanded
//! with inferred constraints. Drivers are memoized in a process-wide LRU
//! cache keyed by shape.

use crate::infer::expand;
use crate::redact::{redact, GuardContext};
use crate::shape::Shape;
use lru::LruCache;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::debug;

static DRIVERS: Lazy<DriverCache> = Lazy::new(DriverCache::with_default_capacity);

/// The cached driver for a shape
pub fn driver(shape: &Shape) -> Arc<Shape> {
    DRIVERS.get_or_compute(shape)
}

/// Compute the driver for a shape, bypassing the cache
pub fn drive(shape: &Shape) -> Shape {
    expand(&redact(shape, &GuardContext::driver()))
}

/// Thread-safe LRU cache for driver shapes
///
/// Stores `Arc<Shape>` so hits are cheap to hand out.
pub struct DriverCache {
    inner: RwLock<LruCache<Shape, Arc<Shape>>>,
}

impl DriverCache {
    /// Create a new cache with the specified capacity (at least one entry)
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: RwLock::new(LruCache::new(cap)),
        }
    }

    /// Create a cache with default capacity (256 entries)
    pub fn with_default_capacity() -> Self {
        Self::new(256)
    }

    /// Get a cached driver if present, promoting it to most-recently-used
    pub fn get(&self, shape: &Shape) -> Option<Arc<Shape>> {
        self.inner.write().get(shape).cloned()
    }

    pub fn insert(&self, shape: Shape, driver: Arc<Shape>) {
        self.inner.write().put(shape, driver);
    }

    /// Get the cached driver, computing and caching it on a miss
    pub fn get_or_compute(&self, shape: &Shape) -> Arc<Shape> {
        if let Some(hit) = self.get(shape) {
            return hit;
        }

        debug!(cached = self.len(), "computing driver shape");

        let driver = Arc::new(drive(shape));
        self.insert(shape.clone(), Arc::clone(&driver));
        driver
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn clear(&self) {
        self.inner.write().clear();
    }
}

use crate::cache::ElasticCache;
use crate::error::CacheError;

/// Dimensions of an [`ElasticCache`].
///
/// There is no universally good size: `width` trades memory for hit rate,
/// `height` must cover the grammar's rule ids.
///
/// # Example
///
/// ```rust
/// use packwin::cache::CacheConfig;
///
/// let cache = CacheConfig::new(32, 12).build::<u8>().unwrap();
/// assert_eq!(cache.capacity(), 32 * 12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct CacheConfig {
    /// Slots per rule id; roughly how many recent positions stay memoized
    pub width: usize,
    /// Rule ids the key layout must distinguish
    pub height: usize,
}

impl CacheConfig {
    #[must_use]
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Number of slots, or `None` on overflow.
    #[must_use]
    pub const fn slots(&self) -> Option<usize> {
        self.width.checked_mul(self.height)
    }

    /// Allocates the cache.
    ///
    /// # Errors
    ///
    /// See [`ElasticCache::new`].
    pub fn build<T>(&self) -> Result<ElasticCache<T>, CacheError> {
        ElasticCache::new(self.width, self.height)
    }
}

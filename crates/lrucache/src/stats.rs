//! Cache statistics tracking

/// Hit/miss counters owned by the cache's critical section
///
/// Only touched while the cache lock is held.
#[derive(Debug, Default)]
pub(crate) struct Counters {
    hits: u64,
    misses: u64,
}

impl Counters {
    /// Record a cache hit
    pub(crate) fn record_hit(&mut self) {
        self.hits += 1;
    }

    /// Record a cache miss
    pub(crate) fn record_miss(&mut self) {
        self.misses += 1;
    }

    /// Copy the current totals
    pub(crate) fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
        }
    }
}

/// Cumulative hit/miss totals since the cache was created
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups that found their key
    pub hits: u64,
    /// Lookups that did not
    pub misses: u64,
}

impl CacheStats {
    /// Total lookups
    pub fn total(&self) -> u64 {
        self.hits + self.misses
    }

    /// Calculate hit ratio (0.0 to 1.0)
    pub fn hit_ratio(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

impl From<CacheStats> for (u64, u64) {
    fn from(stats: CacheStats) -> Self {
        (stats.hits, stats.misses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_basic() {
        let mut counters = Counters::default();

        counters.record_hit();
        counters.record_hit();
        counters.record_miss();

        let stats = counters.snapshot();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total(), 3);
        assert_eq!(stats.hit_ratio(), 2.0 / 3.0);
    }

    #[test]
    fn test_stats_empty() {
        let stats = Counters::default().snapshot();

        assert_eq!(stats, CacheStats::default());
        assert_eq!(stats.hit_ratio(), 0.0);
    }

    #[test]
    fn test_stats_into_tuple() {
        let stats = CacheStats { hits: 4, misses: 2 };
        let (hits, misses): (u64, u64) = stats.into();

        assert_eq!((hits, misses), (4, 2));
    }
}

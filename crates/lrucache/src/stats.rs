//! Cache statistics tracking

/// Point-in-time copy of a cache's counters
///
/// Taken under the cache lock, so all fields describe the same instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups that found their key
    pub hits: u64,

    /// Lookups that did not find their key
    pub misses: u64,

    /// Entries added (duplicate adds are not counted)
    pub inserts: u64,

    /// Entries removed, explicitly or to make room
    pub evictions: u64,
}

impl CacheStats {
    /// Total lookups
    pub fn lookups(&self) -> u64 {
        self.hits + self.misses
    }

    /// Calculate hit ratio (0.0 to 1.0)
    pub fn hit_ratio(&self) -> f64 {
        let total = self.lookups();
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub(crate) fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub(crate) fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub(crate) fn record_insert(&mut self) {
        self.inserts += 1;
    }

    pub(crate) fn record_eviction(&mut self) {
        self.evictions += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_basic() {
        let mut stats = CacheStats::default();

        stats.record_hit();
        stats.record_hit();
        stats.record_miss();

        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.lookups(), 3);
        assert_eq!(stats.hit_ratio(), 2.0 / 3.0);
    }

    #[test]
    fn test_stats_no_lookups() {
        let mut stats = CacheStats::default();
        stats.record_insert();
        stats.record_eviction();

        assert_eq!(stats.hit_ratio(), 0.0);
        assert_eq!(stats.inserts, 1);
        assert_eq!(stats.evictions, 1);
    }
}

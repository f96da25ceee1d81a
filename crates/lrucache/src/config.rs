//! Capacity model and cache configuration
//!
//! A capacity is either a positive bound or explicitly unbounded. There is no
//! sentinel number for "unlimited": negative and zero bounds are rejected.

use std::fmt;
use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Maximum number of entries a cache may hold
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Option<RawCapacity>", into = "Option<usize>")]
pub enum Capacity {
    /// At most this many entries; `add` at the bound evicts first
    Bounded(NonZeroUsize),

    /// No bound; `add` never evicts
    #[default]
    Unbounded,
}

impl Capacity {
    /// Create a bounded capacity
    ///
    /// # Errors
    /// * `Error::InvalidArgument` if `max_size` is zero
    pub fn bounded(max_size: usize) -> Result<Self> {
        NonZeroUsize::new(max_size)
            .map(Capacity::Bounded)
            .ok_or_else(Error::non_positive_capacity)
    }

    /// The bound, or `None` when unbounded
    pub fn limit(&self) -> Option<usize> {
        match self {
            Capacity::Bounded(n) => Some(n.get()),
            Capacity::Unbounded => None,
        }
    }

    /// Whether a bound is configured
    pub fn is_bounded(&self) -> bool {
        matches!(self, Capacity::Bounded(_))
    }

    pub(crate) fn is_reached_by(&self, size: usize) -> bool {
        match self {
            Capacity::Bounded(n) => size >= n.get(),
            Capacity::Unbounded => false,
        }
    }
}

impl TryFrom<i64> for Capacity {
    type Error = Error;

    fn try_from(max_size: i64) -> Result<Self> {
        if max_size < 1 {
            return Err(Error::non_positive_capacity());
        }
        let max_size = usize::try_from(max_size).map_err(|_| {
            Error::InvalidArgument(format!("max size {} does not fit in usize", max_size))
        })?;
        Capacity::bounded(max_size)
    }
}

impl TryFrom<u64> for Capacity {
    type Error = Error;

    fn try_from(max_size: u64) -> Result<Self> {
        let max_size = usize::try_from(max_size).map_err(|_| {
            Error::InvalidArgument(format!("max size {} does not fit in usize", max_size))
        })?;
        Capacity::bounded(max_size)
    }
}

/// Wire form of a bound: unsigned covers the whole `usize` range, signed
/// lets negative values reach the positive-integer check
#[derive(Deserialize)]
#[serde(untagged)]
enum RawCapacity {
    Unsigned(u64),
    Signed(i64),
}

impl TryFrom<Option<RawCapacity>> for Capacity {
    type Error = Error;

    fn try_from(max_size: Option<RawCapacity>) -> Result<Self> {
        match max_size {
            None => Ok(Capacity::Unbounded),
            Some(RawCapacity::Unsigned(n)) => Capacity::try_from(n),
            Some(RawCapacity::Signed(n)) => Capacity::try_from(n),
        }
    }
}

impl From<Capacity> for Option<usize> {
    fn from(capacity: Capacity) -> Self {
        capacity.limit()
    }
}

impl fmt::Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capacity::Bounded(n) => write!(f, "{}", n),
            Capacity::Unbounded => f.write_str("unbounded"),
        }
    }
}

/// Construction-time settings for an [`LruCache`](crate::LruCache)
///
/// Deserializes from any serde format. `max_size` may be omitted or `null`
/// for an unbounded cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Capacity bound, fixed for the lifetime of the cache
    #[serde(default)]
    pub max_size: Capacity,
}

impl CacheConfig {
    /// Config for a cache holding at most `max_size` entries
    pub fn bounded(max_size: usize) -> Result<Self> {
        Ok(Self {
            max_size: Capacity::bounded(max_size)?,
        })
    }

    /// Config for a cache that never evicts on insert
    pub fn unbounded() -> Self {
        Self {
            max_size: Capacity::Unbounded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounded_rejects_zero() {
        assert!(matches!(
            Capacity::bounded(0),
            Err(Error::InvalidArgument(_))
        ));
        assert_eq!(Capacity::bounded(5).unwrap().limit(), Some(5));
    }

    #[test]
    fn test_negative_is_not_unbounded() {
        assert!(Capacity::try_from(-1i64).is_err());
        assert!(Capacity::try_from(0i64).is_err());
        assert_eq!(Capacity::try_from(3i64).unwrap().limit(), Some(3));
    }

    #[test]
    fn test_is_bounded() {
        assert!(Capacity::bounded(1).unwrap().is_bounded());
        assert!(!Capacity::Unbounded.is_bounded());
        assert!(!Capacity::default().is_bounded());
    }

    #[test]
    fn test_reached_by() {
        let cap = Capacity::bounded(2).unwrap();
        assert!(!cap.is_reached_by(1));
        assert!(cap.is_reached_by(2));
        assert!(!Capacity::Unbounded.is_reached_by(usize::MAX));
    }

    #[test]
    fn test_display() {
        assert_eq!(Capacity::bounded(100).unwrap().to_string(), "100");
        assert_eq!(Capacity::Unbounded.to_string(), "unbounded");
    }

    #[test]
    fn test_config_from_json() {
        let config: CacheConfig = serde_json::from_str(r#"{"max_size": 64}"#).unwrap();
        assert_eq!(config.max_size.limit(), Some(64));

        let config: CacheConfig = serde_json::from_str(r#"{"max_size": null}"#).unwrap();
        assert_eq!(config.max_size, Capacity::Unbounded);

        let config: CacheConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, CacheConfig::unbounded());
    }

    #[test]
    fn test_config_rejects_non_positive() {
        let err = serde_json::from_str::<CacheConfig>(r#"{"max_size": -1}"#).unwrap_err();
        assert!(err.to_string().contains("positive integer"));

        assert!(serde_json::from_str::<CacheConfig>(r#"{"max_size": 0}"#).is_err());
    }

    #[test]
    fn test_config_largest_bound_round_trips() {
        let config = CacheConfig::bounded(usize::MAX).unwrap();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: CacheConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, config);
        assert_eq!(parsed.max_size.limit(), Some(usize::MAX));
    }

    #[test]
    fn test_config_to_json() {
        let config = CacheConfig::bounded(8).unwrap();
        assert_eq!(serde_json::to_string(&config).unwrap(), r#"{"max_size":8}"#);
        assert_eq!(
            serde_json::to_string(&CacheConfig::unbounded()).unwrap(),
            r#"{"max_size":null}"#
        );
    }
}

//! # Response Caching
//!
//! In-process caching and request de-duplication beneath read paths.
//!
//! - [`TtlCache`]: keyed entries with absolute expiry, capacity bound and
//!   hit/miss counters
//! - [`RequestDeduplicator`]: single-flight execution per key
//! - [`CachedClient`]: a [`RequestFetcher`] fronted by both of the above
//! - [`CacheRegistry`]: one cache per resource class, swept together
//!
//! Expiry is evaluated against a [`Clock`], so tests drive time with
//! [`ManualClock`].

pub mod client;
pub mod clock;
pub mod dedup;
pub mod errors;
pub mod key;
pub mod registry;
pub mod ttl_cache;

pub use client::{ApiRequest, CachedClient, HttpMethod, RequestFetcher};
pub use clock::{Clock, ManualClock, SystemClock};
pub use dedup::RequestDeduplicator;
pub use errors::{CacheError, CacheResult};
pub use key::CacheKey;
pub use registry::{spawn_sweeper, CacheClass, CacheRegistry};
pub use ttl_cache::{CacheEntry, CacheStats, ExpiredSweep, TtlCache};

//! Resource-class caches.
//!
//! Each resource class gets its own independent [`TtlCache`] with its own TTL
//! and capacity. The classes do not share a key space.

use super::clock::{Clock, SystemClock};
use super::ttl_cache::{CacheStats, ExpiredSweep, TtlCache};
use crate::config::CacheConfig;
use crate::periodic::PeriodicTask;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheClass {
    General,
    Rooms,
    Payments,
    Tenants,
}

impl CacheClass {
    pub const ALL: [CacheClass; 4] = [Self::General, Self::Rooms, Self::Payments, Self::Tenants];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Rooms => "rooms",
            Self::Payments => "payments",
            Self::Tenants => "tenants",
        }
    }
}

impl fmt::Display for CacheClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub struct CacheRegistry {
    general: Arc<TtlCache<Value>>,
    rooms: Arc<TtlCache<Value>>,
    payments: Arc<TtlCache<Value>>,
    tenants: Arc<TtlCache<Value>>,
    cleanup_interval: Duration,
}

impl CacheRegistry {
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Build the class caches. A disabled configuration yields caches that
    /// never store anything.
    pub fn with_clock(config: &CacheConfig, clock: Arc<dyn Clock>) -> Self {
        let build = |class: CacheClass, settings: &crate::config::CacheTypeConfig| {
            let max_entries = if config.enabled { settings.max_entries } else { 0 };
            Arc::new(TtlCache::with_clock(
                class.as_str(),
                settings.ttl_duration(),
                max_entries,
                Arc::clone(&clock),
            ))
        };

        if !config.enabled {
            info!("Response caching disabled by configuration");
        }

        Self {
            general: build(CacheClass::General, &config.general),
            rooms: build(CacheClass::Rooms, &config.rooms),
            payments: build(CacheClass::Payments, &config.payments),
            tenants: build(CacheClass::Tenants, &config.tenants),
            cleanup_interval: config.cleanup_interval(),
        }
    }

    pub fn cache(&self, class: CacheClass) -> &Arc<TtlCache<Value>> {
        match class {
            CacheClass::General => &self.general,
            CacheClass::Rooms => &self.rooms,
            CacheClass::Payments => &self.payments,
            CacheClass::Tenants => &self.tenants,
        }
    }

    /// Sweep every class; returns the total number of entries removed
    pub fn clean_expired_all(&self) -> usize {
        let removed: usize = CacheClass::ALL
            .iter()
            .map(|class| self.cache(*class).clean_expired())
            .sum();
        debug!(removed = removed, "Swept expired entries across cache classes");
        removed
    }

    pub fn clear_all(&self) {
        for class in CacheClass::ALL {
            self.cache(class).clear();
        }
    }

    pub fn stats(&self) -> Vec<(CacheClass, CacheStats)> {
        CacheClass::ALL
            .iter()
            .map(|class| (*class, self.cache(*class).stats()))
            .collect()
    }

    /// Start the periodic sweep over all classes at the configured interval
    pub fn start_sweeper(&self) -> PeriodicTask {
        let targets: Vec<Arc<dyn ExpiredSweep>> = CacheClass::ALL
            .iter()
            .map(|class| Arc::clone(self.cache(*class)) as Arc<dyn ExpiredSweep>)
            .collect();
        spawn_sweeper(targets, self.cleanup_interval)
    }
}

/// Periodically call `clean_expired` on each target
pub fn spawn_sweeper(targets: Vec<Arc<dyn ExpiredSweep>>, interval: Duration) -> PeriodicTask {
    let targets = Arc::new(targets);
    PeriodicTask::spawn("cache_sweeper", interval, move || {
        let targets = Arc::clone(&targets);
        async move {
            for target in targets.iter() {
                let removed = target.clean_expired();
                if removed > 0 {
                    debug!(cache = target.name(), removed = removed, "Cache sweep");
                }
            }
        }
    })
}

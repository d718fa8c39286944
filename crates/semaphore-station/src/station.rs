//! Station service implementation
//!
//! A station maps resource ids to at most one [`Signal`]. Acquiring a lock
//! happens in three steps:
//! - reserve: admission check and provisional claim inside one map-entry
//!   critical section, so at most one concurrent attempt passes
//! - generate: draw the capability key from the key source (the only
//!   suspension point)
//! - commit: swap the reservation for the issued Signal, stamped at commit time
//!
//! Expired Signals are evicted lazily by the lock or release call that touches
//! them; there is no background sweep.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde::{Deserialize, Serialize};
use station_common::{
    Clock, KeySource, OsKeySource, StationResult, SystemClock, capability_key,
};
use tracing::{debug, warn};

use crate::config::StationConfig;
use crate::metrics;
use crate::signal::{Signal, can_lock, can_unlock};

/// Semaphore station trait
#[async_trait]
pub trait SemaphoreStation: Send + Sync {
    /// TTL applied by [`SemaphoreStation::lock`]
    fn default_ttl(&self) -> Duration;

    /// Acquire `id` for the default TTL
    async fn lock(&self, id: &str) -> StationResult<Option<String>> {
        self.lock_with_ttl(id, self.default_ttl()).await
    }

    /// Acquire `id` for `ttl`.
    ///
    /// Returns `Ok(None)` when the resource is held by a live lock. Fails only
    /// if the key source fails; the provisional claim then stays in place
    /// until `ttl` elapses. Dropping the returned future before it completes
    /// (for example under `tokio::time::timeout` or `select!`) likewise leaves
    /// the claim in place until `ttl` elapses.
    async fn lock_with_ttl(&self, id: &str, ttl: Duration) -> StationResult<Option<String>>;

    /// Release `id`.
    ///
    /// Succeeds with the correct key, and with any key when `id` is absent or
    /// its lock has expired.
    async fn release(&self, id: &str, key: &str) -> bool;

    /// Get station statistics
    async fn stats(&self) -> StationStats;
}

/// Station statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationStats {
    /// Locks committed with a capability key
    pub total_acquisitions: u64,
    /// Lock attempts that returned no key
    pub failed_acquisitions: u64,
    /// Successful releases
    pub total_releases: u64,
    /// Releases refused for a wrong key
    pub rejected_releases: u64,
    /// Expired Signals replaced or removed on access
    pub expired_evictions: u64,
    /// Lock attempts that failed in the key source
    pub key_generation_failures: u64,
    /// Reservations lost to another caller before commit
    pub superseded_reservations: u64,
    /// Live Signals, reservations included
    pub active_locks: u64,
}

#[derive(Default)]
struct StationStatsCollector {
    total_acquisitions: AtomicU64,
    failed_acquisitions: AtomicU64,
    total_releases: AtomicU64,
    rejected_releases: AtomicU64,
    expired_evictions: AtomicU64,
    key_generation_failures: AtomicU64,
    superseded_reservations: AtomicU64,
}

/// Slot claimed by a lock attempt, completed by [`Station::commit`]
#[derive(Debug)]
struct Reservation {
    id: String,
    ttl_ms: u64,
    token: u64,
}

/// In-memory semaphore station.
///
/// Clones share one lock domain; separately constructed stations never share
/// state. The mapping is dropped with the last clone.
#[derive(Clone)]
pub struct Station {
    signals: Arc<DashMap<String, Signal>>,
    /// Reservation tokens, unique per station
    next_token: Arc<AtomicU64>,
    stats: Arc<StationStatsCollector>,
    clock: Arc<dyn Clock>,
    keys: Arc<dyn KeySource>,
    config: StationConfig,
}

impl Station {
    pub fn new() -> Self {
        Self::build(StationConfig::default())
    }

    /// Create a station with custom configuration
    pub fn with_config(config: StationConfig) -> StationResult<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    /// Replace the timestamp source. Intended to be called before first use.
    pub fn with_clock(self, clock: Arc<dyn Clock>) -> Self {
        Self { clock, ..self }
    }

    /// Replace the random source. Intended to be called before first use.
    pub fn with_key_source(self, keys: Arc<dyn KeySource>) -> Self {
        Self { keys, ..self }
    }

    pub fn config(&self) -> &StationConfig {
        &self.config
    }

    fn build(config: StationConfig) -> Self {
        Self {
            signals: Arc::new(DashMap::new()),
            next_token: Arc::new(AtomicU64::new(1)),
            stats: Arc::new(StationStatsCollector::default()),
            clock: Arc::new(SystemClock),
            keys: Arc::new(OsKeySource),
            config,
        }
    }

    /// Admission check plus provisional claim. The entry guard holds the
    /// shard write lock, so no other call can observe `id` in between.
    fn reserve(&self, id: &str, ttl_ms: u64) -> Option<Reservation> {
        let now = self.clock.now_millis();

        let token = match self.signals.entry(id.to_string()) {
            Entry::Occupied(mut entry) => {
                if !can_lock(Some(entry.get()), now) {
                    return None;
                }
                self.stats.expired_evictions.fetch_add(1, Ordering::Relaxed);
                let token = self.next_token.fetch_add(1, Ordering::Relaxed);
                entry.insert(Signal::reserved(ttl_ms, token, now));
                token
            }
            Entry::Vacant(entry) => {
                let token = self.next_token.fetch_add(1, Ordering::Relaxed);
                entry.insert(Signal::reserved(ttl_ms, token, now));
                token
            }
        };

        Some(Reservation {
            id: id.to_string(),
            ttl_ms,
            token,
        })
    }

    /// Swap the reservation for the issued Signal. A vacant slot (expired
    /// reservation released meanwhile) is filled as well. Returns `None` only
    /// if another Signal took the slot.
    fn commit(&self, reservation: Reservation, key: String) -> Option<String> {
        let now = self.clock.now_millis();
        let signal = Signal::issued(reservation.ttl_ms, key.clone(), now);

        match self.signals.entry(reservation.id) {
            Entry::Occupied(mut entry) if entry.get().is_reservation(reservation.token) => {
                entry.insert(signal);
                Some(key)
            }
            Entry::Occupied(_) => None,
            Entry::Vacant(entry) => {
                entry.insert(signal);
                Some(key)
            }
        }
    }
}

impl Default for Station {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Station")
            .field("signals", &self.signals.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl SemaphoreStation for Station {
    fn default_ttl(&self) -> Duration {
        self.config.default_ttl()
    }

    async fn lock_with_ttl(&self, id: &str, ttl: Duration) -> StationResult<Option<String>> {
        let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);

        let Some(reservation) = self.reserve(id, ttl_ms) else {
            self.stats
                .failed_acquisitions
                .fetch_add(1, Ordering::Relaxed);
            metrics::record(metrics::LOCK_CONTENDED);
            debug!(id, "Lock rejected, resource is held");
            return Ok(None);
        };

        let bytes = match self.keys.random_bytes(self.config.key_byte_count).await {
            Ok(bytes) => bytes,
            Err(e) => {
                self.stats
                    .key_generation_failures
                    .fetch_add(1, Ordering::Relaxed);
                metrics::record(metrics::KEY_GENERATION_FAILED);
                warn!(
                    id,
                    ttl_ms,
                    error = %e,
                    "Key generation failed, reservation held until it expires"
                );
                return Err(e);
            }
        };

        match self.commit(reservation, capability_key(id, &bytes)) {
            Some(key) => {
                self.stats
                    .total_acquisitions
                    .fetch_add(1, Ordering::Relaxed);
                metrics::record(metrics::LOCK_ACQUIRED);
                debug!(id, ttl_ms, "Lock acquired");
                Ok(Some(key))
            }
            None => {
                self.stats
                    .superseded_reservations
                    .fetch_add(1, Ordering::Relaxed);
                self.stats
                    .failed_acquisitions
                    .fetch_add(1, Ordering::Relaxed);
                metrics::record(metrics::LOCK_CONTENDED);
                warn!(id, ttl_ms, "Reservation expired and was taken before commit");
                Ok(None)
            }
        }
    }

    async fn release(&self, id: &str, key: &str) -> bool {
        let now = self.clock.now_millis();

        let released = match self.signals.entry(id.to_string()) {
            Entry::Vacant(_) => true,
            Entry::Occupied(entry) => {
                let expired = entry.get().is_expired(now);
                if can_unlock(Some(entry.get()), key, now) {
                    if expired {
                        self.stats.expired_evictions.fetch_add(1, Ordering::Relaxed);
                    }
                    entry.remove();
                    true
                } else {
                    false
                }
            }
        };

        if released {
            self.stats.total_releases.fetch_add(1, Ordering::Relaxed);
            metrics::record(metrics::RELEASE);
            debug!(id, "Lock released");
        } else {
            self.stats
                .rejected_releases
                .fetch_add(1, Ordering::Relaxed);
            metrics::record(metrics::RELEASE_REJECTED);
            debug!(id, "Release rejected, key does not match");
        }

        released
    }

    async fn stats(&self) -> StationStats {
        let now = self.clock.now_millis();
        let active_locks = self
            .signals
            .iter()
            .filter(|entry| entry.value().is_alive(now))
            .count() as u64;

        StationStats {
            total_acquisitions: self.stats.total_acquisitions.load(Ordering::Relaxed),
            failed_acquisitions: self.stats.failed_acquisitions.load(Ordering::Relaxed),
            total_releases: self.stats.total_releases.load(Ordering::Relaxed),
            rejected_releases: self.stats.rejected_releases.load(Ordering::Relaxed),
            expired_evictions: self.stats.expired_evictions.load(Ordering::Relaxed),
            key_generation_failures: self
                .stats
                .key_generation_failures
                .load(Ordering::Relaxed),
            superseded_reservations: self
                .stats
                .superseded_reservations
                .load(Ordering::Relaxed),
            active_locks,
        }
    }
}

/// Create an empty, independent station with default configuration
pub fn create_station() -> Station {
    Station::new()
}

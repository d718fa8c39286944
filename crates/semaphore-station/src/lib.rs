//! Semaphore Station - in-memory, time-bound exclusive locks
//!
//! A station issues locks on named resources. A successful lock returns an
//! unguessable capability key that is required to release the lock early;
//! locks that are never released expire after their TTL.
//!
//! - Signal data model and admission predicates (`signal`)
//! - Station configuration (`config`)
//! - Lock / release service (`Station`, `SemaphoreStation`)
//! - Operation counters (`metrics`)
//!
//! ```no_run
//! use semaphore_station::{SemaphoreStation, create_station};
//!
//! # async fn run() -> semaphore_station::StationResult<()> {
//! let station = create_station();
//! if let Some(key) = station.lock("report-job").await? {
//!     // exclusive section
//!     station.release("report-job", &key).await;
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod metrics;
pub mod signal;
mod station;

pub use config::StationConfig;
pub use signal::{Signal, SignalKey, can_lock, can_unlock};
pub use station::{SemaphoreStation, Station, StationStats, create_station};

// Re-export the shared building blocks callers need to customise a station
pub use station_common::{
    Clock, KeySource, ManualClock, OsKeySource, RANDOM_BYTE_COUNT, StationError, StationResult,
    SystemClock,
};

//! Station Common - shared building blocks for Semaphore Station
//!
//! This crate provides:
//! - Error types (`StationError`, `StationResult`)
//! - Timestamp sources (`Clock`, `SystemClock`, `ManualClock`)
//! - Capability key generation (`KeySource`, `OsKeySource`, `capability_key`)

pub mod clock;
pub mod crypto;
pub mod error;

pub use clock::{Clock, ManualClock, SystemClock};
pub use crypto::{KeySource, OsKeySource, RANDOM_BYTE_COUNT, capability_key};
pub use error::{StationError, StationResult};

//! Error types for Semaphore Station
//!
//! Contention and unauthorized releases are ordinary outcomes and are not
//! represented here; only genuine faults are.

/// Application-specific error types
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StationError {
    #[error("random source failure: {0}")]
    RandomSource(String),

    #[error("configuration error: {0}")]
    InvalidConfig(String),
}

/// Result type for station operations
pub type StationResult<T> = Result<T, StationError>;

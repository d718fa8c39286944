// Metrics for station operations
// Counters go through the `metrics` facade and are no-ops until the host installs a recorder

use metrics::{counter, describe_counter};

pub const LOCK_ACQUIRED: &str = "station_lock_acquired_total";
pub const LOCK_CONTENDED: &str = "station_lock_contended_total";
pub const RELEASE: &str = "station_release_total";
pub const RELEASE_REJECTED: &str = "station_release_rejected_total";
pub const KEY_GENERATION_FAILED: &str = "station_key_generation_failed_total";

/// Register metric descriptions
/// Should be called once after the host installs its recorder
pub fn describe_metrics() {
    describe_counter!(LOCK_ACQUIRED, "Total number of locks acquired");
    describe_counter!(
        LOCK_CONTENDED,
        "Total number of lock attempts rejected because the resource was held"
    );
    describe_counter!(RELEASE, "Total number of successful releases");
    describe_counter!(
        RELEASE_REJECTED,
        "Total number of releases rejected for presenting the wrong key"
    );
    describe_counter!(
        KEY_GENERATION_FAILED,
        "Total number of lock attempts that failed while generating a key"
    );
}

pub(crate) fn record(name: &'static str) {
    counter!(name).increment(1);
}

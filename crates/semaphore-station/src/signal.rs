//! Signal (lock record) data model
//!
//! A Signal never changes after construction. Liveness is a pure function of
//! `(timestamp, ttl_ms)` and the current time; a changed lock is a new Signal.

/// Key held by a Signal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalKey {
    /// Provisional claim while the capability key is being generated.
    /// Never matches a caller-supplied key.
    Reserved(u64),
    /// Capability key handed to the lock holder
    Issued(String),
}

/// Lock record for a single resource id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signal {
    /// Time-to-live in milliseconds
    pub ttl_ms: u64,
    /// Key required to release the lock early
    pub key: SignalKey,
    /// Creation timestamp (Unix millis)
    pub timestamp: i64,
}

impl Signal {
    /// Provisional claim identified by a reservation token
    pub fn reserved(ttl_ms: u64, token: u64, now: i64) -> Self {
        Self {
            ttl_ms,
            key: SignalKey::Reserved(token),
            timestamp: now,
        }
    }

    /// Committed lock carrying a capability key
    pub fn issued(ttl_ms: u64, key: impl Into<String>, now: i64) -> Self {
        Self {
            ttl_ms,
            key: SignalKey::Issued(key.into()),
            timestamp: now,
        }
    }

    /// Milliseconds elapsed since creation
    pub fn time_lived(&self, now: i64) -> i64 {
        now.saturating_sub(self.timestamp)
    }

    /// Alive iff `now - timestamp < ttl`. A negative lifetime (clock stepped
    /// backwards) counts as alive.
    pub fn is_alive(&self, now: i64) -> bool {
        u64::try_from(self.time_lived(now)).map_or(true, |lived| lived < self.ttl_ms)
    }

    pub fn is_expired(&self, now: i64) -> bool {
        !self.is_alive(now)
    }

    /// Check whether `key` is this Signal's capability key
    pub fn has_key(&self, key: &str) -> bool {
        matches!(&self.key, SignalKey::Issued(issued) if issued == key)
    }

    /// Check whether this Signal is the provisional claim `token`
    pub fn is_reservation(&self, token: u64) -> bool {
        self.key == SignalKey::Reserved(token)
    }
}

/// A resource is lockable iff it has no Signal or its Signal has expired
pub fn can_lock(signal: Option<&Signal>, now: i64) -> bool {
    signal.is_none_or(|signal| signal.is_expired(now))
}

/// A resource is unlockable iff it is lockable or `key` is its capability key
pub fn can_unlock(signal: Option<&Signal>, key: &str, now: i64) -> bool {
    can_lock(signal, now) || signal.is_some_and(|signal| signal.has_key(key))
}

//! Capability key generation
//!
//! A capability key is the resource id followed by the lowercase hex encoding
//! of [`RANDOM_BYTE_COUNT`] bytes from a cryptographically secure source.
//! Callers must treat keys as opaque.

use async_trait::async_trait;
use rand::TryRngCore;
use rand::rngs::OsRng;

use crate::error::{StationError, StationResult};

/// Number of random bytes in a capability key (256 bits)
pub const RANDOM_BYTE_COUNT: usize = 32;

/// Source of unguessable random bytes
#[async_trait]
pub trait KeySource: Send + Sync {
    /// Produce `len` random bytes
    async fn random_bytes(&self, len: usize) -> StationResult<Vec<u8>>;
}

/// Operating-system CSPRNG, sampled on the blocking thread pool
#[derive(Debug, Clone, Copy, Default)]
pub struct OsKeySource;

impl OsKeySource {
    fn fill(len: usize) -> StationResult<Vec<u8>> {
        let mut buf = vec![0u8; len];
        OsRng
            .try_fill_bytes(&mut buf)
            .map_err(|e| StationError::RandomSource(e.to_string()))?;
        Ok(buf)
    }
}

#[async_trait]
impl KeySource for OsKeySource {
    async fn random_bytes(&self, len: usize) -> StationResult<Vec<u8>> {
        tokio::task::spawn_blocking(move || Self::fill(len))
            .await
            .map_err(|e| StationError::RandomSource(format!("generation task failed: {}", e)))?
    }
}

/// Bind random bytes to the resource they guard
pub fn capability_key(id: &str, bytes: &[u8]) -> String {
    let mut key = String::with_capacity(id.len() + bytes.len() * 2);
    key.push_str(id);
    key.push_str(&const_hex::encode(bytes));
    key
}

//! Transaction identity: seeded xid generation and elapsed-time tracking.

use rand::{RngCore as _, SeedableRng as _};
use rand_chacha::ChaCha20Rng;
use std::time::Duration;

/// Seed used when the caller does not pick one.
pub const DEFAULT_SEED: u64 = 0xcafe;

/// Deterministic source of transaction ids.
///
/// One instance is owned by the session and shared by every transaction it
/// opens. Identical seeds yield identical id sequences, stable across crate
/// releases.
#[derive(Debug, Clone)]
pub struct TransactionIdGenerator {
    rng: ChaCha20Rng,
}

impl TransactionIdGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }

    pub fn next_id(&mut self) -> u32 {
        (self.rng.next_u64() & 0xFFFF_FFFF) as u32
    }
}

impl Default for TransactionIdGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

/// Whole seconds between two simulated instants, clamped to `0..=u16::MAX`.
///
/// Fractional seconds are dropped from each instant before subtracting.
pub fn elapsed_seconds(created: Duration, now: Duration) -> u16 {
    let secs = now.as_secs().saturating_sub(created.as_secs());
    u16::try_from(secs).unwrap_or(u16::MAX)
}

/// A logical DHCP exchange: a fixed xid and its creation instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transaction {
    id: u32,
    created: Duration,
}

impl Transaction {
    /// Opens a transaction at simulated instant `now`, drawing one id.
    pub fn begin(ids: &mut TransactionIdGenerator, now: Duration) -> Self {
        let id = ids.next_id();
        tracing::debug!("Opened transaction xid={:08x} at {:?}", id, now);
        Self { id, created: now }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn created(&self) -> Duration {
        self.created
    }

    pub fn elapsed_seconds(&self, now: Duration) -> u16 {
        elapsed_seconds(self.created, now)
    }
}

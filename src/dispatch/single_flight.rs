//! Single-flight gates for cache misses.
//!
//! Concurrent misses on one fingerprint queue behind a per-key async mutex,
//! so only the first of them reads the disk. Gates are dropped from the
//! registry when the last holder or waiter is done with them; a waiter
//! cancelled mid-wait can leave its idle gate behind until the key is next used.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::cache::mutex_lock;
use crate::fingerprint::Fingerprint;

type Gate = Arc<AsyncMutex<()>>;

#[derive(Debug, Default)]
pub struct FillGates {
    gates: Mutex<HashMap<Fingerprint, Gate>>,
}

/// Exclusive right to fill one fingerprint, released on drop.
pub struct FillPermit<'a> {
    registry: &'a FillGates,
    fingerprint: Fingerprint,
    gate: Option<Gate>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl FillGates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other task is filling `fingerprint`.
    pub async fn acquire(&self, fingerprint: Fingerprint) -> FillPermit<'_> {
        let gate = {
            let mut gates = mutex_lock(&self.gates, "fill_gate_acquire");
            Arc::clone(gates.entry(fingerprint).or_default())
        };
        let guard = Arc::clone(&gate).lock_owned().await;

        FillPermit {
            registry: self,
            fingerprint,
            gate: Some(gate),
            guard: Some(guard),
        }
    }

    /// Number of fingerprints currently being filled or waited on.
    pub fn in_flight(&self) -> usize {
        mutex_lock(&self.gates, "fill_gate_len").len()
    }
}

impl Drop for FillPermit<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());

        // Clones are only made or released under the registry lock, so the
        // last permit out sees the registry's reference alone.
        let mut gates = mutex_lock(&self.registry.gates, "fill_gate_release");
        drop(self.gate.take());
        let idle = gates
            .get(&self.fingerprint)
            .is_some_and(|g| Arc::strong_count(g) == 1);
        if idle {
            gates.remove(&self.fingerprint);
        }
    }
}

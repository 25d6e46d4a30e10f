//! Pending-spend tracker.
//!
//! Outputs consumed by a relayed-but-unconfirmed transaction must not be
//! offered to coin selection again, or a second transaction would
//! double-spend them and be rejected. The tracker remembers those outpoints
//! until the chain height moves, at which point the whole reservation set is
//! dropped: confirmed spends are now reflected in the node's unspent view,
//! and anything that missed the block will surface as an explicit relay
//! failure rather than a silent conflict.

use meridian_tx::Input;
use std::collections::HashSet;
use std::sync::Mutex;

#[derive(Debug, Default)]
struct Inner {
    reserved: HashSet<Input>,
    block_count: u64,
}

/// Mutex-guarded set of outpoints reserved by in-flight transactions.
#[derive(Debug, Default)]
pub struct PendingSpends {
    inner: Mutex<Inner>,
}

impl PendingSpends {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the observed chain height. If it differs from the last
    /// observation, every reservation is released. Returns whether the set
    /// was cleared.
    pub fn observe_block_count(&self, block_count: u64) -> bool {
        let mut inner = self.lock();
        if inner.block_count == block_count {
            return false;
        }
        if !inner.reserved.is_empty() {
            log::debug!(
                "height moved to {block_count}, releasing {} reserved output(s)",
                inner.reserved.len()
            );
        }
        inner.block_count = block_count;
        inner.reserved.clear();
        true
    }

    /// Reserve the outpoints spent by a just-relayed transaction.
    pub fn reserve(&self, inputs: &[Input]) {
        let mut inner = self.lock();
        inner.reserved.extend(inputs.iter().copied());
    }

    pub fn is_reserved(&self, input: &Input) -> bool {
        self.lock().reserved.contains(input)
    }

    pub fn reserved_count(&self) -> usize {
        self.lock().reserved.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // Reservation updates cannot panic, so the lock cannot be poisoned.
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

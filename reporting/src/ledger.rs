//! Report ledger: the set of members who reported in the current cycle.
//!
//! The ledger is written by every inbound status message and drained once per
//! day by the cycle trigger. Both sides run on different tasks, so the set is
//! guarded by a single mutex and exposed only through [`ReportLedger::report`]
//! and [`ReportLedger::snapshot_and_clear`].
//!
//! Critical sections are a single insert or a single `mem::take`; callers must
//! never perform I/O while a ledger operation is in progress (there is no API
//! that would let them).

use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Concurrent-safe, deduplicating record of this cycle's reporters.
#[derive(Debug, Default)]
pub struct ReportLedger {
    reported: Mutex<BTreeSet<String>>,
}

impl ReportLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `identity` reported this cycle.
    ///
    /// Blank identities are unresolved and never recorded. Returns `true` if
    /// the identity was not yet in the ledger.
    pub fn report(&self, identity: &str) -> bool {
        if identity.trim().is_empty() {
            return false;
        }
        self.lock().insert(identity.to_string())
    }

    /// Atomically take every recorded identity (sorted) and reset the ledger.
    ///
    /// This is the only way a cycle boundary is observed. A report that
    /// completed before this call is in the returned snapshot; a report that
    /// starts after it returns lands in the next cycle.
    pub fn snapshot_and_clear(&self) -> Vec<String> {
        let drained = std::mem::take(&mut *self.lock());
        drained.into_iter().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // The set is valid after any panic mid-insert, so a poisoned lock is
    // still safe to use.
    fn lock(&self) -> MutexGuard<'_, BTreeSet<String>> {
        self.reported.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

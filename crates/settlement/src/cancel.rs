//! Cooperative cancellation of a settlement session.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

const OPEN: u8 = 0;
const CANCEL_REQUESTED: u8 = 1;
const CHARGE_ISSUED: u8 = 2;

/// Requests cancellation of one session.
///
/// Cancellation and the charge point race on a single atomic, so exactly one
/// of them wins: either the session is cancelled before the charge is issued,
/// or the charge is issued and every later request is refused.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    state: Arc<AtomicU8>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Returns false if the charge was already issued.
    pub fn cancel(&self) -> bool {
        match self
            .state
            .compare_exchange(OPEN, CANCEL_REQUESTED, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) | Err(CANCEL_REQUESTED) => true,
            Err(_) => false,
        }
    }

    /// Returns true if cancellation was requested and honored.
    pub fn is_cancelled(&self) -> bool {
        self.state.load(Ordering::Acquire) == CANCEL_REQUESTED
    }

    /// Returns true once the charge point has been passed.
    pub fn is_charge_issued(&self) -> bool {
        self.state.load(Ordering::Acquire) == CHARGE_ISSUED
    }

    /// Claims the charge point. Returns false if cancellation got there first.
    pub(crate) fn begin_charge(&self) -> bool {
        match self
            .state
            .compare_exchange(OPEN, CHARGE_ISSUED, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) | Err(CHARGE_ISSUED) => true,
            Err(_) => false,
        }
    }
}

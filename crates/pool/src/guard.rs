use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{PoolError, PoolResult};

/// Rejects nested entry into the pool's mutating entry points
#[derive(Debug, Clone, Default)]
pub struct ReentrancyGuard {
    entered: Arc<AtomicBool>,
}

/// Held for the duration of a call; releases the guard on drop
#[derive(Debug)]
pub struct GuardToken {
    entered: Arc<AtomicBool>,
}

impl ReentrancyGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter(&self) -> PoolResult<GuardToken> {
        self.entered
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| PoolError::Reentrancy)?;
        Ok(GuardToken {
            entered: Arc::clone(&self.entered),
        })
    }

    pub fn is_entered(&self) -> bool {
        self.entered.load(Ordering::Acquire)
    }
}

impl Drop for GuardToken {
    fn drop(&mut self) {
        self.entered.store(false, Ordering::Release);
    }
}

//! Cooperative cancellation
//!
//! The search loop polls the token at its yield points: after seed
//! acquisition, after solving and after reification. Nothing is
//! interrupted mid-step.

use crate::errors::{ConcolicError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            deadline: Instant::now().checked_add(timeout),
        }
    }

    /// Token sharing this one's flag with a deadline no later than `timeout` from now
    pub fn child(&self, timeout: Duration) -> Self {
        let own = Instant::now().checked_add(timeout);
        let deadline = match (self.deadline, own) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        Self {
            cancelled: Arc::clone(&self.cancelled),
            deadline,
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
            || self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }

    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Yield point: `Err(Cancelled)` once the token has fired
    pub fn checkpoint(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(ConcolicError::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_is_shared_with_children() {
        let parent = CancellationToken::new();
        let child = parent.child(Duration::from_secs(60));
        assert!(child.checkpoint().is_ok());
        parent.cancel();
        assert!(matches!(child.checkpoint(), Err(ConcolicError::Cancelled)));
    }

    #[test]
    fn test_elapsed_deadline_fires() {
        let token = CancellationToken::with_timeout(Duration::ZERO);
        assert!(token.is_cancelled());
        assert_eq!(token.remaining(), Some(Duration::ZERO));
        assert!(CancellationToken::new().remaining().is_none());
    }
}

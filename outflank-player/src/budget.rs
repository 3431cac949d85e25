//! Time and cancellation limits for a single strategy invocation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A shared flag that asks running searches to stop early.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// How long a strategy may think. Searches poll [`Budget::is_exhausted`] and
/// return the best answer found so far once it trips.
#[derive(Clone, Debug, Default)]
pub struct Budget {
    deadline: Option<Instant>,
    cancel: Option<CancelFlag>,
}

impl Budget {
    /// No time limit and no cancellation.
    pub fn unlimited() -> Self {
        Self::default()
    }

    /// Stop after `limit` has elapsed, counting from now.
    pub fn with_time(limit: Duration) -> Self {
        Self {
            deadline: Some(Instant::now() + limit),
            cancel: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_cancel(mut self, flag: CancelFlag) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline; None when there is no deadline.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// True once the deadline has passed or the cancel flag is raised.
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        if let Some(flag) = &self.cancel {
            if flag.is_cancelled() {
                return true;
            }
        }
        match self.deadline {
            Some(deadline) => Instant::now() >= deadline,
            None => false,
        }
    }
}

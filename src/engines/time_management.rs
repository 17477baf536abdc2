//! Wall-clock budgeting for searches.
//!
//! Strategies never sleep or wait; they consult a `SearchClock` at fixed
//! checkpoints (top of a depth iteration, top of a candidate loop, top of a
//! simulation) and stop exploring once the deadline has passed.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
pub struct SearchClock {
    started_at: Instant,
    deadline: Instant,
}

impl SearchClock {
    pub fn start(budget: Duration) -> Self {
        let started_at = Instant::now();
        Self {
            started_at,
            deadline: started_at + budget,
        }
    }

    pub fn start_ms(budget_ms: u64) -> Self {
        Self::start(Duration::from_millis(budget_ms.max(1)))
    }

    #[inline]
    pub fn expired(&self) -> bool {
        Instant::now() >= self.deadline
    }

    #[inline]
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    #[inline]
    pub fn elapsed_ms(&self) -> u64 {
        self.started_at.elapsed().as_millis() as u64
    }

    #[inline]
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// A clock sharing this start time whose deadline is `share` of the way
    /// to this clock's deadline. Used to split one budget into phases.
    pub fn split(&self, share: f64) -> Self {
        let total = self.deadline.saturating_duration_since(self.started_at);
        let first = total.mul_f64(share.clamp(0.0, 1.0));
        Self {
            started_at: self.started_at,
            deadline: self.started_at + first,
        }
    }
}

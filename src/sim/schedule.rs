//! Cancellable timers driven by the simulation clock
//!
//! Fixed-cadence polls and one-shot delayed actions are stored as plain data
//! on the game state, so a restart drops them together with everything else.

/// Fixed-period poll
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub period_ms: f64,
    pub next_due_ms: f64,
}

impl Interval {
    pub fn new(period_ms: f64, now_ms: f64) -> Self {
        Self {
            period_ms,
            next_due_ms: now_ms + period_ms,
        }
    }

    /// True at most once per call when the period has elapsed.
    ///
    /// A long stall fires once and re-arms from `now_ms` instead of
    /// replaying every missed period.
    pub fn poll(&mut self, now_ms: f64) -> bool {
        if now_ms < self.next_due_ms {
            return false;
        }
        self.next_due_ms = now_ms + self.period_ms;
        true
    }
}

/// Work deferred to a later tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelayedAction {
    /// One enemy of a staggered batch
    SpawnEnemy,
}

/// Effect-expiry cadence
pub const EFFECT_POLL_MS: f64 = 250.0;

/// All timers owned by one match
#[derive(Debug, Clone)]
pub struct Timers {
    pub effect_poll: Interval,
    /// (due time, action), unordered
    pending: Vec<(f64, DelayedAction)>,
}

impl Timers {
    pub fn new(now_ms: f64) -> Self {
        Self {
            effect_poll: Interval::new(EFFECT_POLL_MS, now_ms),
            pending: Vec::new(),
        }
    }

    pub fn schedule(&mut self, due_ms: f64, action: DelayedAction) {
        self.pending.push((due_ms, action));
    }

    /// Remove and return every action due at `now_ms`, earliest first
    pub fn take_due(&mut self, now_ms: f64) -> Vec<DelayedAction> {
        let mut due: Vec<(f64, DelayedAction)> = Vec::new();
        self.pending.retain(|&(at, action)| {
            if at <= now_ms {
                due.push((at, action));
                false
            } else {
                true
            }
        });
        due.sort_by(|a, b| a.0.total_cmp(&b.0));
        due.into_iter().map(|(_, action)| action).collect()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Drop every outstanding one-shot
    pub fn cancel_all(&mut self) {
        if !self.pending.is_empty() {
            log::debug!("cancelling {} pending timers", self.pending.len());
        }
        self.pending.clear();
    }
}

//! Cancellable one-second countdown driving the ad overlay
//!
//! The countdown owns no clock. Whoever hosts it calls [`Countdown::tick`]
//! once per elapsed second, which keeps the transitions deterministic and
//! lets tests step through them without sleeping.

/// Outcome of a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Still counting down.
    Running { remaining: u32, skippable: bool },
    /// This tick reached zero. Reported exactly once.
    Finished,
    /// The countdown was already finished or cancelled; nothing happened.
    Idle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Running,
    Finished,
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct Countdown {
    total: u32,
    skip_after: u32,
    remaining: u32,
    skippable: bool,
    phase: Phase,
}

impl Countdown {
    /// Starts a countdown of `total` seconds that becomes skippable after
    /// `skip_after` seconds have elapsed. `skip_after` is clamped to `total`.
    pub fn start(total: u32, skip_after: u32) -> Self {
        let skip_after = skip_after.min(total);
        Self {
            total,
            skip_after,
            remaining: total,
            skippable: skip_after == 0,
            phase: if total == 0 {
                Phase::Finished
            } else {
                Phase::Running
            },
        }
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn elapsed(&self) -> u32 {
        self.total - self.remaining
    }

    /// Once true, stays true for the rest of the countdown.
    pub fn is_skippable(&self) -> bool {
        self.skippable
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    /// Seconds left until the skip threshold, zero once skippable.
    pub fn skip_in(&self) -> u32 {
        if self.skippable {
            return 0;
        }
        self.skip_after.saturating_sub(self.elapsed())
    }

    pub fn tick(&mut self) -> Tick {
        if self.phase != Phase::Running {
            return Tick::Idle;
        }

        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining <= self.total - self.skip_after {
            self.skippable = true;
        }

        if self.remaining == 0 {
            self.phase = Phase::Finished;
            return Tick::Finished;
        }

        Tick::Running {
            remaining: self.remaining,
            skippable: self.skippable,
        }
    }

    /// Stops the countdown. Returns `true` only for the call that actually
    /// cancelled a running countdown; later calls are no-ops.
    pub fn cancel(&mut self) -> bool {
        if self.phase == Phase::Running {
            self.phase = Phase::Cancelled;
            true
        } else {
            false
        }
    }
}

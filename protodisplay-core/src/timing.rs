//! Cycle pacing
//!
//! Each render cycle ends by blocking until its budget has elapsed since the
//! cycle started. That wait sits behind [`CycleGate`] so a board can swap
//! the busy-wait for a sleep.

use protodisplay_hal::MonotonicClock;

/// Milliseconds from `since` to `now`, correct across counter wrap
pub fn elapsed_ms(since: u32, now: u32) -> u32 {
    now.wrapping_sub(since)
}

/// The blocking point of a render cycle
pub trait CycleGate {
    /// Current time in milliseconds
    fn now_ms(&self) -> u32;

    /// Block until `budget_ms` have passed since `since_ms`
    ///
    /// Returns immediately if the budget is already spent.
    fn wait_until_elapsed(&mut self, since_ms: u32, budget_ms: u32);

    /// Block for `ms` from now
    fn delay_ms(&mut self, ms: u32) {
        let now = self.now_ms();
        self.wait_until_elapsed(now, ms);
    }
}

/// Busy-waits against a monotonic clock
pub struct SpinGate<C> {
    clock: C,
}

impl<C: MonotonicClock> SpinGate<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}

impl<C: MonotonicClock> CycleGate for SpinGate<C> {
    fn now_ms(&self) -> u32 {
        self.clock.now_ms()
    }

    fn wait_until_elapsed(&mut self, since_ms: u32, budget_ms: u32) {
        while elapsed_ms(since_ms, self.clock.now_ms()) < budget_ms {
            core::hint::spin_loop();
        }
    }
}

//! Monotonic time source

/// Millisecond uptime counter
///
/// The counter is 32 bits wide and wraps after ~49 days; callers compare
/// instants with `wrapping_sub`.
pub trait MonotonicClock {
    /// Milliseconds since boot
    fn now_ms(&self) -> u32;
}

impl<T: MonotonicClock + ?Sized> MonotonicClock for &T {
    fn now_ms(&self) -> u32 {
        (**self).now_ms()
    }
}

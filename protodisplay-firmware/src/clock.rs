//! Uptime clock

use embassy_time::Instant;
use protodisplay_hal::MonotonicClock;

/// Millisecond clock over the embassy time driver
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

impl MonotonicClock for EmbassyClock {
    fn now_ms(&self) -> u32 {
        // Truncation gives the wrapping 32-bit counter the HAL expects
        Instant::now().as_millis() as u32
    }
}

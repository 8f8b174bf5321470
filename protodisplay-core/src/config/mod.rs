//! Configuration
//!
//! - [`playback`] - the reloadable playback config, parsed from JSON on the SD card
//! - [`device`] - fixed device parameters the firmware builds its peripherals from

pub mod device;
pub mod playback;

pub use device::DeviceConfig;
pub use playback::{digit_width, ConfigError, PlaybackConfig};

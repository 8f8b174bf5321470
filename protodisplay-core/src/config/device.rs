//! Fixed device parameters

use protodisplay_hal::UartConfig;

/// Device configuration
///
/// Everything here is fixed at build time; only the playback config changes
/// at runtime. Panel geometry is not configurable: it is set by the
/// framebuffer sizes in `protodisplay_display::surface`.
#[derive(Debug, Clone, Copy)]
pub struct DeviceConfig {
    /// Matrix brightness (0-255)
    pub matrix_brightness: u8,
    /// Cycle budget in expression mode (ms)
    pub expression_period_ms: u32,
    /// Wait after the command link reports data before reading it (ms)
    pub command_settle_ms: u32,
    /// Playback config loaded at boot
    pub default_playback_file: &'static str,
    /// Bluetooth command link
    pub command_link: UartConfig,
    /// Face tracker sensor link
    pub sensor_link: UartConfig,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            matrix_brightness: 191,
            expression_period_ms: 50,
            command_settle_ms: 100,
            default_playback_file: "video.json",
            command_link: UartConfig::default(),
            sensor_link: UartConfig::default(),
        }
    }
}

//! Render mode and device state
//!
//! The controller owns one [`DeviceState`]; nothing else holds mutable
//! state across cycles.

pub mod device;
pub mod mode;

pub use device::DeviceState;
pub use mode::RenderMode;

//! Board-agnostic core logic for the ProtoDisplay firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Playback config parsing and the reloadable config store
//! - Frame sequencing (file naming, play cursor)
//! - Command and sensor link ingestion
//! - Render mode and device state
//! - Cycle pacing
//! - The mode controller tying it all together

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
#[macro_use]
extern crate std;

pub mod config;
pub mod controller;
pub mod ingest;
pub mod playback;
pub mod state;
pub mod timing;

#[cfg(test)]
pub(crate) mod testing;

pub use controller::{Board, BootReport, CycleReport, Hardware, ModeController, RenderOutcome};
pub use state::{DeviceState, RenderMode};

//! ProtoDisplay Hardware Abstraction Layer
//!
//! This crate defines the hardware boundary of the display controller. The
//! render loop only ever talks to these traits; the firmware binary supplies
//! RP2040 implementations and the host tests supply in-memory ones.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  protodisplay-core (mode controller)    │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  protodisplay-hal (this crate - traits) │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │  firmware     │       │  host test    │
//! │  (UART, SD)   │       │  doubles      │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`uart::SerialRx`] - Non-blocking receive side of a serial link
//! - [`storage::FileStorage`] - Whole-file reads from removable storage
//! - [`storage::StreamSource`] - Open/read/seek/close access for decoders
//! - [`time::MonotonicClock`] - Millisecond uptime
//!
//! FAT volumes index files by 8.3 name; [`storage::short_name`] gives that
//! name for files whose name already fits.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
#[macro_use]
extern crate std;

pub mod storage;
pub mod time;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use storage::{short_name, FileStorage, ShortName, StorageError, StreamSource};
pub use time::MonotonicClock;
pub use uart::{SerialRx, UartConfig};

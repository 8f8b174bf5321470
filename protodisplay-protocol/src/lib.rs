//! ProtoDisplay Serial Protocols
//!
//! This crate defines the two byte-level protocols the display controller
//! listens to. Neither link has framing or checksums; both rely on the
//! receiver looking at how many bytes are buffered when it polls.
//!
//! # Sensor link (face tracker → display)
//!
//! Fixed 7-byte packets:
//! ```text
//! ┌───────┬────────┬────────┬───────┬───────┬──────┬───────┐
//! │ GUARD │ MOUTH W│ MOUTH H│ L EYE │ R EYE │ NOSE │ GUARD │
//! │ 0x00  │ 1–127  │ 1–127  │ 1–127 │ 1–127 │ 1–127│ 0x00  │
//! └───────┴────────┴────────┴───────┴───────┴──────┴───────┘
//! ```
//!
//! # Command link (Bluetooth terminal → display)
//!
//! One ASCII command byte followed by its payload, no terminator:
//! - `v<filename>` reload the playback config from `<filename>`
//! - `m<digit>` switch render mode

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
#[macro_use]
extern crate std;

pub mod command;
pub mod packet;

pub use command::{Command, CommandError, MAX_FILENAME_LEN};
pub use packet::{ExpressionPacket, LinkFill, PacketError, PACKET_LEN};

//! Serial link ingestion
//!
//! Both links are polled once per cycle and consume at most one message.

pub mod dispatcher;
pub mod sensor;

pub use dispatcher::{CommandDispatcher, CommandOutcome, MAX_COMMAND_LEN};
pub use sensor::{poll_packet, PacketOutcome};

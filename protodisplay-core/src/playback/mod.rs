//! Video playback
//!
//! The store owns the loaded [`PlaybackConfig`](crate::config::PlaybackConfig)
//! and the play cursor; the sequencer turns the cursor into frame filenames.

pub mod sequencer;
pub mod store;

pub use sequencer::{frame_name, FrameName, PlayCursor, SequenceError, FRAME_NAME_LEN};
pub use store::{PlaybackStore, ReloadError, MAX_CONFIG_SIZE};

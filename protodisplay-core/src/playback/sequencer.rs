//! Frame sequencer
//!
//! Frame `i` of a sequence lives in `<prefix><i + 1, zero padded><suffix>`;
//! with prefix `clip_` and 134 frames the cursor runs through
//! `clip_001.png` ... `clip_134.png` and wraps.

use core::fmt::Write;

use heapless::String;

use crate::config::playback::FRAME_START;
use crate::config::PlaybackConfig;

/// Capacity of a frame filename (prefix, five digits, suffix)
pub const FRAME_NAME_LEN: usize = 64;

/// Frame filename, scoped to one render cycle
pub type FrameName = String<FRAME_NAME_LEN>;

/// Errors from building a frame filename
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SequenceError {
    /// Filename exceeds [`FRAME_NAME_LEN`]
    TooLong,
}

/// Position in the frame sequence
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PlayCursor {
    index: u16,
}

impl PlayCursor {
    pub const fn new() -> Self {
        Self { index: 0 }
    }

    /// Zero-based index of the next frame
    pub fn index(&self) -> u16 {
        self.index
    }

    /// Step to the next frame, wrapping to 0 at `frame_count`
    pub fn advance(&mut self, frame_count: u16) {
        let next = u32::from(self.index) + 1;
        self.index = if next >= u32::from(frame_count) {
            0
        } else {
            next as u16
        };
    }

    pub fn reset(&mut self) {
        self.index = 0;
    }
}

/// Filename of the frame under `cursor`
pub fn frame_name(config: &PlaybackConfig, cursor: PlayCursor) -> Result<FrameName, SequenceError> {
    let mut name = FrameName::new();
    write!(
        name,
        "{}{:0width$}{}",
        config.prefix(),
        u32::from(cursor.index()) + FRAME_START,
        config.suffix(),
        width = usize::from(config.digit_width()),
    )
    .map_err(|_| SequenceError::TooLong)?;
    Ok(name)
}

//! Device state

use protodisplay_protocol::ExpressionPacket;

use crate::config::PlaybackConfig;
use crate::playback::PlaybackStore;
use crate::state::RenderMode;

/// All state carried from one cycle to the next
#[derive(Debug, Clone)]
pub struct DeviceState {
    /// Active render mode
    pub mode: RenderMode,
    /// Loaded playback config and cursor
    pub playback: PlaybackStore,
    /// Last readout drawn in expression mode
    pub face: Option<ExpressionPacket>,
}

impl DeviceState {
    pub fn new(playback: PlaybackConfig) -> Self {
        Self {
            mode: RenderMode::default(),
            playback: PlaybackStore::new(playback),
            face: None,
        }
    }

    /// Switch mode, returning the previous one
    pub fn set_mode(&mut self, mode: RenderMode) -> RenderMode {
        core::mem::replace(&mut self.mode, mode)
    }
}

impl Default for DeviceState {
    fn default() -> Self {
        Self::new(PlaybackConfig::fallback())
    }
}

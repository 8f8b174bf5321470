//! Playback config store
//!
//! Holds the authoritative [`PlaybackConfig`] and the [`PlayCursor`]. A
//! reload reads and validates the new document completely before touching
//! either, so a failed reload leaves playback exactly where it was.

use protodisplay_hal::{FileStorage, StorageError};

use crate::config::{ConfigError, PlaybackConfig};
use crate::playback::sequencer::{frame_name, FrameName, PlayCursor, SequenceError};

/// Largest playback config document
pub const MAX_CONFIG_SIZE: usize = 512;

/// Reasons a reload was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReloadError {
    /// The file could not be read
    Storage(StorageError),
    /// The file was read but is not a valid config
    Config(ConfigError),
}

impl From<StorageError> for ReloadError {
    fn from(e: StorageError) -> Self {
        ReloadError::Storage(e)
    }
}

impl From<ConfigError> for ReloadError {
    fn from(e: ConfigError) -> Self {
        ReloadError::Config(e)
    }
}

/// Loaded playback config plus play position
#[derive(Debug, Clone)]
pub struct PlaybackStore {
    config: PlaybackConfig,
    cursor: PlayCursor,
}

impl PlaybackStore {
    pub fn new(config: PlaybackConfig) -> Self {
        Self {
            config,
            cursor: PlayCursor::new(),
        }
    }

    /// Read and validate a config file without changing the store
    pub fn load<F: FileStorage>(storage: &mut F, name: &str) -> Result<PlaybackConfig, ReloadError> {
        if !storage.exists(name) {
            return Err(ReloadError::Storage(StorageError::NotFound));
        }

        let mut buf = [0u8; MAX_CONFIG_SIZE];
        let len = storage.read_file(name, &mut buf)?;
        Ok(PlaybackConfig::from_json(&buf[..len])?)
    }

    /// Replace the config from `name`
    ///
    /// On success the cursor restarts at the first frame. On failure nothing
    /// changes.
    pub fn reload<F: FileStorage>(
        &mut self,
        storage: &mut F,
        name: &str,
    ) -> Result<&PlaybackConfig, ReloadError> {
        let config = Self::load(storage, name)?;
        self.replace(config);
        Ok(&self.config)
    }

    /// Install `config`, returning the one it replaces
    pub fn replace(&mut self, config: PlaybackConfig) -> PlaybackConfig {
        self.cursor.reset();
        core::mem::replace(&mut self.config, config)
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    pub fn cursor(&self) -> PlayCursor {
        self.cursor
    }

    /// Filename of the frame to render next
    pub fn current_frame(&self) -> Result<FrameName, SequenceError> {
        frame_name(&self.config, self.cursor)
    }

    /// Move to the next frame
    pub fn advance(&mut self) {
        self.cursor.advance(self.config.frame_count());
    }
}

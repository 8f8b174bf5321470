//! Playback config
//!
//! A video is a numbered run of PNG files on the SD card, described by a
//! small JSON document:
//!
//! ```json
//! {"video_filename_prefix": "clip_", "frame_cnt": "134", "fps": "8"}
//! ```
//!
//! Numeric fields are carried as strings. The document is parsed with
//! `serde-json-core` into borrowed fields and then validated into an owned
//! [`PlaybackConfig`].

use heapless::String;
use serde::Deserialize;

/// Longest accepted filename prefix
pub const MAX_PREFIX_LEN: usize = 48;

/// Extension of every frame file
pub const FRAME_SUFFIX: &str = ".png";

/// Number of the first frame file
pub const FRAME_START: u32 = 1;

/// Largest frame count; keeps padded indices within five digits
pub const MAX_FRAME_COUNT: u16 = u16::MAX;

/// Errors from parsing or validating a playback config
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Document is not valid JSON or has the wrong shape
    Json,
    /// A required field is absent
    MissingField(&'static str),
    /// A numeric field does not hold an unsigned integer
    InvalidNumber(&'static str),
    /// Frame count is zero
    ZeroFrameCount,
    /// Frame rate is zero
    ZeroFrameRate,
    /// Prefix exceeds [`MAX_PREFIX_LEN`]
    PrefixTooLong,
}

/// Raw document as it appears on the card
#[derive(Deserialize)]
struct PlaybackDocument<'a> {
    #[serde(borrow)]
    video_filename_prefix: Option<&'a str>,
    #[serde(borrow)]
    frame_cnt: Option<&'a str>,
    #[serde(borrow)]
    fps: Option<&'a str>,
}

/// Number of decimal digits needed to print `n`
pub fn digit_width(n: u32) -> u8 {
    let mut width = 1;
    let mut rest = n / 10;
    while rest > 0 {
        width += 1;
        rest /= 10;
    }
    width
}

fn parse_count(field: &'static str, value: Option<&str>) -> Result<u16, ConfigError> {
    value
        .ok_or(ConfigError::MissingField(field))?
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidNumber(field))
}

/// Metadata of the loaded frame sequence
///
/// Fields are private: a config is only ever built whole, so the digit
/// width always matches the frame count.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PlaybackConfig {
    prefix: String<MAX_PREFIX_LEN>,
    frame_count: u16,
    frame_rate: u16,
    digit_width: u8,
}

impl PlaybackConfig {
    /// Build a validated config
    pub fn new(prefix: &str, frame_count: u16, frame_rate: u16) -> Result<Self, ConfigError> {
        if frame_count == 0 {
            return Err(ConfigError::ZeroFrameCount);
        }
        if frame_rate == 0 {
            return Err(ConfigError::ZeroFrameRate);
        }

        let mut owned = String::new();
        owned
            .push_str(prefix)
            .map_err(|_| ConfigError::PrefixTooLong)?;

        Ok(Self {
            prefix: owned,
            frame_count,
            frame_rate,
            digit_width: digit_width(u32::from(frame_count)),
        })
    }

    /// Parse a playback config document
    pub fn from_json(bytes: &[u8]) -> Result<Self, ConfigError> {
        let (doc, _) = serde_json_core::from_slice::<PlaybackDocument<'_>>(bytes)
            .map_err(|_| ConfigError::Json)?;

        let prefix = doc
            .video_filename_prefix
            .ok_or(ConfigError::MissingField("video_filename_prefix"))?;
        let frame_count = parse_count("frame_cnt", doc.frame_cnt)?;
        let frame_rate = parse_count("fps", doc.fps)?;

        Self::new(prefix, frame_count, frame_rate)
    }

    /// Config used when the default file cannot be loaded at boot
    pub fn fallback() -> Self {
        Self {
            prefix: String::try_from("frame_").unwrap_or_default(),
            frame_count: 1,
            frame_rate: 8,
            digit_width: 1,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn suffix(&self) -> &'static str {
        FRAME_SUFFIX
    }

    pub fn frame_count(&self) -> u16 {
        self.frame_count
    }

    /// Frames per second
    pub fn frame_rate(&self) -> u16 {
        self.frame_rate
    }

    /// Decimal digits in the frame count; frame indices are padded to it
    pub fn digit_width(&self) -> u8 {
        self.digit_width
    }

    /// Cycle budget for one frame (integer division, so 3 fps gives 333 ms)
    pub fn frame_period_ms(&self) -> u32 {
        1000 / u32::from(self.frame_rate)
    }
}

//! Operator commands from the Bluetooth link
//!
//! A command is whatever the link has buffered when the controller polls it:
//! the first byte selects the command, the command consumes as much payload
//! as it needs, and anything after that is ignored.

use heapless::String;

// Command bytes
pub const CMD_RELOAD: u8 = b'v';
pub const CMD_MODE: u8 = b'm';

/// Longest accepted playback config filename
pub const MAX_FILENAME_LEN: usize = 64;

/// Errors that can occur while decoding a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// No bytes were buffered
    Empty,
    /// First byte is not a known command
    UnknownCommand(u8),
    /// Command byte arrived without its payload
    MissingPayload,
    /// Filename exceeds [`MAX_FILENAME_LEN`]
    FilenameTooLong,
    /// Filename is not valid UTF-8
    InvalidFilename,
    /// Buffer too small for encoding
    BufferTooSmall,
}

/// A decoded operator command
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Load a new playback config from the named file
    Reload { filename: String<MAX_FILENAME_LEN> },
    /// Switch render mode
    ///
    /// `mode` is the payload digit's numeric value (`b'0'` → 0). It is not
    /// range-checked here; non-digit bytes wrap like the digit arithmetic
    /// would.
    SwitchMode { mode: u8 },
}

impl Command {
    /// Decode a command from everything the link had buffered
    pub fn parse(bytes: &[u8]) -> Result<Self, CommandError> {
        let (&command, payload) = bytes.split_first().ok_or(CommandError::Empty)?;

        match command {
            CMD_RELOAD => {
                if payload.is_empty() {
                    return Err(CommandError::MissingPayload);
                }
                if payload.len() > MAX_FILENAME_LEN {
                    return Err(CommandError::FilenameTooLong);
                }
                let text =
                    core::str::from_utf8(payload).map_err(|_| CommandError::InvalidFilename)?;

                let mut filename = String::new();
                filename
                    .push_str(text)
                    .map_err(|_| CommandError::FilenameTooLong)?;
                Ok(Command::Reload { filename })
            }
            CMD_MODE => {
                let digit = payload.first().ok_or(CommandError::MissingPayload)?;
                Ok(Command::SwitchMode {
                    mode: digit.wrapping_sub(b'0'),
                })
            }
            other => Err(CommandError::UnknownCommand(other)),
        }
    }

    /// Encode this command into a byte buffer (for testing or simulation)
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, CommandError> {
        match self {
            Command::Reload { filename } => {
                let len = 1 + filename.len();
                if buffer.len() < len {
                    return Err(CommandError::BufferTooSmall);
                }
                buffer[0] = CMD_RELOAD;
                buffer[1..len].copy_from_slice(filename.as_bytes());
                Ok(len)
            }
            Command::SwitchMode { mode } => {
                if buffer.len() < 2 {
                    return Err(CommandError::BufferTooSmall);
                }
                buffer[0] = CMD_MODE;
                buffer[1] = mode.wrapping_add(b'0');
                Ok(2)
            }
        }
    }
}

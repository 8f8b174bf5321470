//! Command dispatcher
//!
//! The Bluetooth terminal sends a command as one burst with no terminator.
//! When the link first reports data the dispatcher waits for the rest of the
//! burst, reads everything, decodes the command from the front and drops
//! the remainder.

use heapless::String;
use protodisplay_hal::{FileStorage, SerialRx};
use protodisplay_protocol::{Command, CommandError, MAX_FILENAME_LEN};

use crate::playback::ReloadError;
use crate::state::{DeviceState, RenderMode};
use crate::timing::CycleGate;

/// Bytes read per command; one past the longest valid command so an
/// over-long filename is still detected
pub const MAX_COMMAND_LEN: usize = 1 + MAX_FILENAME_LEN + 1;

/// Effect of one command on the device
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandOutcome {
    /// New playback config installed
    Reloaded {
        filename: String<MAX_FILENAME_LEN>,
        frame_count: u16,
        frame_rate: u16,
    },
    /// Reload failed; the previous config is still playing
    ReloadFailed {
        filename: String<MAX_FILENAME_LEN>,
        error: ReloadError,
    },
    /// Render mode switched
    ModeChanged { from: RenderMode, to: RenderMode },
    /// Malformed command, nothing changed
    Rejected(CommandError),
}

/// Polls the command link and applies commands to the device state
#[derive(Debug, Clone, Copy)]
pub struct CommandDispatcher {
    settle_ms: u32,
}

impl CommandDispatcher {
    pub fn new(settle_ms: u32) -> Self {
        Self { settle_ms }
    }

    /// Read one command if the link has data
    ///
    /// Blocks for the settle time when data is present. The link is empty
    /// afterwards.
    pub fn poll<R: SerialRx, G: CycleGate>(
        &self,
        link: &mut R,
        gate: &mut G,
    ) -> Option<Result<Command, CommandError>> {
        if link.available() == 0 {
            return None;
        }
        gate.delay_ms(self.settle_ms);

        let mut buf = [0u8; MAX_COMMAND_LEN];
        let len = link.read_into(&mut buf);
        link.discard_all();

        Some(Command::parse(&buf[..len]))
    }

    /// Apply a decoded command
    pub fn apply<F: FileStorage>(
        &self,
        command: Command,
        state: &mut DeviceState,
        storage: &mut F,
    ) -> CommandOutcome {
        match command {
            Command::Reload { filename } => match state.playback.reload(storage, &filename) {
                Ok(config) => CommandOutcome::Reloaded {
                    frame_count: config.frame_count(),
                    frame_rate: config.frame_rate(),
                    filename,
                },
                Err(error) => CommandOutcome::ReloadFailed { filename, error },
            },
            Command::SwitchMode { mode } => {
                let to = RenderMode::from_raw(mode);
                let from = state.set_mode(to);
                CommandOutcome::ModeChanged { from, to }
            }
        }
    }

    /// Poll the link and apply whatever arrived
    pub fn service<R, G, F>(
        &self,
        link: &mut R,
        gate: &mut G,
        state: &mut DeviceState,
        storage: &mut F,
    ) -> Option<CommandOutcome>
    where
        R: SerialRx,
        G: CycleGate,
        F: FileStorage,
    {
        let outcome = match self.poll(link, gate)? {
            Ok(command) => self.apply(command, state, storage),
            Err(error) => CommandOutcome::Rejected(error),
        };
        Some(outcome)
    }
}

//! Mode controller
//!
//! Runs the render loop. Every cycle:
//!
//! 1. poll the command link and apply at most one command
//! 2. poll the sensor link for at most one packet
//! 3. run the render step of the active mode
//! 4. wait out the cycle budget (expression quantum, or one frame period)
//!
//! The controller does not log. Each cycle returns a [`CycleReport`] the
//! firmware turns into log lines.

use protodisplay_display::{
    render_expression, render_frame, render_loading, DisplayError, FrameDecoder, FrameOutcome,
    MonoSurface, RgbSurface,
};
use protodisplay_hal::{FileStorage, SerialRx, StreamSource};
use protodisplay_protocol::ExpressionPacket;

use crate::config::{DeviceConfig, PlaybackConfig};
use crate::ingest::{poll_packet, CommandDispatcher, CommandOutcome, PacketOutcome};
use crate::playback::{FrameName, ReloadError, SequenceError};
use crate::state::{DeviceState, RenderMode};
use crate::timing::{elapsed_ms, CycleGate};

/// Concrete peripheral types of a board
pub trait Board {
    /// Bluetooth command link
    type CommandLink: SerialRx;
    /// Face tracker link
    type SensorLink: SerialRx;
    /// SD card, for both config files and frame streams
    type Storage: FileStorage + StreamSource;
    /// Frame image decoder
    type Decoder: FrameDecoder;
    /// Cycle pacing
    type Gate: CycleGate;
    /// RGB matrix panel
    type Matrix: RgbSurface;
    /// Monochrome OLED
    type Oled: MonoSurface;
}

/// Peripherals the controller drives
pub struct Hardware<B: Board> {
    pub command_link: B::CommandLink,
    pub sensor_link: B::SensorLink,
    pub storage: B::Storage,
    pub decoder: B::Decoder,
    pub gate: B::Gate,
    pub matrix: B::Matrix,
    /// Secondary display; video frames are mirrored to it when present
    pub oled: Option<B::Oled>,
}

/// What the render step did
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RenderOutcome {
    /// Readout drawn for a new packet
    Expression(ExpressionPacket),
    /// Expression mode with no new packet; display unchanged
    AwaitingPacket,
    /// Video frame rendered
    Frame { name: FrameName, outcome: FrameOutcome },
    /// Frame filename could not be built; cursor still advanced
    FrameSkipped(SequenceError),
    /// Mode has no renderer; display unchanged
    Inactive(u8),
    /// Presenting to a display failed
    DisplayFailed(DisplayError),
}

/// Summary of one cycle
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CycleReport {
    /// Cycle start (ms)
    pub started_ms: u32,
    /// Mode the render step ran in
    pub mode: RenderMode,
    pub command: Option<CommandOutcome>,
    pub packet: PacketOutcome,
    pub render: RenderOutcome,
    /// Cycle budget (ms)
    pub budget_ms: u32,
    /// Time spent before the wait (ms)
    pub busy_ms: u32,
}

impl CycleReport {
    /// Whether the work alone used up the budget
    pub fn overran(&self) -> bool {
        self.busy_ms > self.budget_ms
    }
}

/// Result of the boot sequence
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BootReport {
    /// Drawing the splash screen
    pub splash: Result<(), DisplayError>,
    /// Loading the default playback config; on failure the fallback plays
    pub playback: Result<PlaybackConfig, ReloadError>,
}

/// Top-level state machine
pub struct ModeController<B: Board> {
    hw: Hardware<B>,
    config: DeviceConfig,
    dispatcher: CommandDispatcher,
    state: DeviceState,
}

impl<B: Board> ModeController<B> {
    pub fn new(hw: Hardware<B>, config: DeviceConfig) -> Self {
        Self {
            hw,
            dispatcher: CommandDispatcher::new(config.command_settle_ms),
            config,
            state: DeviceState::default(),
        }
    }

    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    pub fn hardware(&self) -> &Hardware<B> {
        &self.hw
    }

    pub fn hardware_mut(&mut self) -> &mut Hardware<B> {
        &mut self.hw
    }

    /// Show the splash screen and load the default playback config
    pub fn boot(&mut self) -> BootReport {
        let splash = render_loading(&mut self.hw.matrix);
        let playback = self
            .state
            .playback
            .reload(&mut self.hw.storage, self.config.default_playback_file)
            .cloned();

        BootReport { splash, playback }
    }

    /// Run one cycle, including the wait at its end
    pub fn run_cycle(&mut self) -> CycleReport {
        let started_ms = self.hw.gate.now_ms();

        let command = self.dispatcher.service(
            &mut self.hw.command_link,
            &mut self.hw.gate,
            &mut self.state,
            &mut self.hw.storage,
        );
        let packet = poll_packet(&mut self.hw.sensor_link);

        let mode = self.state.mode;
        let (render, budget_ms) = match mode {
            RenderMode::Expression => (
                self.expression_step(packet.packet().copied()),
                self.config.expression_period_ms,
            ),
            RenderMode::Video => {
                // Budget from the config in force after any reload this cycle
                let budget = self.state.playback.config().frame_period_ms();
                (self.video_step(), budget)
            }
            RenderMode::Unsupported(raw) => {
                (RenderOutcome::Inactive(raw), self.config.expression_period_ms)
            }
        };

        let busy_ms = elapsed_ms(started_ms, self.hw.gate.now_ms());
        self.hw.gate.wait_until_elapsed(started_ms, budget_ms);

        CycleReport {
            started_ms,
            mode,
            command,
            packet,
            render,
            budget_ms,
            busy_ms,
        }
    }

    /// Run forever, handing each cycle's report to `report`
    pub fn run<R: FnMut(&CycleReport)>(&mut self, mut report: R) -> ! {
        loop {
            let cycle = self.run_cycle();
            report(&cycle);
        }
    }

    fn expression_step(&mut self, packet: Option<ExpressionPacket>) -> RenderOutcome {
        let Some(packet) = packet else {
            return RenderOutcome::AwaitingPacket;
        };

        match render_expression(&mut self.hw.matrix, &packet) {
            Ok(()) => {
                self.state.face = Some(packet);
                RenderOutcome::Expression(packet)
            }
            Err(e) => RenderOutcome::DisplayFailed(e),
        }
    }

    fn video_step(&mut self) -> RenderOutcome {
        let name = match self.state.playback.current_frame() {
            Ok(name) => name,
            Err(e) => {
                self.state.playback.advance();
                return RenderOutcome::FrameSkipped(e);
            }
        };

        let result = render_frame(
            &mut self.hw.decoder,
            &mut self.hw.storage,
            &name,
            &mut self.hw.matrix,
            self.hw.oled.as_mut(),
        );
        self.state.playback.advance();

        match result {
            Ok(outcome) => RenderOutcome::Frame { name, outcome },
            Err(e) => RenderOutcome::DisplayFailed(e),
        }
    }
}

//! ProtoDisplay - Face Display Firmware
//!
//! Firmware binary for RP2040 boards driving a 64x64 HUB75 LED matrix and a
//! 128x64 SH1106 OLED. Core 1 refreshes the matrix; core 0 runs the render
//! loop:
//!
//! - Bluetooth UART: operator commands (`v<file>`, `m<digit>`)
//! - Sensor UART: face-tracking packets from the tracker host
//! - SD card: playback configs and PNG frames

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::i2c::{self, I2c};
use embassy_rp::multicore::{spawn_core1, Stack};
use embassy_rp::peripherals::{I2C1, SPI0, UART0, UART1};
use embassy_rp::spi::{self, Spi};
use embassy_rp::uart::{BufferedInterruptHandler, Uart};
use embassy_time::Delay;
use embedded_hal_bus::spi::ExclusiveDevice;
use embedded_sdmmc::{SdCard, VolumeManager};
use static_cell::{ConstStaticCell, StaticCell};
use {defmt_rtt as _, panic_probe as _};

use protodisplay_core::config::DeviceConfig;
use protodisplay_core::ingest::{CommandOutcome, PacketOutcome};
use protodisplay_core::timing::SpinGate;
use protodisplay_core::{Board, CycleReport, Hardware, ModeController, RenderOutcome};
use protodisplay_display::{FrameOutcome, MatrixFramebuffer};

use crate::clock::EmbassyClock;
use crate::hub75::{Hub75Matrix, Hub75Pins};
use crate::links::{uart_config, UartLink};
use crate::png::{PngBuffers, PngDecoder};
use crate::sdcard::{FixedTime, SdStorage};
use crate::sh1106::Sh1106;

mod clock;
mod hub75;
mod links;
mod png;
mod sdcard;
mod sh1106;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
    UART1_IRQ => BufferedInterruptHandler<UART1>;
});

/// SPI clock while the card initializes
const SD_INIT_HZ: u32 = 400_000;

/// SPI clock once the card is up
const SD_FAST_HZ: u32 = 16_000_000;

// UART buffers (must live forever)
static COMMAND_TX_BUF: StaticCell<[u8; 64]> = StaticCell::new();
static COMMAND_RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static SENSOR_TX_BUF: StaticCell<[u8; 64]> = StaticCell::new();
static SENSOR_RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

// Large buffers, built in place so they never touch the stack
static MATRIX_FRAMEBUFFER: ConstStaticCell<MatrixFramebuffer> =
    ConstStaticCell::new(MatrixFramebuffer::new());
static PNG_BUFFERS: ConstStaticCell<PngBuffers> = ConstStaticCell::new(PngBuffers::new());
static CORE1_STACK: ConstStaticCell<Stack<4096>> = ConstStaticCell::new(Stack::new());

type SdDevice = ExclusiveDevice<Spi<'static, SPI0, spi::Blocking>, Output<'static>, Delay>;

/// Peripheral types of the RP2040 board
struct Rp2040Board;

impl Board for Rp2040Board {
    type CommandLink = UartLink;
    type SensorLink = UartLink;
    type Storage = SdStorage<SdCard<SdDevice, Delay>, FixedTime>;
    type Decoder = PngDecoder;
    type Gate = SpinGate<EmbassyClock>;
    type Matrix = Hub75Matrix;
    type Oled = Sh1106<I2c<'static, I2C1, i2c::Blocking>>;
}

/// Main entry point
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("ProtoDisplay firmware starting...");

    let p = embassy_rp::init(Default::default());
    let config = DeviceConfig::default();
    info!("Peripherals initialized");

    // Matrix refresh runs on core 1 for the life of the device
    let pins = Hub75Pins {
        r1: Output::new(p.PIN_2, Level::Low),
        g1: Output::new(p.PIN_3, Level::Low),
        b1: Output::new(p.PIN_6, Level::Low),
        r2: Output::new(p.PIN_7, Level::Low),
        g2: Output::new(p.PIN_8, Level::Low),
        b2: Output::new(p.PIN_9, Level::Low),
        addr: [
            Output::new(p.PIN_10, Level::Low),
            Output::new(p.PIN_11, Level::Low),
            Output::new(p.PIN_12, Level::Low),
            Output::new(p.PIN_13, Level::Low),
            Output::new(p.PIN_14, Level::Low),
        ],
        clk: Output::new(p.PIN_15, Level::Low),
        lat: Output::new(p.PIN_20, Level::Low),
        oe: Output::new(p.PIN_21, Level::High),
    };
    let brightness = config.matrix_brightness;
    spawn_core1(p.CORE1, CORE1_STACK.take(), move || {
        hub75::scan_forever(pins, brightness)
    });
    let matrix = Hub75Matrix::new(MATRIX_FRAMEBUFFER.take());
    info!("Matrix refresh running on core 1");

    // Command link (Bluetooth module)
    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config(&config.command_link));
    let tx_buf = COMMAND_TX_BUF.init([0u8; 64]);
    let rx_buf = COMMAND_RX_BUF.init([0u8; 256]);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (_, command_rx) = uart.split();

    // Sensor link (face tracker)
    let uart = Uart::new_blocking(p.UART1, p.PIN_4, p.PIN_5, uart_config(&config.sensor_link));
    let tx_buf = SENSOR_TX_BUF.init([0u8; 64]);
    let rx_buf = SENSOR_RX_BUF.init([0u8; 256]);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (_, sensor_rx) = uart.split();
    info!(
        "UARTs initialized at {} / {} baud",
        config.command_link.baudrate, config.sensor_link.baudrate
    );

    // SD card on SPI0
    let mut spi_config = spi::Config::default();
    spi_config.frequency = SD_INIT_HZ;
    let spi = Spi::new_blocking(p.SPI0, p.PIN_18, p.PIN_19, p.PIN_16, spi_config);
    let cs = Output::new(p.PIN_17, Level::High);
    let device = ExclusiveDevice::new(spi, cs, Delay).unwrap();
    let card = SdCard::new(device, Delay);
    match card.num_bytes() {
        Ok(bytes) => {
            info!("SD card: {} MB", bytes / 1_000_000);
            card.spi(|device| device.bus_mut().set_frequency(SD_FAST_HZ));
        }
        Err(e) => warn!("SD card not responding: {:?}", Debug2Format(&e)),
    }
    let mut storage = SdStorage::new(VolumeManager::new(card, FixedTime));
    if let Err(e) = storage.mount() {
        warn!("SD card has no readable volume: {:?}", e);
    }

    // OLED on I2C1; the display runs without it
    let i2c = I2c::new_blocking(p.I2C1, p.PIN_27, p.PIN_26, i2c::Config::default());
    let mut oled = Sh1106::new(i2c);
    let oled = match oled.init() {
        Ok(()) => {
            info!("OLED initialized");
            Some(oled)
        }
        Err(e) => {
            warn!("OLED not responding: {:?}", e);
            None
        }
    };

    let hw: Hardware<Rp2040Board> = Hardware {
        command_link: UartLink::new(command_rx),
        sensor_link: UartLink::new(sensor_rx),
        storage,
        decoder: PngDecoder::new(PNG_BUFFERS.take()),
        gate: SpinGate::new(EmbassyClock),
        matrix,
        oled,
    };
    let mut controller = ModeController::new(hw, config);

    let boot = controller.boot();
    if let Err(e) = boot.splash {
        error!("Splash screen failed: {:?}", e);
    }
    match boot.playback {
        Ok(playback) => info!(
            "Loaded {}: prefix '{}', {} frames at {} fps",
            config.default_playback_file,
            playback.prefix(),
            playback.frame_count(),
            playback.frame_rate()
        ),
        Err(e) => warn!(
            "Could not load {} ({:?}), playing fallback sequence",
            config.default_playback_file, e
        ),
    }

    info!("Render loop running");
    controller.run(log_report)
}

/// Turn a cycle report into log lines
fn log_report(report: &CycleReport) {
    match &report.command {
        Some(CommandOutcome::Reloaded {
            filename,
            frame_count,
            frame_rate,
        }) => info!(
            "Loaded {}: {} frames at {} fps",
            filename.as_str(),
            frame_count,
            frame_rate
        ),
        Some(CommandOutcome::ReloadFailed { filename, error }) => {
            warn!("Reload from {} failed: {:?}", filename.as_str(), error)
        }
        Some(CommandOutcome::ModeChanged { from, to }) => info!("Mode {:?} -> {:?}", from, to),
        Some(CommandOutcome::Rejected(e)) => warn!("Malformed command: {:?}", e),
        None => {}
    }

    match report.packet {
        PacketOutcome::Dropped(e) => debug!("Sensor packet dropped: {:?}", e),
        PacketOutcome::Flushed { discarded } => {
            debug!("Sensor link out of sync, dropped {} bytes", discarded)
        }
        PacketOutcome::Pending { .. } | PacketOutcome::Accepted(_) => {}
    }

    match &report.render {
        RenderOutcome::Frame { name, outcome } => match outcome {
            FrameOutcome::Shown(info) => {
                trace!("{}: {}x{}", name.as_str(), info.width, info.height)
            }
            FrameOutcome::OpenFailed(e) => warn!("Could not open {}: {:?}", name.as_str(), e),
            FrameOutcome::DecodeFailed { lines, error } => warn!(
                "Decoding {} stopped after {} lines: {:?}",
                name.as_str(),
                lines,
                error
            ),
        },
        RenderOutcome::FrameSkipped(e) => warn!("Frame skipped: {:?}", e),
        RenderOutcome::DisplayFailed(e) => error!("Display update failed: {:?}", e),
        RenderOutcome::Expression(packet) => trace!("Face: {:?}", packet),
        RenderOutcome::AwaitingPacket | RenderOutcome::Inactive(_) => {}
    }

    if report.overran() {
        debug!(
            "Cycle took {} ms of a {} ms budget",
            report.busy_ms, report.budget_ms
        );
    }
}

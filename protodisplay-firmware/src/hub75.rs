//! HUB75 LED matrix driver
//!
//! 64x64 panel with 1/32 scan: each address selects row `y` and `y + 32`.
//! Core 0 draws into a [`MatrixFramebuffer`]; `present` swaps it and
//! publishes the visible frame to core 1, which refreshes the panel
//! forever using binary code modulation.

use core::cell::RefCell;
use core::convert::Infallible;

use embassy_rp::gpio::{Level, Output};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embedded_graphics::pixelcolor::{Rgb888, RgbColor};
use embedded_graphics::prelude::{DrawTarget, OriginDimensions, Pixel, Size};
use protodisplay_display::surface::{MATRIX_HEIGHT, MATRIX_WIDTH};
use protodisplay_display::{DisplayError, MatrixFramebuffer, Surface};

/// Bit planes per channel
const COLOR_BITS: u8 = 4;

/// Addresses per refresh
const SCAN_ROWS: usize = MATRIX_HEIGHT / 2;

/// On time of the least significant plane, in core clock cycles
const BASE_ON_CYCLES: u32 = 250;

type Frame = [[Rgb888; MATRIX_WIDTH]; MATRIX_HEIGHT];
type Row = [Rgb888; MATRIX_WIDTH];

/// Frame core 1 is scanning out
static SCAN_FRAME: Mutex<CriticalSectionRawMutex, RefCell<Frame>> =
    Mutex::new(RefCell::new([[Rgb888::BLACK; MATRIX_WIDTH]; MATRIX_HEIGHT]));

/// Matrix surface driven from core 0
pub struct Hub75Matrix {
    framebuffer: &'static mut MatrixFramebuffer,
}

impl Hub75Matrix {
    pub fn new(framebuffer: &'static mut MatrixFramebuffer) -> Self {
        Self { framebuffer }
    }
}

impl OriginDimensions for Hub75Matrix {
    fn size(&self) -> Size {
        self.framebuffer.size()
    }
}

impl DrawTarget for Hub75Matrix {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        self.framebuffer.draw_iter(pixels)
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.framebuffer.clear(color)
    }
}

impl Surface for Hub75Matrix {
    fn present(&mut self) -> Result<(), DisplayError> {
        self.framebuffer.present()?;
        let front = self.framebuffer.front();
        SCAN_FRAME.lock(|frame| *frame.borrow_mut() = *front);
        Ok(())
    }
}

/// Panel pins
pub struct Hub75Pins {
    pub r1: Output<'static>,
    pub g1: Output<'static>,
    pub b1: Output<'static>,
    pub r2: Output<'static>,
    pub g2: Output<'static>,
    pub b2: Output<'static>,
    /// Row address, A is the least significant bit
    pub addr: [Output<'static>; 5],
    pub clk: Output<'static>,
    pub lat: Output<'static>,
    /// Output enable, active low
    pub oe: Output<'static>,
}

impl Hub75Pins {
    fn select_row(&mut self, row: usize) {
        for (bit, pin) in self.addr.iter_mut().enumerate() {
            pin.set_level(Level::from(row & (1 << bit) != 0));
        }
    }

    fn shift_column(&mut self, top: Rgb888, bottom: Rgb888, shift: u8) {
        let on = |channel: u8| Level::from((channel >> shift) & 1 != 0);
        self.r1.set_level(on(top.r()));
        self.g1.set_level(on(top.g()));
        self.b1.set_level(on(top.b()));
        self.r2.set_level(on(bottom.r()));
        self.g2.set_level(on(bottom.g()));
        self.b2.set_level(on(bottom.b()));
        self.clk.set_high();
        self.clk.set_low();
    }
}

fn dim(row: &mut Row, brightness: u8) {
    let scale = |c: u8| (u16::from(c) * u16::from(brightness) / 255) as u8;
    for pixel in row.iter_mut() {
        *pixel = Rgb888::new(scale(pixel.r()), scale(pixel.g()), scale(pixel.b()));
    }
}

/// Refresh loop for core 1
pub fn scan_forever(mut pins: Hub75Pins, brightness: u8) -> ! {
    let mut top: Row = [Rgb888::BLACK; MATRIX_WIDTH];
    let mut bottom: Row = [Rgb888::BLACK; MATRIX_WIDTH];
    pins.oe.set_high();

    loop {
        for row in 0..SCAN_ROWS {
            SCAN_FRAME.lock(|frame| {
                let frame = frame.borrow();
                top = frame[row];
                bottom = frame[row + SCAN_ROWS];
            });
            dim(&mut top, brightness);
            dim(&mut bottom, brightness);

            for plane in 0..COLOR_BITS {
                let shift = 8 - COLOR_BITS + plane;
                for x in 0..MATRIX_WIDTH {
                    pins.shift_column(top[x], bottom[x], shift);
                }

                pins.oe.set_high();
                pins.select_row(row);
                pins.lat.set_high();
                pins.lat.set_low();
                pins.oe.set_low();
                cortex_m::asm::delay(BASE_ON_CYCLES << plane);
            }
            pins.oe.set_high();
        }
    }
}

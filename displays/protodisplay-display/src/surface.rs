//! Output surfaces
//!
//! A surface is something `embedded-graphics` can draw into plus a
//! `present` step that makes the drawing visible in one go. Drawing targets
//! the back buffer; `present` swaps it to the front and the old contents are
//! discarded by the next render's clear.

use core::convert::Infallible;

use embedded_graphics::pixelcolor::{BinaryColor, Rgb888, RgbColor};
use embedded_graphics::prelude::{DrawTarget, OriginDimensions, Pixel, Size};

/// LED matrix width in pixels
pub const MATRIX_WIDTH: usize = 64;

/// LED matrix height in pixels
pub const MATRIX_HEIGHT: usize = 64;

/// OLED width in pixels
pub const OLED_WIDTH: usize = 128;

/// OLED height in 8-pixel pages
pub const OLED_PAGES: usize = 8;

/// Display errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Communication error with display
    Communication,
    /// Display not initialized
    NotInitialized,
    /// Text did not fit its buffer
    BufferOverflow,
}

impl From<Infallible> for DisplayError {
    fn from(e: Infallible) -> Self {
        match e {}
    }
}

/// A physical output that shows a complete frame at once
pub trait Surface: OriginDimensions {
    /// Make everything drawn since the last present visible
    fn present(&mut self) -> Result<(), DisplayError>;
}

/// Full-color surface (the LED matrix)
pub trait RgbSurface: Surface + DrawTarget<Color = Rgb888, Error = Infallible> {}

impl<T> RgbSurface for T where T: Surface + DrawTarget<Color = Rgb888, Error = Infallible> {}

/// One-bit surface (the OLED)
pub trait MonoSurface: Surface + DrawTarget<Color = BinaryColor, Error = Infallible> {}

impl<T> MonoSurface for T where T: Surface + DrawTarget<Color = BinaryColor, Error = Infallible> {}

/// Double-buffered RGB888 framebuffer
#[derive(Clone)]
pub struct RgbFramebuffer<const W: usize, const H: usize> {
    /// Buffer being drawn
    back: [[Rgb888; W]; H],
    /// Buffer last presented
    front: [[Rgb888; W]; H],
    /// Number of completed presents
    presents: u32,
}

/// Framebuffer matching the 64×64 LED matrix
pub type MatrixFramebuffer = RgbFramebuffer<MATRIX_WIDTH, MATRIX_HEIGHT>;

impl<const W: usize, const H: usize> Default for RgbFramebuffer<W, H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const W: usize, const H: usize> RgbFramebuffer<W, H> {
    /// Create a black framebuffer
    pub const fn new() -> Self {
        Self {
            back: [[Rgb888::BLACK; W]; H],
            front: [[Rgb888::BLACK; W]; H],
            presents: 0,
        }
    }

    /// Swap back and front buffers
    pub fn swap(&mut self) {
        core::mem::swap(&mut self.back, &mut self.front);
        self.presents = self.presents.wrapping_add(1);
    }

    /// Rows of the presented frame
    pub fn front(&self) -> &[[Rgb888; W]; H] {
        &self.front
    }

    /// Pixel of the presented frame
    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgb888> {
        self.front.get(y).and_then(|row| row.get(x)).copied()
    }

    /// Pixel of the frame being drawn
    pub fn back_pixel(&self, x: usize, y: usize) -> Option<Rgb888> {
        self.back.get(y).and_then(|row| row.get(x)).copied()
    }

    /// Number of presents so far
    pub fn presents(&self) -> u32 {
        self.presents
    }
}

impl<const W: usize, const H: usize> OriginDimensions for RgbFramebuffer<W, H> {
    fn size(&self) -> Size {
        Size::new(W as u32, H as u32)
    }
}

impl<const W: usize, const H: usize> DrawTarget for RgbFramebuffer<W, H> {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(coord, color) in pixels {
            if coord.x >= 0 && coord.x < W as i32 && coord.y >= 0 && coord.y < H as i32 {
                self.back[coord.y as usize][coord.x as usize] = color;
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        for row in self.back.iter_mut() {
            row.fill(color);
        }
        Ok(())
    }
}

impl<const W: usize, const H: usize> Surface for RgbFramebuffer<W, H> {
    fn present(&mut self) -> Result<(), DisplayError> {
        self.swap();
        Ok(())
    }
}

/// Double-buffered 1-bit framebuffer in SH1106 page layout
///
/// Each page is 8 pixel rows; bit 0 of a byte is the top row of its page.
#[derive(Clone)]
pub struct MonoFramebuffer<const W: usize, const PAGES: usize> {
    /// Buffer being drawn
    back: [[u8; W]; PAGES],
    /// Buffer last presented
    front: [[u8; W]; PAGES],
    /// Number of completed presents
    presents: u32,
}

/// Framebuffer matching the 128×64 OLED
pub type OledFramebuffer = MonoFramebuffer<OLED_WIDTH, OLED_PAGES>;

impl<const W: usize, const PAGES: usize> Default for MonoFramebuffer<W, PAGES> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const W: usize, const PAGES: usize> MonoFramebuffer<W, PAGES> {
    /// Create a blank framebuffer
    pub const fn new() -> Self {
        Self {
            back: [[0; W]; PAGES],
            front: [[0; W]; PAGES],
            presents: 0,
        }
    }

    /// Swap back and front buffers
    pub fn swap(&mut self) {
        core::mem::swap(&mut self.back, &mut self.front);
        self.presents = self.presents.wrapping_add(1);
    }

    /// Pages of the presented frame, ready to stream to the panel
    pub fn front_pages(&self) -> &[[u8; W]; PAGES] {
        &self.front
    }

    /// Whether a pixel of the presented frame is lit
    pub fn is_lit(&self, x: usize, y: usize) -> bool {
        self.front
            .get(y / 8)
            .and_then(|page| page.get(x))
            .is_some_and(|byte| byte & (1 << (y % 8)) != 0)
    }

    /// Number of lit pixels in the presented frame
    pub fn lit_count(&self) -> u32 {
        self.front
            .iter()
            .flat_map(|page| page.iter())
            .map(|byte| byte.count_ones())
            .sum()
    }

    /// Number of presents so far
    pub fn presents(&self) -> u32 {
        self.presents
    }
}

impl<const W: usize, const PAGES: usize> OriginDimensions for MonoFramebuffer<W, PAGES> {
    fn size(&self) -> Size {
        Size::new(W as u32, (PAGES * 8) as u32)
    }
}

impl<const W: usize, const PAGES: usize> DrawTarget for MonoFramebuffer<W, PAGES> {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(coord, color) in pixels {
            if coord.x < 0 || coord.x >= W as i32 || coord.y < 0 || coord.y >= (PAGES * 8) as i32
            {
                continue;
            }
            let (x, y) = (coord.x as usize, coord.y as usize);
            let bit = 1u8 << (y % 8);
            match color {
                BinaryColor::On => self.back[y / 8][x] |= bit,
                BinaryColor::Off => self.back[y / 8][x] &= !bit,
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        let fill = match color {
            BinaryColor::On => 0xFF,
            BinaryColor::Off => 0x00,
        };
        for page in self.back.iter_mut() {
            page.fill(fill);
        }
        Ok(())
    }
}

impl<const W: usize, const PAGES: usize> Surface for MonoFramebuffer<W, PAGES> {
    fn present(&mut self) -> Result<(), DisplayError> {
        self.swap();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::prelude::Point;

    #[test]
    fn test_rgb_draw_is_invisible_until_present() {
        let mut fb = RgbFramebuffer::<4, 4>::new();
        let red = Rgb888::new(255, 0, 0);
        fb.draw_iter([Pixel(Point::new(1, 2), red)]).unwrap();

        assert_eq!(fb.pixel(1, 2), Some(Rgb888::BLACK));
        assert_eq!(fb.back_pixel(1, 2), Some(red));

        fb.present().unwrap();
        assert_eq!(fb.pixel(1, 2), Some(red));
        assert_eq!(fb.presents(), 1);
    }

    #[test]
    fn test_rgb_out_of_bounds_is_clipped() {
        let mut fb = RgbFramebuffer::<4, 4>::new();
        let white = Rgb888::WHITE;
        fb.draw_iter([
            Pixel(Point::new(-1, 0), white),
            Pixel(Point::new(4, 0), white),
            Pixel(Point::new(0, 4), white),
        ])
        .unwrap();
        fb.present().unwrap();
        assert!(fb.front().iter().flatten().all(|&c| c == Rgb888::BLACK));
    }

    #[test]
    fn test_rgb_clear_fills_back_buffer() {
        let mut fb = RgbFramebuffer::<3, 2>::new();
        let gray = Rgb888::new(24, 24, 24);
        fb.clear(gray).unwrap();
        fb.present().unwrap();
        assert!(fb.front().iter().flatten().all(|&c| c == gray));
    }

    #[test]
    fn test_mono_page_layout() {
        let mut fb = MonoFramebuffer::<16, 2>::new();
        fb.draw_iter([
            Pixel(Point::new(3, 0), BinaryColor::On),
            Pixel(Point::new(3, 9), BinaryColor::On),
        ])
        .unwrap();
        fb.present().unwrap();

        assert_eq!(fb.front_pages()[0][3], 0b0000_0001);
        assert_eq!(fb.front_pages()[1][3], 0b0000_0010);
        assert!(fb.is_lit(3, 9));
        assert!(!fb.is_lit(3, 8));
        assert_eq!(fb.lit_count(), 2);
    }

    #[test]
    fn test_mono_off_clears_bit() {
        let mut fb = MonoFramebuffer::<8, 1>::new();
        fb.clear(BinaryColor::On).unwrap();
        fb.draw_iter([Pixel(Point::new(0, 0), BinaryColor::Off)])
            .unwrap();
        fb.present().unwrap();
        assert!(!fb.is_lit(0, 0));
        assert!(fb.is_lit(1, 0));
        assert_eq!(fb.lit_count(), 63);
    }

    #[test]
    fn test_mono_size() {
        let fb = OledFramebuffer::new();
        assert_eq!(fb.size(), Size::new(128, 64));
    }
}

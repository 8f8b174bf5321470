//! Frame compositor
//!
//! Maps decoded RGB565 scanlines onto the output surfaces.
//!
//! - Matrix: pixels are expanded to RGB888. A source shorter than the panel
//!   is tiled vertically, so scanline `y` lands on rows `y`, `y + h`,
//!   `y + 2h`, ... until the panel runs out.
//! - OLED: each source pixel becomes a square block of
//!   `oled_width / source_width` pixels, lit when the pixel is not black.

use embedded_graphics::pixelcolor::{BinaryColor, Rgb888, RgbColor};
use embedded_graphics::prelude::{DrawTarget, OriginDimensions, Pixel, Point, Size};
use embedded_graphics::primitives::Rectangle;

use crate::decode::{ImageInfo, ScanlineSink};
use crate::surface::{DisplayError, MonoSurface, RgbSurface};

/// Expand a packed RGB565 pixel to RGB888
///
/// Rounds to nearest, so full-scale channels map to 255.
pub fn expand_rgb565(pixel: u16) -> Rgb888 {
    let r5 = ((pixel >> 11) & 0x1F) as u32;
    let g6 = ((pixel >> 5) & 0x3F) as u32;
    let b5 = (pixel & 0x1F) as u32;
    Rgb888::new(
        ((r5 * 527 + 23) >> 6) as u8,
        ((g6 * 259 + 33) >> 6) as u8,
        ((b5 * 527 + 23) >> 6) as u8,
    )
}

/// Whether a pixel counts as lit on the monochrome surface
fn is_lit(color: Rgb888) -> bool {
    color.r() as u16 + color.g() as u16 + color.b() as u16 > 0
}

/// Composes one decoded frame onto the matrix and, optionally, the OLED
pub struct Compositor<'a, P, M> {
    primary: &'a mut P,
    secondary: Option<&'a mut M>,
    /// Dimensions of the image being decoded
    image: Option<ImageInfo>,
    /// Scanlines received for the current image
    lines: u16,
}

impl<'a, P, M> Compositor<'a, P, M>
where
    P: RgbSurface,
    M: MonoSurface,
{
    /// Create a compositor over the given surfaces
    pub fn new(primary: &'a mut P, secondary: Option<&'a mut M>) -> Self {
        Self {
            primary,
            secondary,
            image: None,
            lines: 0,
        }
    }

    /// Clear both surfaces' back buffers
    pub fn clear(&mut self, background: Rgb888) {
        let _ = self.primary.clear(background);
        if let Some(secondary) = self.secondary.as_deref_mut() {
            let _ = secondary.clear(BinaryColor::Off);
        }
    }

    /// Scanlines received since the last `begin`
    pub fn lines(&self) -> u16 {
        self.lines
    }

    /// Present both surfaces
    ///
    /// The matrix is presented even if the OLED fails, and the first error
    /// is returned.
    pub fn present(self) -> Result<(), DisplayError> {
        let primary = self.primary.present();
        let secondary = match self.secondary {
            Some(secondary) => secondary.present(),
            None => Ok(()),
        };
        primary.and(secondary)
    }

    fn draw_primary(&mut self, y: u16, pixels: &[u16], source_height: u16) {
        let size = self.primary.size();
        let width = (size.width as usize).min(pixels.len());
        let step = usize::from(source_height.max(1));

        for row in (usize::from(y)..size.height as usize).step_by(step) {
            let _ = self
                .primary
                .draw_iter(pixels[..width].iter().enumerate().map(|(x, &pixel)| {
                    Pixel(Point::new(x as i32, row as i32), expand_rgb565(pixel))
                }));
        }
    }

    fn draw_secondary(&mut self, y: u16, pixels: &[u16], source_width: u16) {
        let Some(secondary) = self.secondary.as_deref_mut() else {
            return;
        };
        let block = (secondary.size().width / u32::from(source_width.max(1))).max(1);
        let top = i32::from(y) * block as i32;
        if top >= secondary.size().height as i32 {
            return;
        }

        for (x, &pixel) in pixels.iter().enumerate() {
            let color = if is_lit(expand_rgb565(pixel)) {
                BinaryColor::On
            } else {
                BinaryColor::Off
            };
            let area = Rectangle::new(
                Point::new(x as i32 * block as i32, top),
                Size::new(block, block),
            );
            let _ = secondary.fill_solid(&area, color);
        }
    }
}

impl<P, M> ScanlineSink for Compositor<'_, P, M>
where
    P: RgbSurface,
    M: MonoSurface,
{
    fn begin(&mut self, info: ImageInfo) {
        self.image = Some(info);
        self.lines = 0;
    }

    fn scanline(&mut self, y: u16, pixels: &[u16]) {
        let info = self.image.unwrap_or(ImageInfo {
            width: pixels.len() as u16,
            height: self.primary.size().height as u16,
        });
        if y >= info.height {
            return;
        }

        self.draw_primary(y, pixels, info.height);
        self.draw_secondary(y, pixels, info.width);
        self.lines = self.lines.saturating_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{MonoFramebuffer, RgbFramebuffer};

    const WHITE565: u16 = 0xFFFF;
    const RED565: u16 = 0xF800;
    const GREEN565: u16 = 0x07E0;
    const BLUE565: u16 = 0x001F;

    #[test]
    fn test_expand_rgb565_extremes() {
        assert_eq!(expand_rgb565(0x0000), Rgb888::new(0, 0, 0));
        assert_eq!(expand_rgb565(WHITE565), Rgb888::new(255, 255, 255));
        assert_eq!(expand_rgb565(RED565), Rgb888::new(255, 0, 0));
        assert_eq!(expand_rgb565(GREEN565), Rgb888::new(0, 255, 0));
        assert_eq!(expand_rgb565(BLUE565), Rgb888::new(0, 0, 255));
    }

    #[test]
    fn test_expand_rgb565_midpoints() {
        // r5 = 16 -> (16*527+23)>>6 = 132
        assert_eq!(expand_rgb565(16 << 11).r(), 132);
        // g6 = 32 -> (32*259+33)>>6 = 130
        assert_eq!(expand_rgb565(32 << 5).g(), 130);
        // b5 = 1 -> (527+23)>>6 = 8
        assert_eq!(expand_rgb565(1).b(), 8);
    }

    #[test]
    fn test_short_source_tiles_vertically() {
        let mut matrix = RgbFramebuffer::<4, 8>::new();
        let mut comp: Compositor<'_, _, MonoFramebuffer<8, 1>> =
            Compositor::new(&mut matrix, None);
        comp.clear(Rgb888::BLACK);
        comp.begin(ImageInfo {
            width: 4,
            height: 3,
        });
        comp.scanline(0, &[RED565; 4]);
        comp.scanline(1, &[GREEN565; 4]);
        comp.scanline(2, &[BLUE565; 4]);
        assert_eq!(comp.lines(), 3);
        comp.present().unwrap();

        let red = Rgb888::new(255, 0, 0);
        let green = Rgb888::new(0, 255, 0);
        let blue = Rgb888::new(0, 0, 255);
        let expected = [red, green, blue, red, green, blue, red, green];
        for (row, color) in expected.iter().enumerate() {
            assert_eq!(matrix.pixel(0, row), Some(*color), "row {}", row);
            assert_eq!(matrix.pixel(3, row), Some(*color), "row {}", row);
        }
    }

    #[test]
    fn test_half_height_source_fills_both_halves() {
        let mut matrix = RgbFramebuffer::<64, 64>::new();
        let mut comp: Compositor<'_, _, MonoFramebuffer<8, 1>> =
            Compositor::new(&mut matrix, None);
        comp.begin(ImageInfo {
            width: 64,
            height: 32,
        });
        comp.scanline(5, &[WHITE565; 64]);
        comp.present().unwrap();

        assert_eq!(matrix.pixel(10, 5), Some(Rgb888::WHITE));
        assert_eq!(matrix.pixel(10, 37), Some(Rgb888::WHITE));
        assert_eq!(matrix.pixel(10, 6), Some(Rgb888::BLACK));
    }

    #[test]
    fn test_wide_scanline_is_cropped() {
        let mut matrix = RgbFramebuffer::<2, 2>::new();
        let mut comp: Compositor<'_, _, MonoFramebuffer<8, 1>> =
            Compositor::new(&mut matrix, None);
        comp.begin(ImageInfo {
            width: 5,
            height: 2,
        });
        comp.scanline(0, &[WHITE565; 5]);
        comp.present().unwrap();
        assert_eq!(matrix.pixel(1, 0), Some(Rgb888::WHITE));
    }

    #[test]
    fn test_scanline_beyond_image_height_ignored() {
        let mut matrix = RgbFramebuffer::<2, 4>::new();
        let mut comp: Compositor<'_, _, MonoFramebuffer<8, 1>> =
            Compositor::new(&mut matrix, None);
        comp.begin(ImageInfo {
            width: 2,
            height: 2,
        });
        comp.scanline(3, &[WHITE565; 2]);
        assert_eq!(comp.lines(), 0);
    }

    #[test]
    fn test_oled_blocks_follow_lit_threshold() {
        let mut matrix = RgbFramebuffer::<64, 64>::new();
        let mut oled = MonoFramebuffer::<128, 8>::new();
        let mut comp = Compositor::new(&mut matrix, Some(&mut oled));
        comp.begin(ImageInfo {
            width: 64,
            height: 32,
        });
        let mut line = [0u16; 64];
        line[0] = BLUE565;
        line[2] = 0x0001; // dimmest blue still counts
        comp.scanline(4, &line);
        comp.present().unwrap();

        // Source pixel (0, 4) -> 2x2 block at (0, 8)
        assert!(oled.is_lit(0, 8));
        assert!(oled.is_lit(1, 8));
        assert!(oled.is_lit(0, 9));
        assert!(oled.is_lit(1, 9));
        // Source pixel (1, 4) is black
        assert!(!oled.is_lit(2, 8));
        // Source pixel (2, 4) -> block at (4, 8)
        assert!(oled.is_lit(4, 8));
        assert_eq!(oled.lit_count(), 8);
    }

    #[test]
    fn test_present_swaps_both_surfaces() {
        let mut matrix = RgbFramebuffer::<4, 4>::new();
        let mut oled = MonoFramebuffer::<8, 1>::new();
        let comp = Compositor::new(&mut matrix, Some(&mut oled));
        comp.present().unwrap();
        assert_eq!(matrix.presents(), 1);
        assert_eq!(oled.presents(), 1);
    }
}

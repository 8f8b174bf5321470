//! Face-tracking readout
//!
//! Shows the five values of an [`ExpressionPacket`] as text labels on the
//! matrix, one per row:
//!
//! ```text
//! M.W: 90     mouth width
//! M.H: 12     mouth height
//! L.E: 40     left eye
//! R.E: 41     right eye
//! N.O: -3     nose offset
//! ```

use core::fmt::Write;

use embedded_graphics::mono_font::ascii::{FONT_4X6, FONT_6X10};
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::{DrawTarget, Point};
use embedded_graphics::text::{Baseline, Text};
use embedded_graphics::Drawable;
use heapless::String;
use protodisplay_protocol::ExpressionPacket;

use crate::surface::{DisplayError, RgbSurface};

/// Text color on the matrix
pub const FACE_COLOR: Rgb888 = Rgb888::new(24, 152, 220);

/// Background of the readout and boot screens
pub const BACKGROUND_COLOR: Rgb888 = Rgb888::new(24, 24, 24);

/// Maximum label length ("N.O: -63" plus slack)
pub const LABEL_LEN: usize = 12;

/// Top pixel row of each label
const LABEL_ROWS: [i32; 5] = [1, 7, 14, 20, 26];

/// Boot text and its position
const LOADING_TEXT: &str = "LOADING";
const LOADING_POS: Point = Point::new(11, 11);

/// Format the five readout labels
pub fn format_labels(packet: &ExpressionPacket) -> Result<[String<LABEL_LEN>; 5], DisplayError> {
    let mut labels: [String<LABEL_LEN>; 5] = Default::default();

    write!(labels[0], "M.W: {}", packet.mouth_width).map_err(|_| DisplayError::BufferOverflow)?;
    write!(labels[1], "M.H: {}", packet.mouth_height).map_err(|_| DisplayError::BufferOverflow)?;
    write!(labels[2], "L.E: {}", packet.left_eye).map_err(|_| DisplayError::BufferOverflow)?;
    write!(labels[3], "R.E: {}", packet.right_eye).map_err(|_| DisplayError::BufferOverflow)?;
    write!(labels[4], "N.O: {}", packet.nose_offset).map_err(|_| DisplayError::BufferOverflow)?;

    Ok(labels)
}

/// Draw the readout for `packet` and present it
pub fn render_expression<P: RgbSurface>(
    surface: &mut P,
    packet: &ExpressionPacket,
) -> Result<(), DisplayError> {
    let labels = format_labels(packet)?;
    let style = MonoTextStyle::new(&FONT_4X6, FACE_COLOR);

    surface.clear(BACKGROUND_COLOR)?;
    for (label, &row) in labels.iter().zip(LABEL_ROWS.iter()) {
        Text::with_baseline(label.as_str(), Point::new(0, row), style, Baseline::Top)
            .draw(surface)?;
    }
    surface.present()
}

/// Draw the boot screen shown while the playback config loads
pub fn render_loading<P: RgbSurface>(surface: &mut P) -> Result<(), DisplayError> {
    let style = MonoTextStyle::new(&FONT_6X10, FACE_COLOR);

    surface.clear(BACKGROUND_COLOR)?;
    Text::with_baseline(LOADING_TEXT, LOADING_POS, style, Baseline::Top).draw(surface)?;
    surface.present()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::MatrixFramebuffer;

    fn packet() -> ExpressionPacket {
        ExpressionPacket {
            mouth_width: 90,
            mouth_height: 12,
            left_eye: 40,
            right_eye: 127,
            nose_offset: -63,
        }
    }

    fn face_pixels_in_rows(fb: &MatrixFramebuffer, rows: core::ops::Range<usize>) -> usize {
        fb.front()[rows]
            .iter()
            .flatten()
            .filter(|&&c| c == FACE_COLOR)
            .count()
    }

    #[test]
    fn test_format_labels() {
        let labels = format_labels(&packet()).unwrap();
        assert_eq!(labels[0].as_str(), "M.W: 90");
        assert_eq!(labels[1].as_str(), "M.H: 12");
        assert_eq!(labels[2].as_str(), "L.E: 40");
        assert_eq!(labels[3].as_str(), "R.E: 127");
        assert_eq!(labels[4].as_str(), "N.O: -63");
    }

    #[test]
    fn test_render_expression_draws_every_row() {
        let mut fb = MatrixFramebuffer::new();
        render_expression(&mut fb, &packet()).unwrap();

        assert_eq!(fb.presents(), 1);
        for &row in LABEL_ROWS.iter() {
            let row = row as usize;
            assert!(
                face_pixels_in_rows(&fb, row..row + 6) > 0,
                "label at row {} missing",
                row
            );
        }
        // Text stays in the top half, the rest is background
        assert_eq!(face_pixels_in_rows(&fb, 33..64), 0);
        assert_eq!(fb.pixel(63, 63), Some(BACKGROUND_COLOR));
    }

    #[test]
    fn test_render_expression_replaces_previous_frame() {
        let mut fb = MatrixFramebuffer::new();
        render_expression(&mut fb, &packet()).unwrap();
        let first = *fb.front();

        let mut other = packet();
        other.mouth_width = 1;
        render_expression(&mut fb, &other).unwrap();
        assert_ne!(first, *fb.front());
        assert_eq!(fb.presents(), 2);
    }

    #[test]
    fn test_render_loading() {
        let mut fb = MatrixFramebuffer::new();
        render_loading(&mut fb).unwrap();

        assert_eq!(fb.pixel(0, 0), Some(BACKGROUND_COLOR));
        assert!(face_pixels_in_rows(&fb, 11..21) > 0);
        assert_eq!(face_pixels_in_rows(&fb, 0..11), 0);
    }
}

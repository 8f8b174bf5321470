//! Image decode bridge
//!
//! Frame decompression is done by an external decoder that pulls bytes
//! through a [`StreamSource`] and pushes RGB565 scanlines into a
//! [`ScanlineSink`]. [`render_frame`] runs one frame through it:
//!
//! 1. clear both surfaces to black
//! 2. open the frame; on failure nothing is drawn
//! 3. decode into the [`Compositor`]
//! 4. close the stream (always)
//! 5. present both surfaces

use embedded_graphics::pixelcolor::{Rgb888, RgbColor};
use protodisplay_hal::{StorageError, StreamSource};

use crate::compositor::Compositor;
use crate::surface::{DisplayError, MonoSurface, RgbSurface};

/// Dimensions of a decoded image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ImageInfo {
    pub width: u16,
    pub height: u16,
}

/// Decoder errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// Storage failed while opening or reading the file
    Storage(StorageError),
    /// File is not a valid image
    InvalidImage,
    /// Valid image in a variant the decoder does not handle
    Unsupported,
    /// Image larger than the decoder's working buffers
    TooLarge,
}

impl From<StorageError> for DecodeError {
    fn from(e: StorageError) -> Self {
        DecodeError::Storage(e)
    }
}

/// Receives decoded scanlines
pub trait ScanlineSink {
    /// Called once before the first scanline
    fn begin(&mut self, info: ImageInfo);

    /// One row of RGB565 pixels, `pixels[x]` for `x` in `0..width`
    fn scanline(&mut self, y: u16, pixels: &[u16]);
}

/// External still-image decoder
pub trait FrameDecoder {
    /// Open `name` on `source` and read the image header
    fn open<S: StreamSource>(&mut self, source: &mut S, name: &str)
        -> Result<ImageInfo, DecodeError>;

    /// Decode the opened image, top to bottom
    fn decode<S: StreamSource, K: ScanlineSink>(
        &mut self,
        source: &mut S,
        sink: &mut K,
    ) -> Result<(), DecodeError>;
}

/// Result of rendering one video frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameOutcome {
    /// Frame decoded and presented
    Shown(ImageInfo),
    /// Frame could not be opened; a blank frame was presented
    OpenFailed(DecodeError),
    /// Decoding stopped part way; the decoded part was presented
    DecodeFailed { lines: u16, error: DecodeError },
}

impl FrameOutcome {
    /// Whether the frame made it to the display intact
    pub fn is_shown(&self) -> bool {
        matches!(self, FrameOutcome::Shown(_))
    }
}

/// Decode `name` and present it on the matrix and, if given, the OLED
///
/// Only a failed present is an error; decode problems are reported in the
/// returned [`FrameOutcome`].
pub fn render_frame<D, S, P, M>(
    decoder: &mut D,
    source: &mut S,
    name: &str,
    primary: &mut P,
    secondary: Option<&mut M>,
) -> Result<FrameOutcome, DisplayError>
where
    D: FrameDecoder,
    S: StreamSource,
    P: RgbSurface,
    M: MonoSurface,
{
    let mut compositor = Compositor::new(primary, secondary);
    compositor.clear(Rgb888::BLACK);

    let outcome = match decoder.open(source, name) {
        Ok(info) => {
            compositor.begin(info);
            match decoder.decode(source, &mut compositor) {
                Ok(()) => FrameOutcome::Shown(info),
                Err(error) => FrameOutcome::DecodeFailed {
                    lines: compositor.lines(),
                    error,
                },
            }
        }
        Err(error) => FrameOutcome::OpenFailed(error),
    };
    source.close();

    compositor.present()?;
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{MonoFramebuffer, RgbFramebuffer};
    use crate::testing::{raw_image, RawDecoder};

    /// In-memory storage holding a single file
    struct OneFile {
        name: &'static str,
        data: std::vec::Vec<u8>,
        pos: usize,
        open: bool,
        closes: u32,
    }

    impl OneFile {
        fn new(name: &'static str, data: std::vec::Vec<u8>) -> Self {
            Self {
                name,
                data,
                pos: 0,
                open: false,
                closes: 0,
            }
        }
    }

    impl StreamSource for OneFile {
        fn open(&mut self, name: &str) -> Result<u32, StorageError> {
            if name != self.name {
                return Err(StorageError::NotFound);
            }
            self.open = true;
            self.pos = 0;
            Ok(self.data.len() as u32)
        }

        fn read(&mut self, buf: &mut [u8]) -> Result<usize, StorageError> {
            if !self.open {
                return Err(StorageError::NotOpen);
            }
            let n = buf.len().min(self.data.len() - self.pos);
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }

        fn seek(&mut self, position: u32) -> Result<(), StorageError> {
            self.pos = (position as usize).min(self.data.len());
            Ok(())
        }

        fn close(&mut self) {
            self.open = false;
            self.closes += 1;
        }
    }

    #[test]
    fn test_render_frame_shows_image() {
        let mut source = OneFile::new("clip_001.png", raw_image(64, 32, 0xFFFF));
        let mut decoder = RawDecoder::default();
        let mut matrix = RgbFramebuffer::<64, 64>::new();
        let mut oled = MonoFramebuffer::<128, 8>::new();

        let outcome = render_frame(
            &mut decoder,
            &mut source,
            "clip_001.png",
            &mut matrix,
            Some(&mut oled),
        )
        .unwrap();

        assert_eq!(
            outcome,
            FrameOutcome::Shown(ImageInfo {
                width: 64,
                height: 32
            })
        );
        assert_eq!(matrix.pixel(0, 0), Some(Rgb888::WHITE));
        assert_eq!(matrix.pixel(63, 63), Some(Rgb888::WHITE));
        assert_eq!(oled.lit_count(), 128 * 64);
        assert_eq!(source.closes, 1);
    }

    #[test]
    fn test_missing_frame_presents_blank() {
        let mut source = OneFile::new("clip_001.png", raw_image(64, 32, 0xFFFF));
        let mut decoder = RawDecoder::default();
        let mut matrix = RgbFramebuffer::<64, 64>::new();

        // Previous frame was white
        render_frame::<_, _, _, MonoFramebuffer<128, 8>>(
            &mut decoder,
            &mut source,
            "clip_001.png",
            &mut matrix,
            None,
        )
        .unwrap();
        assert_eq!(matrix.pixel(0, 0), Some(Rgb888::WHITE));

        let outcome = render_frame::<_, _, _, MonoFramebuffer<128, 8>>(
            &mut decoder,
            &mut source,
            "clip_002.png",
            &mut matrix,
            None,
        )
        .unwrap();

        assert_eq!(
            outcome,
            FrameOutcome::OpenFailed(DecodeError::Storage(StorageError::NotFound))
        );
        assert!(matrix.front().iter().flatten().all(|&c| c == Rgb888::BLACK));
        assert_eq!(matrix.presents(), 2);
        assert_eq!(source.closes, 2);
    }

    #[test]
    fn test_truncated_frame_keeps_decoded_rows() {
        let mut data = raw_image(4, 4, 0xF800);
        data.truncate(4 + 4 * 2 * 2); // header + two rows
        let mut source = OneFile::new("cut.png", data);
        let mut decoder = RawDecoder::default();
        let mut matrix = RgbFramebuffer::<4, 4>::new();

        let outcome = render_frame::<_, _, _, MonoFramebuffer<8, 1>>(
            &mut decoder,
            &mut source,
            "cut.png",
            &mut matrix,
            None,
        )
        .unwrap();

        assert_eq!(
            outcome,
            FrameOutcome::DecodeFailed {
                lines: 2,
                error: DecodeError::InvalidImage
            }
        );
        assert_eq!(matrix.pixel(0, 1), Some(Rgb888::new(255, 0, 0)));
        assert_eq!(matrix.pixel(0, 2), Some(Rgb888::BLACK));
        assert!(!source.open);
    }
}

//! Raw-image decoder for host tests
//!
//! Enabled for this crate's tests and, through the `testing` feature, for
//! tests of crates that drive [`render_frame`](crate::render_frame).

use std::vec::Vec;

use protodisplay_hal::StreamSource;

use crate::decode::{DecodeError, FrameDecoder, ImageInfo, ScanlineSink};

/// Raw test image: width u16 LE, height u16 LE, then RGB565 LE pixels
pub fn raw_image(width: u16, height: u16, pixel: u16) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(&width.to_le_bytes());
    data.extend_from_slice(&height.to_le_bytes());
    for _ in 0..u32::from(width) * u32::from(height) {
        data.extend_from_slice(&pixel.to_le_bytes());
    }
    data
}

/// Decoder for [`raw_image`] files
#[derive(Default)]
pub struct RawDecoder {
    info: Option<ImageInfo>,
}

impl FrameDecoder for RawDecoder {
    fn open<S: StreamSource>(&mut self, source: &mut S, name: &str) -> Result<ImageInfo, DecodeError> {
        self.info = None;
        source.open(name)?;
        let mut header = [0u8; 4];
        if source.read(&mut header)? != 4 {
            return Err(DecodeError::InvalidImage);
        }
        let info = ImageInfo {
            width: u16::from_le_bytes([header[0], header[1]]),
            height: u16::from_le_bytes([header[2], header[3]]),
        };
        self.info = Some(info);
        Ok(info)
    }

    fn decode<S: StreamSource, K: ScanlineSink>(
        &mut self,
        source: &mut S,
        sink: &mut K,
    ) -> Result<(), DecodeError> {
        let info = self.info.ok_or(DecodeError::InvalidImage)?;
        let width = usize::from(info.width);
        let mut row = std::vec![0u8; width * 2];
        let mut line = std::vec![0u16; width];
        for y in 0..info.height {
            if source.read(&mut row)? != row.len() {
                return Err(DecodeError::InvalidImage);
            }
            for (x, px) in line.iter_mut().enumerate() {
                *px = u16::from_le_bytes([row[2 * x], row[2 * x + 1]]);
            }
            sink.scanline(y, &line);
        }
        Ok(())
    }
}

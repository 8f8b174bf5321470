//! PNG frame decoder
//!
//! `minipng` decodes from a complete in-memory file, so `open` reads the
//! whole frame into RAM and `decode` inflates it into a work buffer and
//! hands out rows as RGB565. Alpha is ignored.

use protodisplay_display::{DecodeError, FrameDecoder, ImageInfo, ScanlineSink};
use protodisplay_hal::StreamSource;

/// Largest PNG file accepted
pub const MAX_FILE_LEN: usize = 24 * 1024;

/// Largest decoded image, in bytes of RGBA
pub const WORK_LEN: usize = 20 * 1024;

/// Widest row handed to the sink
pub const MAX_WIDTH: usize = 128;

/// Pack 8-bit channels into RGB565
fn pack_rgb565(r: u8, g: u8, b: u8) -> u16 {
    (u16::from(r >> 3) << 11) | (u16::from(g >> 2) << 5) | u16::from(b >> 3)
}

/// Decoder working memory
pub struct PngBuffers {
    pub file: [u8; MAX_FILE_LEN],
    pub work: [u8; WORK_LEN],
}

impl PngBuffers {
    pub const fn new() -> Self {
        Self {
            file: [0; MAX_FILE_LEN],
            work: [0; WORK_LEN],
        }
    }
}

/// [`FrameDecoder`] for PNG files
pub struct PngDecoder {
    buffers: &'static mut PngBuffers,
    len: usize,
    info: Option<ImageInfo>,
}

impl PngDecoder {
    pub fn new(buffers: &'static mut PngBuffers) -> Self {
        Self {
            buffers,
            len: 0,
            info: None,
        }
    }
}

impl FrameDecoder for PngDecoder {
    fn open<S: StreamSource>(&mut self, source: &mut S, name: &str) -> Result<ImageInfo, DecodeError> {
        self.info = None;
        self.len = 0;

        let size = source.open(name)? as usize;
        if size > MAX_FILE_LEN {
            return Err(DecodeError::TooLarge);
        }

        let file = &mut self.buffers.file[..size];
        let mut filled = 0;
        while filled < size {
            match source.read(&mut file[filled..])? {
                0 => return Err(DecodeError::InvalidImage),
                n => filled += n,
            }
        }
        self.len = size;

        let header =
            minipng::decode_png_header(&self.buffers.file[..size]).map_err(|_| DecodeError::InvalidImage)?;
        if header.required_bytes_rgba8bpc() > WORK_LEN {
            return Err(DecodeError::TooLarge);
        }
        let (width, height) = (header.width(), header.height());
        if width == 0 || height == 0 {
            return Err(DecodeError::InvalidImage);
        }
        if width as usize > MAX_WIDTH || height > u32::from(u16::MAX) {
            return Err(DecodeError::Unsupported);
        }

        let info = ImageInfo {
            width: width as u16,
            height: height as u16,
        };
        self.info = Some(info);
        Ok(info)
    }

    fn decode<S: StreamSource, K: ScanlineSink>(
        &mut self,
        _source: &mut S,
        sink: &mut K,
    ) -> Result<(), DecodeError> {
        let info = self.info.ok_or(DecodeError::InvalidImage)?;
        let PngBuffers { file, work } = &mut *self.buffers;

        let mut image =
            minipng::decode_png(&file[..self.len], &mut work[..]).map_err(|_| DecodeError::InvalidImage)?;
        image
            .convert_to_rgba8bpc()
            .map_err(|_| DecodeError::Unsupported)?;

        let width = usize::from(info.width);
        let mut line = [0u16; MAX_WIDTH];
        for (y, row) in image.pixels().chunks_exact(width * 4).enumerate() {
            for (pixel, rgba) in line.iter_mut().zip(row.chunks_exact(4)) {
                *pixel = pack_rgb565(rgba[0], rgba[1], rgba[2]);
            }
            sink.scanline(y as u16, &line[..width]);
        }
        Ok(())
    }
}

//! Display surfaces and rendering for ProtoDisplay
//!
//! This crate provides:
//! - `Surface` traits for the two physical outputs (RGB LED matrix, mono OLED)
//! - In-memory double-buffered framebuffers implementing those traits
//! - The `Compositor` that maps decoded RGB565 scanlines onto both outputs
//! - The frame decode bridge driving an external `FrameDecoder`
//! - The expression readout renderer
//!
//! # Architecture
//!
//! Drawing goes through `embedded-graphics` into memory and never fails.
//! Only [`Surface::present`] touches hardware, so it is the single fallible
//! point of a render step.
//!
//! ```text
//! FrameDecoder ──scanlines──▶ Compositor ──▶ RgbSurface  (64×64 matrix)
//!                                       └──▶ MonoSurface (128×64 OLED)
//! ExpressionPacket ──▶ render_expression ──▶ RgbSurface
//! ```

#![no_std]

#[cfg(any(test, feature = "testing"))]
#[macro_use]
extern crate std;

pub mod compositor;
pub mod decode;
pub mod expression;
pub mod surface;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-export key types
pub use compositor::{expand_rgb565, Compositor};
pub use decode::{render_frame, DecodeError, FrameDecoder, FrameOutcome, ImageInfo, ScanlineSink};
pub use expression::{render_expression, render_loading, BACKGROUND_COLOR, FACE_COLOR};
pub use surface::{
    DisplayError, MatrixFramebuffer, MonoFramebuffer, MonoSurface, OledFramebuffer,
    RgbFramebuffer, RgbSurface, Surface,
};

//! # halfblock
//!
//! Render images as ANSI half-block text for terminal display.
//!
//! Each character cell encodes two vertically stacked pixels: the top pixel
//! sets the cell background, the bottom pixel sets the foreground, and a
//! lower-half-block glyph (`▄`) makes both visible at once. Transparency is
//! resolved by flattening onto a configurable matte color, and output can
//! target 16-color, 256-color, or truecolor terminals.
//!
//! ## Quick Start
//!
//! ```
//! use halfblock::Encoder;
//! use image::DynamicImage;
//!
//! let image = DynamicImage::new_rgba8(4, 4);
//! let encoder = Encoder::new(80, 24);
//!
//! let mut out = Vec::new();
//! encoder.encode(&mut out, &image)?;
//! # Ok::<(), halfblock::EncodeError>(())
//! ```

use thiserror::Error;

pub mod color;
pub mod encoder;

pub use color::{ColorLevel, ColorSlot, Rgb};
pub use encoder::{Encoder, LOWER_HALF_BLOCK};

// Resampling filters are part of the `Encoder` configuration surface.
pub use image::imageops::FilterType;

/// Errors that can occur while encoding an image to half-block text.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Source image has a zero dimension
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// Writing the assembled output failed
    #[error("write error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for half-block encoding.
pub type Result<T> = core::result::Result<T, EncodeError>;

//! Half-block render assembler.
//!
//! Drives size negotiation, resampling, compositing, and quantization to turn
//! a decoded image into one string of ANSI escape text, two pixel rows per
//! output line.

use std::io::Write;

use image::{imageops::FilterType, DynamicImage, GenericImageView};

use crate::color::{self, ColorLevel, ColorSlot, Rgb};
use crate::{EncodeError, Result};

/// The glyph that splits a cell into an upper (background) and lower
/// (foreground) half.
pub const LOWER_HALF_BLOCK: char = '▄';

const SGR_RESET: &str = "\x1b[0m";

/// Configures encoding of images into ANSI half-block text.
///
/// An `Encoder` is a plain value: build one per invocation and reuse it
/// freely, `encode` never mutates it or the source image.
#[derive(Debug, Clone)]
pub struct Encoder {
    /// Maximum output width in terminal cells.
    pub max_width: u32,
    /// Maximum output height in terminal cells. One cell covers two pixel
    /// rows, so the pixel budget is `2 * max_height`.
    pub max_height: u32,
    /// Color depth of the emitted directives.
    pub color_level: ColorLevel,
    /// Matte that transparent pixels are flattened onto.
    pub matte: Rgb,
    /// Resampling filter used when the image needs downscaling.
    pub filter: FilterType,
}

impl Default for Encoder {
    fn default() -> Self {
        Self {
            max_width: 80,
            max_height: 24,
            color_level: ColorLevel::TrueColor,
            matte: Rgb::WHITE,
            filter: FilterType::Triangle,
        }
    }
}

impl Encoder {
    /// Creates an encoder bounded to `max_width` x `max_height` cells, with
    /// truecolor output, a white matte, and bilinear resampling.
    pub fn new(max_width: u32, max_height: u32) -> Self {
        Self {
            max_width,
            max_height,
            ..Self::default()
        }
    }

    /// Encodes `image` as half-block text and writes it to `writer`.
    ///
    /// The image is downscaled to fit the cell bounds, flattened onto the
    /// matte, quantized to the configured color level, and emitted as one
    /// line per row pair, each line ending in an SGR reset. The whole output
    /// is assembled in memory and written with a single call; write errors
    /// are returned verbatim.
    ///
    /// If the scaled grid has an odd number of rows, the missing bottom
    /// pixel of the last row pair is treated as fully transparent and
    /// renders as the bare matte color.
    pub fn encode<W: Write>(&self, writer: &mut W, image: &DynamicImage) -> Result<()> {
        let (src_width, src_height) = image.dimensions();
        if src_width == 0 || src_height == 0 {
            return Err(EncodeError::InvalidDimensions {
                width: src_width,
                height: src_height,
            });
        }

        let (width, height) = self.target_size(src_width, src_height);
        let scaled = if (width, height) == (src_width, src_height) {
            image.to_rgba16()
        } else {
            image.resize_exact(width, height, self.filter).to_rgba16()
        };

        let mut out = String::new();
        for y in (0..height).step_by(2) {
            for x in 0..width {
                let top = color::flatten(*scaled.get_pixel(x, y), self.matte);
                color::write_sgr(&mut out, top, ColorSlot::Background, self.color_level);

                let bottom = if y + 1 < height {
                    color::flatten(*scaled.get_pixel(x, y + 1), self.matte)
                } else {
                    self.matte
                };
                color::write_sgr(&mut out, bottom, ColorSlot::Foreground, self.color_level);

                out.push(LOWER_HALF_BLOCK);
            }
            out.push_str(SGR_RESET);
            out.push('\n');
        }

        writer.write_all(out.as_bytes())?;
        Ok(())
    }

    /// Negotiates the render size for a `width` x `height` source.
    ///
    /// Both dimensions are halved together until the width fits `max_width`
    /// columns and half the height fits `max_height` rows. This is a coarse
    /// power-of-two downscale: it never upscales, performs zero iterations
    /// when the image already fits, and may overshoot one axis while the
    /// other fits exactly. An axis that halves to zero stays at zero until
    /// both bounds are met and is clamped to one pixel afterwards, so the
    /// scaler never sees a zero dimension.
    pub fn target_size(&self, width: u32, height: u32) -> (u32, u32) {
        let (mut w, mut h) = (width, height);
        while self.max_width < w || self.max_height < h / 2 {
            w /= 2;
            h /= 2;
        }
        (w.max(1), h.max(1))
    }
}

//! Matte compositing and SGR color quantization.
//!
//! The compositor flattens a possibly-transparent sample onto an opaque
//! matte; the quantizer turns the resulting color into the SGR fragment a
//! terminal of a given color depth understands. Both are pure functions:
//! identical inputs always produce identical output, there is no palette
//! learning or dithering involved.

use image::Rgba;

/// An opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const GRAY: Rgb = Rgb::new(0xAA, 0xAA, 0xAA);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Color depth supported by the target terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorLevel {
    /// 16-color palette (SGR 30-37/90-97 and 40-47/100-107)
    Ansi16,
    /// 256-color palette (SGR 38;5;N / 48;5;N)
    Ansi256,
    /// 24-bit truecolor (SGR 38;2;r;g;b / 48;2;r;g;b)
    TrueColor,
}

/// Which half of a cell a color directive addresses.
///
/// The top pixel of a cell is painted as the background, the bottom pixel as
/// the foreground of the lower-half-block glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSlot {
    Background,
    Foreground,
}

/// Flattens a 16-bit RGBA sample onto an opaque matte.
///
/// Samples are reduced to 8-bit scale (`s >> 8`) first, then blended with
/// `alpha * c + (1 - alpha) * matte` per channel. A fully transparent sample
/// yields exactly the matte; a fully opaque one yields the sample color.
/// No gamma correction is applied.
pub fn flatten(sample: Rgba<u16>, matte: Rgb) -> Rgb {
    let [r, g, b, a] = sample.0;
    let alpha = (a >> 8) as f32 / 255.0;

    let mix = |c: u16, m: u8| -> u8 {
        (alpha * (c >> 8) as f32 + (1.0 - alpha) * m as f32).clamp(0.0, 255.0) as u8
    };

    Rgb::new(mix(r, matte.r), mix(g, matte.g), mix(b, matte.b))
}

/// Appends the SGR fragment (`ESC[...m`) that sets `slot` to `color` at the
/// requested color level.
pub fn write_sgr(out: &mut String, color: Rgb, slot: ColorSlot, level: ColorLevel) {
    out.push_str("\x1b[");
    match level {
        ColorLevel::Ansi16 => {
            write_number(out, ansi16_code(color, slot) as usize);
        }
        ColorLevel::Ansi256 => {
            out.push_str(match slot {
                ColorSlot::Background => "48;5;",
                ColorSlot::Foreground => "38;5;",
            });
            write_number(out, ansi256_index(color) as usize);
        }
        ColorLevel::TrueColor => {
            out.push_str(match slot {
                ColorSlot::Background => "48;2;",
                ColorSlot::Foreground => "38;2;",
            });
            write_number(out, color.r as usize);
            out.push(';');
            write_number(out, color.g as usize);
            out.push(';');
            write_number(out, color.b as usize);
        }
    }
    out.push('m');
}

/// The standard 16-color terminal palette (VGA values).
const ANSI16_PALETTE: [Rgb; 16] = [
    Rgb::new(0, 0, 0),       // black
    Rgb::new(128, 0, 0),     // red
    Rgb::new(0, 128, 0),     // green
    Rgb::new(128, 128, 0),   // yellow
    Rgb::new(0, 0, 128),     // blue
    Rgb::new(128, 0, 128),   // magenta
    Rgb::new(0, 128, 128),   // cyan
    Rgb::new(192, 192, 192), // white
    Rgb::new(128, 128, 128), // bright black
    Rgb::new(255, 0, 0),     // bright red
    Rgb::new(0, 255, 0),     // bright green
    Rgb::new(255, 255, 0),   // bright yellow
    Rgb::new(0, 0, 255),     // bright blue
    Rgb::new(255, 0, 255),   // bright magenta
    Rgb::new(0, 255, 255),   // bright cyan
    Rgb::new(255, 255, 255), // bright white
];

/// Levels of the 6x6x6 color cube in the xterm 256-color palette.
const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

#[inline]
fn distance(a: Rgb, b: Rgb) -> i32 {
    let dr = a.r as i32 - b.r as i32;
    let dg = a.g as i32 - b.g as i32;
    let db = a.b as i32 - b.b as i32;
    dr * dr + dg * dg + db * db
}

/// Nearest entry in the standard 16-color palette, by squared RGB distance.
/// Ties resolve to the lowest index, so the mapping is deterministic.
pub fn ansi16_index(color: Rgb) -> u8 {
    let mut best = 0;
    let mut best_dist = i32::MAX;
    for (i, &entry) in ANSI16_PALETTE.iter().enumerate() {
        let dist = distance(color, entry);
        if dist < best_dist {
            best = i;
            best_dist = dist;
        }
    }
    best as u8
}

/// SGR code for a 16-color directive: 30-37/90-97 for the foreground slot,
/// 40-47/100-107 for the background slot.
fn ansi16_code(color: Rgb, slot: ColorSlot) -> u8 {
    let index = ansi16_index(color);
    let (normal, bright) = match slot {
        ColorSlot::Background => (40, 100),
        ColorSlot::Foreground => (30, 90),
    };
    if index < 8 {
        normal + index
    } else {
        bright + (index - 8)
    }
}

/// Nearest entry in the xterm 256-color palette.
///
/// Considers the 6x6x6 color cube (indices 16-231) and the 24-step gray ramp
/// (indices 232-255); the 16 base colors are never produced since their
/// appearance varies between terminals. Ties resolve toward the cube.
pub fn ansi256_index(color: Rgb) -> u8 {
    // Nearest cube level per channel, xterm's thresholds.
    let level = |v: u8| -> u8 {
        if v < 48 {
            0
        } else if v < 115 {
            1
        } else {
            ((v as u16 - 35) / 40) as u8
        }
    };
    let (ri, gi, bi) = (level(color.r), level(color.g), level(color.b));
    let cube = Rgb::new(
        CUBE_LEVELS[ri as usize],
        CUBE_LEVELS[gi as usize],
        CUBE_LEVELS[bi as usize],
    );
    let cube_index = 16 + 36 * ri + 6 * gi + bi;

    // Nearest gray ramp entry (8, 18, .. 238).
    let avg = ((color.r as u16 + color.g as u16 + color.b as u16) / 3) as i32;
    let gray_step = ((avg - 8 + 5) / 10).clamp(0, 23) as u8;
    let gray_value = 8 + 10 * gray_step;
    let gray = Rgb::new(gray_value, gray_value, gray_value);

    if distance(color, gray) < distance(color, cube) {
        232 + gray_step
    } else {
        cube_index
    }
}

/// Fast number to string without allocation
#[inline]
fn write_number(out: &mut String, mut n: usize) {
    if n == 0 {
        out.push('0');
        return;
    }

    let mut buf = [0u8; 20];
    let mut i = buf.len();

    while n > 0 {
        i -= 1;
        buf[i] = b'0' + (n % 10) as u8;
        n /= 10;
    }

    out.push_str(unsafe { std::str::from_utf8_unchecked(&buf[i..]) });
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_flatten_transparent_is_matte() {
        let matte = Rgb::new(12, 34, 56);
        let out = flatten(Rgba([65535, 0, 65535, 0]), matte);
        assert_eq!(out, matte);
    }

    #[test]
    fn test_flatten_opaque_is_source() {
        let out = flatten(Rgba([65535, 0, 32896, 65535]), Rgb::BLACK);
        assert_eq!(out, Rgb::new(255, 0, 128));
    }

    #[test]
    fn test_flatten_half_alpha_blends() {
        // ~50% white over black lands mid-range on every channel.
        let out = flatten(Rgba([65535, 65535, 65535, 0x8080]), Rgb::BLACK);
        assert!(out.r > 120 && out.r < 136, "got {}", out.r);
        assert_eq!(out.r, out.g);
        assert_eq!(out.g, out.b);
    }

    #[test]
    fn test_truecolor_fragment_is_literal() {
        let mut out = String::new();
        write_sgr(&mut out, Rgb::new(255, 0, 0), ColorSlot::Background, ColorLevel::TrueColor);
        assert_eq!(out, "\x1b[48;2;255;0;0m");

        out.clear();
        write_sgr(&mut out, Rgb::new(1, 2, 3), ColorSlot::Foreground, ColorLevel::TrueColor);
        assert_eq!(out, "\x1b[38;2;1;2;3m");
    }

    #[test]
    fn test_ansi256_cube_corners() {
        assert_eq!(ansi256_index(Rgb::BLACK), 16);
        assert_eq!(ansi256_index(Rgb::WHITE), 231);
        assert_eq!(ansi256_index(Rgb::new(255, 0, 0)), 196);
        assert_eq!(ansi256_index(Rgb::new(0, 0, 255)), 21);
    }

    #[test]
    fn test_ansi256_mid_gray_uses_ramp() {
        let index = ansi256_index(Rgb::new(128, 128, 128));
        assert!((232..=255).contains(&index), "got {index}");
    }

    #[test]
    fn test_ansi256_is_deterministic() {
        let c = Rgb::new(128, 64, 192);
        assert_eq!(ansi256_index(c), ansi256_index(c));
    }

    #[test]
    fn test_ansi16_exact_palette_entries() {
        assert_eq!(ansi16_index(Rgb::BLACK), 0);
        assert_eq!(ansi16_index(Rgb::new(255, 0, 0)), 9);
        assert_eq!(ansi16_index(Rgb::WHITE), 15);
    }

    #[test]
    fn test_ansi16_fragments() {
        let mut out = String::new();
        write_sgr(&mut out, Rgb::BLACK, ColorSlot::Background, ColorLevel::Ansi16);
        assert_eq!(out, "\x1b[40m");

        out.clear();
        write_sgr(&mut out, Rgb::new(255, 0, 0), ColorSlot::Foreground, ColorLevel::Ansi16);
        assert_eq!(out, "\x1b[91m");
    }

    #[test]
    fn test_ansi256_fragment_shape() {
        let mut out = String::new();
        write_sgr(&mut out, Rgb::WHITE, ColorSlot::Foreground, ColorLevel::Ansi256);
        assert_eq!(out, "\x1b[38;5;231m");
    }
}

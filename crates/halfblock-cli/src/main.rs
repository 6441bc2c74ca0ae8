//! hbcat - A friendly, cat-like image previewer for your terminal.
//!
//! Renders an image file (or piped image data) as ANSI half-block text,
//! sized to the current terminal and quantized to its color depth.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::Context;
use clap::{CommandFactory, Parser, ValueEnum};
use crossterm::tty::IsTty;
use halfblock::{ColorLevel, Encoder, FilterType, Rgb};
use log::debug;

mod term;

#[derive(Parser)]
#[command(name = "hbcat")]
#[command(version)]
#[command(about = "Preview images in the terminal as ANSI half-block text", long_about = None)]
struct Cli {
    /// Image file to display (reads stdin when piped)
    file: Option<PathBuf>,

    /// Matte color shown behind transparent pixels
    #[arg(long, value_enum, default_value_t = MatteArg::White)]
    bg: MatteArg,

    /// Color level to emit (auto probes the environment)
    #[arg(long, value_enum, default_value_t = ColorArg::Auto)]
    color: ColorArg,

    /// Resampling filter used when downscaling
    #[arg(long, value_enum, default_value_t = FilterArg::Bilinear)]
    filter: FilterArg,

    /// Override the detected terminal width (cells)
    #[arg(long)]
    width: Option<u32>,

    /// Override the detected terminal height (cells)
    #[arg(long)]
    height: Option<u32>,
}

#[derive(Clone, Copy, ValueEnum)]
enum MatteArg {
    White,
    Gray,
    Black,
}

impl MatteArg {
    fn rgb(self) -> Rgb {
        match self {
            MatteArg::White => Rgb::WHITE,
            MatteArg::Gray => Rgb::GRAY,
            MatteArg::Black => Rgb::BLACK,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ColorArg {
    Auto,
    #[value(name = "16")]
    Ansi16,
    #[value(name = "256")]
    Ansi256,
    Rgb,
}

#[derive(Clone, Copy, ValueEnum)]
enum FilterArg {
    Nearest,
    Bilinear,
    Lanczos,
}

impl From<FilterArg> for FilterType {
    fn from(filter: FilterArg) -> Self {
        match filter {
            FilterArg::Nearest => FilterType::Nearest,
            FilterArg::Bilinear => FilterType::Triangle,
            FilterArg::Lanczos => FilterType::Lanczos3,
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let raw = match &cli.file {
        Some(path) => fs::read(path)
            .with_context(|| format!("unable to read file '{}'", path.display()))?,
        None => {
            if io::stdin().is_tty() {
                Cli::command().print_help()?;
                std::process::exit(1);
            }
            let mut buf = Vec::new();
            io::stdin()
                .read_to_end(&mut buf)
                .context("unable to read pipe")?;
            buf
        }
    };

    let image = image::load_from_memory(&raw).context("unable to decode image data")?;

    let (cols, rows) =
        crossterm::terminal::size().context("unable to determine terminal dimensions")?;
    debug!("terminal size: {cols}x{rows} cells");

    let color_level = match cli.color {
        ColorArg::Auto => {
            term::detect_color_level().context("unable to determine color level")?
        }
        ColorArg::Ansi16 => ColorLevel::Ansi16,
        ColorArg::Ansi256 => ColorLevel::Ansi256,
        ColorArg::Rgb => ColorLevel::TrueColor,
    };
    debug!("color level: {color_level:?}");

    let encoder = Encoder {
        max_width: cli.width.unwrap_or(cols as u32),
        max_height: cli.height.unwrap_or(rows as u32),
        color_level,
        matte: cli.bg.rgb(),
        filter: cli.filter.into(),
    };

    let stdout = io::stdout();
    encoder
        .encode(&mut stdout.lock(), &image)
        .context("unable to encode image data")?;

    Ok(())
}

use std::path::PathBuf;

use clap::Parser;
use raster_codec::config::PackConfig;

#[derive(Debug, Parser)]
/// Resize an image and write it as a raw MSB-first bit packed grayscale
/// stream.
pub struct Args {
    /// Image to read. Any format supported by the `image` crate works, color
    /// images are converted to grayscale.
    pub input: PathBuf,
    /// Path of the packed output file.
    pub output: PathBuf,

    #[arg(long)]
    /// Output width in pixels. Defaults to the config value, then the source
    /// width.
    pub width: Option<usize>,
    #[arg(long)]
    /// Output height in pixels. Defaults to the config value, then the
    /// source height.
    pub height: Option<usize>,
    #[arg(short, long)]
    /// Bits to keep from each sample (1-8).
    pub depth: Option<u8>,
    #[arg(long)]
    /// Invert samples before packing.
    pub invert: bool,

    #[arg(short, long, default_value = "raster_pack.toml")]
    /// TOML file with default settings.
    pub config: PathBuf,
    #[arg(short, long)]
    /// Also save the resized image as a PNG.
    pub preview: Option<PathBuf>,
}

/// Settings after merging the arguments over the config file.
#[derive(Debug, PartialEq, Eq)]
pub struct Settings {
    pub width: usize,
    pub height: usize,
    pub depth: u8,
    pub invert: bool,
}

impl Args {
    pub fn settings(&self, config: &PackConfig, source: (usize, usize)) -> Settings {
        Settings {
            width: self.width.or(config.width).unwrap_or(source.0),
            height: self.height.or(config.height).unwrap_or(source.1),
            depth: self.depth.unwrap_or(config.depth),
            invert: self.invert || config.invert,
        }
    }
}

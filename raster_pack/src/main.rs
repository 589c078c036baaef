use std::{
    fs::File,
    io::{BufWriter, Write},
    time::Instant,
};

use anyhow::{Context, Result};
use clap::Parser;
use image::GrayImage;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

use raster_codec::{config::PackConfig, container::Image, pack::pack_image};

mod args;
use args::Args;

fn main() -> Result<()> {
    let filter = filter::Targets::new()
        .with_default(LevelFilter::WARN)
        .with_target("raster_pack", LevelFilter::INFO)
        .with_target("raster_codec", LevelFilter::DEBUG);
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = PackConfig::load_or_default(&args.config);

    let source = image::open(&args.input)
        .with_context(|| format!("Failed to open `{}`", args.input.display()))?
        .to_luma8();
    let source_size = (source.width() as usize, source.height() as usize);
    let settings = args.settings(&config, source_size);
    info!(
        "Loaded {}x{} image, packing at {}x{} with {} bpp",
        source_size.0, source_size.1, settings.width, settings.height, settings.depth
    );

    let now = Instant::now();
    let mut image = Image::from_raw(source_size.0, source_size.1, source.into_raw())?
        .resize(settings.width, settings.height)?;

    if settings.invert {
        for y in 0..settings.height {
            for x in 0..settings.width {
                let pixel = image.get_pixel(x, y);
                image.set_pixel(x, y, !pixel);
            }
        }
    }

    if let Some(preview) = &args.preview {
        let width = settings.width as u32;
        let height = settings.height as u32;
        GrayImage::from_raw(width, height, image.data().to_vec())
            .context("Resized image does not fit preview buffer")?
            .save(preview)
            .with_context(|| format!("Failed to save preview `{}`", preview.display()))?;
        info!("Saved preview to {}", preview.display());
    }

    let file = File::create(&args.output)
        .with_context(|| format!("Failed to create `{}`", args.output.display()))?;
    let mut out = BufWriter::new(file);
    let bits = pack_image(&mut out, &image, settings.depth)?;
    out.flush()?;

    info!(
        "Wrote {} payload bytes to {} in {:?}",
        bits.div_ceil(8),
        args.output.display(),
        now.elapsed()
    );

    Ok(())
}

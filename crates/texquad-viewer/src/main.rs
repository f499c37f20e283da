use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use winit::dpi::LogicalSize;

use texquad_engine::device::GpuInit;
use texquad_engine::host::{Host, HostConfig};
use texquad_engine::image::Image;
use texquad_engine::logging::{init_logging, LoggingConfig};
use texquad_engine::renderer::{QuadRenderer, RendererConfig};

mod slideshow;

/// Packaged image shown at startup.
const SAMPLE_PNG: &[u8] = include_bytes!("../assets/sample.png");

/// Show an image on a full-screen textured quad.
#[derive(Debug, Parser)]
#[command(name = "texquad-viewer", version)]
struct Args {
    /// Images to cycle through after the built-in sample.
    images: Vec<PathBuf>,

    /// Window title.
    #[arg(long, default_value = "texquad")]
    title: String,

    /// Initial window width in logical pixels.
    #[arg(long, default_value_t = 513.0)]
    width: f64,

    /// Initial window height in logical pixels.
    #[arg(long, default_value_t = 912.0)]
    height: f64,

    /// Delay between slideshow images.
    #[arg(long, default_value_t = 2000)]
    interval_ms: u64,

    /// Log filter (env_logger syntax); overrides RUST_LOG.
    #[arg(long)]
    log: Option<String>,

    /// Prefer an sRGB swapchain.
    #[arg(long)]
    srgb: bool,

    /// Redraw only when something changes instead of every loop iteration.
    #[arg(long)]
    on_demand: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(LoggingConfig {
        env_filter: args.log.clone(),
        ..Default::default()
    });

    let host = Host::new()?;
    let sender = host.image_sender();

    // Queued before the surface exists; becomes the setup image.
    let sample = Image::decode(SAMPLE_PNG).context("failed to decode bundled sample image")?;
    sender.send(sample)?;

    if !args.images.is_empty() {
        slideshow::spawn(
            sender,
            args.images.clone(),
            Duration::from_millis(args.interval_ms),
        )?;
    }

    let config = HostConfig {
        title: args.title,
        initial_size: LogicalSize::new(args.width, args.height),
        continuous_redraw: !args.on_demand,
    };
    let gpu_init = GpuInit {
        prefer_srgb: args.srgb,
        ..Default::default()
    };

    host.run(config, gpu_init, QuadRenderer::new(RendererConfig::default()))
}

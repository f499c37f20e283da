use std::path::PathBuf;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{Context, Result};

use texquad_engine::host::ImageSender;
use texquad_engine::image::Image;

/// Decodes `paths` on a loader thread and sends one every `interval`, looping.
///
/// Stops when the host closes, or after a full pass in which nothing decoded.
pub(crate) fn spawn(sender: ImageSender, paths: Vec<PathBuf>, interval: Duration) -> Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("texquad-loader".to_string())
        .spawn(move || run(&sender, &paths, interval))
        .context("failed to spawn image loader thread")
}

fn run(sender: &ImageSender, paths: &[PathBuf], interval: Duration) {
    loop {
        let mut sent = 0usize;

        for path in paths {
            thread::sleep(interval);

            let image = match Image::open(path) {
                Ok(image) => image,
                Err(err) => {
                    log::warn!("skipping {}: {err}", path.display());
                    continue;
                }
            };

            log::info!("showing {} ({}x{})", path.display(), image.width(), image.height());
            if sender.send(image).is_err() {
                log::debug!("host closed; loader exiting");
                return;
            }
            sent += 1;
        }

        if sent == 0 {
            log::warn!("no slideshow image could be decoded; loader exiting");
            return;
        }
    }
}

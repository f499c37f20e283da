use thiserror::Error;
use winit::event_loop::EventLoopProxy;

use crate::image::Image;

/// Events marshaled onto the render thread.
#[derive(Debug)]
pub enum HostEvent {
    /// Replace the displayed image.
    SetImage(Image),
    /// Stop the event loop.
    Exit,
}

/// The event loop is gone; nothing will receive further events.
#[derive(Debug, Error)]
#[error("host event loop has closed")]
pub struct HostClosed;

/// Cloneable, `Send` handle for feeding images to the renderer from any thread.
///
/// Nothing here touches GPU state: each image is posted to the event loop and
/// handed to the renderer on the render thread.
#[derive(Debug, Clone)]
pub struct ImageSender {
    proxy: EventLoopProxy<HostEvent>,
}

impl ImageSender {
    pub(crate) fn new(proxy: EventLoopProxy<HostEvent>) -> Self {
        Self { proxy }
    }

    pub fn send(&self, image: Image) -> Result<(), HostClosed> {
        self.proxy
            .send_event(HostEvent::SetImage(image))
            .map_err(|_| HostClosed)
    }

    /// Asks the host to shut down after the current iteration.
    pub fn request_exit(&self) -> Result<(), HostClosed> {
        self.proxy.send_event(HostEvent::Exit).map_err(|_| HostClosed)
    }
}

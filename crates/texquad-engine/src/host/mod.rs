//! Host surface: window, event loop and render thread.
//!
//! Owns the `winit` EventLoop and Window, wires them to the GPU layer and
//! drives a [`SurfaceRenderer`](crate::surface::SurfaceRenderer). Images from
//! other threads enter through an [`ImageSender`] as event-loop user events.

mod config;
mod runtime;
mod sender;

pub use config::HostConfig;
pub use runtime::Host;
pub use sender::{HostClosed, HostEvent, ImageSender};

//! texquad engine.
//!
//! Shows one image as a texture on a full-screen quad. The host surface owns
//! the window, GPU context and render thread and drives a
//! [`SurfaceRenderer`](surface::SurfaceRenderer); [`QuadRenderer`](renderer::QuadRenderer)
//! is the renderer that uploads the image and draws the quad.

pub mod device;
pub mod error;
pub mod host;
pub mod image;
pub mod logging;
pub mod render;
pub mod renderer;
pub mod surface;

pub use error::RenderError;

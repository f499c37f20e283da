//! Contract between the host surface and whatever draws into it.
//!
//! The host owns the window, the GPU context and the render thread; it calls
//! into a [`SurfaceRenderer`] on that thread only.

mod callbacks;

pub use callbacks::SurfaceRenderer;

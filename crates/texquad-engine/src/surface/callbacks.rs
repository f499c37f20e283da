use crate::error::RenderError;
use crate::image::Image;
use crate::render::{RenderCtx, RenderTarget};

/// Lifecycle callbacks delivered by the host, all on the render thread.
///
/// Order per surface: `on_surface_created`, then `on_surface_changed` at least
/// once, then any number of `on_draw_frame`, then `on_surface_destroyed`.
/// `on_image` may arrive at any point, including before the first surface.
pub trait SurfaceRenderer {
    /// The GPU context is ready; create all surface-lifetime resources.
    fn on_surface_created(&mut self, ctx: &RenderCtx<'_>) -> Result<(), RenderError>;

    /// The drawable size changed (physical pixels, may be zero).
    fn on_surface_changed(&mut self, width: u32, height: u32) {
        let _ = (width, height);
    }

    /// Record one frame. Returning an error drops the frame unpresented.
    fn on_draw_frame(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
    ) -> Result<(), RenderError>;

    /// The surface and its GPU resources are going away.
    fn on_surface_destroyed(&mut self) {}

    /// A new image arrived from another thread (already marshaled here).
    fn on_image(&mut self, image: Image);
}

//! The textured-quad renderer driven by host surface callbacks.
//!
//! [`QuadRenderer`] wraps a [`RenderState`] in a [`Lifecycle`] and keeps the
//! most recent image that has not reached the GPU yet. Images may arrive
//! before the surface exists; the latest one becomes the setup image.

mod lifecycle;

pub use lifecycle::{Lifecycle, Phase};

use crate::error::RenderError;
use crate::image::Image;
use crate::render::{draw_frame, RenderCtx, RenderState, RenderTarget};
use crate::surface::SurfaceRenderer;

/// Placeholder image size used when setup runs before any image arrived.
pub const PLACEHOLDER_SIZE: (u32, u32) = (513, 912);

/// Renderer configuration.
#[derive(Debug, Clone, Copy)]
pub struct RendererConfig {
    /// Color the target is cleared to before the quad is drawn.
    pub clear_color: wgpu::Color,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            clear_color: wgpu::Color::BLACK,
        }
    }
}

/// Draws one image on a full-screen quad.
pub struct QuadRenderer {
    config: RendererConfig,
    lifecycle: Lifecycle<RenderState>,

    /// Latest image not yet uploaded. Later arrivals overwrite earlier ones.
    pending: Option<Image>,

    surface_size: (u32, u32),
    frames_drawn: u64,
}

impl QuadRenderer {
    pub fn new(config: RendererConfig) -> Self {
        Self {
            config,
            lifecycle: Lifecycle::default(),
            pending: None,
            surface_size: (0, 0),
            frames_drawn: 0,
        }
    }

    /// Queues `image`; it is uploaded at setup or before the next frame.
    pub fn set_image(&mut self, image: Image) {
        if self.pending.replace(image).is_some() {
            log::debug!("pending image superseded before upload");
        }
    }

    /// Uploads `image` right away when ready, otherwise queues it.
    ///
    /// Must run on the render thread.
    pub fn replace_image(&mut self, ctx: &RenderCtx<'_>, image: Image) -> Result<(), RenderError> {
        match self.lifecycle.ready_mut() {
            Ok(state) => state.replace_image(ctx, image),
            Err(_) => {
                self.set_image(image);
                Ok(())
            }
        }
    }

    pub fn phase(&self) -> Phase {
        self.lifecycle.phase()
    }

    /// Render state, once setup has run for the current surface.
    pub fn state(&self) -> Option<&RenderState> {
        self.lifecycle.ready().ok()
    }

    pub fn has_pending_image(&self) -> bool {
        self.pending.is_some()
    }

    pub fn surface_size(&self) -> (u32, u32) {
        self.surface_size
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }
}

impl Default for QuadRenderer {
    fn default() -> Self {
        Self::new(RendererConfig::default())
    }
}

impl SurfaceRenderer for QuadRenderer {
    fn on_surface_created(&mut self, ctx: &RenderCtx<'_>) -> Result<(), RenderError> {
        if self.lifecycle.phase() == Phase::Ready {
            return Err(RenderError::AlreadyInitialized);
        }

        let image = match self.pending.take() {
            Some(image) => image,
            None => {
                log::warn!("no image supplied before surface creation; using a blank placeholder");
                Image::blank(PLACEHOLDER_SIZE.0, PLACEHOLDER_SIZE.1)?
            }
        };

        let retry = image.clone();
        if let Err(err) = self.lifecycle.create(|| RenderState::setup(ctx, image)) {
            // Keep it for the next attempt unless something newer arrived.
            self.pending.get_or_insert(retry);
            return Err(err);
        }
        Ok(())
    }

    fn on_surface_changed(&mut self, width: u32, height: u32) {
        log::info!("surface changed: {width}x{height}");
        self.surface_size = (width, height);
    }

    fn on_draw_frame(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
    ) -> Result<(), RenderError> {
        let state = self.lifecycle.ready_mut()?;

        if let Some(image) = self.pending.take() {
            if let Err(err) = state.replace_image(ctx, image.clone()) {
                self.pending = Some(image);
                return Err(err);
            }
        }

        draw_frame(ctx, state, target, self.config.clear_color)?;
        self.frames_drawn += 1;
        log::trace!("frame {} drawn", self.frames_drawn);
        Ok(())
    }

    fn on_surface_destroyed(&mut self) {
        let Some(state) = self.lifecycle.destroy() else {
            return;
        };

        // Keep the shown image so the next surface starts from it.
        if self.pending.is_none() {
            self.pending = Some(state.into_image());
        }
        log::info!("surface destroyed after {} frames", self.frames_drawn);
    }

    fn on_image(&mut self, image: Image) {
        log::debug!("image received: {}x{}", image.width(), image.height());
        self.set_image(image);
    }
}

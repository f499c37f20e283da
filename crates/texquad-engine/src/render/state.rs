use crate::error::RenderError;
use crate::image::Image;
use crate::render::{QuadBuffers, QuadTexture, RenderCtx, ShaderProgram};

/// Every GPU resource the quad needs, created together at surface creation.
///
/// Owned by the render thread and lent to [`draw_frame`](super::draw_frame)
/// by shared reference. Only [`replace_image`](Self::replace_image) mutates it,
/// and only the texture part.
pub struct RenderState {
    program: ShaderProgram,
    quad: QuadBuffers,
    texture: QuadTexture,
    image: Image,
}

impl RenderState {
    /// Runs setup: texture upload, vertex buffers, shader compile + link.
    pub fn setup(ctx: &RenderCtx<'_>, image: Image) -> Result<Self, RenderError> {
        let program = ShaderProgram::new(ctx)?;
        let texture = QuadTexture::new(ctx, &program, &image)?;
        let quad = QuadBuffers::new(ctx)?;

        log::info!(
            "render state ready: {}x{} texture, target {:?}",
            image.width(),
            image.height(),
            program.target_format()
        );

        Ok(Self { program, quad, texture, image })
    }

    /// Swaps in a new image. Program and vertex buffers are not touched.
    pub fn replace_image(&mut self, ctx: &RenderCtx<'_>, image: Image) -> Result<(), RenderError> {
        self.texture.replace(ctx, &self.program, &image)?;
        log::debug!(
            "texture replaced ({}x{} -> {}x{})",
            self.image.width(),
            self.image.height(),
            image.width(),
            image.height()
        );
        self.image = image;
        Ok(())
    }

    pub fn program(&self) -> &ShaderProgram {
        &self.program
    }

    pub fn quad(&self) -> &QuadBuffers {
        &self.quad
    }

    pub fn texture(&self) -> &QuadTexture {
        &self.texture
    }

    /// The image currently held in texture level 0.
    pub fn image(&self) -> &Image {
        &self.image
    }

    /// Hands back the current image, e.g. to re-upload it on the next surface.
    pub fn into_image(self) -> Image {
        self.image
    }
}

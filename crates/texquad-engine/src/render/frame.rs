use std::ops::Range;

use crate::error::RenderError;
use crate::render::{RenderCtx, RenderState, RenderTarget, QUAD_VERTEX_COUNT};

/// Description of a recorded draw.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub topology: wgpu::PrimitiveTopology,
    pub vertices: Range<u32>,
    pub instances: Range<u32>,
    /// Bind group index the texture is bound to.
    pub texture_unit: u32,
}

/// The only draw the quad ever issues: one 4-vertex strip, texture on unit 0.
pub const QUAD_DRAW: DrawCall = DrawCall {
    topology: wgpu::PrimitiveTopology::TriangleStrip,
    vertices: 0..QUAD_VERTEX_COUNT,
    instances: 0..1,
    texture_unit: 0,
};

/// Records one frame into `target`: clear to `clear`, then draw the quad.
///
/// The render pass has no depth attachment, so depth testing is off; culling
/// and additive blending are baked into the pipeline. Errors in the pass
/// itself are reported by [`submit_frame`].
pub fn draw_frame(
    ctx: &RenderCtx<'_>,
    state: &RenderState,
    target: &mut RenderTarget<'_>,
    clear: wgpu::Color,
) -> Result<DrawCall, RenderError> {
    {
        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("texquad pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(state.program().pipeline());
        rpass.set_bind_group(QUAD_DRAW.texture_unit, state.texture().bind_group(), &[]);
        rpass.set_vertex_buffer(0, state.quad().positions().slice(..));
        rpass.set_vertex_buffer(1, state.quad().tex_coords().slice(..));
        rpass.draw(QUAD_DRAW.vertices, QUAD_DRAW.instances);
    }
    ctx.errors.check("draw quad")?;

    log::trace!(
        "drew quad with {}x{} texture",
        state.texture().size().0,
        state.texture().size().1
    );

    Ok(QUAD_DRAW)
}

/// Finishes `encoder` and submits it, checking the device after each step.
///
/// Render-pass validation happens when the encoder is finished, not while the
/// pass is recorded, so this is where a bad frame is caught.
pub fn submit_frame(ctx: &RenderCtx<'_>, encoder: wgpu::CommandEncoder) -> Result<(), RenderError> {
    let commands = encoder.finish();
    ctx.errors.check("finish frame")?;

    ctx.queue.submit(std::iter::once(commands));
    ctx.errors.check("submit frame")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_draw_is_a_four_vertex_strip() {
        assert_eq!(QUAD_DRAW.topology, wgpu::PrimitiveTopology::TriangleStrip);
        assert_eq!(QUAD_DRAW.vertices.len(), 4);
        assert_eq!(QUAD_DRAW.instances, 0..1);
    }

    #[test]
    fn strip_of_four_is_two_triangles() {
        let triangles = QUAD_DRAW.vertices.len() - 2;
        assert_eq!(triangles, 2);
    }

    #[test]
    fn texture_is_bound_to_unit_zero() {
        assert_eq!(QUAD_DRAW.texture_unit, 0);
    }
}

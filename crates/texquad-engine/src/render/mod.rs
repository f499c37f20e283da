//! GPU rendering of the textured quad.
//!
//! [`RenderState`] owns every GPU resource (program, vertex buffers, texture)
//! and is created once per surface. [`draw_frame`] records one frame from a
//! borrowed state.
//!
//! Convention:
//! - positions are NDC, covering the whole target
//! - texture coordinates have v = 0 at the first (top) image row

mod ctx;
mod frame;
mod quad;
mod shader;
mod state;
mod texture;

pub use ctx::{RenderCtx, RenderTarget};
pub use frame::{draw_frame, submit_frame, DrawCall, QUAD_DRAW};
pub use quad::{quad_vertices, QuadBuffers, QUAD_POSITIONS, QUAD_TEX_COORDS, QUAD_VERTEX_COUNT};
pub use shader::{shade_texel, CompiledShader, ShaderProgram, BLACK_TINT, QUAD_SHADER_SOURCE};
pub use state::RenderState;
pub use texture::{QuadTexture, TEXTURE_FORMAT};

//! Fixed quad geometry.
//!
//! Two separate, tightly packed vertex streams:
//!
//!  slot 0  position   [f32; 2]   loc 0   NDC corners
//!  slot 1  tex_coord  [f32; 2]   loc 1   texture space
//!
//! Vertex order is triangle-strip order: bottom-left, bottom-right, top-left,
//! top-right. Texture coordinates are flipped vertically against positions so
//! the first image row lands at the top of the target.

use wgpu::util::DeviceExt;

use crate::error::RenderError;
use crate::render::RenderCtx;

/// Vertices in the quad strip (two triangles).
pub const QUAD_VERTEX_COUNT: u32 = 4;

pub const QUAD_POSITIONS: [[f32; 2]; QUAD_VERTEX_COUNT as usize] = [
    [-1.0, -1.0],
    [1.0, -1.0],
    [-1.0, 1.0],
    [1.0, 1.0],
];

pub const QUAD_TEX_COORDS: [[f32; 2]; QUAD_VERTEX_COUNT as usize] = [
    [0.0, 1.0],
    [1.0, 1.0],
    [0.0, 0.0],
    [1.0, 0.0],
];

/// Bytes between consecutive vertices in either stream.
const STRIDE: u64 = std::mem::size_of::<[f32; 2]>() as u64;

const POSITION_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];
const TEX_COORD_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x2];

/// Pairs each position with its texture coordinate, in strip order.
pub fn quad_vertices() -> [([f32; 2], [f32; 2]); QUAD_VERTEX_COUNT as usize] {
    std::array::from_fn(|i| (QUAD_POSITIONS[i], QUAD_TEX_COORDS[i]))
}

/// Vertex buffer layouts in slot order.
pub(crate) fn vertex_layouts() -> [wgpu::VertexBufferLayout<'static>; 2] {
    [
        wgpu::VertexBufferLayout {
            array_stride: STRIDE,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &POSITION_ATTRS,
        },
        wgpu::VertexBufferLayout {
            array_stride: STRIDE,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &TEX_COORD_ATTRS,
        },
    ]
}

/// GPU copies of the two vertex streams. Filled once, never rewritten.
pub struct QuadBuffers {
    positions: wgpu::Buffer,
    tex_coords: wgpu::Buffer,
}

impl QuadBuffers {
    pub fn new(ctx: &RenderCtx<'_>) -> Result<Self, RenderError> {
        let positions = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("texquad positions vbo"),
            contents: bytemuck::cast_slice(&QUAD_POSITIONS),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let tex_coords = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("texquad tex coords vbo"),
            contents: bytemuck::cast_slice(&QUAD_TEX_COORDS),
            usage: wgpu::BufferUsages::VERTEX,
        });
        ctx.errors.check("create vertex buffers")?;

        Ok(Self { positions, tex_coords })
    }

    pub fn positions(&self) -> &wgpu::Buffer {
        &self.positions
    }

    pub fn tex_coords(&self) -> &wgpu::Buffer {
        &self.tex_coords
    }

    /// Vertices held by each stream.
    pub fn vertex_count(&self) -> u32 {
        (self.positions.size() / STRIDE) as u32
    }
}

use crate::error::RenderError;
use crate::image::Image;
use crate::render::{RenderCtx, ShaderProgram};

/// Texel format of the quad texture. Linear, so bytes reach the shader as-is.
pub const TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// The single texture sampled by the quad, with its sampler and bind group.
///
/// The sampler (linear filtering, clamp-to-edge) lives as long as the
/// `QuadTexture`; texture storage is reallocated only when a replacement image
/// has different dimensions.
pub struct QuadTexture {
    texture: wgpu::Texture,
    sampler: wgpu::Sampler,
    bind_group: wgpu::BindGroup,
    size: (u32, u32),
    generation: u64,
}

impl QuadTexture {
    /// Allocates the texture and uploads `image` as mip level 0.
    pub fn new(ctx: &RenderCtx<'_>, program: &ShaderProgram, image: &Image) -> Result<Self, RenderError> {
        let sampler = ctx.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("texquad sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        let texture = create_texture(ctx, image.dimensions());
        upload(ctx, &texture, image);
        let bind_group = create_bind_group(ctx, program, &texture, &sampler);
        ctx.errors.check("upload texture")?;

        Ok(Self {
            texture,
            sampler,
            bind_group,
            size: image.dimensions(),
            generation: 0,
        })
    }

    /// Replaces the level-0 image.
    ///
    /// Same dimensions: the existing storage is overwritten in place.
    /// Different dimensions: new storage and a new bind group are created;
    /// the sampler and everything outside this texture stay untouched. On
    /// error the previous texture and bind group remain bound.
    pub fn replace(
        &mut self,
        ctx: &RenderCtx<'_>,
        program: &ShaderProgram,
        image: &Image,
    ) -> Result<(), RenderError> {
        if image.dimensions() == self.size {
            upload(ctx, &self.texture, image);
            ctx.errors.check("replace texture")?;
        } else {
            // Nothing is swapped in until the device accepted all three.
            let texture = create_texture(ctx, image.dimensions());
            upload(ctx, &texture, image);
            let bind_group = create_bind_group(ctx, program, &texture, &self.sampler);
            ctx.errors.check("replace texture")?;

            self.texture = texture;
            self.bind_group = bind_group;
            self.size = image.dimensions();
        }

        self.generation += 1;
        Ok(())
    }

    /// Current dimensions of mip level 0.
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Number of successful replacements since creation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    /// Bind group 0: texture at binding 0, sampler at binding 1.
    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

fn create_texture(ctx: &RenderCtx<'_>, (width, height): (u32, u32)) -> wgpu::Texture {
    ctx.device.create_texture(&wgpu::TextureDescriptor {
        label: Some("texquad image"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: TEXTURE_FORMAT,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    })
}

fn upload(ctx: &RenderCtx<'_>, texture: &wgpu::Texture, image: &Image) {
    ctx.queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        image.pixels(),
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(image.bytes_per_row()),
            rows_per_image: Some(image.height()),
        },
        wgpu::Extent3d {
            width: image.width(),
            height: image.height(),
            depth_or_array_layers: 1,
        },
    );
}

fn create_bind_group(
    ctx: &RenderCtx<'_>,
    program: &ShaderProgram,
    texture: &wgpu::Texture,
    sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("texquad texture bind group"),
        layout: program.bind_group_layout(),
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}

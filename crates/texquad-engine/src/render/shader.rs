use crate::error::RenderError;
use crate::render::quad;
use crate::render::RenderCtx;

/// WGSL for the quad program (both stages).
pub const QUAD_SHADER_SOURCE: &str = include_str!("shaders/quad.wgsl");

/// Color substituted for pure black texels.
pub const BLACK_TINT: [f32; 4] = [1.0, 0.5, 0.5, 1.0];

const VS_ENTRY: &str = "vs_main";
const FS_ENTRY: &str = "fs_main";

/// Bind group 0 slots the pipeline layout provides.
const TEXTURE_BINDING: u32 = 0;
const SAMPLER_BINDING: u32 = 1;

/// CPU mirror of the fragment stage's color rule.
///
/// A sample whose rgb channels are all exactly zero is replaced by
/// [`BLACK_TINT`]; anything else passes through. Alpha is not consulted.
pub fn shade_texel(color: [f32; 4]) -> [f32; 4] {
    if color[0] == 0.0 && color[1] == 0.0 && color[2] == 0.0 {
        BLACK_TINT
    } else {
        color
    }
}

/// WGSL source that parsed and validated.
///
/// Compilation runs on the CPU through naga so failures come back as
/// [`RenderError::ShaderCompile`] values with the annotated source excerpt,
/// rather than through the device's error hook.
pub struct CompiledShader {
    label: &'static str,
    module: naga::Module,
}

impl CompiledShader {
    pub fn compile(label: &'static str, source: &str) -> Result<Self, RenderError> {
        let module = naga::front::wgsl::parse_str(source).map_err(|e| RenderError::ShaderCompile {
            label,
            message: e.emit_to_string(source),
        })?;

        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::empty(),
        )
        .validate(&module)
        .map_err(|e| RenderError::ShaderCompile {
            label,
            message: e.emit_to_string(source),
        })?;

        Ok(Self { label, module })
    }

    /// Checks the module against the quad pipeline's interface: both entry
    /// points, the two vertex attribute locations, one color output, and the
    /// texture/sampler slots of bind group 0.
    pub fn link(&self) -> Result<(), RenderError> {
        let vs = self.entry_point(VS_ENTRY, naga::ShaderStage::Vertex)?;
        let fs = self.entry_point(FS_ENTRY, naga::ShaderStage::Fragment)?;

        let inputs = self.vertex_input_locations(vs);
        for layout in quad::vertex_layouts() {
            for attr in layout.attributes {
                if !inputs.contains(&attr.shader_location) {
                    return Err(self.link_error(format!(
                        "`{VS_ENTRY}` has no input at @location({})",
                        attr.shader_location
                    )));
                }
            }
        }

        let writes_color = fs
            .function
            .result
            .as_ref()
            .and_then(|r| r.binding.as_ref())
            .is_some_and(|b| matches!(b, naga::Binding::Location { location: 0, .. }));
        if !writes_color {
            return Err(self.link_error(format!("`{FS_ENTRY}` does not write @location(0)")));
        }

        for binding in [TEXTURE_BINDING, SAMPLER_BINDING] {
            let bound = self.module.global_variables.iter().any(|(_, var)| {
                var.binding
                    .as_ref()
                    .is_some_and(|rb| rb.group == 0 && rb.binding == binding)
            });
            if !bound {
                return Err(self.link_error(format!(
                    "no resource declared at @group(0) @binding({binding})"
                )));
            }
        }

        Ok(())
    }

    fn entry_point(
        &self,
        name: &str,
        stage: naga::ShaderStage,
    ) -> Result<&naga::EntryPoint, RenderError> {
        self.module
            .entry_points
            .iter()
            .find(|ep| ep.name == name && ep.stage == stage)
            .ok_or_else(|| self.link_error(format!("missing {stage:?} entry point `{name}`")))
    }

    /// Locations of every vertex input, including those nested in structs.
    fn vertex_input_locations(&self, ep: &naga::EntryPoint) -> Vec<u32> {
        let mut out = Vec::new();
        for arg in &ep.function.arguments {
            match &arg.binding {
                Some(naga::Binding::Location { location, .. }) => out.push(*location),
                Some(_) => {}
                None => {
                    if let naga::TypeInner::Struct { members, .. } = &self.module.types[arg.ty].inner {
                        out.extend(members.iter().filter_map(|m| match m.binding {
                            Some(naga::Binding::Location { location, .. }) => Some(location),
                            _ => None,
                        }));
                    }
                }
            }
        }
        out
    }

    fn link_error(&self, message: String) -> RenderError {
        RenderError::ShaderLink { label: self.label, message }
    }
}

/// Linked quad program: render pipeline plus the layout of its texture bind group.
pub struct ShaderProgram {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    target_format: wgpu::TextureFormat,
}

impl ShaderProgram {
    /// Compiles and links the built-in quad shader.
    pub fn new(ctx: &RenderCtx<'_>) -> Result<Self, RenderError> {
        Self::from_source(ctx, "texquad quad shader", QUAD_SHADER_SOURCE)
    }

    pub fn from_source(
        ctx: &RenderCtx<'_>,
        label: &'static str,
        source: &str,
    ) -> Result<Self, RenderError> {
        let compiled = CompiledShader::compile(label, source)?;
        compiled.link()?;

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });
        ctx.errors.check("create shader module")?;

        let bind_group_layout = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("texquad texture bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: TEXTURE_BINDING,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: SAMPLER_BINDING,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("texquad pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("texquad pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some(VS_ENTRY),
                compilation_options: Default::default(),
                buffers: &quad::vertex_layouts(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some(FS_ENTRY),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.surface_format,
                    blend: Some(additive_blend()),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });
        ctx.errors.check("create render pipeline")?;

        log::debug!("linked `{label}` for {:?}", ctx.surface_format);

        Ok(Self {
            pipeline,
            bind_group_layout,
            target_format: ctx.surface_format,
        })
    }

    pub fn pipeline(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    /// Color format the pipeline was linked against.
    pub fn target_format(&self) -> wgpu::TextureFormat {
        self.target_format
    }
}

/// `ONE, ONE` on both color and alpha.
fn additive_blend() -> wgpu::BlendState {
    let add_one_one = wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    };
    wgpu::BlendState {
        color: add_one_one,
        alpha: add_one_one,
    }
}

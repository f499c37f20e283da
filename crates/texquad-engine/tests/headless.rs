//! GPU-backed checks against an offscreen target.
//!
//! Each test returns early when the machine has no usable adapter.

use texquad_engine::device::GpuErrorSink;
use texquad_engine::image::Image;
use texquad_engine::render::{
    draw_frame, shade_texel, submit_frame, RenderCtx, RenderState, RenderTarget, ShaderProgram,
    QUAD_DRAW, QUAD_VERTEX_COUNT,
};
use texquad_engine::renderer::{Phase, QuadRenderer, PLACEHOLDER_SIZE};
use texquad_engine::surface::SurfaceRenderer;
use texquad_engine::RenderError;

const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
const TARGET_SIZE: u32 = 16;

struct Headless {
    device: wgpu::Device,
    queue: wgpu::Queue,
    errors: GpuErrorSink,
    target_texture: wgpu::Texture,
    target: wgpu::TextureView,
}

impl Headless {
    fn new() -> Option<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .ok()?;

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("texquad test device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                .using_resolution(adapter.limits()),
            experimental_features: wgpu::ExperimentalFeatures::disabled(),
            memory_hints: wgpu::MemoryHints::MemoryUsage,
            trace: wgpu::Trace::Off,
        }))
        .ok()?;

        let errors = GpuErrorSink::install(&device);

        let target_texture = create_target(&device, TARGET_FORMAT);
        let target = target_texture.create_view(&wgpu::TextureViewDescriptor::default());

        Some(Self { device, queue, errors, target_texture, target })
    }

    fn ctx(&self) -> RenderCtx<'_> {
        RenderCtx::new(&self.device, &self.queue, TARGET_FORMAT, &self.errors)
    }

    fn encoder(&self) -> wgpu::CommandEncoder {
        self.device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("texquad test") })
    }

    /// Records one frame through `renderer` and submits it.
    fn frame(&self, renderer: &mut QuadRenderer) -> Result<(), RenderError> {
        let mut encoder = self.encoder();
        {
            let mut target = RenderTarget::new(&mut encoder, &self.target);
            renderer.on_draw_frame(&self.ctx(), &mut target)?;
        }
        submit_frame(&self.ctx(), encoder)
    }

    /// Sets up `image`, draws it once and returns the target pixels.
    fn render(&self, image: Image) -> Pixels {
        let ctx = self.ctx();
        let state = RenderState::setup(&ctx, image).unwrap();

        let mut encoder = self.encoder();
        {
            let mut target = RenderTarget::new(&mut encoder, &self.target);
            draw_frame(&ctx, &state, &mut target, wgpu::Color::BLACK).unwrap();
        }
        submit_frame(&ctx, encoder).unwrap();

        self.read_target()
    }

    /// Copies the target back to the CPU, rows top to bottom.
    fn read_target(&self) -> Pixels {
        let row_bytes = TARGET_SIZE * 4;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let stride = row_bytes.div_ceil(align) * align;

        let readback = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("texquad test readback"),
            size: (stride * TARGET_SIZE) as u64,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = self.encoder();
        encoder.copy_texture_to_buffer(
            self.target_texture.as_image_copy(),
            wgpu::TexelCopyBufferInfo {
                buffer: &readback,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(stride),
                    rows_per_image: None,
                },
            },
            target_extent(),
        );
        self.queue.submit(std::iter::once(encoder.finish()));

        let slice = readback.slice(..);
        slice.map_async(wgpu::MapMode::Read, |_| {});
        self.device.poll(wgpu::PollType::wait_indefinitely()).unwrap();

        let mapped = slice.get_mapped_range();
        let mut rows = Vec::with_capacity(TARGET_SIZE as usize);
        for y in 0..TARGET_SIZE as usize {
            let start = y * stride as usize;
            let row: Vec<[u8; 4]> = mapped[start..start + row_bytes as usize]
                .chunks_exact(4)
                .map(|px| [px[0], px[1], px[2], px[3]])
                .collect();
            rows.push(row);
        }
        Pixels { rows }
    }
}

struct Pixels {
    rows: Vec<Vec<[u8; 4]>>,
}

impl Pixels {
    fn at(&self, x: u32, y: u32) -> [u8; 4] {
        self.rows[y as usize][x as usize]
    }
}

fn target_extent() -> wgpu::Extent3d {
    wgpu::Extent3d {
        width: TARGET_SIZE,
        height: TARGET_SIZE,
        depth_or_array_layers: 1,
    }
}

fn create_target(device: &wgpu::Device, format: wgpu::TextureFormat) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some("texquad test target"),
        size: target_extent(),
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    })
}

/// Expected framebuffer bytes for a sampled texel, via the fragment rule.
///
/// The pass clears to opaque black and blends `ONE, ONE`, so rgb is the shaded
/// texel and alpha saturates.
fn expected(texel: [u8; 4]) -> [u8; 4] {
    let shaded = shade_texel(texel.map(|c| c as f32 / 255.0));
    let rgb = shaded.map(|c| (c * 255.0).round() as u8);
    [rgb[0], rgb[1], rgb[2], 255]
}

macro_rules! headless_or_skip {
    () => {
        match Headless::new() {
            Some(gpu) => gpu,
            None => {
                eprintln!("no GPU adapter available; skipping");
                return;
            }
        }
    };
}

fn red(w: u32, h: u32) -> Image {
    Image::solid(w, h, [255, 0, 0, 255]).unwrap()
}

// ── setup + draw ─────────────────────────────────────────────────────────

#[test]
fn red_image_is_drawn_from_texture_unit_zero() {
    let gpu = headless_or_skip!();
    let ctx = gpu.ctx();

    let state = RenderState::setup(&ctx, red(2, 2)).unwrap();

    let mut encoder = gpu.encoder();
    let call = {
        let mut target = RenderTarget::new(&mut encoder, &gpu.target);
        draw_frame(&ctx, &state, &mut target, wgpu::Color::BLACK).unwrap()
    };
    submit_frame(&ctx, encoder).unwrap();

    assert_eq!(call, QUAD_DRAW);
    assert_eq!(call.texture_unit, 0);
    assert_eq!(call.vertices, 0..4);
    assert_eq!(call.topology, wgpu::PrimitiveTopology::TriangleStrip);

    assert_eq!(state.texture().size(), (2, 2));
    assert_eq!(state.image(), &red(2, 2));
    assert!(gpu.errors.check("test").is_ok());
}

// ── output ───────────────────────────────────────────────────────────────

#[test]
fn red_image_covers_the_target() {
    let gpu = headless_or_skip!();
    let px = gpu.render(red(2, 2));

    assert_eq!(expected([255, 0, 0, 255]), [255, 0, 0, 255]);
    for (x, y) in [(0, 0), (15, 0), (0, 15), (15, 15), (8, 8)] {
        assert_eq!(px.at(x, y), [255, 0, 0, 255], "pixel ({x}, {y})");
    }
}

#[test]
fn black_texels_are_drawn_as_tint() {
    let gpu = headless_or_skip!();
    let px = gpu.render(Image::solid(2, 2, [0, 0, 0, 255]).unwrap());

    let tint = expected([0, 0, 0, 255]);
    assert_eq!(tint, [255, 128, 128, 255]);
    assert_eq!(px.at(0, 0), tint);
    assert_eq!(px.at(15, 15), tint);
}

#[test]
fn first_image_row_is_drawn_at_the_top() {
    let gpu = headless_or_skip!();

    // 1x2: red on top, blue below.
    let pixels = [[255, 0, 0, 255], [0, 0, 255, 255]].concat();
    let px = gpu.render(Image::from_rgba8(1, 2, pixels).unwrap());

    assert_eq!(px.at(8, 0), expected([255, 0, 0, 255]));
    assert_eq!(px.at(8, 15), expected([0, 0, 255, 255]));
}

// ── renderer lifecycle ───────────────────────────────────────────────────

#[test]
fn renderer_runs_full_surface_lifecycle() {
    let gpu = headless_or_skip!();
    let mut renderer = QuadRenderer::default();

    renderer.on_image(red(2, 2));
    renderer.on_surface_created(&gpu.ctx()).unwrap();
    renderer.on_surface_changed(16, 16);
    assert_eq!(renderer.phase(), Phase::Ready);
    assert!(!renderer.has_pending_image());

    gpu.frame(&mut renderer).unwrap();
    gpu.frame(&mut renderer).unwrap();
    assert_eq!(renderer.frames_drawn(), 2);

    renderer.on_surface_destroyed();
    assert_eq!(renderer.phase(), Phase::Destroyed);
    assert!(matches!(gpu.frame(&mut renderer), Err(RenderError::NotReady)));

    // The shown image survives for the next surface.
    assert!(renderer.has_pending_image());
    renderer.on_surface_created(&gpu.ctx()).unwrap();
    assert_eq!(renderer.state().unwrap().image(), &red(2, 2));
}

#[test]
fn setup_without_image_uses_placeholder() {
    let gpu = headless_or_skip!();
    let mut renderer = QuadRenderer::default();

    renderer.on_surface_created(&gpu.ctx()).unwrap();
    assert_eq!(renderer.state().unwrap().texture().size(), PLACEHOLDER_SIZE);
}

// ── preconditions ────────────────────────────────────────────────────────

#[test]
fn draw_before_setup_is_rejected() {
    let gpu = headless_or_skip!();
    let mut renderer = QuadRenderer::default();

    assert!(matches!(gpu.frame(&mut renderer), Err(RenderError::NotReady)));
    assert_eq!(renderer.frames_drawn(), 0);
}

#[test]
fn second_setup_on_same_surface_is_rejected() {
    let gpu = headless_or_skip!();
    let mut renderer = QuadRenderer::default();

    renderer.on_surface_created(&gpu.ctx()).unwrap();
    let err = renderer.on_surface_created(&gpu.ctx()).unwrap_err();
    assert!(matches!(err, RenderError::AlreadyInitialized));
    assert_eq!(renderer.phase(), Phase::Ready);
}

// ── texture replace ──────────────────────────────────────────────────────

#[test]
fn replacing_with_other_dimensions_only_touches_the_texture() {
    let gpu = headless_or_skip!();
    let ctx = gpu.ctx();

    let mut state = RenderState::setup(&ctx, red(2, 2)).unwrap();
    let format = state.program().target_format();
    let position_bytes = state.quad().positions().size();
    let tex_coord_bytes = state.quad().tex_coords().size();

    let blue = Image::solid(5, 3, [0, 0, 255, 255]).unwrap();
    state.replace_image(&ctx, blue.clone()).unwrap();

    assert_eq!(state.texture().size(), (5, 3));
    assert_eq!(state.texture().generation(), 1);
    assert_eq!(state.image(), &blue);

    assert_eq!(state.program().target_format(), format);
    assert_eq!(state.quad().positions().size(), position_bytes);
    assert_eq!(state.quad().tex_coords().size(), tex_coord_bytes);
    assert_eq!(state.quad().vertex_count(), QUAD_VERTEX_COUNT);
}

#[test]
fn same_size_replace_reuses_storage() {
    let gpu = headless_or_skip!();
    let ctx = gpu.ctx();

    let mut state = RenderState::setup(&ctx, red(4, 4)).unwrap();
    let green = Image::solid(4, 4, [0, 255, 0, 255]).unwrap();
    state.replace_image(&ctx, green).unwrap();

    assert_eq!(state.texture().size(), (4, 4));
    assert_eq!(state.texture().texture().size().width, 4);
    assert_eq!(state.texture().generation(), 1);
}

#[test]
fn image_sent_between_frames_is_uploaded_before_next_draw() {
    let gpu = headless_or_skip!();
    let mut renderer = QuadRenderer::default();

    renderer.on_image(red(2, 2));
    renderer.on_surface_created(&gpu.ctx()).unwrap();
    gpu.frame(&mut renderer).unwrap();

    renderer.on_image(red(7, 1));
    assert!(renderer.has_pending_image());
    gpu.frame(&mut renderer).unwrap();

    assert!(!renderer.has_pending_image());
    assert_eq!(renderer.state().unwrap().texture().size(), (7, 1));
}

// ── failure paths ────────────────────────────────────────────────────────

fn oversized(gpu: &Headless) -> Image {
    let width = gpu.device.limits().max_texture_dimension_2d + 1;
    Image::solid(width, 1, [0, 255, 0, 255]).unwrap()
}

#[test]
fn rejected_replace_keeps_previous_texture_bound() {
    let gpu = headless_or_skip!();
    let ctx = gpu.ctx();

    let mut state = RenderState::setup(&ctx, red(2, 2)).unwrap();
    let err = state.replace_image(&ctx, oversized(&gpu)).unwrap_err();
    assert!(matches!(err, RenderError::GpuOperation { op: "replace texture", .. }));

    assert_eq!(state.texture().size(), (2, 2));
    assert_eq!(state.texture().generation(), 0);
    assert_eq!(state.image(), &red(2, 2));

    let mut encoder = gpu.encoder();
    {
        let mut target = RenderTarget::new(&mut encoder, &gpu.target);
        draw_frame(&ctx, &state, &mut target, wgpu::Color::BLACK).unwrap();
    }
    submit_frame(&ctx, encoder).unwrap();
    assert_eq!(gpu.read_target().at(8, 8), [255, 0, 0, 255]);
}

#[test]
fn pending_image_survives_a_failed_upload() {
    let gpu = headless_or_skip!();
    let mut renderer = QuadRenderer::default();

    renderer.on_image(red(2, 2));
    renderer.on_surface_created(&gpu.ctx()).unwrap();

    renderer.on_image(oversized(&gpu));
    assert!(matches!(gpu.frame(&mut renderer), Err(RenderError::GpuOperation { .. })));
    assert!(renderer.has_pending_image());
    assert_eq!(renderer.frames_drawn(), 0);
    assert_eq!(renderer.state().unwrap().texture().size(), (2, 2));

    renderer.on_image(red(3, 3));
    gpu.frame(&mut renderer).unwrap();
    assert!(!renderer.has_pending_image());
    assert_eq!(renderer.state().unwrap().texture().size(), (3, 3));
}

#[test]
fn invalid_pass_is_caught_before_the_frame_is_used() {
    let gpu = headless_or_skip!();
    let ctx = gpu.ctx();
    let state = RenderState::setup(&ctx, red(2, 2)).unwrap();

    // Pipeline targets Rgba8Unorm; this pass does not.
    let bgra = create_target(&gpu.device, wgpu::TextureFormat::Bgra8Unorm);
    let view = bgra.create_view(&wgpu::TextureViewDescriptor::default());

    let mut encoder = gpu.encoder();
    {
        let mut target = RenderTarget::new(&mut encoder, &view);
        draw_frame(&ctx, &state, &mut target, wgpu::Color::BLACK).unwrap();
    }

    let err = submit_frame(&ctx, encoder).unwrap_err();
    assert!(matches!(err, RenderError::GpuOperation { .. }), "{err:?}");
    assert!(!gpu.errors.has_pending());
}

// ── shader failures ──────────────────────────────────────────────────────

#[test]
fn broken_shader_fails_setup_with_compile_error() {
    let gpu = headless_or_skip!();

    let err = ShaderProgram::from_source(&gpu.ctx(), "broken", "@vertex fn vs_main(")
        .err()
        .unwrap();
    assert!(matches!(err, RenderError::ShaderCompile { label: "broken", .. }));
    assert!(!gpu.errors.has_pending());
}

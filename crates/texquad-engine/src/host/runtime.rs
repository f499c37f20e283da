use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::device::{Gpu, GpuInit, SurfaceErrorAction};
use crate::error::RenderError;
use crate::surface::SurfaceRenderer;

use super::{HostConfig, HostEvent, ImageSender};

/// Entry point for the host loop.
///
/// Created first so that [`ImageSender`]s can be handed out (and images
/// queued) before the loop and its surface exist.
pub struct Host {
    event_loop: EventLoop<HostEvent>,
}

impl Host {
    pub fn new() -> Result<Self> {
        let event_loop = EventLoop::<HostEvent>::with_user_event()
            .build()
            .context("failed to create winit EventLoop")?;
        Ok(Self { event_loop })
    }

    pub fn image_sender(&self) -> ImageSender {
        ImageSender::new(self.event_loop.create_proxy())
    }

    /// Runs the loop on the calling thread until the window closes, an exit
    /// is requested, or rendering fails. The first fatal error is returned.
    pub fn run<R>(self, config: HostConfig, gpu_init: GpuInit, renderer: R) -> Result<()>
    where
        R: SurfaceRenderer + 'static,
    {
        let mut state = HostState::new(config, gpu_init, renderer);

        self.event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct SurfaceEntry {
    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

struct HostState<R> {
    config: HostConfig,
    gpu_init: GpuInit,
    renderer: R,

    surface: Option<SurfaceEntry>,
    failure: Option<anyhow::Error>,
}

impl<R> HostState<R>
where
    R: SurfaceRenderer,
{
    fn new(config: HostConfig, gpu_init: GpuInit, renderer: R) -> Self {
        Self {
            config,
            gpu_init,
            renderer,
            surface: None,
            failure: None,
        }
    }

    /// Window + GPU context, then the renderer's setup and first size.
    fn create_surface(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.gpu_init.clone();
        let entry = SurfaceEntryTryBuilder {
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()
        .context("GPU initialization failed")?;

        let renderer = &mut self.renderer;
        let size = entry.with_gpu(|gpu| {
            renderer.on_surface_created(&gpu.render_ctx())?;
            Ok::<_, RenderError>(gpu.size())
        })?;
        log::info!("surface created ({}x{})", size.width, size.height);

        self.renderer.on_surface_changed(size.width, size.height);
        entry.with_window(|w| w.request_redraw());
        self.surface = Some(entry);
        Ok(())
    }

    fn destroy_surface(&mut self) {
        if self.surface.take().is_some() {
            self.renderer.on_surface_destroyed();
        }
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        let Some(entry) = self.surface.as_mut() else {
            return;
        };
        entry.with_gpu_mut(|gpu| gpu.resize(new_size));
        entry.with_window(|w| w.request_redraw());
        self.renderer.on_surface_changed(new_size.width, new_size.height);
    }

    fn redraw(&mut self) -> Result<(), RenderError> {
        let Some(entry) = self.surface.as_mut() else {
            return Ok(());
        };
        let renderer = &mut self.renderer;

        entry.with_mut(|fields| {
            let gpu = fields.gpu;
            let window = fields.window;

            if !gpu.is_drawable() {
                return Ok(());
            }

            let frame = match gpu.begin_frame() {
                Ok(frame) => frame,
                Err(err) => {
                    let message = err.to_string();
                    return match gpu.handle_surface_error(err) {
                        SurfaceErrorAction::Fatal => Err(RenderError::GpuOperation {
                            op: "acquire surface texture",
                            message,
                        }),
                        action => {
                            log::debug!("surface error ({message}): {action:?}");
                            Ok(())
                        }
                    };
                }
            };

            gpu.render_frame(frame, |ctx, target| {
                renderer.on_draw_frame(ctx, target)?;
                window.pre_present_notify();
                Ok(())
            })
        })
    }

    /// Records the first fatal error and stops the loop. No further frames.
    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        if self.failure.is_none() {
            self.failure = Some(err);
        }
        self.destroy_surface();
        event_loop.exit();
    }
}

impl<R> ApplicationHandler<HostEvent> for HostState<R>
where
    R: SurfaceRenderer,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.surface.is_some() || self.failure.is_some() {
            return;
        }

        if let Err(err) = self.create_surface(event_loop) {
            self.fail(event_loop, err.context("surface setup failed"));
        }
    }

    fn suspended(&mut self, _event_loop: &ActiveEventLoop) {
        self.destroy_surface();
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: HostEvent) {
        match event {
            HostEvent::SetImage(image) => {
                self.renderer.on_image(image);
                if let Some(entry) = self.surface.as_ref() {
                    entry.with_window(|w| w.request_redraw());
                }
            }
            HostEvent::Exit => {
                self.destroy_surface();
                event_loop.exit();
            }
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Wait);

        if self.config.continuous_redraw {
            if let Some(entry) = self.surface.as_ref() {
                entry.with_window(|w| w.request_redraw());
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                self.destroy_surface();
                event_loop.exit();
            }

            WindowEvent::Resized(new_size) => self.resize(new_size),

            WindowEvent::ScaleFactorChanged { .. } => {
                let new_size = self
                    .surface
                    .as_ref()
                    .map(|entry| entry.with_window(|w| w.inner_size()));
                if let Some(new_size) = new_size {
                    self.resize(new_size);
                }
            }

            WindowEvent::RedrawRequested => {
                if let Err(err) = self.redraw() {
                    self.fail(event_loop, anyhow::Error::new(err).context("frame failed"));
                }
            }

            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.destroy_surface();
    }
}

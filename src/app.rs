use std::sync::Arc;

use log::{debug, error, info};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes, WindowId},
};

use crate::config::SimulationConfig;
use crate::error::{Result, SaverError};
use crate::gfx::{ParticleRenderer, RenderEngine};
use crate::performance::{hud_title, FpsCounter};
use crate::simulation::clock::{live_frame, FrameClock};
use crate::simulation::{ParticleSystem, Viewport};

/// Live screensaver window
///
/// Owns the particle system for as long as the window is open. Each redraw
/// runs exactly one simulation step followed by one render.
pub struct ScreensaverApp {
    app_state: AppState,
}

struct AppState {
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    system: ParticleSystem,
    clock: FrameClock,
    fps: FpsCounter,
    initial_size: PhysicalSize<u32>,
    error: Option<SaverError>,
}

impl ScreensaverApp {
    pub fn new(config: &SimulationConfig, system: ParticleSystem) -> Self {
        Self {
            app_state: AppState {
                window: None,
                render_engine: None,
                system,
                clock: FrameClock::new(),
                fps: FpsCounter::new(),
                initial_size: PhysicalSize::new(config.width, config.height),
                error: None,
            },
        }
    }

    /// Run the event loop until the window closes
    ///
    /// Fails if the window or GPU could not be set up.
    pub fn run(mut self) -> Result<()> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop.run_app(&mut self.app_state)?;

        match self.app_state.error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl AppState {
    fn init_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let scheduler = self.system.scheduler();
        let attributes = WindowAttributes::default()
            .with_title(hud_title(
                scheduler.mode(),
                self.system.len(),
                scheduler.threads(),
                0.0,
            ))
            .with_inner_size(self.initial_size)
            .with_resizable(true);

        let window = Arc::new(event_loop.create_window(attributes)?);
        let PhysicalSize { width, height } = window.inner_size();
        info!("Window created: {}x{}", width, height);

        let capacity = self.system.len();
        let target = window.clone();
        let render_engine =
            pollster::block_on(async move { RenderEngine::new(target, width, height, capacity).await })?;
        info!("Renderer ready");

        self.window = Some(window);
        self.render_engine = Some(render_engine);
        self.clock.reset();
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: SaverError) {
        error!("{err}");
        self.error = Some(err);
        event_loop.exit();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(window), Some(render_engine)) = (self.window.as_ref(), self.render_engine.as_mut())
        else {
            return;
        };

        let PhysicalSize { width, height } = window.inner_size();
        if width == 0 || height == 0 {
            // Minimized: nothing to draw into, and the stall is clamped later
            return;
        }
        let viewport = Viewport::new(width, height);

        let dt = match live_frame(&mut self.clock, &mut self.system, viewport, render_engine) {
            Ok(dt) => dt,
            Err(err) => {
                error!("{err}");
                self.error = Some(err);
                event_loop.exit();
                return;
            }
        };

        if let Some(fps) = self.fps.record_frame(dt) {
            let scheduler = self.system.scheduler();
            let title = hud_title(scheduler.mode(), self.system.len(), scheduler.threads(), fps);
            window.set_title(&title);
            info!(
                "FPS={} (N={}, threads={}, mode={})",
                fps.round() as i64,
                self.system.len(),
                scheduler.threads(),
                scheduler.mode()
            );
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(err) = self.init_window(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                info!("Escape pressed, exiting");
                event_loop.exit();
            }
            WindowEvent::CloseRequested => {
                info!("Window closed, exiting");
                event_loop.exit();
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                debug!("Resized to {}x{}", width, height);
                if let Some(render_engine) = self.render_engine.as_mut() {
                    render_engine.resize(width, height);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => (),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }
}

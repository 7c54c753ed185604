//! Interactive window mode.
//!
//! One tick is run per redraw, then the field is presented and the next
//! redraw requested. Quit events only ever land between two redraws, so a
//! started tick always completes before the loop exits.

use std::sync::Arc;

use tracing::{debug, error, info, warn};
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::error::SimulationError;
use crate::gpu::FieldRenderer;
use crate::input::QuitSignal;
use crate::simulation::{CancelSignal, Simulation};
use crate::time::TickTimer;

const WINDOW_TITLE: &str = "Physarum";

struct App {
    sim: Simulation,
    quit: QuitSignal,
    window: Option<Arc<Window>>,
    renderer: Option<FieldRenderer>,
    timer: TickTimer,
    /// First fatal error; reported once the event loop returns.
    error: Option<SimulationError>,
}

impl App {
    fn new(sim: Simulation, quit: QuitSignal) -> Self {
        Self {
            sim,
            quit,
            window: None,
            renderer: None,
            timer: TickTimer::new(),
            error: None,
        }
    }

    fn init_window(&mut self, event_loop: &ActiveEventLoop) -> Result<(), SimulationError> {
        let config = self.sim.config();
        let window_attrs = Window::default_attributes()
            .with_title(WINDOW_TITLE)
            .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let renderer = pollster::block_on(FieldRenderer::new(
            window.clone(),
            config.width,
            config.height,
        ))?;

        self.window = Some(window);
        self.renderer = Some(renderer);
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: SimulationError) {
        error!("{}", err);
        if self.error.is_none() {
            self.error = Some(err);
        }
        event_loop.exit();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        if self.quit.cancel_requested() {
            event_loop.exit();
            return;
        }

        if self.sim.step_timed(&mut self.timer) {
            if let Some(window) = &self.window {
                window.set_title(&format!(
                    "{} - {:.1} ticks/s",
                    WINDOW_TITLE,
                    self.timer.ticks_per_second()
                ));
            }
        }

        let Some(renderer) = &mut self.renderer else {
            return;
        };
        renderer.upload(self.sim.field());
        match renderer.render() {
            Ok(_) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let size = winit::dpi::PhysicalSize {
                    width: renderer.config.width,
                    height: renderer.config.height,
                };
                renderer.resize(size);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                self.fail(event_loop, SimulationError::Present("GPU out of memory".into()));
                return;
            }
            Err(e) => warn!("Render error: {:?}", e),
        }

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(err) = self.init_window(event_loop) {
                self.fail(event_loop, err);
                return;
            }
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if self.quit.handle_event(&event) {
            debug!(tick = self.sim.tick(), "Quit requested");
            event_loop.exit();
            return;
        }

        match event {
            WindowEvent::Resized(physical_size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(physical_size);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }
}

/// Open a window sized to the field and run until the user quits.
///
/// Escape, Q or closing the window stop the loop. Returns the number of
/// ticks run.
///
/// ```no_run
/// use physarum::{run_windowed, SimConfig, Simulation};
///
/// let sim = Simulation::new(SimConfig::default()).unwrap();
/// let ticks = run_windowed(sim).unwrap();
/// println!("ran {} ticks", ticks);
/// ```
pub fn run_windowed(sim: Simulation) -> Result<u64, SimulationError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let start = sim.tick();
    let mut app = App::new(sim, QuitSignal::new());
    event_loop.run_app(&mut app)?;

    if let Some(err) = app.error.take() {
        return Err(err);
    }
    let ran = app.sim.tick() - start;
    info!(ticks = ran, tps = app.timer.ticks_per_second(), "Window closed");
    Ok(ran)
}

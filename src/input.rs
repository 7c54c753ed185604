//! Quit handling.
//!
//! The simulation only ever asks one question of its input: should the loop
//! stop? [`QuitSignal`] answers it. The window raises the signal on Escape,
//! Q or a close request; the loop polls it between ticks.
//!
//! ```
//! use physarum::input::QuitSignal;
//! use physarum::CancelSignal;
//!
//! let mut quit = QuitSignal::new();
//! let remote = quit.clone();
//! assert!(!quit.cancel_requested());
//! remote.request();
//! assert!(quit.cancel_requested());
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::simulation::CancelSignal;

/// Shared "cancel requested" flag.
///
/// Clones share the same flag, so one can live in the event handler and
/// another in the loop.
#[derive(Clone, Debug, Default)]
pub struct QuitSignal {
    flag: Arc<AtomicBool>,
}

impl QuitSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the loop to stop after the current tick.
    pub fn request(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Whether a stop has been requested.
    pub fn is_requested(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// Raise the signal if `event` is a quit request.
    ///
    /// Returns `true` if the event was one.
    pub fn handle_event(&self, event: &WindowEvent) -> bool {
        if is_quit_event(event) {
            self.request();
            true
        } else {
            false
        }
    }
}

impl CancelSignal for QuitSignal {
    fn cancel_requested(&mut self) -> bool {
        self.is_requested()
    }
}

/// Whether a window event asks the simulation to quit.
pub fn is_quit_event(event: &WindowEvent) -> bool {
    match event {
        WindowEvent::CloseRequested => true,
        WindowEvent::KeyboardInput { event, .. } => {
            event.state == ElementState::Pressed
                && matches!(
                    event.physical_key,
                    PhysicalKey::Code(KeyCode::Escape) | PhysicalKey::Code(KeyCode::KeyQ)
                )
        }
        _ => false,
    }
}

//=========================================================================
// Harness Platform
//=========================================================================
//
// A winit window standing in for the game's input layer.
//
// Architecture:
// ```text
//  Main Thread:                      Logic Thread:
//  ┌──────────────────────────┐     ┌──────────────────┐
//  │  Winit Event Loop        │     │  Harness::run    │
//  │   ↓                      │     │   ↓              │
//  │  KeyboardInput (pressed) │     │  EventCollector  │
//  │   ↓                      │     │   ↓              │
//  │  KeyBindings             │     │  invoke(name)    │
//  │   ↓                      │     │                  │
//  │  Sender<HostEvent> ──────┼────►│                  │
//  └──────────────────────────┘     └──────────────────┘
//
//  CloseRequested → HostEvent::Shutdown → exit
// ```
//
// Winit requires the main thread on macOS, so the harness logic runs
// on the spawned thread instead.
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::Sender;
use log::{debug, error, info, trace, warn};
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode as WinitKeyCode, PhysicalKey},
    window::{Window, WindowAttributes, WindowId},
};

//=== Internal Dependencies ===============================================

use super::{HostEvent, KeyBindings, KeyCode};

//=== PlatformError =======================================================

/// Event loop failures. Both are fatal for the window.
#[derive(Debug)]
pub enum PlatformError {
    EventLoopCreation(winit::error::EventLoopError),
    EventLoopExecution(winit::error::EventLoopError),
}

impl std::fmt::Display for PlatformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EventLoopCreation(e) => write!(f, "Event loop creation failed: {}", e),
            Self::EventLoopExecution(e) => write!(f, "Event loop error: {}", e),
        }
    }
}

impl std::error::Error for PlatformError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::EventLoopCreation(e) | Self::EventLoopExecution(e) => Some(e),
        }
    }
}

//=== Key Conversion ======================================================

impl From<WinitKeyCode> for KeyCode {
    fn from(code: WinitKeyCode) -> Self {
        use WinitKeyCode::*;
        match code {
            //--- Numeric keys ---------------------------------------------
            Digit0 => KeyCode::Digit0, Digit1 => KeyCode::Digit1,
            Digit2 => KeyCode::Digit2, Digit3 => KeyCode::Digit3,
            Digit4 => KeyCode::Digit4, Digit5 => KeyCode::Digit5,
            Digit6 => KeyCode::Digit6, Digit7 => KeyCode::Digit7,
            Digit8 => KeyCode::Digit8, Digit9 => KeyCode::Digit9,

            //--- Alphabetic keys ------------------------------------------
            KeyA => KeyCode::KeyA, KeyB => KeyCode::KeyB, KeyC => KeyCode::KeyC,
            KeyD => KeyCode::KeyD, KeyE => KeyCode::KeyE, KeyF => KeyCode::KeyF,
            KeyG => KeyCode::KeyG, KeyH => KeyCode::KeyH, KeyI => KeyCode::KeyI,
            KeyJ => KeyCode::KeyJ, KeyK => KeyCode::KeyK, KeyL => KeyCode::KeyL,
            KeyM => KeyCode::KeyM, KeyN => KeyCode::KeyN, KeyO => KeyCode::KeyO,
            KeyP => KeyCode::KeyP, KeyQ => KeyCode::KeyQ, KeyR => KeyCode::KeyR,
            KeyS => KeyCode::KeyS, KeyT => KeyCode::KeyT, KeyU => KeyCode::KeyU,
            KeyV => KeyCode::KeyV, KeyW => KeyCode::KeyW, KeyX => KeyCode::KeyX,
            KeyY => KeyCode::KeyY, KeyZ => KeyCode::KeyZ,

            //--- Navigation -----------------------------------------------
            ArrowDown => KeyCode::ArrowDown, ArrowLeft => KeyCode::ArrowLeft,
            ArrowRight => KeyCode::ArrowRight, ArrowUp => KeyCode::ArrowUp,
            Space => KeyCode::Space, Enter => KeyCode::Enter,
            Escape => KeyCode::Escape, Tab => KeyCode::Tab,

            _ => KeyCode::Unidentified,
        }
    }
}

//=== Platform ============================================================

/// Window that turns bound key presses into [`HostEvent::Action`]s.
///
/// Must stay on the main thread.
pub struct Platform {
    window: Option<Window>,
    events: Sender<HostEvent>,
    bindings: KeyBindings,
    title: String,
}

impl Platform {
    pub fn new(events: Sender<HostEvent>, bindings: KeyBindings) -> Self {
        info!(target: "harness::platform", "Platform initialized with {} bindings", bindings.len());
        Self {
            window: None,
            events,
            bindings,
            title: String::from("AimSplit Host"),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Runs the event loop until the window closes.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] if the event loop cannot be created or
    /// fails while running.
    pub fn run(mut self) -> Result<(), PlatformError> {
        debug!(target: "harness::platform", "Starting winit event loop");

        let event_loop = EventLoop::new().map_err(PlatformError::EventLoopCreation)?;
        event_loop.run_app(&mut self).map_err(PlatformError::EventLoopExecution)
    }

    //--- Internal Helpers -------------------------------------------------

    /// Sends the function bound to `key`, if any.
    fn handle_key(&self, key: KeyCode) {
        let Some(function) = self.bindings.resolve(key) else {
            trace!(target: "harness::platform", "Unbound key {:?}", key);
            return;
        };

        if self.events.send(HostEvent::Action(function.to_string())).is_err() {
            warn!(
                target: "harness::platform",
                "Logic thread gone, dropping action {}",
                function
            );
        }
    }

    fn shutdown(&self, event_loop: &ActiveEventLoop) {
        let _ = self.events.send(HostEvent::Shutdown);
        event_loop.exit();
    }

    #[cfg(test)]
    fn window(&self) -> Option<&Window> {
        self.window.as_ref()
    }
}

//=== Winit Integration ===================================================

impl ApplicationHandler for Platform {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = WindowAttributes::default()
            .with_title(self.title.clone())
            .with_inner_size(LogicalSize::new(640, 360));

        match event_loop.create_window(attrs) {
            Ok(window) => {
                info!(
                    target: "harness::platform",
                    "Window created: {}x{}",
                    window.inner_size().width,
                    window.inner_size().height
                );
                self.window = Some(window);
            }
            Err(e) => {
                error!(target: "harness::platform", "Window creation failed: {}", e);
                self.shutdown(event_loop);
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!(target: "harness::platform", "Window close requested");
                self.shutdown(event_loop);
            }

            WindowEvent::KeyboardInput {
                event: KeyEvent {
                    physical_key: PhysicalKey::Code(code),
                    state: ElementState::Pressed,
                    repeat: false,
                    ..
                },
                ..
            } => self.handle_key(KeyCode::from(code)),

            _ => {}
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

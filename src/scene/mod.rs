//! Scene management
//!
//! The [`Viewer`] owns the camera and the state controllers read on every
//! input event. Controllers see it through the [`ViewerScope`] trait so they
//! can be driven by any host that provides focus, constraints and an event
//! sink.

mod camera;
mod camera_controller;
mod events;
mod keyboard_controller;
mod release_timer;

pub use camera::*;
pub use camera_controller::*;
pub use events::*;
pub use keyboard_controller::*;
pub use release_timer::*;

use std::collections::HashMap;
use std::time::Duration;

/// Default grace window after a key release during which the viewer reports
/// recent keyboard interaction.
pub const DEFAULT_CONTROLLER_UPDATE_TIMEOUT: Duration = Duration::from_millis(300);

/// Focus and timing state read by controllers on every input event.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerState {
    /// Treat the viewer as focused regardless of `is_focused`.
    pub force_focus: bool,
    /// Whether the viewer surface currently has input focus.
    pub is_focused: bool,
    /// Grace window after a key release.
    pub controller_update_timeout: Duration,
}

impl Default for ViewerState {
    fn default() -> Self {
        Self {
            force_focus: false,
            is_focused: false,
            controller_update_timeout: DEFAULT_CONTROLLER_UPDATE_TIMEOUT,
        }
    }
}

impl ViewerState {
    /// Effective focus: either focused or forced.
    pub fn has_focus(&self) -> bool {
        self.force_focus || self.is_focused
    }
}

/// Per-key block flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Constraints {
    pub keys: HashMap<u32, bool>,
}

impl Constraints {
    pub fn block_key(&mut self, code: u32) {
        self.keys.insert(code, true);
    }

    pub fn unblock_key(&mut self, code: u32) {
        self.keys.insert(code, false);
    }

    /// A key is blocked only when present with a `true` flag.
    pub fn is_key_blocked(&self, code: u32) -> bool {
        self.keys.get(&code).copied().unwrap_or(false)
    }
}

/// Projection limits imposed on the viewer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Projections {
    pub constraints: Constraints,
}

/// What a controller may read from and send to its owning viewer.
pub trait ViewerScope {
    fn state(&self) -> &ViewerState;

    fn key_constraints(&self) -> &Constraints;

    /// Forward a notification to viewer listeners.
    fn emit(&mut self, event: ViewerEvent);
}

/// The viewer facade: camera, focus state, constraints and event queue.
pub struct Viewer {
    pub camera: Camera,
    pub state: ViewerState,
    pub projections: Projections,
    pub events: Events<ViewerEvent>,
}

impl Viewer {
    pub fn new() -> Self {
        Self {
            camera: Camera::default(),
            state: ViewerState::default(),
            projections: Projections::default(),
            events: Events::new(),
        }
    }

    pub fn with_camera(mut self, camera: Camera) -> Self {
        self.camera = camera;
        self
    }

    pub fn with_state(mut self, state: ViewerState) -> Self {
        self.state = state;
        self
    }

    pub fn set_focused(&mut self, focused: bool) {
        if self.state.is_focused != focused {
            log::debug!("Viewer focus: {focused}");
        }
        self.state.is_focused = focused;
    }
}

impl Default for Viewer {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewerScope for Viewer {
    fn state(&self) -> &ViewerState {
        &self.state
    }

    fn key_constraints(&self) -> &Constraints {
        &self.projections.constraints
    }

    fn emit(&mut self, event: ViewerEvent) {
        log::trace!("Viewer event: {} #{}", event.name(), event.keyboard_event().code);
        self.events.send(event);
    }
}

//! Panorama Viewer - keyboard-driven camera panning inside a panoramic scene
//!
//! The viewer places a camera at the centre of a panorama sphere and lets the
//! user look around with the arrow keys.
//!
//! # Features
//! - [`KeyboardController`](scene::KeyboardController): tracks held navigation
//!   keys, honours per-key constraints and runs bound handlers every frame
//! - [`PanController`](scene::PanController): shared base that applies pans to
//!   the camera
//! - Native host on top of winit, web host on top of the DOM

pub mod error;
pub mod input;
pub mod scene;

#[cfg(not(target_arch = "wasm32"))]
pub mod window;

// Web-specific modules
#[cfg(target_arch = "wasm32")]
pub mod web;

use std::collections::HashSet;
use std::time::Duration;

pub use error::{ControllerError, ControllerResult, HostError, HostResult};
pub use scene::{
    Camera, CameraController, KeyDisposition, KeyboardController, KeyboardControllerConfig,
    KeyboardEvent, PanController, Viewer, ViewerEvent, ViewerScope, ViewerState,
};

/// Configuration for creating a viewer
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    /// Window title
    pub title: String,
    /// Initial window width
    pub width: u32,
    /// Initial window height
    pub height: u32,
    /// Scale applied to keyboard pans
    pub pan_speed: f32,
    /// Grace window after a key release
    pub controller_update_timeout: Duration,
    /// Treat the viewer as focused even when the window is not
    pub force_focus: bool,
    /// Key codes the keyboard controller must ignore
    pub blocked_keys: HashSet<u32>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            title: "Panorama Viewer".to_string(),
            width: 1280,
            height: 720,
            pan_speed: scene::DEFAULT_PAN_SPEED,
            controller_update_timeout: scene::DEFAULT_CONTROLLER_UPDATE_TIMEOUT,
            force_focus: false,
            blocked_keys: HashSet::new(),
        }
    }
}

impl ViewerConfig {
    /// Build the viewer and its keyboard controller, targeted at the
    /// viewer's camera.
    pub fn build(&self) -> (Viewer, KeyboardController) {
        let mut viewer = Viewer::new().with_state(ViewerState {
            force_focus: self.force_focus,
            is_focused: false,
            controller_update_timeout: self.controller_update_timeout,
        });
        viewer
            .camera
            .set_aspect(self.width as f32, self.height as f32);
        for &code in &self.blocked_keys {
            viewer.projections.constraints.block_key(code);
        }

        let mut controller = KeyboardController::new(KeyboardControllerConfig {
            pan_speed: self.pan_speed,
        });
        controller.target(&viewer.camera);

        log::info!(
            "Viewer ready: pan speed {}, release timeout {}ms, {} blocked key(s)",
            self.pan_speed,
            self.controller_update_timeout.as_millis(),
            self.blocked_keys.len()
        );

        (viewer, controller)
    }
}

// Web initialization helper
#[cfg(target_arch = "wasm32")]
pub fn init_web_logging() {
    // Set up panic hook for better error messages in console
    console_error_panic_hook::set_once();
    // Set up console logging for web
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }
}

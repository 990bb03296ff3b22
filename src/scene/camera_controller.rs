//! Camera controller system
//!
//! Provides the shared camera control lifecycle used by every input
//! modality, and [`PanController`], the base that turns accumulated pan
//! offsets into look-direction changes for a camera sitting inside a
//! panorama.

use glam::{Vec2, Vec3};

use super::Camera;

/// Abstract camera controller trait
pub trait CameraController {
    /// Attach the controller to a camera, capturing its current orientation.
    fn target(&mut self, camera: &Camera);

    /// Allow the controller to react to input.
    fn enable(&mut self);

    /// Stop reacting to input. Pending state is kept until [`reset`](Self::reset).
    fn disable(&mut self);

    fn is_enabled(&self) -> bool;

    /// Apply accumulated changes to the camera. Called once per frame.
    fn update(&mut self, camera: &mut Camera);

    /// Get the controller name for debugging
    fn name(&self) -> &'static str;

    /// Drop accumulated input. The camera keeps its current orientation.
    fn reset(&mut self);
}

/// Default radians of rotation per pan unit.
pub const DEFAULT_PAN_SENSITIVITY: f32 = 0.01;

/// Base controller that rotates the camera's look target.
///
/// Pans are expressed in screen-space-like units: positive `x` turns right,
/// positive `y` turns down. They accumulate through [`pan`](Self::pan) and
/// are applied in one step by [`CameraController::update`].
#[derive(Debug, Clone)]
pub struct PanController {
    enabled: bool,
    /// Current yaw angle (horizontal rotation) in radians
    yaw: f32,
    /// Current pitch angle (vertical rotation) in radians, positive looks down
    pitch: f32,
    /// Re-read yaw/pitch from the camera before the next pan is applied
    needs_sync: bool,
    pending_pan: Vec2,
    /// Rotation in radians per pan unit
    pub pan_sensitivity: f32,
}

impl Default for PanController {
    fn default() -> Self {
        // Matches `Camera::default()`, which looks down -Z.
        let yaw = -std::f32::consts::FRAC_PI_2;
        Self {
            enabled: true,
            yaw,
            pitch: 0.0,
            needs_sync: false,
            pending_pan: Vec2::ZERO,
            pan_sensitivity: DEFAULT_PAN_SENSITIVITY,
        }
    }
}

impl PanController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom sensitivity
    pub fn with_sensitivity(mut self, sensitivity: f32) -> Self {
        self.pan_sensitivity = sensitivity;
        self
    }

    /// Queue a camera offset to be applied on the next update.
    pub fn pan(&mut self, delta: Vec2) {
        self.pending_pan += delta;
    }

    /// Offset queued since the last update.
    pub fn pending_pan(&self) -> Vec2 {
        self.pending_pan
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Capture yaw/pitch from the camera's current look direction.
    ///
    /// A camera whose target coincides with its position has no direction;
    /// the previous angles are kept.
    fn sync_with_camera(&mut self, camera: &Camera) {
        let Some(forward) = (camera.target - camera.position).try_normalize() else {
            log::warn!("Camera target equals its position, keeping previous orientation");
            return;
        };
        self.yaw = forward.z.atan2(forward.x);
        self.pitch = (-forward.y).clamp(-1.0, 1.0).asin();
    }

    /// Get the look direction based on yaw/pitch
    fn forward_direction(&self) -> Vec3 {
        Vec3::new(
            self.yaw.cos() * self.pitch.cos(),
            -self.pitch.sin(),
            self.yaw.sin() * self.pitch.cos(),
        )
        .normalize()
    }
}

impl CameraController for PanController {
    fn target(&mut self, camera: &Camera) {
        self.sync_with_camera(camera);
        self.needs_sync = false;
        self.pending_pan = Vec2::ZERO;
    }

    fn enable(&mut self) {
        self.enabled = true;
    }

    fn disable(&mut self) {
        self.enabled = false;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn update(&mut self, camera: &mut Camera) {
        if self.pending_pan == Vec2::ZERO {
            return;
        }

        if self.needs_sync {
            self.sync_with_camera(camera);
            self.needs_sync = false;
        }

        let delta = std::mem::take(&mut self.pending_pan) * self.pan_sensitivity;
        self.yaw = (self.yaw + delta.x) % std::f32::consts::TAU;

        // Clamp pitch to avoid flipping over the poles
        let max_pitch = std::f32::consts::FRAC_PI_2 - 0.01;
        self.pitch = (self.pitch + delta.y).clamp(-max_pitch, max_pitch);

        camera.target = camera.position + self.forward_direction();
    }

    fn name(&self) -> &'static str {
        "Pan"
    }

    fn reset(&mut self) {
        self.pending_pan = Vec2::ZERO;
        self.needs_sync = true;
    }
}

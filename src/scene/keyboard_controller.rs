//! Keyboard camera controller
//!
//! Tracks which navigation keys are held and, once per frame, runs the
//! handlers bound to each held key. The default handlers pan the camera:
//!
//! - Up/Down: look up/down at half the pan speed
//! - Left/Right: turn left/right at twice the pan speed
//!
//! Key presses are only recorded while the viewer has focus, and only for
//! supported keys the viewer has not blocked. A release always clears the
//! key, so a missed key-down can never leave a key stuck.

use std::collections::HashMap;
use std::time::Duration;

use glam::Vec2;

use super::{
    Camera, CameraController, KeyboardEvent, PanController, ReleaseTimer, ViewerEvent,
    ViewerScope,
};
use crate::error::ControllerResult;
use crate::input::{KeyRef, KEYCODES};

/// Pan speed used when none is configured.
pub const DEFAULT_PAN_SPEED: f32 = 1.0;

/// Key passed to handlers on every frame the key is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInput {
    pub name: &'static str,
    pub code: u32,
}

/// Access handlers get to the camera controls while they run.
pub struct PanContext<'a> {
    base: &'a mut PanController,
    pan_speed: f32,
}

impl PanContext<'_> {
    /// Queue a camera offset for this frame.
    pub fn pan(&mut self, delta: Vec2) {
        self.base.pan(delta);
    }

    pub fn pan_speed(&self) -> f32 {
        self.pan_speed
    }
}

/// Callback bound to a key.
pub type KeyHandler = Box<dyn FnMut(KeyInput, &mut PanContext<'_>)>;

/// Whether a key-down was taken by the controller.
///
/// Hosts suppress the platform's default action for consumed keys only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDisposition {
    Consumed,
    Ignored,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyboardControllerConfig {
    /// Scale applied by the default handlers to every pan.
    pub pan_speed: f32,
}

impl Default for KeyboardControllerConfig {
    fn default() -> Self {
        Self {
            pan_speed: DEFAULT_PAN_SPEED,
        }
    }
}

/// Relative pan of the default binding for a navigation key.
fn default_pan_direction(name: &str) -> Vec2 {
    match name {
        "up" => Vec2::new(0.0, -0.5),
        "down" => Vec2::new(0.0, 0.5),
        "left" => Vec2::new(-2.0, 0.0),
        "right" => Vec2::new(2.0, 0.0),
        _ => Vec2::ZERO,
    }
}

pub struct KeyboardController {
    base: PanController,
    /// Navigation keys, in dispatch order. Fixed at construction.
    supported_keys: Vec<KeyInput>,
    key_state: HashMap<u32, bool>,
    bindings: HashMap<u32, Vec<KeyHandler>>,
    release_timer: ReleaseTimer,
    force_update: bool,
    pan_speed: f32,
}

impl KeyboardController {
    /// Name → code table of the supported keys.
    pub const KEYCODES: [(&'static str, u32); 4] = KEYCODES;

    pub fn new(config: KeyboardControllerConfig) -> Self {
        let supported_keys: Vec<KeyInput> = KEYCODES
            .iter()
            .map(|&(name, code)| KeyInput { name, code })
            .collect();

        let mut controller = Self {
            base: PanController::new(),
            supported_keys,
            key_state: HashMap::new(),
            bindings: HashMap::new(),
            release_timer: ReleaseTimer::new(),
            force_update: false,
            pan_speed: config.pan_speed,
        };

        for key in controller.supported_keys.clone() {
            let direction = default_pan_direction(key.name);
            controller.push_handler(
                key.code,
                Box::new(move |_: KeyInput, ctx: &mut PanContext<'_>| {
                    let speed = ctx.pan_speed();
                    ctx.pan(direction * speed);
                }),
            );
        }

        controller
    }

    /// Use a custom base controller, e.g. with a different sensitivity.
    pub fn with_base(mut self, base: PanController) -> Self {
        self.base = base;
        self
    }

    /// Bind a handler to a key given by name or code.
    ///
    /// Handlers accumulate: every handler bound to a key runs, in the order
    /// it was bound, on each frame the key is held. Fails if a key name has
    /// no code.
    pub fn bind<'k, F>(&mut self, key: impl Into<KeyRef<'k>>, handler: F) -> ControllerResult<()>
    where
        F: FnMut(KeyInput, &mut PanContext<'_>) + 'static,
    {
        let key = key.into();
        let code = key.resolve()?;
        if !self.is_key_supported(code) {
            log::debug!("Binding {key} is not a navigation key and will never be dispatched");
        }
        self.push_handler(code, Box::new(handler));
        log::debug!("Bound handler to {key} ({} total)", self.handler_count(code));
        Ok(())
    }

    fn push_handler(&mut self, code: u32, handler: KeyHandler) {
        self.bindings.entry(code).or_default().push(handler);
    }

    /// Number of handlers bound to a key.
    pub fn handler_count<'k>(&self, key: impl Into<KeyRef<'k>>) -> usize {
        key.into()
            .resolve()
            .ok()
            .and_then(|code| self.bindings.get(&code))
            .map_or(0, Vec::len)
    }

    pub fn is_key_supported<'k>(&self, key: impl Into<KeyRef<'k>>) -> bool {
        match key.into().resolve() {
            Ok(code) => self.supported_keys.iter().any(|k| k.code == code),
            Err(_) => false,
        }
    }

    /// Handle a key press.
    ///
    /// While unfocused the raw event is forwarded to the viewer without
    /// recording anything. While focused, unsupported and blocked keys are
    /// ignored; anything else is recorded as held and forwarded.
    pub fn on_key_down(
        &mut self,
        scope: &mut dyn ViewerScope,
        event: KeyboardEvent,
    ) -> KeyDisposition {
        if !self.base.is_enabled() {
            return KeyDisposition::Ignored;
        }

        if !scope.state().has_focus() {
            scope.emit(ViewerEvent::KeyDown(event));
            return KeyDisposition::Ignored;
        }

        let code = event.code;
        if !self.is_key_supported(code) || scope.key_constraints().is_key_blocked(code) {
            log::trace!("Key #{code} rejected");
            return KeyDisposition::Ignored;
        }

        if !event.repeat {
            log::trace!("Key #{code} down");
        }
        self.key_state.insert(code, true);
        scope.emit(ViewerEvent::KeyDown(event));
        KeyDisposition::Consumed
    }

    /// Handle a key release.
    ///
    /// The key is cleared unconditionally. While focused the release also
    /// opens the grace window reported through [`force_update`](Self::force_update).
    pub fn on_key_up(&mut self, scope: &mut dyn ViewerScope, event: KeyboardEvent) {
        let code = event.code;
        self.key_state.insert(code, false);
        log::trace!("Key #{code} up");

        if scope.state().has_focus() {
            self.force_update = true;
            self.release_timer
                .schedule(event.timestamp, scope.state().controller_update_timeout);
        }

        scope.emit(ViewerEvent::KeyUp(event));
    }

    /// Fire the release timer if its grace window has elapsed.
    ///
    /// Hosts call this once per frame, before [`CameraController::update`].
    pub fn poll_timers(&mut self, now: Duration) {
        if self.release_timer.poll(now) {
            log::debug!("Keyboard grace window elapsed");
            self.force_update = false;
        }
    }

    /// `true` from a focused key release until its grace window elapses.
    pub fn force_update(&self) -> bool {
        self.force_update
    }

    pub fn is_release_pending(&self) -> bool {
        self.release_timer.is_pending()
    }

    pub fn is_any_key_down(&self) -> bool {
        self.key_state.values().any(|&held| held)
    }

    pub fn is_key_down(&self, code: u32) -> bool {
        self.key_state.get(&code).copied().unwrap_or(false)
    }

    pub fn pan_speed(&self) -> f32 {
        self.pan_speed
    }

    pub fn set_pan_speed(&mut self, pan_speed: f32) {
        self.pan_speed = pan_speed;
    }

    pub fn base(&self) -> &PanController {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut PanController {
        &mut self.base
    }

    /// Run the handlers of every held navigation key.
    fn dispatch(&mut self) {
        let Self {
            base,
            supported_keys,
            key_state,
            bindings,
            pan_speed,
            ..
        } = self;

        let mut ctx = PanContext {
            base,
            pan_speed: *pan_speed,
        };

        for key in supported_keys.iter() {
            if !key_state.get(&key.code).copied().unwrap_or(false) {
                continue;
            }
            let handlers = bindings
                .get_mut(&key.code)
                .expect("every supported key is bound at construction");
            for handler in handlers.iter_mut() {
                handler(*key, &mut ctx);
            }
        }
    }

    /// Reset and stop reacting to input.
    pub fn dispose(&mut self) {
        self.reset();
        self.base.disable();
        log::info!("Keyboard controller disposed");
    }
}

impl Default for KeyboardController {
    fn default() -> Self {
        Self::new(KeyboardControllerConfig::default())
    }
}

impl CameraController for KeyboardController {
    fn target(&mut self, camera: &Camera) {
        self.base.target(camera);
    }

    fn enable(&mut self) {
        self.base.enable();
    }

    fn disable(&mut self) {
        self.base.disable();
    }

    fn is_enabled(&self) -> bool {
        self.base.is_enabled()
    }

    fn update(&mut self, camera: &mut Camera) {
        if !self.is_any_key_down() {
            return;
        }

        self.dispatch();

        // Key-driven pans must be queued before the base applies them.
        self.base.update(camera);
    }

    fn name(&self) -> &'static str {
        "Keyboard"
    }

    fn reset(&mut self) {
        self.base.reset();
        self.key_state.clear();
        self.release_timer.cancel();
        self.force_update = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ControllerError;
    use crate::scene::Viewer;
    use std::cell::RefCell;
    use std::rc::Rc;

    const UP: u32 = 38;
    const DOWN: u32 = 40;
    const LEFT: u32 = 37;
    const RIGHT: u32 = 39;

    fn focused_viewer() -> Viewer {
        let mut viewer = Viewer::new();
        viewer.set_focused(true);
        viewer
    }

    fn press(
        controller: &mut KeyboardController,
        viewer: &mut Viewer,
        code: u32,
    ) -> KeyDisposition {
        controller.on_key_down(viewer, KeyboardEvent::new(code, Duration::ZERO))
    }

    fn release(controller: &mut KeyboardController, viewer: &mut Viewer, code: u32) {
        controller.on_key_up(viewer, KeyboardEvent::new(code, Duration::ZERO));
    }

    fn queued_pan(controller: &KeyboardController) -> Vec2 {
        controller.base().pending_pan()
    }

    #[test]
    fn keycodes_cover_the_four_directions() {
        let controller = KeyboardController::default();
        for (name, code) in KeyboardController::KEYCODES {
            assert!(controller.is_key_supported(name));
            assert!(controller.is_key_supported(code));
            assert_eq!(controller.handler_count(code), 1);
        }
        assert!(!controller.is_key_supported(65u32));
        assert!(!controller.is_key_supported("jump"));
    }

    #[test]
    fn unsupported_key_is_never_recorded() {
        let mut viewer = focused_viewer();
        let mut controller = KeyboardController::default();

        for code in [0, 9, 13, 27, 32, 36, 41, 65, 87, 255] {
            assert_eq!(press(&mut controller, &mut viewer, code), KeyDisposition::Ignored);
            assert!(!controller.is_key_down(code));
        }
        assert!(!controller.is_any_key_down());
        assert!(viewer.events.is_empty());
    }

    #[test]
    fn key_up_always_clears_state() {
        let mut viewer = Viewer::new();
        let mut controller = KeyboardController::default();

        release(&mut controller, &mut viewer, UP);
        assert!(!controller.is_key_down(UP));
        assert_eq!(controller.key_state.get(&UP), Some(&false));

        viewer.set_focused(true);
        press(&mut controller, &mut viewer, LEFT);
        viewer.set_focused(false);
        release(&mut controller, &mut viewer, LEFT);
        assert!(!controller.is_key_down(LEFT));
    }

    #[test]
    fn unfocused_key_down_is_forwarded_but_not_recorded() {
        let mut viewer = Viewer::new();
        let mut controller = KeyboardController::default();

        assert_eq!(press(&mut controller, &mut viewer, UP), KeyDisposition::Ignored);
        assert!(!controller.is_key_down(UP));

        let names: Vec<_> = viewer.events.iter().map(ViewerEvent::name).collect();
        assert_eq!(names, vec!["keydown"]);
    }

    #[test]
    fn force_focus_counts_as_focused() {
        let mut viewer = Viewer::new();
        viewer.state.force_focus = true;
        let mut controller = KeyboardController::default();

        assert_eq!(press(&mut controller, &mut viewer, UP), KeyDisposition::Consumed);
        assert!(controller.is_key_down(UP));
    }

    #[test]
    fn disabled_controller_ignores_key_down() {
        let mut viewer = focused_viewer();
        let mut controller = KeyboardController::default();
        controller.disable();

        assert_eq!(press(&mut controller, &mut viewer, UP), KeyDisposition::Ignored);
        assert!(!controller.is_any_key_down());
        assert!(viewer.events.is_empty());

        controller.enable();
        assert_eq!(press(&mut controller, &mut viewer, UP), KeyDisposition::Consumed);
    }

    #[test]
    fn disable_does_not_cancel_release_timer() {
        let mut viewer = focused_viewer();
        let mut controller = KeyboardController::default();

        release(&mut controller, &mut viewer, UP);
        controller.disable();
        assert!(controller.is_release_pending());
        assert!(controller.force_update());
    }

    #[test]
    fn constraint_is_checked_on_every_key_down() {
        let mut viewer = focused_viewer();
        let mut controller = KeyboardController::default();

        assert_eq!(press(&mut controller, &mut viewer, DOWN), KeyDisposition::Consumed);
        assert!(controller.is_key_down(DOWN));
        release(&mut controller, &mut viewer, DOWN);

        viewer.projections.constraints.block_key(DOWN);
        assert_eq!(press(&mut controller, &mut viewer, DOWN), KeyDisposition::Ignored);
        assert!(!controller.is_key_down(DOWN));

        viewer.projections.constraints.unblock_key(DOWN);
        assert_eq!(press(&mut controller, &mut viewer, DOWN), KeyDisposition::Consumed);
    }

    #[test]
    fn constraint_added_mid_press_does_not_release_key() {
        let mut viewer = focused_viewer();
        let mut controller = KeyboardController::default();
        let mut camera = Camera::default();

        press(&mut controller, &mut viewer, RIGHT);
        viewer.projections.constraints.block_key(RIGHT);

        controller.dispatch();
        assert_eq!(queued_pan(&controller), Vec2::new(2.0, 0.0));
        controller.update(&mut camera);
        assert!(controller.is_key_down(RIGHT));
    }

    #[test]
    fn update_without_held_keys_does_not_pan() {
        let mut viewer = focused_viewer();
        let mut controller = KeyboardController::default();
        let mut camera = Camera::default();
        let before = camera.clone();

        let calls = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&calls);
        controller
            .bind("up", move |_, _| *counter.borrow_mut() += 1)
            .unwrap();

        press(&mut controller, &mut viewer, 65);
        controller.update(&mut camera);

        assert_eq!(*calls.borrow(), 0);
        assert_eq!(camera, before);
    }

    #[test]
    fn default_bindings_scale_pan_speed() {
        let mut viewer = focused_viewer();
        let mut controller = KeyboardController::new(KeyboardControllerConfig { pan_speed: 4.0 });

        for (code, expected) in [
            (UP, Vec2::new(0.0, -2.0)),
            (DOWN, Vec2::new(0.0, 2.0)),
            (LEFT, Vec2::new(-8.0, 0.0)),
            (RIGHT, Vec2::new(8.0, 0.0)),
        ] {
            press(&mut controller, &mut viewer, code);
            controller.dispatch();
            assert_eq!(queued_pan(&controller), expected, "key #{code}");
            controller.reset();
        }
    }

    #[test]
    fn set_pan_speed_applies_to_next_frame() {
        let mut viewer = focused_viewer();
        let mut controller = KeyboardController::default();
        press(&mut controller, &mut viewer, LEFT);

        controller.set_pan_speed(0.5);
        controller.dispatch();
        assert_eq!(queued_pan(&controller), Vec2::new(-1.0, 0.0));
    }

    #[test]
    fn opposite_keys_cancel_out() {
        let mut viewer = focused_viewer();
        let mut controller = KeyboardController::default();
        press(&mut controller, &mut viewer, LEFT);
        press(&mut controller, &mut viewer, RIGHT);

        controller.dispatch();
        assert_eq!(queued_pan(&controller), Vec2::ZERO);
    }

    #[test]
    fn handlers_run_in_registration_order_every_frame() {
        let mut viewer = focused_viewer();
        let mut controller = KeyboardController::default();
        let mut camera = Camera::default();
        let log = Rc::new(RefCell::new(Vec::new()));

        for tag in ["first", "second"] {
            let log = Rc::clone(&log);
            controller
                .bind("up", move |key, _| log.borrow_mut().push((tag, key)))
                .unwrap();
        }
        assert_eq!(controller.handler_count("up"), 3);

        press(&mut controller, &mut viewer, UP);
        controller.update(&mut camera);
        controller.update(&mut camera);

        let key = KeyInput { name: "up", code: UP };
        assert_eq!(
            *log.borrow(),
            vec![("first", key), ("second", key), ("first", key), ("second", key)]
        );
    }

    #[test]
    fn custom_handler_can_pan() {
        let mut viewer = focused_viewer();
        let mut controller = KeyboardController::default();
        controller
            .bind(DOWN, |_, ctx| ctx.pan(Vec2::new(1.0, 0.0)))
            .unwrap();

        press(&mut controller, &mut viewer, DOWN);
        controller.dispatch();
        assert_eq!(queued_pan(&controller), Vec2::new(1.0, 0.5));
    }

    #[test]
    fn bind_rejects_unknown_name() {
        let mut controller = KeyboardController::default();
        let result = controller.bind("sideways", |_, _| {});
        assert_eq!(
            result,
            Err(ControllerError::UnknownKey("sideways".to_string()))
        );
    }

    #[test]
    fn binding_unsupported_code_never_dispatches() {
        let mut viewer = focused_viewer();
        let mut controller = KeyboardController::default();
        let calls = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&calls);
        controller
            .bind(65u32, move |_, _| *counter.borrow_mut() += 1)
            .unwrap();
        assert_eq!(controller.handler_count(65u32), 1);

        press(&mut controller, &mut viewer, 65);
        press(&mut controller, &mut viewer, UP);
        controller.update(&mut Camera::default());
        assert_eq!(*calls.borrow(), 0);
    }

    #[test]
    fn update_applies_pan_to_camera() {
        let mut viewer = focused_viewer();
        let mut controller = KeyboardController::default();
        let mut camera = Camera::default();
        controller.target(&camera);

        press(&mut controller, &mut viewer, RIGHT);
        controller.update(&mut camera);

        assert!(camera.forward().x > 0.0);
        assert_eq!(queued_pan(&controller), Vec2::ZERO);
    }

    #[test]
    fn release_opens_grace_window() {
        let mut viewer = focused_viewer();
        viewer.state.controller_update_timeout = Duration::from_millis(100);
        let mut controller = KeyboardController::default();
        let start = Duration::from_secs(1);

        press(&mut controller, &mut viewer, UP);
        controller.on_key_up(&mut viewer, KeyboardEvent::new(UP, start));
        assert!(controller.force_update());

        controller.poll_timers(start + Duration::from_millis(99));
        assert!(controller.force_update());
        controller.poll_timers(start + Duration::from_millis(100));
        assert!(!controller.force_update());
    }

    #[test]
    fn second_release_extends_grace_window() {
        let mut viewer = focused_viewer();
        viewer.state.controller_update_timeout = Duration::from_millis(100);
        let mut controller = KeyboardController::default();
        let start = Duration::from_secs(1);

        controller.on_key_up(&mut viewer, KeyboardEvent::new(UP, start));
        controller.on_key_up(
            &mut viewer,
            KeyboardEvent::new(LEFT, start + Duration::from_millis(80)),
        );

        controller.poll_timers(start + Duration::from_millis(150));
        assert!(controller.force_update());
        controller.poll_timers(start + Duration::from_millis(180));
        assert!(!controller.force_update());
    }

    #[test]
    fn unbounded_release_timeout_keeps_grace_window_open() {
        let mut viewer = focused_viewer();
        viewer.state.controller_update_timeout = Duration::MAX;
        let mut controller = KeyboardController::default();
        let start = Duration::from_secs(1);

        controller.on_key_up(&mut viewer, KeyboardEvent::new(UP, start));
        assert!(controller.force_update());

        controller.poll_timers(start + Duration::from_secs(3600));
        assert!(controller.force_update());
        assert!(controller.is_release_pending());
    }

    #[test]
    fn unfocused_release_does_not_open_grace_window() {
        let mut viewer = Viewer::new();
        let mut controller = KeyboardController::default();

        release(&mut controller, &mut viewer, UP);
        assert!(!controller.force_update());
        assert!(!controller.is_release_pending());

        let names: Vec<_> = viewer.events.iter().map(ViewerEvent::name).collect();
        assert_eq!(names, vec!["keyup"]);
    }

    #[test]
    fn reset_clears_keys_and_timer() {
        let mut viewer = focused_viewer();
        let mut controller = KeyboardController::default();

        press(&mut controller, &mut viewer, UP);
        release(&mut controller, &mut viewer, LEFT);
        controller.reset();

        assert!(!controller.is_any_key_down());
        assert!(!controller.is_release_pending());
        assert!(!controller.force_update());
        assert_eq!(controller.handler_count("up"), 1);
    }

    #[test]
    fn reset_keeps_camera_orientation() {
        let mut viewer = focused_viewer();
        let mut controller = KeyboardController::default();
        controller.target(&viewer.camera);

        press(&mut controller, &mut viewer, RIGHT);
        for _ in 0..40 {
            controller.update(&mut viewer.camera);
        }
        release(&mut controller, &mut viewer, RIGHT);
        controller.reset();

        let before = viewer.camera.forward();
        press(&mut controller, &mut viewer, UP);
        controller.update(&mut viewer.camera);
        let after = viewer.camera.forward();

        assert!((after - before).length() < 0.01, "{before:?} -> {after:?}");
        assert!(after.x > 0.5);
    }

    #[test]
    fn dispose_resets_and_disables() {
        let mut viewer = focused_viewer();
        let mut controller = KeyboardController::default();

        press(&mut controller, &mut viewer, UP);
        controller.dispose();

        assert!(!controller.is_any_key_down());
        assert!(!controller.is_enabled());
        assert_eq!(press(&mut controller, &mut viewer, UP), KeyDisposition::Ignored);
    }

    #[test]
    fn repeat_key_down_keeps_key_held() {
        let mut viewer = focused_viewer();
        let mut controller = KeyboardController::default();
        let now = Duration::from_millis(16);

        controller.on_key_down(&mut viewer, KeyboardEvent::new(UP, now));
        let repeat = KeyboardEvent::new(UP, now).with_repeat(true);
        assert_eq!(controller.on_key_down(&mut viewer, repeat), KeyDisposition::Consumed);
        assert!(controller.is_key_down(UP));

        release(&mut controller, &mut viewer, UP);
        assert!(!controller.is_any_key_down());
    }
}

//! Native host using winit
//!
//! Maps winit keyboard and focus events onto the keyboard controller and
//! drives the per-frame update from the event loop.

use std::sync::Arc;
use std::time::{Duration, Instant};

use winit::{
    dpi::PhysicalSize,
    event::{ElementState, Event, KeyEvent, WindowEvent},
    event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window as WinitWindow, WindowBuilder},
};

use crate::error::HostResult;
use crate::input::map_winit_key;
use crate::scene::{CameraController, KeyboardController, KeyboardEvent, Viewer};
use crate::ViewerConfig;

/// Wrapper around winit window with additional state
pub struct Window {
    window: Arc<WinitWindow>,
    width: u32,
    height: u32,
    resized: bool,
}

impl Window {
    /// Create a new window with the given title and dimensions
    pub fn new(
        event_loop: &EventLoop<()>,
        title: &str,
        width: u32,
        height: u32,
    ) -> HostResult<Self> {
        let window = Arc::new(
            WindowBuilder::new()
                .with_title(title)
                .with_inner_size(PhysicalSize::new(width, height))
                .build(event_loop)?,
        );

        Ok(Self {
            window,
            width,
            height,
            resized: false,
        })
    }

    /// Get the raw window
    pub fn window(&self) -> &WinitWindow {
        &self.window
    }

    /// Get current window dimensions
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Check if window was resized since last frame
    pub fn was_resized(&self) -> bool {
        self.resized
    }

    /// Clear the resize flag
    pub fn clear_resize_flag(&mut self) {
        self.resized = false;
    }

    /// Handle window events
    pub fn handle_event(&mut self, event: &WindowEvent) {
        if let WindowEvent::Resized(size) = event {
            self.width = size.width;
            self.height = size.height;
            self.resized = true;
        }
    }

    /// Request a redraw
    pub fn request_redraw(&self) {
        self.window.request_redraw();
    }
}

/// Forward a winit key event to the controller.
///
/// Keys without a DOM-style code are dropped here; everything else reaches
/// the controller, which decides whether to act on it.
pub fn forward_key_event(
    controller: &mut KeyboardController,
    viewer: &mut Viewer,
    event: &KeyEvent,
    timestamp: Duration,
) {
    let PhysicalKey::Code(key) = event.physical_key else {
        return;
    };
    let Some(code) = map_winit_key(key) else {
        return;
    };

    let key_event = KeyboardEvent::new(code, timestamp).with_repeat(event.repeat);
    match event.state {
        ElementState::Pressed => {
            controller.on_key_down(viewer, key_event);
        }
        ElementState::Released => controller.on_key_up(viewer, key_event),
    }
}

/// Run the viewer until the window is closed or Escape is pressed.
pub fn run(config: ViewerConfig) -> HostResult<()> {
    let event_loop = EventLoop::new()?;
    let mut window = Window::new(&event_loop, &config.title, config.width, config.height)?;
    let (mut viewer, mut controller) = config.build();
    viewer.set_focused(window.window().has_focus());
    let clock = Instant::now();

    log::info!("Use the arrow keys to look around, Escape to quit");

    event_loop.run(move |event, elwt: &EventLoopWindowTarget<()>| {
        elwt.set_control_flow(ControlFlow::Poll);

        match event {
            Event::WindowEvent { event, .. } => {
                window.handle_event(&event);

                match event {
                    WindowEvent::CloseRequested => elwt.exit(),
                    WindowEvent::Focused(focused) => viewer.set_focused(focused),
                    WindowEvent::KeyboardInput { event, .. } => {
                        if event.physical_key == PhysicalKey::Code(KeyCode::Escape)
                            && event.state == ElementState::Pressed
                        {
                            elwt.exit();
                            return;
                        }
                        forward_key_event(
                            &mut controller,
                            &mut viewer,
                            &event,
                            clock.elapsed(),
                        );
                    }
                    _ => {}
                }
            }
            Event::AboutToWait => {
                if window.was_resized() {
                    let (width, height) = window.dimensions();
                    viewer.camera.set_aspect(width as f32, height as f32);
                    window.clear_resize_flag();
                }

                controller.poll_timers(clock.elapsed());
                let before = viewer.camera.target;
                controller.update(&mut viewer.camera);
                if viewer.camera.target != before {
                    log::debug!("Looking toward {:?}", viewer.camera.forward());
                }

                for event in viewer.events.drain() {
                    log::trace!("{} #{}", event.name(), event.keyboard_event().code);
                }

                window.request_redraw();
            }
            Event::LoopExiting => {
                controller.dispose();
            }
            _ => {}
        }
    })?;

    Ok(())
}

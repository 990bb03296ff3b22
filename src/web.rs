//! Web-specific functionality for running the viewer in a browser.
//!
//! Keyboard and focus listeners are attached to a host element; a
//! `requestAnimationFrame` loop drives the controller. DOM event timestamps
//! and animation frame times share the page's time origin, so both feed the
//! release timer directly.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::scene::{CameraController, KeyDisposition, KeyboardController, KeyboardEvent, Viewer};
use crate::ViewerConfig;

struct WebViewer {
    viewer: Viewer,
    controller: KeyboardController,
}

/// Convert a DOM high resolution timestamp (milliseconds) to a clock offset.
fn timestamp(ms: f64) -> Duration {
    Duration::from_secs_f64(ms.max(0.0) / 1000.0)
}

fn keyboard_event(event: &web_sys::KeyboardEvent) -> KeyboardEvent {
    KeyboardEvent::new(event.key_code(), timestamp(event.time_stamp())).with_repeat(event.repeat())
}

fn request_animation_frame(callback: &Closure<dyn FnMut(f64)>) {
    let Some(window) = web_sys::window() else {
        return;
    };
    if let Err(err) = window.request_animation_frame(callback.as_ref().unchecked_ref()) {
        log::error!("requestAnimationFrame failed: {err:?}");
    }
}

/// Attach a viewer to the element with the given id.
///
/// The element is made focusable; the viewer counts as focused while it
/// holds focus.
#[wasm_bindgen]
pub fn attach(element_id: &str) -> Result<(), JsValue> {
    crate::init_web_logging();

    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| JsValue::from_str("no document exists"))?;
    let element = document
        .get_element_by_id(element_id)
        .ok_or_else(|| JsValue::from_str(&format!("no element with id '{element_id}'")))?;
    element.set_attribute("tabindex", "0")?;

    let (viewer, controller) = ViewerConfig::default().build();
    let state = Rc::new(RefCell::new(WebViewer { viewer, controller }));

    {
        let state = Rc::clone(&state);
        let on_key_down = Closure::<dyn FnMut(web_sys::KeyboardEvent)>::new(
            move |event: web_sys::KeyboardEvent| {
                let mut guard = state.borrow_mut();
                let WebViewer { viewer, controller } = &mut *guard;
                if controller.on_key_down(viewer, keyboard_event(&event)) == KeyDisposition::Consumed
                {
                    event.prevent_default();
                }
            },
        );
        element.add_event_listener_with_callback("keydown", on_key_down.as_ref().unchecked_ref())?;
        on_key_down.forget();
    }

    {
        let state = Rc::clone(&state);
        let on_key_up = Closure::<dyn FnMut(web_sys::KeyboardEvent)>::new(
            move |event: web_sys::KeyboardEvent| {
                let mut guard = state.borrow_mut();
                let WebViewer { viewer, controller } = &mut *guard;
                controller.on_key_up(viewer, keyboard_event(&event));
            },
        );
        element.add_event_listener_with_callback("keyup", on_key_up.as_ref().unchecked_ref())?;
        on_key_up.forget();
    }

    for (name, focused) in [("focus", true), ("blur", false)] {
        let state = Rc::clone(&state);
        let on_focus = Closure::<dyn FnMut(web_sys::FocusEvent)>::new(
            move |_event: web_sys::FocusEvent| {
                state.borrow_mut().viewer.set_focused(focused);
            },
        );
        element.add_event_listener_with_callback(name, on_focus.as_ref().unchecked_ref())?;
        on_focus.forget();
    }

    let frame: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
    let first = Rc::clone(&frame);
    *first.borrow_mut() = Some(Closure::new(move |now_ms: f64| {
        {
            let mut guard = state.borrow_mut();
            let WebViewer { viewer, controller } = &mut *guard;
            controller.poll_timers(timestamp(now_ms));
            controller.update(&mut viewer.camera);
            for event in viewer.events.drain() {
                log::trace!("{} #{}", event.name(), event.keyboard_event().code);
            }
        }
        if let Some(callback) = frame.borrow().as_ref() {
            request_animation_frame(callback);
        }
    }));
    if let Some(callback) = first.borrow().as_ref() {
        request_animation_frame(callback);
    }

    log::info!("Viewer attached to #{element_id}");
    Ok(())
}

//! Viewer event queue.

use std::time::Duration;

/// Raw keyboard event as delivered by a platform host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyboardEvent {
    /// DOM-style key code.
    pub code: u32,
    /// When the host observed the event, relative to the host clock origin.
    pub timestamp: Duration,
    /// Whether this is an auto-repeat of a held key.
    pub repeat: bool,
}

impl KeyboardEvent {
    pub fn new(code: u32, timestamp: Duration) -> Self {
        Self {
            code,
            timestamp,
            repeat: false,
        }
    }

    pub fn with_repeat(mut self, repeat: bool) -> Self {
        self.repeat = repeat;
        self
    }
}

/// Notifications forwarded to viewer listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerEvent {
    KeyDown(KeyboardEvent),
    KeyUp(KeyboardEvent),
}

impl ViewerEvent {
    /// Event name as exposed to listeners.
    pub fn name(&self) -> &'static str {
        match self {
            ViewerEvent::KeyDown(_) => "keydown",
            ViewerEvent::KeyUp(_) => "keyup",
        }
    }

    pub fn keyboard_event(&self) -> &KeyboardEvent {
        match self {
            ViewerEvent::KeyDown(event) | ViewerEvent::KeyUp(event) => event,
        }
    }
}

/// FIFO of viewer notifications, drained by the host once per frame.
pub struct Events<T> {
    events: Vec<T>,
}

impl<T> Events<T> {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn send(&mut self, event: T) {
        self.events.push(event);
    }

    /// Iterates over queued events, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.events.iter()
    }

    /// Takes every queued event, oldest first.
    pub fn drain(&mut self) -> Vec<T> {
        std::mem::take(&mut self.events)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl<T> Default for Events<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_returns_events_in_send_order() {
        let mut events = Events::new();
        events.send("a");
        events.send("b");
        assert_eq!(events.len(), 2);
        assert_eq!(events.iter().copied().collect::<Vec<_>>(), vec!["a", "b"]);

        assert_eq!(events.drain(), vec!["a", "b"]);
        assert!(events.is_empty());
        assert!(events.drain().is_empty());
    }

    #[test]
    fn viewer_event_names() {
        let key = KeyboardEvent::new(38, Duration::ZERO);
        assert_eq!(ViewerEvent::KeyDown(key).name(), "keydown");
        assert_eq!(ViewerEvent::KeyUp(key).name(), "keyup");
        assert_eq!(ViewerEvent::KeyUp(key).keyboard_event().code, 38);
    }
}

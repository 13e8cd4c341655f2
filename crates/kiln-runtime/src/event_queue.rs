//! Platform event delivery for the input-drain phase

use std::collections::VecDeque;

use kiln_core::Size;
use winit::keyboard::KeyCode;

/// A windowing-layer notification, already translated out of the platform's types
#[derive(Debug, Clone, PartialEq)]
pub enum PlatformEvent {
    /// The user or OS asked the application to close.
    Quit,
    /// The window's logical (DPI-independent) size changed.
    Resized(Size),
    /// The backbuffer pixel size may have changed (DPI change, monitor move).
    PixelSizeChanged,
    /// A key went down. `alt` reflects the modifier state at the time.
    KeyDown { key: KeyCode, alt: bool, repeat: bool },
    /// A key went up.
    KeyUp { key: KeyCode },
    /// The window lost keyboard focus.
    FocusLost,
}

/// Anything the lifecycle can drain events from
pub trait EventSource {
    /// Next pending event, or `None` once the queue is empty for this frame
    fn poll_event(&mut self) -> Option<PlatformEvent>;
}

/// A FIFO queue the host event loop pushes to and the input phase drains
#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<PlatformEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push an event onto the queue
    pub fn push(&mut self, event: PlatformEvent) {
        self.events.push_back(event);
    }

    /// Check if there are pending events
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of pending events
    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl EventSource for EventQueue {
    fn poll_event(&mut self) -> Option<PlatformEvent> {
        self.events.pop_front()
    }
}

impl Extend<PlatformEvent> for EventQueue {
    fn extend<I: IntoIterator<Item = PlatformEvent>>(&mut self, iter: I) {
        self.events.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let mut queue = EventQueue::new();
        assert!(queue.is_empty());

        queue.push(PlatformEvent::Resized(Size::new(800, 600)));
        queue.push(PlatformEvent::Quit);
        assert_eq!(queue.len(), 2);

        assert_eq!(
            queue.poll_event(),
            Some(PlatformEvent::Resized(Size::new(800, 600)))
        );
        assert_eq!(queue.poll_event(), Some(PlatformEvent::Quit));
        assert_eq!(queue.poll_event(), None);
        assert!(queue.is_empty());
    }
}

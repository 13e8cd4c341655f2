//! Keyboard input tracking

use std::collections::HashSet;
use winit::keyboard::KeyCode;

use crate::event_queue::PlatformEvent;

/// Per-frame state of a single key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonState {
    /// Up this frame and the previous one.
    None,
    /// Went down this frame.
    Pressed,
    /// Down this frame and the previous one.
    Held,
    /// Went up this frame.
    Released,
}

/// Snapshot of the keyboard for the current frame
#[derive(Debug, Default, Clone)]
pub struct InputState {
    current: HashSet<KeyCode>,
    previous: HashSet<KeyCode>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare this frame against the previous one
    pub fn key_state(&self, key: KeyCode) -> ButtonState {
        match (self.previous.contains(&key), self.current.contains(&key)) {
            (false, false) => ButtonState::None,
            (false, true) => ButtonState::Pressed,
            (true, true) => ButtonState::Held,
            (true, false) => ButtonState::Released,
        }
    }

    /// Is a key currently down? (pressed this frame or held)
    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.current.contains(&key)
    }
}

/// Event-fed keyboard tracker.
///
/// Per frame: [`prepare_for_update`](Self::prepare_for_update), feed every
/// drained event through [`handle_event`](Self::handle_event), then
/// [`update`](Self::update) and read [`state`](Self::state).
#[derive(Debug, Default)]
pub struct InputSystem {
    state: InputState,
    /// Keys down right now, maintained across frames from key events
    keys_down: HashSet<KeyCode>,
    initialized: bool,
}

impl InputSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn initialize(&mut self) {
        self.keys_down.clear();
        self.state = InputState::new();
        self.initialized = true;
        log::debug!("input system initialized");
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Roll the current frame's keys into the previous-frame set
    pub fn prepare_for_update(&mut self) {
        self.state.previous = std::mem::take(&mut self.state.current);
    }

    /// Process a platform event. Non-keyboard events are ignored.
    pub fn handle_event(&mut self, event: &PlatformEvent) {
        match event {
            PlatformEvent::KeyDown { key, .. } => {
                self.keys_down.insert(*key);
            }
            PlatformEvent::KeyUp { key } => {
                self.keys_down.remove(key);
            }
            PlatformEvent::FocusLost => self.keys_down.clear(),
            _ => {}
        }
    }

    /// Publish the keys seen this frame into the state snapshot
    pub fn update(&mut self) {
        self.state.current.clone_from(&self.keys_down);
    }

    pub fn state(&self) -> &InputState {
        &self.state
    }

    pub fn shutdown(&mut self) {
        self.keys_down.clear();
        self.state = InputState::new();
        self.initialized = false;
        log::debug!("input system shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(input: &mut InputSystem, events: &[PlatformEvent]) {
        input.prepare_for_update();
        for event in events {
            input.handle_event(event);
        }
        input.update();
    }

    fn key_down(key: KeyCode) -> PlatformEvent {
        PlatformEvent::KeyDown {
            key,
            alt: false,
            repeat: false,
        }
    }

    #[test]
    fn test_key_transitions() {
        let mut input = InputSystem::new();
        input.initialize();

        frame(&mut input, &[key_down(KeyCode::Space)]);
        assert_eq!(input.state().key_state(KeyCode::Space), ButtonState::Pressed);

        frame(&mut input, &[]);
        assert_eq!(input.state().key_state(KeyCode::Space), ButtonState::Held);
        assert!(input.state().is_key_down(KeyCode::Space));

        frame(&mut input, &[PlatformEvent::KeyUp { key: KeyCode::Space }]);
        assert_eq!(input.state().key_state(KeyCode::Space), ButtonState::Released);

        frame(&mut input, &[]);
        assert_eq!(input.state().key_state(KeyCode::Space), ButtonState::None);
    }

    #[test]
    fn test_tap_within_one_frame_is_not_seen() {
        let mut input = InputSystem::new();
        frame(
            &mut input,
            &[key_down(KeyCode::KeyW), PlatformEvent::KeyUp { key: KeyCode::KeyW }],
        );
        assert_eq!(input.state().key_state(KeyCode::KeyW), ButtonState::None);
    }

    #[test]
    fn test_focus_loss_releases_keys() {
        let mut input = InputSystem::new();
        frame(&mut input, &[key_down(KeyCode::KeyA)]);
        frame(&mut input, &[PlatformEvent::FocusLost]);
        assert_eq!(input.state().key_state(KeyCode::KeyA), ButtonState::Released);
    }

    #[test]
    fn test_shutdown_clears_state() {
        let mut input = InputSystem::new();
        input.initialize();
        frame(&mut input, &[key_down(KeyCode::KeyA)]);
        input.shutdown();
        assert!(!input.is_initialized());
        assert!(!input.state().is_key_down(KeyCode::KeyA));
    }
}

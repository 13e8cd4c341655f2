//! Player application implementing winit ApplicationHandler
//!
//! winit owns the OS event loop, so the runtime is driven one frame at a time:
//! window events are translated into the runtime's event queue as they arrive,
//! and each `about_to_wait` runs a single input/update/draw iteration.

use kiln_runtime::platform::{EventTranslator, WinitPlatform, WinitWindow};
use kiln_runtime::{Application, EventQueue, Game, WindowBackend};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::ActiveEventLoop;
use winit::window::WindowId;

pub struct PlayerApp<G: Game> {
    app: Application<WinitWindow, G>,
    events: EventQueue,
    translator: EventTranslator,
    window_id: Option<WindowId>,
    started: bool,
}

impl<G: Game> PlayerApp<G> {
    pub fn new(app: Application<WinitWindow, G>) -> Self {
        Self {
            app,
            events: EventQueue::new(),
            translator: EventTranslator::new(),
            window_id: None,
            started: false,
        }
    }

    pub fn application(&self) -> &Application<WinitWindow, G> {
        &self.app
    }

    fn initialize(&mut self, event_loop: &ActiveEventLoop) {
        let mut platform = WinitPlatform::new(event_loop);
        if let Err(e) = self.app.initialize(&mut platform) {
            log::error!("startup failed: {}", e);
            self.app.shutdown();
            event_loop.exit();
            return;
        }
        self.window_id = self.app.window().map(|window| window.backend().id());
    }
}

impl<G: Game> ApplicationHandler for PlayerApp<G> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if !self.started {
            self.started = true;
            self.initialize(event_loop);
        }
    }

    fn window_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.window_id != Some(window_id) {
            return;
        }
        let scale_factor = self
            .app
            .window()
            .map(|window| window.backend().scale_factor())
            .unwrap_or(1.0);
        self.translator
            .translate(&event, scale_factor, &mut self.events);
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if !self.started {
            return;
        }
        self.app.run_frame(&mut self.events);
        if !self.app.is_active() {
            self.app.shutdown();
            event_loop.exit();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.app.shutdown();
    }
}

//! Application lifecycle: startup, the frame sequence, and teardown
//!
//! Startup brings subsystems up in dependency order and records how far it
//! got, so [`Application::shutdown`] can tear down exactly what exists, in
//! reverse, even after a failed start.
//!
//! Each frame runs three phases:
//!
//! 1. **Input**: drain platform events into the input system and window adapter
//! 2. **Update**: pace and clamp time, then time-of-day, game hook, physics,
//!    actors, reconciliation, audio. Skipped while paused, pacing still runs.
//! 3. **Draw**: collect draw items from active actors and hand them to the renderer

use std::path::PathBuf;

use kiln_core::{KilnError, Result, Size};
use winit::keyboard::KeyCode;

use crate::draw::DrawList;
use crate::event_queue::{EventSource, PlatformEvent};
use crate::input::{ButtonState, InputState, InputSystem};
use crate::registry::ActorRegistry;
use crate::scheduler::{FrameScheduler, FrameTime};
use crate::settings::Settings;
use crate::subsystem::{
    AssetManager, PhysicsWorld, Platform, SoundMixer, Subsystems, TimeOfDay, WindowDescriptor,
};
use crate::window::{WindowAdapter, WindowBackend, WindowResponse};

/// A window or loop change requested from inside a game hook
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    SetFullscreen(bool),
    ToggleFullscreen,
    Quit,
}

/// Window geometry as of the start of a hook
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WindowInfo {
    pub pixel_size: Size,
    pub logical_size: Size,
    pub fullscreen: bool,
}

/// What a game hook may touch. Window changes go through the command queue
/// and are applied as soon as the hook returns.
pub struct GameContext<'a> {
    pub actors: &'a mut ActorRegistry,
    pub input: &'a InputState,
    pub physics: &'a mut dyn PhysicsWorld,
    pub assets: &'a mut dyn AssetManager,
    pub audio: &'a mut dyn SoundMixer,
    pub time_of_day: &'a mut dyn TimeOfDay,
    pub window: WindowInfo,
    commands: &'a mut Vec<AppCommand>,
}

impl<'a> GameContext<'a> {
    pub fn push_command(&mut self, command: AppCommand) {
        self.commands.push(command);
    }

    pub fn set_fullscreen(&mut self, enable: bool) {
        self.push_command(AppCommand::SetFullscreen(enable));
    }

    pub fn toggle_fullscreen(&mut self) {
        self.push_command(AppCommand::ToggleFullscreen);
    }

    /// Leave the loop after the current frame
    pub fn quit(&mut self) {
        self.push_command(AppCommand::Quit);
    }
}

/// Hooks for the application built on the runtime
#[allow(unused_variables)]
pub trait Game {
    /// Load content once every subsystem is up. An error aborts startup.
    fn load_data(&mut self, ctx: &mut GameContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Called after `load_data`, right before the loop starts
    fn init_game(&mut self, ctx: &mut GameContext<'_>) {}

    /// Per-frame hook, after time-of-day and before physics and actors
    fn update_game(&mut self, ctx: &mut GameContext<'_>, dt: f32) {}

    /// Called before any subsystem is torn down
    fn shutdown_game(&mut self, ctx: &mut GameContext<'_>) {}
}

/// A game with no hooks, for running the bare loop
impl Game for () {}

/// Furthest point startup reached, in bring-up order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Stage {
    Uninit,
    Window,
    Renderer,
    Input,
    Physics,
    Assets,
    Audio,
    TimeOfDay,
    Ready,
}

/// Everything but the game, so hooks can borrow it while the game is borrowed too
struct AppCore<W: WindowBackend> {
    settings_path: PathBuf,
    preset_settings: Option<Settings>,
    settings: Settings,
    subsystems: Subsystems<W>,
    window: Option<WindowAdapter<W>>,
    input: InputSystem,
    actors: ActorRegistry,
    draw_list: DrawList,
    scheduler: FrameScheduler,
    commands: Vec<AppCommand>,
    stage: Stage,
    released: bool,
    active: bool,
    paused: bool,
}

impl<W: WindowBackend> AppCore<W> {
    fn context(&mut self) -> GameContext<'_> {
        let window = self
            .window
            .as_ref()
            .map(|w| WindowInfo {
                pixel_size: w.pixel_size(),
                logical_size: w.logical_size(),
                fullscreen: w.is_fullscreen(),
            })
            .unwrap_or_default();

        GameContext {
            actors: &mut self.actors,
            input: self.input.state(),
            physics: self.subsystems.physics.as_mut(),
            assets: self.subsystems.assets.as_mut(),
            audio: self.subsystems.audio.as_mut(),
            time_of_day: self.subsystems.time_of_day.as_mut(),
            window,
            commands: &mut self.commands,
        }
    }

    fn respond(&mut self, response: WindowResponse) {
        match response {
            WindowResponse::None => {}
            WindowResponse::Resized(size) => self.subsystems.renderer.on_window_resized(size),
            WindowResponse::Quit => self.active = false,
        }
    }

    fn set_fullscreen(&mut self, enable: bool) -> Result<()> {
        let Some(window) = self.window.as_mut() else {
            return Ok(());
        };
        let response = window.set_fullscreen(enable)?;
        self.respond(response);
        Ok(())
    }

    fn toggle_fullscreen(&mut self) -> Result<()> {
        let fullscreen = self.window.as_ref().is_some_and(|w| w.is_fullscreen());
        self.set_fullscreen(!fullscreen)
    }

    fn apply_commands(&mut self) {
        let commands = std::mem::take(&mut self.commands);
        for command in commands {
            let result = match command {
                AppCommand::SetFullscreen(enable) => self.set_fullscreen(enable),
                AppCommand::ToggleFullscreen => self.toggle_fullscreen(),
                AppCommand::Quit => {
                    self.active = false;
                    Ok(())
                }
            };
            if let Err(e) = result {
                log::error!("failed to apply {:?}: {}", command, e);
            }
        }
    }
}

/// Owns the window, the subsystems, and the actors, and drives the frame loop.
///
/// ```rust,ignore
/// let mut app = Application::new(Subsystems::headless(), MyGame::default());
/// app.initialize(&mut platform)?;
/// app.run_loop(&mut events);
/// app.shutdown();
/// ```
pub struct Application<W: WindowBackend, G: Game> {
    core: AppCore<W>,
    game: G,
}

impl<W: WindowBackend, G: Game> Application<W, G> {
    pub fn new(subsystems: Subsystems<W>, game: G) -> Self {
        Self {
            core: AppCore {
                settings_path: PathBuf::from(Settings::default_path()),
                preset_settings: None,
                settings: Settings::default(),
                subsystems,
                window: None,
                input: InputSystem::new(),
                actors: ActorRegistry::new(),
                draw_list: DrawList::new(),
                scheduler: FrameScheduler::new(),
                commands: Vec::new(),
                stage: Stage::Uninit,
                released: false,
                active: false,
                paused: false,
            },
            game,
        }
    }

    /// Read settings from `path` instead of the default location
    pub fn with_settings_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.core.settings_path = path.into();
        self
    }

    /// Use these settings and skip the settings file entirely
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.core.preset_settings = Some(settings);
        self
    }

    pub fn with_scheduler(mut self, scheduler: FrameScheduler) -> Self {
        self.core.scheduler = scheduler;
        self
    }

    /// Bring every subsystem up, then load the game.
    ///
    /// On error the loop must not be entered; [`shutdown`](Self::shutdown)
    /// still releases whatever was started.
    pub fn initialize<P: Platform<Window = W>>(&mut self, platform: &mut P) -> Result<()> {
        if self.core.stage != Stage::Uninit || self.core.released {
            return Err(KilnError::Lifecycle(
                "initialize called more than once".to_string(),
            ));
        }

        let core = &mut self.core;
        core.settings = match core.preset_settings.take() {
            Some(settings) => settings,
            None => Settings::load_or_default(&core.settings_path),
        };

        let descriptor = WindowDescriptor {
            title: core.settings.title.clone(),
            size: core.settings.screen_size(),
            resizable: true,
        };
        let window = platform.create_window(&descriptor)?;
        let window = core
            .window
            .insert(WindowAdapter::new(window, core.settings.lock_aspect));
        window.backend_mut().center();
        core.stage = Stage::Window;
        log::info!(
            "created window '{}' ({}x{} logical, {}x{} pixels)",
            descriptor.title,
            window.logical_size().width,
            window.logical_size().height,
            window.pixel_size().width,
            window.pixel_size().height
        );

        core.subsystems.renderer.initialize(window.backend())?;
        core.stage = Stage::Renderer;
        core.subsystems.renderer.on_window_resized(window.pixel_size());
        log::debug!("renderer initialized");

        let display_scale = window.backend().scale_factor();

        core.input.initialize();
        core.stage = Stage::Input;

        core.subsystems.physics.initialize()?;
        core.stage = Stage::Physics;
        log::debug!("physics initialized");

        core.subsystems.assets.initialize()?;
        if let Some(path) = core.settings.assets_path.as_deref() {
            core.subsystems.assets.set_assets_path(path);
        }
        core.subsystems.assets.set_display_scale(display_scale);
        core.stage = Stage::Assets;
        log::debug!("assets initialized");

        core.subsystems.audio.initialize()?;
        core.stage = Stage::Audio;
        log::debug!("audio initialized");

        core.subsystems.time_of_day.initialize()?;
        core.stage = Stage::TimeOfDay;
        log::debug!("time of day initialized");

        if core.settings.fullscreen {
            if let Err(e) = core.set_fullscreen(true) {
                log::warn!("could not start in fullscreen: {}", e);
            }
        }

        self.game.load_data(&mut core.context())?;
        core.apply_commands();
        self.game.init_game(&mut core.context());
        core.apply_commands();

        core.stage = Stage::Ready;
        core.active = true;
        core.paused = false;
        core.scheduler.prime();
        log::info!("application initialized");
        Ok(())
    }

    /// Run frames until something clears the active flag
    pub fn run_loop(&mut self, events: &mut dyn EventSource) {
        while self.core.active {
            self.run_frame(events);
        }
    }

    /// One iteration: input, update, draw. Does nothing once inactive.
    pub fn run_frame(&mut self, events: &mut dyn EventSource) -> Option<FrameTime> {
        if !self.core.active {
            return None;
        }
        self.process_input(events);
        let time = self.update_frame();
        self.draw_frame();
        Some(time)
    }

    /// Runs while paused too, so the last state stays on screen
    fn draw_frame(&mut self) {
        let core = &mut self.core;
        core.draw_list.clear();
        core.actors.draw_all(&mut core.draw_list);
        core.subsystems.renderer.draw(&core.draw_list);
    }

    fn process_input(&mut self, events: &mut dyn EventSource) {
        let core = &mut self.core;
        core.input.prepare_for_update();

        while let Some(event) = events.poll_event() {
            core.input.handle_event(&event);

            if let PlatformEvent::KeyDown {
                key: KeyCode::Enter | KeyCode::NumpadEnter,
                alt: true,
                repeat: false,
            } = event
            {
                if let Err(e) = core.toggle_fullscreen() {
                    log::error!("fullscreen toggle failed: {}", e);
                }
            }

            let response = match core.window.as_mut() {
                Some(window) => window.handle_event(&event),
                None => WindowResponse::None,
            };
            core.respond(response);
        }

        core.input.update();
        let state = core.input.state();
        if state.key_state(KeyCode::Escape) == ButtonState::Released {
            core.active = false;
        }
        core.paused = state.key_state(KeyCode::Space) == ButtonState::Held;

        core.actors.process_input(core.input.state());
    }

    fn update_frame(&mut self) -> FrameTime {
        let time = self.core.scheduler.tick();
        if self.core.paused {
            return time;
        }
        let dt = time.delta_seconds();

        let core = &mut self.core;
        core.subsystems.time_of_day.update(dt);

        self.game.update_game(&mut core.context(), dt);
        core.apply_commands();

        core.subsystems.physics.test();
        core.actors.update_all(dt);
        core.actors.reconcile();

        let listener = core.subsystems.renderer.inv_view_matrix();
        core.subsystems.audio.update(dt, &listener);
        core.subsystems.assets.update(dt);

        time
    }

    /// Release everything that was brought up, newest first. Safe to call
    /// after a failed [`initialize`](Self::initialize) and more than once.
    pub fn shutdown(&mut self) {
        if self.core.released {
            return;
        }
        self.core.released = true;
        self.core.active = false;

        let stage = self.core.stage;
        if stage == Stage::Uninit {
            return;
        }

        if stage == Stage::Ready {
            self.game.shutdown_game(&mut self.core.context());
            self.core.commands.clear();
        }

        let core = &mut self.core;
        core.actors.clear();
        core.draw_list.clear();
        if stage >= Stage::Renderer {
            core.subsystems.renderer.unload_data();
        }
        if stage >= Stage::Assets {
            core.subsystems.assets.unload_data();
        }

        if stage >= Stage::TimeOfDay {
            core.subsystems.time_of_day.shutdown();
        }
        if stage >= Stage::Audio {
            core.subsystems.audio.shutdown();
        }
        if stage >= Stage::Assets {
            core.subsystems.assets.shutdown();
        }
        if stage >= Stage::Physics {
            core.subsystems.physics.shutdown();
        }
        if stage >= Stage::Input {
            core.input.shutdown();
        }
        if stage >= Stage::Renderer {
            core.subsystems.renderer.shutdown();
        }
        core.window = None;
        core.stage = Stage::Uninit;
        log::info!("application shut down");
    }

    pub fn set_fullscreen(&mut self, enable: bool) -> Result<()> {
        self.core.set_fullscreen(enable)
    }

    pub fn toggle_fullscreen(&mut self) -> Result<()> {
        self.core.toggle_fullscreen()
    }

    /// Stop the loop after the current frame
    pub fn quit(&mut self) {
        self.core.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.core.active
    }

    pub fn is_paused(&self) -> bool {
        self.core.paused
    }

    pub fn is_initialized(&self) -> bool {
        self.core.stage == Stage::Ready
    }

    /// Frames ticked by the scheduler so far, paused frames included
    pub fn frame_count(&self) -> u64 {
        self.core.scheduler.frame()
    }

    pub fn settings(&self) -> &Settings {
        &self.core.settings
    }

    pub fn window(&self) -> Option<&WindowAdapter<W>> {
        self.core.window.as_ref()
    }

    pub fn actors(&self) -> &ActorRegistry {
        &self.core.actors
    }

    pub fn actors_mut(&mut self) -> &mut ActorRegistry {
        &mut self.core.actors
    }

    pub fn input(&self) -> &InputState {
        self.core.input.state()
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut G {
        &mut self.game
    }
}

impl<W: WindowBackend, G: Game> Drop for Application<W, G> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{Actor, ActorBase, ActorState};
    use crate::draw::Shape;
    use crate::event_queue::EventQueue;
    use crate::registry::ActorContext;
    use crate::scheduler::{Clock, ManualClock};
    use crate::test_support::{CallLog, MockPlatform, MockWindow, Recorder, MOCK_DISPLAY};
    use kiln_core::Color;
    use std::time::Duration;

    #[derive(Default)]
    struct ScriptedGame {
        log: CallLog,
        fail_load: bool,
        quit_after: Option<u32>,
        fullscreen_on_init: bool,
        updates: u32,
    }

    impl ScriptedGame {
        fn new(log: &CallLog) -> Self {
            Self {
                log: log.clone(),
                ..Self::default()
            }
        }

        fn record(&self, entry: &str) {
            self.log.borrow_mut().push(entry.to_string());
        }
    }

    impl Game for ScriptedGame {
        fn load_data(&mut self, _ctx: &mut GameContext<'_>) -> Result<()> {
            self.record("game.load");
            if self.fail_load {
                return Err(KilnError::Lifecycle("missing level".to_string()));
            }
            Ok(())
        }

        fn init_game(&mut self, ctx: &mut GameContext<'_>) {
            self.record("game.init");
            if self.fullscreen_on_init {
                ctx.set_fullscreen(true);
            }
        }

        fn update_game(&mut self, ctx: &mut GameContext<'_>, _dt: f32) {
            self.record("game.update");
            self.updates += 1;
            if self.quit_after == Some(self.updates) {
                ctx.quit();
            }
        }

        fn shutdown_game(&mut self, _ctx: &mut GameContext<'_>) {
            self.record("game.shutdown");
        }
    }

    struct Ticker {
        base: ActorBase,
        log: CallLog,
    }

    impl Actor for Ticker {
        fn base(&self) -> &ActorBase {
            &self.base
        }

        fn base_mut(&mut self) -> &mut ActorBase {
            &mut self.base
        }

        fn update_actor(&mut self, _ctx: &mut ActorContext<'_>, _dt: f32) {
            self.log.borrow_mut().push("actor.update".to_string());
        }
    }

    /// Draws a single cube at its world transform
    #[derive(Default)]
    struct Painter {
        base: ActorBase,
    }

    impl Actor for Painter {
        fn base(&self) -> &ActorBase {
            &self.base
        }

        fn base_mut(&mut self) -> &mut ActorBase {
            &mut self.base
        }

        fn draw_actor(&self, out: &mut DrawList) {
            out.submit(Shape::Cube, *self.base.world_transform(), Color::WHITE);
        }
    }

    fn recorders(log: &CallLog) -> Subsystems<MockWindow> {
        Subsystems {
            renderer: Box::new(Recorder::new("renderer", log)),
            physics: Box::new(Recorder::new("physics", log)),
            assets: Box::new(Recorder::new("assets", log)),
            audio: Box::new(Recorder::new("audio", log)),
            time_of_day: Box::new(Recorder::new("time", log)),
        }
    }

    fn new_app(
        log: &CallLog,
        game: ScriptedGame,
    ) -> (Application<MockWindow, ScriptedGame>, ManualClock) {
        let clock = ManualClock::new();
        let app = Application::new(recorders(log), game)
            .with_settings(Settings::default())
            .with_scheduler(FrameScheduler::with_clock(clock.clone()));
        (app, clock)
    }

    fn key_down(key: KeyCode) -> PlatformEvent {
        PlatformEvent::KeyDown {
            key,
            alt: false,
            repeat: false,
        }
    }

    fn take(log: &CallLog) -> Vec<String> {
        std::mem::take(&mut *log.borrow_mut())
    }

    #[test]
    fn test_initialize_order() {
        let log = CallLog::default();
        let (mut app, _) = new_app(&log, ScriptedGame::new(&log));
        let mut platform = MockPlatform::new(&log);

        app.initialize(&mut platform).unwrap();
        assert!(app.is_active());
        assert!(app.is_initialized());
        assert_eq!(
            take(&log),
            vec![
                "window.create",
                "renderer.init",
                "renderer.resized(1280x720)",
                "physics.init",
                "assets.init",
                "audio.init",
                "time.init",
                "game.load",
                "game.init",
            ]
        );

        let window = app.window().unwrap();
        assert!((window.target_aspect() - 1280.0 / 720.0).abs() < 1e-12);
        assert_eq!(window.backend().centered(), 1);
        let created = platform.created.unwrap();
        assert_eq!(created.title, "Kiln");
        assert_eq!(created.size, Size::new(1280, 720));
    }

    #[test]
    fn test_initialize_twice_is_error() {
        let log = CallLog::default();
        let (mut app, _) = new_app(&log, ScriptedGame::new(&log));
        let mut platform = MockPlatform::new(&log);
        app.initialize(&mut platform).unwrap();
        assert!(matches!(
            app.initialize(&mut platform),
            Err(KilnError::Lifecycle(_))
        ));
    }

    #[test]
    fn test_settings_shape_the_window() {
        let log = CallLog::default();
        let settings = Settings {
            title: "Orbit".to_string(),
            assets_path: Some("Content".to_string()),
            ..Settings::default()
        };
        let mut app = Application::new(recorders(&log), ScriptedGame::new(&log))
            .with_settings(settings)
            .with_scheduler(FrameScheduler::with_clock(ManualClock::new()));
        let mut platform = MockPlatform::new(&log);
        app.initialize(&mut platform).unwrap();

        assert_eq!(app.settings().title, "Orbit");
        assert!(log.borrow().contains(&"assets.path(Content)".to_string()));
    }

    #[test]
    fn test_missing_settings_file_falls_back() {
        let log = CallLog::default();
        let dir = tempfile::tempdir().unwrap();
        let mut app = Application::new(recorders(&log), ScriptedGame::new(&log))
            .with_settings_path(dir.path().join("nope.json"))
            .with_scheduler(FrameScheduler::with_clock(ManualClock::new()));
        let mut platform = MockPlatform::new(&log);

        app.initialize(&mut platform).unwrap();
        assert_eq!(app.settings(), &Settings::default());
    }

    #[test]
    fn test_window_failure_is_fatal() {
        let log = CallLog::default();
        let (mut app, _) = new_app(&log, ScriptedGame::new(&log));
        let mut platform = MockPlatform::new(&log);
        platform.fail = true;

        assert!(matches!(app.initialize(&mut platform), Err(KilnError::Window(_))));
        assert!(!app.is_active());
        assert!(app.run_frame(&mut EventQueue::new()).is_none());

        app.shutdown();
        assert!(take(&log).is_empty());
    }

    #[test]
    fn test_partial_init_shuts_down_only_what_started() {
        let log = CallLog::default();
        let mut subsystems = recorders(&log);
        subsystems.assets = Box::new(Recorder::failing("assets", &log));
        let mut app = Application::new(subsystems, ScriptedGame::new(&log))
            .with_settings(Settings::default())
            .with_scheduler(FrameScheduler::with_clock(ManualClock::new()));
        let mut platform = MockPlatform::new(&log);

        let err = app.initialize(&mut platform).unwrap_err();
        assert!(matches!(err, KilnError::Subsystem { .. }));
        assert!(!app.is_active());
        take(&log);

        app.shutdown();
        assert_eq!(
            take(&log),
            vec!["renderer.unload", "physics.shutdown", "renderer.shutdown"]
        );
        assert!(app.window().is_none());
    }

    #[test]
    fn test_failed_load_skips_game_shutdown() {
        let log = CallLog::default();
        let mut game = ScriptedGame::new(&log);
        game.fail_load = true;
        let (mut app, _) = new_app(&log, game);
        let mut platform = MockPlatform::new(&log);

        assert!(app.initialize(&mut platform).is_err());
        take(&log);
        app.shutdown();
        let calls = take(&log);
        assert!(!calls.contains(&"game.shutdown".to_string()));
        assert!(calls.contains(&"time.shutdown".to_string()));
    }

    #[test]
    fn test_frame_hook_order() {
        let log = CallLog::default();
        let (mut app, _) = new_app(&log, ScriptedGame::new(&log));
        app.initialize(&mut MockPlatform::new(&log)).unwrap();
        app.actors_mut().create(Ticker {
            base: ActorBase::new(),
            log: log.clone(),
        });
        take(&log);

        app.run_frame(&mut EventQueue::new());
        assert_eq!(
            take(&log),
            vec![
                "time.update",
                "game.update",
                "physics.test",
                "actor.update",
                "audio.update",
                "renderer.draw",
            ]
        );
    }

    #[test]
    fn test_draw_phase_sends_active_actors_in_order() {
        let log = CallLog::default();
        let (mut app, _) = new_app(&log, ScriptedGame::new(&log));
        app.initialize(&mut MockPlatform::new(&log)).unwrap();
        let a = app.actors_mut().create(Painter::default());
        let b = app.actors_mut().create(Painter::default());
        let c = app.actors_mut().create(Painter::default());
        let d = app.actors_mut().create(Painter::default());
        app.actors_mut().set_state(b, ActorState::Paused);
        app.actors_mut().destroy(d);
        take(&log);

        app.run_frame(&mut EventQueue::new());
        let calls = take(&log);
        let draw = calls.iter().position(|call| call == "renderer.draw").unwrap();
        assert_eq!(
            calls[draw..].to_vec(),
            vec![
                "renderer.draw".to_string(),
                format!("renderer.item({})", a),
                format!("renderer.item({})", c),
            ]
        );

        // Holding Space pauses updates but the scene is still drawn.
        let mut events = EventQueue::new();
        events.push(key_down(KeyCode::Space));
        app.run_frame(&mut events);
        app.run_frame(&mut events);
        assert!(app.is_paused());
        let calls = take(&log);
        let last = calls.iter().rposition(|call| call == "renderer.draw").unwrap();
        assert_eq!(calls.len() - last, 3);
    }

    #[test]
    fn test_frame_delta_is_clamped() {
        let log = CallLog::default();
        let (mut app, clock) = new_app(&log, ScriptedGame::new(&log));
        app.initialize(&mut MockPlatform::new(&log)).unwrap();

        clock.advance(Duration::from_secs(3));
        let time = app.run_frame(&mut EventQueue::new()).unwrap();
        assert_eq!(time.delta, FrameScheduler::DEFAULT_MAX_DELTA);
        assert!(time.was_clamped());
    }

    #[test]
    fn test_quit_event_ends_loop() {
        let log = CallLog::default();
        let (mut app, _) = new_app(&log, ScriptedGame::new(&log));
        app.initialize(&mut MockPlatform::new(&log)).unwrap();

        let mut events = EventQueue::new();
        events.push(PlatformEvent::Quit);
        app.run_loop(&mut events);

        assert!(!app.is_active());
        assert_eq!(app.frame_count(), 1);
    }

    #[test]
    fn test_escape_release_quits() {
        let log = CallLog::default();
        let (mut app, _) = new_app(&log, ScriptedGame::new(&log));
        app.initialize(&mut MockPlatform::new(&log)).unwrap();

        let mut events = EventQueue::new();
        events.push(key_down(KeyCode::Escape));
        app.run_frame(&mut events);
        assert!(app.is_active());

        events.push(PlatformEvent::KeyUp { key: KeyCode::Escape });
        app.run_frame(&mut events);
        assert!(!app.is_active());
        assert!(app.run_frame(&mut events).is_none());
    }

    #[test]
    fn test_game_quit_command() {
        let log = CallLog::default();
        let mut game = ScriptedGame::new(&log);
        game.quit_after = Some(3);
        let (mut app, _) = new_app(&log, game);
        app.initialize(&mut MockPlatform::new(&log)).unwrap();

        app.run_loop(&mut EventQueue::new());
        assert_eq!(app.game().updates, 3);
        assert_eq!(app.frame_count(), 3);
    }

    #[test]
    fn test_pause_skips_update_but_keeps_pacing() {
        let log = CallLog::default();
        let (mut app, clock) = new_app(&log, ScriptedGame::new(&log));
        app.initialize(&mut MockPlatform::new(&log)).unwrap();

        let mut events = EventQueue::new();
        events.push(key_down(KeyCode::Space));
        app.run_frame(&mut events);
        assert!(!app.is_paused());
        take(&log);

        let before = clock.now();
        app.run_frame(&mut events);
        assert!(app.is_paused());
        assert_eq!(take(&log), vec!["renderer.draw"]);
        assert!(clock.now() - before >= FrameScheduler::DEFAULT_TARGET_INTERVAL);
        assert_eq!(app.frame_count(), 2);

        events.push(PlatformEvent::KeyUp { key: KeyCode::Space });
        app.run_frame(&mut events);
        assert!(!app.is_paused());
        assert!(take(&log).contains(&"game.update".to_string()));
    }

    #[test]
    fn test_resize_notifies_renderer() {
        let log = CallLog::default();
        let (mut app, _) = new_app(&log, ScriptedGame::new(&log));
        app.initialize(&mut MockPlatform::new(&log)).unwrap();
        take(&log);

        let mut events = EventQueue::new();
        events.push(PlatformEvent::PixelSizeChanged);
        app.run_frame(&mut events);
        assert_eq!(take(&log)[0], "renderer.resized(1280x720)");

        // A too-wide drag is corrected and not forwarded until confirmed.
        events.push(PlatformEvent::Resized(Size::new(1000, 500)));
        app.run_frame(&mut events);
        let calls = take(&log);
        assert!(!calls.iter().any(|c| c.starts_with("renderer.resized")));
        assert_eq!(app.window().unwrap().backend().requests(), &[Size::new(889, 500)]);
    }

    #[test]
    fn test_alt_enter_toggles_fullscreen() {
        let log = CallLog::default();
        let (mut app, _) = new_app(&log, ScriptedGame::new(&log));
        app.initialize(&mut MockPlatform::new(&log)).unwrap();
        take(&log);

        let alt_enter = PlatformEvent::KeyDown {
            key: KeyCode::Enter,
            alt: true,
            repeat: false,
        };
        let mut events = EventQueue::new();
        events.push(alt_enter.clone());
        app.run_frame(&mut events);
        assert!(app.window().unwrap().is_fullscreen());
        let expected = format!("renderer.resized({}x{})", MOCK_DISPLAY.width, MOCK_DISPLAY.height);
        assert_eq!(take(&log)[0], expected);

        // Auto-repeat and plain Enter do nothing.
        events.push(PlatformEvent::KeyDown {
            key: KeyCode::Enter,
            alt: true,
            repeat: true,
        });
        events.push(key_down(KeyCode::NumpadEnter));
        app.run_frame(&mut events);
        assert!(app.window().unwrap().is_fullscreen());

        events.push(alt_enter);
        app.run_frame(&mut events);
        let window = app.window().unwrap();
        assert!(!window.is_fullscreen());
        assert_eq!(window.backend().requests(), &[Size::new(1280, 720)]);
        // Once on creation, once after the restore.
        assert_eq!(window.backend().centered(), 2);
    }

    #[test]
    fn test_fullscreen_from_settings_and_game() {
        let log = CallLog::default();
        let settings = Settings {
            fullscreen: true,
            ..Settings::default()
        };
        let mut app = Application::new(recorders(&log), ScriptedGame::new(&log))
            .with_settings(settings)
            .with_scheduler(FrameScheduler::with_clock(ManualClock::new()));
        app.initialize(&mut MockPlatform::new(&log)).unwrap();
        let window = app.window().unwrap();
        assert!(window.is_fullscreen());
        assert_eq!(window.windowed_size(), Size::new(1280, 720));

        let log = CallLog::default();
        let mut game = ScriptedGame::new(&log);
        game.fullscreen_on_init = true;
        let (mut app, _) = new_app(&log, game);
        app.initialize(&mut MockPlatform::new(&log)).unwrap();
        assert!(app.window().unwrap().is_fullscreen());
    }

    #[test]
    fn test_shutdown_reverse_order_and_idempotent() {
        let log = CallLog::default();
        let (mut app, _) = new_app(&log, ScriptedGame::new(&log));
        app.initialize(&mut MockPlatform::new(&log)).unwrap();
        app.actors_mut().create(Ticker {
            base: ActorBase::new(),
            log: log.clone(),
        });
        take(&log);

        app.shutdown();
        assert_eq!(
            take(&log),
            vec![
                "game.shutdown",
                "renderer.unload",
                "assets.unload",
                "time.shutdown",
                "audio.shutdown",
                "assets.shutdown",
                "physics.shutdown",
                "renderer.shutdown",
            ]
        );
        assert!(app.actors().is_empty());
        assert!(app.window().is_none());
        assert!(!app.is_active());

        app.shutdown();
        drop(app);
        assert!(take(&log).is_empty());
    }

    #[test]
    fn test_unit_game_runs_headless() {
        let mut app: Application<MockWindow, ()> = Application::new(Subsystems::headless(), ())
            .with_settings(Settings::default())
            .with_scheduler(FrameScheduler::with_clock(ManualClock::new()));
        app.initialize(&mut MockPlatform::new(&CallLog::default()))
            .unwrap();
        assert!(app.run_frame(&mut EventQueue::new()).is_some());
    }
}

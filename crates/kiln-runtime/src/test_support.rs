//! In-memory window and subsystem doubles for unit tests

use std::cell::RefCell;
use std::rc::Rc;

use kiln_core::{KilnError, Mat4, Result, Size};

use crate::draw::DrawList;
use crate::subsystem::{
    AssetManager, PhysicsWorld, Platform, Renderer, SoundMixer, TimeOfDay, WindowDescriptor,
};
use crate::window::{ResizeOutcome, WindowBackend};

/// Backbuffer size reported while fullscreen
pub const MOCK_DISPLAY: Size = Size::new(2560, 1440);

/// A window that records every command it receives.
///
/// By default size requests are left pending, like an OS that confirms them
/// with a later notification; [`apply_pending`](Self::apply_pending) plays that part.
#[derive(Debug)]
pub struct MockWindow {
    logical: Size,
    scale: f64,
    fullscreen: bool,
    apply_immediately: bool,
    fail_fullscreen: bool,
    pending: Option<Size>,
    requests: Vec<Size>,
    centered: usize,
    fullscreen_calls: usize,
}

impl MockWindow {
    pub fn new(logical: Size) -> Self {
        Self {
            logical,
            scale: 1.0,
            fullscreen: false,
            apply_immediately: false,
            fail_fullscreen: false,
            pending: None,
            requests: Vec::new(),
            centered: 0,
            fullscreen_calls: 0,
        }
    }

    /// Simulate the user dragging the window to `size`
    pub fn set_logical(&mut self, size: Size) {
        self.logical = size;
    }

    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
    }

    pub fn apply_immediately(&mut self, enable: bool) {
        self.apply_immediately = enable;
    }

    pub fn fail_fullscreen(&mut self, fail: bool) {
        self.fail_fullscreen = fail;
    }

    /// Apply the outstanding size request, returning the size to report back
    pub fn apply_pending(&mut self) -> Option<Size> {
        let size = self.pending.take()?;
        self.logical = size;
        Some(size)
    }

    pub fn requests(&self) -> &[Size] {
        &self.requests
    }

    pub fn centered(&self) -> usize {
        self.centered
    }

    pub fn fullscreen_calls(&self) -> usize {
        self.fullscreen_calls
    }
}

impl WindowBackend for MockWindow {
    fn logical_size(&self) -> Size {
        self.logical
    }

    fn pixel_size(&self) -> Size {
        if self.fullscreen {
            return MOCK_DISPLAY;
        }
        Size::new(
            (f64::from(self.logical.width) * self.scale).round() as u32,
            (f64::from(self.logical.height) * self.scale).round() as u32,
        )
    }

    fn scale_factor(&self) -> f64 {
        self.scale
    }

    fn request_logical_size(&mut self, size: Size) -> ResizeOutcome {
        self.requests.push(size);
        if self.apply_immediately {
            self.logical = size;
            ResizeOutcome::Applied
        } else {
            self.pending = Some(size);
            ResizeOutcome::Pending
        }
    }

    fn set_fullscreen(&mut self, enable: bool) -> Result<()> {
        if self.fail_fullscreen {
            return Err(KilnError::Window("display mode change rejected".to_string()));
        }
        self.fullscreen_calls += 1;
        self.fullscreen = enable;
        Ok(())
    }

    fn center(&mut self) {
        self.centered += 1;
    }
}

pub type CallLog = Rc<RefCell<Vec<String>>>;

/// Creates [`MockWindow`]s and logs that it did
pub struct MockPlatform {
    pub log: CallLog,
    pub fail: bool,
    pub scale: f64,
    pub created: Option<WindowDescriptor>,
}

impl MockPlatform {
    pub fn new(log: &CallLog) -> Self {
        Self {
            log: log.clone(),
            fail: false,
            scale: 1.0,
            created: None,
        }
    }
}

impl Platform for MockPlatform {
    type Window = MockWindow;

    fn create_window(&mut self, descriptor: &WindowDescriptor) -> Result<MockWindow> {
        if self.fail {
            return Err(KilnError::Window("no display".to_string()));
        }
        self.log.borrow_mut().push("window.create".to_string());
        self.created = Some(descriptor.clone());
        let mut window = MockWindow::new(descriptor.size);
        window.set_scale(self.scale);
        Ok(window)
    }
}

/// One double for every subsystem interface, logging `"<name>.<call>"`
pub struct Recorder {
    name: &'static str,
    log: CallLog,
    fail_init: bool,
    hour: f32,
}

impl Recorder {
    pub fn new(name: &'static str, log: &CallLog) -> Self {
        Self {
            name,
            log: log.clone(),
            fail_init: false,
            hour: 0.0,
        }
    }

    pub fn failing(name: &'static str, log: &CallLog) -> Self {
        Self {
            fail_init: true,
            ..Self::new(name, log)
        }
    }

    fn record(&self, call: &str) {
        self.log.borrow_mut().push(format!("{}.{}", self.name, call));
    }

    fn init(&self) -> Result<()> {
        self.record("init");
        if self.fail_init {
            return Err(KilnError::subsystem(self.name, "refused to start"));
        }
        Ok(())
    }
}

impl Renderer<MockWindow> for Recorder {
    fn initialize(&mut self, _window: &MockWindow) -> Result<()> {
        self.init()
    }

    fn on_window_resized(&mut self, size: Size) {
        self.record(&format!("resized({}x{})", size.width, size.height));
    }

    fn draw(&mut self, scene: &DrawList) {
        self.record("draw");
        for item in scene.items() {
            match item.actor {
                Some(id) => self.record(&format!("item({})", id)),
                None => self.record("item"),
            }
        }
    }

    fn unload_data(&mut self) {
        self.record("unload");
    }

    fn shutdown(&mut self) {
        self.record("shutdown");
    }
}

impl PhysicsWorld for Recorder {
    fn initialize(&mut self) -> Result<()> {
        self.init()
    }

    fn test(&mut self) {
        self.record("test");
    }

    fn shutdown(&mut self) {
        self.record("shutdown");
    }
}

impl AssetManager for Recorder {
    fn initialize(&mut self) -> Result<()> {
        self.init()
    }

    fn set_assets_path(&mut self, path: &str) {
        self.record(&format!("path({})", path));
    }

    fn unload_data(&mut self) {
        self.record("unload");
    }

    fn shutdown(&mut self) {
        self.record("shutdown");
    }
}

impl SoundMixer for Recorder {
    fn initialize(&mut self) -> Result<()> {
        self.init()
    }

    fn update(&mut self, _dt: f32, _listener: &Mat4) {
        self.record("update");
    }

    fn shutdown(&mut self) {
        self.record("shutdown");
    }
}

impl TimeOfDay for Recorder {
    fn initialize(&mut self) -> Result<()> {
        self.init()
    }

    fn update(&mut self, dt: f32) {
        self.hour += dt;
        self.record("update");
    }

    fn hour(&self) -> f32 {
        self.hour
    }

    fn shutdown(&mut self) {
        self.record("shutdown");
    }
}

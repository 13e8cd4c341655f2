//! Device-free subsystem implementations
//!
//! Used when no GPU or audio device is wanted: tests, servers, and tools that
//! want the frame loop without presenting anything.

use kiln_core::{Mat4, Result, Size};

use crate::draw::DrawList;
use crate::subsystem::{AssetManager, PhysicsWorld, Renderer, SoundMixer};

/// A renderer that only counts what it was asked to do
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    size: Size,
    frames: u64,
    items: u64,
    resizes: u32,
    initialized: bool,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last drawable size reported by the window
    pub fn size(&self) -> Size {
        self.size
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames
    }

    /// Draw items received over every frame
    pub fn items_drawn(&self) -> u64 {
        self.items
    }

    pub fn resize_count(&self) -> u32 {
        self.resizes
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}

impl<W> Renderer<W> for HeadlessRenderer {
    fn initialize(&mut self, _window: &W) -> Result<()> {
        self.initialized = true;
        Ok(())
    }

    fn on_window_resized(&mut self, size: Size) {
        self.size = size;
        self.resizes += 1;
    }

    fn draw(&mut self, scene: &DrawList) {
        self.frames += 1;
        self.items += scene.len() as u64;
    }

    fn shutdown(&mut self) {
        self.initialized = false;
    }

    fn projection_matrix(&self) -> Mat4 {
        let aspect = self.size.aspect().unwrap_or(16.0 / 9.0) as f32;
        Mat4::perspective_rh(std::f32::consts::FRAC_PI_4, aspect, 0.1, 1000.0)
    }
}

/// Physics that never finds a contact
#[derive(Debug, Default)]
pub struct NullPhysics {
    passes: u64,
}

impl NullPhysics {
    pub fn passes(&self) -> u64 {
        self.passes
    }
}

impl PhysicsWorld for NullPhysics {
    fn test(&mut self) {
        self.passes += 1;
    }
}

/// Asset manager that remembers its configuration and loads nothing
#[derive(Debug)]
pub struct NullAssets {
    path: String,
    display_scale: f64,
}

impl Default for NullAssets {
    fn default() -> Self {
        Self {
            path: String::from("Assets"),
            display_scale: 1.0,
        }
    }
}

impl NullAssets {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn display_scale(&self) -> f64 {
        self.display_scale
    }
}

impl AssetManager for NullAssets {
    fn set_assets_path(&mut self, path: &str) {
        self.path = path.to_string();
    }

    fn set_display_scale(&mut self, scale: f64) {
        self.display_scale = scale;
    }
}

/// Sound mixer that tracks the listener but plays nothing
#[derive(Debug)]
pub struct SilentMixer {
    listener: Mat4,
}

impl Default for SilentMixer {
    fn default() -> Self {
        Self {
            listener: Mat4::IDENTITY,
        }
    }
}

impl SilentMixer {
    pub fn listener(&self) -> &Mat4 {
        &self.listener
    }
}

impl SoundMixer for SilentMixer {
    fn update(&mut self, _dt: f32, listener: &Mat4) {
        self.listener = *listener;
    }
}

//! Interfaces to the subsystems the application lifecycle drives
//!
//! The lifecycle only sequences these; what a renderer draws or how physics
//! resolves contacts is up to the implementation. Everything except the calls
//! the lifecycle cannot do without has a no-op default.

use kiln_core::{Mat4, Result, Size};

use crate::draw::DrawList;
use crate::headless::{HeadlessRenderer, NullAssets, NullPhysics, SilentMixer};
use crate::time_of_day::DayCycle;
use crate::window::WindowBackend;

/// Parameters for the main window
#[derive(Debug, Clone, PartialEq)]
pub struct WindowDescriptor {
    pub title: String,
    /// Initial client size in logical units
    pub size: Size,
    pub resizable: bool,
}

/// Creates the native window. Failure here is fatal to startup.
pub trait Platform {
    type Window: WindowBackend;

    fn create_window(&mut self, descriptor: &WindowDescriptor) -> Result<Self::Window>;
}

/// Draws the scene into a window of type `W`
#[allow(unused_variables)]
pub trait Renderer<W> {
    fn initialize(&mut self, window: &W) -> Result<()>;

    /// The drawable area is now `size` pixels
    fn on_window_resized(&mut self, size: Size);

    /// Render one frame from what the active actors submitted
    fn draw(&mut self, scene: &DrawList);

    /// Release GPU resources tied to loaded content
    fn unload_data(&mut self) {}

    fn shutdown(&mut self) {}

    fn view_matrix(&self) -> Mat4 {
        Mat4::IDENTITY
    }

    fn projection_matrix(&self) -> Mat4 {
        Mat4::IDENTITY
    }

    /// Inverse of the view matrix, i.e. the camera's world transform
    fn inv_view_matrix(&self) -> Mat4 {
        self.view_matrix().inverse()
    }
}

#[allow(unused_variables)]
pub trait PhysicsWorld {
    fn initialize(&mut self) -> Result<()> {
        Ok(())
    }

    /// Run one collision pass
    fn test(&mut self);

    fn shutdown(&mut self) {}
}

#[allow(unused_variables)]
pub trait AssetManager {
    fn initialize(&mut self) -> Result<()> {
        Ok(())
    }

    fn set_assets_path(&mut self, path: &str) {}

    /// Physical pixels per logical unit of the main window
    fn set_display_scale(&mut self, scale: f64) {}

    fn update(&mut self, dt: f32) {}

    fn unload_data(&mut self) {}

    fn shutdown(&mut self) {}
}

#[allow(unused_variables)]
pub trait SoundMixer {
    fn initialize(&mut self) -> Result<()> {
        Ok(())
    }

    /// Advance playback. `listener` is the camera's world transform.
    fn update(&mut self, dt: f32, listener: &Mat4) {}

    fn shutdown(&mut self) {}
}

#[allow(unused_variables)]
pub trait TimeOfDay {
    fn initialize(&mut self) -> Result<()> {
        Ok(())
    }

    fn update(&mut self, dt: f32);

    /// Current hour in `0.0..24.0`
    fn hour(&self) -> f32;

    fn shutdown(&mut self) {}
}

/// The full set of subsystems an [`Application`](crate::Application) owns
pub struct Subsystems<W> {
    pub renderer: Box<dyn Renderer<W>>,
    pub physics: Box<dyn PhysicsWorld>,
    pub assets: Box<dyn AssetManager>,
    pub audio: Box<dyn SoundMixer>,
    pub time_of_day: Box<dyn TimeOfDay>,
}

impl<W: 'static> Subsystems<W> {
    /// Device-free implementations of everything
    pub fn headless() -> Self {
        Self {
            renderer: Box::new(HeadlessRenderer::new()),
            physics: Box::new(NullPhysics::default()),
            assets: Box::new(NullAssets::default()),
            audio: Box::new(SilentMixer::default()),
            time_of_day: Box::new(DayCycle::default()),
        }
    }

    /// Headless everything except the renderer
    pub fn with_renderer(renderer: impl Renderer<W> + 'static) -> Self {
        Self {
            renderer: Box::new(renderer),
            ..Self::headless()
        }
    }
}

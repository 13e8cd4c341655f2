//! winit window backend and event translation

use std::sync::Arc;

use kiln_core::{KilnError, Result, Size};
use winit::dpi::{LogicalSize, PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::PhysicalKey;
use winit::window::{Fullscreen, Window, WindowId};

use crate::event_queue::{EventQueue, PlatformEvent};
use crate::subsystem::{Platform, WindowDescriptor};
use crate::window::{ResizeOutcome, WindowBackend};

/// A winit window shared with the renderer's surface
#[derive(Debug, Clone)]
pub struct WinitWindow {
    window: Arc<Window>,
}

impl WinitWindow {
    pub fn new(window: Arc<Window>) -> Self {
        Self { window }
    }

    /// Shared handle, e.g. for creating a GPU surface
    pub fn handle(&self) -> Arc<Window> {
        self.window.clone()
    }

    pub fn id(&self) -> WindowId {
        self.window.id()
    }
}

fn logical_from_physical(size: PhysicalSize<u32>, scale_factor: f64) -> Size {
    let logical: LogicalSize<f64> = size.to_logical(scale_factor);
    Size::new(logical.width.round() as u32, logical.height.round() as u32)
}

impl WindowBackend for WinitWindow {
    fn logical_size(&self) -> Size {
        logical_from_physical(self.window.inner_size(), self.window.scale_factor())
    }

    fn pixel_size(&self) -> Size {
        let size = self.window.inner_size();
        Size::new(size.width, size.height)
    }

    fn scale_factor(&self) -> f64 {
        self.window.scale_factor()
    }

    fn request_logical_size(&mut self, size: Size) -> ResizeOutcome {
        match self
            .window
            .request_inner_size(LogicalSize::new(size.width, size.height))
        {
            Some(_) => ResizeOutcome::Applied,
            None => ResizeOutcome::Pending,
        }
    }

    fn set_fullscreen(&mut self, enable: bool) -> Result<()> {
        if enable && self.window.current_monitor().is_none() {
            return Err(KilnError::Window(
                "no monitor available for fullscreen".to_string(),
            ));
        }
        let mode = enable.then_some(Fullscreen::Borderless(None));
        self.window.set_fullscreen(mode);
        Ok(())
    }

    fn center(&mut self) {
        let Some(monitor) = self.window.current_monitor() else {
            return;
        };
        let origin = monitor.position();
        let area = monitor.size();
        let outer = self.window.outer_size();

        let x = origin.x + (area.width as i32 - outer.width as i32) / 2;
        let y = origin.y + (area.height as i32 - outer.height as i32) / 2;
        self.window.set_outer_position(PhysicalPosition::new(x, y));
    }
}

/// Creates windows on the running winit event loop
pub struct WinitPlatform<'a> {
    event_loop: &'a ActiveEventLoop,
}

impl<'a> WinitPlatform<'a> {
    pub fn new(event_loop: &'a ActiveEventLoop) -> Self {
        Self { event_loop }
    }
}

impl Platform for WinitPlatform<'_> {
    type Window = WinitWindow;

    fn create_window(&mut self, descriptor: &WindowDescriptor) -> Result<WinitWindow> {
        let attributes = Window::default_attributes()
            .with_title(descriptor.title.clone())
            .with_inner_size(LogicalSize::new(
                descriptor.size.width,
                descriptor.size.height,
            ))
            .with_resizable(descriptor.resizable);

        let window = self
            .event_loop
            .create_window(attributes)
            .map_err(|e| KilnError::Window(format!("failed to create window: {}", e)))?;
        Ok(WinitWindow::new(Arc::new(window)))
    }
}

/// Turns winit window events into [`PlatformEvent`]s, tracking the Alt modifier.
#[derive(Debug, Default)]
pub struct EventTranslator {
    alt: bool,
}

impl EventTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the platform events for `event` on a window with the given scale factor
    pub fn translate(&mut self, event: &WindowEvent, scale_factor: f64, queue: &mut EventQueue) {
        match event {
            WindowEvent::CloseRequested => queue.push(PlatformEvent::Quit),
            WindowEvent::Resized(size) => {
                queue.push(PlatformEvent::Resized(logical_from_physical(*size, scale_factor)));
                queue.push(PlatformEvent::PixelSizeChanged);
            }
            WindowEvent::ScaleFactorChanged { .. } => queue.push(PlatformEvent::PixelSizeChanged),
            WindowEvent::ModifiersChanged(modifiers) => self.alt = modifiers.state().alt_key(),
            WindowEvent::Focused(false) => {
                self.alt = false;
                queue.push(PlatformEvent::FocusLost);
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if let Some(translated) = self.key(event.physical_key, event.state, event.repeat) {
                    queue.push(translated);
                }
            }
            _ => {}
        }
    }

    /// Key transition as a platform event. Keys without a physical code are dropped.
    pub fn key(&self, key: PhysicalKey, state: ElementState, repeat: bool) -> Option<PlatformEvent> {
        let PhysicalKey::Code(key) = key else {
            return None;
        };
        Some(match state {
            ElementState::Pressed => PlatformEvent::KeyDown {
                key,
                alt: self.alt,
                repeat,
            },
            ElementState::Released => PlatformEvent::KeyUp { key },
        })
    }
}

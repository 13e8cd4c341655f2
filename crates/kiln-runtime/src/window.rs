//! Window geometry: aspect lock, fullscreen, and resize-notification handling
//!
//! Asking the windowing layer for a new size produces a resize notification of
//! its own. The adapter tracks its outstanding requests with a [`ResizeGuard`]
//! so that notification is recognized as a confirmation instead of being
//! corrected again as if the user had dragged the window.

use kiln_core::{Result, Size};

use crate::event_queue::PlatformEvent;

/// What the windowing layer did with a size request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeOutcome {
    /// The new size is already in effect.
    Applied,
    /// The request was handed to the OS; a resize notification will follow.
    Pending,
}

/// Commands and queries the adapter needs from a native window
pub trait WindowBackend {
    /// Client-area size in logical units
    fn logical_size(&self) -> Size;

    /// Backbuffer size in physical pixels
    fn pixel_size(&self) -> Size;

    /// Physical pixels per logical unit
    fn scale_factor(&self) -> f64 {
        1.0
    }

    fn request_logical_size(&mut self, size: Size) -> ResizeOutcome;

    fn set_fullscreen(&mut self, enable: bool) -> Result<()>;

    /// Center the window on its current monitor
    fn center(&mut self);
}

/// Re-entrancy marker for self-issued resize requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeGuard {
    /// No request outstanding; every logical resize is user-driven.
    Idle,
    /// A request went to the OS; the next logical resize confirms it.
    AwaitingConfirmation,
    /// A request was applied synchronously; an echo of this size is absorbed.
    Confirmed(Size),
}

/// What the caller should do after the adapter handled an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowResponse {
    /// Nothing to propagate.
    None,
    /// The drawable size is now this many pixels; tell the renderer.
    Resized(Size),
    /// The user asked to close.
    Quit,
}

/// Aspect-corrected version of `requested` for a width/height ratio of `target_aspect`.
///
/// A too-wide request keeps its height, a too-tall one keeps its width. Sizes
/// already at the target ratio (after rounding) come back unchanged.
pub fn correct_aspect(requested: Size, target_aspect: f64) -> Size {
    let Some(aspect) = requested.aspect() else {
        return requested;
    };
    if !(target_aspect.is_finite() && target_aspect > 0.0) {
        return requested;
    }

    if aspect > target_aspect {
        let width = (f64::from(requested.height) * target_aspect).round() as u32;
        Size::new(width.max(1), requested.height)
    } else if aspect < target_aspect {
        let height = (f64::from(requested.width) / target_aspect).round() as u32;
        Size::new(requested.width, height.max(1))
    } else {
        requested
    }
}

/// Reconciles window size, aspect lock, and fullscreen state against OS notifications
#[derive(Debug)]
pub struct WindowAdapter<W: WindowBackend> {
    window: W,
    /// Backbuffer size as last read from the window
    pixel_size: Size,
    /// Logical size to restore when leaving fullscreen
    windowed_size: Size,
    target_aspect: f64,
    lock_aspect: bool,
    fullscreen: bool,
    guard: ResizeGuard,
}

impl<W: WindowBackend> WindowAdapter<W> {
    /// Wrap a freshly created window. The target aspect is fixed from its current logical size.
    pub fn new(window: W, lock_aspect: bool) -> Self {
        let logical = window.logical_size();
        let pixel_size = window.pixel_size();
        let target_aspect = logical.aspect().unwrap_or(16.0 / 9.0);

        Self {
            window,
            pixel_size,
            windowed_size: logical,
            target_aspect,
            lock_aspect,
            fullscreen: false,
            guard: ResizeGuard::Idle,
        }
    }

    pub fn backend(&self) -> &W {
        &self.window
    }

    pub fn backend_mut(&mut self) -> &mut W {
        &mut self.window
    }

    pub fn pixel_size(&self) -> Size {
        self.pixel_size
    }

    pub fn logical_size(&self) -> Size {
        self.window.logical_size()
    }

    /// Logical size remembered for leaving fullscreen
    pub fn windowed_size(&self) -> Size {
        self.windowed_size
    }

    pub fn target_aspect(&self) -> f64 {
        self.target_aspect
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn is_aspect_locked(&self) -> bool {
        self.lock_aspect
    }

    pub fn set_aspect_lock(&mut self, lock: bool) {
        self.lock_aspect = lock;
    }

    pub fn guard(&self) -> ResizeGuard {
        self.guard
    }

    /// Re-read the backbuffer size
    pub fn refresh(&mut self) -> Size {
        self.pixel_size = self.window.pixel_size();
        self.pixel_size
    }

    /// Dispatch a platform event. Events that are not window notifications are ignored.
    pub fn handle_event(&mut self, event: &PlatformEvent) -> WindowResponse {
        match event {
            PlatformEvent::Quit => WindowResponse::Quit,
            PlatformEvent::PixelSizeChanged => self.on_pixel_size_changed(),
            PlatformEvent::Resized(size) => self.on_resized(*size),
            _ => WindowResponse::None,
        }
    }

    /// DPI or monitor change: the OS owns this, so only re-read and forward
    pub fn on_pixel_size_changed(&mut self) -> WindowResponse {
        WindowResponse::Resized(self.refresh())
    }

    /// Logical-size notification, either user-driven or the echo of our own request
    pub fn on_resized(&mut self, size: Size) -> WindowResponse {
        if size.is_empty() {
            return WindowResponse::None;
        }

        // Any real notification consumes the guard, even one we then ignore.
        let guard = std::mem::replace(&mut self.guard, ResizeGuard::Idle);
        if !self.lock_aspect || self.fullscreen {
            return WindowResponse::None;
        }

        match guard {
            ResizeGuard::AwaitingConfirmation => return WindowResponse::Resized(self.refresh()),
            ResizeGuard::Confirmed(applied) if applied == size => {
                return WindowResponse::Resized(self.refresh());
            }
            ResizeGuard::Confirmed(_) | ResizeGuard::Idle => {}
        }

        let corrected = correct_aspect(size, self.target_aspect);
        if corrected == size {
            return WindowResponse::Resized(self.refresh());
        }

        log::debug!(
            "aspect correction {}x{} -> {}x{}",
            size.width,
            size.height,
            corrected.width,
            corrected.height
        );
        self.issue_resize(corrected)
    }

    /// Enter or leave fullscreen. Requesting the current state does nothing.
    pub fn set_fullscreen(&mut self, enable: bool) -> Result<WindowResponse> {
        if self.fullscreen == enable {
            return Ok(WindowResponse::None);
        }

        if enable {
            let logical = self.window.logical_size();
            if !logical.is_empty() {
                self.windowed_size = logical;
            }
        }

        self.window.set_fullscreen(enable)?;
        self.fullscreen = enable;
        self.guard = ResizeGuard::Idle;

        if !enable && !self.windowed_size.is_empty() {
            self.issue_resize(self.windowed_size);
            self.window.center();
        }

        log::info!(
            "{} fullscreen ({}x{} windowed)",
            if enable { "entered" } else { "left" },
            self.windowed_size.width,
            self.windowed_size.height
        );
        Ok(WindowResponse::Resized(self.refresh()))
    }

    pub fn toggle_fullscreen(&mut self) -> Result<WindowResponse> {
        self.set_fullscreen(!self.fullscreen)
    }

    fn issue_resize(&mut self, size: Size) -> WindowResponse {
        match self.window.request_logical_size(size) {
            ResizeOutcome::Pending => {
                self.guard = ResizeGuard::AwaitingConfirmation;
                WindowResponse::None
            }
            ResizeOutcome::Applied => {
                self.guard = ResizeGuard::Confirmed(size);
                WindowResponse::Resized(self.refresh())
            }
        }
    }
}

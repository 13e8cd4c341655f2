//! Kiln Runtime - Frame loop infrastructure
//!
//! Provides the runtime core that an application is built on:
//! - `ActorRegistry`: owns live actors, defers insertions/removals to frame boundaries
//! - `FrameScheduler`: paces the loop to a fixed interval and clamps delta time
//! - `WindowAdapter`: aspect-locked resizing and fullscreen toggling without resize feedback loops
//! - `Application`: subsystem lifecycle and the input, update, draw frame sequence
//! - `DrawList`: what active actors submit to the renderer each frame
//! - `EventQueue` / `InputSystem`: platform event delivery and keyboard state
//! - `platform`: the winit window backend

mod actor;
mod draw;
mod event_queue;
mod headless;
mod input;
mod lifecycle;
pub mod logging;
pub mod platform;
mod registry;
mod scheduler;
mod settings;
mod subsystem;
mod time_of_day;
mod window;

#[cfg(test)]
mod test_support;

pub use actor::{Actor, ActorBase, ActorId, ActorState, AsAny, Component};
pub use draw::{DrawItem, DrawList, Shape};
pub use event_queue::{EventQueue, EventSource, PlatformEvent};
pub use headless::{HeadlessRenderer, NullAssets, NullPhysics, SilentMixer};
pub use input::{ButtonState, InputState, InputSystem};
pub use lifecycle::{AppCommand, Application, Game, GameContext, WindowInfo};
pub use registry::{ActorContext, ActorRegistry};
pub use scheduler::{Clock, FrameScheduler, FrameTime, ManualClock, SystemClock};
pub use settings::{ScreenSettings, Settings};
pub use subsystem::{
    AssetManager, PhysicsWorld, Platform, Renderer, SoundMixer, Subsystems, TimeOfDay,
    WindowDescriptor,
};
pub use time_of_day::DayCycle;
pub use window::{
    correct_aspect, ResizeGuard, ResizeOutcome, WindowAdapter, WindowBackend, WindowResponse,
};

//! Kiln Player - windowed host for the Kiln runtime
//!
//! This crate provides the `PlayerApp` application handler, which drives an
//! `Application` from the winit event loop, and a small orbiting-bodies demo.

pub mod demo;
mod player_app;

pub use player_app::PlayerApp;

//! Kiln Core - Foundational types for the Kiln runtime
//!
//! This crate provides the types that all other Kiln crates depend on:
//! - `Size` - Window and backbuffer dimensions
//! - `Transform`, `Color` - Spatial and visual types
//! - `Vec3`, `Quat`, `Mat4` - Math types re-exported from `glam`
//! - Error types and Result alias

mod error;
mod types;

pub use error::{KilnError, Result};
pub use types::{Color, Size, Transform};

pub use glam;
pub use glam::{Mat4, Quat, Vec3};

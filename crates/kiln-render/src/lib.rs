//! Kiln Render - wgpu renderer for the Kiln runtime
//!
//! Owns the GPU device and window surface, keeps the surface sized to the
//! window's backbuffer, and draws each frame's submitted shapes as instanced,
//! lit cubes before presenting.

mod camera;
mod context;
mod scene_renderer;
mod shape_pipeline;

pub use camera::Camera;
pub use context::{RenderContext, RenderError, DEPTH_FORMAT};
pub use scene_renderer::SceneRenderer;
pub use shape_pipeline::{ShapeInstanceGpu, ShapePipeline, ShapeUniforms};

//! Scene renderer: clears, draws the frame's shapes, presents

use kiln_core::{Color, Mat4, Result, Size, Vec3};
use kiln_runtime::platform::WinitWindow;
use kiln_runtime::{DrawList, Renderer, Shape};

use crate::camera::Camera;
use crate::context::RenderContext;
use crate::shape_pipeline::{ShapeInstanceGpu, ShapePipeline, ShapeUniforms};

/// Draws every submitted shape as a lit cube over a solid background
pub struct SceneRenderer {
    context: Option<RenderContext>,
    shapes: Option<ShapePipeline>,
    instances: Vec<ShapeInstanceGpu>,
    camera: Camera,
    clear_color: Color,
    light_dir: Vec3,
    size: Size,
}

impl Default for SceneRenderer {
    fn default() -> Self {
        Self::new(Color::CORNFLOWER)
    }
}

impl SceneRenderer {
    pub fn new(clear_color: Color) -> Self {
        Self {
            context: None,
            shapes: None,
            instances: Vec::new(),
            camera: Camera::new(),
            clear_color,
            light_dir: Vec3::new(-0.4, -1.0, -0.3),
            size: Size::default(),
        }
    }

    pub fn clear_color(&self) -> Color {
        self.clear_color
    }

    pub fn set_clear_color(&mut self, color: Color) {
        self.clear_color = color;
    }

    /// Direction the light travels in world space
    pub fn set_light_direction(&mut self, dir: Vec3) {
        self.light_dir = dir;
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Last drawable size the window reported
    pub fn size(&self) -> Size {
        self.size
    }

    /// Instances built for the most recent frame
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    fn collect(&mut self, scene: &DrawList) {
        self.instances.clear();
        self.instances.extend(
            scene
                .items()
                .iter()
                .filter(|item| item.shape == Shape::Cube)
                .map(ShapeInstanceGpu::from),
        );
    }

    fn present(&mut self) {
        let (Some(context), Some(shapes)) = (self.context.as_mut(), self.shapes.as_mut()) else {
            return;
        };

        let output = match context.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                context.reconfigure();
                return;
            }
            Err(wgpu::SurfaceError::Timeout) => return,
            Err(e) => {
                log::error!("surface error: {:?}", e);
                return;
            }
        };

        let uniforms = ShapeUniforms::new(self.camera.view_projection(), self.light_dir);
        shapes.prepare(&context.device, &context.queue, &uniforms, &self.instances);

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Scene Encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(to_wgpu(self.clear_color)),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &context.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            shapes.draw(&mut pass);
        }

        context.queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }
}

fn to_wgpu(color: Color) -> wgpu::Color {
    wgpu::Color {
        r: f64::from(color.r),
        g: f64::from(color.g),
        b: f64::from(color.b),
        a: f64::from(color.a),
    }
}

impl Renderer<WinitWindow> for SceneRenderer {
    fn initialize(&mut self, window: &WinitWindow) -> Result<()> {
        let context = pollster::block_on(RenderContext::new(window.handle()))?;
        self.size = context.size();
        self.camera.fit(self.size);
        let format = context.config.format;
        self.shapes = Some(ShapePipeline::new(&context.device, format));
        self.context = Some(context);
        log::debug!(
            "surface configured {}x{} ({:?})",
            self.size.width,
            self.size.height,
            format
        );
        Ok(())
    }

    fn on_window_resized(&mut self, size: Size) {
        if size.is_empty() {
            return;
        }
        self.size = size;
        self.camera.fit(size);
        if let Some(context) = self.context.as_mut() {
            context.resize(size);
        }
    }

    fn draw(&mut self, scene: &DrawList) {
        self.collect(scene);
        self.present();
    }

    fn shutdown(&mut self) {
        self.shapes = None;
        if let Some(context) = self.context.take() {
            let _ = context.device.poll(wgpu::Maintain::Wait);
        }
    }

    fn view_matrix(&self) -> Mat4 {
        self.camera.view_matrix()
    }

    fn projection_matrix(&self) -> Mat4 {
        self.camera.projection_matrix()
    }
}

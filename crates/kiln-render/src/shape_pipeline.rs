//! GPU-instanced shape pipeline
//!
//! Draws every [`DrawItem`] as an instance of a unit cube. Instance data lives
//! in a storage buffer that grows to fit the largest frame seen so far.

use bytemuck::{Pod, Zeroable};
use kiln_core::{Mat4, Vec3};
use kiln_runtime::DrawItem;
use wgpu::util::DeviceExt;

use crate::context::DEPTH_FORMAT;

/// Vertices generated per cube instance by the shader
pub const CUBE_VERTEX_COUNT: u32 = 36;

const INITIAL_CAPACITY: usize = 64;

/// GPU instance data for one draw item. 80 bytes (mat4 + vec4).
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct ShapeInstanceGpu {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
}

impl From<&DrawItem> for ShapeInstanceGpu {
    fn from(item: &DrawItem) -> Self {
        Self {
            model: item.world.to_cols_array_2d(),
            color: [item.color.r, item.color.g, item.color.b, item.color.a],
        }
    }
}

/// Camera and light uniforms shared by every instance in a frame
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct ShapeUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub light_dir: [f32; 4],
}

impl ShapeUniforms {
    pub fn new(view_proj: Mat4, light_dir: Vec3) -> Self {
        let dir = light_dir.normalize_or(Vec3::NEG_Y);
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            light_dir: [dir.x, dir.y, dir.z, 0.0],
        }
    }
}

pub struct ShapePipeline {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    instance_bind_group_layout: wgpu::BindGroupLayout,
    instance_buffer: wgpu::Buffer,
    instance_bind_group: wgpu::BindGroup,
    capacity: usize,
    instance_count: u32,
}

impl ShapePipeline {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Shape Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shape_shader.wgsl").into()),
        });

        // Group 0: camera and light
        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
                label: Some("Shape Uniform Bind Group Layout"),
            });

        // Group 1: instance storage buffer (read-only)
        let instance_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
                label: Some("Shape Instance Bind Group Layout"),
            });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Shape Pipeline Layout"),
            bind_group_layouts: &[&uniform_bind_group_layout, &instance_bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Shape Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_shape"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_shape"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Shape Uniform Buffer"),
            contents: bytemuck::cast_slice(&[ShapeUniforms::new(Mat4::IDENTITY, Vec3::NEG_Y)]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
            label: Some("Shape Uniform Bind Group"),
        });

        let (instance_buffer, instance_bind_group) =
            create_instance_storage(device, &instance_bind_group_layout, INITIAL_CAPACITY);

        Self {
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            instance_bind_group_layout,
            instance_buffer,
            instance_bind_group,
            capacity: INITIAL_CAPACITY,
            instance_count: 0,
        }
    }

    /// Upload this frame's uniforms and instances
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        uniforms: &ShapeUniforms,
        instances: &[ShapeInstanceGpu],
    ) {
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[*uniforms]));

        if instances.len() > self.capacity {
            let capacity = grown_capacity(self.capacity, instances.len());
            let (buffer, bind_group) =
                create_instance_storage(device, &self.instance_bind_group_layout, capacity);
            self.instance_buffer = buffer;
            self.instance_bind_group = bind_group;
            self.capacity = capacity;
            log::debug!("shape instance buffer grown to {}", capacity);
        }

        if !instances.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(instances));
        }
        self.instance_count = instances.len() as u32;
    }

    /// Record the instanced draw into an open pass
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        if self.instance_count == 0 {
            return;
        }
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.uniform_bind_group, &[]);
        pass.set_bind_group(1, &self.instance_bind_group, &[]);
        pass.draw(0..CUBE_VERTEX_COUNT, 0..self.instance_count);
    }
}

fn grown_capacity(current: usize, needed: usize) -> usize {
    needed.next_power_of_two().max(current)
}

fn create_instance_storage(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    capacity: usize,
) -> (wgpu::Buffer, wgpu::BindGroup) {
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Shape Instance Buffer"),
        size: (capacity * std::mem::size_of::<ShapeInstanceGpu>()) as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
        label: Some("Shape Instance Bind Group"),
    });
    (buffer, bind_group)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_core::Color;
    use kiln_runtime::Shape;

    #[test]
    fn test_instance_layout_matches_shader() {
        assert_eq!(std::mem::size_of::<ShapeInstanceGpu>(), 80);
        assert_eq!(std::mem::size_of::<ShapeUniforms>(), 80);
    }

    #[test]
    fn test_instance_from_item() {
        let item = DrawItem {
            actor: None,
            shape: Shape::Cube,
            world: Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0)),
            color: Color::new(0.1, 0.2, 0.3, 1.0),
        };
        let instance = ShapeInstanceGpu::from(&item);
        assert_eq!(instance.model[3], [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(instance.color, [0.1, 0.2, 0.3, 1.0]);
    }

    #[test]
    fn test_zero_light_falls_back_to_straight_down() {
        let uniforms = ShapeUniforms::new(Mat4::IDENTITY, Vec3::ZERO);
        assert_eq!(uniforms.light_dir, [0.0, -1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_capacity_grows_to_power_of_two() {
        assert_eq!(grown_capacity(64, 65), 128);
        assert_eq!(grown_capacity(64, 300), 512);
        assert_eq!(grown_capacity(256, 100), 256);
    }
}

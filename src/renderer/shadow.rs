use std::borrow::Cow;

use glam::Mat4;

use crate::renderer::dynamic_buffer::{DynamicBuffer, align_to};
use crate::renderer::extract::DrawItem;
use crate::renderer::gpu_geometry::{GpuGeometry, Vertex};
use crate::renderer::settings::MAX_SPOT_LIGHTS;
use crate::renderer::uniforms::{LightInstance, spot_light_view_proj};
use crate::resources::GeometryHandle;

pub const SHADOW_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Depth-only pass rendering one shadow map layer per shadow-casting
/// spotlight.
pub struct ShadowPass {
    pipeline: wgpu::RenderPipeline,
    layer_views: Vec<wgpu::TextureView>,
    array_view: wgpu::TextureView,
    sampler: wgpu::Sampler,
    light_buffer: wgpu::Buffer,
    light_bind_group: wgpu::BindGroup,
    light_stride: u32,
    active_layers: u32,
    map_size: u32,
}

impl ShadowPass {
    pub fn new(device: &wgpu::Device, object_layout: &wgpu::BindGroupLayout, map_size: u32) -> Self {
        let map_size = map_size.clamp(1, device.limits().max_texture_dimension_2d);
        let min_alignment = device.limits().min_uniform_buffer_offset_alignment.max(1);
        let light_stride = align_to(std::mem::size_of::<Mat4>() as u32, min_alignment);

        let light_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Shadow Light BindGroup Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<Mat4>() as u64),
                },
                count: None,
            }],
        });

        let light_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Shadow Light Uniform Buffer"),
            size: u64::from(light_stride) * MAX_SPOT_LIGHTS as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let light_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Shadow Light BindGroup"),
            layout: &light_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &light_buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(std::mem::size_of::<Mat4>() as u64),
                }),
            }],
        });

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Shadow Map Array"),
            size: wgpu::Extent3d {
                width: map_size,
                height: map_size,
                depth_or_array_layers: MAX_SPOT_LIGHTS as u32,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: SHADOW_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });

        let array_view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("Shadow Map Array View"),
            dimension: Some(wgpu::TextureViewDimension::D2Array),
            ..Default::default()
        });
        let layer_views = (0..MAX_SPOT_LIGHTS as u32)
            .map(|layer| {
                texture.create_view(&wgpu::TextureViewDescriptor {
                    label: Some("Shadow Map Layer"),
                    dimension: Some(wgpu::TextureViewDimension::D2),
                    base_array_layer: layer,
                    array_layer_count: Some(1),
                    ..Default::default()
                })
            })
            .collect();

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Shadow Comparison Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Shadow Shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!("shaders/shadow.wgsl"))),
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Shadow Pipeline Layout"),
            bind_group_layouts: &[Some(&light_layout), Some(object_layout)],
            immediate_size: 0,
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Shadow Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::position_layout()],
                compilation_options: Default::default(),
            },
            fragment: None,
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: SHADOW_FORMAT,
                depth_write_enabled: Some(true),
                depth_compare: Some(wgpu::CompareFunction::LessEqual),
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState {
                    constant: 2,
                    slope_scale: 2.0,
                    clamp: 0.0,
                },
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        Self {
            pipeline,
            layer_views,
            array_view,
            sampler,
            light_buffer,
            light_bind_group,
            light_stride,
            active_layers: 0,
            map_size,
        }
    }

    #[must_use]
    pub fn array_view(&self) -> &wgpu::TextureView {
        &self.array_view
    }

    #[must_use]
    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }

    #[must_use]
    pub fn map_size(&self) -> u32 {
        self.map_size
    }

    /// Uploads the view-projection of every shadow-casting light.
    pub fn prepare(&mut self, queue: &wgpu::Queue, lights: &[LightInstance<'_>]) {
        let stride = self.light_stride as usize;
        let mut bytes = vec![0u8; stride * MAX_SPOT_LIGHTS];
        self.active_layers = 0;

        for instance in lights {
            let Some(layer) = instance.shadow_layer else {
                continue;
            };
            let layer = layer as usize;
            if layer >= MAX_SPOT_LIGHTS {
                continue;
            }
            let view_proj = spot_light_view_proj(instance.light, instance.position);
            let matrix = view_proj.to_cols_array();
            let data = bytemuck::cast_slice::<f32, u8>(&matrix);
            bytes[layer * stride..layer * stride + data.len()].copy_from_slice(data);
            self.active_layers = self.active_layers.max(layer as u32 + 1);
        }

        if self.active_layers > 0 {
            queue.write_buffer(&self.light_buffer, 0, &bytes);
        }
    }

    /// Records one depth pass per active layer.
    pub fn run<'a>(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        draws: &[DrawItem],
        objects: &DynamicBuffer,
        geometry: impl Fn(GeometryHandle) -> Option<&'a GpuGeometry>,
    ) {
        for layer in 0..self.active_layers {
            let Some(view) = self.layer_views.get(layer as usize) else {
                continue;
            };
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Shadow Depth Pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.light_bind_group, &[layer * self.light_stride]);

            for (index, item) in draws.iter().enumerate() {
                if !item.cast_shadow {
                    continue;
                }
                let Some(gpu) = geometry(item.geometry) else {
                    continue;
                };
                if gpu.index_count == 0 {
                    continue;
                }
                pass.set_bind_group(1, objects.bind_group(), &[objects.offset(index)]);
                pass.set_vertex_buffer(0, gpu.vertex_buffer.slice(..));
                pass.set_index_buffer(gpu.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..gpu.index_count, 0, 0..1);
            }
        }
    }
}

//! Forward pass: spotlight shading with shadow lookups, drawn straight to
//! the surface (through an MSAA target when enabled).

use std::borrow::Cow;

use slotmap::SecondaryMap;
use wgpu::util::DeviceExt;

use crate::assets::AssetServer;
use crate::renderer::context::WgpuContext;
use crate::renderer::dynamic_buffer::DynamicBuffer;
use crate::renderer::extract::DrawItem;
use crate::renderer::gpu_geometry::{GpuGeometry, Vertex};
use crate::renderer::gpu_texture::GpuTexture;
use crate::renderer::shadow::ShadowPass;
use crate::renderer::skinning::skin_geometry;
use crate::renderer::uniforms::{FrameUniforms, MaterialUniforms, ObjectUniforms};
use crate::resources::{GeometryHandle, MaterialHandle, TextureHandle};
use crate::scene::Scene;

struct GpuMaterial {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    /// Texture (and its version) the bind group was built with.
    texture_key: Option<(TextureHandle, u64)>,
}

/// Pipeline variants, indexed by `[double_sided][transparent]`.
struct Pipelines {
    variants: [[wgpu::RenderPipeline; 2]; 2],
}

impl Pipelines {
    fn get(&self, double_sided: bool, transparent: bool) -> &wgpu::RenderPipeline {
        &self.variants[usize::from(double_sided)][usize::from(transparent)]
    }
}

pub struct ForwardPass {
    material_layout: wgpu::BindGroupLayout,
    object_layout: wgpu::BindGroupLayout,
    pipelines: Pipelines,

    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    objects: DynamicBuffer,
    shadow: ShadowPass,

    fallback_texture: GpuTexture,
    geometries: SecondaryMap<GeometryHandle, GpuGeometry>,
    textures: SecondaryMap<TextureHandle, GpuTexture>,
    materials: SecondaryMap<MaterialHandle, GpuMaterial>,
    object_scratch: Vec<ObjectUniforms>,
}

impl ForwardPass {
    pub fn new(ctx: &WgpuContext, shadow_map_size: u32) -> Self {
        let device = &ctx.device;

        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Frame BindGroup Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<FrameUniforms>() as u64),
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Depth,
                        view_dimension: wgpu::TextureViewDimension::D2Array,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                    count: None,
                },
            ],
        });

        let material_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Material BindGroup Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<MaterialUniforms>() as u64),
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let object_layout = DynamicBuffer::layout(device);
        let objects = DynamicBuffer::new(device, &object_layout, "Object Uniform Buffer");
        let shadow = ShadowPass::new(device, &object_layout, shadow_map_size);

        let frame_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Frame Uniform Buffer"),
            contents: bytemuck::bytes_of(&<FrameUniforms as bytemuck::Zeroable>::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame BindGroup"),
            layout: &frame_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: frame_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(shadow.array_view()),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(shadow.sampler()),
                },
            ],
        });

        let pipelines = Self::create_pipelines(ctx, &frame_layout, &material_layout, &object_layout);
        let fallback_texture = GpuTexture::new(
            device,
            &ctx.queue,
            &crate::resources::Texture::solid_color("White", [255, 255, 255, 255]),
        );

        Self {
            material_layout,
            object_layout,
            pipelines,
            frame_buffer,
            frame_bind_group,
            objects,
            shadow,
            fallback_texture,
            geometries: SecondaryMap::new(),
            textures: SecondaryMap::new(),
            materials: SecondaryMap::new(),
            object_scratch: Vec::new(),
        }
    }

    fn create_pipelines(
        ctx: &WgpuContext,
        frame_layout: &wgpu::BindGroupLayout,
        material_layout: &wgpu::BindGroupLayout,
        object_layout: &wgpu::BindGroupLayout,
    ) -> Pipelines {
        let device = &ctx.device;
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Forward Shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!("shaders/forward.wgsl"))),
        });
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Forward Pipeline Layout"),
            bind_group_layouts: &[Some(frame_layout), Some(material_layout), Some(object_layout)],
            immediate_size: 0,
        });

        let create = |double_sided: bool, transparent: bool| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("Forward Pipeline"),
                layout: Some(&layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &[Vertex::layout()],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: ctx.color_format(),
                        blend: Some(if transparent {
                            wgpu::BlendState::ALPHA_BLENDING
                        } else {
                            wgpu::BlendState::REPLACE
                        }),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: if double_sided { None } else { Some(wgpu::Face::Back) },
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: ctx.depth_format,
                    depth_write_enabled: Some(!transparent),
                    depth_compare: Some(wgpu::CompareFunction::Less),
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState {
                    count: ctx.sample_count,
                    ..Default::default()
                },
                multiview_mask: None,
                cache: None,
            })
        };

        Pipelines {
            variants: [
                [create(false, false), create(false, true)],
                [create(true, false), create(true, true)],
            ],
        }
    }

    /// Uploads geometry, textures, materials and per-object data for `draws`.
    /// Skinned meshes are re-skinned on the CPU every call.
    pub fn prepare(&mut self, ctx: &WgpuContext, scene: &Scene, assets: &AssetServer, draws: &[DrawItem]) {
        let device = &ctx.device;
        let queue = &ctx.queue;

        self.object_scratch.clear();
        for item in draws {
            if !self.geometries.contains_key(item.geometry)
                && let Some(geometry) = assets.geometry(item.geometry)
            {
                self.geometries
                    .insert(item.geometry, GpuGeometry::new(device, geometry, "Mesh Geometry"));
            }

            if let (Some(key), Some(geometry), Some(gpu)) = (
                item.skeleton,
                assets.geometry(item.geometry),
                self.geometries.get(item.geometry),
            ) && let Some(skeleton) = scene.skeleton(key)
                && gpu.is_skinned()
            {
                let skinned = skin_geometry(geometry, skeleton.joint_matrices());
                gpu.write_skinned(queue, &skinned);
            }

            self.prepare_material(ctx, assets, item.material);
            self.object_scratch
                .push(ObjectUniforms::new(&item.model, item.receive_shadow));
        }

        self.objects
            .write(device, queue, &self.object_layout, &self.object_scratch);
    }

    fn prepare_material(&mut self, ctx: &WgpuContext, assets: &AssetServer, handle: MaterialHandle) {
        let Some(material) = assets.material(handle) else {
            return;
        };

        let texture_key = material
            .map
            .and_then(|tex| assets.texture(tex).map(|t| (tex, t.version())));

        if let Some((tex_handle, _)) = texture_key
            && let Some(texture) = assets.texture(tex_handle)
        {
            let stale = self.textures.get(tex_handle).is_none_or(|gpu| gpu.is_stale(texture));
            if stale {
                log::debug!("Uploading texture '{}' ({} mip levels)", texture.name, texture.mip_level_count());
                self.textures
                    .insert(tex_handle, GpuTexture::new(&ctx.device, &ctx.queue, texture));
            }
        }

        let uniforms = MaterialUniforms::from_material(material);
        let rebuild = self
            .materials
            .get(handle)
            .is_none_or(|gpu| gpu.texture_key != texture_key);

        if rebuild {
            let buffer = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Material Uniform Buffer"),
                contents: bytemuck::bytes_of(&uniforms),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
            let texture = texture_key
                .and_then(|(tex, _)| self.textures.get(tex))
                .unwrap_or(&self.fallback_texture);
            let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Material BindGroup"),
                layout: &self.material_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(&texture.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::Sampler(&texture.sampler),
                    },
                ],
            });
            self.materials.insert(
                handle,
                GpuMaterial {
                    buffer,
                    bind_group,
                    texture_key,
                },
            );
        } else if let Some(gpu) = self.materials.get(handle) {
            ctx.queue.write_buffer(&gpu.buffer, 0, bytemuck::bytes_of(&uniforms));
        }
    }

    /// Writes the frame uniforms and shadow matrices.
    pub fn prepare_frame(
        &mut self,
        ctx: &WgpuContext,
        frame: &FrameUniforms,
        lights: &[crate::renderer::uniforms::LightInstance<'_>],
    ) {
        ctx.queue.write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(frame));
        self.shadow.prepare(&ctx.queue, lights);
    }

    #[must_use]
    pub fn shadow_map_size(&self) -> u32 {
        self.shadow.map_size()
    }

    /// Records the shadow passes followed by the main color pass.
    pub fn run(
        &self,
        ctx: &WgpuContext,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        clear_color: wgpu::Color,
        draws: &[DrawItem],
    ) {
        self.shadow
            .run(encoder, draws, &self.objects, |handle| self.geometries.get(handle));

        let (view, resolve_target) = match ctx.msaa_view() {
            Some(msaa) => (msaa, Some(target)),
            None => (target, None),
        };

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Forward Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                depth_slice: None,
                resolve_target,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear_color),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: ctx.depth_view(),
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Discard,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        pass.set_bind_group(0, &self.frame_bind_group, &[]);

        for (index, item) in draws.iter().enumerate() {
            let (Some(gpu), Some(material)) = (self.geometries.get(item.geometry), self.materials.get(item.material))
            else {
                continue;
            };
            if gpu.index_count == 0 {
                continue;
            }
            pass.set_pipeline(self.pipelines.get(item.double_sided, item.transparent));
            pass.set_bind_group(1, &material.bind_group, &[]);
            pass.set_bind_group(2, self.objects.bind_group(), &[self.objects.offset(index)]);
            pass.set_vertex_buffer(0, gpu.vertex_buffer.slice(..));
            pass.set_index_buffer(gpu.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..gpu.index_count, 0, 0..1);
        }
    }

    /// Drops GPU copies of resources that no longer exist on the CPU side.
    pub fn prune(&mut self, assets: &AssetServer) {
        self.geometries.retain(|handle, _| assets.geometry(handle).is_some());
        self.materials.retain(|handle, _| assets.material(handle).is_some());
        self.textures.retain(|handle, _| assets.texture(handle).is_some());
    }
}

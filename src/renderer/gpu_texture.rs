use crate::resources::Texture;

/// Uploaded texture with its view and sampler.
///
/// `version` mirrors [`Texture::version`]; a mismatch means the CPU side
/// changed (for example mipmap generation was toggled) and the texture is
/// rebuilt.
pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub version: u64,
    pub mip_level_count: u32,
}

impl GpuTexture {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, texture: &Texture) -> Self {
        let levels = texture.mip_chain();
        let mip_level_count = levels.len().max(1) as u32;
        let format = if texture.srgb {
            wgpu::TextureFormat::Rgba8UnormSrgb
        } else {
            wgpu::TextureFormat::Rgba8Unorm
        };

        let gpu_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&texture.name),
            size: wgpu::Extent3d {
                width: texture.width().max(1),
                height: texture.height().max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (level, image) in levels.iter().enumerate() {
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &gpu_texture,
                    mip_level: level as u32,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                image.as_raw(),
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(image.width() * 4),
                    rows_per_image: Some(image.height()),
                },
                wgpu::Extent3d {
                    width: image.width(),
                    height: image.height(),
                    depth_or_array_layers: 1,
                },
            );
        }

        let view = gpu_texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&texture.name),
            address_mode_u: texture.sampler.address_mode_u,
            address_mode_v: texture.sampler.address_mode_v,
            mag_filter: texture.sampler.mag_filter,
            min_filter: texture.sampler.min_filter,
            mipmap_filter: texture.sampler.mipmap_filter,
            ..Default::default()
        });

        Self {
            texture: gpu_texture,
            view,
            sampler,
            version: texture.version(),
            mip_level_count,
        }
    }

    #[must_use]
    pub fn is_stale(&self, texture: &Texture) -> bool {
        self.version != texture.version()
    }
}

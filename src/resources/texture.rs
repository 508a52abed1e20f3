use image::{RgbaImage, imageops::FilterType};

/// Sampler state, mirrored from glTF samplers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureSampler {
    pub address_mode_u: wgpu::AddressMode,
    pub address_mode_v: wgpu::AddressMode,
    pub mag_filter: wgpu::FilterMode,
    pub min_filter: wgpu::FilterMode,
    pub mipmap_filter: wgpu::MipmapFilterMode,
}

impl Default for TextureSampler {
    fn default() -> Self {
        Self {
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Linear,
        }
    }
}

/// CPU-side RGBA8 texture.
#[derive(Debug, Clone)]
pub struct Texture {
    pub name: String,
    pub image: RgbaImage,
    /// Color textures are sampled as sRGB.
    pub srgb: bool,
    pub sampler: TextureSampler,
    /// Build a full mip chain on upload. When false only level 0 exists.
    pub generate_mipmaps: bool,
    version: u64,
}

impl Texture {
    #[must_use]
    pub fn new(name: &str, image: RgbaImage) -> Self {
        Self {
            name: name.to_string(),
            image,
            srgb: true,
            sampler: TextureSampler::default(),
            generate_mipmaps: true,
            version: 0,
        }
    }

    /// 1x1 texture of a single color.
    #[must_use]
    pub fn solid_color(name: &str, color: [u8; 4]) -> Self {
        Self::new(name, RgbaImage::from_pixel(1, 1, image::Rgba(color)))
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Bumped whenever upload-relevant state changes.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn set_generate_mipmaps(&mut self, enabled: bool) {
        if self.generate_mipmaps != enabled {
            self.generate_mipmaps = enabled;
            self.version += 1;
        }
    }

    #[must_use]
    pub fn mip_level_count(&self) -> u32 {
        if self.generate_mipmaps {
            mip_level_count(self.width(), self.height())
        } else {
            1
        }
    }

    /// Level 0 followed by successively halved levels, as many as
    /// [`Texture::mip_level_count`] reports.
    #[must_use]
    pub fn mip_chain(&self) -> Vec<RgbaImage> {
        let count = self.mip_level_count();
        let mut levels = Vec::with_capacity(count as usize);
        levels.push(self.image.clone());
        for _ in 1..count {
            let Some(prev) = levels.last() else { break };
            let w = (prev.width() / 2).max(1);
            let h = (prev.height() / 2).max(1);
            let next = image::imageops::resize(prev, w, h, FilterType::Triangle);
            levels.push(next);
        }
        levels
    }
}

#[must_use]
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mip_count_matches_largest_dimension() {
        assert_eq!(mip_level_count(1, 1), 1);
        assert_eq!(mip_level_count(256, 256), 9);
        assert_eq!(mip_level_count(300, 20), 9);
    }

    #[test]
    fn disabling_mipmaps_leaves_one_level() {
        let mut tex = Texture::new("t", RgbaImage::new(64, 32));
        assert_eq!(tex.mip_chain().len(), 7);
        tex.set_generate_mipmaps(false);
        assert_eq!(tex.mip_chain().len(), 1);
        assert_eq!(tex.version(), 1);
    }
}

use crate::renderer::uniforms::ObjectUniforms;

/// Per-object uniforms packed into one buffer and addressed by dynamic
/// offset. Grows (and rebuilds its bind group) when a frame has more
/// objects than the current capacity.
pub struct DynamicBuffer {
    label: &'static str,
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    stride: u32,
    capacity: u32,
    staging: Vec<u8>,
}

impl DynamicBuffer {
    pub fn layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Object BindGroup Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<ObjectUniforms>() as u64),
                },
                count: None,
            }],
        })
    }

    pub fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, label: &'static str) -> Self {
        let min_alignment = device.limits().min_uniform_buffer_offset_alignment.max(1);
        let stride = align_to(std::mem::size_of::<ObjectUniforms>() as u32, min_alignment);
        let capacity = 64;
        let buffer = Self::create_buffer(device, label, stride, capacity);
        let bind_group = Self::create_bind_group(device, layout, label, &buffer);

        Self {
            label,
            buffer,
            bind_group,
            stride,
            capacity,
            staging: Vec::new(),
        }
    }

    fn create_buffer(device: &wgpu::Device, label: &str, stride: u32, capacity: u32) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: u64::from(stride) * u64::from(capacity),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn create_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        label: &str,
        buffer: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(std::mem::size_of::<ObjectUniforms>() as u64),
                }),
            }],
        })
    }

    /// Uploads `objects`, growing the buffer when needed. Object `i` is
    /// then bound with [`DynamicBuffer::offset`]`(i)`.
    pub fn write(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        objects: &[ObjectUniforms],
    ) {
        if objects.is_empty() {
            return;
        }

        let required = objects.len() as u32;
        if required > self.capacity {
            let mut capacity = self.capacity.max(1);
            while capacity < required {
                capacity = capacity.saturating_mul(2);
            }
            log::debug!("Growing {} to {capacity} objects", self.label);
            self.buffer = Self::create_buffer(device, self.label, self.stride, capacity);
            self.bind_group = Self::create_bind_group(device, layout, self.label, &self.buffer);
            self.capacity = capacity;
        }

        let stride = self.stride as usize;
        self.staging.clear();
        self.staging.resize(stride * objects.len(), 0);
        for (i, object) in objects.iter().enumerate() {
            let bytes = bytemuck::bytes_of(object);
            self.staging[i * stride..i * stride + bytes.len()].copy_from_slice(bytes);
        }
        queue.write_buffer(&self.buffer, 0, &self.staging);
    }

    #[must_use]
    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    #[must_use]
    pub fn offset(&self, index: usize) -> u32 {
        index as u32 * self.stride
    }
}

pub(crate) fn align_to(value: u32, alignment: u32) -> u32 {
    value.div_ceil(alignment) * alignment
}

use std::collections::HashMap;

/// GPU texture name, unique within a [`TextureStore`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct RawTexture(pub u32);

/// Handle to an uploaded texture plus its pixel size.
///
/// Cheap to copy; the pixels live in the owning [`TextureStore`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Texture {
    pub raw: RawTexture,
    pub width: u32,
    pub height: u32,
}

/// Decoded RGBA8 image, top row first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpuTexture {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl CpuTexture {
    /// Single opaque white texel.
    pub fn white() -> Self {
        Self {
            width: 1,
            height: 1,
            pixels: vec![255; 4],
        }
    }

    pub fn is_valid(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.pixels.len() == self.width as usize * self.height as usize * 4
    }
}

/// Texture bound to the fragment stage: view plus the bind group using it.
pub(crate) struct GpuTexture {
    _texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
}

impl GpuTexture {
    pub(crate) fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

/// Owns every image texture, the shared sampler and the texture bind group
/// layout (group 1 of the quad pipelines).
pub struct TextureStore {
    layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    white: GpuTexture,
    textures: HashMap<RawTexture, GpuTexture>,
    next_raw: u32,
}

impl TextureStore {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("opengd texture bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("opengd texture sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        let white_px = CpuTexture::white();
        let white = create_gpu_texture(
            device,
            queue,
            &layout,
            &sampler,
            "opengd white texture",
            wgpu::TextureFormat::Rgba8Unorm,
            (1, 1),
            &white_px.pixels,
        );

        Self {
            layout,
            sampler,
            white,
            textures: HashMap::new(),
            next_raw: 1,
        }
    }

    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }

    /// Uploads an RGBA8 image and returns its handle.
    ///
    /// `image` must satisfy [`CpuTexture::is_valid`].
    pub fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, image: &CpuTexture) -> Texture {
        debug_assert!(image.is_valid(), "invalid CPU texture {}x{}", image.width, image.height);

        let raw = RawTexture(self.next_raw);
        self.next_raw += 1;

        let gpu = create_gpu_texture(
            device,
            queue,
            &self.layout,
            &self.sampler,
            &format!("opengd texture {}", raw.0),
            wgpu::TextureFormat::Rgba8Unorm,
            (image.width, image.height),
            &image.pixels,
        );
        self.textures.insert(raw, gpu);

        Texture {
            raw,
            width: image.width,
            height: image.height,
        }
    }

    /// Uploads an 8-bit coverage bitmap (one byte per pixel).
    pub(crate) fn upload_mask(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        size: (u32, u32),
        coverage: &[u8],
    ) -> GpuTexture {
        create_gpu_texture(
            device,
            queue,
            &self.layout,
            &self.sampler,
            "opengd glyph texture",
            wgpu::TextureFormat::R8Unorm,
            size,
            coverage,
        )
    }

    /// Frees the GPU texture behind `texture`. Returns false if unknown.
    pub fn remove(&mut self, texture: Texture) -> bool {
        self.textures.remove(&texture.raw).is_some()
    }

    pub fn contains(&self, texture: Texture) -> bool {
        self.textures.contains_key(&texture.raw)
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    pub(crate) fn bind_group(&self, raw: RawTexture) -> Option<&wgpu::BindGroup> {
        self.textures.get(&raw).map(GpuTexture::bind_group)
    }

    /// Bind group used when no texture is enabled.
    pub(crate) fn white_bind_group(&self) -> &wgpu::BindGroup {
        self.white.bind_group()
    }
}

#[allow(clippy::too_many_arguments)]
fn create_gpu_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    label: &str,
    format: wgpu::TextureFormat,
    (width, height): (u32, u32),
    data: &[u8],
) -> GpuTexture {
    let bytes_per_pixel = format.block_copy_size(None).unwrap_or(4);
    let extent = wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };

    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: extent,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        data,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(width * bytes_per_pixel),
            rows_per_image: Some(height),
        },
        extent,
    );

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    });

    GpuTexture {
        _texture: texture,
        bind_group,
    }
}

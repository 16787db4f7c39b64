use std::collections::HashMap;
use std::sync::Arc;

use derivative::Derivative;
use fxhash::FxHashMap;
use glam::Vec4;
use log::{debug, warn};
use wgpu::util::DeviceExt;

use crate::{
    Backend, BoundResource, BufferId, DispatchCommand, Error, Format,
    KernelDescriptor, KernelId, ResourceView, Result, TextureDescriptor,
    TextureId,
};

/// Entry point every kernel's shader module is expected to expose.
pub const KERNEL_ENTRY_POINT: &str = "main";

/// [`Backend`] recording into a [`wgpu::CommandEncoder`].
///
/// Kernels are looked up among shader modules registered through
/// [`Self::with_shader()`], by their name. Each kernel must:
///
/// - expose a compute entry point called [`KERNEL_ENTRY_POINT`],
/// - declare every keyword of [`crate::keywords`] as a `bool` override
///   constant (keywords a variant is compiled with are set to `true`),
/// - declare its bindings in `@group(0)`, numbered in the order the context
///   binds them (see [`DispatchCommand::bindings`]), and use all of them.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct WgpuBackend {
    #[derivative(Debug = "ignore")]
    device: Arc<wgpu::Device>,

    #[derivative(Debug = "ignore")]
    queue: Arc<wgpu::Queue>,

    #[derivative(Debug = "ignore")]
    shaders: FxHashMap<&'static str, wgpu::ShaderModule>,

    #[derivative(Debug = "ignore")]
    textures: FxHashMap<TextureId, Arc<wgpu::Texture>>,

    #[derivative(Debug = "ignore")]
    buffers: FxHashMap<BufferId, wgpu::Buffer>,

    kernels: Vec<KernelDescriptor>,

    #[derivative(Debug = "ignore")]
    pipelines: FxHashMap<PipelineKey, wgpu::ComputePipeline>,

    next_id: u32,
}

type PipelineKey = (KernelId, Vec<&'static str>);

impl WgpuBackend {
    pub fn new(device: Arc<wgpu::Device>, queue: Arc<wgpu::Queue>) -> Self {
        Self {
            device,
            queue,
            shaders: Default::default(),
            textures: Default::default(),
            buffers: Default::default(),
            kernels: Default::default(),
            pipelines: Default::default(),
            next_id: 0,
        }
    }

    /// Registers the shader module implementing given kernel.
    pub fn with_shader(
        mut self,
        kernel: &'static str,
        module: wgpu::ShaderModule,
    ) -> Self {
        self.shaders.insert(kernel, module);
        self
    }

    /// Registers a texture that's owned by the host, so that it can be passed
    /// to a dispatch.
    pub fn import_texture(&mut self, texture: Arc<wgpu::Texture>) -> TextureId {
        let id = self.next_texture_id();

        self.textures.insert(id, texture);
        id
    }

    /// Forgets a texture registered through [`Self::import_texture()`].
    pub fn release_texture(&mut self, texture: TextureId) {
        self.textures.remove(&texture);
    }

    pub fn texture(&self, id: TextureId) -> Option<&Arc<wgpu::Texture>> {
        self.textures.get(&id)
    }

    fn next_texture_id(&mut self) -> TextureId {
        self.next_id += 1;

        TextureId(self.next_id)
    }

    /// Runs `f`, returning the first validation or out-of-memory error it
    /// triggered.
    fn scoped<T>(
        &self,
        f: impl FnOnce(&wgpu::Device) -> T,
    ) -> Result<T, String> {
        self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let result = f(&self.device);

        let validation = pollster::block_on(self.device.pop_error_scope());
        let oom = pollster::block_on(self.device.pop_error_scope());

        match validation.or(oom) {
            Some(err) => Err(err.to_string()),
            None => Ok(result),
        }
    }

    fn pipeline(&mut self, cmd: &DispatchCommand) -> Option<PipelineKey> {
        let Some(kernel) = self.kernels.get(cmd.kernel.0 as usize) else {
            warn!("Unknown kernel {:?}; skipping dispatch", cmd.kernel);
            return None;
        };

        let mut keywords: Vec<_> = kernel
            .keywords
            .iter()
            .chain(&cmd.keywords)
            .copied()
            .collect();

        keywords.sort_unstable();
        keywords.dedup();

        let key = (cmd.kernel, keywords);

        if self.pipelines.contains_key(&key) {
            return Some(key);
        }

        let module = self.shaders.get(kernel.name)?;

        debug!(
            "Compiling pipeline: {}; keywords={:?}",
            kernel.name, key.1
        );

        let constants: HashMap<_, _> = key
            .1
            .iter()
            .map(|keyword| (keyword.to_string(), 1.0))
            .collect();

        let label = format!("loupe_{}_pipeline", kernel.name);

        let pipeline =
            self.device
                .create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                    label: Some(&label),
                    layout: None,
                    module,
                    entry_point: Some(KERNEL_ENTRY_POINT),
                    compilation_options: wgpu::PipelineCompilationOptions {
                        constants: &constants,
                        zero_initialize_workgroup_memory: false,
                        ..Default::default()
                    },
                    cache: None,
                });

        self.pipelines.insert(key.clone(), pipeline);

        Some(key)
    }

    fn view(
        &self,
        view: ResourceView,
        storage: bool,
    ) -> Option<wgpu::TextureView> {
        let Some(texture) = self.textures.get(&view.texture) else {
            warn!("Unknown texture {:?}; skipping dispatch", view.texture);
            return None;
        };

        // Storage bindings must point at a single mip
        let (base_mip_level, mip_level_count) = match (view.mip, storage) {
            (Some(mip), _) => (mip, Some(1)),
            (None, true) => (0, Some(1)),
            (None, false) => (0, None),
        };

        Some(texture.create_view(&wgpu::TextureViewDescriptor {
            base_mip_level,
            mip_level_count,
            ..Default::default()
        }))
    }

    fn bind_group(
        &self,
        cmd: &DispatchCommand,
        layout: &wgpu::BindGroupLayout,
    ) -> Option<wgpu::BindGroup> {
        let mut views = Vec::new();
        let mut buffers = Vec::new();

        for (idx, binding) in cmd.bindings.iter().enumerate() {
            let idx = idx as u32;

            match binding.resource {
                BoundResource::Texture(view) => {
                    views.push((idx, self.view(view, false)?));
                }

                BoundResource::StorageTexture(view) => {
                    views.push((idx, self.view(view, true)?));
                }

                BoundResource::ConstantBuffer(id) => {
                    let Some(buffer) = self.buffers.get(&id) else {
                        warn!("Unknown buffer {id:?}; skipping dispatch");
                        return None;
                    };

                    buffers.push((idx, buffer));
                }
            }
        }

        let entries: Vec<_> = views
            .iter()
            .map(|(binding, view)| wgpu::BindGroupEntry {
                binding: *binding,
                resource: wgpu::BindingResource::TextureView(view),
            })
            .chain(buffers.iter().map(|(binding, buffer)| {
                wgpu::BindGroupEntry {
                    binding: *binding,
                    resource: buffer.as_entire_binding(),
                }
            }))
            .collect();

        let label = format!("loupe_{}_bg", cmd.label);

        Some(self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&label),
            layout,
            entries: &entries,
        }))
    }
}

impl Backend for WgpuBackend {
    type Encoder = wgpu::CommandEncoder;

    fn create_texture(
        &mut self,
        descriptor: &TextureDescriptor,
    ) -> Result<TextureId> {
        let mut usage = wgpu::TextureUsages::TEXTURE_BINDING
            | wgpu::TextureUsages::COPY_DST
            | wgpu::TextureUsages::COPY_SRC;

        if descriptor.storage {
            usage |= wgpu::TextureUsages::STORAGE_BINDING;
        }

        let texture = self
            .scoped(|device| {
                device.create_texture(&wgpu::TextureDescriptor {
                    label: Some(&descriptor.label),
                    size: wgpu::Extent3d {
                        width: descriptor.size.x,
                        height: descriptor.size.y,
                        depth_or_array_layers: 1,
                    },
                    mip_level_count: descriptor.mips,
                    sample_count: 1,
                    dimension: wgpu::TextureDimension::D2,
                    format: into_wgpu(descriptor.format),
                    usage,
                    view_formats: &[],
                })
            })
            .map_err(|reason| Error::TextureCreation {
                label: descriptor.label.clone(),
                reason,
            })?;

        Ok(self.import_texture(Arc::new(texture)))
    }

    fn write_texture(&mut self, texture: TextureId, data: &[u8]) {
        let Some(texture) = self.textures.get(&texture) else {
            warn!("Unknown texture {texture:?}; skipping upload");
            return;
        };

        let Some(bpt) = texture.format().block_copy_size(None) else {
            warn!("Texture {texture:?} has no block size; skipping upload");
            return;
        };

        self.queue.write_texture(
            wgpu::ImageCopyTexture {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            data,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(bpt * texture.width()),
                rows_per_image: Some(texture.height()),
            },
            texture.size(),
        );
    }

    fn destroy_texture(&mut self, texture: TextureId) {
        // Commands recorded (but not yet submitted) might still refer to
        // this texture, so the handle is dropped instead of destroyed
        self.textures.remove(&texture);
    }

    fn create_buffer(&mut self, label: &str, size: usize) -> Result<BufferId> {
        let size = (size as u64).next_multiple_of(16);

        let buffer = self
            .scoped(|device| {
                device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some(label),
                    size,
                    usage: wgpu::BufferUsages::UNIFORM
                        | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                })
            })
            .map_err(|reason| Error::BufferCreation {
                label: label.into(),
                reason,
            })?;

        self.next_id += 1;

        let id = BufferId(self.next_id);

        self.buffers.insert(id, buffer);

        Ok(id)
    }

    fn destroy_buffer(&mut self, buffer: BufferId) {
        self.buffers.remove(&buffer);
    }

    fn create_kernel(
        &mut self,
        descriptor: &KernelDescriptor,
    ) -> Result<KernelId> {
        if !self.shaders.contains_key(descriptor.name) {
            return Err(Error::KernelUnavailable {
                kernel: descriptor.name,
            });
        }

        self.kernels.push(descriptor.clone());

        Ok(KernelId(self.kernels.len() as u32 - 1))
    }

    fn write_buffer(
        &mut self,
        encoder: &mut Self::Encoder,
        buffer: BufferId,
        data: &[u8],
    ) {
        let Some(buffer) = self.buffers.get(&buffer) else {
            warn!("Unknown buffer {buffer:?}; skipping upload");
            return;
        };

        // Queue writes land before the entire encoder executes, so uploads
        // go through the encoder to keep them in recording order
        let staging =
            self.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("loupe_staging"),
                    contents: data,
                    usage: wgpu::BufferUsages::COPY_SRC,
                });

        encoder.copy_buffer_to_buffer(
            &staging,
            0,
            buffer,
            0,
            data.len() as u64,
        );
    }

    fn clear_texture(
        &mut self,
        encoder: &mut Self::Encoder,
        texture: TextureId,
        value: Vec4,
    ) {
        let Some(texture) = self.textures.get(&texture) else {
            warn!("Unknown texture {texture:?}; skipping clear");
            return;
        };

        if value == Vec4::ZERO {
            encoder.clear_texture(texture, &Default::default());
            return;
        }

        let Some(format) = from_wgpu(texture.format()) else {
            warn!(
                "Texture {:?} has unsupported format; skipping clear",
                texture.format()
            );

            return;
        };

        let texel = format.encode(value);

        for mip in 0..texture.mip_level_count() {
            let size = texture
                .size()
                .mip_level_size(mip, wgpu::TextureDimension::D2);

            let row = texel.len() * size.width as usize;

            let padded_row = row
                .next_multiple_of(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT as usize);

            let mut data = vec![0; padded_row * size.height as usize];

            for row in data.chunks_mut(padded_row) {
                for dst in row[..texel.len() * size.width as usize]
                    .chunks_mut(texel.len())
                {
                    dst.copy_from_slice(&texel);
                }
            }

            let staging =
                self.device
                    .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some("loupe_staging"),
                        contents: &data,
                        usage: wgpu::BufferUsages::COPY_SRC,
                    });

            encoder.copy_buffer_to_texture(
                wgpu::ImageCopyBuffer {
                    buffer: &staging,
                    layout: wgpu::ImageDataLayout {
                        offset: 0,
                        bytes_per_row: Some(padded_row as u32),
                        rows_per_image: Some(size.height),
                    },
                },
                wgpu::ImageCopyTexture {
                    texture,
                    mip_level: mip,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                size,
            );
        }
    }

    fn dispatch(&mut self, encoder: &mut Self::Encoder, cmd: &DispatchCommand) {
        let Some(key) = self.pipeline(cmd) else {
            return;
        };

        let pipeline = &self.pipelines[&key];

        let Some(bind_group) =
            self.bind_group(cmd, &pipeline.get_bind_group_layout(0))
        else {
            return;
        };

        let label = format!("loupe_{}_pass", cmd.label);

        let mut pass =
            encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some(&label),
                timestamp_writes: None,
            });

        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, &bind_group, &[]);
        pass.dispatch_workgroups(cmd.groups.x, cmd.groups.y, cmd.groups.z);
    }
}

fn into_wgpu(format: Format) -> wgpu::TextureFormat {
    match format {
        Format::Rgba16Float => wgpu::TextureFormat::Rgba16Float,
        Format::Rgba8Unorm => wgpu::TextureFormat::Rgba8Unorm,
        Format::Rg16Float => wgpu::TextureFormat::Rg16Float,
        Format::Rg32Float => wgpu::TextureFormat::Rg32Float,
        Format::Rg8Unorm => wgpu::TextureFormat::Rg8Unorm,
        Format::R16Float => wgpu::TextureFormat::R16Float,
        Format::R32Float => wgpu::TextureFormat::R32Float,
        Format::R32Uint => wgpu::TextureFormat::R32Uint,
        Format::R8Unorm => wgpu::TextureFormat::R8Unorm,
    }
}

fn from_wgpu(format: wgpu::TextureFormat) -> Option<Format> {
    Some(match format {
        wgpu::TextureFormat::Rgba16Float => Format::Rgba16Float,
        wgpu::TextureFormat::Rgba8Unorm => Format::Rgba8Unorm,
        wgpu::TextureFormat::Rg16Float => Format::Rg16Float,
        wgpu::TextureFormat::Rg32Float => Format::Rg32Float,
        wgpu::TextureFormat::Rg8Unorm => Format::Rg8Unorm,
        wgpu::TextureFormat::R16Float => Format::R16Float,
        wgpu::TextureFormat::R32Float => Format::R32Float,
        wgpu::TextureFormat::R32Uint => Format::R32Uint,
        wgpu::TextureFormat::R8Unorm => Format::R8Unorm,
        _ => return None,
    })
}

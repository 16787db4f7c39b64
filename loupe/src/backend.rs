mod recording;
#[cfg(feature = "wgpu")]
mod wgpu_backend;

use std::fmt;

use glam::{UVec2, UVec3, Vec4};
use half::f16;

pub use self::recording::*;
#[cfg(feature = "wgpu")]
pub use self::wgpu_backend::*;
use crate::Result;

/// Host rendering API the upscaler records its work into.
///
/// Resource management happens immediately, while everything taking an
/// `encoder` is recorded and executes in recording order once the host
/// submits the encoder.
pub trait Backend {
    type Encoder;

    fn create_texture(
        &mut self,
        descriptor: &TextureDescriptor,
    ) -> Result<TextureId>;

    /// Uploads the initial contents of mip zero; `data` is tightly packed,
    /// row after row.
    fn write_texture(&mut self, texture: TextureId, data: &[u8]);

    fn destroy_texture(&mut self, texture: TextureId);

    fn create_buffer(&mut self, label: &str, size: usize) -> Result<BufferId>;

    fn destroy_buffer(&mut self, buffer: BufferId);

    /// Looks up a compute kernel; failing to find one is fatal.
    fn create_kernel(
        &mut self,
        descriptor: &KernelDescriptor,
    ) -> Result<KernelId>;

    fn write_buffer(
        &mut self,
        encoder: &mut Self::Encoder,
        buffer: BufferId,
        data: &[u8],
    );

    /// Fills every texel of every mip with `value`, converted to the
    /// texture's format.
    fn clear_texture(
        &mut self,
        encoder: &mut Self::Encoder,
        texture: TextureId,
        value: Vec4,
    );

    fn dispatch(&mut self, encoder: &mut Self::Encoder, cmd: &DispatchCommand);
}

#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TextureId(pub u32);

impl TextureId {
    pub const NULL: Self = Self(0);

    pub fn is_null(self) -> bool {
        self == Self::NULL
    }
}

impl fmt::Debug for TextureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tex#{}", self.0)
    }
}

#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BufferId(pub u32);

impl fmt::Debug for BufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "buf#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KernelId(pub u32);

/// Identifies a texture (or one of its mips) bound to a kernel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ResourceView {
    pub texture: TextureId,
    pub mip: Option<u32>,
}

impl ResourceView {
    pub const NULL: Self = Self {
        texture: TextureId::NULL,
        mip: None,
    };

    pub fn new(texture: TextureId) -> Self {
        Self { texture, mip: None }
    }

    pub fn with_mip(mut self, mip: u32) -> Self {
        self.mip = Some(mip);
        self
    }

    pub fn is_null(&self) -> bool {
        self.texture.is_null()
    }
}

impl From<TextureId> for ResourceView {
    fn from(texture: TextureId) -> Self {
        Self::new(texture)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Format {
    Rgba16Float,
    Rgba8Unorm,
    Rg16Float,
    Rg32Float,
    Rg8Unorm,
    R16Float,
    R32Float,
    R32Uint,
    R8Unorm,
}

impl Format {
    pub fn bytes_per_texel(self) -> usize {
        match self {
            Format::Rgba16Float | Format::Rg32Float => 8,
            Format::Rgba8Unorm
            | Format::Rg16Float
            | Format::R32Float
            | Format::R32Uint => 4,
            Format::Rg8Unorm | Format::R16Float => 2,
            Format::R8Unorm => 1,
        }
    }

    pub fn channels(self) -> usize {
        match self {
            Format::Rgba16Float | Format::Rgba8Unorm => 4,
            Format::Rg16Float | Format::Rg32Float | Format::Rg8Unorm => 2,
            Format::R16Float
            | Format::R32Float
            | Format::R32Uint
            | Format::R8Unorm => 1,
        }
    }

    /// Encodes a single texel of given value; channels the format doesn't
    /// have are dropped.
    pub fn encode(self, value: Vec4) -> Vec<u8> {
        let channels = &value.to_array()[..self.channels()];

        match self {
            Format::Rgba16Float | Format::Rg16Float | Format::R16Float => {
                channels
                    .iter()
                    .flat_map(|c| f16::from_f32(*c).to_le_bytes())
                    .collect()
            }

            Format::Rg32Float | Format::R32Float => {
                channels.iter().flat_map(|c| c.to_le_bytes()).collect()
            }

            Format::R32Uint => channels
                .iter()
                .flat_map(|c| (*c as u32).to_le_bytes())
                .collect(),

            Format::Rgba8Unorm | Format::Rg8Unorm | Format::R8Unorm => channels
                .iter()
                .map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)
                .collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextureDescriptor {
    pub label: String,
    pub size: UVec2,
    pub format: Format,
    pub mips: u32,

    /// Whether kernels can write into this texture.
    pub storage: bool,
}

/// Names a kernel plus the keywords (variant switches) it gets compiled with;
/// keywords passed on dispatch are added on top of these.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KernelDescriptor {
    pub name: &'static str,
    pub keywords: Vec<&'static str>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BoundResource {
    /// Texture read by the kernel.
    Texture(ResourceView),

    /// Texture written (and possibly read) by the kernel.
    StorageTexture(ResourceView),

    ConstantBuffer(BufferId),
}

impl BoundResource {
    pub fn view(&self) -> Option<ResourceView> {
        match self {
            BoundResource::Texture(view)
            | BoundResource::StorageTexture(view) => Some(*view),
            BoundResource::ConstantBuffer(_) => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Binding {
    pub slot: &'static str,
    pub resource: BoundResource,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DispatchCommand {
    pub kernel: KernelId,
    pub label: &'static str,
    pub keywords: Vec<&'static str>,

    /// Resources, in binding order.
    pub bindings: Vec<Binding>,

    /// Number of thread groups.
    pub groups: UVec3,
}

impl DispatchCommand {
    pub fn binding(&self, slot: &str) -> Option<&BoundResource> {
        self.bindings
            .iter()
            .find(|binding| binding.slot == slot)
            .map(|binding| &binding.resource)
    }
}

use std::collections::{BTreeMap, BTreeSet};

use glam::Vec4;

use crate::{
    Backend, BufferId, DispatchCommand, Error, KernelDescriptor, KernelId,
    Result, TextureDescriptor, TextureId,
};

/// Backend that doesn't talk to any GPU, but rather remembers what was asked
/// of it; useful for testing integrations without a device.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    next_id: u32,
    textures: BTreeMap<TextureId, RecordedTexture>,
    buffers: BTreeMap<BufferId, usize>,
    kernels: Vec<KernelDescriptor>,
    unavailable_kernels: BTreeSet<&'static str>,
    failing_textures: BTreeSet<String>,
    failing_buffers: BTreeSet<String>,
    created_textures: usize,
    destroyed_textures: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RecordedTexture {
    pub descriptor: TextureDescriptor,
    pub data: Option<Vec<u8>>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    WriteBuffer { buffer: BufferId, data: Vec<u8> },
    ClearTexture { texture: TextureId, value: Vec4 },
    Dispatch(DispatchCommand),
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes [`Backend::create_kernel()`] fail for given kernel.
    pub fn without_kernel(mut self, name: &'static str) -> Self {
        self.unavailable_kernels.insert(name);
        self
    }

    /// Makes [`Backend::create_texture()`] fail for given label.
    pub fn without_texture(mut self, label: impl ToString) -> Self {
        self.set_texture_failing(label, true);
        self
    }

    /// Makes [`Backend::create_buffer()`] fail for given label.
    pub fn without_buffer(mut self, label: impl ToString) -> Self {
        self.failing_buffers.insert(label.to_string());
        self
    }

    /// Toggles whether [`Backend::create_texture()`] fails for given label.
    pub fn set_texture_failing(
        &mut self,
        label: impl ToString,
        failing: bool,
    ) {
        let label = label.to_string();

        if failing {
            self.failing_textures.insert(label);
        } else {
            self.failing_textures.remove(&label);
        }
    }

    /// Registers a texture that's owned by the host (e.g. the color buffer
    /// the upscaler reads from).
    pub fn import_texture(
        &mut self,
        descriptor: TextureDescriptor,
    ) -> TextureId {
        let id = self.next_texture_id();

        self.textures.insert(
            id,
            RecordedTexture {
                descriptor,
                data: None,
            },
        );

        id
    }

    pub fn texture(&self, id: TextureId) -> Option<&RecordedTexture> {
        self.textures.get(&id)
    }

    pub fn find_texture(&self, label: &str) -> Option<TextureId> {
        self.textures
            .iter()
            .find(|(_, tex)| tex.descriptor.label == label)
            .map(|(id, _)| *id)
    }

    /// Number of textures currently alive (including imported ones).
    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }

    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    pub fn created_textures(&self) -> usize {
        self.created_textures
    }

    pub fn destroyed_textures(&self) -> usize {
        self.destroyed_textures
    }

    pub fn kernel(&self, id: KernelId) -> Option<&KernelDescriptor> {
        self.kernels.get(id.0 as usize)
    }

    fn next_texture_id(&mut self) -> TextureId {
        self.next_id += 1;

        TextureId(self.next_id)
    }
}

impl Backend for RecordingBackend {
    type Encoder = Vec<Command>;

    fn create_texture(
        &mut self,
        descriptor: &TextureDescriptor,
    ) -> Result<TextureId> {
        if self.failing_textures.contains(&descriptor.label) {
            return Err(Error::TextureCreation {
                label: descriptor.label.clone(),
                reason: "rejected by the backend".into(),
            });
        }

        let id = self.import_texture(descriptor.clone());

        self.created_textures += 1;

        Ok(id)
    }

    fn write_texture(&mut self, texture: TextureId, data: &[u8]) {
        if let Some(tex) = self.textures.get_mut(&texture) {
            tex.data = Some(data.to_vec());
        }
    }

    fn destroy_texture(&mut self, texture: TextureId) {
        if self.textures.remove(&texture).is_some() {
            self.destroyed_textures += 1;
        }
    }

    fn create_buffer(&mut self, label: &str, size: usize) -> Result<BufferId> {
        if self.failing_buffers.contains(label) {
            return Err(Error::BufferCreation {
                label: label.into(),
                reason: "rejected by the backend".into(),
            });
        }

        self.next_id += 1;

        let id = BufferId(self.next_id);

        self.buffers.insert(id, size);

        Ok(id)
    }

    fn destroy_buffer(&mut self, buffer: BufferId) {
        self.buffers.remove(&buffer);
    }

    fn create_kernel(
        &mut self,
        descriptor: &KernelDescriptor,
    ) -> Result<KernelId> {
        if self.unavailable_kernels.contains(descriptor.name) {
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
        encoder.push(Command::WriteBuffer {
            buffer,
            data: data.to_vec(),
        });
    }

    fn clear_texture(
        &mut self,
        encoder: &mut Self::Encoder,
        texture: TextureId,
        value: Vec4,
    ) {
        encoder.push(Command::ClearTexture { texture, value });
    }

    fn dispatch(&mut self, encoder: &mut Self::Encoder, cmd: &DispatchCommand) {
        encoder.push(Command::Dispatch(cmd.clone()));
    }
}

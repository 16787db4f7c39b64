use std::ops::{Deref, DerefMut};
use std::{any, mem};

use bytemuck::Pod;
use log::debug;

use crate::{Backend, BoundResource, BufferId, Result};

/// Constant buffer with a CPU-side copy of its contents; changes are uploaded
/// on [`Self::flush()`].
#[derive(Debug)]
pub struct ConstantBuffer<T> {
    buffer: BufferId,
    data: T,
    dirty: bool,
}

impl<T> ConstantBuffer<T>
where
    T: Pod,
{
    pub fn new<B>(backend: &mut B, label: impl AsRef<str>) -> Result<Self>
    where
        B: Backend,
        T: Default,
    {
        let label = format!("loupe_{}", label.as_ref());
        let size = mem::size_of::<T>();

        debug!(
            "Allocating constant buffer `{label}`; ty={}, size={size}",
            any::type_name::<T>(),
        );

        let buffer = backend.create_buffer(&label, size)?;

        Ok(Self {
            buffer,
            data: T::default(),
            dirty: true,
        })
    }

    /// Replaces the contents, marking the buffer as dirty only if they
    /// actually changed.
    pub fn set(&mut self, data: T)
    where
        T: PartialEq,
    {
        if self.data != data {
            self.data = data;
            self.dirty = true;
        }
    }

    /// Records an upload of the contents, if they changed since the last
    /// flush.
    pub fn flush<B>(&mut self, backend: &mut B, encoder: &mut B::Encoder)
    where
        B: Backend,
    {
        if !mem::take(&mut self.dirty) {
            return;
        }

        backend.write_buffer(
            encoder,
            self.buffer,
            bytemuck::bytes_of(&self.data),
        );
    }

    pub fn id(&self) -> BufferId {
        self.buffer
    }

    pub fn bind(&self) -> BoundResource {
        BoundResource::ConstantBuffer(self.buffer)
    }

    pub fn destroy<B>(self, backend: &mut B)
    where
        B: Backend,
    {
        backend.destroy_buffer(self.buffer);
    }
}

impl<T> Deref for ConstantBuffer<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl<T> DerefMut for ConstantBuffer<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.dirty = true;

        &mut self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{gpu, Command, RecordingBackend};

    #[test]
    fn flush() {
        let mut backend = RecordingBackend::new();
        let mut encoder = Vec::new();

        let mut buffer =
            ConstantBuffer::<gpu::RcasConstants>::new(&mut backend, "cb_rcas")
                .unwrap();

        buffer.flush(&mut backend, &mut encoder);
        buffer.flush(&mut backend, &mut encoder);

        assert_eq!(1, encoder.len());

        buffer.set(gpu::RcasConstants::default());
        buffer.flush(&mut backend, &mut encoder);

        assert_eq!(1, encoder.len());

        buffer.set(gpu::RcasConstants::for_sharpness(1.0));
        buffer.flush(&mut backend, &mut encoder);

        assert_eq!(
            Some(&Command::WriteBuffer {
                buffer: buffer.buffer,
                data: bytemuck::bytes_of(&*buffer).to_vec(),
            }),
            encoder.last()
        );

        buffer.destroy(&mut backend);

        assert_eq!(0, backend.live_buffers());
    }
}

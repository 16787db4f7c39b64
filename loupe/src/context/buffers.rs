use bytemuck::Pod;
use log::debug;

use crate::{gpu, Backend, BufferId, ConstantBuffer, Result};

/// Constant buffers shared by the passes.
#[derive(Debug)]
pub struct ContextBuffers {
    pub upscaler: ConstantBuffer<gpu::UpscalerConstants>,
    pub spd: ConstantBuffer<gpu::SpdConstants>,
    pub rcas: ConstantBuffer<gpu::RcasConstants>,
    pub generate_reactive: ConstantBuffer<gpu::GenerateReactiveConstants>,
    pub tcr_autogen: ConstantBuffer<gpu::TcrAutogenConstants>,
}

impl ContextBuffers {
    /// Allocates all buffers; on failure, the ones already allocated are
    /// released before the error is returned.
    pub fn new<B>(backend: &mut B) -> Result<Self>
    where
        B: Backend,
    {
        debug!("Initializing context buffers");

        let mut allocated = Vec::new();
        let buffers = Self::allocate(backend, &mut allocated);

        if buffers.is_err() {
            debug!("Releasing {} context buffer(s)", allocated.len());

            for buffer in allocated {
                backend.destroy_buffer(buffer);
            }
        }

        buffers
    }

    fn allocate<B>(
        backend: &mut B,
        allocated: &mut Vec<BufferId>,
    ) -> Result<Self>
    where
        B: Backend,
    {
        fn buffer<B, T>(
            backend: &mut B,
            allocated: &mut Vec<BufferId>,
            label: &str,
        ) -> Result<ConstantBuffer<T>>
        where
            B: Backend,
            T: Pod + Default,
        {
            let buffer = ConstantBuffer::<T>::new(backend, label)?;

            allocated.push(buffer.id());

            Ok(buffer)
        }

        Ok(Self {
            upscaler: buffer(backend, allocated, "cb_upscaler")?,
            spd: buffer(backend, allocated, "cb_spd")?,
            rcas: buffer(backend, allocated, "cb_rcas")?,
            generate_reactive: buffer(
                backend,
                allocated,
                "cb_generate_reactive",
            )?,
            tcr_autogen: buffer(backend, allocated, "cb_tcr_autogen")?,
        })
    }

    /// Records uploads of all buffers that changed since the last flush.
    pub fn flush<B>(&mut self, backend: &mut B, encoder: &mut B::Encoder)
    where
        B: Backend,
    {
        self.upscaler.flush(backend, encoder);
        self.spd.flush(backend, encoder);
        self.rcas.flush(backend, encoder);
        self.generate_reactive.flush(backend, encoder);
        self.tcr_autogen.flush(backend, encoder);
    }

    pub fn destroy<B>(self, backend: &mut B)
    where
        B: Backend,
    {
        self.upscaler.destroy(backend);
        self.spd.destroy(backend);
        self.rcas.destroy(backend);
        self.generate_reactive.destroy(backend);
        self.tcr_autogen.destroy(backend);
    }
}

use crate::context::{Bindings, ComputePass, Frame};
use crate::{gpu, Backend, ContextDescription, Result};

/// Finds thin features worth locking (i.e. keeping in history despite
/// failing the usual rejection heuristics) and marks them in the new-locks
/// mask.
#[derive(Debug)]
pub struct LockPass {
    pass: ComputePass,
}

impl LockPass {
    pub fn new<B>(backend: &mut B, desc: &ContextDescription) -> Result<Self>
    where
        B: Backend,
    {
        let pass = ComputePass::builder("lock")
            .with_flags(&desc.flags)
            .build(backend)?;

        Ok(Self { pass })
    }

    pub fn run<B>(
        &self,
        backend: &mut B,
        encoder: &mut B::Encoder,
        frame: &Frame,
    ) where
        B: Backend,
    {
        let scratch = frame.scratch;

        let bindings = Bindings::new()
            .constants("cb_upscaler", &frame.buffers.upscaler)
            .read("r_lock_input_luma", scratch.prepared_input_color.view())
            .read(
                "r_dilated_reactive_masks",
                scratch.dilated_reactive_masks.view(),
            )
            .write("rw_new_locks", scratch.new_locks.view())
            .write(
                "rw_reconstructed_previous_nearest_depth",
                scratch.reconstructed_previous_nearest_depth.view(),
            );

        let groups =
            gpu::dispatch_size(frame.render_size, gpu::WORK_REGION_DIM);

        self.pass.run(backend, encoder, groups, &[], bindings);
    }
}

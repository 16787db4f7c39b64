use crate::context::{Bindings, ComputePass, Frame};
use crate::{gpu, Backend, ContextDescription, Result};

/// Overwrites the output with a mosaic of internal buffers (dilated motion
/// vectors, depth, reactive masks, locks and the upscaled color).
#[derive(Debug)]
pub struct DebugViewPass {
    pass: ComputePass,
}

impl DebugViewPass {
    pub fn new<B>(backend: &mut B, desc: &ContextDescription) -> Result<Self>
    where
        B: Backend,
    {
        let pass = ComputePass::builder("debug_view")
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
        let res = frame.resources;
        let scratch = frame.scratch;
        let alternate = frame.alternate;

        let bindings = Bindings::new()
            .constants("cb_upscaler", &frame.buffers.upscaler)
            .read(
                "r_dilated_motion_vectors",
                res.dilated_motion_vectors.curr(alternate).view(),
            )
            .read("r_dilated_depth", scratch.dilated_depth.view())
            .read(
                "r_dilated_reactive_masks",
                scratch.dilated_reactive_masks.view(),
            )
            .read("r_lock_status", res.lock_status.curr(alternate).view())
            .read(
                "r_internal_upscaled_color",
                res.internal_upscaled_color.curr(alternate).view(),
            )
            .read("r_input_exposure", frame.inputs.exposure)
            .write("rw_upscaled_output", frame.inputs.output);

        let groups =
            gpu::dispatch_size(frame.upscale_size, gpu::WORK_REGION_DIM);

        self.pass.run(backend, encoder, groups, &[], bindings);
    }
}

use crate::context::{Bindings, ComputePass, Frame};
use crate::{gpu, Backend, ContextDescription, Result};

/// Dilates depth and motion vectors, prepares the input color and scatters
/// the current depth into where it was during the previous frame.
#[derive(Debug)]
pub struct ReconstructPreviousDepthPass {
    pass: ComputePass,
}

impl ReconstructPreviousDepthPass {
    pub fn new<B>(backend: &mut B, desc: &ContextDescription) -> Result<Self>
    where
        B: Backend,
    {
        let pass = ComputePass::builder("reconstruct_previous_depth")
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

        let bindings = Bindings::new()
            .constants("cb_upscaler", &frame.buffers.upscaler)
            .read("r_input_motion_vectors", frame.inputs.motion_vectors)
            .read("r_input_depth", frame.inputs.depth)
            .read("r_input_color_jittered", frame.inputs.color)
            .read("r_input_exposure", frame.inputs.exposure)
            .write(
                "rw_reconstructed_previous_nearest_depth",
                scratch.reconstructed_previous_nearest_depth.view(),
            )
            .write(
                "rw_dilated_motion_vectors",
                res.dilated_motion_vectors.curr(frame.alternate).view(),
            )
            .write("rw_dilated_depth", scratch.dilated_depth.view())
            .write(
                "rw_prepared_input_color",
                scratch.prepared_input_color.view(),
            );

        // This pass uses 8x8 warps:
        let groups =
            gpu::dispatch_size(frame.render_size, gpu::WORK_REGION_DIM);

        self.pass.run(backend, encoder, groups, &[], bindings);
    }
}

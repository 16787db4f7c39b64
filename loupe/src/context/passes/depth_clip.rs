use crate::context::{Bindings, ComputePass, Frame};
use crate::{gpu, Backend, ContextDescription, Result};

/// Detects disocclusions by comparing the current depth against the
/// reconstructed previous one and merges the result with the reactive and
/// transparency-and-composition masks.
#[derive(Debug)]
pub struct DepthClipPass {
    pass: ComputePass,
}

impl DepthClipPass {
    pub fn new<B>(backend: &mut B, desc: &ContextDescription) -> Result<Self>
    where
        B: Backend,
    {
        let pass = ComputePass::builder("depth_clip")
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
            .read(
                "r_reconstructed_previous_nearest_depth",
                scratch.reconstructed_previous_nearest_depth.view(),
            )
            .read(
                "r_dilated_motion_vectors",
                res.dilated_motion_vectors.curr(frame.alternate).view(),
            )
            .read(
                "r_previous_dilated_motion_vectors",
                res.dilated_motion_vectors.prev(frame.alternate).view(),
            )
            .read("r_dilated_depth", scratch.dilated_depth.view())
            .read("r_reactive_mask", frame.inputs.reactive)
            .read(
                "r_transparency_and_composition_mask",
                frame.inputs.transparency_and_composition,
            )
            .read("r_prepared_input_color", scratch.prepared_input_color.view())
            .read("r_input_motion_vectors", frame.inputs.motion_vectors)
            .read("r_input_depth", frame.inputs.depth)
            .read("r_input_exposure", frame.inputs.exposure)
            .write(
                "rw_dilated_reactive_masks",
                scratch.dilated_reactive_masks.view(),
            );

        let groups =
            gpu::dispatch_size(frame.render_size, gpu::WORK_REGION_DIM);

        self.pass.run(backend, encoder, groups, &[], bindings);
    }
}

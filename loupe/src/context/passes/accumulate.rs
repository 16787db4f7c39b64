use crate::context::{keywords, Bindings, ComputePass, Frame};
use crate::{gpu, Backend, ContextDescription, Result};

/// Reprojects history, blends it with the current frame and writes the new
/// history (plus the output, unless sharpening takes care of it).
#[derive(Debug)]
pub struct AccumulatePass {
    pass: ComputePass,
}

impl AccumulatePass {
    pub fn new<B>(backend: &mut B, desc: &ContextDescription) -> Result<Self>
    where
        B: Backend,
    {
        let pass = ComputePass::builder("accumulate")
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
            .read("r_input_exposure", frame.inputs.exposure)
            .read(
                "r_dilated_reactive_masks",
                scratch.dilated_reactive_masks.view(),
            )
            .read("r_input_motion_vectors", frame.inputs.motion_vectors)
            .read(
                "r_dilated_motion_vectors",
                res.dilated_motion_vectors.curr(alternate).view(),
            )
            .read(
                "r_internal_upscaled_color",
                res.internal_upscaled_color.prev(alternate).view(),
            )
            .read("r_lock_status", res.lock_status.prev(alternate).view())
            .read("r_luma_history", res.luma_history.prev(alternate).view())
            .read("r_prepared_input_color", scratch.prepared_input_color.view())
            .read("r_new_locks", scratch.new_locks.view())
            .read("r_shading_change", scratch.shading_change.view())
            .read(
                "r_img_mip_5",
                res.scene_luminance.mip(gpu::LOCK_LUMA_MIP_LEVEL),
            )
            .read("r_lanczos_lut", res.lanczos_lut.view())
            .read(
                "r_upsample_maximum_bias_lut",
                res.maximum_bias_lut.view(),
            )
            .write(
                "rw_internal_upscaled_color",
                res.internal_upscaled_color.curr(alternate).view(),
            )
            .write("rw_lock_status", res.lock_status.curr(alternate).view())
            .write("rw_luma_history", res.luma_history.curr(alternate).view())
            .write("rw_upscaled_output", frame.inputs.output);

        let keywords: &[_] = if frame.sharpening() {
            &[keywords::APPLY_SHARPENING]
        } else {
            &[]
        };

        let groups =
            gpu::dispatch_size(frame.upscale_size, gpu::WORK_REGION_DIM);

        self.pass.run(backend, encoder, groups, keywords, bindings);
    }
}

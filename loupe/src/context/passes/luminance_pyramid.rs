use crate::context::{spd_setup, Bindings, ComputePass, Frame};
use crate::{gpu, Backend, ContextDescription, Result};

/// Downsamples the scene's luminance (and farthest depth) in a single
/// dispatch, estimating exposure and shading change on the way.
///
/// Work groups coordinate through a global atomic counter: the last one to
/// finish produces the lowest mips (including the 1x1 auto-exposure) and
/// resets the counter back to zero.
#[derive(Debug)]
pub struct LuminancePyramidPass {
    pass: ComputePass,
}

impl LuminancePyramidPass {
    pub fn new<B>(backend: &mut B, desc: &ContextDescription) -> Result<Self>
    where
        B: Backend,
    {
        let pass = ComputePass::builder("luminance_pyramid")
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
            .constants("cb_spd", &frame.buffers.spd)
            .read("r_input_color_jittered", frame.inputs.color)
            .read("r_dilated_depth", scratch.dilated_depth.view())
            .read(
                "r_luma_history",
                res.luma_history.prev(frame.alternate).view(),
            )
            .write("rw_spd_global_atomic", res.spd_atomic_counter.view())
            .write("rw_auto_exposure", res.auto_exposure.view())
            .write(
                "rw_img_mip_shading_change",
                res.scene_luminance.mip(gpu::SHADING_CHANGE_MIP_LEVEL),
            )
            .write(
                "rw_img_mip_5",
                res.scene_luminance.mip(gpu::LOCK_LUMA_MIP_LEVEL),
            )
            .write(
                "rw_farthest_depth_mip1",
                scratch.farthest_depth_mip1.view(),
            )
            .write("rw_shading_change", scratch.shading_change.view());

        let groups = spd_setup(frame.render_size).dispatch_size;

        self.pass.run(backend, encoder, groups, &[], bindings);
    }
}

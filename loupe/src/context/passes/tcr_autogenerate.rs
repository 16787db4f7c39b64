use crate::context::{Bindings, ComputePass, Frame, FrameInputs};
use crate::{gpu, Backend, ContextDescription, ResourceView, Result};

/// Derives reactive and transparency-and-composition masks by comparing the
/// opaque-only and final colors of this and the previous frame.
#[derive(Debug)]
pub struct TcrAutogeneratePass {
    pass: ComputePass,
}

impl TcrAutogeneratePass {
    pub fn new<B>(backend: &mut B, desc: &ContextDescription) -> Result<Self>
    where
        B: Backend,
    {
        let pass = ComputePass::builder("tcr_autogenerate")
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
        let Some(tcr) = &frame.resources.tcr else {
            return;
        };

        let alternate = frame.alternate;

        let opaque_only = frame
            .desc
            .auto_tcr
            .as_ref()
            .map_or(ResourceView::NULL, |desc| desc.opaque_only);

        let reactive =
            FrameInputs::reactive_before_tcr(frame.desc, frame.resources);

        let composition = frame
            .desc
            .transparency_and_composition
            .unwrap_or_else(|| frame.resources.default_reactivity.view());

        let bindings = Bindings::new()
            .constants("cb_upscaler", &frame.buffers.upscaler)
            .constants("cb_tcr_autogen", &frame.buffers.tcr_autogen)
            .read("r_input_opaque_only", opaque_only)
            .read("r_input_color_jittered", frame.inputs.color)
            .read("r_input_motion_vectors", frame.inputs.motion_vectors)
            .read(
                "r_input_prev_color_pre_alpha",
                tcr.prev_pre_alpha_color.prev(alternate).view(),
            )
            .read(
                "r_input_prev_color_post_alpha",
                tcr.prev_post_alpha_color.prev(alternate).view(),
            )
            .read("r_reactive_mask", reactive)
            .read("r_transparency_and_composition_mask", composition)
            .write("rw_output_autoreactive", tcr.reactive.view())
            .write("rw_output_autocomposition", tcr.composition.view())
            .write(
                "rw_output_prev_color_pre_alpha",
                tcr.prev_pre_alpha_color.curr(alternate).view(),
            )
            .write(
                "rw_output_prev_color_post_alpha",
                tcr.prev_post_alpha_color.curr(alternate).view(),
            );

        let groups =
            gpu::dispatch_size(frame.render_size, gpu::WORK_REGION_DIM);

        self.pass.run(backend, encoder, groups, &[], bindings);
    }
}

use crate::context::{Bindings, ComputePass, Frame};
use crate::{gpu, Backend, ContextDescription, Result};

/// Robust contrast-adaptive sharpening of the accumulated image, written into
/// the output.
#[derive(Debug)]
pub struct RcasPass {
    pass: ComputePass,
}

impl RcasPass {
    pub fn new<B>(backend: &mut B, desc: &ContextDescription) -> Result<Self>
    where
        B: Backend,
    {
        let pass = ComputePass::builder("rcas")
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
        let bindings = Bindings::new()
            .constants("cb_upscaler", &frame.buffers.upscaler)
            .constants("cb_rcas", &frame.buffers.rcas)
            .read("r_input_exposure", frame.inputs.exposure)
            .read(
                "r_rcas_input",
                frame
                    .resources
                    .internal_upscaled_color
                    .curr(frame.alternate)
                    .view(),
            )
            .write("rw_upscaled_output", frame.inputs.output);

        // This pass uses 16x16 warps:
        let groups =
            gpu::dispatch_size(frame.upscale_size, gpu::RCAS_WORK_REGION_DIM);

        self.pass.run(backend, encoder, groups, &[], bindings);
    }
}

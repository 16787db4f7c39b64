use glam::UVec2;

use crate::context::{Bindings, ComputePass, ContextBuffers, Frame};
use crate::{gpu, Backend, ContextDescription, ResourceView, Result};

/// Derives a reactive mask from the difference between an opaque-only
/// capture and the final (transparency-including) color.
#[derive(Debug)]
pub struct GenerateReactivePass {
    pass: ComputePass,
}

impl GenerateReactivePass {
    pub fn new<B>(backend: &mut B, desc: &ContextDescription) -> Result<Self>
    where
        B: Backend,
    {
        let pass = ComputePass::builder("generate_reactive")
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
        let opaque_only = frame
            .desc
            .auto_reactive
            .as_ref()
            .map_or(ResourceView::NULL, |desc| desc.opaque_only);

        let output = frame
            .resources
            .auto_reactive
            .as_ref()
            .map_or(ResourceView::NULL, |texture| texture.view());

        self.record(
            backend,
            encoder,
            frame.buffers,
            opaque_only,
            frame.inputs.color,
            output,
            frame.render_size,
        );
    }

    #[allow(clippy::too_many_arguments)]
    pub fn record<B>(
        &self,
        backend: &mut B,
        encoder: &mut B::Encoder,
        buffers: &ContextBuffers,
        opaque_only: ResourceView,
        color: ResourceView,
        output: ResourceView,
        render_size: UVec2,
    ) where
        B: Backend,
    {
        let bindings = Bindings::new()
            .constants("cb_upscaler", &buffers.upscaler)
            .constants("cb_generate_reactive", &buffers.generate_reactive)
            .read("r_input_opaque_only", opaque_only)
            .read("r_input_color_jittered", color)
            .write("rw_output_autoreactive", output);

        let groups = gpu::dispatch_size(render_size, gpu::WORK_REGION_DIM);

        self.pass.run(backend, encoder, groups, &[], bindings);
    }
}

use bytemuck::Pod;
use glam::{UVec2, UVec3};
use log::{debug, trace};

use crate::{
    Backend, Binding, BoundResource, ConstantBuffer, ContextFlags,
    DispatchCommand, KernelDescriptor, KernelId, ResourceView, Result,
};

/// Shader keywords (variant switches) kernels get compiled with.
pub mod keywords {
    pub const HDR_COLOR_INPUT: &str = "HDR_COLOR_INPUT";
    pub const LOW_RESOLUTION_MOTION_VECTORS: &str =
        "LOW_RESOLUTION_MOTION_VECTORS";
    pub const JITTERED_MOTION_VECTORS: &str = "JITTERED_MOTION_VECTORS";
    pub const INVERTED_DEPTH: &str = "INVERTED_DEPTH";

    /// Makes the accumulation pass skip writing the output, leaving that to
    /// the sharpening pass.
    pub const APPLY_SHARPENING: &str = "APPLY_SHARPENING";
}

#[derive(Clone, Debug)]
pub struct ComputePass {
    label: &'static str,
    kernel: KernelId,
}

impl ComputePass {
    pub fn builder(label: &'static str) -> ComputePassBuilder {
        ComputePassBuilder {
            label,
            keywords: Default::default(),
        }
    }

    pub fn run<B>(
        &self,
        backend: &mut B,
        encoder: &mut B::Encoder,
        groups: UVec2,
        keywords: &[&'static str],
        bindings: Bindings,
    ) where
        B: Backend,
    {
        trace!(
            "Dispatching pass `{}`; groups={groups:?}, keywords={keywords:?}",
            self.label
        );

        backend.dispatch(
            encoder,
            &DispatchCommand {
                kernel: self.kernel,
                label: self.label,
                keywords: keywords.to_vec(),
                bindings: bindings.0,
                groups: groups.extend(1),
            },
        );
    }
}

pub struct ComputePassBuilder {
    label: &'static str,
    keywords: Vec<&'static str>,
}

impl ComputePassBuilder {
    pub fn keyword_if(mut self, cond: bool, keyword: &'static str) -> Self {
        if cond {
            self.keywords.push(keyword);
        }

        self
    }

    /// Adds keywords implied by the context's features.
    pub fn with_flags(self, flags: &ContextFlags) -> Self {
        self.keyword_if(flags.hdr, keywords::HDR_COLOR_INPUT)
            .keyword_if(
                flags.low_resolution_motion_vectors,
                keywords::LOW_RESOLUTION_MOTION_VECTORS,
            )
            .keyword_if(
                flags.motion_vectors_jitter_cancellation,
                keywords::JITTERED_MOTION_VECTORS,
            )
            .keyword_if(flags.depth_inverted, keywords::INVERTED_DEPTH)
    }

    pub fn build<B>(self, backend: &mut B) -> Result<ComputePass>
    where
        B: Backend,
    {
        debug!(
            "Initializing pass: {}; keywords={:?}",
            self.label, self.keywords
        );

        let kernel = backend.create_kernel(&KernelDescriptor {
            name: self.label,
            keywords: self.keywords,
        })?;

        Ok(ComputePass {
            label: self.label,
            kernel,
        })
    }
}

/// Resources bound to a single dispatch, in slot order.
#[derive(Debug, Default)]
pub struct Bindings(Vec<Binding>);

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn constants<T>(
        mut self,
        slot: &'static str,
        buffer: &ConstantBuffer<T>,
    ) -> Self
    where
        T: Pod,
    {
        self.push(slot, buffer.bind());
        self
    }

    pub fn read(mut self, slot: &'static str, view: ResourceView) -> Self {
        self.push(slot, BoundResource::Texture(view));
        self
    }

    pub fn write(mut self, slot: &'static str, view: ResourceView) -> Self {
        self.push(slot, BoundResource::StorageTexture(view));
        self
    }

    fn push(&mut self, slot: &'static str, resource: BoundResource) {
        self.0.push(Binding { slot, resource });
    }
}

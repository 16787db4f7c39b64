use glam::UVec2;
use log::debug;

use super::{ContextBuffers, FrameInputs, Resources, Scratch};
use crate::{Backend, ContextDescription, DispatchDescription, Result};

macro_rules! passes {
    ([ $( $name:ident => $class:ident, )* ]) => {
        $( mod $name; )*
        $( pub use self::$name::*; )*

        #[derive(Debug)]
        pub struct Passes {
            $( pub $name: $class, )*
        }

        impl Passes {
            pub fn new<B>(
                backend: &mut B,
                desc: &ContextDescription,
            ) -> Result<Self>
            where
                B: Backend,
            {
                debug!("Initializing passes");

                Ok(Self {
                    $( $name: $class::new(backend, desc)?, )*
                })
            }
        }
    };
}

passes!([
    accumulate => AccumulatePass,
    debug_view => DebugViewPass,
    depth_clip => DepthClipPass,
    generate_reactive => GenerateReactivePass,
    lock => LockPass,
    luminance_pyramid => LuminancePyramidPass,
    rcas => RcasPass,
    reconstruct_previous_depth => ReconstructPreviousDepthPass,
    tcr_autogenerate => TcrAutogeneratePass,
]);

impl Passes {
    /// Records all passes of a single frame, in their execution order.
    pub fn run<B>(
        &self,
        backend: &mut B,
        encoder: &mut B::Encoder,
        frame: &Frame,
    ) where
        B: Backend,
    {
        if frame.desc.auto_reactive.is_some() {
            self.generate_reactive.run(backend, encoder, frame);
        }

        if frame.desc.auto_tcr.is_some() {
            self.tcr_autogenerate.run(backend, encoder, frame);
        }

        self.reconstruct_previous_depth.run(backend, encoder, frame);
        self.luminance_pyramid.run(backend, encoder, frame);
        self.depth_clip.run(backend, encoder, frame);
        self.lock.run(backend, encoder, frame);
        self.accumulate.run(backend, encoder, frame);

        if frame.sharpening() {
            self.rcas.run(backend, encoder, frame);
        }

        if frame.desc.debug_view {
            self.debug_view.run(backend, encoder, frame);
        }
    }
}

/// Everything the passes of a single dispatch get to see.
#[derive(Debug)]
pub struct Frame<'a> {
    pub desc: &'a DispatchDescription,
    pub inputs: FrameInputs,
    pub resources: &'a Resources,
    pub scratch: &'a Scratch,
    pub buffers: &'a ContextBuffers,

    /// Parity of this frame; selects which halves of double-buffered
    /// resources are current.
    pub alternate: bool,

    pub render_size: UVec2,
    pub upscale_size: UVec2,
}

impl Frame<'_> {
    pub fn sharpening(&self) -> bool {
        self.desc.sharpening.enabled
    }
}

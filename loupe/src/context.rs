mod buffers;
mod constants;
mod inputs;
mod pass;
mod passes;
mod resources;
mod scratch;

use derivative::Derivative;
use glam::{UVec2, Vec4};
use log::{debug, info, trace};

use self::buffers::*;
use self::constants::*;
use self::inputs::*;
use self::pass::*;
use self::passes::*;
use self::resources::*;
use self::scratch::*;
pub use self::constants::RunningState;
pub use self::pass::keywords;
use crate::{
    gpu, validation, Backend, ContextDescription, DispatchDescription, Error,
    GenerateReactiveDescription, ReactiveMaskDescription, ResourceView, Result,
    TcrAutogenDescription,
};

/// Upscaling context: owns the history of a single view (e.g. camera) and
/// records the passes upscaling it, frame after frame.
///
/// Contexts are single-threaded - dispatches into the same context must be
/// serialized by the caller.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct Context {
    description: ContextDescription,
    resources: Resources,
    buffers: ContextBuffers,
    #[derivative(Debug = "ignore")]
    passes: Passes,
    state: RunningState,
}

impl Context {
    /// Name of the history-rejection scheme this context implements: pixels
    /// keep an explicit lock status that protects thin features from being
    /// rejected.
    pub const ALGORITHM: &'static str = "lock-status";

    /// Creates a context, allocating all of its persistent resources.
    ///
    /// Fails if any of the kernels is missing or any of the resources cannot
    /// be created; nothing is leaked in that case.
    pub fn new<B>(
        backend: &mut B,
        description: ContextDescription,
    ) -> Result<Self>
    where
        B: Backend,
    {
        info!(
            "Creating context; max_render_size={}, display_size={}, flags={:?}",
            description.max_render_size,
            description.display_size,
            description.flags,
        );

        if description.max_render_size.cmpeq(UVec2::ZERO).any() {
            return Err(Error::InvalidDescription("max render size is empty"));
        }

        if description.display_size.cmpeq(UVec2::ZERO).any() {
            return Err(Error::InvalidDescription("display size is empty"));
        }

        // Scene luminance needs the mip level the lock pass reads from
        if half_size(description.max_render_size).max_element()
            < 1 << gpu::LOCK_LUMA_MIP_LEVEL
        {
            return Err(Error::InvalidDescription(
                "max render size is too small for the luminance pyramid",
            ));
        }

        let passes = Passes::new(backend, &description)?;
        let buffers = ContextBuffers::new(backend)?;

        let resources = match Resources::new(backend, &description) {
            Ok(resources) => resources,

            Err(err) => {
                buffers.destroy(backend);
                return Err(err);
            }
        };

        debug!("Context created");

        Ok(Self {
            description,
            resources,
            buffers,
            passes,
            state: Default::default(),
        })
    }

    /// Records all passes upscaling a single frame.
    ///
    /// Contract violations of `desc` are logged (if the context has debug
    /// checking enabled), but never prevent the dispatch - an invalid input
    /// yields an invalid output. Errors are returned only when per-frame
    /// resources cannot be created.
    pub fn dispatch<B>(
        &mut self,
        backend: &mut B,
        encoder: &mut B::Encoder,
        desc: &DispatchDescription,
    ) -> Result<()>
    where
        B: Backend,
    {
        if self.description.flags.debug_checking {
            validation::report(&validation::check(&self.description, desc));
        }

        let reset = desc.reset || self.state.first_execution;
        let alternate = self.state.is_alternate();

        trace!(
            "Dispatching frame; resource_frame_index={}, reset={reset}",
            self.state.resource_frame_index,
        );

        // Everything fallible happens before anything gets recorded, so that
        // a failed dispatch can be retried with a fresh encoder
        self.resources.update_auto_reactive(
            backend,
            &self.description,
            desc.auto_reactive.is_some(),
        )?;

        self.resources.update_tcr(
            backend,
            &self.description,
            desc.auto_tcr.is_some(),
        )?;

        let mut scratch = ScratchGuard::acquire(backend, &self.description)?;
        let (backend, scratch) = scratch.split();

        let constants =
            build_constants(&self.description, desc, &self.state, reset);

        self.buffers.upscaler.set(constants);
        self.buffers.spd.set(build_spd_constants(desc.render_size));

        if desc.sharpening.enabled {
            self.buffers.rcas.set(gpu::RcasConstants::for_sharpness(
                desc.sharpening.sharpness,
            ));
        }

        if let Some(auto_reactive) = &desc.auto_reactive {
            self.buffers
                .generate_reactive
                .set(generate_reactive_constants(auto_reactive));
        }

        if let Some(auto_tcr) = &desc.auto_tcr {
            self.buffers.tcr_autogen.set(tcr_autogen_constants(auto_tcr));
        }

        self.buffers.flush(backend, encoder);
        self.resources.clear_fresh_tcr_history(backend, encoder);

        if reset {
            self.resources.clear_history(backend, encoder, alternate);
        }

        backend.clear_texture(
            encoder,
            scratch.reconstructed_previous_nearest_depth.id(),
            Vec4::ZERO,
        );

        let frame = Frame {
            desc,
            inputs: FrameInputs::resolve(
                &self.description.flags,
                desc,
                &self.resources,
            ),
            resources: &self.resources,
            scratch,
            buffers: &self.buffers,
            alternate,
            render_size: desc.render_size,
            upscale_size: upscale_size(&self.description, desc),
        };

        self.passes.run(backend, encoder, &frame);
        self.state.advance(&constants);

        Ok(())
    }

    /// Records a standalone reactive mask generation, e.g. to feed the mask
    /// into a later [`Self::dispatch()`].
    pub fn generate_reactive_mask<B>(
        &mut self,
        backend: &mut B,
        encoder: &mut B::Encoder,
        desc: &ReactiveMaskDescription,
    ) where
        B: Backend,
    {
        if self.description.flags.debug_checking {
            validation::report(&validation::check_reactive_mask(desc));
        }

        self.buffers
            .generate_reactive
            .set(generate_reactive_constants(&desc.params));

        self.buffers.generate_reactive.flush(backend, encoder);

        self.passes.generate_reactive.record(
            backend,
            encoder,
            &self.buffers,
            desc.params.opaque_only,
            desc.color,
            desc.output,
            desc.render_size,
        );
    }

    /// Releases all resources owned by the context.
    pub fn destroy<B>(self, backend: &mut B)
    where
        B: Backend,
    {
        info!("Destroying context");

        self.resources.destroy(backend);
        self.buffers.destroy(backend);
    }

    pub fn description(&self) -> &ContextDescription {
        &self.description
    }

    pub fn state(&self) -> &RunningState {
        &self.state
    }

    /// Index of the most recently dispatched frame, counted from the last
    /// reset.
    pub fn frame_index(&self) -> u32 {
        self.state.frame_index
    }

    /// Returns constants of the most recent dispatch.
    pub fn constants(&self) -> &gpu::UpscalerConstants {
        &self.buffers.upscaler
    }

    /// Returns the 1x1 fully-cleared reactive mask used when a dispatch
    /// doesn't provide one.
    pub fn default_reactive_mask(&self) -> ResourceView {
        self.resources.default_reactivity.view()
    }

    /// Returns the 1x1 exposure texture used when a dispatch doesn't provide
    /// one.
    pub fn default_exposure(&self) -> ResourceView {
        self.resources.default_exposure.view()
    }

    /// Returns the exposure computed by the luminance pyramid; only updated
    /// when the context has auto-exposure enabled.
    pub fn auto_exposure(&self) -> ResourceView {
        self.resources.auto_exposure.view()
    }
}

fn generate_reactive_constants(
    desc: &GenerateReactiveDescription,
) -> gpu::GenerateReactiveConstants {
    gpu::GenerateReactiveConstants {
        scale: desc.scale,
        threshold: desc.cutoff_threshold,
        binary_value: desc.binary_value,
        flags: desc.flags.bits(),
    }
}

fn tcr_autogen_constants(
    desc: &TcrAutogenDescription,
) -> gpu::TcrAutogenConstants {
    gpu::TcrAutogenConstants {
        auto_tc_threshold: desc.auto_tc_threshold,
        auto_tc_scale: desc.auto_tc_scale,
        auto_reactive_scale: desc.auto_reactive_scale,
        auto_reactive_max: desc.auto_reactive_max,
    }
}

#[cfg(test)]
mod tests {
    use glam::{uvec2, vec2};

    use super::*;
    use crate::{
        BoundResource, Command, DispatchCommand, Format, RecordingBackend,
        Sharpening, TextureDescriptor, TextureId,
    };

    const PERSISTENT_TEXTURES: usize = 15;

    struct Fixture {
        backend: RecordingBackend,
        desc: DispatchDescription,
    }

    impl Fixture {
        fn new() -> Self {
            let mut backend = RecordingBackend::new();

            let color = import(&mut backend, "color", Format::Rgba16Float);
            let depth = import(&mut backend, "depth", Format::R32Float);
            let mvs = import(&mut backend, "motion_vectors", Format::Rg16Float);
            let output = import(&mut backend, "output", Format::Rgba16Float);

            let desc = DispatchDescription {
                color,
                depth,
                motion_vectors: mvs,
                output,
                render_size: uvec2(64, 32),
                motion_vector_scale: vec2(64.0, -32.0),
                ..Default::default()
            };

            Self { backend, desc }
        }

        fn context(&mut self) -> Context {
            Context::new(&mut self.backend, description()).unwrap()
        }

        fn dispatch(
            &mut self,
            ctx: &mut Context,
            desc: &DispatchDescription,
        ) -> Vec<Command> {
            let mut encoder = Vec::new();

            ctx.dispatch(&mut self.backend, &mut encoder, desc).unwrap();
            encoder
        }
    }

    fn description() -> ContextDescription {
        ContextDescription::new(uvec2(64, 32), uvec2(128, 64))
    }

    fn import(
        backend: &mut RecordingBackend,
        label: &str,
        format: Format,
    ) -> ResourceView {
        backend
            .import_texture(TextureDescriptor {
                label: label.into(),
                size: uvec2(128, 64),
                format,
                mips: 1,
                storage: true,
            })
            .into()
    }

    fn dispatches(encoder: &[Command]) -> Vec<&DispatchCommand> {
        encoder
            .iter()
            .filter_map(|cmd| match cmd {
                Command::Dispatch(cmd) => Some(cmd),
                _ => None,
            })
            .collect()
    }

    fn labels(encoder: &[Command]) -> Vec<&'static str> {
        dispatches(encoder).into_iter().map(|cmd| cmd.label).collect()
    }

    fn pass<'a>(encoder: &'a [Command], label: &str) -> &'a DispatchCommand {
        dispatches(encoder)
            .into_iter()
            .find(|cmd| cmd.label == label)
            .unwrap_or_else(|| panic!("pass `{label}` wasn't dispatched"))
    }

    /// Returns clears of textures that outlive the dispatch.
    fn history_clears(
        backend: &RecordingBackend,
        encoder: &[Command],
    ) -> Vec<(TextureId, Vec4)> {
        encoder
            .iter()
            .filter_map(|cmd| match cmd {
                Command::ClearTexture { texture, value }
                    if backend.texture(*texture).is_some() =>
                {
                    Some((*texture, *value))
                }
                _ => None,
            })
            .collect()
    }

    #[test]
    fn pass_order() {
        let mut fx = Fixture::new();
        let mut ctx = fx.context();
        let desc = fx.desc.clone();
        let encoder = fx.dispatch(&mut ctx, &desc);

        assert_eq!(
            vec![
                "reconstruct_previous_depth",
                "luminance_pyramid",
                "depth_clip",
                "lock",
                "accumulate",
            ],
            labels(&encoder)
        );

        for cmd in dispatches(&encoder) {
            assert_eq!("cb_upscaler", cmd.bindings[0].slot);
        }

        let desc = DispatchDescription {
            sharpening: Sharpening {
                enabled: true,
                sharpness: 0.5,
            },
            auto_reactive: Some(GenerateReactiveDescription {
                opaque_only: fx.desc.color,
                ..Default::default()
            }),
            auto_tcr: Some(TcrAutogenDescription {
                opaque_only: fx.desc.color,
                ..Default::default()
            }),
            debug_view: true,
            ..fx.desc.clone()
        };

        let encoder = fx.dispatch(&mut ctx, &desc);

        assert_eq!(
            vec![
                "generate_reactive",
                "tcr_autogenerate",
                "reconstruct_previous_depth",
                "luminance_pyramid",
                "depth_clip",
                "lock",
                "accumulate",
                "rcas",
                "debug_view",
            ],
            labels(&encoder)
        );
    }

    #[test]
    fn work_regions() {
        let mut fx = Fixture::new();
        let mut ctx = fx.context();

        let desc = DispatchDescription {
            sharpening: Sharpening {
                enabled: true,
                sharpness: 1.0,
            },
            ..fx.desc.clone()
        };

        let encoder = fx.dispatch(&mut ctx, &desc);

        // render size = 64x32, display size = 128x64
        assert_eq!(
            UVec2::new(8, 4),
            pass(&encoder, "depth_clip").groups.truncate()
        );

        assert_eq!(
            UVec2::new(1, 1),
            pass(&encoder, "luminance_pyramid").groups.truncate()
        );

        assert_eq!(
            UVec2::new(16, 8),
            pass(&encoder, "accumulate").groups.truncate()
        );

        assert_eq!(
            UVec2::new(8, 4),
            pass(&encoder, "rcas").groups.truncate()
        );

        assert_eq!(
            vec![keywords::APPLY_SHARPENING],
            pass(&encoder, "accumulate").keywords
        );

        assert_eq!(gpu::RCAS_CONSTANTS[20], *ctx.buffers.rcas);

        assert_eq!(
            Some(&ctx.buffers.rcas.bind()),
            pass(&encoder, "rcas").binding("cb_rcas")
        );
    }

    #[test]
    fn history_parity() {
        let mut fx = Fixture::new();
        let mut ctx = fx.context();
        let desc = fx.desc.clone();

        for n in 0..4 {
            let encoder = fx.dispatch(&mut ctx, &desc);
            let accumulate = pass(&encoder, "accumulate");
            let history = &ctx.resources.internal_upscaled_color;

            // Frame `n` writes into `n % 2` and reads from the other one
            assert_eq!(
                Some(&BoundResource::StorageTexture(
                    history.get(n % 2 == 1).view()
                )),
                accumulate.binding("rw_internal_upscaled_color")
            );

            assert_eq!(
                Some(&BoundResource::Texture(history.get(n % 2 == 0).view())),
                accumulate.binding("r_internal_upscaled_color")
            );
        }

        assert_eq!(4, ctx.state().resource_frame_index);
        assert_eq!(3, ctx.frame_index());
    }

    #[test]
    fn reset_behaves_like_first_execution() {
        let mut fx = Fixture::new();
        let mut ctx = fx.context();
        let desc = fx.desc.clone();

        let first = fx.dispatch(&mut ctx, &desc);
        let first_clears = history_clears(&fx.backend, &first);

        assert_eq!(0, ctx.frame_index());
        assert_eq!(0, ctx.constants().frame_index);
        assert!(!first_clears.is_empty());

        let second = fx.dispatch(&mut ctx, &desc);

        assert_eq!(1, ctx.frame_index());
        assert!(history_clears(&fx.backend, &second).is_empty());

        // Same parity as the first frame
        let reset = DispatchDescription {
            reset: true,
            ..desc.clone()
        };

        let third = fx.dispatch(&mut ctx, &reset);

        assert_eq!(first_clears, history_clears(&fx.backend, &third));
        assert_eq!(0, ctx.frame_index());

        // Opposite parity clears the opposite halves
        let fourth = fx.dispatch(&mut ctx, &reset);
        let fourth_clears = history_clears(&fx.backend, &fourth);

        assert_eq!(first_clears.len(), fourth_clears.len());
        assert_ne!(first_clears, fourth_clears);

        assert!(fourth_clears.contains(&(
            ctx.resources.lock_status.get(false).id(),
            Vec4::ZERO
        )));

        fx.dispatch(&mut ctx, &desc);

        assert_eq!(1, ctx.frame_index());
        assert_eq!(1, ctx.constants().frame_index);
    }

    #[test]
    fn reactive_fallback() {
        let mut fx1 = Fixture::new();
        let mut fx2 = Fixture::new();
        let mut ctx1 = fx1.context();
        let mut ctx2 = fx2.context();

        let desc1 = fx1.desc.clone();

        let desc2 = DispatchDescription {
            reactive: Some(ctx2.default_reactive_mask()),
            ..fx2.desc.clone()
        };

        for _ in 0..2 {
            let encoder1 = fx1.dispatch(&mut ctx1, &desc1);
            let encoder2 = fx2.dispatch(&mut ctx2, &desc2);

            assert_eq!(encoder1, encoder2);
            assert_eq!(ctx1.constants(), ctx2.constants());
        }

        assert_eq!(
            Some(&BoundResource::Texture(ctx1.default_reactive_mask())),
            pass(&fx1.dispatch(&mut ctx1, &desc1), "depth_clip")
                .binding("r_reactive_mask")
        );
    }

    #[test]
    fn exposure_fallback() {
        let mut fx = Fixture::new();
        let mut ctx = fx.context();
        let desc = fx.desc.clone();
        let encoder = fx.dispatch(&mut ctx, &desc);

        assert_eq!(
            Some(&BoundResource::Texture(ctx.default_exposure())),
            pass(&encoder, "accumulate").binding("r_input_exposure")
        );

        let mut ctx = Context::new(
            &mut fx.backend,
            description().with_flags(crate::ContextFlags {
                auto_exposure: true,
                ..Default::default()
            }),
        )
        .unwrap();

        let encoder = fx.dispatch(&mut ctx, &desc);

        assert_eq!(
            Some(&BoundResource::Texture(ctx.auto_exposure())),
            pass(&encoder, "accumulate").binding("r_input_exposure")
        );
    }

    #[test]
    fn pre_exposure_delta() {
        let mut fx = Fixture::new();
        let mut ctx = fx.context();

        for pre_exposure in [2.0, 4.0] {
            let desc = DispatchDescription {
                pre_exposure,
                ..fx.desc.clone()
            };

            fx.dispatch(&mut ctx, &desc);
        }

        assert_eq!(2.0, ctx.constants().delta_pre_exposure);
    }

    #[test]
    fn scratch_is_released_after_each_dispatch() {
        let mut fx = Fixture::new();
        let mut ctx = fx.context();
        let desc = fx.desc.clone();
        let textures = fx.backend.live_textures();

        assert_eq!(4 + PERSISTENT_TEXTURES, textures);

        for frame in 1..=3 {
            fx.dispatch(&mut ctx, &desc);

            assert_eq!(textures, fx.backend.live_textures());
            assert_eq!(7 * frame, fx.backend.destroyed_textures());
            assert_eq!(None, fx.backend.find_texture("loupe_dilated_depth"));
        }

        assert!(fx.backend.find_texture("loupe_scene_luminance").is_some());

        // Scratch allocation failing mid-way releases what was allocated
        let mut backend = RecordingBackend::new()
            .without_texture("loupe_dilated_reactive_masks");

        let mut ctx = Context::new(&mut backend, description()).unwrap();
        let textures = backend.live_textures();
        let mut encoder = Vec::new();

        assert!(ctx.dispatch(&mut backend, &mut encoder, &desc).is_err());
        assert_eq!(textures, backend.live_textures());
    }

    #[test]
    fn failed_dispatch_can_be_retried() {
        let mut fx = Fixture::new();
        let mut ctx = fx.context();
        let desc = fx.desc.clone();

        fx.dispatch(&mut ctx, &desc);

        let desc = DispatchDescription {
            pre_exposure: 3.0,
            auto_tcr: Some(TcrAutogenDescription {
                opaque_only: fx.desc.color,
                ..Default::default()
            }),
            ..desc
        };

        fx.backend.set_texture_failing("loupe_shading_change", true);

        let mut encoder = Vec::new();

        assert!(ctx.dispatch(&mut fx.backend, &mut encoder, &desc).is_err());
        assert!(encoder.is_empty());

        fx.backend.set_texture_failing("loupe_shading_change", false);

        let encoder = fx.dispatch(&mut ctx, &desc);
        let upscaler = ctx.buffers.upscaler.bind();

        let uploads: Vec<gpu::UpscalerConstants> = encoder
            .iter()
            .filter_map(|cmd| match cmd {
                Command::WriteBuffer { buffer, data }
                    if BoundResource::ConstantBuffer(*buffer) == upscaler =>
                {
                    Some(bytemuck::pod_read_unaligned(data))
                }
                _ => None,
            })
            .collect();

        assert_eq!(1, uploads.len());
        assert_eq!(3.0, uploads[0].pre_exposure);
        assert_eq!(1, ctx.frame_index());

        let tcr = ctx.resources.tcr.as_ref().unwrap();

        for texture in tcr
            .prev_pre_alpha_color
            .iter()
            .chain(tcr.prev_post_alpha_color.iter())
        {
            assert!(encoder.contains(&Command::ClearTexture {
                texture: texture.id(),
                value: Vec4::ZERO,
            }));
        }
    }

    #[test]
    fn lazy_tcr_resources() {
        let mut fx = Fixture::new();
        let mut ctx = fx.context();
        let textures = fx.backend.live_textures();

        let desc = DispatchDescription {
            auto_tcr: Some(TcrAutogenDescription {
                opaque_only: fx.desc.color,
                ..Default::default()
            }),
            ..fx.desc.clone()
        };

        let encoder = fx.dispatch(&mut ctx, &desc);
        let tcr = ctx.resources.tcr.as_ref().unwrap();

        assert_eq!(textures + 6, fx.backend.live_textures());

        assert_eq!(
            Some(&BoundResource::Texture(tcr.reactive.view())),
            pass(&encoder, "depth_clip").binding("r_reactive_mask")
        );

        assert_eq!(
            Some(&BoundResource::Texture(tcr.composition.view())),
            pass(&encoder, "depth_clip")
                .binding("r_transparency_and_composition_mask")
        );

        let desc = fx.desc.clone();
        let encoder = fx.dispatch(&mut ctx, &desc);

        assert!(ctx.resources.tcr.is_none());
        assert_eq!(textures, fx.backend.live_textures());
        assert!(!labels(&encoder).contains(&"tcr_autogenerate"));
    }

    #[test]
    fn missing_kernel_is_fatal() {
        let mut backend = RecordingBackend::new().without_kernel("lock");

        let err = Context::new(&mut backend, description()).unwrap_err();

        assert!(matches!(err, Error::KernelUnavailable { kernel: "lock" }));
        assert_eq!(0, backend.live_textures());
        assert_eq!(0, backend.live_buffers());
    }

    #[test]
    fn failing_texture_is_fatal() {
        let mut backend =
            RecordingBackend::new().without_texture("loupe_lanczos_lut");

        let err = Context::new(&mut backend, description()).unwrap_err();

        assert!(matches!(err, Error::TextureCreation { .. }));
        assert_eq!(0, backend.live_textures());
        assert_eq!(0, backend.live_buffers());
    }

    #[test]
    fn failing_buffer_is_fatal() {
        let mut backend =
            RecordingBackend::new().without_buffer("loupe_cb_rcas");

        let err = Context::new(&mut backend, description()).unwrap_err();

        assert!(matches!(err, Error::BufferCreation { .. }));
        assert_eq!(0, backend.live_textures());
        assert_eq!(0, backend.live_buffers());
    }

    #[test]
    fn invalid_description_is_fatal() {
        let mut backend = RecordingBackend::new();

        for (max_render_size, display_size) in [
            (uvec2(64, 32), uvec2(0, 64)),
            (uvec2(0, 32), uvec2(128, 64)),
            (uvec2(32, 32), uvec2(64, 64)),
            (uvec2(63, 63), uvec2(128, 128)),
        ] {
            let err = Context::new(
                &mut backend,
                ContextDescription::new(max_render_size, display_size),
            )
            .unwrap_err();

            assert!(matches!(err, Error::InvalidDescription(_)));
        }

        assert_eq!(0, backend.live_textures());
        assert_eq!(0, backend.live_buffers());
    }

    #[test]
    fn luminance_mips_are_distinct() {
        let mut fx = Fixture::new();
        let mut ctx = fx.context();
        let desc = fx.desc.clone();
        let encoder = fx.dispatch(&mut ctx, &desc);
        let pyramid = pass(&encoder, "luminance_pyramid");
        let luminance = &ctx.resources.scene_luminance;

        assert_eq!(
            Some(&BoundResource::StorageTexture(
                luminance.mip(gpu::SHADING_CHANGE_MIP_LEVEL)
            )),
            pyramid.binding("rw_img_mip_shading_change")
        );

        assert_eq!(
            Some(&BoundResource::StorageTexture(
                luminance.mip(gpu::LOCK_LUMA_MIP_LEVEL)
            )),
            pyramid.binding("rw_img_mip_5")
        );

        assert_ne!(
            pyramid.binding("rw_img_mip_shading_change"),
            pyramid.binding("rw_img_mip_5")
        );

        assert_eq!(
            Some(gpu::LOCK_LUMA_MIP_LEVEL),
            luminance.mip(gpu::LOCK_LUMA_MIP_LEVEL).mip
        );
    }

    #[test]
    fn invalid_dispatch_still_dispatches() {
        let mut fx = Fixture::new();
        let mut ctx = fx.context();

        let desc = DispatchDescription {
            color: ResourceView::NULL,
            pre_exposure: 0.0,
            ..fx.desc.clone()
        };

        assert!(!validation::check(ctx.description(), &desc).is_empty());

        let encoder = fx.dispatch(&mut ctx, &desc);

        assert_eq!(5, labels(&encoder).len());

        assert_eq!(
            Some(&BoundResource::Texture(ResourceView::NULL)),
            pass(&encoder, "reconstruct_previous_depth")
                .binding("r_input_color_jittered")
        );
    }

    #[test]
    fn generate_reactive_mask() {
        let mut fx = Fixture::new();
        let mut ctx = fx.context();
        let mut encoder = Vec::new();

        let opaque_only =
            import(&mut fx.backend, "opaque_only", Format::Rgba16Float);

        let mask = import(&mut fx.backend, "mask", Format::R8Unorm);

        ctx.generate_reactive_mask(
            &mut fx.backend,
            &mut encoder,
            &ReactiveMaskDescription {
                color: fx.desc.color,
                output: mask,
                render_size: uvec2(64, 32),
                params: GenerateReactiveDescription {
                    opaque_only,
                    scale: 1.0,
                    ..Default::default()
                },
            },
        );

        let [Command::WriteBuffer { data, .. }, Command::Dispatch(cmd)] =
            encoder.as_slice()
        else {
            panic!("unexpected commands: {encoder:?}");
        };

        let constants: gpu::GenerateReactiveConstants =
            bytemuck::pod_read_unaligned(data);

        assert_eq!(1.0, constants.scale);
        assert_eq!(0.2, constants.threshold);
        assert_eq!(0b1101, constants.flags);

        assert_eq!("generate_reactive", cmd.label);
        assert_eq!(UVec2::new(8, 4), cmd.groups.truncate());

        assert_eq!(
            Some(&BoundResource::Texture(opaque_only)),
            cmd.binding("r_input_opaque_only")
        );

        assert_eq!(
            Some(&BoundResource::StorageTexture(mask)),
            cmd.binding("rw_output_autoreactive")
        );
    }

    #[test]
    fn destroy() {
        let mut fx = Fixture::new();
        let mut ctx = fx.context();

        let desc = DispatchDescription {
            auto_reactive: Some(GenerateReactiveDescription {
                opaque_only: fx.desc.color,
                ..Default::default()
            }),
            ..fx.desc.clone()
        };

        fx.dispatch(&mut ctx, &desc);
        ctx.destroy(&mut fx.backend);

        assert_eq!(4, fx.backend.live_textures());
        assert_eq!(0, fx.backend.live_buffers());
    }
}

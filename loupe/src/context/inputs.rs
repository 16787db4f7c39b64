use crate::{ContextFlags, DispatchDescription, ResourceView};

use super::Resources;

/// Views the passes read from (and write into) during a single dispatch,
/// with optional inputs already resolved to their fallbacks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameInputs {
    pub color: ResourceView,
    pub depth: ResourceView,
    pub motion_vectors: ResourceView,
    pub output: ResourceView,
    pub exposure: ResourceView,
    pub reactive: ResourceView,
    pub transparency_and_composition: ResourceView,
}

impl FrameInputs {
    /// Resolves the inputs of given dispatch.
    ///
    /// Generated masks take precedence over the ones provided by the caller,
    /// which in turn take precedence over the defaults:
    ///
    /// - reactive: generated by TCR > generated by reactive-mask generation
    ///   > caller's > [`Resources::default_reactivity`],
    /// - transparency-and-composition: generated by TCR > caller's >
    ///   [`Resources::default_reactivity`],
    /// - exposure: computed by the luminance pyramid (if the context has
    ///   auto-exposure enabled) > caller's > [`Resources::default_exposure`].
    pub fn resolve(
        flags: &ContextFlags,
        desc: &DispatchDescription,
        resources: &Resources,
    ) -> Self {
        let default_reactivity = resources.default_reactivity.view();

        let exposure = if flags.auto_exposure {
            resources.auto_exposure.view()
        } else {
            desc.exposure
                .unwrap_or_else(|| resources.default_exposure.view())
        };

        let auto_reactive = resources
            .auto_reactive
            .as_ref()
            .filter(|_| desc.auto_reactive.is_some())
            .map(|texture| texture.view());

        let tcr = resources.tcr.as_ref().filter(|_| desc.auto_tcr.is_some());

        let reactive = tcr
            .map(|tcr| tcr.reactive.view())
            .or(auto_reactive)
            .or(desc.reactive)
            .unwrap_or(default_reactivity);

        let transparency_and_composition = tcr
            .map(|tcr| tcr.composition.view())
            .or(desc.transparency_and_composition)
            .unwrap_or(default_reactivity);

        Self {
            color: desc.color,
            depth: desc.depth,
            motion_vectors: desc.motion_vectors,
            output: desc.output,
            exposure,
            reactive,
            transparency_and_composition,
        }
    }

    /// Reactive mask the TCR generation pass reads, i.e. the one it would be
    /// replacing.
    pub fn reactive_before_tcr(
        desc: &DispatchDescription,
        resources: &Resources,
    ) -> ResourceView {
        resources
            .auto_reactive
            .as_ref()
            .filter(|_| desc.auto_reactive.is_some())
            .map(|texture| texture.view())
            .or(desc.reactive)
            .unwrap_or_else(|| resources.default_reactivity.view())
    }
}

#[cfg(test)]
mod tests {
    use glam::uvec2;

    use super::*;
    use crate::{
        ContextDescription, GenerateReactiveDescription, RecordingBackend,
        TcrAutogenDescription, TextureId,
    };

    #[test]
    fn fallbacks() {
        let mut backend = RecordingBackend::new();
        let ctx = ContextDescription::new(uvec2(8, 8), uvec2(16, 16));
        let mut res = Resources::new(&mut backend, &ctx).unwrap();

        let desc = DispatchDescription {
            color: TextureId(100).into(),
            ..Default::default()
        };

        let inputs = FrameInputs::resolve(&ctx.flags, &desc, &res);

        assert_eq!(desc.color, inputs.color);
        assert_eq!(res.default_exposure.view(), inputs.exposure);
        assert_eq!(res.default_reactivity.view(), inputs.reactive);

        assert_eq!(
            res.default_reactivity.view(),
            inputs.transparency_and_composition
        );

        // Caller-provided masks
        let desc = DispatchDescription {
            exposure: Some(TextureId(101).into()),
            reactive: Some(TextureId(102).into()),
            transparency_and_composition: Some(TextureId(103).into()),
            ..desc
        };

        let inputs = FrameInputs::resolve(&ctx.flags, &desc, &res);

        assert_eq!(ResourceView::from(TextureId(101)), inputs.exposure);
        assert_eq!(ResourceView::from(TextureId(102)), inputs.reactive);

        assert_eq!(
            ResourceView::from(TextureId(103)),
            inputs.transparency_and_composition
        );

        // Auto-exposure overrides caller's exposure
        let flags = ContextFlags {
            auto_exposure: true,
            ..Default::default()
        };

        let inputs = FrameInputs::resolve(&flags, &desc, &res);

        assert_eq!(res.auto_exposure.view(), inputs.exposure);

        // Generated masks override caller's masks
        let desc = DispatchDescription {
            auto_reactive: Some(GenerateReactiveDescription {
                opaque_only: TextureId(104).into(),
                ..Default::default()
            }),
            ..desc
        };

        res.update_auto_reactive(&mut backend, &ctx, true).unwrap();

        let inputs = FrameInputs::resolve(&ctx.flags, &desc, &res);
        let auto_reactive = res.auto_reactive.as_ref().unwrap().view();

        assert_eq!(auto_reactive, inputs.reactive);

        let desc = DispatchDescription {
            auto_tcr: Some(TcrAutogenDescription {
                opaque_only: TextureId(105).into(),
                ..Default::default()
            }),
            ..desc
        };

        res.update_tcr(&mut backend, &ctx, true).unwrap();

        let inputs = FrameInputs::resolve(&ctx.flags, &desc, &res);
        let tcr = res.tcr.as_ref().unwrap();

        assert_eq!(tcr.reactive.view(), inputs.reactive);
        assert_eq!(
            tcr.composition.view(),
            inputs.transparency_and_composition
        );

        assert_eq!(
            auto_reactive,
            FrameInputs::reactive_before_tcr(&desc, &res)
        );
    }
}

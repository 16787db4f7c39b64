use std::f32::consts::PI;

use glam::{UVec2, Vec2};
use log::{error, warn};
use thiserror::Error;

use crate::{ContextDescription, DispatchDescription, ReactiveMaskDescription};

/// Contract violation of a dispatch.
///
/// Violations are only ever logged (when [`crate::ContextFlags`] enables
/// debug checking) - they never change what gets dispatched.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum Violation {
    #[error("required input `{0}` is missing")]
    MissingInput(&'static str),

    #[error("render size {0} is empty")]
    EmptyRenderSize(UVec2),

    #[error("render size {size} exceeds the maximum render size {max}")]
    RenderSizeTooLarge { size: UVec2, max: UVec2 },

    #[error("upscale size {size} exceeds the display size {max}")]
    UpscaleSizeTooLarge { size: UVec2, max: UVec2 },

    #[error("jitter offset {0} is outside of [-1, 1]")]
    JitterOutOfRange(Vec2),

    #[error("motion vector scale contains zero")]
    ZeroMotionVectorScale,

    #[error("motion vector scale {scale} exceeds the display size {max}")]
    ExcessiveMotionVectorScale { scale: Vec2, max: UVec2 },

    #[error("vertical field of view {0} is outside of (0, π]")]
    InvalidFov(f32),

    #[error("pre-exposure is zero")]
    ZeroPreExposure,

    #[error(
        "camera near ({near}) and far ({far}) planes are in an order \
         inconsistent with the depth being {}",
        depth_kind(.inverted)
    )]
    InconsistentDepthPlanes { near: f32, far: f32, inverted: bool },

    #[error("frame time delta {0} is larger than a second; seconds expected")]
    FrameTimeTooLarge(f32),

    #[error("sharpness {0} is outside of [0, 1]")]
    SharpnessOutOfRange(f32),

    #[error("exposure is provided, but the context computes it on its own")]
    ExposureIgnored,

    #[error("{0} is enabled, but no opaque-only color is provided")]
    MissingOpaqueOnly(&'static str),
}

impl Violation {
    /// Returns whether this violation certainly produces a garbage output (as
    /// opposed to just being suspicious).
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Self::MissingInput(_)
                | Self::EmptyRenderSize(_)
                | Self::RenderSizeTooLarge { .. }
                | Self::UpscaleSizeTooLarge { .. }
                | Self::InvalidFov(_)
                | Self::ZeroPreExposure
                | Self::MissingOpaqueOnly(_)
        )
    }
}

fn depth_kind(inverted: &bool) -> &'static str {
    if *inverted {
        "inverted"
    } else {
        "not inverted"
    }
}

/// Checks a dispatch against the context it's going to be dispatched with.
pub fn check(
    ctx: &ContextDescription,
    desc: &DispatchDescription,
) -> Vec<Violation> {
    let mut violations = Vec::new();

    for (name, view) in [
        ("color", desc.color),
        ("depth", desc.depth),
        ("motion_vectors", desc.motion_vectors),
        ("output", desc.output),
    ] {
        if view.is_null() {
            violations.push(Violation::MissingInput(name));
        }
    }

    if desc.render_size.cmpeq(UVec2::ZERO).any() {
        violations.push(Violation::EmptyRenderSize(desc.render_size));
    }

    if desc.render_size.cmpgt(ctx.max_render_size).any() {
        violations.push(Violation::RenderSizeTooLarge {
            size: desc.render_size,
            max: ctx.max_render_size,
        });
    }

    if let Some(size) = desc.upscale_size {
        if size.cmpgt(ctx.display_size).any() {
            violations.push(Violation::UpscaleSizeTooLarge {
                size,
                max: ctx.display_size,
            });
        }
    }

    if desc.jitter_offset.abs().cmpgt(Vec2::ONE).any() {
        violations.push(Violation::JitterOutOfRange(desc.jitter_offset));
    }

    if desc.motion_vector_scale.cmpeq(Vec2::ZERO).any() {
        violations.push(Violation::ZeroMotionVectorScale);
    } else if desc
        .motion_vector_scale
        .abs()
        .cmpgt(ctx.display_size.as_vec2())
        .any()
    {
        violations.push(Violation::ExcessiveMotionVectorScale {
            scale: desc.motion_vector_scale,
            max: ctx.display_size,
        });
    }

    let fov = desc.camera_fov_vertical;

    if !(fov > 0.0 && fov <= PI) {
        violations.push(Violation::InvalidFov(fov));
    }

    if desc.pre_exposure == 0.0 {
        violations.push(Violation::ZeroPreExposure);
    }

    let inverted = ctx.flags.depth_inverted;

    if (inverted && desc.camera_near < desc.camera_far)
        || (!inverted && desc.camera_near > desc.camera_far)
    {
        violations.push(Violation::InconsistentDepthPlanes {
            near: desc.camera_near,
            far: desc.camera_far,
            inverted,
        });
    }

    if desc.frame_time_delta > 1.0 {
        violations.push(Violation::FrameTimeTooLarge(desc.frame_time_delta));
    }

    if desc.sharpening.enabled {
        let sharpness = desc.sharpening.sharpness;

        if !(0.0..=1.0).contains(&sharpness) {
            violations.push(Violation::SharpnessOutOfRange(sharpness));
        }
    }

    if ctx.flags.auto_exposure && desc.exposure.is_some() {
        violations.push(Violation::ExposureIgnored);
    }

    if let Some(auto_reactive) = &desc.auto_reactive {
        if auto_reactive.opaque_only.is_null() {
            violations.push(Violation::MissingOpaqueOnly("auto-reactive"));
        }
    }

    if let Some(auto_tcr) = &desc.auto_tcr {
        if auto_tcr.opaque_only.is_null() {
            violations.push(Violation::MissingOpaqueOnly(
                "auto-transparency-and-composition",
            ));
        }
    }

    violations
}

/// Checks a standalone reactive mask generation.
pub fn check_reactive_mask(desc: &ReactiveMaskDescription) -> Vec<Violation> {
    let mut violations = Vec::new();

    for (name, view) in [("color", desc.color), ("output", desc.output)] {
        if view.is_null() {
            violations.push(Violation::MissingInput(name));
        }
    }

    if desc.params.opaque_only.is_null() {
        violations.push(Violation::MissingOpaqueOnly("reactive mask"));
    }

    if desc.render_size.cmpeq(UVec2::ZERO).any() {
        violations.push(Violation::EmptyRenderSize(desc.render_size));
    }

    violations
}

/// Logs given violations.
pub fn report(violations: &[Violation]) {
    for violation in violations {
        if violation.is_error() {
            error!("Invalid dispatch: {violation}");
        } else {
            warn!("Suspicious dispatch: {violation}");
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::{uvec2, vec2};

    use super::*;
    use crate::{
        ContextFlags, GenerateReactiveDescription, ResourceView, Sharpening,
        TextureId,
    };

    fn ctx() -> ContextDescription {
        ContextDescription::new(uvec2(1280, 720), uvec2(1920, 1080))
    }

    fn desc() -> DispatchDescription {
        DispatchDescription {
            color: TextureId(1).into(),
            depth: TextureId(2).into(),
            motion_vectors: TextureId(3).into(),
            output: TextureId(4).into(),
            render_size: uvec2(1280, 720),
            motion_vector_scale: vec2(1280.0, -720.0),
            ..Default::default()
        }
    }

    #[test]
    fn valid() {
        assert_eq!(Vec::<Violation>::new(), check(&ctx(), &desc()));
    }

    #[test]
    fn missing_inputs() {
        let desc = DispatchDescription {
            depth: ResourceView::NULL,
            output: ResourceView::NULL,
            ..desc()
        };

        assert_eq!(
            vec![
                Violation::MissingInput("depth"),
                Violation::MissingInput("output"),
            ],
            check(&ctx(), &desc)
        );
    }

    #[test]
    fn render_size() {
        let desc = DispatchDescription {
            render_size: uvec2(0, 720),
            ..desc()
        };

        assert_eq!(
            vec![Violation::EmptyRenderSize(uvec2(0, 720))],
            check(&ctx(), &desc)
        );

        let desc = DispatchDescription {
            render_size: uvec2(1281, 720),
            ..self::desc()
        };

        assert_eq!(
            vec![Violation::RenderSizeTooLarge {
                size: uvec2(1281, 720),
                max: uvec2(1280, 720),
            }],
            check(&ctx(), &desc)
        );
    }

    #[test]
    fn camera() {
        let desc = DispatchDescription {
            camera_fov_vertical: 0.0,
            pre_exposure: 0.0,
            camera_near: 100.0,
            camera_far: 0.1,
            frame_time_delta: 16.0,
            jitter_offset: vec2(0.5, -1.5),
            ..desc()
        };

        let violations = check(&ctx(), &desc);

        assert_eq!(
            vec![
                Violation::JitterOutOfRange(vec2(0.5, -1.5)),
                Violation::InvalidFov(0.0),
                Violation::ZeroPreExposure,
                Violation::InconsistentDepthPlanes {
                    near: 100.0,
                    far: 0.1,
                    inverted: false,
                },
                Violation::FrameTimeTooLarge(16.0),
            ],
            violations
        );

        // Inverted depth expects the opposite order
        let ctx = ctx().with_flags(ContextFlags {
            depth_inverted: true,
            ..Default::default()
        });

        let desc = DispatchDescription {
            camera_near: 100.0,
            camera_far: 0.1,
            ..self::desc()
        };

        assert!(check(&ctx, &desc).is_empty());
    }

    #[test]
    fn motion_vector_scale() {
        let desc = DispatchDescription {
            motion_vector_scale: vec2(0.0, 1.0),
            ..desc()
        };

        assert_eq!(
            vec![Violation::ZeroMotionVectorScale],
            check(&ctx(), &desc)
        );

        let desc = DispatchDescription {
            motion_vector_scale: vec2(1.0, 4000.0),
            ..self::desc()
        };

        assert!(!check(&ctx(), &desc)[0].is_error());
    }

    #[test]
    fn features() {
        let ctx = ctx().with_flags(ContextFlags {
            auto_exposure: true,
            ..Default::default()
        });

        let desc = DispatchDescription {
            exposure: Some(TextureId(5).into()),
            sharpening: Sharpening {
                enabled: true,
                sharpness: 1.5,
            },
            auto_reactive: Some(GenerateReactiveDescription::default()),
            ..desc()
        };

        let violations = check(&ctx, &desc);

        assert_eq!(
            vec![
                Violation::SharpnessOutOfRange(1.5),
                Violation::ExposureIgnored,
                Violation::MissingOpaqueOnly("auto-reactive"),
            ],
            violations
        );

        assert_eq!(
            vec![false, false, true],
            violations.iter().map(Violation::is_error).collect::<Vec<_>>()
        );
    }

    #[test]
    fn display() {
        assert_eq!(
            "required input `color` is missing",
            Violation::MissingInput("color").to_string()
        );

        assert_eq!(
            "camera near (100) and far (0.1) planes are in an order \
             inconsistent with the depth being not inverted",
            Violation::InconsistentDepthPlanes {
                near: 100.0,
                far: 0.1,
                inverted: false,
            }
            .to_string()
        );
    }
}

use glam::{UVec2, Vec2};

use crate::ResourceView;

/// Features of a context; changing any of them requires recreating the
/// context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContextFlags {
    /// Color input is in high dynamic range.
    pub hdr: bool,

    /// Exposure is computed by the luminance pyramid instead of being
    /// provided by the host.
    pub auto_exposure: bool,

    /// Depth buffer uses reversed-Z (1.0 at the near plane).
    pub depth_inverted: bool,

    /// Projection has no far plane.
    pub depth_infinite: bool,

    /// Motion vectors are rendered at render resolution (as opposed to
    /// display resolution).
    pub low_resolution_motion_vectors: bool,

    /// Motion vectors include the jitter applied to the projection matrix;
    /// the jitter difference between frames gets compensated.
    pub motion_vectors_jitter_cancellation: bool,

    /// Render size may change between frames.
    ///
    /// Informational only: every dispatch already reads its render size from
    /// [`DispatchDescription::render_size`], so this selects no kernel
    /// variant and changes no resource; it's kept so that hosts can describe
    /// their setup, and toggling it still invalidates the context.
    pub dynamic_resolution: bool,

    /// Validates each dispatch and logs contract violations.
    pub debug_checking: bool,
}

impl Default for ContextFlags {
    fn default() -> Self {
        Self {
            hdr: false,
            auto_exposure: false,
            depth_inverted: false,
            depth_infinite: false,
            low_resolution_motion_vectors: true,
            motion_vectors_jitter_cancellation: false,
            dynamic_resolution: false,
            debug_checking: cfg!(debug_assertions),
        }
    }
}

/// Immutable configuration of a context.
#[derive(Clone, Debug, PartialEq)]
pub struct ContextDescription {
    pub max_render_size: UVec2,
    pub display_size: UVec2,
    pub flags: ContextFlags,
}

impl ContextDescription {
    pub fn new(max_render_size: UVec2, display_size: UVec2) -> Self {
        Self {
            max_render_size,
            display_size,
            flags: Default::default(),
        }
    }

    pub fn with_flags(mut self, flags: ContextFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Returns whether switching to `other` requires destroying this context
    /// and creating a new one.
    pub fn is_invalidated_by(&self, other: &Self) -> bool {
        self != other
    }
}

/// Contrast-adaptive sharpening applied after upscaling.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sharpening {
    pub enabled: bool,

    /// Within `[0, 1]`; quantized to 21 levels.
    pub sharpness: f32,
}

impl Default for Sharpening {
    fn default() -> Self {
        Self {
            enabled: false,
            sharpness: 0.8,
        }
    }
}

/// Per-frame inputs of the upscaler.
#[derive(Clone, Debug, PartialEq)]
pub struct DispatchDescription {
    pub color: ResourceView,
    pub depth: ResourceView,
    pub motion_vectors: ResourceView,
    pub output: ResourceView,

    /// 1x1 texture with the exposure in its red channel; ignored when the
    /// context computes exposure on its own.
    pub exposure: Option<ResourceView>,

    pub reactive: Option<ResourceView>,
    pub transparency_and_composition: Option<ResourceView>,

    /// Jitter applied to the projection matrix this frame, in render
    /// pixels.
    pub jitter_offset: Vec2,

    /// Converts motion vectors into pixels (e.g. `(width, -height)` for
    /// vectors expressed in NDC).
    pub motion_vector_scale: Vec2,

    /// Render size of this frame; must not exceed the context's maximum.
    pub render_size: UVec2,

    /// Size of the upscaled area; defaults to the context's display size.
    pub upscale_size: Option<UVec2>,

    pub camera_near: f32,
    pub camera_far: f32,

    /// In radians, within `(0, π]`.
    pub camera_fov_vertical: f32,

    /// In seconds.
    pub frame_time_delta: f32,

    pub pre_exposure: f32,

    /// Discards all history (e.g. on camera cuts).
    pub reset: bool,

    pub sharpening: Sharpening,
    pub view_space_to_meters_factor: f32,
    pub velocity_factor: f32,

    /// Generates a reactive mask from the opaque-only capture, replacing
    /// [`Self::reactive`] for this frame.
    pub auto_reactive: Option<GenerateReactiveDescription>,

    /// Generates reactive and transparency-and-composition masks from the
    /// opaque-only capture, replacing both for this frame.
    pub auto_tcr: Option<TcrAutogenDescription>,

    /// Overwrites the output with a visualization of internal buffers.
    pub debug_view: bool,
}

impl Default for DispatchDescription {
    fn default() -> Self {
        Self {
            color: ResourceView::NULL,
            depth: ResourceView::NULL,
            motion_vectors: ResourceView::NULL,
            output: ResourceView::NULL,
            exposure: None,
            reactive: None,
            transparency_and_composition: None,
            jitter_offset: Vec2::ZERO,
            motion_vector_scale: Vec2::ONE,
            render_size: UVec2::ZERO,
            upscale_size: None,
            camera_near: 0.1,
            camera_far: 1000.0,
            camera_fov_vertical: std::f32::consts::FRAC_PI_3,
            frame_time_delta: 1.0 / 60.0,
            pre_exposure: 1.0,
            reset: false,
            sharpening: Default::default(),
            view_space_to_meters_factor: 1.0,
            velocity_factor: 1.0,
            auto_reactive: None,
            auto_tcr: None,
            debug_view: false,
        }
    }
}

/// Post-processing applied by the reactive-mask generation kernel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GenerateReactiveFlags {
    pub apply_tonemap: bool,
    pub apply_inverse_tonemap: bool,
    pub apply_threshold: bool,
    pub use_components_max: bool,
}

impl GenerateReactiveFlags {
    pub fn bits(&self) -> u32 {
        (self.apply_tonemap as u32)
            | (self.apply_inverse_tonemap as u32) << 1
            | (self.apply_threshold as u32) << 2
            | (self.use_components_max as u32) << 3
    }
}

impl Default for GenerateReactiveFlags {
    fn default() -> Self {
        Self {
            apply_tonemap: true,
            apply_inverse_tonemap: false,
            apply_threshold: true,
            use_components_max: true,
        }
    }
}

/// Reactive mask generation from the difference between an opaque-only
/// capture and the final color.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GenerateReactiveDescription {
    #[cfg_attr(feature = "serde", serde(skip))]
    pub opaque_only: ResourceView,
    pub scale: f32,
    pub cutoff_threshold: f32,
    pub binary_value: f32,
    pub flags: GenerateReactiveFlags,
}

impl Default for GenerateReactiveDescription {
    fn default() -> Self {
        Self {
            opaque_only: ResourceView::NULL,
            scale: 0.5,
            cutoff_threshold: 0.2,
            binary_value: 0.9,
            flags: Default::default(),
        }
    }
}

/// Standalone reactive mask generation, recorded outside of a dispatch.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReactiveMaskDescription {
    /// Final color, including transparencies.
    pub color: ResourceView,

    /// Texture the mask gets written into.
    pub output: ResourceView,

    pub render_size: UVec2,
    pub params: GenerateReactiveDescription,
}

/// Transparency-and-composition (plus reactive) mask generation.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TcrAutogenDescription {
    #[cfg_attr(feature = "serde", serde(skip))]
    pub opaque_only: ResourceView,

    /// Luma difference above which a pixel counts as transparent.
    pub auto_tc_threshold: f32,

    pub auto_tc_scale: f32,
    pub auto_reactive_scale: f32,
    pub auto_reactive_max: f32,
}

impl Default for TcrAutogenDescription {
    fn default() -> Self {
        Self {
            opaque_only: ResourceView::NULL,
            auto_tc_threshold: 0.05,
            auto_tc_scale: 1.0,
            auto_reactive_scale: 5.0,
            auto_reactive_max: 0.9,
        }
    }
}

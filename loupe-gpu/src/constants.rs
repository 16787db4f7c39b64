use bytemuck::{Pod, Zeroable};
use glam::{IVec2, UVec2, Vec2, Vec4};

/// Constants shared by every pass of a single dispatch.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct UpscalerConstants {
    /// See: [`crate::device_to_view_depth()`].
    pub device_to_view_depth: Vec4,
    pub render_size: IVec2,
    pub max_render_size: IVec2,
    pub display_size: IVec2,
    pub upscale_size: IVec2,
    pub input_color_resource_dimensions: IVec2,
    pub luma_mip_dimensions: IVec2,
    pub luma_mip_level_to_use: i32,
    pub frame_index: i32,
    pub jitter_offset: Vec2,
    pub motion_vector_scale: Vec2,
    pub downscale_factor: Vec2,
    pub motion_vector_jitter_cancellation: Vec2,
    pub pre_exposure: f32,
    pub previous_frame_pre_exposure: f32,
    pub delta_pre_exposure: f32,
    pub tan_half_fov: f32,
    /// Stored as float since kernels only ever use it in float math.
    pub jitter_phase_count: f32,
    /// Frame time, in seconds, clamped to `[0, 1]`.
    pub delta_time: f32,
    pub view_space_to_meters_factor: f32,
    pub velocity_factor: f32,
    pub _padding: [u32; 2],
}

/// Constants of the luminance pyramid's single-pass downsample.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct SpdConstants {
    pub mips: u32,
    pub num_work_groups: u32,
    pub work_group_offset: UVec2,
    pub render_size: UVec2,
    pub _padding: UVec2,
}

/// Constants of the reactive-mask generation pass.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct GenerateReactiveConstants {
    pub scale: f32,
    pub threshold: f32,
    pub binary_value: f32,
    pub flags: u32,
}

/// Constants of the transparency-and-composition auto-generation pass.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct TcrAutogenConstants {
    pub auto_tc_threshold: f32,
    pub auto_tc_scale: f32,
    pub auto_reactive_scale: f32,
    pub auto_reactive_max: f32,
}

#[cfg(test)]
mod tests {
    use std::mem;

    use super::*;

    #[test]
    fn sizes() {
        assert_eq!(144, mem::size_of::<UpscalerConstants>());
        assert_eq!(32, mem::size_of::<SpdConstants>());
        assert_eq!(16, mem::size_of::<GenerateReactiveConstants>());
        assert_eq!(16, mem::size_of::<TcrAutogenConstants>());
    }
}

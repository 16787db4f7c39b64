use glam::{UVec2, UVec4, Vec2};

use crate::{gpu, ContextDescription, DispatchDescription};

/// Scalar state carried from one dispatch to the next.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunningState {
    /// Index of the last dispatched frame, counted from the last reset.
    pub frame_index: u32,

    /// Number of dispatches since the context was created; never reset, so
    /// that history parity keeps alternating through resets.
    pub resource_frame_index: u32,

    pub jitter_phase_count: f32,
    pub previous_jitter: Vec2,
    pub previous_pre_exposure: f32,
    pub first_execution: bool,
}

impl RunningState {
    /// Returns the parity of the upcoming dispatch.
    pub fn is_alternate(&self) -> bool {
        self.resource_frame_index % 2 == 1
    }

    /// Remembers what's needed from the just-dispatched frame.
    pub fn advance(&mut self, constants: &gpu::UpscalerConstants) {
        self.frame_index = constants.frame_index as u32;
        self.resource_frame_index = self.resource_frame_index.wrapping_add(1);
        self.jitter_phase_count = constants.jitter_phase_count;
        self.previous_jitter = constants.jitter_offset;
        self.previous_pre_exposure = constants.pre_exposure;
        self.first_execution = false;
    }
}

impl Default for RunningState {
    fn default() -> Self {
        Self {
            frame_index: 0,
            resource_frame_index: 0,
            jitter_phase_count: 0.0,
            previous_jitter: Vec2::ZERO,
            previous_pre_exposure: 0.0,
            first_execution: true,
        }
    }
}

/// Returns the size of the area being upscaled into.
pub fn upscale_size(
    ctx: &ContextDescription,
    desc: &DispatchDescription,
) -> UVec2 {
    desc.upscale_size.unwrap_or(ctx.display_size)
}

/// Derives constants shared by all passes of the upcoming dispatch.
pub fn build_constants(
    ctx: &ContextDescription,
    desc: &DispatchDescription,
    state: &RunningState,
    reset: bool,
) -> gpu::UpscalerConstants {
    let flags = &ctx.flags;
    let render_size = desc.render_size;
    let upscale_size = upscale_size(ctx, desc);

    let render_size_f = render_size.as_vec2();
    let upscale_size_f = upscale_size.max(UVec2::ONE).as_vec2();
    let aspect = render_size_f.x / render_size_f.y.max(1.0);

    let device_to_view_depth = gpu::device_to_view_depth(
        desc.camera_near,
        desc.camera_far,
        desc.camera_fov_vertical,
        aspect,
        flags.depth_inverted,
        flags.depth_infinite,
    );

    let motion_vectors_target_size = if flags.low_resolution_motion_vectors {
        render_size
    } else {
        upscale_size
    }
    .max(UVec2::ONE)
    .as_vec2();

    let motion_vector_jitter_cancellation =
        if flags.motion_vectors_jitter_cancellation {
            (state.previous_jitter - desc.jitter_offset)
                / motion_vectors_target_size
        } else {
            Vec2::ZERO
        };

    let jitter_phase_count = {
        let target =
            gpu::jitter_phase_count(render_size.x, upscale_size.x) as f32;

        let prev = state.jitter_phase_count;

        if reset || prev == 0.0 {
            target
        } else if target > prev {
            prev + 1.0
        } else if target < prev {
            prev - 1.0
        } else {
            prev
        }
    };

    let delta_pre_exposure = if state.previous_pre_exposure == 0.0 {
        1.0
    } else {
        desc.pre_exposure / state.previous_pre_exposure
    };

    let frame_index = if reset { 0 } else { state.frame_index + 1 };

    let luma_mip_level = gpu::SHADING_CHANGE_MIP_LEVEL;
    let luma_mip_dimensions = render_size / (2 << luma_mip_level);

    gpu::UpscalerConstants {
        device_to_view_depth,
        render_size: render_size.as_ivec2(),
        max_render_size: ctx.max_render_size.as_ivec2(),
        display_size: ctx.display_size.as_ivec2(),
        upscale_size: upscale_size.as_ivec2(),
        input_color_resource_dimensions: render_size.as_ivec2(),
        luma_mip_dimensions: luma_mip_dimensions.as_ivec2(),
        luma_mip_level_to_use: luma_mip_level as i32,
        frame_index: frame_index as i32,
        jitter_offset: desc.jitter_offset,
        motion_vector_scale: desc.motion_vector_scale
            / motion_vectors_target_size,
        downscale_factor: render_size_f / upscale_size_f,
        motion_vector_jitter_cancellation,
        pre_exposure: desc.pre_exposure,
        previous_frame_pre_exposure: state.previous_pre_exposure,
        delta_pre_exposure,
        tan_half_fov: gpu::tan_half_horizontal_fov(
            desc.camera_fov_vertical,
            aspect,
        ),
        jitter_phase_count,
        delta_time: desc.frame_time_delta.clamp(0.0, 1.0),
        view_space_to_meters_factor: desc.view_space_to_meters_factor,
        velocity_factor: desc.velocity_factor,
        _padding: Default::default(),
    }
}

/// Derives constants of the luminance pyramid's downsample.
pub fn build_spd_constants(render_size: UVec2) -> gpu::SpdConstants {
    let setup = spd_setup(render_size);

    gpu::SpdConstants {
        mips: setup.mips,
        num_work_groups: setup.num_work_groups,
        work_group_offset: setup.work_group_offset,
        render_size,
        _padding: Default::default(),
    }
}

pub fn spd_setup(render_size: UVec2) -> gpu::SpdSetup {
    gpu::SpdSetup::new(UVec4::new(0, 0, render_size.x, render_size.y), None)
}

use glam::{vec2, UVec2, Vec2};

/// Number of jitter phases used when rendering at native resolution; scaled
/// by the square of the upscale ratio.
pub const BASE_JITTER_PHASE_COUNT: f32 = 8.0;

/// Returns the `index`-th element of the Halton sequence of given base.
pub fn halton(mut index: u32, base: u32) -> f32 {
    let mut f = 1.0;
    let mut result = 0.0;

    while index > 0 {
        f /= base as f32;
        result += f * (index % base) as f32;
        index /= base;
    }

    result
}

/// Returns how many distinct jitter offsets should be cycled through so that
/// every display pixel gets covered by render samples.
pub fn jitter_phase_count(render_width: u32, display_width: u32) -> u32 {
    let ratio = display_width as f32 / render_width as f32;

    (BASE_JITTER_PHASE_COUNT * ratio * ratio).floor() as u32
}

/// Returns the sub-pixel jitter offset (in render pixels, within
/// `[-0.5, 0.5)`) for given frame.
///
/// The sequence repeats every `phase_count` frames; `phase_count` of zero is
/// treated as one.
pub fn jitter_offset(frame_index: u32, phase_count: u32) -> Vec2 {
    let index = (frame_index % phase_count.max(1)) + 1;

    vec2(halton(index, 2) - 0.5, halton(index, 3) - 0.5)
}

/// Converts a jitter offset expressed in render pixels into the clip-space
/// translation that should be applied to the projection matrix.
pub fn jitter_projection_offset(jitter: Vec2, render_size: UVec2) -> Vec2 {
    vec2(
        2.0 * jitter.x / render_size.x as f32,
        -2.0 * jitter.y / render_size.y as f32,
    )
}

//! Common structs, lookup tables and math shared between Loupe's upscaling
//! kernels and its host-side dispatcher.

#![allow(clippy::manual_range_contains)]

mod bias;
mod constants;
mod depth;
mod jitter;
mod lanczos;
mod quality;
mod rcas;
mod spd;

pub use self::bias::*;
pub use self::constants::*;
pub use self::depth::*;
pub use self::jitter::*;
pub use self::lanczos::*;
pub use self::quality::*;
pub use self::rcas::*;
pub use self::spd::*;

/// Work region (in pixels) covered by one thread group of most passes.
pub const WORK_REGION_DIM: u32 = 8;

/// Work region (in pixels) covered by one thread group of the sharpening
/// pass.
pub const RCAS_WORK_REGION_DIM: u32 = 16;

/// Mip level of the scene-luminance pyramid compared across frames to detect
/// shading changes.
pub const SHADING_CHANGE_MIP_LEVEL: u32 = 4;

/// Mip level of the scene-luminance pyramid used by the accumulation pass for
/// its lock-stability heuristic.
pub const LOCK_LUMA_MIP_LEVEL: u32 = 5;

/// Returns how many thread groups of `work_region` pixels are needed to cover
/// `size` pixels, per axis.
pub fn dispatch_size(size: glam::UVec2, work_region: u32) -> glam::UVec2 {
    (size + (work_region - 1)) / work_region
}

#[cfg(test)]
mod tests {
    use glam::uvec2;

    use super::*;

    #[test]
    fn dispatch_size_rounds_up() {
        assert_eq!(uvec2(1, 1), dispatch_size(uvec2(1, 8), 8));
        assert_eq!(uvec2(160, 90), dispatch_size(uvec2(1280, 720), 8));
        assert_eq!(uvec2(120, 68), dispatch_size(uvec2(1920, 1080), 16));
    }
}

use glam::{uvec2, UVec2, UVec4};

/// Side length (in pixels) of the tile reduced by one single-pass-downsample
/// work group.
pub const SPD_TILE_SIZE: u32 = 64;

/// Maximum number of mips a single-pass-downsample dispatch can produce.
pub const SPD_MAX_MIPS: u32 = 12;

/// Dispatch parameters of a single-pass downsample over a rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpdSetup {
    /// Number of work groups to dispatch, per axis.
    pub dispatch_size: UVec2,

    /// Index of the first work group, per axis.
    pub work_group_offset: UVec2,

    /// Total number of work groups; the atomic counter reaching this value
    /// tells a work group that it finished last.
    pub num_work_groups: u32,

    /// Number of mips to generate.
    pub mips: u32,
}

impl SpdSetup {
    /// Prepares a downsample of `rect` (`x, y, width, height`).
    ///
    /// When `mips` is `None`, as many mips as the rectangle allows are
    /// generated (up to [`SPD_MAX_MIPS`]).
    pub fn new(rect: UVec4, mips: Option<u32>) -> Self {
        let work_group_offset =
            uvec2(rect.x / SPD_TILE_SIZE, rect.y / SPD_TILE_SIZE);

        let end_index = uvec2(
            (rect.x + rect.z).saturating_sub(1) / SPD_TILE_SIZE,
            (rect.y + rect.w).saturating_sub(1) / SPD_TILE_SIZE,
        );

        let dispatch_size = end_index + 1 - work_group_offset;

        let mips = mips.unwrap_or_else(|| {
            let max_side = rect.z.max(rect.w).max(1);

            max_side.ilog2().min(SPD_MAX_MIPS)
        });

        Self {
            dispatch_size,
            work_group_offset,
            num_work_groups: dispatch_size.x * dispatch_size.y,
            mips,
        }
    }
}

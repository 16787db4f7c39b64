use bytemuck::{Pod, Zeroable};
use glam::UVec4;

/// Constants consumed by the sharpening (RCAS) kernel.
///
/// `rcas_config.x` holds the bit pattern of `exp2(-stops)` and
/// `rcas_config.y` the same value packed twice as 16-bit floats, where
/// `stops = 2.0 - 2.0 * sharpness`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct RcasConstants {
    pub rcas_config: UVec4,
}

impl RcasConstants {
    const fn new(single: u32, packed: u32) -> Self {
        Self {
            rcas_config: UVec4::new(single, packed, 0, 0),
        }
    }

    /// Returns constants for given sharpness, clamped to `[0, 1]` and
    /// quantized to one of [`RCAS_CONSTANTS`]'s entries.
    pub fn for_sharpness(sharpness: f32) -> Self {
        RCAS_CONSTANTS[rcas_index(sharpness)]
    }
}

/// Returns which entry of [`RCAS_CONSTANTS`] corresponds to given sharpness.
pub fn rcas_index(sharpness: f32) -> usize {
    let sharpness = if sharpness.is_nan() {
        0.0
    } else {
        sharpness.clamp(0.0, 1.0)
    };

    (sharpness * (RCAS_CONSTANTS.len() - 1) as f32).round() as usize
}

/// Precomputed sharpening constants for sharpness `0.00, 0.05, ..., 1.00`.
pub const RCAS_CONSTANTS: [RcasConstants; 21] = [
    RcasConstants::new(0x3e800000, 0x34003400),
    RcasConstants::new(0x3e892fe0, 0x34493449),
    RcasConstants::new(0x3e93088d, 0x34983498),
    RcasConstants::new(0x3e9d9624, 0x34ed34ed),
    RcasConstants::new(0x3ea8e5a2, 0x35473547),
    RcasConstants::new(0x3eb504f3, 0x35a835a8),
    RcasConstants::new(0x3ec20300, 0x36103610),
    RcasConstants::new(0x3ecfefc6, 0x367f367f),
    RcasConstants::new(0x3ededc66, 0x36f736f7),
    RcasConstants::new(0x3eeedb40, 0x37773777),
    RcasConstants::new(0x3f000000, 0x38003800),
    RcasConstants::new(0x3f092fe0, 0x38493849),
    RcasConstants::new(0x3f13088d, 0x38983898),
    RcasConstants::new(0x3f1d9624, 0x38ed38ed),
    RcasConstants::new(0x3f28e5a2, 0x39473947),
    RcasConstants::new(0x3f3504f3, 0x39a839a8),
    RcasConstants::new(0x3f420300, 0x3a103a10),
    RcasConstants::new(0x3f4fefc6, 0x3a7f3a7f),
    RcasConstants::new(0x3f5edc66, 0x3af73af7),
    RcasConstants::new(0x3f6edb40, 0x3b773b77),
    RcasConstants::new(0x3f800000, 0x3c003c00),
];

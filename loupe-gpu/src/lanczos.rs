use core::f32::consts::PI;

/// Number of entries in the Lanczos-2 lookup table sampled by the
/// accumulation pass.
pub const LANCZOS2_LUT_WIDTH: usize = 128;

/// Normalized `sin(πx) / (πx)`, with the singularity at zero resolved to one.
pub fn sinc(x: f32) -> f32 {
    if x == 0.0 {
        1.0
    } else {
        (PI * x).sin() / (PI * x)
    }
}

/// Lanczos kernel with a support of two lobes.
pub fn lanczos2(x: f32) -> f32 {
    sinc(x) * sinc(0.5 * x)
}

/// Samples [`lanczos2()`] over `[0, 2]`, which is all the accumulation pass
/// needs given the kernel's symmetry.
pub fn lanczos2_lut() -> [f32; LANCZOS2_LUT_WIDTH] {
    let mut lut = [0.0; LANCZOS2_LUT_WIDTH];

    for (idx, weight) in lut.iter_mut().enumerate() {
        let x = 2.0 * idx as f32 / (LANCZOS2_LUT_WIDTH - 1) as f32;

        *weight = lanczos2(x);
    }

    lut
}

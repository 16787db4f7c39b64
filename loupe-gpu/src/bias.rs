use core::f32::consts::PI;

/// Width and height of the maximum-upsample-bias lookup table.
pub const MAXIMUM_BIAS_LUT_SIZE: usize = 16;

/// Number of entries in [`maximum_bias_lut()`].
pub const MAXIMUM_BIAS_LUT_LEN: usize =
    MAXIMUM_BIAS_LUT_SIZE * MAXIMUM_BIAS_LUT_SIZE;

/// Returns the maximum kernel bias the accumulation pass may apply when
/// upsampling a sample located `(u, v)` (both in `[0, 1]`) away from the
/// output pixel center.
///
/// Samples right on the pixel center can be stretched the most (`2.0`); the
/// bias falls off smoothly towards `1.75` as the sample moves away.
///
/// This is an analytic approximation of the bias profile, not a tuned table.
pub fn maximum_bias(u: f32, v: f32) -> f32 {
    let dist = (u * u + v * v).sqrt().clamp(0.0, 1.0);

    2.0 - 0.25 * (0.5 * PI * dist).sin()
}

/// Samples [`maximum_bias()`] over a [`MAXIMUM_BIAS_LUT_SIZE`]² grid, in
/// row-major order.
pub fn maximum_bias_lut() -> [f32; MAXIMUM_BIAS_LUT_LEN] {
    let mut lut = [0.0; MAXIMUM_BIAS_LUT_LEN];
    let step = 1.0 / (MAXIMUM_BIAS_LUT_SIZE - 1) as f32;

    for (idx, bias) in lut.iter_mut().enumerate() {
        let u = (idx % MAXIMUM_BIAS_LUT_SIZE) as f32 * step;
        let v = (idx / MAXIMUM_BIAS_LUT_SIZE) as f32 * step;

        *bias = maximum_bias(u, v);
    }

    lut
}

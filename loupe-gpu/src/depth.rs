use glam::{vec4, Vec4};

/// Returns coefficients which let kernels convert device depth into
/// view-space depth.
///
/// `x` and `y` reconstruct linear depth (the relevant third row of the
/// inverted projection), `z` and `w` convert NDC into view-space positions.
///
/// `near` and `far` can be passed in either order - they are sorted
/// according to `inverted` - and `fov_vertical` is in radians.
pub fn device_to_view_depth(
    near: f32,
    far: f32,
    fov_vertical: f32,
    aspect: f32,
    inverted: bool,
    infinite: bool,
) -> Vec4 {
    let (mut min, mut max) = (near.min(far), near.max(far));

    if inverted {
        (min, max) = (max, min);
    }

    let q = max / (min - max);
    let d = -1.0;

    // [inverted][infinite]
    let matrix_elem_c = [
        [q, -1.0 - f32::EPSILON],
        [q, 0.0 + f32::EPSILON],
    ];

    let matrix_elem_e = [
        [q * min, -min - f32::EPSILON],
        [q * min, max],
    ];

    let c = matrix_elem_c[inverted as usize][infinite as usize];
    let e = matrix_elem_e[inverted as usize][infinite as usize];

    let cot_half_fov_y = 1.0 / (0.5 * fov_vertical).tan();
    let a = cot_half_fov_y / aspect;
    let b = cot_half_fov_y;

    vec4(d * c, e, 1.0 / a, 1.0 / b)
}

/// Returns `tan(horizontal_fov / 2)`, where the horizontal field of view is
/// derived from the vertical one and the aspect ratio.
pub fn tan_half_horizontal_fov(fov_vertical: f32, aspect: f32) -> f32 {
    let fov_horizontal = 2.0 * ((0.5 * fov_vertical).tan() * aspect).atan();

    (0.5 * fov_horizontal).tan()
}

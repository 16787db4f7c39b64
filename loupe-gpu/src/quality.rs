use glam::{uvec2, UVec2};

/// Named presets that trade render resolution for performance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum QualityMode {
    /// Renders at display resolution; only anti-aliasing is performed.
    NativeAa,
    UltraQuality,
    #[default]
    Quality,
    Balanced,
    Performance,
    UltraPerformance,
}

impl QualityMode {
    pub const ALL: [Self; 6] = [
        Self::NativeAa,
        Self::UltraQuality,
        Self::Quality,
        Self::Balanced,
        Self::Performance,
        Self::UltraPerformance,
    ];

    /// Returns the display-to-render size ratio of this preset (e.g. `2.0`
    /// means each axis is rendered at half of the display resolution).
    pub fn upscale_ratio(self) -> f32 {
        match self {
            Self::NativeAa => 1.0,
            Self::UltraQuality => 1.2,
            Self::Quality => 1.5,
            Self::Balanced => 1.7,
            Self::Performance => 2.0,
            Self::UltraPerformance => 3.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::NativeAa => "Native AA",
            Self::UltraQuality => "Ultra Quality",
            Self::Quality => "Quality",
            Self::Balanced => "Balanced",
            Self::Performance => "Performance",
            Self::UltraPerformance => "Ultra Performance",
        }
    }

    /// Returns the render resolution that should be used for given display
    /// resolution.
    pub fn render_resolution(self, display_size: UVec2) -> UVec2 {
        render_resolution(display_size, self)
    }
}

/// See: [`QualityMode::upscale_ratio()`].
pub fn upscale_ratio(mode: QualityMode) -> f32 {
    mode.upscale_ratio()
}

/// Returns `round(display_size / ratio)`, per axis, never going below one
/// pixel.
pub fn render_resolution(display_size: UVec2, mode: QualityMode) -> UVec2 {
    let ratio = mode.upscale_ratio();

    uvec2(
        ((display_size.x as f32 / ratio).round() as u32).max(1),
        ((display_size.y as f32 / ratio).round() as u32).max(1),
    )
}

/// Returns the mipmap bias the host should apply when sampling its material
/// textures while rendering at `render_width` for a `display_width` output.
pub fn mipmap_bias_offset(render_width: u32, display_width: u32) -> f32 {
    (render_width as f32 / display_width as f32).log2() - 1.0
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn render_resolution_of_presets() {
        assert_eq!(
            uvec2(1280, 720),
            render_resolution(uvec2(1920, 1080), QualityMode::Quality)
        );

        assert_eq!(
            uvec2(1920, 1080),
            render_resolution(uvec2(3840, 2160), QualityMode::Performance)
        );

        assert_eq!(
            uvec2(1280, 720),
            render_resolution(uvec2(3840, 2160), QualityMode::UltraPerformance)
        );

        assert_eq!(
            uvec2(1920, 1080),
            render_resolution(uvec2(1920, 1080), QualityMode::NativeAa)
        );

        assert_eq!(
            uvec2(1, 1),
            render_resolution(uvec2(1, 1), QualityMode::UltraPerformance)
        );
    }

    #[test]
    fn render_resolution_is_deterministic() {
        for mode in QualityMode::ALL {
            let a = render_resolution(uvec2(2560, 1440), mode);
            let b = render_resolution(uvec2(2560, 1440), mode);

            assert_eq!(a, b, "{}", mode.name());
            assert_eq!(upscale_ratio(mode), upscale_ratio(mode));
        }
    }

    #[test]
    fn performance_round_trip() {
        let display = uvec2(3840, 2160);
        let render = QualityMode::Performance.render_resolution(display);

        assert_eq!(uvec2(1920, 1080), render);
        assert_relative_eq!(2.0, display.x as f32 / render.x as f32);
        assert_relative_eq!(2.0, display.y as f32 / render.y as f32);
        assert_eq!(
            render,
            QualityMode::Performance.render_resolution(display)
        );
    }

    #[test]
    fn mipmap_bias() {
        assert_relative_eq!(-1.0, mipmap_bias_offset(1920, 1920));
        assert_relative_eq!(-2.0, mipmap_bias_offset(960, 1920));
    }
}

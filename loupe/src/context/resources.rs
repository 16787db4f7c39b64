use std::mem;

use glam::{uvec2, vec4, UVec2, Vec4};
use log::debug;

use crate::{
    gpu, Backend, ContextDescription, DoubleBuffered, Format, Result, Texture,
    TextureAllocation,
};

/// Value the auto-exposure texture starts with; the large second component
/// makes the first frame never mistake its luminance for a shading change.
pub const AUTO_EXPOSURE_BASELINE: Vec4 = Vec4::new(-1.0, 1e8, 0.0, 0.0);

/// Resources living as long as the context.
#[derive(Debug)]
pub struct Resources {
    pub internal_upscaled_color: DoubleBuffered<Texture>,
    pub lock_status: DoubleBuffered<Texture>,
    pub luma_history: DoubleBuffered<Texture>,
    pub dilated_motion_vectors: DoubleBuffered<Texture>,

    pub auto_exposure: Texture,
    pub spd_atomic_counter: Texture,
    pub scene_luminance: Texture,
    pub lanczos_lut: Texture,
    pub maximum_bias_lut: Texture,
    pub default_exposure: Texture,
    pub default_reactivity: Texture,

    /// Output of the reactive-mask generation pass; present only while
    /// dispatches ask for it.
    pub auto_reactive: Option<Texture>,

    /// Resources of the transparency-and-composition generation pass;
    /// present only while dispatches ask for it.
    pub tcr: Option<TcrResources>,
}

impl Resources {
    pub fn new<B>(backend: &mut B, desc: &ContextDescription) -> Result<Self>
    where
        B: Backend,
    {
        debug!("Initializing context resources");

        let render_size = desc.max_render_size;
        let display_size = desc.display_size;
        let mut alloc = TextureAllocation::new(backend);

        let internal_upscaled_color = alloc.double_buffered(
            "internal_upscaled_color",
            display_size,
            Format::Rgba16Float,
        )?;

        let lock_status = alloc.double_buffered(
            "lock_status",
            display_size,
            Format::Rg16Float,
        )?;

        let luma_history = alloc.double_buffered(
            "luma_history",
            display_size,
            Format::Rgba8Unorm,
        )?;

        let dilated_motion_vectors = alloc.double_buffered(
            "dilated_motion_vectors",
            render_size,
            Format::Rg16Float,
        )?;

        let auto_exposure = alloc.texture(
            Texture::builder("auto_exposure")
                .with_size(uvec2(1, 1))
                .with_format(Format::Rg32Float),
        )?;

        let spd_atomic_counter = alloc.texture(
            Texture::builder("spd_atomic_counter")
                .with_size(uvec2(1, 1))
                .with_format(Format::R32Uint),
        )?;

        let scene_luminance = alloc.texture(
            Texture::builder("scene_luminance")
                .with_size(half_size(render_size))
                .with_format(Format::R16Float)
                .with_full_mip_chain(),
        )?;

        let lanczos_lut = alloc.texture(
            Texture::builder("lanczos_lut")
                .with_size(uvec2(gpu::LANCZOS2_LUT_WIDTH as u32, 1))
                .with_format(Format::R16Float)
                .read_only(),
        )?;

        let maximum_bias_lut = alloc.texture(
            Texture::builder("maximum_bias_lut")
                .with_size(UVec2::splat(gpu::MAXIMUM_BIAS_LUT_SIZE as u32))
                .with_format(Format::R16Float)
                .read_only(),
        )?;

        let default_exposure = alloc.texture(
            Texture::builder("default_exposure")
                .with_size(uvec2(1, 1))
                .with_format(Format::Rg32Float)
                .read_only(),
        )?;

        let default_reactivity = alloc.texture(
            Texture::builder("default_reactivity")
                .with_size(uvec2(1, 1))
                .with_format(Format::R8Unorm)
                .read_only(),
        )?;

        let backend = alloc.backend();

        backend.write_texture(
            lanczos_lut.id(),
            &encode_r16(&gpu::lanczos2_lut()),
        );

        backend.write_texture(
            maximum_bias_lut.id(),
            &encode_r16(&gpu::maximum_bias_lut()),
        );

        backend.write_texture(
            default_exposure.id(),
            &Format::Rg32Float.encode(vec4(1.0, 1.0, 0.0, 0.0)),
        );

        backend.write_texture(
            default_reactivity.id(),
            &Format::R8Unorm.encode(Vec4::ZERO),
        );

        alloc.commit();

        Ok(Self {
            internal_upscaled_color,
            lock_status,
            luma_history,
            dilated_motion_vectors,
            auto_exposure,
            spd_atomic_counter,
            scene_luminance,
            lanczos_lut,
            maximum_bias_lut,
            default_exposure,
            default_reactivity,
            auto_reactive: None,
            tcr: None,
        })
    }

    /// Creates or releases the reactive-mask generation output, depending on
    /// whether the current dispatch needs it.
    pub fn update_auto_reactive<B>(
        &mut self,
        backend: &mut B,
        desc: &ContextDescription,
        enabled: bool,
    ) -> Result<()>
    where
        B: Backend,
    {
        match (self.auto_reactive.is_some(), enabled) {
            (false, true) => {
                let mut alloc = TextureAllocation::new(backend);

                let texture = alloc.texture(
                    Texture::builder("auto_reactive")
                        .with_size(desc.max_render_size)
                        .with_format(Format::R8Unorm),
                )?;

                alloc.commit();

                self.auto_reactive = Some(texture);
            }

            (true, false) => {
                if let Some(texture) = self.auto_reactive.take() {
                    texture.destroy(backend);
                }
            }

            _ => (),
        }

        Ok(())
    }

    /// Creates or releases the transparency-and-composition generation
    /// resources, depending on whether the current dispatch needs them.
    ///
    /// Freshly created color history stays uncleared until
    /// [`Self::clear_fresh_tcr_history()`] records its clear.
    pub fn update_tcr<B>(
        &mut self,
        backend: &mut B,
        desc: &ContextDescription,
        enabled: bool,
    ) -> Result<()>
    where
        B: Backend,
    {
        match (self.tcr.is_some(), enabled) {
            (false, true) => {
                self.tcr = Some(TcrResources::new(backend, desc)?);
            }

            (true, false) => {
                if let Some(tcr) = self.tcr.take() {
                    tcr.destroy(backend);
                }
            }

            _ => (),
        }

        Ok(())
    }

    /// Clears color history of transparency-and-composition resources that
    /// haven't been cleared since their creation, so that the first frame
    /// doesn't compare against garbage.
    pub fn clear_fresh_tcr_history<B>(
        &mut self,
        backend: &mut B,
        encoder: &mut B::Encoder,
    ) where
        B: Backend,
    {
        let Some(tcr) = &mut self.tcr else {
            return;
        };

        if !mem::take(&mut tcr.fresh) {
            return;
        }

        for texture in tcr
            .prev_pre_alpha_color
            .iter()
            .chain(tcr.prev_post_alpha_color.iter())
        {
            backend.clear_texture(encoder, texture.id(), Vec4::ZERO);
        }
    }

    /// Resets history to its baseline, so that the frame of given parity
    /// starts from scratch.
    ///
    /// Only the previous-parity halves of double-buffered resources get
    /// cleared, since the current ones are about to be overwritten anyway.
    pub fn clear_history<B>(
        &self,
        backend: &mut B,
        encoder: &mut B::Encoder,
        alternate: bool,
    ) where
        B: Backend,
    {
        debug!("Clearing history; alternate={alternate}");

        let history = [
            &self.internal_upscaled_color,
            &self.lock_status,
            &self.luma_history,
            &self.dilated_motion_vectors,
        ];

        let tcr_history = self.tcr.iter().flat_map(|tcr| {
            [&tcr.prev_pre_alpha_color, &tcr.prev_post_alpha_color]
        });

        for texture in history.into_iter().chain(tcr_history) {
            backend.clear_texture(
                encoder,
                texture.prev(alternate).id(),
                Vec4::ZERO,
            );
        }

        backend.clear_texture(encoder, self.scene_luminance.id(), Vec4::ZERO);

        backend.clear_texture(
            encoder,
            self.auto_exposure.id(),
            AUTO_EXPOSURE_BASELINE,
        );

        backend.clear_texture(
            encoder,
            self.spd_atomic_counter.id(),
            Vec4::ZERO,
        );
    }

    pub fn destroy<B>(self, backend: &mut B)
    where
        B: Backend,
    {
        debug!("Releasing context resources");

        self.internal_upscaled_color.destroy(backend);
        self.lock_status.destroy(backend);
        self.luma_history.destroy(backend);
        self.dilated_motion_vectors.destroy(backend);
        self.auto_exposure.destroy(backend);
        self.spd_atomic_counter.destroy(backend);
        self.scene_luminance.destroy(backend);
        self.lanczos_lut.destroy(backend);
        self.maximum_bias_lut.destroy(backend);
        self.default_exposure.destroy(backend);
        self.default_reactivity.destroy(backend);

        if let Some(texture) = self.auto_reactive {
            texture.destroy(backend);
        }

        if let Some(tcr) = self.tcr {
            tcr.destroy(backend);
        }
    }
}

#[derive(Debug)]
pub struct TcrResources {
    pub reactive: Texture,
    pub composition: Texture,
    pub prev_pre_alpha_color: DoubleBuffered<Texture>,
    pub prev_post_alpha_color: DoubleBuffered<Texture>,

    /// Whether the color history still awaits its initial clear.
    fresh: bool,
}

impl TcrResources {
    fn new<B>(backend: &mut B, desc: &ContextDescription) -> Result<Self>
    where
        B: Backend,
    {
        debug!("Initializing transparency-and-composition resources");

        let render_size = desc.max_render_size;
        let mut alloc = TextureAllocation::new(backend);

        let reactive = alloc.texture(
            Texture::builder("tcr_reactive")
                .with_size(render_size)
                .with_format(Format::R8Unorm),
        )?;

        let composition = alloc.texture(
            Texture::builder("auto_composition")
                .with_size(render_size)
                .with_format(Format::R8Unorm),
        )?;

        let prev_pre_alpha_color = alloc.double_buffered(
            "prev_pre_alpha_color",
            render_size,
            Format::Rgba16Float,
        )?;

        let prev_post_alpha_color = alloc.double_buffered(
            "prev_post_alpha_color",
            render_size,
            Format::Rgba16Float,
        )?;

        alloc.commit();

        Ok(Self {
            reactive,
            composition,
            prev_pre_alpha_color,
            prev_post_alpha_color,
            fresh: true,
        })
    }

    fn destroy<B>(self, backend: &mut B)
    where
        B: Backend,
    {
        debug!("Releasing transparency-and-composition resources");

        self.reactive.destroy(backend);
        self.composition.destroy(backend);
        self.prev_pre_alpha_color.destroy(backend);
        self.prev_post_alpha_color.destroy(backend);
    }
}

/// Half of given size, rounded down, but never empty.
pub fn half_size(size: UVec2) -> UVec2 {
    (size / 2).max(UVec2::ONE)
}

fn encode_r16(values: &[f32]) -> Vec<u8> {
    values
        .iter()
        .flat_map(|value| Format::R16Float.encode(Vec4::splat(*value)))
        .collect()
}

#[cfg(test)]
mod tests {
    use glam::uvec2;

    use super::*;
    use crate::{Command, RecordingBackend};

    fn desc() -> ContextDescription {
        ContextDescription::new(uvec2(64, 32), uvec2(128, 64))
    }

    #[test]
    fn new() {
        let mut backend = RecordingBackend::new();
        let res = Resources::new(&mut backend, &desc()).unwrap();

        assert_eq!(uvec2(128, 64), res.lock_status.curr(false).size());
        assert_eq!(uvec2(64, 32), res.dilated_motion_vectors.prev(true).size());
        assert_eq!(uvec2(32, 16), res.scene_luminance.size());
        assert_eq!(6, res.scene_luminance.mips());

        let lut = backend.texture(res.lanczos_lut.id()).unwrap();

        assert!(!lut.descriptor.storage);
        assert_eq!(
            Some(2 * gpu::LANCZOS2_LUT_WIDTH),
            lut.data.as_ref().map(Vec::len)
        );

        let exposure = backend.texture(res.default_exposure.id()).unwrap();

        assert_eq!(
            Some(Format::Rg32Float.encode(vec4(1.0, 1.0, 0.0, 0.0))),
            exposure.data
        );

        res.destroy(&mut backend);

        assert_eq!(0, backend.live_textures());
    }

    #[test]
    fn new_rolls_back_on_failure() {
        let mut backend =
            RecordingBackend::new().without_texture("loupe_maximum_bias_lut");

        assert!(Resources::new(&mut backend, &desc()).is_err());
        assert!(backend.created_textures() > 0);
        assert_eq!(0, backend.live_textures());
    }

    #[test]
    fn clear_history() {
        let mut backend = RecordingBackend::new();
        let mut encoder = Vec::new();
        let res = Resources::new(&mut backend, &desc()).unwrap();

        res.clear_history(&mut backend, &mut encoder, true);

        let cleared: Vec<_> = encoder
            .iter()
            .map(|cmd| match cmd {
                Command::ClearTexture { texture, value } => (*texture, *value),
                cmd => panic!("unexpected command: {cmd:?}"),
            })
            .collect();

        assert_eq!(
            vec![
                (res.internal_upscaled_color.get(false).id(), Vec4::ZERO),
                (res.lock_status.get(false).id(), Vec4::ZERO),
                (res.luma_history.get(false).id(), Vec4::ZERO),
                (res.dilated_motion_vectors.get(false).id(), Vec4::ZERO),
                (res.scene_luminance.id(), Vec4::ZERO),
                (res.auto_exposure.id(), AUTO_EXPOSURE_BASELINE),
                (res.spd_atomic_counter.id(), Vec4::ZERO),
            ],
            cleared
        );
    }

    #[test]
    fn lazy_resources() {
        let mut backend = RecordingBackend::new();
        let mut encoder = Vec::new();
        let desc = desc();
        let mut res = Resources::new(&mut backend, &desc).unwrap();
        let textures = backend.live_textures();

        res.update_auto_reactive(&mut backend, &desc, true).unwrap();
        res.update_tcr(&mut backend, &desc, true).unwrap();

        assert_eq!(textures + 7, backend.live_textures());
        assert!(encoder.is_empty());

        res.clear_fresh_tcr_history(&mut backend, &mut encoder);

        assert_eq!(4, encoder.len());

        res.update_tcr(&mut backend, &desc, true).unwrap();
        res.clear_fresh_tcr_history(&mut backend, &mut encoder);

        assert_eq!(textures + 7, backend.live_textures());
        assert_eq!(4, encoder.len());

        res.update_auto_reactive(&mut backend, &desc, false).unwrap();
        res.update_tcr(&mut backend, &desc, false).unwrap();

        assert!(res.auto_reactive.is_none());
        assert!(res.tcr.is_none());
        assert_eq!(textures, backend.live_textures());
    }
}

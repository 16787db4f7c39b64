use log::trace;

use super::resources::half_size;
use crate::{
    Backend, ContextDescription, Format, Result, Texture, TextureAllocation,
};

/// Resources living for a single dispatch; their contents are undefined at
/// the beginning of each frame.
#[derive(Debug)]
pub struct Scratch {
    pub dilated_depth: Texture,
    pub reconstructed_previous_nearest_depth: Texture,
    pub prepared_input_color: Texture,
    pub new_locks: Texture,
    pub dilated_reactive_masks: Texture,
    /// First level of the farthest-depth pyramid; lower levels are not kept.
    pub farthest_depth_mip1: Texture,
    pub shading_change: Texture,
}

impl Scratch {
    fn new<B>(backend: &mut B, desc: &ContextDescription) -> Result<Self>
    where
        B: Backend,
    {
        let render_size = desc.max_render_size;
        let mut alloc = TextureAllocation::new(backend);

        let dilated_depth = alloc.texture(
            Texture::builder("dilated_depth")
                .with_size(render_size)
                .with_format(Format::R32Float),
        )?;

        let reconstructed_previous_nearest_depth = alloc.texture(
            Texture::builder("reconstructed_previous_nearest_depth")
                .with_size(render_size)
                .with_format(Format::R32Uint),
        )?;

        let prepared_input_color = alloc.texture(
            Texture::builder("prepared_input_color")
                .with_size(render_size)
                .with_format(Format::Rgba16Float),
        )?;

        let new_locks = alloc.texture(
            Texture::builder("new_locks")
                .with_size(desc.display_size)
                .with_format(Format::R8Unorm),
        )?;

        let dilated_reactive_masks = alloc.texture(
            Texture::builder("dilated_reactive_masks")
                .with_size(render_size)
                .with_format(Format::Rg8Unorm),
        )?;

        let farthest_depth_mip1 = alloc.texture(
            Texture::builder("farthest_depth_mip1")
                .with_size(half_size(render_size))
                .with_format(Format::R16Float),
        )?;

        let shading_change = alloc.texture(
            Texture::builder("shading_change")
                .with_size(half_size(render_size))
                .with_format(Format::R8Unorm),
        )?;

        alloc.commit();

        Ok(Self {
            dilated_depth,
            reconstructed_previous_nearest_depth,
            prepared_input_color,
            new_locks,
            dilated_reactive_masks,
            farthest_depth_mip1,
            shading_change,
        })
    }

    fn destroy<B>(self, backend: &mut B)
    where
        B: Backend,
    {
        self.dilated_depth.destroy(backend);
        self.reconstructed_previous_nearest_depth.destroy(backend);
        self.prepared_input_color.destroy(backend);
        self.new_locks.destroy(backend);
        self.dilated_reactive_masks.destroy(backend);
        self.farthest_depth_mip1.destroy(backend);
        self.shading_change.destroy(backend);
    }
}

/// Scratch resources checked out for the duration of one dispatch; dropping
/// the guard releases them, no matter how the dispatch ends.
pub struct ScratchGuard<'a, B>
where
    B: Backend,
{
    backend: &'a mut B,
    scratch: Option<Scratch>,
}

impl<'a, B> ScratchGuard<'a, B>
where
    B: Backend,
{
    pub fn acquire(
        backend: &'a mut B,
        desc: &ContextDescription,
    ) -> Result<Self> {
        trace!("Acquiring scratch resources");

        let scratch = Scratch::new(backend, desc)?;

        Ok(Self {
            backend,
            scratch: Some(scratch),
        })
    }

    /// Returns the backend (to record work with) and the scratch resources.
    pub fn split(&mut self) -> (&mut B, &Scratch) {
        let scratch = self.scratch.as_ref().unwrap_or_else(|| {
            unreachable!("scratch is released on drop only")
        });

        (&mut *self.backend, scratch)
    }
}

impl<B> Drop for ScratchGuard<'_, B>
where
    B: Backend,
{
    fn drop(&mut self) {
        if let Some(scratch) = self.scratch.take() {
            trace!("Releasing scratch resources");

            scratch.destroy(self.backend);
        }
    }
}

use glam::UVec2;
use log::debug;

use crate::{
    Backend, DoubleBuffered, Format, Result, Texture, TextureBuilder, TextureId,
};

/// Allocates a group of textures that live or die together: unless
/// [`Self::commit()`] gets called, dropping the allocation releases every
/// texture created through it.
pub struct TextureAllocation<'a, B>
where
    B: Backend,
{
    backend: &'a mut B,
    textures: Vec<TextureId>,
    committed: bool,
}

impl<'a, B> TextureAllocation<'a, B>
where
    B: Backend,
{
    pub fn new(backend: &'a mut B) -> Self {
        Self {
            backend,
            textures: Default::default(),
            committed: false,
        }
    }

    pub fn backend(&mut self) -> &mut B {
        self.backend
    }

    pub fn texture(&mut self, builder: TextureBuilder) -> Result<Texture> {
        let texture = builder.build(self.backend)?;

        self.textures.push(texture.id());

        Ok(texture)
    }

    pub fn double_buffered(
        &mut self,
        label: impl AsRef<str>,
        size: UVec2,
        format: Format,
    ) -> Result<DoubleBuffered<Texture>> {
        let label = label.as_ref();

        let a = self.texture(
            Texture::builder(format!("{label}_a"))
                .with_size(size)
                .with_format(format),
        )?;

        let b = self.texture(
            Texture::builder(format!("{label}_b"))
                .with_size(size)
                .with_format(format),
        )?;

        Ok(DoubleBuffered::new(a, b))
    }

    /// Hands the ownership of allocated textures over to the caller.
    pub fn commit(mut self) {
        self.committed = true;
    }
}

impl<B> Drop for TextureAllocation<'_, B>
where
    B: Backend,
{
    fn drop(&mut self) {
        if self.committed {
            return;
        }

        if !self.textures.is_empty() {
            debug!(
                "Rolling back allocation of {} texture(s)",
                self.textures.len()
            );
        }

        for texture in self.textures.drain(..) {
            self.backend.destroy_texture(texture);
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::uvec2;

    use super::*;
    use crate::RecordingBackend;

    #[test]
    fn rollback() {
        let mut backend = RecordingBackend::new().without_texture("loupe_c");

        {
            let mut alloc = TextureAllocation::new(&mut backend);

            for label in ["a", "b", "c"] {
                let tex = alloc.texture(
                    Texture::builder(label)
                        .with_size(uvec2(1, 1))
                        .with_format(Format::R8Unorm),
                );

                if label == "c" {
                    assert!(tex.is_err());
                }
            }
        }

        assert_eq!(2, backend.created_textures());
        assert_eq!(0, backend.live_textures());
    }

    #[test]
    fn commit() {
        let mut backend = RecordingBackend::new();
        let mut alloc = TextureAllocation::new(&mut backend);

        alloc
            .double_buffered("history", uvec2(2, 2), Format::R8Unorm)
            .unwrap();

        alloc.commit();

        assert_eq!(2, backend.live_textures());
    }
}

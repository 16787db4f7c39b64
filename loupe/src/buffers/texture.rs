use glam::UVec2;
use log::debug;

use crate::{
    Backend, Format, Result, ResourceView, TextureDescriptor, TextureId,
};

#[derive(Clone, Debug)]
pub struct Texture {
    id: TextureId,
    label: String,
    size: UVec2,
    format: Format,
    mips: u32,
}

impl Texture {
    pub fn builder(label: impl AsRef<str>) -> TextureBuilder {
        TextureBuilder {
            label: format!("loupe_{}", label.as_ref()),
            size: None,
            format: None,
            mips: 1,
            storage: true,
        }
    }

    pub fn id(&self) -> TextureId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn size(&self) -> UVec2 {
        self.size
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn mips(&self) -> u32 {
        self.mips
    }

    /// Returns a view of the entire texture.
    pub fn view(&self) -> ResourceView {
        ResourceView::new(self.id)
    }

    /// Returns a view of given mip; mips past the last one resolve to the
    /// last one.
    pub fn mip(&self, mip: u32) -> ResourceView {
        ResourceView::new(self.id).with_mip(mip.min(self.mips - 1))
    }

    pub fn destroy<B>(self, backend: &mut B)
    where
        B: Backend,
    {
        debug!("Releasing texture `{}`", self.label);

        backend.destroy_texture(self.id);
    }
}

#[derive(Debug)]
pub struct TextureBuilder {
    label: String,
    size: Option<UVec2>,
    format: Option<Format>,
    mips: u32,
    storage: bool,
}

impl TextureBuilder {
    pub fn with_size(mut self, size: UVec2) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    /// Allocates a full mip chain, down to 1x1.
    pub fn with_full_mip_chain(mut self) -> Self {
        self.mips = 0;
        self
    }

    /// Makes the texture read-only for kernels (e.g. lookup tables).
    pub fn read_only(mut self) -> Self {
        self.storage = false;
        self
    }

    pub fn build<B>(self, backend: &mut B) -> Result<Texture>
    where
        B: Backend,
    {
        let size = self.size.expect("Missing texture size");
        let format = self.format.expect("Missing texture format");

        assert!(size.x > 0 && size.y > 0, "Texture `{}` is empty", self.label);

        let mips = if self.mips == 0 {
            size.x.max(size.y).ilog2() + 1
        } else {
            self.mips
        };

        debug!(
            "Allocating texture `{}`; size={size:?}, format={format:?}, \
             mips={mips}",
            self.label,
        );

        let id = backend.create_texture(&TextureDescriptor {
            label: self.label.clone(),
            size,
            format,
            mips,
            storage: self.storage,
        })?;

        Ok(Texture {
            id,
            label: self.label,
            size,
            format,
            mips,
        })
    }
}

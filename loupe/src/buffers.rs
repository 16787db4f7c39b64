mod constant_buffer;
mod double_buffered;
mod texture;
mod texture_allocation;

pub use self::constant_buffer::*;
pub use self::double_buffered::*;
pub use self::texture::*;
pub use self::texture_allocation::*;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Fatal configuration errors; a context that fails with one of these is not
/// usable.
#[derive(Debug, Error)]
pub enum Error {
    #[error("kernel `{kernel}` is not available")]
    KernelUnavailable { kernel: &'static str },

    #[error("couldn't create texture `{label}`: {reason}")]
    TextureCreation { label: String, reason: String },

    #[error("couldn't create buffer `{label}`: {reason}")]
    BufferCreation { label: String, reason: String },

    #[error("invalid context description: {0}")]
    InvalidDescription(&'static str),
}

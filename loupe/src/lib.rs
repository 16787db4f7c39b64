//! Loupe: temporal super-resolution upscaler.
//!
//! Given a stream of jittered, low-resolution frames (color, depth, motion
//! vectors and optional masks), Loupe records the compute passes that
//! reconstruct a temporally stable, high-resolution image out of them.
//!
//! Loupe doesn't own a GPU - it talks to the host through [`Backend`], which
//! is implemented for `wgpu` (behind the `wgpu` feature) and by
//! [`RecordingBackend`], which only remembers what was asked of it.
//!
//! # Usage
//!
//! ```no_run
//! # use loupe::*;
//! # use glam::uvec2;
//! # fn run(backend: &mut RecordingBackend) -> loupe::Result<()> {
//! let display_size = uvec2(1920, 1080);
//! let render_size = QualityMode::Quality.render_resolution(display_size);
//!
//! let mut context = Context::new(
//!     backend,
//!     ContextDescription::new(render_size, display_size),
//! )?;
//!
//! let phase_count = gpu::jitter_phase_count(render_size.x, display_size.x);
//!
//! for frame in 0..3 {
//!     let jitter = gpu::jitter_offset(frame, phase_count);
//!
//!     // (render the scene using jitter, then:)
//!
//!     let mut encoder = Vec::new();
//!
//!     context.dispatch(
//!         backend,
//!         &mut encoder,
//!         &DispatchDescription {
//!             render_size,
//!             jitter_offset: jitter,
//!             ..Default::default()
//!         },
//!     )?;
//! }
//!
//! context.destroy(backend);
//! # Ok(())
//! # }
//! ```

mod backend;
mod buffers;
mod context;
mod description;
mod error;
pub mod validation;

pub use loupe_gpu as gpu;
pub use loupe_gpu::{
    jitter_offset, jitter_phase_count, jitter_projection_offset,
    mipmap_bias_offset, render_resolution, upscale_ratio, QualityMode,
};

pub use self::backend::*;
pub use self::buffers::*;
pub use self::context::*;
pub use self::description::*;
pub use self::error::*;
pub use self::validation::Violation;

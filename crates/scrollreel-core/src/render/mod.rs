//! Cover-fit drawing of frames onto a surface.

mod fit;
mod renderer;
mod surface;

pub use fit::CoverFit;
pub use renderer::{DrawOutcome, Renderer, Sampling};
pub use surface::Surface;

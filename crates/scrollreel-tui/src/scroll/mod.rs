//! Smooth page scrolling for the terminal host.
//!
//! Keyboard scrolling is animated over page pixels; every intermediate offset is
//! pushed through the page so sequence playback follows the animation.

pub mod animation;
pub mod config;
pub mod timing;

pub use animation::ScrollAnimator;
pub use config::ScrollConfigExt;
pub use scrollreel_core::scroll::EasingTypeExt;
pub use scrollreel_core::{EasingType, ScrollConfig};

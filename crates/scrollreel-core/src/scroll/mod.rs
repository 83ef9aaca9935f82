//! Scroll-driven playback: progress mapping, pinning and caption choreography.

pub mod easing;
pub mod mapper;
pub mod overlay;

pub use easing::EasingTypeExt;
pub use mapper::{frame_for, PinGeometry, PinState, PlaybackSnapshot, ScrollMapper};
pub use overlay::{CaptionStyle, FadeRange, OverlayChoreographer};

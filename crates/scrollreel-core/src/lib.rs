pub mod config;
pub mod error;
pub mod frames;
pub mod gate;
pub mod geometry;
pub mod page;
pub mod player;
pub mod render;
pub mod scroll;
pub mod sequence;
pub mod viewport;

pub use config::{AppConfig, EasingType, ScrollConfig};
pub use error::{Error, Result};
pub use page::{Page, Section, SectionContent, SectionSpec};
pub use player::{PlayerContext, SequencePlayer};

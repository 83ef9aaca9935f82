use serde::{Deserialize, Serialize};

use super::layout::FrameLayout;
use crate::config::SequenceSectionConfig;
use crate::{Error, Result};

/// Immutable configuration for one player instance
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceDescriptor {
    name: String,
    frame_count: u32,
    pin_distance: f64,
    lazy: bool,
    layout: FrameLayout,
}

impl SequenceDescriptor {
    /// Create a descriptor, rejecting values no player can run with
    pub fn new(
        name: impl Into<String>,
        frame_count: u32,
        pin_distance: f64,
        lazy: bool,
        layout: FrameLayout,
    ) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::InvalidDescriptor("sequence name is empty".into()));
        }
        if frame_count == 0 {
            return Err(Error::InvalidDescriptor(format!(
                "sequence '{}' must have at least one frame",
                name
            )));
        }
        if !(pin_distance.is_finite() && pin_distance > 0.0) {
            return Err(Error::InvalidDescriptor(format!(
                "sequence '{}' has invalid pin distance {}",
                name, pin_distance
            )));
        }
        Ok(Self {
            name,
            frame_count,
            pin_distance,
            lazy,
            layout,
        })
    }

    pub fn from_section(section: &SequenceSectionConfig) -> Result<Self> {
        Self::new(
            section.name.clone(),
            section.frame_count,
            section.pin_distance,
            section.lazy,
            section.layout(),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    /// Pin distance in viewport heights
    pub fn pin_distance(&self) -> f64 {
        self.pin_distance
    }

    pub fn lazy(&self) -> bool {
        self.lazy
    }

    pub fn layout(&self) -> &FrameLayout {
        &self.layout
    }

    /// Index of the last frame
    pub fn last_frame(&self) -> u32 {
        self.frame_count - 1
    }
}

/// Caption text colour treatment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextColor {
    #[default]
    Light,
    Dark,
    Gold,
}

/// Decorative divider drawn at the section edge, toward the next section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveVariant {
    #[default]
    None,
    Asymmetric,
    Diagonal,
    Stepped,
    SteppedTop,
}

impl CurveVariant {
    /// Whether the divider hangs from the top edge instead of the bottom
    pub fn at_top(&self) -> bool {
        matches!(self, CurveVariant::SteppedTop)
    }
}

/// Cosmetic properties that never influence playback
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Presentation {
    pub title: String,
    pub subtitle: String,
    pub text_color: TextColor,
    pub curve: CurveVariant,
}

impl Presentation {
    pub fn from_section(section: &SequenceSectionConfig) -> Self {
        Self {
            title: section.title.clone(),
            subtitle: section.subtitle.clone(),
            text_color: section.text_color,
            curve: section.curve,
        }
    }
}

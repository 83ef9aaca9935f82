use std::sync::Arc;

use crate::config::{AppConfig, SectionConfig};
use crate::frames::FrameSource;
use crate::geometry::{SectionBounds, ViewportSignal};
use crate::player::{PlayerContext, SequencePlayer};
use crate::sequence::{Presentation, SequenceDescriptor};
use crate::viewport::ViewportBus;
use crate::Result;

/// What occupies a slot of the page
pub enum SectionContent {
    /// Non-core page content, shown as a labelled block
    Static { label: String },
    Sequence(Box<SequencePlayer>),
    /// A sequence whose player has been torn down; keeps its space
    Unmounted { name: String },
}

pub struct Section {
    /// Height in viewport heights
    height_vh: f64,
    bounds: SectionBounds,
    content: SectionContent,
}

impl Section {
    pub fn bounds(&self) -> SectionBounds {
        self.bounds
    }

    pub fn content(&self) -> &SectionContent {
        &self.content
    }

    pub fn player(&self) -> Option<&SequencePlayer> {
        match &self.content {
            SectionContent::Sequence(player) => Some(&**player),
            _ => None,
        }
    }

    pub fn label(&self) -> &str {
        match &self.content {
            SectionContent::Static { label } => label.as_str(),
            SectionContent::Sequence(player) => player.descriptor().name(),
            SectionContent::Unmounted { name } => name.as_str(),
        }
    }
}

/// Input for building one section
pub enum SectionSpec {
    Static { label: String, height: f64 },
    Sequence {
        descriptor: SequenceDescriptor,
        presentation: Presentation,
    },
}

impl SectionSpec {
    /// Height in viewport heights: a sequence's own viewport plus its pin spacer
    fn height_vh(&self) -> f64 {
        match self {
            SectionSpec::Static { height, .. } => height.max(0.0),
            SectionSpec::Sequence { descriptor, .. } => 1.0 + descriptor.pin_distance(),
        }
    }
}

/// A long-scroll document of static sections and sequence players
pub struct Page {
    bus: ViewportBus,
    sections: Vec<Section>,
    /// Viewport height the section bounds were last computed for
    layout_height: u32,
}

impl Page {
    /// Mount every section. Must be called inside a tokio runtime.
    pub fn new(specs: Vec<SectionSpec>, ctx: &PlayerContext, width: u32, height: u32) -> Self {
        let bus = ViewportBus::new(ViewportSignal::new(0.0, width, height));
        let vh = height as f64;

        let mut top = 0.0;
        let mut sections = Vec::with_capacity(specs.len());
        for spec in specs {
            let height_vh = spec.height_vh();
            let bounds = SectionBounds::new(top, height_vh * vh);
            top = bounds.bottom();

            let content = match spec {
                SectionSpec::Static { label, .. } => SectionContent::Static { label },
                SectionSpec::Sequence {
                    descriptor,
                    presentation,
                } => SectionContent::Sequence(Box::new(SequencePlayer::mount(
                    descriptor,
                    presentation,
                    bounds,
                    &bus,
                    ctx,
                ))),
            };
            sections.push(Section {
                height_vh,
                bounds,
                content,
            });
        }

        tracing::info!(
            sections = sections.len(),
            document_height = top,
            "Page laid out"
        );

        Self {
            bus,
            sections,
            layout_height: height,
        }
    }

    pub fn from_config(
        config: &AppConfig,
        source: Arc<dyn FrameSource>,
        width: u32,
        height: u32,
    ) -> Result<Self> {
        let specs = config
            .page
            .sections
            .iter()
            .map(|section| match section {
                SectionConfig::Static(s) => Ok(SectionSpec::Static {
                    label: s.label.clone(),
                    height: s.height,
                }),
                SectionConfig::Sequence(s) => Ok(SectionSpec::Sequence {
                    descriptor: SequenceDescriptor::from_section(s)?,
                    presentation: Presentation::from_section(s),
                }),
            })
            .collect::<Result<Vec<_>>>()?;

        let ctx = PlayerContext::from_config(config, source);
        Ok(Self::new(specs, &ctx, width, height))
    }

    pub fn viewport(&self) -> ViewportSignal {
        self.bus.current()
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn players(&self) -> impl Iterator<Item = &SequencePlayer> {
        self.sections.iter().filter_map(Section::player)
    }

    pub fn document_height(&self) -> f64 {
        self.sections.last().map(|s| s.bounds.bottom()).unwrap_or(0.0)
    }

    pub fn max_scroll(&self) -> f64 {
        (self.document_height() - self.viewport().vh()).max(0.0)
    }

    /// Scroll to an absolute offset, clamped to the document
    pub fn scroll_to(&self, scroll_y: f64) {
        self.bus.scroll_to(scroll_y.clamp(0.0, self.max_scroll()));
    }

    pub fn scroll_by(&self, delta: f64) {
        self.scroll_to(self.viewport().scroll_y + delta);
    }

    /// Re-lay out for a new viewport
    ///
    /// A pinned section keeps its progress; otherwise the offset scales with the
    /// viewport height so the same part of the document stays in view.
    /// An empty viewport keeps the last layout and offset until a usable size arrives.
    pub fn resize(&mut self, width: u32, height: u32) {
        let old = self.viewport();
        if (old.width, old.height) == (width, height) {
            return;
        }

        let next = ViewportSignal::new(old.scroll_y, width, height);
        if next.is_empty() {
            tracing::debug!(width, height, "Empty viewport, layout kept");
            self.bus.publish(next);
            return;
        }
        let vh = height as f64;

        let mut top = 0.0;
        let mut anchor: Option<f64> = None;
        for section in &mut self.sections {
            section.bounds = SectionBounds::new(top, section.height_vh * vh);
            top = section.bounds.bottom();
            if let SectionContent::Sequence(player) = &mut section.content {
                if let Some(scroll_y) = player.relayout(section.bounds, vh) {
                    anchor.get_or_insert(scroll_y);
                }
            }
        }

        let scroll_y = match anchor {
            Some(scroll_y) => scroll_y,
            None if self.layout_height > 0 => old.scroll_y * vh / self.layout_height as f64,
            None => old.scroll_y,
        };
        self.layout_height = height;
        let max_scroll = (top - vh).max(0.0);

        tracing::debug!(
            width,
            height,
            scroll_y,
            anchored = anchor.is_some(),
            "Page resized"
        );

        self.bus
            .publish(ViewportSignal::new(scroll_y.clamp(0.0, max_scroll), width, height));
    }

    /// Tick every mounted player. Returns true if anything changed.
    pub fn tick(&mut self) -> bool {
        let mut changed = false;
        for section in &mut self.sections {
            if let SectionContent::Sequence(player) = &mut section.content {
                changed |= player.tick();
            }
        }
        changed
    }

    /// Index of the section at document offset `y`
    pub fn section_at(&self, y: f64) -> Option<usize> {
        self.sections
            .iter()
            .position(|s| y >= s.bounds.top && y < s.bounds.bottom())
            .or_else(|| (!self.sections.is_empty() && y >= self.document_height()).then(|| self.sections.len() - 1))
    }

    /// Section under the viewport top
    pub fn active_section(&self) -> Option<usize> {
        self.section_at(self.viewport().scroll_y)
    }

    /// Sections overlapping the viewport, top to bottom
    pub fn visible_sections(&self) -> impl Iterator<Item = (usize, &Section)> {
        let viewport = self.viewport();
        self.sections
            .iter()
            .enumerate()
            .filter(move |(_, s)| s.bounds.within(&viewport, 0.0))
    }

    pub fn section_top(&self, index: usize) -> Option<f64> {
        self.sections.get(index).map(|s| s.bounds.top)
    }

    /// Tear down the player of section `index`. Returns false if it had none.
    pub fn unmount(&mut self, index: usize) -> bool {
        let Some(section) = self.sections.get_mut(index) else {
            return false;
        };
        let SectionContent::Sequence(player) = &section.content else {
            return false;
        };
        let name = player.descriptor().name().to_string();
        // dropping the player unmounts it
        section.content = SectionContent::Unmounted { name };
        true
    }

    pub fn subscriber_count(&self) -> usize {
        self.bus.subscriber_count()
    }
}

use serde::Serialize;

/// Scroll offset and viewport size of the host, in surface pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ViewportSignal {
    /// Document offset of the viewport's top edge
    pub scroll_y: f64,
    pub width: u32,
    pub height: u32,
}

impl ViewportSignal {
    pub fn new(scroll_y: f64, width: u32, height: u32) -> Self {
        Self {
            scroll_y,
            width,
            height,
        }
    }

    pub fn vh(&self) -> f64 {
        self.height as f64
    }

    pub fn bottom(&self) -> f64 {
        self.scroll_y + self.vh()
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Vertical extent of a section in document coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SectionBounds {
    pub top: f64,
    pub height: f64,
}

impl SectionBounds {
    pub fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Whether the section overlaps the viewport grown by `margin` on both edges
    pub fn within(&self, viewport: &ViewportSignal, margin: f64) -> bool {
        self.top < viewport.bottom() + margin && self.bottom() > viewport.scroll_y - margin
    }
}

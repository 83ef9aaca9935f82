use ratatui::{layout::Rect, style::Style, widgets::Block, Frame};
use scrollreel_core::SectionContent;

use super::{SequenceWidget, StaticSectionWidget};
use crate::app::{App, PIXELS_PER_ROW};

/// Screen rows a section covers, clipped to the page area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowSpan {
    /// Visible slice of the page area
    pub area: Rect,
    /// Content rows hidden above `area`
    pub skip: u16,
}

/// Clip content starting `top` rows below the area's top edge and `rows` tall
pub fn clip_rows(area: Rect, top: i32, rows: u16) -> Option<RowSpan> {
    let start = top.max(0);
    let end = (top + rows as i32).min(area.height as i32);
    if end <= start {
        return None;
    }
    Some(RowSpan {
        area: Rect {
            y: area.y + start as u16,
            height: (end - start) as u16,
            ..area
        },
        skip: (start - top) as u16,
    })
}

fn to_rows(px: f64) -> i32 {
    (px / PIXELS_PER_ROW).round() as i32
}

/// Paints every section overlapping the viewport
pub struct PageWidget;

impl PageWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = &app.theme;
        frame.render_widget(Block::default().style(Style::default().bg(theme.bg0)), area);

        let viewport = app.page.viewport();
        let content_rows = area.height;

        for (index, section) in app.page.visible_sections() {
            let bounds = section.bounds();
            let top = to_rows(bounds.top - viewport.scroll_y);
            let rows = to_rows(bounds.height).max(0) as u16;

            match section.content() {
                SectionContent::Static { label } => {
                    if let Some(span) = clip_rows(area, top, rows) {
                        StaticSectionWidget::new(label, index, theme).render(frame, span.area, span.skip, rows);
                    }
                }
                SectionContent::Sequence(player) => {
                    // the content sits at its pinned offset; the rest of the section is spacer
                    let content_top = to_rows(player.section_offset());
                    if let Some(span) = clip_rows(area, content_top, content_rows) {
                        SequenceWidget::new(player, theme, app.spinner_frame)
                            .render(frame, span.area, span.skip, content_rows);
                    }
                }
                SectionContent::Unmounted { name } => {
                    if let Some(span) = clip_rows(area, top, rows) {
                        StaticSectionWidget::new(name, index, theme)
                            .note("unmounted")
                            .render(frame, span.area, span.skip, rows);
                    }
                }
            }
        }
    }
}

use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Frame,
};

use crate::theme::Theme;

/// A plain labelled block standing in for non-sequence page content
pub struct StaticSectionWidget<'a> {
    label: &'a str,
    note: Option<&'a str>,
    index: usize,
    theme: &'a Theme,
}

impl<'a> StaticSectionWidget<'a> {
    pub fn new(label: &'a str, index: usize, theme: &'a Theme) -> Self {
        Self {
            label,
            note: None,
            index,
            theme,
        }
    }

    /// Secondary line under the label
    pub fn note(mut self, note: &'a str) -> Self {
        self.note = Some(note);
        self
    }

    /// Render rows `skip..skip + area.height` of a section `rows` tall
    pub fn render(&self, frame: &mut Frame, area: Rect, skip: u16, rows: u16) {
        let bg = if self.index % 2 == 0 {
            self.theme.bg1
        } else {
            self.theme.bg0
        };
        frame.render_widget(Block::default().style(Style::default().bg(bg)), area);

        let label_row = (rows / 2).saturating_sub(1);
        let mut lines = vec![Line::from(Span::styled(
            self.label.to_string(),
            Style::default().fg(self.theme.fg0).add_modifier(Modifier::BOLD),
        ))];
        if let Some(note) = self.note {
            lines.push(Line::from(Span::styled(
                note.to_string(),
                Style::default().fg(self.theme.grey1),
            )));
        }

        // label block position relative to the visible area
        let Some(top) = label_row.checked_sub(skip) else {
            return;
        };
        if top >= area.height {
            return;
        }
        let text_area = Rect {
            y: area.y + top,
            height: (area.height - top).min(lines.len() as u16),
            ..area
        };
        frame.render_widget(
            Paragraph::new(lines).alignment(Alignment::Center).style(Style::default().bg(bg)),
            text_area,
        );
    }
}

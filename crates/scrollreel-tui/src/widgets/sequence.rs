use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use scrollreel_core::render::Surface;
use scrollreel_core::sequence::CurveVariant;
use scrollreel_core::SequencePlayer;
use unicode_width::UnicodeWidthChar;

use crate::app::PIXELS_PER_ROW;
use crate::theme::{blend, Theme};

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Divider band height in content pixels
fn divider_depth(content_px: u32) -> u32 {
    (content_px / 8).clamp(2, 12)
}

/// How a divider shape is painted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DividerPaint {
    /// Filled below the line, anchored to the bottom edge
    FillBelow,
    /// Filled above the line, anchored to the top edge, with an accent edge
    FillAbove,
    /// Accent line only
    Stroke,
}

/// Paint mode for a divider variant; `None` draws nothing
pub fn divider_paint(variant: CurveVariant) -> Option<DividerPaint> {
    match variant {
        CurveVariant::None => None,
        CurveVariant::Asymmetric => Some(DividerPaint::FillBelow),
        CurveVariant::Diagonal | CurveVariant::Stepped => Some(DividerPaint::Stroke),
        CurveVariant::SteppedTop => Some(DividerPaint::FillAbove),
    }
}

/// Divider line height per column, as a fraction of the band from its top edge
pub fn curve_profile(variant: CurveVariant, width: u16) -> Vec<f64> {
    let span = width.saturating_sub(1).max(1) as f64;
    (0..width)
        .map(|x| {
            let t = x as f64 / span;
            match variant {
                CurveVariant::None => 0.0,
                // two cubic segments: dip to the bottom, rise to the top, settle mid-band
                CurveVariant::Asymmetric => {
                    if t < 0.5 {
                        cubic(0.0, 1.0, 1.0, 0.5, t * 2.0)
                    } else {
                        cubic(0.5, 0.0, 0.0, 0.5, t * 2.0 - 1.0)
                    }
                }
                CurveVariant::Diagonal => 1.0 - t / 3.0,
                CurveVariant::Stepped => step(t, 1.0 / 6.0, 0.5),
                CurveVariant::SteppedTop => step(t, 1.0 / 3.0, 2.0 / 3.0),
            }
        })
        .collect()
}

fn cubic(p0: f64, p1: f64, p2: f64, p3: f64, t: f64) -> f64 {
    let u = 1.0 - t;
    u * u * u * p0 + 3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t * p3
}

/// Alternates `high`/`low` over four equal columns
fn step(t: f64, high: f64, low: f64) -> f64 {
    let quarter = ((t * 4.0).floor() as u32).min(3);
    if quarter % 2 == 0 {
        high
    } else {
        low
    }
}

/// Paints one sequence section: frame, divider, caption and loading state
pub struct SequenceWidget<'a> {
    player: &'a SequencePlayer,
    theme: &'a Theme,
    spinner_frame: usize,
}

impl<'a> SequenceWidget<'a> {
    pub fn new(player: &'a SequencePlayer, theme: &'a Theme, spinner_frame: usize) -> Self {
        Self {
            player,
            theme,
            spinner_frame,
        }
    }

    /// Render the visible part of the content into `area`
    ///
    /// `skip` is the number of content rows scrolled off above `area`;
    /// `content_rows` is the full content height in rows.
    pub fn render(&self, frame: &mut Frame, area: Rect, skip: u16, content_rows: u16) {
        if area.is_empty() {
            return;
        }

        let lines = self.pixel_lines(area, skip, content_rows);
        frame.render_widget(Paragraph::new(lines), area);

        let buf = frame.buffer_mut();
        if self.player.displayed_frame().is_some() {
            self.render_caption(buf, area, skip, content_rows);
        } else {
            self.render_placeholder(buf, area, skip, content_rows);
        }
    }

    fn pixel_lines(&self, area: Rect, skip: u16, content_rows: u16) -> Vec<Line<'static>> {
        let surface = self.player.surface();
        let has_frame = self.player.displayed_frame().is_some();
        let content_px = content_rows as u32 * PIXELS_PER_ROW as u32;
        let divider = Divider::new(self.player.presentation().curve, area.width, content_px, self.theme);

        (0..area.height)
            .map(|row| {
                let py = surface_y(skip, row);
                let spans: Vec<Span<'static>> = (0..area.width)
                    .map(|col| {
                        let top = self.pixel_color(surface, has_frame, &divider, col, py);
                        let bottom = self.pixel_color(surface, has_frame, &divider, col, py + 1);
                        Span::styled("▀", Style::default().fg(top).bg(bottom))
                    })
                    .collect();
                Line::from(spans)
            })
            .collect()
    }

    fn pixel_color(&self, surface: &Surface, has_frame: bool, divider: &Divider, x: u16, y: u32) -> Color {
        if let Some(color) = divider.color_at(x, y) {
            return color;
        }
        if has_frame {
            if let Some(px) = surface.pixel(x as u32, y) {
                return Color::Rgb(px[0], px[1], px[2]);
            }
        }
        self.theme.bg0
    }

    fn render_caption(&self, buf: &mut Buffer, area: Rect, skip: u16, content_rows: u16) {
        let style = self.player.caption();
        if !style.is_visible() {
            return;
        }

        let presentation = self.player.presentation();
        let color = self.theme.caption(presentation.text_color);
        let max_shift = (content_rows / 4) as f64;
        let shift = (style.offset / PIXELS_PER_ROW).round().clamp(-max_shift, max_shift) as i32;
        let title_row = (content_rows / 2) as i32 - 1 + shift;

        put_text(buf, area, skip, title_row, &presentation.title, |bg| blend(color, bg, style.opacity));
        put_text(buf, area, skip, title_row + 2, &presentation.subtitle, |bg| {
            blend(color, bg, style.opacity * 0.85)
        });
    }

    fn render_placeholder(&self, buf: &mut Buffer, area: Rect, skip: u16, content_rows: u16) {
        let progress = self.player.load_progress();
        let row = (content_rows / 2) as i32;

        let (text, color) = if progress.total > 0 && progress.failed == progress.total {
            ("Frames unavailable".to_string(), self.theme.error)
        } else if self.player.is_loading() || !self.player.has_started_loading() {
            let spinner = SPINNER[self.spinner_frame % SPINNER.len()];
            (
                format!("{} Loading frames {}/{}", spinner, progress.ready, progress.total),
                self.theme.grey1,
            )
        } else {
            return;
        };

        put_text(buf, area, skip, row, &text, |_| color);
    }
}

/// Centre `text` on content row `row`, colouring each cell from its current background
fn put_text(buf: &mut Buffer, area: Rect, skip: u16, row: i32, text: &str, fg: impl Fn(Color) -> Color) {
    let screen_row = row - skip as i32;
    if text.is_empty() || screen_row < 0 || screen_row >= area.height as i32 {
        return;
    }
    let y = area.y + screen_row as u16;

    let text_width: usize = text.chars().filter_map(|c| c.width()).sum();
    let mut x = area.x as usize + (area.width as usize).saturating_sub(text_width) / 2;
    let right = area.x as usize + area.width as usize;

    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if w == 0 {
            continue;
        }
        if x + w > right {
            break;
        }
        if let Some(cell) = buf.cell_mut((x as u16, y)) {
            let bg = cell.bg;
            cell.set_char(ch).set_fg(fg(bg));
        }
        x += w;
    }
}

/// Per-pixel divider overlay for one section
struct Divider {
    paint: Option<DividerPaint>,
    profile: Vec<f64>,
    band_top: u32,
    depth: u32,
    fill: Color,
    accent: Color,
}

impl Divider {
    fn new(variant: CurveVariant, width: u16, content_px: u32, theme: &Theme) -> Self {
        let depth = divider_depth(content_px);
        let band_top = if variant.at_top() {
            0
        } else {
            content_px.saturating_sub(depth)
        };
        Self {
            paint: divider_paint(variant),
            profile: curve_profile(variant, width),
            band_top,
            depth,
            fill: theme.divider,
            accent: theme.accent,
        }
    }

    fn color_at(&self, x: u16, y: u32) -> Option<Color> {
        let paint = self.paint?;
        if y < self.band_top || y >= self.band_top + self.depth {
            return None;
        }
        let line = self.profile.get(x as usize)?;
        let local = (y - self.band_top) as f64;
        let line_px = (line * (self.depth - 1) as f64).round();

        match paint {
            DividerPaint::FillBelow => (local >= line_px).then_some(self.fill),
            DividerPaint::FillAbove if local == line_px => Some(self.accent),
            DividerPaint::FillAbove => (local < line_px).then_some(self.fill),
            DividerPaint::Stroke => (local == line_px).then_some(self.accent),
        }
    }
}

/// Top surface pixel of a content row
fn surface_y(skip: u16, row: u16) -> u32 {
    (skip as u32 + row as u32) * PIXELS_PER_ROW as u32
}

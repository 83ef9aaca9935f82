use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use scrollreel_core::SectionContent;
use unicode_width::UnicodeWidthStr;

use crate::app::App;

pub struct StatusBarWidget;

impl StatusBarWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = &app.theme;
        let status_text = match &app.status_message {
            Some(msg) => format!(" {}", msg),
            None => Self::describe(app),
        };

        let help_hint = " q:quit j/k:scroll ^d/^u:half page Tab:section gg/G:top/bottom ";
        let used = status_text.width() + help_hint.width();
        let padding = " ".repeat((area.width as usize).saturating_sub(used));

        let mut spans = vec![
            Span::styled(status_text, Style::default().fg(theme.fg0).bg(theme.bg2)),
            Span::styled(padding, Style::default().bg(theme.bg2)),
        ];
        if used <= area.width as usize {
            spans.push(Span::styled(help_hint, Style::default().fg(theme.grey1).bg(theme.bg2)));
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    /// Active section, pin state, playback position and load counts
    pub fn describe(app: &App) -> String {
        let page = &app.page;
        let Some(index) = page.active_section() else {
            return " (empty page)".to_string();
        };
        let section = &page.sections()[index];
        let position = format!(" [{}/{}] {}", index + 1, page.sections().len(), section.label());

        match section.content() {
            SectionContent::Sequence(player) => {
                let snapshot = player.snapshot();
                let load = player.load_progress();
                let mut text = format!(
                    "{} | {} | {:>3.0}% | frame {}/{}",
                    position,
                    snapshot.state.label(),
                    snapshot.progress * 100.0,
                    snapshot.frame + 1,
                    player.descriptor().frame_count(),
                );
                if player.has_started_loading() {
                    text.push_str(&format!(" | loaded {}/{}", load.ready, load.total));
                    if load.failed > 0 {
                        text.push_str(&format!(" ({} failed)", load.failed));
                    }
                } else {
                    text.push_str(" | idle");
                }
                text
            }
            SectionContent::Static { .. } => position,
            SectionContent::Unmounted { .. } => format!("{} | unmounted", position),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use scrollreel_core::frames::FsFrameSource;
    use scrollreel_core::AppConfig;

    use super::*;
    use crate::input::Action;

    #[tokio::test]
    async fn test_describe_sections() {
        let mut config = AppConfig::default();
        config.ui.scroll.smooth_enabled = false;
        let source = Arc::new(FsFrameSource::new("/nonexistent/scrollreel-test"));
        let mut app = App::new(config, source, 80, 25).unwrap();

        assert_eq!(StatusBarWidget::describe(&app), " [1/3] Hero");

        app.handle_action(Action::NextSection);
        app.page.tick();
        let text = StatusBarWidget::describe(&app);
        assert!(text.starts_with(" [2/3] scroll-sequence | pinned |   0% | frame 1/120"), "{text}");
    }
}

use std::sync::Arc;

use anyhow::Result;
use scrollreel_core::frames::FrameSource;
use scrollreel_core::{AppConfig, Page};

use crate::input::Action;
use crate::scroll::ScrollAnimator;
use crate::theme::{load_theme, Theme};

/// Rows reserved below the page for the status bar
pub const STATUS_BAR_HEIGHT: u16 = 1;

/// Page pixels per terminal row; each cell shows two stacked pixels
pub const PIXELS_PER_ROW: f64 = 2.0;

/// Page size in pixels for a terminal of `cols` x `rows`
pub fn page_size(cols: u16, rows: u16) -> (u32, u32) {
    let page_rows = rows.saturating_sub(STATUS_BAR_HEIGHT);
    (cols as u32, page_rows as u32 * PIXELS_PER_ROW as u32)
}

pub struct App {
    pub config: AppConfig,
    pub page: Page,
    pub animator: ScrollAnimator,
    pub theme: Theme,
    pub should_quit: bool,
    /// First key of a multi-key sequence
    pub pending_key: Option<char>,
    pub status_message: Option<String>,
    pub spinner_frame: usize,
}

impl App {
    /// Lay out the page for a terminal of `cols` x `rows`. Must be called inside a tokio runtime.
    pub fn new(config: AppConfig, source: Arc<dyn FrameSource>, cols: u16, rows: u16) -> Result<Self> {
        let (width, height) = page_size(cols, rows);
        let page = Page::from_config(&config, source, width, height)?;
        let animator = ScrollAnimator::new(config.ui.scroll.clone());
        let theme = load_theme(&config.ui.theme);

        Ok(Self {
            config,
            page,
            animator,
            theme,
            should_quit: false,
            pending_key: None,
            status_message: None,
            spinner_frame: 0,
        })
    }

    fn viewport_height(&self) -> f64 {
        self.page.viewport().vh()
    }

    /// Distance of one scroll step
    fn line_step(&self) -> f64 {
        self.config.ui.scroll.scroll_lines.max(1) as f64 * PIXELS_PER_ROW
    }

    pub fn handle_action(&mut self, action: Action) {
        if action != Action::PendingG {
            self.pending_key = None;
        }

        let max = self.page.max_scroll();
        let vh = self.viewport_height();
        match action {
            Action::Quit => self.should_quit = true,
            Action::ScrollDown => self.animator.scroll_by(self.line_step(), max),
            Action::ScrollUp => self.animator.scroll_by(-self.line_step(), max),
            Action::ScrollHalfPageDown => self.animator.scroll_by((vh / 2.0).max(1.0), max),
            Action::ScrollHalfPageUp => self.animator.scroll_by(-(vh / 2.0).max(1.0), max),
            Action::ScrollPageDown => self.animator.scroll_by(vh.max(1.0), max),
            Action::ScrollPageUp => self.animator.scroll_by(-vh.max(1.0), max),
            Action::JumpToTop => self.animator.scroll_to(0.0, max),
            Action::JumpToBottom => self.animator.scroll_to(max, max),
            Action::NextSection => self.next_section(),
            Action::PrevSection => self.prev_section(),
            Action::PendingG => self.pending_key = Some('g'),
            Action::None => {}
        }

        // instant scrolls land now; smooth ones advance on the next frame
        if !self.animator.needs_update() {
            self.page.scroll_to(self.animator.current());
        }
    }

    fn next_section(&mut self) {
        let target = self.animator.target();
        let next = self
            .page
            .sections()
            .iter()
            .map(|s| s.bounds().top)
            .find(|top| *top > target + f64::EPSILON);
        let max = self.page.max_scroll();
        self.animator.scroll_to(next.unwrap_or(max), max);
    }

    fn prev_section(&mut self) {
        let target = self.animator.target();
        let prev = self
            .page
            .sections()
            .iter()
            .map(|s| s.bounds().top)
            .filter(|top| *top < target - f64::EPSILON)
            .last();
        self.animator.scroll_to(prev.unwrap_or(0.0), self.page.max_scroll());
    }

    /// Advance smooth scrolling and push the offset into the page
    pub fn update_scroll_animation(&mut self) {
        if self.animator.needs_update() {
            let y = self.animator.update(self.page.max_scroll());
            self.page.scroll_to(y);
        }
    }

    pub fn has_active_animation(&self) -> bool {
        self.animator.needs_update()
    }

    pub fn is_loading(&self) -> bool {
        self.page.players().any(|p| p.is_loading())
    }

    /// Run players and housekeeping. Returns true if a redraw is needed.
    pub fn tick(&mut self) -> bool {
        let mut changed = self.page.tick();
        if self.is_loading() {
            self.spinner_frame = self.spinner_frame.wrapping_add(1);
            changed = true;
        }
        changed
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        let (width, height) = page_size(cols, rows);
        self.animator.cancel();
        self.page.resize(width, height);
        self.animator.set_position(self.page.viewport().scroll_y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrollreel_core::frames::FsFrameSource;
    use scrollreel_core::scroll::PinState;

    fn app() -> App {
        let mut config = AppConfig::default();
        config.ui.scroll.smooth_enabled = false;
        let source = Arc::new(FsFrameSource::new("/nonexistent/scrollreel-test"));
        App::new(config, source, 80, 25).unwrap()
    }

    #[test]
    fn test_page_size() {
        assert_eq!(page_size(80, 25), (80, 48));
        assert_eq!(page_size(10, 0), (10, 0));
    }

    #[tokio::test]
    async fn test_instant_scrolling() {
        let mut app = app();
        assert_eq!(app.page.viewport().vh(), 48.0);

        app.handle_action(Action::ScrollDown);
        assert_eq!(app.page.viewport().scroll_y, 2.0);

        app.handle_action(Action::ScrollHalfPageDown);
        assert_eq!(app.page.viewport().scroll_y, 26.0);

        app.handle_action(Action::JumpToBottom);
        assert_eq!(app.page.viewport().scroll_y, app.page.max_scroll());

        app.handle_action(Action::ScrollPageDown);
        assert_eq!(app.page.viewport().scroll_y, app.page.max_scroll());

        app.handle_action(Action::JumpToTop);
        assert_eq!(app.page.viewport().scroll_y, 0.0);
    }

    #[tokio::test]
    async fn test_section_navigation() {
        let mut app = app();
        let tops: Vec<f64> = app.page.sections().iter().map(|s| s.bounds().top).collect();

        app.handle_action(Action::NextSection);
        assert_eq!(app.page.viewport().scroll_y, tops[1]);
        app.page.tick();
        let player = app.page.players().next().unwrap();
        assert_eq!(player.pin_state(), PinState::Pinned);
        assert_eq!(player.snapshot().frame, 0);

        app.handle_action(Action::ScrollDown);
        app.handle_action(Action::PrevSection);
        assert_eq!(app.page.viewport().scroll_y, tops[1]);
        app.handle_action(Action::PrevSection);
        assert_eq!(app.page.viewport().scroll_y, 0.0);
    }

    #[tokio::test]
    async fn test_pending_g() {
        let mut app = app();
        app.handle_action(Action::JumpToBottom);
        app.handle_action(Action::PendingG);
        assert_eq!(app.pending_key, Some('g'));
        app.handle_action(Action::JumpToTop);
        assert_eq!(app.pending_key, None);
        assert_eq!(app.page.viewport().scroll_y, 0.0);
    }

    #[tokio::test]
    async fn test_resize_keeps_animator_in_sync() {
        let mut app = app();
        app.handle_action(Action::JumpToBottom);
        app.resize(80, 13);
        assert_eq!(app.page.viewport().vh(), 24.0);
        assert_eq!(app.animator.current(), app.page.viewport().scroll_y);
        assert!(app.page.viewport().scroll_y <= app.page.max_scroll());
    }

    #[tokio::test]
    async fn test_quit() {
        let mut app = app();
        app.handle_action(Action::Quit);
        assert!(app.should_quit);
    }
}

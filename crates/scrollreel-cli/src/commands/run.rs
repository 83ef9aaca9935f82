use std::io::{self, Stdout};
use std::sync::Arc;

use anyhow::Result;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};

use scrollreel_core::config::SourceKind;
use scrollreel_core::frames::{source_from_config, FrameSource};
use scrollreel_core::AppConfig;
use scrollreel_tui::{
    app::{App, STATUS_BAR_HEIGHT},
    event::{AppEvent, EventHandler},
    input::handle_key_event,
    keymap::Keymap,
    widgets::{PageWidget, StatusBarWidget},
};

use super::verify::check_assets;

type Backend = CrosstermBackend<Stdout>;

pub async fn run(config: Arc<AppConfig>) -> Result<()> {
    if config.loader.source == SourceKind::Filesystem {
        check_assets(&config)?;
    }
    let source = source_from_config(&config)?;
    let keymap = Keymap::from_config(&config.keymap);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, SetTitle("scrollreel"))?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let result = run_app(&mut terminal, &config, source, &keymap).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<Backend>,
    config: &AppConfig,
    source: Arc<dyn FrameSource>,
    keymap: &Keymap,
) -> Result<()> {
    let size = terminal.size()?;
    let mut app = App::new(config.clone(), source, size.width, size.height)?;
    let event_handler = EventHandler::with_animation_fps(config.ui.tick_rate_ms, config.ui.scroll.animation_fps);

    tracing::info!(
        sections = app.page.sections().len(),
        cols = size.width,
        rows = size.height,
        "Terminal page opened"
    );

    // decided at the end of each iteration for the next poll
    let mut needs_fast_update = false;

    loop {
        app.update_scroll_animation();
        app.tick();

        terminal.draw(|frame| {
            let layout = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(1), Constraint::Length(STATUS_BAR_HEIGHT)])
                .split(frame.area());

            PageWidget::render(frame, layout[0], &app);
            StatusBarWidget::render(frame, layout[1], &app);
        })?;

        let event = if needs_fast_update {
            event_handler.next_animation()?
        } else {
            event_handler.next()?
        };
        if let Some(event) = event {
            match event {
                AppEvent::Key(key) => {
                    let action = handle_key_event(key, &app, keymap);
                    app.handle_action(action);
                }
                AppEvent::Resize(cols, rows) => app.resize(cols, rows),
                AppEvent::Tick => {}
            }
        }

        // frames land over the loader channel, so keep polling fast while loading
        needs_fast_update = app.has_active_animation() || app.is_loading();

        if app.should_quit {
            break;
        }
    }

    tracing::info!("Terminal page closed");
    Ok(())
}

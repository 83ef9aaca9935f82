use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};

/// Polls the terminal for input
pub struct EventHandler {
    tick_rate: Duration,
    animation_rate: Duration,
}

impl EventHandler {
    pub fn new(tick_rate_ms: u64) -> Self {
        Self::with_animation_fps(tick_rate_ms, 60)
    }

    /// Tick rate while idle plus a faster poll rate while scrolling animates
    pub fn with_animation_fps(tick_rate_ms: u64, fps: u32) -> Self {
        let fps = fps.max(1) as u64;
        Self {
            tick_rate: Duration::from_millis(tick_rate_ms.max(1)),
            animation_rate: Duration::from_millis((1000 / fps).max(1)),
        }
    }

    /// Wait up to the idle tick rate for the next event
    pub fn next(&self) -> Result<Option<AppEvent>> {
        self.poll(self.tick_rate)
    }

    /// Wait up to one animation frame for the next event
    pub fn next_animation(&self) -> Result<Option<AppEvent>> {
        self.poll(self.animation_rate)
    }

    fn poll(&self, timeout: Duration) -> Result<Option<AppEvent>> {
        if event::poll(timeout)? {
            match event::read()? {
                // release and repeat events arrive on some terminals
                Event::Key(key) if key.kind == KeyEventKind::Press => Ok(Some(AppEvent::Key(key))),
                Event::Resize(w, h) => Ok(Some(AppEvent::Resize(w, h))),
                _ => Ok(None),
            }
        } else {
            Ok(Some(AppEvent::Tick))
        }
    }
}

#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    /// Columns, rows
    Resize(u16, u16),
    Tick,
}

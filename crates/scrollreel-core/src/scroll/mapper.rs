use serde::Serialize;

/// Pin lifecycle of a sequence section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PinState {
    /// Section top is still below the viewport top
    #[default]
    Before,
    /// Section holds the viewport; scroll drives the sequence
    Pinned,
    /// Pin range consumed; section scrolls away
    After,
}

impl PinState {
    pub fn label(&self) -> &'static str {
        match self {
            PinState::Before => "before",
            PinState::Pinned => "pinned",
            PinState::After => "after",
        }
    }
}

/// Scroll range over which a section stays pinned, in document pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PinGeometry {
    start: f64,
    distance: f64,
}

impl PinGeometry {
    /// Pin begins when the section top reaches the viewport top and lasts
    /// `pin_distance` viewport heights
    pub fn new(section_top: f64, viewport_height: f64, pin_distance: f64) -> Self {
        Self {
            start: section_top,
            distance: (pin_distance * viewport_height).max(0.0),
        }
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn end(&self) -> f64 {
        self.start + self.distance
    }

    /// Normalized progress through the pin, clamped to [0, 1]
    pub fn progress_at(&self, scroll_y: f64) -> f64 {
        if self.distance <= 0.0 {
            return if scroll_y >= self.start { 1.0 } else { 0.0 };
        }
        ((scroll_y - self.start) / self.distance).clamp(0.0, 1.0)
    }

    pub fn state_at(&self, scroll_y: f64) -> PinState {
        if scroll_y < self.start {
            PinState::Before
        } else if scroll_y <= self.end() {
            PinState::Pinned
        } else {
            PinState::After
        }
    }

    /// Scroll offset that yields `progress`
    pub fn scroll_for(&self, progress: f64) -> f64 {
        self.start + progress.clamp(0.0, 1.0) * self.distance
    }
}

/// Immutable view of playback, recomputed from progress on every update
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PlaybackSnapshot {
    pub progress: f64,
    /// Fractional frame position in `[0, frame_count - 1]`
    pub cursor: f64,
    /// Rounded cursor; the frame to draw
    pub frame: u32,
    pub state: PinState,
}

impl PlaybackSnapshot {
    pub fn at(progress: f64, frame_count: u32, state: PinState) -> Self {
        let progress = progress.clamp(0.0, 1.0);
        Self {
            progress,
            cursor: cursor_for(progress, frame_count),
            frame: frame_for(progress, frame_count),
            state,
        }
    }
}

pub fn cursor_for(progress: f64, frame_count: u32) -> f64 {
    let last = frame_count.saturating_sub(1) as f64;
    progress.clamp(0.0, 1.0) * last
}

/// `round(progress * (frame_count - 1))`, always a valid index
pub fn frame_for(progress: f64, frame_count: u32) -> u32 {
    let last = frame_count.saturating_sub(1);
    (cursor_for(progress, frame_count).round() as u32).min(last)
}

/// Maps a section's scroll position to a frame and tracks its pin lifecycle
#[derive(Debug, Clone)]
pub struct ScrollMapper {
    frame_count: u32,
    pin_distance: f64,
    geometry: PinGeometry,
    /// False until laid out against a non-empty viewport
    laid_out: bool,
    snapshot: PlaybackSnapshot,
}

impl ScrollMapper {
    pub fn new(frame_count: u32, pin_distance: f64, section_top: f64, viewport_height: f64) -> Self {
        Self {
            frame_count,
            pin_distance,
            geometry: PinGeometry::new(section_top, viewport_height, pin_distance),
            laid_out: viewport_height > 0.0,
            snapshot: PlaybackSnapshot::at(0.0, frame_count, PinState::Before),
        }
    }

    pub fn geometry(&self) -> PinGeometry {
        self.geometry
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.snapshot
    }

    pub fn state(&self) -> PinState {
        self.snapshot.state
    }

    /// Recompute playback for a page offset. Returns the pin transition, if any.
    /// Without a usable layout the last snapshot is kept.
    pub fn update(&mut self, scroll_y: f64) -> Option<(PinState, PinState)> {
        if !self.laid_out {
            return None;
        }
        let previous = self.snapshot.state;
        let state = self.geometry.state_at(scroll_y);
        self.snapshot = PlaybackSnapshot::at(self.geometry.progress_at(scroll_y), self.frame_count, state);

        if previous != state {
            tracing::debug!(
                from = previous.label(),
                to = state.label(),
                scroll_y,
                progress = self.snapshot.progress,
                "Pin state changed"
            );
            Some((previous, state))
        } else {
            None
        }
    }

    /// Recompute the pin range for a new layout
    ///
    /// While pinned, progress is kept and the scroll offset that reproduces it
    /// under the new geometry is returned so the host can re-anchor.
    /// A zero-height viewport leaves the geometry and snapshot untouched.
    pub fn relayout(&mut self, section_top: f64, viewport_height: f64) -> Option<f64> {
        if viewport_height <= 0.0 {
            return None;
        }
        self.geometry = PinGeometry::new(section_top, viewport_height, self.pin_distance);
        self.laid_out = true;
        match self.snapshot.state {
            PinState::Pinned => Some(self.geometry.scroll_for(self.snapshot.progress)),
            _ => None,
        }
    }

    /// Where the section's content sits relative to the viewport top
    pub fn section_offset(&self, scroll_y: f64) -> f64 {
        match self.geometry.state_at(scroll_y) {
            PinState::Before => self.geometry.start() - scroll_y,
            PinState::Pinned => 0.0,
            PinState::After => self.geometry.end() - scroll_y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VH: f64 = 800.0;

    #[test]
    fn test_half_pin_hits_frame_sixty() {
        let mut mapper = ScrollMapper::new(120, 1.5, 1000.0, VH);
        mapper.update(1000.0 + 0.75 * VH);

        let snap = mapper.snapshot();
        assert_eq!(snap.state, PinState::Pinned);
        assert!((snap.progress - 0.5).abs() < 1e-12);
        assert_eq!(snap.frame, 60);
    }

    #[test]
    fn test_endpoints_and_monotonic() {
        assert_eq!(frame_for(0.0, 120), 0);
        assert_eq!(frame_for(1.0, 120), 119);

        let mut prev = 0;
        for i in 0..=1000 {
            let frame = frame_for(i as f64 / 1000.0, 120);
            assert!(frame >= prev);
            assert!(frame < 120);
            prev = frame;
        }
    }

    #[test]
    fn test_single_frame_never_advances() {
        let mut mapper = ScrollMapper::new(1, 1.5, 0.0, VH);
        for y in [0.0, 100.0, 600.0, 1200.0, 5000.0, 300.0] {
            mapper.update(y);
            assert_eq!(mapper.snapshot().frame, 0);
            assert_eq!(mapper.snapshot().cursor, 0.0);
        }
        // the pin lifecycle still runs
        mapper.update(-10.0);
        assert_eq!(mapper.state(), PinState::Before);
        mapper.update(10.0);
        assert_eq!(mapper.state(), PinState::Pinned);
        mapper.update(1201.0);
        assert_eq!(mapper.state(), PinState::After);
    }

    #[test]
    fn test_path_independence() {
        let target = 0.37 * 1.5 * VH;
        let mut direct = ScrollMapper::new(120, 1.5, 0.0, VH);
        direct.update(target);

        let mut wandering = ScrollMapper::new(120, 1.5, 0.0, VH);
        let mut y = 0.0;
        for delta in [300.0, -120.0, 540.0, -700.0, 13.0, 900.0, -400.0] {
            y += delta;
            wandering.update(y);
        }
        wandering.update(target);

        assert_eq!(direct.snapshot(), wandering.snapshot());
    }

    #[test]
    fn test_clamped_outside_pin() {
        let mut mapper = ScrollMapper::new(10, 1.0, 500.0, VH);
        assert_eq!(mapper.update(0.0), None);
        assert_eq!(mapper.snapshot().frame, 0);
        assert_eq!(mapper.section_offset(100.0), 400.0);

        assert_eq!(mapper.update(600.0), Some((PinState::Before, PinState::Pinned)));
        assert_eq!(mapper.section_offset(600.0), 0.0);

        assert_eq!(mapper.update(5000.0), Some((PinState::Pinned, PinState::After)));
        assert_eq!(mapper.snapshot().frame, 9);
        assert_eq!(mapper.section_offset(1400.0), -100.0);
    }

    #[test]
    fn test_relayout_keeps_progress_when_pinned() {
        let mut mapper = ScrollMapper::new(120, 1.5, 800.0, VH);
        mapper.update(800.0 + 0.6 * 1.5 * VH);
        let before = mapper.snapshot();

        // viewport shrinks to 600px; section now starts at 600
        let anchor = mapper.relayout(600.0, 600.0).unwrap();
        assert!((anchor - (600.0 + 0.6 * 1.5 * 600.0)).abs() < 1e-9);
        assert_eq!(mapper.snapshot(), before);

        mapper.update(anchor);
        assert_eq!(mapper.snapshot().frame, before.frame);
        assert!((mapper.snapshot().progress - before.progress).abs() < 1e-9);
    }

    #[test]
    fn test_relayout_before_pin_has_no_anchor() {
        let mut mapper = ScrollMapper::new(12, 1.0, 800.0, VH);
        mapper.update(0.0);
        assert_eq!(mapper.relayout(400.0, 400.0), None);
    }

    #[test]
    fn test_zero_height_viewport_keeps_snapshot() {
        let mut mapper = ScrollMapper::new(120, 1.5, 800.0, VH);
        mapper.update(800.0 + 0.3 * 1.5 * VH);
        let before = mapper.snapshot();

        assert_eq!(mapper.relayout(0.0, 0.0), None);
        assert_eq!(mapper.geometry().distance(), 1.5 * VH);
        mapper.update(0.0);
        assert_eq!(mapper.snapshot(), before);
    }

    #[test]
    fn test_mapper_waits_for_first_layout() {
        let mut mapper = ScrollMapper::new(120, 1.5, 0.0, 0.0);
        assert_eq!(mapper.update(0.0), None);
        assert_eq!(mapper.state(), PinState::Before);
        assert_eq!(mapper.snapshot().frame, 0);

        assert_eq!(mapper.relayout(0.0, VH), None);
        mapper.update(0.75 * VH);
        assert_eq!(mapper.snapshot().frame, 60);
    }

    #[test]
    fn test_zero_distance_pin() {
        let geometry = PinGeometry::new(100.0, VH, 0.0);
        assert_eq!(geometry.progress_at(99.0), 0.0);
        assert_eq!(geometry.progress_at(100.0), 1.0);
        assert_eq!(geometry.state_at(101.0), PinState::After);
    }
}

use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;

use crate::config::AppConfig;
use crate::frames::{FrameLoadResult, FrameSource, FrameStore, LoadHandle, LoadPolicy, LoadProgress, Loader};
use crate::gate::VisibilityGate;
use crate::geometry::{SectionBounds, ViewportSignal};
use crate::render::{DrawOutcome, Renderer, Surface};
use crate::scroll::{CaptionStyle, OverlayChoreographer, PinState, PlaybackSnapshot, ScrollMapper};
use crate::sequence::{Presentation, SequenceDescriptor};
use crate::viewport::{ViewportBus, ViewportSubscription};

/// Collaborators shared by every player on a page
#[derive(Clone)]
pub struct PlayerContext {
    pub loader: Loader,
    /// Lazy-load proximity in viewport heights
    pub lazy_margin: f64,
    pub overlay: OverlayChoreographer,
    pub renderer: Renderer,
}

impl PlayerContext {
    pub fn new(source: Arc<dyn FrameSource>) -> Self {
        Self::from_config(&AppConfig::default(), source)
    }

    pub fn from_config(config: &AppConfig, source: Arc<dyn FrameSource>) -> Self {
        Self {
            loader: Loader::new(source, LoadPolicy::from_config(&config.loader)),
            lazy_margin: config.loader.lazy_margin,
            overlay: OverlayChoreographer::from_config(&config.overlay),
            renderer: Renderer::default(),
        }
    }
}

/// One scroll-driven sequence section
///
/// All state is mutated from the owner's loop through [`SequencePlayer::tick`];
/// frames arrive from spawned fetch tasks over a channel. Must be mounted inside a
/// tokio runtime.
pub struct SequencePlayer {
    descriptor: Arc<SequenceDescriptor>,
    presentation: Presentation,
    bounds: SectionBounds,
    gate: VisibilityGate,
    loader: Loader,
    load: Option<LoadHandle>,
    store: FrameStore,
    mapper: ScrollMapper,
    renderer: Renderer,
    surface: Surface,
    overlay: OverlayChoreographer,
    subscription: Option<ViewportSubscription>,
    progress_tx: watch::Sender<LoadProgress>,
    displayed: Option<u32>,
}

impl SequencePlayer {
    pub fn mount(
        descriptor: SequenceDescriptor,
        presentation: Presentation,
        bounds: SectionBounds,
        bus: &ViewportBus,
        ctx: &PlayerContext,
    ) -> Self {
        let subscription = bus.subscribe();
        let viewport = subscription.last();
        let store = FrameStore::new(descriptor.frame_count());
        let (progress_tx, _) = watch::channel(store.progress());

        let mut player = Self {
            mapper: ScrollMapper::new(
                descriptor.frame_count(),
                descriptor.pin_distance(),
                bounds.top,
                viewport.vh(),
            ),
            gate: VisibilityGate::new(descriptor.lazy(), ctx.lazy_margin),
            descriptor: Arc::new(descriptor),
            presentation,
            bounds,
            loader: ctx.loader.clone(),
            load: None,
            store,
            renderer: ctx.renderer,
            surface: Surface::new(viewport.width, viewport.height),
            overlay: ctx.overlay,
            subscription: Some(subscription),
            progress_tx,
            displayed: None,
        };

        tracing::debug!(
            sequence = %player.descriptor.name(),
            frames = player.descriptor.frame_count(),
            lazy = player.descriptor.lazy(),
            top = bounds.top,
            "Mounted sequence player"
        );

        player.mapper.update(viewport.scroll_y);
        player.poll_gate(&viewport);
        player
    }

    /// Process pending viewport signals and loaded frames, then draw if needed.
    /// Returns true when the surface or caption changed.
    pub fn tick(&mut self) -> bool {
        let Some(subscription) = self.subscription.as_mut() else {
            return false;
        };

        let mut resized = false;
        let mut changed = false;
        let change = subscription.poll();
        let viewport = subscription.last();

        if let Some(change) = change {
            if change.resized {
                resized = self.surface.resize(change.signal.width, change.signal.height);
            }
            let before = self.mapper.snapshot();
            self.mapper.update(change.signal.scroll_y);
            changed |= resized || self.mapper.snapshot() != before;
        }

        self.poll_gate(&viewport);

        if let Some(load) = self.load.as_mut() {
            if load.drain_into(&mut self.store) > 0 {
                self.publish_progress();
                changed = true;
            }
        }

        changed | self.redraw(resized)
    }

    /// Draw the current frame if it differs from what is on the surface.
    /// After a resize the surface is blank, so the last good frame stands in.
    fn redraw(&mut self, resized: bool) -> bool {
        let target = self.mapper.snapshot().frame;
        if !resized && self.displayed == Some(target) {
            return false;
        }

        match self.renderer.draw(&self.store, target, &mut self.surface) {
            DrawOutcome::Drawn => {
                self.displayed = Some(target);
                true
            }
            DrawOutcome::FrameMissing if resized => match self.displayed {
                Some(previous) => {
                    self.renderer.draw(&self.store, previous, &mut self.surface) == DrawOutcome::Drawn
                }
                None => false,
            },
            DrawOutcome::FrameMissing | DrawOutcome::EmptySurface => false,
        }
    }

    fn poll_gate(&mut self, viewport: &ViewportSignal) {
        if self.gate.poll(&self.bounds, viewport) {
            self.start_load();
        }
    }

    fn start_load(&mut self) {
        if self.load.is_some() || self.store.is_disposed() {
            return;
        }
        for index in 0..self.descriptor.frame_count() {
            self.store.mark_loading(index);
        }
        self.load = Some(self.loader.load(self.descriptor.clone()));
    }

    /// Start loading now, bypassing the visibility gate. No-op if already started.
    pub fn activate(&mut self) {
        if self.gate.trigger() {
            self.start_load();
        }
    }

    /// Await loaded frames until `done` holds or the load ends
    async fn drive_until(&mut self, done: impl Fn(&FrameStore) -> bool) {
        while !done(&self.store) {
            let Some(load) = self.load.as_mut() else {
                return;
            };
            match load.next().await {
                Some(FrameLoadResult::Success { index, frame }) => {
                    self.store.mark_ready(index, frame);
                }
                Some(FrameLoadResult::Failure { index, error }) => {
                    self.store.mark_failed(index, error);
                }
                None => break,
            }
            self.publish_progress();
        }
        self.redraw(false);
    }

    /// Load every frame, for headless use
    pub async fn settle(&mut self) {
        self.activate();
        self.drive_until(FrameStore::is_fully_loaded).await;
    }

    /// Load until frame 0 is drawable; false if it failed or the player is unmounted
    pub async fn wait_first_frame(&mut self) -> bool {
        self.activate();
        self.drive_until(|store| store.is_ready(0) || store.slot(0).map_or(true, |s| s.is_settled()))
            .await;
        self.store.is_ready(0)
    }

    /// Resolves once frame 0 is drawable, or with false if the player unmounts first.
    /// Progress only advances while the owner keeps ticking.
    pub fn first_frame_ready(&self) -> impl Future<Output = bool> + Send + 'static {
        let mut rx = self.progress_tx.subscribe();
        async move { rx.wait_for(|p| p.first_frame).await.is_ok() }
    }

    pub fn watch_progress(&self) -> watch::Receiver<LoadProgress> {
        self.progress_tx.subscribe()
    }

    fn publish_progress(&self) {
        let progress = self.store.progress();
        self.progress_tx.send_if_modified(|current| {
            if *current == progress {
                false
            } else {
                *current = progress;
                true
            }
        });
        if progress.is_complete() && progress.failed > 0 {
            tracing::debug!(
                sequence = %self.descriptor.name(),
                failed = progress.failed,
                "Sequence settled with failed frames"
            );
        }
    }

    /// Apply a new layout. While pinned, returns the scroll offset that keeps progress.
    pub fn relayout(&mut self, bounds: SectionBounds, viewport_height: f64) -> Option<f64> {
        self.bounds = bounds;
        self.mapper.relayout(bounds.top, viewport_height)
    }

    /// Release frames, stop loading and detach from the viewport
    pub fn unmount(&mut self) {
        if let Some(mut load) = self.load.take() {
            load.cancel();
        }
        self.subscription = None;
        self.store.dispose();
        self.displayed = None;
        // closing the old sender resolves pending first_frame_ready() futures with false
        let (progress_tx, _) = watch::channel(self.store.progress());
        self.progress_tx = progress_tx;
        tracing::debug!(sequence = %self.descriptor.name(), "Unmounted sequence player");
    }

    pub fn is_mounted(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn descriptor(&self) -> &SequenceDescriptor {
        &self.descriptor
    }

    pub fn presentation(&self) -> &Presentation {
        &self.presentation
    }

    pub fn bounds(&self) -> SectionBounds {
        self.bounds
    }

    pub fn store(&self) -> &FrameStore {
        &self.store
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.mapper.snapshot()
    }

    pub fn pin_state(&self) -> PinState {
        self.mapper.state()
    }

    pub fn caption(&self) -> CaptionStyle {
        self.overlay.style_at(self.mapper.snapshot().progress)
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Frame currently on the surface
    pub fn displayed_frame(&self) -> Option<u32> {
        self.displayed
    }

    pub fn load_progress(&self) -> LoadProgress {
        self.store.progress()
    }

    pub fn is_loading(&self) -> bool {
        self.load.is_some() && !self.store.is_fully_loaded()
    }

    pub fn has_started_loading(&self) -> bool {
        self.load.is_some()
    }

    /// Top of the section's content relative to the viewport top
    pub fn section_offset(&self) -> f64 {
        let scroll_y = self
            .subscription
            .as_ref()
            .map(|s| s.last().scroll_y)
            .unwrap_or_default();
        self.mapper.section_offset(scroll_y)
    }
}

impl Drop for SequencePlayer {
    fn drop(&mut self) {
        if self.is_mounted() {
            self.unmount();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frames::testing::MemorySource;
    use crate::sequence::FrameLayout;

    const VH: u32 = 800;

    fn descriptor(count: u32, lazy: bool) -> SequenceDescriptor {
        SequenceDescriptor::new("living", count, 1.5, lazy, FrameLayout::default()).unwrap()
    }

    fn context(source: Arc<MemorySource>) -> PlayerContext {
        PlayerContext::new(source)
    }

    async fn pump(player: &mut SequencePlayer, rounds: usize) {
        for _ in 0..rounds {
            tokio::task::yield_now().await;
            player.tick();
        }
    }

    async fn pump_until(player: &mut SequencePlayer, done: impl Fn(&SequencePlayer) -> bool) {
        for _ in 0..1000 {
            if done(player) {
                return;
            }
            tokio::task::yield_now().await;
            player.tick();
        }
        panic!("player did not reach the expected state");
    }

    #[tokio::test]
    async fn test_scroll_to_middle_of_pin() {
        let bus = ViewportBus::new(ViewportSignal::new(0.0, 40, VH));
        let ctx = context(Arc::new(MemorySource::new()));
        let mut player = SequencePlayer::mount(
            descriptor(120, false),
            Presentation::default(),
            SectionBounds::new(0.0, 2.5 * VH as f64),
            &bus,
            &ctx,
        );
        player.settle().await;

        bus.scroll_to(0.75 * VH as f64);
        player.tick();

        let snap = player.snapshot();
        assert_eq!(snap.state, PinState::Pinned);
        assert!((snap.progress - 0.5).abs() < 1e-12);
        assert_eq!(snap.frame, 60);
        assert_eq!(player.displayed_frame(), Some(60));
        // red channel of the memory frames encodes the index
        assert_eq!(player.surface().pixel(0, 0).unwrap()[0], 60);
    }

    #[tokio::test]
    async fn test_empty_viewport_keeps_cursor_and_frame() {
        let bus = ViewportBus::new(ViewportSignal::new(0.0, 40, VH));
        let ctx = context(Arc::new(MemorySource::new()));
        let bounds = SectionBounds::new(0.0, 2.5 * VH as f64);
        let mut player =
            SequencePlayer::mount(descriptor(120, false), Presentation::default(), bounds, &bus, &ctx);
        player.settle().await;

        bus.scroll_to(360.0);
        player.tick();
        let before = player.snapshot();
        assert_eq!(before.frame, 36);
        assert_eq!(player.displayed_frame(), Some(36));

        bus.publish(ViewportSignal::new(360.0, 40, 0));
        assert_eq!(player.relayout(bounds, 0.0), None);
        player.tick();
        assert_eq!(player.snapshot(), before);
        assert_eq!(player.displayed_frame(), Some(36));
        assert_eq!(player.surface().size(), (40, 0));

        bus.publish(ViewportSignal::new(360.0, 40, VH));
        let anchor = player.relayout(bounds, VH as f64).unwrap();
        assert!((anchor - 360.0).abs() < 1e-9);
        assert!(player.tick());
        assert_eq!(player.snapshot().frame, 36);
        assert_eq!(player.displayed_frame(), Some(36));
        assert_eq!(player.surface().pixel(0, 0).unwrap()[0], 36);
    }

    #[tokio::test]
    async fn test_lazy_player_waits_for_margin() {
        let bus = ViewportBus::new(ViewportSignal::new(0.0, 40, VH));
        let source = Arc::new(MemorySource::new());
        let ctx = context(source.clone());
        let mut player = SequencePlayer::mount(
            descriptor(10, true),
            Presentation::default(),
            SectionBounds::new(5000.0, 2000.0),
            &bus,
            &ctx,
        );

        bus.scroll_to(1000.0);
        pump(&mut player, 5).await;
        assert!(!player.has_started_loading());
        assert_eq!(player.store().ready_count(), 0);
        assert_eq!(source.completed(), 0);

        // bottom 4601 + margin 400 crosses the top edge
        bus.scroll_to(3801.0);
        player.tick();
        assert!(player.has_started_loading());
        pump_until(&mut player, |p| p.store().is_fully_loaded()).await;

        bus.scroll_to(0.0);
        pump(&mut player, 3).await;
        bus.scroll_to(4000.0);
        pump(&mut player, 3).await;
        assert_eq!(source.completed(), 10);
    }

    #[tokio::test]
    async fn test_single_frame_sequence() {
        let bus = ViewportBus::new(ViewportSignal::new(0.0, 40, VH));
        let ctx = context(Arc::new(MemorySource::new()));
        let mut player = SequencePlayer::mount(
            descriptor(1, false),
            Presentation::default(),
            SectionBounds::new(0.0, 2.5 * VH as f64),
            &bus,
            &ctx,
        );
        assert!(player.wait_first_frame().await);

        for y in [100.0, 600.0, 1199.0, 3000.0] {
            bus.scroll_to(y);
            player.tick();
            assert_eq!(player.snapshot().frame, 0);
            assert_eq!(player.displayed_frame(), Some(0));
        }
        assert_eq!(player.pin_state(), PinState::After);
    }

    #[tokio::test]
    async fn test_missing_frame_holds_previous() {
        let bus = ViewportBus::new(ViewportSignal::new(0.0, 40, VH));
        let ctx = context(Arc::new(MemorySource::new().failing([5])));
        let mut player = SequencePlayer::mount(
            descriptor(12, false),
            Presentation::default(),
            SectionBounds::new(0.0, 2.5 * VH as f64),
            &bus,
            &ctx,
        );
        player.settle().await;
        assert_eq!(player.load_progress().failed, 1);

        let per_frame = 1.5 * VH as f64 / 11.0;
        bus.scroll_to(4.0 * per_frame);
        player.tick();
        assert_eq!(player.displayed_frame(), Some(4));

        bus.scroll_to(5.0 * per_frame);
        player.tick();
        assert_eq!(player.snapshot().frame, 5);
        assert_eq!(player.displayed_frame(), Some(4));
        assert_eq!(player.surface().pixel(0, 0).unwrap()[0], 4);

        bus.scroll_to(6.0 * per_frame);
        player.tick();
        assert_eq!(player.displayed_frame(), Some(6));
    }

    #[tokio::test]
    async fn test_resize_keeps_cursor_and_redraws() {
        let bus = ViewportBus::new(ViewportSignal::new(0.0, 40, VH));
        let ctx = context(Arc::new(MemorySource::new()));
        let mut player = SequencePlayer::mount(
            descriptor(120, false),
            Presentation::default(),
            SectionBounds::new(0.0, 2.5 * VH as f64),
            &bus,
            &ctx,
        );
        player.settle().await;
        bus.scroll_to(300.0);
        player.tick();
        let before = player.snapshot();

        bus.resize(64, VH);
        assert!(player.tick());
        assert_eq!(player.snapshot(), before);
        assert_eq!(player.surface().size(), (64, VH));
        assert_eq!(player.displayed_frame(), Some(before.frame));
        assert_eq!(player.surface().pixel(63, 10).unwrap()[0], before.frame as u8);
    }

    #[tokio::test]
    async fn test_unmount_mid_load_ignores_late_frames() {
        let bus = ViewportBus::new(ViewportSignal::new(0.0, 40, VH));
        let source = Arc::new(MemorySource::new().gated());
        let ctx = context(source.clone());
        let mut player = SequencePlayer::mount(
            descriptor(50, false),
            Presentation::default(),
            SectionBounds::new(0.0, 2.5 * VH as f64),
            &bus,
            &ctx,
        );
        let progress = player.watch_progress();
        let first_frame = player.first_frame_ready();

        source.release(1);
        pump_until(&mut player, |p| p.store().is_ready(0)).await;
        assert!(first_frame.await);

        player.unmount();
        assert_eq!(bus.subscriber_count(), 0);
        let settled = *progress.borrow();

        // late responses, including frame 42
        source.release(100);
        pump(&mut player, 10).await;

        assert!(player.store().is_disposed());
        assert!(player.store().get(42).is_none());
        assert_eq!(player.store().ready_count(), 0);
        assert_eq!(*progress.borrow(), settled);
        assert!(!player.tick());
    }

    #[tokio::test]
    async fn test_first_frame_signal_fails_on_drop() {
        let bus = ViewportBus::new(ViewportSignal::new(0.0, 40, VH));
        let source = Arc::new(MemorySource::new().gated());
        let ctx = context(source);
        let player = SequencePlayer::mount(
            descriptor(4, false),
            Presentation::default(),
            SectionBounds::new(0.0, 2.5 * VH as f64),
            &bus,
            &ctx,
        );
        let first_frame = player.first_frame_ready();
        drop(player);
        assert!(!first_frame.await);
    }

    #[tokio::test]
    async fn test_first_frame_signal_fails_on_unmount() {
        let bus = ViewportBus::new(ViewportSignal::new(0.0, 40, VH));
        let source = Arc::new(MemorySource::new().gated());
        let ctx = context(source);
        let mut player = SequencePlayer::mount(
            descriptor(4, false),
            Presentation::default(),
            SectionBounds::new(0.0, 2.5 * VH as f64),
            &bus,
            &ctx,
        );
        let first_frame = player.first_frame_ready();
        player.unmount();
        assert!(!first_frame.await);
        assert!(!player.is_mounted());
    }
}

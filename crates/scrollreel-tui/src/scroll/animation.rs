//! Eased scroll animation over page pixels.

use std::time::{Duration, Instant};

use super::config::ScrollConfigExt;
use super::timing::{is_complete, lerp, progress};
use super::{EasingType, EasingTypeExt, ScrollConfig};

#[derive(Debug, Clone)]
struct ActiveAnimation {
    start: Instant,
    from: f64,
    to: f64,
    duration: Duration,
    easing: EasingType,
}

/// Animates the page offset toward a target
///
/// Deltas arriving between two `update()` calls are summed and applied against
/// the current target, so held keys keep chaining without restarting from zero.
#[derive(Debug, Clone)]
pub struct ScrollAnimator {
    animation: Option<ActiveAnimation>,
    config: ScrollConfig,
    current: f64,
    pending_delta: f64,
}

impl Default for ScrollAnimator {
    fn default() -> Self {
        Self::new(ScrollConfig::default())
    }
}

impl ScrollAnimator {
    pub fn new(config: ScrollConfig) -> Self {
        Self {
            animation: None,
            config,
            current: 0.0,
            pending_delta: 0.0,
        }
    }

    pub fn config(&self) -> &ScrollConfig {
        &self.config
    }

    #[inline]
    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Animation running or delta queued; the host should poll at animation rate
    #[inline]
    pub fn needs_update(&self) -> bool {
        self.animation.is_some() || self.pending_delta != 0.0
    }

    /// Final offset once the running animation lands
    pub fn target(&self) -> f64 {
        self.animation.as_ref().map(|a| a.to).unwrap_or(self.current)
    }

    #[inline]
    pub fn current(&self) -> f64 {
        self.current
    }

    /// Jump without animating
    pub fn set_position(&mut self, position: f64) {
        self.animation = None;
        self.pending_delta = 0.0;
        self.current = position.max(0.0);
    }

    pub fn scroll_to(&mut self, target: f64, max_scroll: f64) {
        let target = target.clamp(0.0, max_scroll.max(0.0));
        self.pending_delta = 0.0;

        if !self.config.is_smooth() {
            self.current = target;
            self.animation = None;
            return;
        }
        if self.current == target {
            self.animation = None;
            return;
        }
        self.animation = Some(self.animation_to(target));
    }

    /// Positive is downward
    pub fn scroll_by(&mut self, delta: f64, max_scroll: f64) {
        if !self.config.is_smooth() {
            self.current = (self.current + delta).clamp(0.0, max_scroll.max(0.0));
            self.animation = None;
            return;
        }
        self.pending_delta += delta;
    }

    /// Advance the animation; returns the offset to show now
    pub fn update(&mut self, max_scroll: f64) -> f64 {
        let max_scroll = max_scroll.max(0.0);

        if self.pending_delta != 0.0 {
            let target = (self.target() + self.pending_delta).clamp(0.0, max_scroll);
            self.pending_delta = 0.0;
            if target != self.current {
                self.animation = Some(self.animation_to(target));
            }
        }

        if let Some(anim) = &self.animation {
            if is_complete(anim.start, anim.duration) {
                self.current = anim.to.min(max_scroll);
                self.animation = None;
            } else {
                let t = anim.easing.apply(progress(anim.start, anim.duration));
                self.current = lerp(anim.from, anim.to, t).clamp(0.0, max_scroll);
            }
        }

        self.current
    }

    pub fn cancel(&mut self) {
        self.animation = None;
        self.pending_delta = 0.0;
    }

    fn animation_to(&self, to: f64) -> ActiveAnimation {
        ActiveAnimation {
            start: Instant::now(),
            from: self.current,
            to,
            duration: self.config.animation_duration(),
            easing: self.config.easing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn smooth() -> ScrollAnimator {
        ScrollAnimator::new(ScrollConfig {
            smooth_enabled: true,
            animation_duration_ms: 10_000,
            ..Default::default()
        })
    }

    #[test]
    fn test_instant_scroll_when_disabled() {
        let mut animator = ScrollAnimator::new(ScrollConfig {
            smooth_enabled: false,
            ..Default::default()
        });

        animator.scroll_to(100.0, 200.0);
        assert_eq!(animator.current(), 100.0);
        assert!(!animator.is_animating());

        animator.scroll_by(500.0, 200.0);
        assert_eq!(animator.current(), 200.0);
        animator.scroll_by(-500.0, 200.0);
        assert_eq!(animator.current(), 0.0);
    }

    #[test]
    fn test_animation_starts() {
        let mut animator = smooth();
        animator.scroll_to(100.0, 200.0);
        assert!(animator.is_animating());
        assert_eq!(animator.target(), 100.0);
        assert!(animator.update(200.0) < 100.0);
    }

    #[test]
    fn test_scroll_by_batching() {
        let mut animator = smooth();
        animator.scroll_by(10.0, 200.0);
        animator.scroll_by(10.0, 200.0);
        animator.scroll_by(10.0, 200.0);
        assert!(animator.needs_update());

        animator.update(200.0);
        assert_eq!(animator.target(), 30.0);

        // chained on top of the running target
        animator.scroll_by(-5.0, 200.0);
        animator.update(200.0);
        assert_eq!(animator.target(), 25.0);
    }

    #[test]
    fn test_target_clamped() {
        let mut animator = smooth();
        animator.set_position(50.0);
        animator.scroll_to(300.0, 100.0);
        assert_eq!(animator.target(), 100.0);

        animator.cancel();
        animator.scroll_by(-1000.0, 100.0);
        animator.update(100.0);
        assert_eq!(animator.target(), 0.0);
    }

    #[test]
    fn test_zero_duration_lands_immediately() {
        let mut animator = ScrollAnimator::new(ScrollConfig {
            smooth_enabled: true,
            animation_duration_ms: 0,
            ..Default::default()
        });
        animator.scroll_to(42.0, 100.0);
        assert_eq!(animator.current(), 42.0);
        assert!(!animator.needs_update());
    }
}

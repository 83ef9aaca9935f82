use serde::Serialize;

use super::EasingTypeExt;
use crate::config::{EasingType, OverlayConfig};

/// Sub-range of progress over which a fade runs
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FadeRange {
    pub start: f64,
    pub end: f64,
}

impl FadeRange {
    pub fn new(start: f64, end: f64) -> Self {
        let start = start.clamp(0.0, 1.0);
        let end = end.clamp(start, 1.0);
        Self { start, end }
    }

    pub fn from_pair(pair: [f64; 2]) -> Self {
        Self::new(pair[0], pair[1])
    }

    /// 0 before the range, 1 after it, linear in between
    pub fn ramp(&self, progress: f64) -> f64 {
        if progress <= self.start {
            if progress >= self.end {
                1.0
            } else {
                0.0
            }
        } else if progress >= self.end {
            1.0
        } else {
            (progress - self.start) / (self.end - self.start)
        }
    }
}

/// Caption appearance at one progress value
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CaptionStyle {
    /// 0 transparent, 1 opaque
    pub opacity: f64,
    /// Vertical displacement in surface pixels; positive is downward
    pub offset: f64,
}

impl CaptionStyle {
    pub fn is_visible(&self) -> bool {
        self.opacity > 0.0
    }
}

/// Caption fade-in/fade-out driven by progress alone
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayChoreographer {
    fade_in: FadeRange,
    fade_out: FadeRange,
    rise: f64,
    easing: EasingType,
}

impl Default for OverlayChoreographer {
    fn default() -> Self {
        Self::from_config(&OverlayConfig::default())
    }
}

impl OverlayChoreographer {
    pub fn new(fade_in: FadeRange, fade_out: FadeRange, rise: f64, easing: EasingType) -> Self {
        Self {
            fade_in,
            fade_out,
            rise,
            easing,
        }
    }

    pub fn from_config(config: &OverlayConfig) -> Self {
        Self::new(
            FadeRange::from_pair(config.fade_in),
            FadeRange::from_pair(config.fade_out),
            config.rise,
            config.easing,
        )
    }

    /// Caption rises in from `rise` below, holds, then rises out to `rise` above
    pub fn style_at(&self, progress: f64) -> CaptionStyle {
        let progress = progress.clamp(0.0, 1.0);
        let shown = self.easing.apply(self.fade_in.ramp(progress));
        let hidden = self.easing.apply(self.fade_out.ramp(progress));

        CaptionStyle {
            opacity: shown * (1.0 - hidden),
            offset: self.rise * (1.0 - shown) - self.rise * hidden,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear() -> OverlayChoreographer {
        OverlayChoreographer::new(FadeRange::new(0.0, 0.2), FadeRange::new(0.75, 1.0), 50.0, EasingType::Linear)
    }

    #[test]
    fn test_fade_in_hold_fade_out() {
        let overlay = linear();

        let start = overlay.style_at(0.0);
        assert_eq!(start.opacity, 0.0);
        assert_eq!(start.offset, 50.0);
        assert!(!start.is_visible());

        let mid_in = overlay.style_at(0.1);
        assert!((mid_in.opacity - 0.5).abs() < 1e-9);
        assert!((mid_in.offset - 25.0).abs() < 1e-9);

        for p in [0.2, 0.4, 0.75] {
            let hold = overlay.style_at(p);
            assert_eq!(hold.opacity, 1.0);
            assert_eq!(hold.offset, 0.0);
        }

        let end = overlay.style_at(1.0);
        assert_eq!(end.opacity, 0.0);
        assert_eq!(end.offset, -50.0);
    }

    #[test]
    fn test_reversible() {
        let overlay = OverlayChoreographer::default();
        let forward: Vec<_> = (0..=50).map(|i| overlay.style_at(i as f64 / 50.0)).collect();
        let backward: Vec<_> = (0..=50).rev().map(|i| overlay.style_at(i as f64 / 50.0)).collect();
        assert!(forward.iter().eq(backward.iter().rev()));
    }

    #[test]
    fn test_zero_width_range_is_a_step() {
        let range = FadeRange::new(0.5, 0.5);
        assert_eq!(range.ramp(0.49), 0.0);
        assert_eq!(range.ramp(0.5), 1.0);

        let inverted = FadeRange::new(0.8, 0.2);
        assert_eq!(inverted.end, 0.8);
    }
}

use std::time::{Duration, Instant};

/// Fraction of `duration` elapsed since `start`, clamped to [0, 1]
#[inline]
pub fn progress(start: Instant, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 1.0;
    }
    (start.elapsed().as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0)
}

#[inline]
pub fn is_complete(start: Instant, duration: Duration) -> bool {
    start.elapsed() >= duration
}

#[inline]
pub fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp() {
        assert_eq!(lerp(0.0, 100.0, 0.0), 0.0);
        assert_eq!(lerp(0.0, 100.0, 0.5), 50.0);
        assert_eq!(lerp(40.0, -40.0, 1.0), -40.0);
    }

    #[test]
    fn test_zero_duration_is_done() {
        let start = Instant::now();
        assert_eq!(progress(start, Duration::ZERO), 1.0);
        assert!(is_complete(start, Duration::ZERO));
    }
}

use crate::geometry::{SectionBounds, ViewportSignal};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GateState {
    /// Waiting for the section to come near the viewport
    Armed,
    /// Fired but not yet observed
    Triggered,
    /// Fired and observed; never fires again
    Spent,
}

/// One-shot lazy-load trigger for a section
#[derive(Debug, Clone)]
pub struct VisibilityGate {
    state: GateState,
    /// Proximity as a fraction of viewport height
    margin: f64,
}

impl VisibilityGate {
    /// A lazy gate waits for proximity; an eager gate is already triggered
    pub fn new(lazy: bool, margin: f64) -> Self {
        Self {
            state: if lazy { GateState::Armed } else { GateState::Triggered },
            margin: margin.max(0.0),
        }
    }

    /// Returns true exactly once over the gate's lifetime
    pub fn poll(&mut self, bounds: &SectionBounds, viewport: &ViewportSignal) -> bool {
        match self.state {
            GateState::Spent => false,
            GateState::Triggered => {
                self.state = GateState::Spent;
                true
            }
            GateState::Armed => {
                if viewport.is_empty() {
                    return false;
                }
                if bounds.within(viewport, self.margin * viewport.vh()) {
                    tracing::debug!(
                        top = bounds.top,
                        scroll_y = viewport.scroll_y,
                        "Visibility gate fired"
                    );
                    self.state = GateState::Spent;
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Fire regardless of proximity. Returns false if the gate already fired.
    pub fn trigger(&mut self) -> bool {
        if self.state == GateState::Spent {
            false
        } else {
            self.state = GateState::Spent;
            true
        }
    }

    pub fn has_fired(&self) -> bool {
        self.state == GateState::Spent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eager_gate_fires_immediately() {
        let mut gate = VisibilityGate::new(false, 0.5);
        let far = SectionBounds::new(100_000.0, 10.0);
        let viewport = ViewportSignal::new(0.0, 80, 800);
        assert!(gate.poll(&far, &viewport));
        assert!(!gate.poll(&far, &viewport));
    }

    #[test]
    fn test_lazy_gate_fires_once_at_margin() {
        let mut gate = VisibilityGate::new(true, 0.5);
        let bounds = SectionBounds::new(2000.0, 2000.0);

        assert!(!gate.poll(&bounds, &ViewportSignal::new(0.0, 80, 800)));
        assert!(!gate.poll(&bounds, &ViewportSignal::new(800.0, 80, 800)));
        assert!(!gate.has_fired());

        // bottom 1600 + margin 400 reaches the top edge
        assert!(gate.poll(&bounds, &ViewportSignal::new(801.0, 80, 800)));
        assert!(gate.has_fired());

        // leaving and re-entering does not re-arm
        assert!(!gate.poll(&bounds, &ViewportSignal::new(0.0, 80, 800)));
        assert!(!gate.poll(&bounds, &ViewportSignal::new(2000.0, 80, 800)));
    }

    #[test]
    fn test_lazy_gate_ignores_empty_viewport() {
        let mut gate = VisibilityGate::new(true, 0.5);
        let bounds = SectionBounds::new(0.0, 100.0);
        assert!(!gate.poll(&bounds, &ViewportSignal::new(0.0, 0, 0)));
        assert!(gate.poll(&bounds, &ViewportSignal::new(0.0, 10, 10)));
    }
}

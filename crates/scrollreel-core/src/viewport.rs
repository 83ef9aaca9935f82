use tokio::sync::watch;

use crate::geometry::ViewportSignal;

/// Per-page broadcast of scroll and resize signals
///
/// Players subscribe at mount and drop their [`ViewportSubscription`] at unmount;
/// nothing is registered globally.
#[derive(Debug)]
pub struct ViewportBus {
    tx: watch::Sender<ViewportSignal>,
}

impl ViewportBus {
    pub fn new(initial: ViewportSignal) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx }
    }

    pub fn current(&self) -> ViewportSignal {
        *self.tx.borrow()
    }

    /// Publish a signal; subscribers are only woken when it differs
    pub fn publish(&self, signal: ViewportSignal) {
        self.tx.send_if_modified(|current| {
            if *current == signal {
                false
            } else {
                *current = signal;
                true
            }
        });
    }

    pub fn scroll_to(&self, scroll_y: f64) {
        let mut signal = self.current();
        signal.scroll_y = scroll_y;
        self.publish(signal);
    }

    pub fn resize(&self, width: u32, height: u32) {
        let mut signal = self.current();
        signal.width = width;
        signal.height = height;
        self.publish(signal);
    }

    pub fn subscribe(&self) -> ViewportSubscription {
        let rx = self.tx.subscribe();
        let last = *rx.borrow();
        ViewportSubscription { rx, last }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// What changed since a subscription last looked
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportChange {
    pub signal: ViewportSignal,
    pub resized: bool,
    pub scrolled: bool,
}

/// One player's view of the [`ViewportBus`]
#[derive(Debug)]
pub struct ViewportSubscription {
    rx: watch::Receiver<ViewportSignal>,
    last: ViewportSignal,
}

impl ViewportSubscription {
    pub fn last(&self) -> ViewportSignal {
        self.last
    }

    /// Latest signal if it changed since the previous poll
    pub fn poll(&mut self) -> Option<ViewportChange> {
        match self.rx.has_changed() {
            Ok(true) => {}
            _ => return None,
        }
        let signal = *self.rx.borrow_and_update();
        let change = ViewportChange {
            signal,
            resized: signal.width != self.last.width || signal.height != self.last.height,
            scrolled: signal.scroll_y != self.last.scroll_y,
        };
        self.last = signal;
        if change.resized || change.scrolled {
            Some(change)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_reports_changes_once() {
        let bus = ViewportBus::new(ViewportSignal::new(0.0, 80, 48));
        let mut sub = bus.subscribe();
        assert!(sub.poll().is_none());

        bus.scroll_to(12.0);
        let change = sub.poll().unwrap();
        assert!(change.scrolled && !change.resized);
        assert_eq!(change.signal.scroll_y, 12.0);
        assert!(sub.poll().is_none());

        bus.resize(100, 60);
        let change = sub.poll().unwrap();
        assert!(change.resized && !change.scrolled);
    }

    #[test]
    fn test_dropping_subscription_detaches() {
        let bus = ViewportBus::new(ViewportSignal::default());
        let a = bus.subscribe();
        let b = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);
        drop(a);
        drop(b);
        assert_eq!(bus.subscriber_count(), 0);
        bus.scroll_to(5.0);
        assert_eq!(bus.current().scroll_y, 5.0);
    }
}

use super::Frame;

/// Load state of one frame
#[derive(Debug, Clone, Default)]
pub enum FrameSlot {
    #[default]
    Unloaded,
    /// Fetch in flight
    Loading,
    /// Decoded and drawable
    Ready(Frame),
    /// Fetch or decode failed; never drawn
    Failed(String),
}

impl FrameSlot {
    pub fn is_ready(&self) -> bool {
        matches!(self, FrameSlot::Ready(_))
    }

    /// Ready or failed: no further transitions happen
    pub fn is_settled(&self) -> bool {
        matches!(self, FrameSlot::Ready(_) | FrameSlot::Failed(_))
    }
}

/// Counts published to observers of a player's loading
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadProgress {
    pub ready: u32,
    pub failed: u32,
    pub total: u32,
    /// Frame 0 is drawable
    pub first_frame: bool,
}

impl LoadProgress {
    /// Every frame is ready or failed
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.ready + self.failed >= self.total
    }

    /// Fraction of frames settled, in [0, 1]
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.ready + self.failed) as f64 / self.total as f64
        }
    }
}

/// Ordered frame slots of a single sequence
///
/// Out-of-range queries return `None`; mutations after [`FrameStore::dispose`]
/// are ignored.
#[derive(Debug)]
pub struct FrameStore {
    slots: Vec<FrameSlot>,
    ready: u32,
    failed: u32,
    disposed: bool,
}

impl FrameStore {
    pub fn new(frame_count: u32) -> Self {
        Self {
            slots: vec![FrameSlot::Unloaded; frame_count as usize],
            ready: 0,
            failed: 0,
            disposed: false,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slot(&self, index: u32) -> Option<&FrameSlot> {
        self.slots.get(index as usize)
    }

    /// Drawable frame at `index`, if it has loaded
    pub fn get(&self, index: u32) -> Option<&Frame> {
        match self.slots.get(index as usize) {
            Some(FrameSlot::Ready(frame)) => Some(frame),
            _ => None,
        }
    }

    pub fn is_ready(&self, index: u32) -> bool {
        self.get(index).is_some()
    }

    /// Mark a slot as in flight. Only valid from `Unloaded`.
    pub fn mark_loading(&mut self, index: u32) -> bool {
        if self.disposed {
            return false;
        }
        match self.slots.get_mut(index as usize) {
            Some(slot @ FrameSlot::Unloaded) => {
                *slot = FrameSlot::Loading;
                true
            }
            _ => false,
        }
    }

    /// Store a decoded frame. Returns false when the call changed nothing.
    pub fn mark_ready(&mut self, index: u32, frame: Frame) -> bool {
        if self.disposed {
            return false;
        }
        match self.slots.get_mut(index as usize) {
            Some(slot) if !slot.is_settled() => {
                *slot = FrameSlot::Ready(frame);
                self.ready += 1;
                true
            }
            _ => false,
        }
    }

    /// Record a failed frame. Returns false when the call changed nothing.
    pub fn mark_failed(&mut self, index: u32, reason: impl Into<String>) -> bool {
        if self.disposed {
            return false;
        }
        match self.slots.get_mut(index as usize) {
            Some(slot) if !slot.is_settled() => {
                *slot = FrameSlot::Failed(reason.into());
                self.failed += 1;
                true
            }
            _ => false,
        }
    }

    /// Every frame has reached `Ready` or `Failed`
    pub fn is_fully_loaded(&self) -> bool {
        !self.is_empty() && (self.ready + self.failed) as usize == self.slots.len()
    }

    pub fn ready_count(&self) -> u32 {
        self.ready
    }

    pub fn failed_count(&self) -> u32 {
        self.failed
    }

    pub fn progress(&self) -> LoadProgress {
        LoadProgress {
            ready: self.ready,
            failed: self.failed,
            total: self.slots.len() as u32,
            first_frame: self.is_ready(0),
        }
    }

    /// Release every frame; later writes become no-ops
    pub fn dispose(&mut self) {
        self.slots.clear();
        self.slots.shrink_to_fit();
        self.ready = 0;
        self.failed = 0;
        self.disposed = true;
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn solid(value: u8) -> Frame {
        Frame::from_rgba(RgbaImage::from_pixel(2, 2, Rgba([value, value, value, 255])))
    }

    #[test]
    fn test_out_of_range_is_absent() {
        let mut store = FrameStore::new(3);
        assert!(store.get(3).is_none());
        assert!(store.slot(100).is_none());
        assert!(!store.mark_ready(3, solid(1)));
        assert!(!store.mark_failed(7, "nope"));
        assert_eq!(store.ready_count(), 0);
    }

    #[test]
    fn test_loading_slot_reads_as_absent() {
        let mut store = FrameStore::new(2);
        assert!(store.mark_loading(1));
        assert!(!store.mark_loading(1));
        assert!(store.get(1).is_none());
        assert!(matches!(store.slot(1), Some(FrameSlot::Loading)));
    }

    #[test]
    fn test_mark_ready_is_idempotent() {
        let mut store = FrameStore::new(2);
        let first = solid(10);
        assert!(store.mark_ready(0, first.clone()));
        assert!(!store.mark_ready(0, solid(99)));

        assert_eq!(store.ready_count(), 1);
        assert!(store.get(0).unwrap().same_as(&first));
        assert_eq!(store.progress(), LoadProgress { ready: 1, failed: 0, total: 2, first_frame: true });
    }

    #[test]
    fn test_failed_slot_is_settled_but_not_drawable() {
        let mut store = FrameStore::new(2);
        store.mark_ready(0, solid(1));
        assert!(!store.is_fully_loaded());
        assert!(store.mark_failed(1, "404"));
        assert!(store.get(1).is_none());
        assert!(store.is_fully_loaded());
        assert!(!store.mark_ready(1, solid(2)));
        assert!(store.progress().is_complete());
    }

    #[test]
    fn test_dispose_blocks_writes() {
        let mut store = FrameStore::new(50);
        store.mark_ready(0, solid(1));
        store.dispose();

        assert!(store.is_disposed());
        assert!(!store.mark_ready(42, solid(42)));
        assert!(!store.mark_loading(1));
        assert!(store.get(0).is_none());
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
        assert!(!store.is_fully_loaded());
    }

    #[test]
    fn test_len_counts_slots_not_ready_frames() {
        let store = FrameStore::new(120);
        assert_eq!(store.len(), 120);
        assert!(!store.is_empty());
        assert_eq!(store.ready_count(), 0);
    }
}

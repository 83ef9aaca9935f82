//! In-memory frame sources for tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use image::{Rgba, RgbaImage};
use tokio::sync::Semaphore;

use super::{Frame, FrameSource};
use crate::sequence::SequenceDescriptor;
use crate::{Error, Result};

/// Produces solid frames whose red channel encodes the frame index
pub(crate) struct MemorySource {
    size: (u32, u32),
    failing: HashSet<u32>,
    gate: Option<Arc<Semaphore>>,
    completed: AtomicUsize,
}

impl MemorySource {
    pub(crate) fn new() -> Self {
        Self {
            size: (8, 4),
            failing: HashSet::new(),
            gate: None,
            completed: AtomicUsize::new(0),
        }
    }

    pub(crate) fn failing(mut self, indices: impl IntoIterator<Item = u32>) -> Self {
        self.failing.extend(indices);
        self
    }

    /// Every fetch waits for a permit handed out by [`MemorySource::release`]
    pub(crate) fn gated(mut self) -> Self {
        self.gate = Some(Arc::new(Semaphore::new(0)));
        self
    }

    pub(crate) fn release(&self, permits: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(permits);
        }
    }

    pub(crate) fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    pub(crate) fn frame(&self, index: u32) -> Frame {
        let (w, h) = self.size;
        Frame::from_rgba(RgbaImage::from_pixel(w, h, Rgba([(index % 256) as u8, 0, 0, 255])))
    }
}

#[async_trait]
impl FrameSource for MemorySource {
    async fn fetch(&self, _sequence: &SequenceDescriptor, index: u32) -> Result<Frame> {
        if let Some(gate) = &self.gate {
            let permit = gate
                .acquire()
                .await
                .map_err(|e| Error::Other(e.to_string()))?;
            permit.forget();
        }
        self.completed.fetch_add(1, Ordering::SeqCst);

        if self.failing.contains(&index) {
            return Err(Error::Other(format!("frame {} unavailable", index)));
        }
        Ok(self.frame(index))
    }

    fn locate(&self, sequence: &SequenceDescriptor, index: u32) -> String {
        format!("memory://{}/{}", sequence.name(), index)
    }
}

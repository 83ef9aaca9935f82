use std::ops::Range;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};

use super::{Frame, FrameSource, FrameStore};
use crate::config::LoaderConfig;
use crate::sequence::SequenceDescriptor;

/// Outcome of one frame fetch, delivered to the owning player
#[derive(Debug, Clone)]
pub enum FrameLoadResult {
    Success { index: u32, frame: Frame },
    Failure { index: u32, error: String },
}

impl FrameLoadResult {
    pub fn index(&self) -> u32 {
        match self {
            FrameLoadResult::Success { index, .. } | FrameLoadResult::Failure { index, .. } => *index,
        }
    }
}

/// How many frames are fetched at once
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadPolicy {
    /// Size of the first batch, started before anything else
    pub priority_batch: usize,
    /// Maximum frames in flight for every later batch
    pub batch_size: usize,
}

impl Default for LoadPolicy {
    fn default() -> Self {
        Self {
            priority_batch: 1,
            batch_size: 12,
        }
    }
}

impl LoadPolicy {
    pub fn from_config(config: &LoaderConfig) -> Self {
        Self {
            priority_batch: config.priority_batch.max(1),
            batch_size: config.batch_size.max(1),
        }
    }

    /// Split `0..frame_count` into the batches fetched in order
    pub fn batches(&self, frame_count: u32) -> Vec<Range<u32>> {
        let total = frame_count as usize;
        let priority = self.priority_batch.max(1).min(total);
        let step = self.batch_size.max(1);

        let mut batches = Vec::new();
        if priority > 0 {
            batches.push(0..priority as u32);
        }
        let mut start = priority;
        while start < total {
            let end = (start + step).min(total);
            batches.push(start as u32..end as u32);
            start = end;
        }
        batches
    }
}

/// Spawns the fetch of every frame of a sequence
#[derive(Clone)]
pub struct Loader {
    source: Arc<dyn FrameSource>,
    policy: LoadPolicy,
}

impl Loader {
    pub fn new(source: Arc<dyn FrameSource>, policy: LoadPolicy) -> Self {
        Self { source, policy }
    }

    pub fn source(&self) -> &Arc<dyn FrameSource> {
        &self.source
    }

    pub fn policy(&self) -> LoadPolicy {
        self.policy
    }

    /// Start loading. Must be called from within a tokio runtime.
    ///
    /// Each call starts an independent load; callers guard against starting twice.
    pub fn load(&self, sequence: Arc<SequenceDescriptor>) -> LoadHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let batches = self.policy.batches(sequence.frame_count());
        let total = sequence.frame_count();

        tracing::debug!(
            sequence = %sequence.name(),
            frames = total,
            batches = batches.len(),
            "Starting frame load"
        );

        let task = tokio::spawn(run_batches(self.source.clone(), sequence, batches, tx));

        LoadHandle { rx, task }
    }
}

async fn run_batches(
    source: Arc<dyn FrameSource>,
    sequence: Arc<SequenceDescriptor>,
    batches: Vec<Range<u32>>,
    tx: mpsc::UnboundedSender<FrameLoadResult>,
) {
    let mut ready = 0u32;
    let mut failed = 0u32;

    for batch in batches {
        if tx.is_closed() {
            tracing::debug!(sequence = %sequence.name(), "Load receiver dropped, stopping");
            return;
        }

        tracing::debug!(
            sequence = %sequence.name(),
            start = batch.start,
            end = batch.end,
            "Fetching frame batch"
        );

        let mut pending = vec![true; batch.len()];
        let mut set = JoinSet::new();
        for index in batch.clone() {
            let source = source.clone();
            let sequence = sequence.clone();
            set.spawn(async move {
                let result = source.fetch(&sequence, index).await;
                (index, result)
            });
        }

        while let Some(joined) = set.join_next().await {
            let event = match joined {
                Ok((index, Ok(frame))) => {
                    ready += 1;
                    pending[(index - batch.start) as usize] = false;
                    FrameLoadResult::Success { index, frame }
                }
                Ok((index, Err(e))) => {
                    failed += 1;
                    pending[(index - batch.start) as usize] = false;
                    tracing::warn!(
                        sequence = %sequence.name(),
                        frame = index,
                        location = %source.locate(&sequence, index),
                        error = %e,
                        "Failed to load frame"
                    );
                    FrameLoadResult::Failure {
                        index,
                        error: e.to_string(),
                    }
                }
                Err(e) => {
                    tracing::warn!(sequence = %sequence.name(), error = %e, "Frame task did not complete");
                    continue;
                }
            };

            if tx.send(event).is_err() {
                return;
            }
        }

        // Tasks that panicked never reported their index
        for (offset, missing) in pending.iter().enumerate() {
            if *missing {
                failed += 1;
                let index = batch.start + offset as u32;
                let event = FrameLoadResult::Failure {
                    index,
                    error: "Frame task did not complete".to_string(),
                };
                if tx.send(event).is_err() {
                    return;
                }
            }
        }
    }

    tracing::info!(
        sequence = %sequence.name(),
        ready,
        failed,
        "Sequence load finished"
    );
}

/// Receiving end of one load. Dropping it cancels outstanding fetches.
pub struct LoadHandle {
    rx: mpsc::UnboundedReceiver<FrameLoadResult>,
    task: JoinHandle<()>,
}

impl LoadHandle {
    /// Next delivered result without waiting
    pub fn try_next(&mut self) -> Option<FrameLoadResult> {
        self.rx.try_recv().ok()
    }

    /// Wait for the next result; `None` once the load has finished and been drained
    pub async fn next(&mut self) -> Option<FrameLoadResult> {
        self.rx.recv().await
    }

    /// Apply every queued result to `store`. Returns how many slots changed.
    pub fn drain_into(&mut self, store: &mut FrameStore) -> usize {
        let mut applied = 0;
        while let Some(result) = self.try_next() {
            let changed = match result {
                FrameLoadResult::Success { index, frame } => store.mark_ready(index, frame),
                FrameLoadResult::Failure { index, error } => store.mark_failed(index, error),
            };
            if changed {
                applied += 1;
            }
        }
        applied
    }

    /// Stop fetching and discard anything not yet delivered
    pub fn cancel(&mut self) {
        self.task.abort();
        self.rx.close();
    }
}

impl Drop for LoadHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

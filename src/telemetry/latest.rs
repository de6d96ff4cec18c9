use crate::types::TelemetrySample;
use crossbeam::sync::ShardedLock;
use std::sync::Arc;
use std::time::{Duration, Instant};

struct Slot {
    sample: Arc<TelemetrySample>,
    received_at: Option<Instant>,
    updates: u64,
}

/// Most recent merged telemetry, shared between the receive task and readers.
///
/// Writers swap in a whole new snapshot; readers clone an `Arc` and never see
/// a half-merged sample.
#[derive(Clone)]
pub struct LatestTelemetry {
    slot: Arc<ShardedLock<Slot>>,
}

impl LatestTelemetry {
    pub fn new() -> Self {
        Self {
            slot: Arc::new(ShardedLock::new(Slot {
                sample: Arc::new(TelemetrySample::default()),
                received_at: None,
                updates: 0,
            })),
        }
    }

    pub fn snapshot(&self) -> Arc<TelemetrySample> {
        let slot = self.slot.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&slot.sample)
    }

    pub fn replace(&self, sample: TelemetrySample) {
        let mut slot = self.slot.write().unwrap_or_else(|e| e.into_inner());
        slot.sample = Arc::new(sample);
        slot.received_at = Some(Instant::now());
        slot.updates += 1;
    }

    /// Drop the alert from the current snapshot, leaving age and update count
    /// alone. Returns whether there was one.
    pub fn clear_alert(&self) -> bool {
        let mut slot = self.slot.write().unwrap_or_else(|e| e.into_inner());
        if slot.sample.alert.is_none() {
            return false;
        }
        let mut sample = (*slot.sample).clone();
        sample.alert = None;
        slot.sample = Arc::new(sample);
        true
    }

    /// Time since the last accepted datagram; `None` before the first.
    pub fn age(&self) -> Option<Duration> {
        let slot = self.slot.read().unwrap_or_else(|e| e.into_inner());
        slot.received_at.map(|t| t.elapsed())
    }

    /// Never-updated state counts as stale.
    pub fn is_stale(&self, threshold: Duration) -> bool {
        self.age().map_or(true, |age| age > threshold)
    }

    /// Number of snapshots accepted so far
    pub fn updates(&self) -> u64 {
        self.slot.read().unwrap_or_else(|e| e.into_inner()).updates
    }
}

impl Default for LatestTelemetry {
    fn default() -> Self {
        Self::new()
    }
}

//! Staggered export scheduling

use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{debug, warn};

use crate::bank::SlotBank;
use crate::error::Result;
use crate::platform::Downloader;

/// Gap between consecutive downloads so the platform does not block them
pub const DEFAULT_STAGGER: Duration = Duration::from_millis(200);

/// One slot export to run after `delay`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledExport {
    pub slot: usize,
    pub delay: Duration,
}

/// Exports waiting for their time, fired from the frame loop
#[derive(Default)]
pub struct ExportQueue {
    pending: Vec<(Instant, usize)>,
}

impl ExportQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, now: Instant, exports: &[ScheduledExport]) {
        for export in exports {
            debug!(slot = export.slot, delay_ms = export.delay.as_millis() as u64, "Export scheduled");
            self.pending.push((now + export.delay, export.slot));
        }
        self.pending.sort_by_key(|(due, _)| *due);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Run every export due at `now`, one result per fired export
    pub fn fire_due(&mut self, now: Instant, bank: &SlotBank, downloader: &dyn Downloader) -> Vec<Result<bool>> {
        let split = self.pending.partition_point(|(due, _)| *due <= now);
        self.pending
            .drain(..split)
            .map(|(_, index)| match bank.get(index) {
                Some(slot) => slot.export_clip(downloader, Utc::now()),
                None => {
                    warn!(slot = index, "Scheduled export for missing slot");
                    Ok(false)
                }
            })
            .collect()
    }
}

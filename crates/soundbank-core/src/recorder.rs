//! Exclusive access to the single capture device

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{BankError, Result};
use crate::platform::{PendingClip, Recorder};

/// What happens when a second slot asks to record while another holds the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingPolicy {
    /// Refuse the new request; the current take continues
    #[default]
    Reject,
    /// Stop and deliver the current take, then start the new one
    Takeover,
}

/// Proof that a slot owns the recorder. Only [`SharedRecorder`] creates one,
/// and handing it back is the only way to stop a capture.
#[derive(Debug, PartialEq, Eq)]
pub struct RecordingLease {
    slot: usize,
    take: u64,
}

impl RecordingLease {
    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn take(&self) -> u64 {
        self.take
    }
}

/// The host's recorder, shared by every slot through leases
pub struct SharedRecorder {
    recorder: Box<dyn Recorder>,
    policy: RecordingPolicy,
    owner: Option<usize>,
    next_take: u64,
}

impl SharedRecorder {
    pub fn new(recorder: Box<dyn Recorder>, policy: RecordingPolicy) -> Self {
        Self {
            recorder,
            policy,
            owner: None,
            next_take: 1,
        }
    }

    pub fn policy(&self) -> RecordingPolicy {
        self.policy
    }

    /// Slot currently capturing, if any
    pub fn owner(&self) -> Option<usize> {
        self.owner
    }

    /// Start capturing on behalf of `slot`
    pub fn acquire(&mut self, slot: usize) -> Result<RecordingLease> {
        if let Some(owner) = self.owner {
            debug!(slot, owner, "Recorder busy, refusing lease");
            return Err(BankError::RecorderBusy { owner });
        }

        self.recorder.start()?;

        let take = self.next_take;
        self.next_take += 1;
        self.owner = Some(slot);
        info!(slot, take, "Recording started");
        Ok(RecordingLease { slot, take })
    }

    /// Stop capturing and hand the lease back
    pub fn release(&mut self, lease: RecordingLease) -> Result<PendingClip> {
        // Ownership is cleared even if the device fails to stop cleanly
        self.owner = None;
        let pending = self.recorder.stop()?;
        info!(slot = lease.slot, take = lease.take, "Recording stopped, flushing clip");
        Ok(pending)
    }
}

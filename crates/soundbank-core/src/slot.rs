//! One record/play/loop/export unit of the bank

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::layout::{ControlRegion, Point, Rect, SlotGeometry};
use crate::platform::{Clip, Downloader, PendingClip, Player};
use crate::recorder::{RecordingLease, SharedRecorder};
use crate::surface::{Icon, Surface, Theme};

/// Where a slot is in its record cycle
enum RecordState {
    Idle,
    Recording(RecordingLease),
    /// Stop requested, waiting for the recorder to hand over the clip
    Flushing(PendingClip),
}

pub struct Slot {
    index: usize,
    position: Point,
    geometry: SlotGeometry,
    player: Box<dyn Player>,
    looping: bool,
    record: RecordState,
    /// Most recent finished recording; never set by file loads
    clip: Option<Clip>,
}

impl Slot {
    pub fn new(index: usize, position: Point, geometry: SlotGeometry, player: Box<dyn Player>) -> Self {
        Self {
            index,
            position,
            geometry,
            player,
            looping: false,
            record: RecordState::Idle,
            clip: None,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn geometry(&self) -> &SlotGeometry {
        &self.geometry
    }

    pub fn is_recording(&self) -> bool {
        matches!(self.record, RecordState::Recording(_))
    }

    pub fn is_flushing(&self) -> bool {
        matches!(self.record, RecordState::Flushing(_))
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn is_playing(&self) -> bool {
        self.player.is_playing()
    }

    pub fn has_audio(&self) -> bool {
        self.player.is_loaded()
    }

    /// Clip available for export
    pub fn clip(&self) -> Option<&Clip> {
        self.clip.as_ref()
    }

    pub fn has_clip(&self) -> bool {
        self.clip.is_some()
    }

    /// Decode user-supplied audio into the player. On failure the previous
    /// audio (if any) stays loaded.
    pub fn load_from_file(&mut self, bytes: &[u8]) -> Result<()> {
        self.player.load(bytes)?;
        info!(slot = self.index, bytes = bytes.len(), "Loaded audio file");
        Ok(())
    }

    /// Restart playback from the top; does nothing until audio is loaded
    pub fn toggle_playback(&mut self) -> Result<()> {
        if !self.player.is_loaded() {
            debug!(slot = self.index, "Play pressed with nothing loaded");
            return Ok(());
        }
        if self.player.is_playing() {
            self.player.stop();
        }
        self.player.start()
    }

    /// Idle -> Recording acquires the shared recorder; Recording -> Idle
    /// returns it and waits for the clip. Presses while flushing are ignored.
    pub fn toggle_recording(&mut self, recorder: &mut SharedRecorder) -> Result<()> {
        match std::mem::replace(&mut self.record, RecordState::Idle) {
            RecordState::Idle => {
                let lease = recorder.acquire(self.index)?;
                self.record = RecordState::Recording(lease);
                Ok(())
            }
            RecordState::Recording(lease) => {
                let pending = recorder.release(lease)?;
                self.record = RecordState::Flushing(pending);
                self.poll().unwrap_or(Ok(()))
            }
            RecordState::Flushing(pending) => {
                debug!(slot = self.index, "Record pressed while clip is flushing");
                self.record = RecordState::Flushing(pending);
                Ok(())
            }
        }
    }

    /// Complete a flush if the clip has arrived. `None` when there is nothing
    /// to report this frame.
    pub fn poll(&mut self) -> Option<Result<()>> {
        let RecordState::Flushing(pending) = &self.record else {
            return None;
        };
        let delivered = pending.try_take()?;
        self.record = RecordState::Idle;

        Some(delivered.and_then(|clip| {
            info!(slot = self.index, bytes = clip.len(), "Clip delivered");
            let loaded = self.player.load(clip.bytes());
            self.clip = Some(clip);
            loaded
        }))
    }

    /// Flip looping. If the player was stopped, stop it again; this is a
    /// no-op kept for parity with the loop button's old behaviour.
    pub fn toggle_loop(&mut self) {
        let was_playing = self.player.is_playing();
        self.looping = !self.looping;
        self.player.set_looping(self.looping);
        if !was_playing {
            self.player.stop();
        }
    }

    /// Download the last recording. Returns `false` when there is none.
    pub fn export_clip(&self, downloader: &dyn Downloader, now: DateTime<Utc>) -> Result<bool> {
        let Some(clip) = &self.clip else {
            return Ok(false);
        };
        let file_name = self.export_file_name(clip, now);
        downloader.download(&file_name, clip).inspect_err(|e| {
            warn!(slot = self.index, file = %file_name, "Export failed: {}", e);
        })?;
        info!(slot = self.index, file = %file_name, "Exported clip");
        Ok(true)
    }

    /// `record-{index}-{timestamp}.{ext}`, with a filesystem-safe ISO-8601 timestamp
    pub fn export_file_name(&self, clip: &Clip, now: DateTime<Utc>) -> String {
        format!(
            "record-{}-{}.{}",
            self.index,
            now.format("%Y-%m-%dT%H-%M-%S%.3fZ"),
            clip.extension()
        )
    }

    pub fn hit_test(&self, p: Point) -> Option<ControlRegion> {
        self.geometry.region_at(self.position, p)
    }

    /// The file label above the controls
    pub fn label_rect(&self) -> Rect {
        self.geometry.label_rect(self.position)
    }

    pub fn control_rect(&self, region: ControlRegion) -> Rect {
        self.geometry.control_rect(self.position, region)
    }

    pub fn render(&self, surface: &mut dyn Surface, theme: &Theme) {
        let label = self.label_rect();
        surface.fill_rounded_rect(label, theme.corner_radius, theme.label);
        surface.icon(Icon::Open, label.inset(theme.icon_inset));

        for region in ControlRegion::ALL {
            let rect = self.control_rect(region);
            let (color, icon) = match region {
                ControlRegion::Record if self.is_recording() => (theme.recording, Icon::Record),
                ControlRegion::Record => (theme.idle, Icon::Record),
                ControlRegion::Play if !self.has_audio() => (theme.disabled, Icon::Play),
                ControlRegion::Play if self.is_playing() => (theme.playing, Icon::Play),
                ControlRegion::Play => (theme.idle, Icon::Play),
                ControlRegion::Loop if self.looping => (theme.looping, Icon::Loop),
                ControlRegion::Loop => (theme.idle, Icon::Loop),
                ControlRegion::Export if self.has_clip() => (theme.idle, Icon::Download),
                ControlRegion::Export => (theme.disabled, Icon::Download),
            };

            match region {
                ControlRegion::Export => surface.fill_rounded_rect(rect, theme.corner_radius, color),
                _ => surface.fill_circle(rect.center(), rect.width, color),
            }
            surface.icon(icon, rect.inset(theme.icon_inset));
        }
    }
}

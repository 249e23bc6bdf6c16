//! Composition of the bank, its buttons and the scope into one canvas

use std::time::{Duration, Instant};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::bank::{SlotBank, SLOT_SPACING};
use crate::bulk_export::BulkExportControl;
use crate::error::{BankError, Result};
use crate::export::ExportQueue;
use crate::layout::{ControlRegion, Point, Rect, SlotGeometry};
use crate::monitor::MonitorToggle;
use crate::platform::{Downloader, FilePicker, MicRouting, Notifier, Player};
use crate::recorder::SharedRecorder;
use crate::surface::{Surface, Theme};
use crate::waveform::Scope;

/// Canvas placement of every element
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenLayout {
    pub width: f32,
    pub height: f32,
    pub bank_origin: Point,
    pub geometry: SlotGeometry,
    pub scope: Rect,
    pub monitor: Point,
    pub bulk_export: Point,
    pub button_size: f32,
}

impl Default for ScreenLayout {
    fn default() -> Self {
        Self {
            width: 600.0,
            height: 745.0,
            bank_origin: Point::new(25.0, 25.0),
            geometry: SlotGeometry::default(),
            scope: Rect::new(0.0, 345.0, 600.0, 400.0),
            monitor: Point::new(480.0, 355.0),
            bulk_export: Point::new(540.0, 355.0),
            button_size: 50.0,
        }
    }
}

impl ScreenLayout {
    /// Default layout widened to fit `slots` columns; the buttons stay right-aligned
    pub fn for_slots(slots: usize) -> Self {
        let base = Self::default();
        let width = (slots as f32 * SLOT_SPACING).max(base.width);
        let shift = width - base.width;
        Self {
            width,
            scope: Rect::new(0.0, base.scope.top(), width, base.scope.height),
            monitor: base.monitor.offset(shift, 0.0),
            bulk_export: base.bulk_export.offset(shift, 0.0),
            ..base
        }
    }
}

/// What a pointer press landed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Control { slot: usize, control: ControlRegion },
    /// The file label above a slot's controls
    Label(usize),
    BulkExport,
    Monitor,
}

/// Host-owned resources an action may touch
pub struct Platform<'a> {
    pub recorder: &'a mut SharedRecorder,
    pub mic: &'a mut dyn MicRouting,
    pub downloader: &'a dyn Downloader,
    pub notifier: &'a dyn Notifier,
    pub picker: &'a dyn FilePicker,
    pub now: Instant,
}

pub struct Screen {
    layout: ScreenLayout,
    theme: Theme,
    bank: SlotBank,
    bulk_export: BulkExportControl,
    monitor: MonitorToggle,
    scope: Scope,
    exports: ExportQueue,
}

impl Screen {
    pub fn new(layout: ScreenLayout, theme: Theme, players: Vec<Box<dyn Player>>, stagger: Duration) -> Self {
        Self {
            bank: SlotBank::new(layout.bank_origin, layout.geometry, players),
            bulk_export: BulkExportControl::new(layout.bulk_export, layout.button_size).with_stagger(stagger),
            monitor: MonitorToggle::new(layout.monitor, layout.button_size),
            scope: Scope::new(layout.scope),
            exports: ExportQueue::new(),
            layout,
            theme,
        }
    }

    pub fn layout(&self) -> &ScreenLayout {
        &self.layout
    }

    pub fn bank(&self) -> &SlotBank {
        &self.bank
    }

    pub fn monitor(&self) -> &MonitorToggle {
        &self.monitor
    }

    pub fn pending_exports(&self) -> usize {
        self.exports.len()
    }

    /// Pure routing of a press to the element under it
    pub fn resolve(&self, p: Point) -> Option<Target> {
        if self.monitor.contains(p) {
            return Some(Target::Monitor);
        }
        if self.bulk_export.contains(p) {
            return Some(Target::BulkExport);
        }
        self.bank.iter().find_map(|slot| {
            if let Some(control) = slot.hit_test(p) {
                return Some(Target::Control { slot: slot.index(), control });
            }
            slot.label_rect().contains(p).then_some(Target::Label(slot.index()))
        })
    }

    /// Perform the action behind a target
    pub fn dispatch(&mut self, target: Target, platform: &mut Platform<'_>) -> Result<()> {
        debug!(?target, "Dispatching press");
        match target {
            Target::Control { slot, control: ControlRegion::Record } => {
                self.bank.toggle_recording(slot, platform.recorder)
            }
            Target::Control { slot, control } => {
                let slot = self.slot_mut(slot)?;
                match control {
                    ControlRegion::Play => slot.toggle_playback(),
                    ControlRegion::Loop => {
                        slot.toggle_loop();
                        Ok(())
                    }
                    ControlRegion::Export => slot.export_clip(platform.downloader, Utc::now()).map(|_| ()),
                    ControlRegion::Record => Ok(()),
                }
            }
            Target::Label(slot) => {
                let Some(bytes) = platform.picker.pick_audio() else {
                    debug!(slot, "File selection cancelled");
                    return Ok(());
                };
                self.slot_mut(slot)?.load_from_file(&bytes)
            }
            Target::BulkExport => {
                let plan = self.bulk_export.export_all(&self.bank, platform.notifier);
                self.exports.schedule(platform.now, &plan);
                Ok(())
            }
            Target::Monitor => self.monitor.toggle(platform.mic).map(|_| ()),
        }
    }

    /// Resolve and dispatch in one go; `None` when the press hit nothing
    pub fn press(&mut self, p: Point, platform: &mut Platform<'_>) -> Option<Result<()>> {
        let target = self.resolve(p)?;
        Some(self.dispatch(target, platform))
    }

    /// Load a dropped file into the slot whose column spans `x`
    pub fn drop_file(&mut self, x: f32, bytes: &[u8]) -> Result<()> {
        let Some(index) = self.bank.column_at(x) else {
            return Ok(());
        };
        self.slot_mut(index)?.load_from_file(bytes)
    }

    /// Per-frame housekeeping: finish flushed recordings and fire due exports.
    /// Failures are returned for the host to report.
    pub fn tick(&mut self, now: Instant, downloader: &dyn Downloader) -> Vec<BankError> {
        let mut errors: Vec<BankError> = self
            .bank
            .iter_mut()
            .filter_map(|slot| slot.poll())
            .filter_map(|result| result.err())
            .collect();

        let fired = self.exports.fire_due(now, &self.bank, downloader);
        errors.extend(fired.into_iter().filter_map(|result| result.err()));

        for error in &errors {
            warn!("Bank error: {}", error);
        }
        errors
    }

    pub fn render(&self, surface: &mut dyn Surface, samples: &[f32]) {
        let theme = &self.theme;
        surface.fill_rect(Rect::new(0.0, 0.0, self.layout.width, self.layout.height), theme.background);

        // Guides between slot columns
        let geometry = self.layout.geometry;
        let first_x = self.layout.bank_origin.x + geometry.button_size / 2.0 - SLOT_SPACING / 2.0;
        let top = self.layout.bank_origin.y;
        let bottom = geometry.control_rect(self.layout.bank_origin, ControlRegion::Export).bottom();
        for i in 1..self.bank.len() {
            let x = first_x + i as f32 * SLOT_SPACING;
            surface.line(Point::new(x, top), Point::new(x, bottom), 1.0, theme.guide);
        }

        for slot in self.bank.iter() {
            slot.render(surface, theme);
        }

        self.scope.render(surface, theme, samples);
        self.monitor.render(surface, theme);
        self.bulk_export.render(surface, theme);
    }

    fn slot_mut(&mut self, index: usize) -> Result<&mut crate::slot::Slot> {
        self.bank
            .get_mut(index)
            .ok_or_else(|| BankError::Device(format!("no slot {index}")))
    }
}

//! soundbank-core: Slot state machine, layout and controls for the sound bank

pub mod bank;
pub mod bulk_export;
mod error;
pub mod export;
pub mod layout;
pub mod monitor;
pub mod platform;
pub mod recorder;
pub mod screen;
pub mod slot;
pub mod surface;
pub mod waveform;

pub use bank::{SlotBank, SLOT_SPACING};
pub use bulk_export::{BulkExportControl, NOTHING_RECORDED};
pub use error::{BankError, Result};
pub use export::{ExportQueue, ScheduledExport, DEFAULT_STAGGER};
pub use layout::{ControlRegion, Point, Rect, SlotGeometry};
pub use monitor::MonitorToggle;
pub use platform::{
    pending_clip, Analyser, Clip, ClipSender, Downloader, FilePicker, MicRouting, Notifier,
    PendingClip, Player, Recorder,
};
pub use recorder::{RecordingLease, RecordingPolicy, SharedRecorder};
pub use screen::{Platform, Screen, ScreenLayout, Target};
pub use slot::Slot;
pub use surface::{Icon, Rgb, Surface, Theme};
pub use waveform::{Scope, ANALYSER_SIZE};

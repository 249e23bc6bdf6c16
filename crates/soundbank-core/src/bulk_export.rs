//! Button that exports every recorded slot at once

use tracing::info;

use crate::bank::SlotBank;
use crate::export::{ScheduledExport, DEFAULT_STAGGER};
use crate::layout::{Point, Rect};
use crate::platform::Notifier;
use crate::surface::{Icon, Surface, Theme};

pub const NOTHING_RECORDED: &str = "No recorded data.";

pub struct BulkExportControl {
    rect: Rect,
    stagger: std::time::Duration,
}

impl BulkExportControl {
    pub fn new(origin: Point, size: f32) -> Self {
        Self {
            rect: Rect::square(origin, size),
            stagger: DEFAULT_STAGGER,
        }
    }

    pub fn with_stagger(mut self, stagger: std::time::Duration) -> Self {
        self.stagger = stagger;
        self
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn contains(&self, p: Point) -> bool {
        self.rect.contains(p)
    }

    /// Plan one export per slot with a clip, delayed by the slot's position
    /// in the bank. With nothing to export the user is told once and the
    /// plan is empty.
    pub fn export_all(&self, bank: &SlotBank, notifier: &dyn Notifier) -> Vec<ScheduledExport> {
        let plan: Vec<ScheduledExport> = bank
            .exportable()
            .map(|(position, slot)| ScheduledExport {
                slot: slot.index(),
                delay: self.stagger * position as u32,
            })
            .collect();

        if plan.is_empty() {
            notifier.notify(NOTHING_RECORDED);
        } else {
            info!(count = plan.len(), "Bulk export scheduled");
        }
        plan
    }

    pub fn render(&self, surface: &mut dyn Surface, theme: &Theme) {
        surface.fill_rounded_rect(self.rect, theme.corner_radius, theme.idle);
        surface.icon(Icon::DownloadAll, self.rect.inset(theme.icon_inset));
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::export::ExportQueue;
    use crate::layout::SlotGeometry;
    use crate::platform::testing::{FakeDownloader, FakeNotifier, FakePlayer, FakeRecorder};
    use crate::platform::Player;
    use crate::recorder::{RecordingPolicy, SharedRecorder};

    fn bank_with_clips(count: usize, recorded: &[usize]) -> SlotBank {
        let players: Vec<Box<dyn Player>> = (0..count)
            .map(|_| Box::new(FakePlayer::new().0) as Box<dyn Player>)
            .collect();
        let mut bank = SlotBank::new(Point::new(25.0, 25.0), SlotGeometry::default(), players);
        let mut recorder = SharedRecorder::new(Box::new(FakeRecorder::default()), RecordingPolicy::Reject);
        for index in recorded {
            assert!(bank.toggle_recording(*index, &mut recorder).is_ok());
            assert!(bank.toggle_recording(*index, &mut recorder).is_ok());
        }
        bank
    }

    fn control() -> BulkExportControl {
        BulkExportControl::new(Point::new(540.0, 355.0), 50.0)
    }

    #[test]
    fn test_nothing_recorded_notifies_once() {
        let bank = bank_with_clips(6, &[]);
        let notifier = FakeNotifier::default();
        let plan = control().export_all(&bank, &notifier);
        assert!(plan.is_empty());
        assert_eq!(notifier.messages.borrow().as_slice(), &[NOTHING_RECORDED.to_string()]);
    }

    #[test]
    fn test_delays_follow_collection_position() {
        let bank = bank_with_clips(6, &[0, 3, 5]);
        let notifier = FakeNotifier::default();
        let plan = control().export_all(&bank, &notifier);
        assert!(notifier.messages.borrow().is_empty());
        assert_eq!(
            plan,
            vec![
                ScheduledExport { slot: 0, delay: Duration::ZERO },
                ScheduledExport { slot: 3, delay: Duration::from_millis(600) },
                ScheduledExport { slot: 5, delay: Duration::from_millis(1000) },
            ]
        );
    }

    #[test]
    fn test_queue_fires_k_downloads_on_schedule() {
        let bank = bank_with_clips(6, &[1, 4]);
        let notifier = FakeNotifier::default();
        let downloads = FakeDownloader::default();
        let plan = control().export_all(&bank, &notifier);

        let start = Instant::now();
        let mut queue = ExportQueue::new();
        queue.schedule(start, &plan);

        let fired = queue.fire_due(start + Duration::from_millis(199), &bank, &downloads);
        assert!(fired.is_empty());

        let fired = queue.fire_due(start + Duration::from_millis(200), &bank, &downloads);
        assert_eq!(fired.len(), 1);
        assert_eq!(downloads.files.borrow().len(), 1);
        assert!(downloads.files.borrow()[0].0.starts_with("record-1-"));

        let fired = queue.fire_due(start + Duration::from_millis(800), &bank, &downloads);
        assert_eq!(fired.len(), 1);
        assert_eq!(downloads.files.borrow().len(), 2);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_contains_is_strict() {
        let control = control();
        assert!(control.contains(Point::new(565.0, 380.0)));
        assert!(!control.contains(Point::new(540.0, 380.0)));
        assert!(!control.contains(Point::new(565.0, 405.0)));
    }
}

//! The fixed collection of slots

use crate::error::{BankError, Result};
use crate::layout::{Point, SlotGeometry};
use crate::platform::Player;
use crate::recorder::{RecordingPolicy, SharedRecorder};
use crate::slot::Slot;

/// Horizontal distance between slot anchors
pub const SLOT_SPACING: f32 = 100.0;

pub struct SlotBank {
    slots: Vec<Slot>,
}

impl SlotBank {
    /// Lay out one slot per player, left to right from `origin`
    pub fn new(origin: Point, geometry: SlotGeometry, players: Vec<Box<dyn Player>>) -> Self {
        let slots = players
            .into_iter()
            .enumerate()
            .map(|(index, player)| {
                let position = origin.offset(index as f32 * SLOT_SPACING, 0.0);
                Slot::new(index, position, geometry, player)
            })
            .collect();
        Self { slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Slot> {
        self.slots.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Slot> {
        self.slots.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Slot> {
        self.slots.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Slot> {
        self.slots.iter_mut()
    }

    /// Slots holding a recorded clip, with their position in the collection
    pub fn exportable(&self) -> impl Iterator<Item = (usize, &Slot)> {
        self.slots.iter().enumerate().filter(|(_, slot)| slot.has_clip())
    }

    /// Slot whose column spans `x`
    pub fn column_at(&self, x: f32) -> Option<usize> {
        self.slots.iter().position(|slot| {
            let left = slot.position().x - (SLOT_SPACING - slot.geometry().button_size) / 2.0;
            x >= left && x < left + SLOT_SPACING
        })
    }

    /// Toggle recording on one slot, applying the recorder's policy when
    /// another slot already holds the device.
    pub fn toggle_recording(&mut self, index: usize, recorder: &mut SharedRecorder) -> Result<()> {
        let Some(slot) = self.slots.get(index) else {
            return Err(BankError::Device(format!("no slot {index}")));
        };

        let starting = !slot.is_recording() && !slot.is_flushing();
        if let Some(owner) = recorder.owner().filter(|owner| *owner != index) {
            if starting && recorder.policy() == RecordingPolicy::Takeover {
                tracing::info!(from = owner, to = index, "Handing recorder over");
                if let Some(current) = self.slots.get_mut(owner) {
                    current.toggle_recording(recorder)?;
                }
            }
        }

        match self.slots.get_mut(index) {
            Some(slot) => slot.toggle_recording(recorder),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::testing::{FakePlayer, FakeRecorder, HandoffRecorder};
    use crate::platform::Clip;

    fn bank(count: usize) -> SlotBank {
        let players: Vec<Box<dyn Player>> = (0..count)
            .map(|_| Box::new(FakePlayer::new().0) as Box<dyn Player>)
            .collect();
        SlotBank::new(Point::new(25.0, 25.0), SlotGeometry::default(), players)
    }

    #[test]
    fn test_slots_laid_out_in_columns() {
        let bank = bank(6);
        let xs: Vec<f32> = bank.iter().map(|s| s.position().x).collect();
        assert_eq!(xs, vec![25.0, 125.0, 225.0, 325.0, 425.0, 525.0]);
        let indices: Vec<usize> = bank.iter().map(|s| s.index()).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_column_at() {
        let bank = bank(6);
        assert_eq!(bank.column_at(0.0), Some(0));
        assert_eq!(bank.column_at(99.0), Some(0));
        assert_eq!(bank.column_at(100.0), Some(1));
        assert_eq!(bank.column_at(599.0), Some(5));
        assert_eq!(bank.column_at(600.0), None);
    }

    #[test]
    fn test_reject_policy_refuses_second_slot() {
        let mut bank = bank(3);
        let mut recorder = SharedRecorder::new(Box::new(FakeRecorder::default()), RecordingPolicy::Reject);

        assert!(bank.toggle_recording(0, &mut recorder).is_ok());
        let refused = bank.toggle_recording(1, &mut recorder);
        assert!(matches!(refused, Err(BankError::RecorderBusy { owner: 0 })));
        assert!(bank.get(0).is_some_and(|s| s.is_recording()));
        assert!(bank.get(1).is_some_and(|s| !s.is_recording()));
    }

    #[test]
    fn test_takeover_policy_delivers_first_take() {
        let mut bank = bank(3);
        let mut recorder = SharedRecorder::new(Box::new(FakeRecorder::default()), RecordingPolicy::Takeover);

        assert!(bank.toggle_recording(0, &mut recorder).is_ok());
        assert!(bank.toggle_recording(2, &mut recorder).is_ok());

        assert!(bank.get(0).is_some_and(|s| !s.is_recording() && s.has_clip()));
        assert!(bank.get(2).is_some_and(|s| s.is_recording()));
        assert_eq!(recorder.owner(), Some(2));
    }

    #[test]
    fn test_takeover_with_slow_flush() {
        let mut bank = bank(3);
        let (fake, senders) = HandoffRecorder::new();
        let mut recorder = SharedRecorder::new(Box::new(fake), RecordingPolicy::Takeover);

        assert!(bank.toggle_recording(0, &mut recorder).is_ok());
        assert!(bank.toggle_recording(2, &mut recorder).is_ok());

        assert!(bank.get(0).is_some_and(|s| s.is_flushing() && !s.has_clip()));
        assert!(bank.get(2).is_some_and(|s| s.is_recording()));
        assert_eq!(recorder.owner(), Some(2));

        let Some(tx) = senders.borrow_mut().pop() else { panic!("no pending clip") };
        tx.deliver(Ok(Clip::new(b"first".to_vec(), "wav")));

        let finished: Vec<bool> = bank.iter_mut().filter_map(|s| s.poll()).map(|r| r.is_ok()).collect();
        assert_eq!(finished, vec![true]);
        assert!(bank.get(0).is_some_and(|s| !s.is_flushing() && s.has_clip() && s.has_audio()));
        assert!(bank.get(2).is_some_and(|s| s.is_recording()));
    }

    #[test]
    fn test_exportable_reports_collection_positions() {
        let mut bank = bank(4);
        let mut recorder = SharedRecorder::new(Box::new(FakeRecorder::default()), RecordingPolicy::Reject);
        for index in [1, 3] {
            assert!(bank.toggle_recording(index, &mut recorder).is_ok());
            assert!(bank.toggle_recording(index, &mut recorder).is_ok());
        }
        let positions: Vec<usize> = bank.exportable().map(|(pos, _)| pos).collect();
        assert_eq!(positions, vec![1, 3]);
    }
}

//! Oscilloscope trace of the analyser samples

use crate::layout::{Point, Rect};
use crate::surface::{Surface, Theme};

/// Samples the analyser hands over per frame
pub const ANALYSER_SIZE: usize = 512;

pub struct Scope {
    area: Rect,
}

impl Scope {
    pub fn new(area: Rect) -> Self {
        Self { area }
    }

    /// Map amplitudes to points across the full width, centred vertically
    /// and clamped to the area
    pub fn trace(&self, values: &[f32]) -> Vec<Point> {
        let half = self.area.height / 2.0;
        let mid = self.area.top() + half;
        let last = values.len().saturating_sub(1).max(1) as f32;

        values
            .iter()
            .enumerate()
            .map(|(i, amp)| {
                let x = self.area.left() + i as f32 / last * self.area.width;
                let amp = if amp.is_finite() { *amp } else { 0.0 };
                let y = mid + (amp * self.area.height).clamp(-half, half);
                Point::new(x, y)
            })
            .collect()
    }

    pub fn render(&self, surface: &mut dyn Surface, theme: &Theme, values: &[f32]) {
        surface.fill_rect(self.area, theme.scope_background);
        if values.len() < 2 {
            return;
        }
        surface.polyline(&self.trace(values), 1.0, theme.scope_trace);
    }
}

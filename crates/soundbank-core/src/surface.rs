//! Drawing surface contract and palette

use serde::{Deserialize, Serialize};

use crate::layout::{Point, Rect};

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const BLACK: Rgb = Rgb(0, 0, 0);
}

/// Glyphs drawn on top of controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Icon {
    Record,
    Play,
    Loop,
    Download,
    DownloadAll,
    Monitor,
    Open,
}

/// Something that can draw the bank: an egui painter in the app, a recorder in tests.
pub trait Surface {
    fn fill_rect(&mut self, rect: Rect, color: Rgb);
    fn fill_rounded_rect(&mut self, rect: Rect, corner_radius: f32, color: Rgb);
    fn fill_circle(&mut self, center: Point, diameter: f32, color: Rgb);
    fn line(&mut self, from: Point, to: Point, width: f32, color: Rgb);
    fn polyline(&mut self, points: &[Point], width: f32, color: Rgb);
    fn icon(&mut self, icon: Icon, rect: Rect);
}

/// Colors used by every control
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub background: Rgb,
    pub guide: Rgb,
    pub idle: Rgb,
    pub disabled: Rgb,
    pub recording: Rgb,
    pub playing: Rgb,
    pub looping: Rgb,
    pub monitoring: Rgb,
    pub label: Rgb,
    pub scope_background: Rgb,
    pub scope_trace: Rgb,
    /// Corner radius of square buttons
    pub corner_radius: f32,
    /// Icon inset inside its button
    pub icon_inset: f32,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Rgb(165, 170, 168),
            guide: Rgb(230, 230, 230),
            idle: Rgb::WHITE,
            disabled: Rgb(112, 116, 124),
            recording: Rgb(255, 72, 176),
            playing: Rgb(94, 200, 229),
            looping: Rgb(255, 232, 0),
            monitoring: Rgb(255, 72, 176),
            label: Rgb(220, 222, 221),
            scope_background: Rgb::BLACK,
            scope_trace: Rgb(0, 255, 0),
            corner_radius: 8.0,
            icon_inset: 5.0,
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// One recorded draw call
    #[derive(Debug, Clone, PartialEq)]
    pub enum DrawOp {
        Rect(Rect, Rgb),
        RoundedRect(Rect, Rgb),
        Circle(Point, Rgb),
        Line(Point, Point),
        Polyline(usize, Rgb),
        Icon(Icon, Rect),
    }

    /// Surface that records every call
    #[derive(Default)]
    pub struct RecordingSurface {
        pub ops: Vec<DrawOp>,
    }

    impl RecordingSurface {
        pub fn circles(&self) -> Vec<Rgb> {
            self.ops
                .iter()
                .filter_map(|op| match op {
                    DrawOp::Circle(_, c) => Some(*c),
                    _ => None,
                })
                .collect()
        }

        pub fn rounded(&self) -> Vec<Rgb> {
            self.ops
                .iter()
                .filter_map(|op| match op {
                    DrawOp::RoundedRect(_, c) => Some(*c),
                    _ => None,
                })
                .collect()
        }

        pub fn icons(&self) -> Vec<Icon> {
            self.ops
                .iter()
                .filter_map(|op| match op {
                    DrawOp::Icon(i, _) => Some(*i),
                    _ => None,
                })
                .collect()
        }
    }

    impl Surface for RecordingSurface {
        fn fill_rect(&mut self, rect: Rect, color: Rgb) {
            self.ops.push(DrawOp::Rect(rect, color));
        }

        fn fill_rounded_rect(&mut self, rect: Rect, _corner_radius: f32, color: Rgb) {
            self.ops.push(DrawOp::RoundedRect(rect, color));
        }

        fn fill_circle(&mut self, center: Point, _diameter: f32, color: Rgb) {
            self.ops.push(DrawOp::Circle(center, color));
        }

        fn line(&mut self, from: Point, to: Point, _width: f32, _color: Rgb) {
            self.ops.push(DrawOp::Line(from, to));
        }

        fn polyline(&mut self, points: &[Point], _width: f32, color: Rgb) {
            self.ops.push(DrawOp::Polyline(points.len(), color));
        }

        fn icon(&mut self, icon: Icon, rect: Rect) {
            self.ops.push(DrawOp::Icon(icon, rect));
        }
    }
}

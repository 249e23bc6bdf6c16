//! Screen geometry and hit-testing primitives

use serde::{Deserialize, Serialize};

/// A point in canvas coordinates (pixels, origin top-left)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub min: Point,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { min: Point::new(x, y), width, height }
    }

    pub fn square(origin: Point, size: f32) -> Self {
        Self { min: origin, width: size, height: size }
    }

    pub fn left(&self) -> f32 {
        self.min.x
    }

    pub fn top(&self) -> f32 {
        self.min.y
    }

    pub fn right(&self) -> f32 {
        self.min.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.min.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.min.x + self.width / 2.0, self.min.y + self.height / 2.0)
    }

    /// Strict containment: points on the edge are outside
    pub fn contains(&self, p: Point) -> bool {
        p.x > self.left() && p.x < self.right() && p.y > self.top() && p.y < self.bottom()
    }

    /// Shrink on all sides by `amount`
    pub fn inset(&self, amount: f32) -> Self {
        Self::new(
            self.min.x + amount,
            self.min.y + amount,
            (self.width - amount * 2.0).max(0.0),
            (self.height - amount * 2.0).max(0.0),
        )
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }
}

/// The four stacked controls of a slot, top to bottom
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControlRegion {
    Record,
    Play,
    Loop,
    Export,
}

impl ControlRegion {
    pub const ALL: [ControlRegion; 4] = [Self::Record, Self::Play, Self::Loop, Self::Export];

    /// Position in the stack (0 = top)
    pub fn row(self) -> usize {
        match self {
            Self::Record => 0,
            Self::Play => 1,
            Self::Loop => 2,
            Self::Export => 3,
        }
    }
}

/// Button geometry shared by every slot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlotGeometry {
    pub button_size: f32,
    pub button_margin: f32,
    /// Distance from the slot anchor to the top of the first control
    pub offset_y: f32,
}

impl Default for SlotGeometry {
    fn default() -> Self {
        Self {
            button_size: 50.0,
            button_margin: 10.0,
            offset_y: 60.0,
        }
    }
}

impl SlotGeometry {
    /// Rectangle of a control for a slot anchored at `anchor`
    pub fn control_rect(&self, anchor: Point, region: ControlRegion) -> Rect {
        let step = self.button_size + self.button_margin;
        let top = anchor.y + self.offset_y + step * region.row() as f32;
        Rect::new(anchor.x, top, self.button_size, self.button_size)
    }

    /// The file label sits at the anchor, above the control stack
    pub fn label_rect(&self, anchor: Point) -> Rect {
        Rect::square(anchor, self.button_size)
    }

    /// Which control, if any, contains `p`
    pub fn region_at(&self, anchor: Point, p: Point) -> Option<ControlRegion> {
        ControlRegion::ALL
            .into_iter()
            .find(|region| self.control_rect(anchor, *region).contains(p))
    }
}

//! egui painter behind the bank's drawing contract

use egui::{Align2, Color32, FontId, Painter, Pos2, Shape, Stroke, Vec2};
use soundbank_core::{Icon, Point, Rect, Rgb, Surface};

const ICON_COLOR: Color32 = Color32::from_gray(40);

/// Draws canvas coordinates offset from the painter's origin
pub struct CanvasPainter<'a> {
    painter: &'a Painter,
    origin: Pos2,
}

impl<'a> CanvasPainter<'a> {
    pub fn new(painter: &'a Painter, origin: Pos2) -> Self {
        Self { painter, origin }
    }

    fn pos(&self, p: Point) -> Pos2 {
        self.origin + Vec2::new(p.x, p.y)
    }

    fn rect(&self, r: Rect) -> egui::Rect {
        egui::Rect::from_min_size(self.pos(r.min), Vec2::new(r.width, r.height))
    }
}

fn color(c: Rgb) -> Color32 {
    Color32::from_rgb(c.0, c.1, c.2)
}

pub fn glyph(icon: Icon) -> &'static str {
    match icon {
        Icon::Record => "⏺",
        Icon::Play => "▶",
        Icon::Loop => "🔁",
        Icon::Download => "⬇",
        Icon::DownloadAll => "⏬",
        Icon::Monitor => "🎤",
        Icon::Open => "📂",
    }
}

impl Surface for CanvasPainter<'_> {
    fn fill_rect(&mut self, rect: Rect, c: Rgb) {
        self.painter.rect_filled(self.rect(rect), 0.0, color(c));
    }

    fn fill_rounded_rect(&mut self, rect: Rect, corner_radius: f32, c: Rgb) {
        self.painter.rect_filled(self.rect(rect), corner_radius, color(c));
    }

    fn fill_circle(&mut self, center: Point, diameter: f32, c: Rgb) {
        self.painter.circle_filled(self.pos(center), diameter / 2.0, color(c));
    }

    fn line(&mut self, from: Point, to: Point, width: f32, c: Rgb) {
        self.painter
            .line_segment([self.pos(from), self.pos(to)], Stroke::new(width, color(c)));
    }

    fn polyline(&mut self, points: &[Point], width: f32, c: Rgb) {
        let points: Vec<Pos2> = points.iter().map(|p| self.pos(*p)).collect();
        self.painter.add(Shape::line(points, Stroke::new(width, color(c))));
    }

    fn icon(&mut self, icon: Icon, rect: Rect) {
        let rect = self.rect(rect);
        self.painter.text(
            rect.center(),
            Align2::CENTER_CENTER,
            glyph(icon),
            FontId::proportional(rect.height() * 0.7),
            ICON_COLOR,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_icon_has_its_own_glyph() {
        let icons = [
            Icon::Record,
            Icon::Play,
            Icon::Loop,
            Icon::Download,
            Icon::DownloadAll,
            Icon::Monitor,
            Icon::Open,
        ];
        let glyphs: HashSet<&str> = icons.iter().map(|i| glyph(*i)).collect();
        assert_eq!(glyphs.len(), icons.len());
        assert!(glyphs.iter().all(|g| !g.is_empty()));
    }

    #[test]
    fn test_color_conversion() {
        assert_eq!(color(Rgb(255, 72, 176)), Color32::from_rgb(255, 72, 176));
    }
}

//! UI panels

mod canvas;

pub use canvas::CanvasPainter;

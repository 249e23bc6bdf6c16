//! Self-monitoring toggle

use tracing::info;

use crate::error::Result;
use crate::layout::{Point, Rect};
use crate::platform::MicRouting;
use crate::surface::{Icon, Surface, Theme};

pub struct MonitorToggle {
    rect: Rect,
    enabled: bool,
}

impl MonitorToggle {
    pub fn new(origin: Point, size: f32) -> Self {
        Self {
            rect: Rect::square(origin, size),
            enabled: false,
        }
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn contains(&self, p: Point) -> bool {
        self.rect.contains(p)
    }

    /// Route the microphone to the output, or stop routing it. The flag only
    /// changes once the routing call succeeds.
    pub fn toggle(&mut self, route: &mut dyn MicRouting) -> Result<bool> {
        let enable = !self.enabled;
        if enable {
            route.connect_monitor()?;
        } else {
            route.disconnect_monitor()?;
        }
        self.enabled = enable;
        info!(enabled = enable, "Monitoring toggled");
        Ok(enable)
    }

    pub fn render(&self, surface: &mut dyn Surface, theme: &Theme) {
        let color = if self.enabled { theme.monitoring } else { theme.idle };
        surface.fill_rounded_rect(self.rect, theme.corner_radius, color);
        surface.icon(Icon::Monitor, self.rect.inset(theme.icon_inset));
    }
}

//! Microphone volume meter
//!
//! Horizontal bar filled to `min(100, volume)` percent.

use crate::ui::theme::Theme;
use egui::{self, Rect, Sense, Vec2};

/// Fraction of the meter to fill for a display volume
pub fn fill_fraction(volume: f32) -> f32 {
    if volume.is_finite() {
        (volume / 100.0).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Volume meter component
pub struct VolumeMeter<'a> {
    volume: f32,
    theme: &'a Theme,
    height: f32,
}

impl<'a> VolumeMeter<'a> {
    pub fn new(volume: f32, theme: &'a Theme) -> Self {
        Self {
            volume,
            theme,
            height: 6.0,
        }
    }

    pub fn height(mut self, height: f32) -> Self {
        self.height = height;
        self
    }

    pub fn show(self, ui: &mut egui::Ui) -> egui::Response {
        let desired_size = Vec2::new(ui.available_width(), self.height);
        let (rect, response) = ui.allocate_exact_size(desired_size, Sense::hover());

        if ui.is_rect_visible(rect) {
            let painter = ui.painter();
            let rounding = self.height / 2.0;
            painter.rect_filled(rect, rounding, self.theme.meter_inactive);

            let fill = fill_fraction(self.volume);
            if fill > 0.0 {
                let filled = Rect::from_min_size(rect.min, Vec2::new(rect.width() * fill, rect.height()));
                painter.rect_filled(filled, rounding, self.theme.meter_active);
            }
        }

        response.on_hover_text(format!("{:.0}", self.volume))
    }
}

//! Theme and styling for the console
//!
//! Colors, spacing and text styles applied once at startup.

use crate::live::state::SessionStatus;
use egui::{Color32, FontFamily, FontId, Rounding, Stroke, Vec2, Visuals};

/// Colors and spacing shared by every panel
#[derive(Clone, Debug)]
pub struct Theme {
    /// Primary accent color
    pub primary: Color32,
    /// Accent for live/market signals
    pub signal: Color32,
    pub success: Color32,
    pub warning: Color32,
    pub error: Color32,

    /// Background colors
    pub bg_primary: Color32,
    pub bg_secondary: Color32,
    pub bg_tertiary: Color32,

    /// Text colors
    pub text_primary: Color32,
    pub text_secondary: Color32,
    pub text_muted: Color32,

    /// Live director status colors
    pub listening: Color32,
    pub speaking: Color32,

    /// Volume meter colors
    pub meter_active: Color32,
    pub meter_inactive: Color32,

    /// Series colors for the projection chart
    pub series_a: Color32,
    pub series_b: Color32,

    pub button_rounding: Rounding,
    pub card_rounding: Rounding,

    pub spacing: f32,
    pub spacing_lg: f32,
    pub spacing_sm: f32,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    /// Slate dashboard palette
    pub fn dark() -> Self {
        Self {
            primary: Color32::from_rgb(99, 102, 241),  // Indigo
            signal: Color32::from_rgb(16, 185, 129),   // Emerald
            success: Color32::from_rgb(34, 197, 94),
            warning: Color32::from_rgb(245, 158, 11),
            error: Color32::from_rgb(244, 63, 94),     // Rose

            bg_primary: Color32::from_rgb(2, 6, 23),     // Slate 950
            bg_secondary: Color32::from_rgb(15, 23, 42), // Slate 900
            bg_tertiary: Color32::from_rgb(30, 41, 59),  // Slate 800

            text_primary: Color32::from_rgb(241, 245, 249),
            text_secondary: Color32::from_rgb(203, 213, 225),
            text_muted: Color32::from_rgb(100, 116, 139),

            listening: Color32::from_rgb(16, 185, 129),
            speaking: Color32::from_rgb(99, 102, 241),

            meter_active: Color32::from_rgb(16, 185, 129),
            meter_inactive: Color32::from_rgb(51, 65, 85),

            series_a: Color32::from_rgb(99, 102, 241),
            series_b: Color32::from_rgb(244, 63, 94),

            button_rounding: Rounding::same(10.0),
            card_rounding: Rounding::same(16.0),

            spacing: 16.0,
            spacing_lg: 24.0,
            spacing_sm: 8.0,
        }
    }

    /// Color used to render a live session status
    pub fn status_color(&self, status: SessionStatus) -> Color32 {
        match status {
            SessionStatus::Disconnected => self.text_muted,
            SessionStatus::Connecting => self.warning,
            SessionStatus::Listening => self.listening,
            SessionStatus::Speaking => self.speaking,
        }
    }

    /// Green for gains, red for losses
    pub fn delta_color(&self, delta: f64) -> Color32 {
        if delta >= 0.0 {
            self.success
        } else {
            self.error
        }
    }

    /// Install the palette and spacing on the egui context
    pub fn apply(&self, ctx: &egui::Context) {
        ctx.set_visuals(self.visuals());
        ctx.style_mut(|style| {
            style.spacing.item_spacing = Vec2::new(self.spacing_sm, self.spacing_sm * 0.75);
            style.spacing.button_padding = Vec2::new(self.spacing * 0.75, self.spacing_sm * 0.75);
            style.spacing.window_margin = egui::Margin::same(self.spacing_lg);

            for (text_style, size, family) in [
                (egui::TextStyle::Heading, 22.0, FontFamily::Proportional),
                (egui::TextStyle::Body, 14.0, FontFamily::Proportional),
                (egui::TextStyle::Monospace, 13.0, FontFamily::Monospace),
                (egui::TextStyle::Button, 13.0, FontFamily::Proportional),
                (egui::TextStyle::Small, 11.0, FontFamily::Proportional),
            ] {
                style.text_styles.insert(text_style, FontId::new(size, family));
            }
        });
    }

    fn visuals(&self) -> Visuals {
        let mut visuals = Visuals::dark();
        visuals.panel_fill = self.bg_primary;
        visuals.window_fill = self.bg_secondary;
        visuals.faint_bg_color = self.bg_secondary;
        visuals.extreme_bg_color = self.bg_primary;
        visuals.hyperlink_color = self.signal;
        visuals.window_rounding = self.card_rounding;
        visuals.window_stroke = Stroke::new(1.0, self.bg_tertiary);
        visuals.selection.bg_fill = self.primary.gamma_multiply(0.35);
        visuals.selection.stroke = Stroke::new(1.0, self.text_primary);

        let widgets = &mut visuals.widgets;
        for (widget, fill, text) in [
            (&mut widgets.noninteractive, self.bg_secondary, self.text_muted),
            (&mut widgets.inactive, self.bg_tertiary, self.text_secondary),
            (&mut widgets.hovered, self.primary.gamma_multiply(0.7), self.text_primary),
            (&mut widgets.active, self.primary, self.text_primary),
        ] {
            widget.bg_fill = fill;
            widget.weak_bg_fill = fill;
            widget.fg_stroke = Stroke::new(1.0, text);
            widget.rounding = self.button_rounding;
        }

        visuals
    }

    /// Card frame used by every panel section
    pub fn card(&self) -> egui::Frame {
        egui::Frame::none()
            .fill(self.bg_secondary)
            .rounding(self.card_rounding)
            .stroke(Stroke::new(1.0, self.bg_tertiary))
            .inner_margin(self.spacing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_colors_are_distinct() {
        let theme = Theme::dark();
        assert_ne!(
            theme.status_color(SessionStatus::Listening),
            theme.status_color(SessionStatus::Speaking)
        );
        assert_eq!(theme.status_color(SessionStatus::Disconnected), theme.text_muted);
    }

    #[test]
    fn test_delta_color() {
        let theme = Theme::dark();
        assert_eq!(theme.delta_color(2.1), theme.success);
        assert_eq!(theme.delta_color(-4.5), theme.error);
    }
}

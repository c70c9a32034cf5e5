//! Intelligence hub: trend cards and the weekly projection

use crate::studio::types::{DataPoint, Language, TrendMetric};
use crate::ui::state::AppState;
use crate::ui::theme::Theme;
use egui::{self, Color32, Pos2, Rect, RichText, Sense, Shape, Stroke, Vec2};

/// Dashboard component
pub struct Dashboard<'a> {
    state: &'a AppState,
    theme: &'a Theme,
}

impl<'a> Dashboard<'a> {
    pub fn new(state: &'a AppState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    pub fn show(self, ui: &mut egui::Ui) {
        ui.columns(self.state.trends.len().max(1), |columns| {
            for (column, metric) in columns.iter_mut().zip(&self.state.trends) {
                self.metric_card(column, metric);
            }
        });

        ui.add_space(self.theme.spacing);

        self.theme.card().show(ui, |ui| {
            let title = match self.state.language {
                Language::Es => "Proyección Electoral",
                Language::En => "Election Projection",
            };
            ui.label(RichText::new(title).strong().color(self.theme.text_primary));
            ui.add_space(self.theme.spacing_sm);
            self.projection_chart(ui, &self.state.projection);
        });
    }

    fn metric_card(&self, ui: &mut egui::Ui, metric: &TrendMetric) {
        self.theme.card().show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.label(
                    RichText::new(metric.category.to_uppercase())
                        .small()
                        .color(self.theme.text_muted),
                );
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(
                        RichText::new(format_delta(metric.delta))
                            .strong()
                            .color(self.theme.delta_color(metric.delta)),
                    );
                });
            });
            ui.label(RichText::new(&metric.name).strong().color(self.theme.text_primary));
            ui.label(
                RichText::new(format!("{}", metric.value))
                    .size(22.0)
                    .family(egui::FontFamily::Monospace)
                    .color(self.theme.text_secondary),
            );
        });
    }

    fn projection_chart(&self, ui: &mut egui::Ui, data: &[DataPoint]) {
        let desired_size = Vec2::new(ui.available_width(), 220.0);
        let (rect, response) = ui.allocate_exact_size(desired_size, Sense::hover());
        let painter = ui.painter();
        painter.rect_filled(rect, self.theme.card_rounding, self.theme.bg_primary);

        let plot = rect.shrink2(Vec2::new(16.0, 24.0));
        let max = data
            .iter()
            .flat_map(|p| std::iter::once(p.value).chain(p.value2))
            .fold(0.0_f64, f64::max);

        let primary: Vec<f64> = data.iter().map(|p| p.value).collect();
        let secondary: Vec<f64> = data.iter().filter_map(|p| p.value2).collect();
        self.draw_series(painter, plot, &primary, max, self.theme.series_a);
        if secondary.len() == data.len() {
            self.draw_series(painter, plot, &secondary, max, self.theme.series_b);
        }

        for (point, pos) in data.iter().zip(chart_points(plot, &primary, max)) {
            painter.text(
                Pos2::new(pos.x, rect.bottom() - 8.0),
                egui::Align2::CENTER_CENTER,
                &point.time,
                egui::FontId::proportional(10.0),
                self.theme.text_muted,
            );
        }

        if let Some(hover) = response.hover_pos() {
            let nearest = chart_points(plot, &primary, max)
                .into_iter()
                .enumerate()
                .min_by(|(_, a), (_, b)| (a.x - hover.x).abs().total_cmp(&(b.x - hover.x).abs()));
            if let Some((i, _)) = nearest {
                let point = &data[i];
                response.on_hover_text(format!(
                    "{}: {} / {}",
                    point.time,
                    point.value,
                    point.value2.map(|v| v.to_string()).unwrap_or_default()
                ));
            }
        }
    }

    fn draw_series(&self, painter: &egui::Painter, plot: Rect, values: &[f64], max: f64, color: Color32) {
        let points = chart_points(plot, values, max);
        for pos in &points {
            painter.circle_filled(*pos, 3.0, color);
        }
        painter.add(Shape::line(points, Stroke::new(2.0, color)));
    }
}

/// `+2.1%` / `-4.5%`
pub fn format_delta(delta: f64) -> String {
    if delta > 0.0 {
        format!("+{}%", delta)
    } else {
        format!("{}%", delta)
    }
}

/// Map values onto evenly spaced positions inside `plot`, 0 at the bottom
pub fn chart_points(plot: Rect, values: &[f64], max: f64) -> Vec<Pos2> {
    if values.is_empty() {
        return Vec::new();
    }

    let step = if values.len() > 1 {
        plot.width() / (values.len() - 1) as f32
    } else {
        0.0
    };
    let scale = if max > 0.0 { plot.height() / max as f32 } else { 0.0 };

    values
        .iter()
        .enumerate()
        .map(|(i, v)| Pos2::new(plot.left() + step * i as f32, plot.bottom() - *v as f32 * scale))
        .collect()
}

//! Live director panel
//!
//! Connect/end button, status pill, volume meter and transcript.

use crate::live::state::SessionStatus;
use crate::studio::types::Language;
use crate::ui::components::VolumeMeter;
use crate::ui::state::AppState;
use crate::ui::theme::Theme;
use egui::{self, Align, Layout, RichText, ScrollArea, Sense, Vec2};

/// Live director component
pub struct LivePanel<'a> {
    state: &'a mut AppState,
    theme: &'a Theme,
}

impl<'a> LivePanel<'a> {
    pub fn new(state: &'a mut AppState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    pub fn show(self, ui: &mut egui::Ui) {
        let Self { state, theme } = self;
        let snapshot = state.live_snapshot();
        let status = snapshot.status();
        let es = state.language == Language::Es;

        theme.card().show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.vertical(|ui| {
                    ui.heading(RichText::new("Live Director").color(theme.text_primary));
                    ui.label(
                        RichText::new(if es {
                            "Habla con tu director creativo en tiempo real"
                        } else {
                            "Talk to your creative director in real time"
                        })
                        .color(theme.text_muted),
                    );
                });

                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    status_pill(ui, theme, status, es);
                });
            });

            ui.add_space(theme.spacing_lg);

            ui.vertical_centered(|ui| {
                draw_orb(ui, theme, status);
                ui.add_space(theme.spacing);

                let enabled = state.has_live() && status != SessionStatus::Connecting;
                let label = match (status.is_active(), es) {
                    (false, true) => "▶ Conectar en vivo",
                    (false, false) => "▶ Connect live",
                    (true, true) => "■ Terminar sesión",
                    (true, false) => "■ End session",
                };
                if ui.add_enabled(enabled, egui::Button::new(label)).clicked() {
                    state.toggle_live();
                }
            });

            if snapshot.connected {
                ui.add_space(theme.spacing);
                VolumeMeter::new(snapshot.volume, theme).show(ui);
                ui.vertical_centered(|ui| {
                    let text = match (status == SessionStatus::Speaking, es) {
                        (true, true) => "EL AGENTE ESTÁ HABLANDO",
                        (true, false) => "AGENT SPEAKING",
                        (false, true) => "ESCUCHANDO",
                        (false, false) => "LISTENING",
                    };
                    ui.label(RichText::new(text).small().strong().color(theme.text_muted));
                });
            }

            if let Some(error) = snapshot.last_error.as_ref().filter(|_| !snapshot.connected) {
                ui.add_space(theme.spacing_sm);
                ui.label(RichText::new(format!("⚠ {}", error)).small().color(theme.error));
            }
        });

        ui.add_space(theme.spacing);
        show_transcript(ui, theme, state, es);
    }
}

fn status_pill(ui: &mut egui::Ui, theme: &Theme, status: SessionStatus, es: bool) {
    let text = match (status, es) {
        (SessionStatus::Disconnected, true) => "Desconectado".to_string(),
        (SessionStatus::Disconnected, false) => "Offline".to_string(),
        (SessionStatus::Connecting, true) => "Conectando…".to_string(),
        (status, _) => status.to_string(),
    };
    let color = theme.status_color(status);

    egui::Frame::none()
        .fill(color.gamma_multiply(0.2))
        .rounding(theme.button_rounding)
        .inner_margin(egui::Margin::symmetric(10.0, 4.0))
        .show(ui, |ui| {
            ui.label(RichText::new(text).small().strong().color(color));
        });
}

fn draw_orb(ui: &mut egui::Ui, theme: &Theme, status: SessionStatus) {
    let (rect, _) = ui.allocate_exact_size(Vec2::splat(128.0), Sense::hover());
    let painter = ui.painter();
    let center = rect.center();

    let inner = match status {
        SessionStatus::Speaking => theme.speaking,
        _ => theme.bg_tertiary,
    };
    painter.circle_filled(center, 48.0, inner);

    if status.is_active() {
        let t = ui.ctx().input(|i| i.time);
        let pulse = ((t * 1.5).sin() * 0.5 + 0.5) as f32;
        painter.circle_stroke(
            center,
            52.0 + pulse * 10.0,
            egui::Stroke::new(2.0, theme.status_color(status).gamma_multiply(0.3 + pulse * 0.3)),
        );
    }
}

fn show_transcript(ui: &mut egui::Ui, theme: &Theme, state: &AppState, es: bool) {
    theme.card().show(ui, |ui| {
        ui.label(
            RichText::new(if es { "Transcripción" } else { "Transcript" })
                .strong()
                .color(theme.text_secondary),
        );
        ui.separator();

        ScrollArea::vertical()
            .id_salt("live_transcript")
            .max_height(240.0)
            .auto_shrink([false, true])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                if state.transcript.is_empty() {
                    ui.label(
                        RichText::new(if es { "Sin texto todavía" } else { "Nothing yet" })
                            .italics()
                            .color(theme.text_muted),
                    );
                }
                for line in &state.transcript {
                    ui.label(RichText::new(line).color(theme.text_primary));
                }
            });
    });
}

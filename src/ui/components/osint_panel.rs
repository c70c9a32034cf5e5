//! OSINT lab: free-form research query and its grounded report

use crate::ui::state::{AppState, PendingRequest};
use crate::ui::theme::Theme;
use egui::{self, Key, RichText, ScrollArea, TextEdit};

/// OSINT lab component
pub struct OsintPanel<'a> {
    state: &'a mut AppState,
    theme: &'a Theme,
}

impl<'a> OsintPanel<'a> {
    pub fn new(state: &'a mut AppState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    pub fn show(self, ui: &mut egui::Ui) {
        let Self { state, theme } = self;
        let busy = state.is_pending(PendingRequest::Osint);

        theme.card().show(ui, |ui| {
            ui.horizontal(|ui| {
                let input = ui.add(
                    TextEdit::singleline(&mut state.osint_query)
                        .hint_text("Inject topic for deep verification (e.g. 'Consumer behavior in LatAm crypto markets')...")
                        .font(egui::TextStyle::Monospace)
                        .desired_width(ui.available_width() - 180.0),
                );
                let submitted = input.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter));

                let enabled = !busy && !state.osint_query.trim().is_empty();
                let clicked = ui
                    .add_enabled(enabled, egui::Button::new("🔬 Deep Verification"))
                    .clicked();
                if busy {
                    ui.spinner();
                }

                if clicked || (submitted && enabled) {
                    state.run_osint();
                }
            });
        });

        ui.add_space(theme.spacing);

        theme.card().show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.label(
                    RichText::new("SYNTHETIC INTELLIGENCE REPORT")
                        .small()
                        .strong()
                        .color(theme.text_muted),
                );
                if state.osint_report.is_some() {
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(RichText::new("● SIGNALS_VERIFIED").small().color(theme.signal));
                    });
                }
            });
            ui.separator();

            ScrollArea::vertical()
                .id_salt("osint_report")
                .auto_shrink([false, false])
                .show(ui, |ui| match &state.osint_report {
                    None if busy => {
                        ui.spinner();
                    }
                    None => {
                        ui.vertical_centered(|ui| {
                            ui.add_space(theme.spacing_lg);
                            ui.label(RichText::new("AWAITING SIGNAL INPUT").color(theme.text_muted));
                        });
                    }
                    Some(report) => {
                        ui.label(RichText::new(&report.query).strong().color(theme.text_primary));
                        ui.add_space(theme.spacing_sm);
                        ui.label(RichText::new(&report.analysis).color(theme.text_secondary));

                        if !report.sources.is_empty() {
                            ui.add_space(theme.spacing);
                            ui.label(RichText::new("Sources").small().strong().color(theme.text_muted));
                            for source in &report.sources {
                                ui.hyperlink_to(&source.title, &source.uri);
                            }
                        }
                    }
                });
        });
    }
}

//! Campaign builder
//!
//! Left column edits the targeting and brief, right column lists generated ads.

use crate::studio::types::{AdObjective, ConsumerSentiment, GeneratedContent, Language, ModelType, Platform};
use crate::ui::state::{AppState, PendingRequest};
use crate::ui::theme::Theme;
use egui::{self, RichText, ScrollArea, TextEdit};

/// Campaign builder component
pub struct CampaignPanel<'a> {
    state: &'a mut AppState,
    theme: &'a Theme,
}

impl<'a> CampaignPanel<'a> {
    pub fn new(state: &'a mut AppState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    pub fn show(self, ui: &mut egui::Ui) {
        let Self { state, theme } = self;

        ui.columns(2, |columns| {
            ScrollArea::vertical()
                .id_salt("campaign_form")
                .show(&mut columns[0], |ui| {
                    social_section(ui, state, theme);
                    ui.add_space(theme.spacing);
                    brief_section(ui, state, theme);
                    ui.add_space(theme.spacing);
                    targeting_section(ui, state, theme);
                });

            ScrollArea::vertical()
                .id_salt("campaign_results")
                .show(&mut columns[1], |ui| {
                    results_section(ui, state, theme);
                });
        });
    }
}

fn es(state: &AppState) -> bool {
    state.language == Language::Es
}

fn busy_button(ui: &mut egui::Ui, label: &str, busy: bool, enabled: bool) -> bool {
    ui.horizontal(|ui| {
        let clicked = ui.add_enabled(enabled && !busy, egui::Button::new(label)).clicked();
        if busy {
            ui.spinner();
        }
        clicked
    })
    .inner
}

fn social_section(ui: &mut egui::Ui, state: &mut AppState, theme: &Theme) {
    let es = es(state);
    theme.card().show(ui, |ui| {
        ui.label(
            RichText::new(if es { "Ingestión de Referencia Social" } else { "Social Reference Ingestion" })
                .strong()
                .color(theme.text_primary),
        );
        ui.add(
            TextEdit::singleline(&mut state.campaign.social_url)
                .hint_text("URL (X, LinkedIn, Post...)")
                .desired_width(f32::INFINITY),
        );

        let busy = state.is_pending(PendingRequest::Social);
        let enabled = !state.campaign.social_url.trim().is_empty();
        if busy_button(ui, if es { "Analizar" } else { "Analyze" }, busy, enabled) {
            state.analyze_social();
        }
    });
}

fn brief_section(ui: &mut egui::Ui, state: &mut AppState, theme: &Theme) {
    let es = es(state);
    theme.card().show(ui, |ui| {
        ui.label(
            RichText::new(if es { "Brief Maestro" } else { "Master Brief" })
                .strong()
                .color(theme.text_primary),
        );
        ui.add(
            TextEdit::multiline(&mut state.campaign.brief)
                .desired_rows(6)
                .desired_width(f32::INFINITY)
                .hint_text(if es {
                    "Describe el producto, la audiencia y el contexto..."
                } else {
                    "Describe the product, audience and context..."
                }),
        );

        let busy = state.is_pending(PendingRequest::Orchestrate);
        let enabled = !state.campaign.brief.trim().is_empty();
        if busy_button(ui, if es { "✨ Orquestar con IA" } else { "✨ AI Orchestration" }, busy, enabled) {
            state.orchestrate();
        }
    });
}

fn targeting_section(ui: &mut egui::Ui, state: &mut AppState, theme: &Theme) {
    let es = es(state);
    theme.card().show(ui, |ui| {
        ui.label(
            RichText::new(if es { "Parámetros de Estrategia" } else { "Strategy Parameters" })
                .strong()
                .color(theme.text_primary),
        );

        egui::Grid::new("targeting_grid")
            .num_columns(2)
            .spacing([12.0, 8.0])
            .show(ui, |ui| {
                ui.label(if es { "Plataforma" } else { "Platform" });
                egui::ComboBox::from_id_salt("platform")
                    .selected_text(state.campaign.platform.label())
                    .show_ui(ui, |ui| {
                        for platform in Platform::ALL {
                            ui.selectable_value(&mut state.campaign.platform, platform, platform.label());
                        }
                    });
                ui.end_row();

                ui.label(if es { "Objetivo" } else { "Objective" });
                egui::ComboBox::from_id_salt("objective")
                    .selected_text(state.campaign.strategy.objective.label())
                    .show_ui(ui, |ui| {
                        for objective in AdObjective::ALL {
                            ui.selectable_value(
                                &mut state.campaign.strategy.objective,
                                objective,
                                objective.label(),
                            );
                        }
                    });
                ui.end_row();

                ui.label(if es { "Sentimiento" } else { "Sentiment" });
                egui::ComboBox::from_id_salt("sentiment")
                    .selected_text(state.campaign.strategy.sentiment.label())
                    .show_ui(ui, |ui| {
                        for sentiment in ConsumerSentiment::ALL {
                            ui.selectable_value(
                                &mut state.campaign.strategy.sentiment,
                                sentiment,
                                sentiment.label(),
                            );
                        }
                    });
                ui.end_row();

                ui.label(if es { "Segmento" } else { "Segment" });
                ui.text_edit_singleline(&mut state.campaign.strategy.segment);
                ui.end_row();

                ui.label(if es { "Señal externa" } else { "External signal" });
                ui.text_edit_singleline(&mut state.campaign.strategy.external_signal);
                ui.end_row();

                ui.label(if es { "Modelo" } else { "Model" });
                ui.horizontal(|ui| {
                    ui.selectable_value(&mut state.campaign.model, ModelType::Pro, "Pro");
                    ui.selectable_value(&mut state.campaign.model, ModelType::Flash, "Flash");
                });
                ui.end_row();
            });

        let busy = state.is_pending(PendingRequest::Signal);
        let enabled = !state.campaign.strategy.external_signal.trim().is_empty();
        if busy_button(ui, if es { "📡 Escanear señal" } else { "📡 Scan signal" }, busy, enabled) {
            state.scan_signal();
        }

        if !state.verified_sources.is_empty() {
            ui.add_space(theme.spacing_sm);
            ui.label(
                RichText::new(if es { "Fuentes verificadas" } else { "Verified sources" })
                    .small()
                    .color(theme.text_muted),
            );
            for source in &state.verified_sources {
                ui.hyperlink_to(&source.title, &source.uri);
            }
        }

        ui.add_space(theme.spacing);
        let busy = state.is_pending(PendingRequest::Ad);
        let enabled = !state.campaign.brief.trim().is_empty();
        if busy_button(ui, if es { "🚀 Generar anuncio" } else { "🚀 Generate ad" }, busy, enabled) {
            state.generate_ad();
        }
    });
}

fn results_section(ui: &mut egui::Ui, state: &AppState, theme: &Theme) {
    if state.generated.is_empty() {
        theme.card().show(ui, |ui| {
            ui.label(
                RichText::new(if es(state) {
                    "Los anuncios generados aparecerán aquí"
                } else {
                    "Generated ads will appear here"
                })
                .italics()
                .color(theme.text_muted),
            );
        });
        return;
    }

    for content in &state.generated {
        ad_card(ui, content, theme, es(state));
        ui.add_space(theme.spacing_sm);
    }
}

fn ad_card(ui: &mut egui::Ui, content: &GeneratedContent, theme: &Theme, es: bool) {
    theme.card().show(ui, |ui| {
        ui.horizontal(|ui| {
            ui.label(RichText::new(content.platform.label()).strong().color(theme.primary));
            ui.label(
                RichText::new(format!(
                    "{} · {}",
                    content.strategy.objective, content.strategy.sentiment
                ))
                .small()
                .color(theme.text_muted),
            );
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(
                    RichText::new(content.timestamp.format("%H:%M").to_string())
                        .small()
                        .color(theme.text_muted),
                );
                if ui.small_button("📋").on_hover_text("Copy").clicked() {
                    ui.ctx().copy_text(content.content.clone());
                }
            });
        });

        ui.separator();
        ui.label(RichText::new(&content.content).color(theme.text_primary));
        ui.add_space(theme.spacing_sm);

        egui::CollapsingHeader::new(if es { "Razonamiento estratégico" } else { "Strategic reasoning" })
            .id_salt(&content.id)
            .show(ui, |ui| {
                ui.label(RichText::new(&content.reasoning).color(theme.text_secondary));
            });

        ui.label(
            RichText::new(content.hashtags.join(" "))
                .small()
                .color(theme.signal),
        );
    });
}

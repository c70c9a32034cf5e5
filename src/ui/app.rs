//! Main application struct and eframe integration

use crate::studio::types::Language;
use crate::ui::components::{CampaignPanel, Dashboard, LivePanel, OsintPanel};
use crate::ui::state::{AppState, Tab};
use crate::ui::theme::Theme;
use egui::{self, CentralPanel, RichText, TopBottomPanel};
use std::time::{Duration, Instant};

/// Desktop console
pub struct AdArchitectApp {
    state: AppState,
    theme: Theme,
    last_frame_time: Instant,
}

impl AdArchitectApp {
    pub fn new(cc: &eframe::CreationContext<'_>, state: AppState) -> Self {
        let theme = Theme::dark();
        theme.apply(&cc.egui_ctx);

        let mut state = state;
        state.add_log("AdArchitect UI initialized");

        Self {
            state,
            theme,
            last_frame_time: Instant::now(),
        }
    }

    fn show_header(&mut self, ctx: &egui::Context) {
        TopBottomPanel::top("header")
            .frame(egui::Frame::none().fill(self.theme.bg_secondary).inner_margin(12.0))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(
                        RichText::new("AdArchitect")
                            .size(20.0)
                            .strong()
                            .color(self.theme.text_primary),
                    );
                    ui.add_space(self.theme.spacing);

                    for tab in Tab::ALL {
                        let label = tab.label(self.state.language);
                        ui.selectable_value(&mut self.state.active_tab, tab, label);
                    }

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.selectable_value(&mut self.state.language, Language::En, "EN");
                        ui.selectable_value(&mut self.state.language, Language::Es, "ES");

                        ui.separator();

                        let status = self.state.live_status();
                        ui.label(
                            RichText::new(format!("● {}", status))
                                .small()
                                .color(self.theme.status_color(status)),
                        );

                        if self.state.pending_count() > 0 {
                            ui.spinner();
                        }

                        ui.label(
                            RichText::new(format!("{:.0} FPS", self.state.fps))
                                .size(11.0)
                                .family(egui::FontFamily::Monospace)
                                .color(self.theme.text_muted),
                        );
                    });
                });
            });
    }

    fn show_status_bar(&mut self, ctx: &egui::Context) {
        TopBottomPanel::bottom("status_bar")
            .frame(egui::Frame::none().fill(self.theme.bg_secondary).inner_margin(6.0))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    if let Some(error) = self.state.last_error.clone() {
                        ui.label(RichText::new(format!("⚠ {}", error)).small().color(self.theme.error));
                        if ui.small_button("✕").clicked() {
                            self.state.last_error = None;
                        }
                    } else if let Some(last) = self.state.logs.back() {
                        ui.label(
                            RichText::new(last)
                                .small()
                                .family(egui::FontFamily::Monospace)
                                .color(self.theme.text_muted),
                        );
                    }
                });
            });
    }

    fn show_content(&mut self, ctx: &egui::Context) {
        CentralPanel::default()
            .frame(egui::Frame::none().fill(self.theme.bg_primary).inner_margin(self.theme.spacing))
            .show(ctx, |ui| match self.state.active_tab {
                Tab::Dashboard => Dashboard::new(&self.state, &self.theme).show(ui),
                Tab::Campaigns => CampaignPanel::new(&mut self.state, &self.theme).show(ui),
                Tab::Live => LivePanel::new(&mut self.state, &self.theme).show(ui),
                Tab::Osint => OsintPanel::new(&mut self.state, &self.theme).show(ui),
            });
    }
}

impl eframe::App for AdArchitectApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        let delta = now.duration_since(self.last_frame_time).as_secs_f64();
        self.last_frame_time = now;
        self.state.update_fps(delta);

        self.state.poll_events();

        self.show_header(ctx);
        self.show_status_bar(ctx);
        self.show_content(ctx);

        // Backend events arrive off the UI thread
        if self.state.needs_repaint() {
            ctx.request_repaint_after(Duration::from_millis(50));
        } else {
            ctx.request_repaint_after(Duration::from_millis(500));
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.state.add_log("AdArchitect shutting down");
    }
}

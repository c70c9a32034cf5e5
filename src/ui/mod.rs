//! Desktop UI with egui/eframe

mod app;
mod components;
pub mod state;
mod theme;

pub use app::AdArchitectApp;
pub use state::{AppState, CampaignForm, PendingRequest, Tab};
pub use theme::Theme;

/// Run the console until the window closes
pub fn run(state: AppState) -> eframe::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 820.0])
            .with_min_inner_size([900.0, 600.0])
            .with_title("AdArchitect"),
        ..Default::default()
    };

    eframe::run_native(
        "AdArchitect",
        options,
        Box::new(|cc| Ok(Box::new(AdArchitectApp::new(cc, state)))),
    )
}

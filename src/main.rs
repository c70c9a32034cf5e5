use adarchitect::audio::default_backend;
use adarchitect::integration::{AppConfig, API_KEY_ENV};
use adarchitect::live::{LiveAgent, WebSocketConnector};
use adarchitect::studio::{GeminiClient, Studio, StudioCommand, StudioPipeline};
use adarchitect::ui::{self, AppState};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "adarchitect=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting AdArchitect");

    let config = AppConfig::load().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;
    if !config.has_api_key() {
        warn!("No API key configured; set {} or api_key in the config file", API_KEY_ENV);
    }

    let backend = default_backend(config.enable_audio_input, config.enable_audio_output);
    let connector = Arc::new(WebSocketConnector::new(
        config.live.endpoint.clone(),
        config.api_key.clone(),
    ));
    let live = LiveAgent::start(config.live.clone(), backend, connector).context("Failed to start live agent")?;

    let client = GeminiClient::new(
        config.studio.base_url.clone(),
        config.api_key.clone(),
        config.studio.request_timeout(),
    )
    .context("Failed to build Gemini client")?;
    let pipeline = StudioPipeline::new(Studio::new(Arc::new(client), config.studio.clone()));
    let commands = pipeline.command_sender();
    let events = pipeline.event_receiver();
    let studio_worker = pipeline.start_worker().context("Failed to start studio pipeline")?;

    let state = AppState::new(config.studio.language)
        .with_studio(commands.clone(), events)
        .with_live(live);

    ui::run(state).map_err(|e| anyhow::anyhow!("UI error: {}", e))?;

    let _ = commands.send(StudioCommand::Shutdown);
    let _ = studio_worker.join();

    info!("AdArchitect stopped");
    Ok(())
}

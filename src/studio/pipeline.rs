//! Studio pipeline for running generation requests off the UI thread
//!
//! Commands are handled one at a time on a worker thread that owns a tokio
//! runtime; results come back as events tagged with the request id.

use crate::studio::campaign::Studio;
use crate::studio::types::{
    AdStrategy, GeneratedContent, Language, LiveSignal, ModelType, OsintReport, Platform, SocialInsight,
    StrategySuggestion,
};
use crate::utils::channels::WorkerChannels;
use crate::{AdArchitectError, Result};
use crossbeam_channel::{Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tokio::runtime::Runtime;
use tracing::{debug, error, info};
use uuid::Uuid;

/// Commands that can be sent to the studio pipeline
#[derive(Debug, Clone)]
pub enum StudioCommand {
    /// Write an ad for the given targeting
    GenerateAd {
        platform: Platform,
        strategy: AdStrategy,
        brief: String,
        model: ModelType,
        language: Language,
        request_id: Uuid,
    },

    /// Suggest targeting parameters for a brief
    Orchestrate { brief: String, request_id: Uuid },

    /// Scan a topic for live market/OSINT signals
    ScanSignal { topic: String, request_id: Uuid },

    /// Analyze a social media link
    AnalyzeSocial { url: String, request_id: Uuid },

    /// Run an open-ended research query
    DeepOsint {
        query: String,
        language: Language,
        request_id: Uuid,
    },

    /// Shutdown the pipeline
    Shutdown,
}

/// Events emitted by the studio pipeline
#[derive(Debug, Clone)]
pub enum StudioEvent {
    AdGenerated {
        content: GeneratedContent,
        request_id: Uuid,
        /// Total generation time in milliseconds
        total_ms: u64,
    },

    ParametersSuggested {
        suggestion: StrategySuggestion,
        request_id: Uuid,
    },

    SignalScanned { signal: LiveSignal, request_id: Uuid },

    SocialAnalyzed {
        insight: SocialInsight,
        request_id: Uuid,
    },

    OsintReady { report: OsintReport, request_id: Uuid },

    /// An error occurred
    Error {
        error: String,
        request_id: Option<Uuid>,
    },

    /// Pipeline has shut down
    Shutdown,
}

/// Studio pipeline with channel-based communication
pub struct StudioPipeline {
    studio: Studio,
    channels: WorkerChannels<StudioCommand, StudioEvent>,
}

impl StudioPipeline {
    pub fn new(studio: Studio) -> Self {
        Self {
            studio,
            channels: WorkerChannels::new(100, 100),
        }
    }

    /// Get a sender for commands
    pub fn command_sender(&self) -> Sender<StudioCommand> {
        self.channels.command_tx.clone()
    }

    /// Get a receiver for events
    pub fn event_receiver(&self) -> Receiver<StudioEvent> {
        self.channels.event_rx.clone()
    }

    /// Start the pipeline worker thread
    pub fn start_worker(self) -> Result<JoinHandle<()>> {
        let studio = self.studio;
        let command_rx = self.channels.command_rx;
        let event_tx = self.channels.event_tx;

        thread::Builder::new()
            .name("adarchitect-studio".to_string())
            .spawn(move || run_worker(studio, command_rx, event_tx))
            .map_err(|e| AdArchitectError::ChannelError(format!("Failed to spawn studio worker: {}", e)))
    }
}

fn run_worker(studio: Studio, command_rx: Receiver<StudioCommand>, event_tx: Sender<StudioEvent>) {
    info!("Studio pipeline worker starting");

    let runtime = match Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            let _ = event_tx.send(StudioEvent::Error {
                error: format!("Runtime creation failed: {}", e),
                request_id: None,
            });
            let _ = event_tx.send(StudioEvent::Shutdown);
            return;
        }
    };

    info!("Studio pipeline worker ready");

    loop {
        let command = match command_rx.recv() {
            Ok(command) => command,
            Err(e) => {
                error!("Command channel error: {}", e);
                break;
            }
        };

        let event = match command {
            StudioCommand::GenerateAd {
                platform,
                strategy,
                brief,
                model,
                language,
                request_id,
            } => {
                debug!("Processing ad request: {}", request_id);
                let start = Instant::now();
                match runtime.block_on(studio.generate_advanced_ad(platform, &strategy, &brief, model, language)) {
                    Ok(content) => StudioEvent::AdGenerated {
                        content,
                        request_id,
                        total_ms: start.elapsed().as_millis() as u64,
                    },
                    Err(e) => failure(e, request_id),
                }
            }

            StudioCommand::Orchestrate { brief, request_id } => StudioEvent::ParametersSuggested {
                suggestion: runtime.block_on(studio.orchestrate_parameters(&brief)),
                request_id,
            },

            StudioCommand::ScanSignal { topic, request_id } => {
                match runtime.block_on(studio.fetch_live_signal(&topic)) {
                    Ok(signal) => StudioEvent::SignalScanned { signal, request_id },
                    Err(e) => failure(e, request_id),
                }
            }

            StudioCommand::AnalyzeSocial { url, request_id } => {
                match runtime.block_on(studio.analyze_social_context(&url)) {
                    Ok(insight) => StudioEvent::SocialAnalyzed { insight, request_id },
                    Err(e) => failure(e, request_id),
                }
            }

            StudioCommand::DeepOsint {
                query,
                language,
                request_id,
            } => match runtime.block_on(studio.deep_osint(&query, language)) {
                Ok(report) => StudioEvent::OsintReady { report, request_id },
                Err(e) => failure(e, request_id),
            },

            StudioCommand::Shutdown => {
                info!("Studio pipeline worker shutting down");
                let _ = event_tx.send(StudioEvent::Shutdown);
                break;
            }
        };

        if event_tx.send(event).is_err() {
            debug!("Studio event receiver dropped");
            break;
        }
    }

    info!("Studio pipeline worker stopped");
}

fn failure(e: AdArchitectError, request_id: Uuid) -> StudioEvent {
    error!("Studio request {} failed: {}", request_id, e);
    StudioEvent::Error {
        error: e.to_string(),
        request_id: Some(request_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integration::config::StudioConfig;
    use crate::studio::client::{ContentGenerator, GenerateRequest, GenerateResponse};
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::time::Duration;

    struct CannedGenerator(&'static str);

    #[async_trait]
    impl ContentGenerator for CannedGenerator {
        async fn generate(&self, _request: GenerateRequest) -> Result<GenerateResponse> {
            Ok(GenerateResponse {
                text: self.0.to_string(),
                sources: Vec::new(),
            })
        }
    }

    fn pipeline(text: &'static str) -> StudioPipeline {
        StudioPipeline::new(Studio::new(Arc::new(CannedGenerator(text)), StudioConfig::default()))
    }

    #[test]
    fn test_generate_ad_round_trip() {
        let pipeline = pipeline("[AD COPY] Hola [STRATEGIC REASONING] Porque sí");
        let commands = pipeline.command_sender();
        let events = pipeline.event_receiver();
        let worker = pipeline.start_worker().unwrap();

        let request_id = Uuid::new_v4();
        commands
            .send(StudioCommand::GenerateAd {
                platform: Platform::X,
                strategy: AdStrategy::default(),
                brief: "brief".to_string(),
                model: ModelType::Pro,
                language: Language::Es,
                request_id,
            })
            .unwrap();

        match events.recv_timeout(Duration::from_secs(5)).unwrap() {
            StudioEvent::AdGenerated { content, request_id: id, .. } => {
                assert_eq!(id, request_id);
                assert_eq!(content.content, "Hola");
                assert_eq!(content.reasoning, "Porque sí");
                assert_eq!(content.platform, Platform::X);
            }
            other => panic!("unexpected event {:?}", other),
        }

        commands.send(StudioCommand::Shutdown).unwrap();
        assert!(matches!(
            events.recv_timeout(Duration::from_secs(5)).unwrap(),
            StudioEvent::Shutdown
        ));
        worker.join().unwrap();
    }

    #[test]
    fn test_orchestrate_never_errors() {
        let pipeline = pipeline("garbage");
        let commands = pipeline.command_sender();
        let events = pipeline.event_receiver();
        let _worker = pipeline.start_worker().unwrap();

        commands
            .send(StudioCommand::Orchestrate {
                brief: "brief".to_string(),
                request_id: Uuid::new_v4(),
            })
            .unwrap();

        match events.recv_timeout(Duration::from_secs(5)).unwrap() {
            StudioEvent::ParametersSuggested { suggestion, .. } => assert!(suggestion.is_empty()),
            other => panic!("unexpected event {:?}", other),
        }

        commands.send(StudioCommand::Shutdown).unwrap();
    }
}

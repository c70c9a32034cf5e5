//! Integration tests for the studio
//!
//! A recording generator stands in for the REST client so the requests each
//! operation builds can be checked without a network.

use adarchitect::integration::StudioConfig;
use adarchitect::studio::client::build_body;
use adarchitect::studio::{
    AdStrategy, ConsumerSentiment, ContentGenerator, GenerateRequest, GenerateResponse, GroundingSource, Language,
    ModelType, Platform, Studio, StudioCommand, StudioEvent, StudioPipeline,
};
use adarchitect::{AdArchitectError, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Replies with canned text and remembers every request
struct RecordingGenerator {
    reply: Result<GenerateResponse>,
    requests: Mutex<Vec<GenerateRequest>>,
}

impl RecordingGenerator {
    fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(GenerateResponse {
                text: text.to_string(),
                sources: vec![GroundingSource {
                    title: "Reuters".to_string(),
                    uri: "https://reuters.com/a".to_string(),
                }],
            }),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: Err(AdArchitectError::GenerationError("HTTP 503".to_string())),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn last_request(&self) -> GenerateRequest {
        self.requests.lock().last().cloned().unwrap()
    }
}

#[async_trait]
impl ContentGenerator for RecordingGenerator {
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse> {
        self.requests.lock().push(request);
        self.reply.clone()
    }
}

fn studio(generator: Arc<RecordingGenerator>) -> Studio {
    Studio::new(generator, StudioConfig::default())
}

#[tokio::test]
async fn test_pro_ad_uses_search_and_thinking() {
    let generator = RecordingGenerator::replying("[AD COPY]\nCompra ya.\n[STRATEGIC REASONING]\nUrgencia.");
    let studio = studio(Arc::clone(&generator));

    let content = studio
        .generate_advanced_ad(
            Platform::TikTok,
            &AdStrategy::default(),
            "Fintech launch",
            ModelType::Pro,
            Language::Es,
        )
        .await
        .unwrap();

    assert_eq!(content.content, "Compra ya.");
    assert_eq!(content.reasoning, "Urgencia.");
    assert_eq!(content.hashtags, vec!["#AI", "#Context"]);

    let body = build_body(&generator.last_request());
    assert_eq!(generator.last_request().model, "gemini-3-pro-preview");
    assert_eq!(body["tools"][0]["googleSearch"], serde_json::json!({}));
    assert_eq!(body["generationConfig"]["thinkingConfig"]["thinkingBudget"], 16384);
    assert!((body["generationConfig"]["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    assert!(body["contents"][0]["parts"][0]["text"]
        .as_str()
        .unwrap()
        .contains("Fintech launch"));
}

#[tokio::test]
async fn test_flash_ad_has_no_thinking_budget() {
    let generator = RecordingGenerator::replying("Just copy");
    let studio = studio(Arc::clone(&generator));

    let content = studio
        .generate_advanced_ad(
            Platform::X,
            &AdStrategy::default(),
            "brief",
            ModelType::Flash,
            Language::En,
        )
        .await
        .unwrap();

    assert_eq!(content.content, "Just copy");
    assert_eq!(content.reasoning, "Analysis based on real-time market signals.");

    let request = generator.last_request();
    assert_eq!(request.model, "gemini-3-flash-preview");
    assert!(request.thinking_budget.is_none());
}

#[tokio::test]
async fn test_orchestration_requests_json_and_survives_failure() {
    let generator = RecordingGenerator::replying(
        r#"{"objective":"Awareness","sentiment":"Skeptical","segment":"Gen Z","externalSignal":"BTC ETF"}"#,
    );
    let suggestion = studio(Arc::clone(&generator)).orchestrate_parameters("brief").await;

    assert_eq!(
        generator.last_request().response_mime_type.as_deref(),
        Some("application/json")
    );
    assert_eq!(suggestion.sentiment, Some(ConsumerSentiment::Skeptical));
    assert_eq!(suggestion.segment.as_deref(), Some("Gen Z"));

    let failed = studio(RecordingGenerator::failing()).orchestrate_parameters("brief").await;
    assert!(failed.is_empty());
}

#[tokio::test]
async fn test_social_analysis_infers_tone_and_segment() {
    let generator = RecordingGenerator::replying("La comunidad muestra preocupación y es escéptico.");
    let insight = studio(generator)
        .analyze_social_context("https://www.linkedin.com/posts/abc")
        .await
        .unwrap();

    assert_eq!(insight.suggested_tone, ConsumerSentiment::Skeptical);
    assert_eq!(insight.suggested_segment, "Community of www.linkedin.com");
}

#[tokio::test]
async fn test_live_signal_keeps_sources_and_excerpt() {
    let long = "x".repeat(150);
    let signal = studio(RecordingGenerator::replying(&long))
        .fetch_live_signal("Polymarket")
        .await
        .unwrap();

    assert_eq!(signal.sources.len(), 1);
    assert_eq!(
        signal.suggestion.external_signal,
        Some(format!("{}...", "x".repeat(100)))
    );
}

#[test]
fn test_pipeline_reports_failures_with_request_id() {
    let pipeline = StudioPipeline::new(studio(RecordingGenerator::failing()));
    let commands = pipeline.command_sender();
    let events = pipeline.event_receiver();
    let worker = pipeline.start_worker().unwrap();

    let request_id = Uuid::new_v4();
    commands
        .send(StudioCommand::DeepOsint {
            query: "who is behind the campaign".to_string(),
            language: Language::En,
            request_id,
        })
        .unwrap();

    match events.recv_timeout(Duration::from_secs(5)).unwrap() {
        StudioEvent::Error { error, request_id: id } => {
            assert_eq!(id, Some(request_id));
            assert!(error.contains("503"));
        }
        other => panic!("unexpected event {:?}", other),
    }

    commands.send(StudioCommand::Shutdown).unwrap();
    worker.join().unwrap();
}

#[test]
fn test_pipeline_osint_report() {
    let pipeline = StudioPipeline::new(studio(RecordingGenerator::replying("Findings")));
    let commands = pipeline.command_sender();
    let events = pipeline.event_receiver();
    let worker = pipeline.start_worker().unwrap();

    commands
        .send(StudioCommand::DeepOsint {
            query: "topic".to_string(),
            language: Language::Es,
            request_id: Uuid::new_v4(),
        })
        .unwrap();

    match events.recv_timeout(Duration::from_secs(5)).unwrap() {
        StudioEvent::OsintReady { report, .. } => {
            assert_eq!(report.query, "topic");
            assert_eq!(report.analysis, "Findings");
            assert_eq!(report.sources[0].uri, "https://reuters.com/a");
        }
        other => panic!("unexpected event {:?}", other),
    }

    commands.send(StudioCommand::Shutdown).unwrap();
    worker.join().unwrap();
}

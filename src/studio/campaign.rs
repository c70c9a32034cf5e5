//! Campaign and research operations over a [`ContentGenerator`]

use crate::integration::config::StudioConfig;
use crate::studio::client::{ContentGenerator, GenerateRequest};
use crate::studio::prompts::{self, AD_COPY_MARKER, DEFAULT_REASONING, REASONING_MARKER};
use crate::studio::types::{
    AdStrategy, ConsumerSentiment, GeneratedContent, Language, LiveSignal, ModelType, OsintReport, Platform,
    SocialInsight, StrategySuggestion,
};
use crate::Result;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

/// Characters of a live signal reused as the suggested external signal
const SIGNAL_EXCERPT_CHARS: usize = 100;

/// The ad studio: every text operation the dashboard offers
#[derive(Clone)]
pub struct Studio {
    generator: Arc<dyn ContentGenerator>,
    config: StudioConfig,
}

impl Studio {
    pub fn new(generator: Arc<dyn ContentGenerator>, config: StudioConfig) -> Self {
        Self { generator, config }
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    /// Write one search-grounded ad and explain why it should work
    pub async fn generate_advanced_ad(
        &self,
        platform: Platform,
        strategy: &AdStrategy,
        user_context: &str,
        model: ModelType,
        language: Language,
    ) -> Result<GeneratedContent> {
        let mut request = GenerateRequest::new(
            self.config.model_id(model),
            prompts::advanced_ad_prompt(platform, strategy, user_context, language),
        )
        .with_system_instruction(prompts::advanced_ad_instruction(language))
        .with_search()
        .with_temperature(self.config.temperature);

        if model == ModelType::Pro {
            request = request.with_thinking_budget(self.config.thinking_budget);
        }

        let response = self.generator.generate(request).await?;
        let (content, reasoning) = split_ad_response(&response.text);

        info!("Generated {} ad ({} chars)", platform, content.len());
        Ok(GeneratedContent::new(platform, strategy.clone(), content, reasoning))
    }

    /// Suggest targeting parameters for a brief.
    ///
    /// Never fails: any error yields an empty suggestion.
    pub async fn orchestrate_parameters(&self, brief: &str) -> StrategySuggestion {
        let request = GenerateRequest::new(
            self.config.model_id(ModelType::Flash),
            prompts::orchestration_prompt(brief),
        )
        .with_json_response();

        match self.generator.generate(request).await {
            Ok(response) => parse_suggestion(&response.text),
            Err(e) => {
                warn!("Orchestration error: {}", e);
                StrategySuggestion::default()
            }
        }
    }

    /// Summarize what is happening right now around a topic
    pub async fn fetch_live_signal(&self, topic: &str) -> Result<LiveSignal> {
        let request = GenerateRequest::new(
            self.config.model_id(ModelType::Pro),
            prompts::live_signal_prompt(topic),
        )
        .with_search();

        let response = self.generator.generate(request).await?;
        let suggestion = StrategySuggestion {
            external_signal: Some(signal_excerpt(&response.text)),
            ..Default::default()
        };

        Ok(LiveSignal {
            signal: response.text,
            sources: response.sources,
            suggestion,
        })
    }

    /// Read audience and tone from a social media link
    pub async fn analyze_social_context(&self, url: &str) -> Result<SocialInsight> {
        let request = GenerateRequest::new(
            self.config.model_id(ModelType::Pro),
            prompts::social_context_prompt(url),
        )
        .with_search();

        let response = self.generator.generate(request).await?;

        Ok(SocialInsight {
            suggested_tone: infer_tone(&response.text),
            suggested_segment: segment_from_url(url),
            insights: response.text,
        })
    }

    /// Open-ended, search-grounded research
    pub async fn deep_osint(&self, query: &str, language: Language) -> Result<OsintReport> {
        let request = GenerateRequest::new(
            self.config.model_id(ModelType::Pro),
            prompts::osint_prompt(query, language),
        )
        .with_search();

        let response = self.generator.generate(request).await?;

        Ok(OsintReport {
            query: query.to_string(),
            analysis: response.text,
            sources: response.sources,
        })
    }
}

/// Split a generated answer into ad copy and reasoning
pub fn split_ad_response(text: &str) -> (String, String) {
    let mut sections = text.split(REASONING_MARKER);

    let content = sections
        .next()
        .unwrap_or_default()
        .replacen(AD_COPY_MARKER, "", 1)
        .trim()
        .to_string();

    let reasoning = sections.next().unwrap_or_default().trim();
    let reasoning = if reasoning.is_empty() {
        DEFAULT_REASONING.to_string()
    } else {
        reasoning.to_string()
    };

    (content, reasoning)
}

/// Read a JSON strategy suggestion, ignoring anything that does not fit
pub fn parse_suggestion(text: &str) -> StrategySuggestion {
    let body = text
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    let value: Value = match serde_json::from_str(if body.is_empty() { "{}" } else { body }) {
        Ok(value) => value,
        Err(e) => {
            warn!("Orchestration returned invalid JSON: {}", e);
            return StrategySuggestion::default();
        }
    };

    let field = |name: &str| {
        value
            .get(name)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    StrategySuggestion {
        objective: field("objective").and_then(|s| s.parse().ok()),
        sentiment: field("sentiment").and_then(|s| s.parse().ok()),
        segment: field("segment"),
        external_signal: field("externalSignal"),
    }
}

/// Guess the audience tone from a report; later rules win
pub fn infer_tone(text: &str) -> ConsumerSentiment {
    let lower = text.to_lowercase();
    let mut tone = ConsumerSentiment::Optimistic;

    if lower.contains("anxious") || lower.contains("preocupación") {
        tone = ConsumerSentiment::Anxious;
    }
    if lower.contains("skeptical") || lower.contains("escéptico") {
        tone = ConsumerSentiment::Skeptical;
    }
    if lower.contains("urgent") || lower.contains("urgente") {
        tone = ConsumerSentiment::Urgent;
    }

    tone
}

/// "Community of <host>" for a link, falling back to the raw text
pub fn segment_from_url(url: &str) -> String {
    let host = url::Url::parse(url.trim())
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| url.trim().to_string());

    format!("Community of {}", host)
}

/// First characters of a signal, marked as truncated
pub fn signal_excerpt(text: &str) -> String {
    let excerpt: String = text.chars().take(SIGNAL_EXCERPT_CHARS).collect();
    format!("{}...", excerpt)
}

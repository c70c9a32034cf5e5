//! Gemini `generateContent` REST client

use crate::studio::types::GroundingSource;
use crate::{AdArchitectError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info};

/// Default REST base for the Gemini API
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// One text generation call
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub system_instruction: Option<String>,
    /// Let the model ground its answer with Google Search
    pub use_search: bool,
    pub temperature: Option<f32>,
    pub response_mime_type: Option<String>,
    pub thinking_budget: Option<u32>,
}

impl GenerateRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            system_instruction: None,
            use_search: false,
            temperature: None,
            response_mime_type: None,
            thinking_budget: None,
        }
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    pub fn with_search(mut self) -> Self {
        self.use_search = true;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Ask for a JSON document instead of prose
    pub fn with_json_response(mut self) -> Self {
        self.response_mime_type = Some("application/json".to_string());
        self
    }

    pub fn with_thinking_budget(mut self, budget: u32) -> Self {
        self.thinking_budget = Some(budget);
        self
    }
}

/// Text of the first candidate plus the pages it cited
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerateResponse {
    pub text: String,
    pub sources: Vec<GroundingSource>,
}

/// Anything that can answer a [`GenerateRequest`]
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse>;
}

/// HTTP client for the hosted Gemini models
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AdArchitectError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            model
        )
    }
}

#[async_trait]
impl ContentGenerator for GeminiClient {
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse> {
        if self.api_key.is_empty() {
            return Err(AdArchitectError::ConfigError("No API key configured".to_string()));
        }

        let url = self.endpoint(&request.model);
        let body = build_body(&request);

        info!(
            "Generating with {} (search: {}, {} prompt chars)",
            request.model,
            request.use_search,
            request.prompt.len()
        );

        let resp = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| AdArchitectError::GenerationError(format!("Request failed: {}", e)))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(AdArchitectError::GenerationError(format!(
                "Gemini API error {}: {}",
                status, body
            )));
        }

        let value: Value = resp
            .json()
            .await
            .map_err(|e| AdArchitectError::GenerationError(format!("Invalid response body: {}", e)))?;

        let response = parse_response(value)?;
        debug!(
            "Generated {} chars with {} sources",
            response.text.len(),
            response.sources.len()
        );
        Ok(response)
    }
}

/// JSON body for `generateContent`
pub fn build_body(request: &GenerateRequest) -> Value {
    let mut body = json!({
        "contents": [{
            "role": "user",
            "parts": [{ "text": request.prompt }]
        }]
    });

    if let Some(instruction) = &request.system_instruction {
        body["systemInstruction"] = json!({ "parts": [{ "text": instruction }] });
    }

    if request.use_search {
        body["tools"] = json!([{ "googleSearch": {} }]);
    }

    let mut generation_config = json!({});
    if let Some(temperature) = request.temperature {
        generation_config["temperature"] = json!(temperature);
    }
    if let Some(mime) = &request.response_mime_type {
        generation_config["responseMimeType"] = json!(mime);
    }
    if let Some(budget) = request.thinking_budget {
        generation_config["thinkingConfig"] = json!({ "thinkingBudget": budget });
    }
    if generation_config.as_object().map(|o| !o.is_empty()).unwrap_or(false) {
        body["generationConfig"] = generation_config;
    }

    body
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Default, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Default, Deserialize)]
struct GroundingChunk {
    #[serde(default)]
    web: Option<WebChunk>,
}

#[derive(Debug, Default, Deserialize)]
struct WebChunk {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    uri: Option<String>,
}

/// Pull the answer text and web citations out of a `generateContent` reply
pub fn parse_response(value: Value) -> Result<GenerateResponse> {
    let response: ApiResponse = serde_json::from_value(value)
        .map_err(|e| AdArchitectError::GenerationError(format!("Unexpected response shape: {}", e)))?;

    let Some(candidate) = response.candidates.into_iter().next() else {
        return Ok(GenerateResponse::default());
    };

    let text = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter(|part| !part.thought)
                .filter_map(|part| part.text)
                .collect::<String>()
        })
        .unwrap_or_default();

    let sources = candidate
        .grounding_metadata
        .map(|meta| {
            meta.grounding_chunks
                .into_iter()
                .filter_map(|chunk| chunk.web)
                .map(|web| GroundingSource {
                    title: web.title.unwrap_or_else(|| "Source".to_string()),
                    uri: web.uri.unwrap_or_default(),
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(GenerateResponse { text, sources })
}

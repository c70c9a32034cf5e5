pub mod campaign;
pub mod client;
pub mod pipeline;
pub mod prompts;
pub mod trends;
pub mod types;

pub use campaign::Studio;
pub use client::{ContentGenerator, GeminiClient, GenerateRequest, GenerateResponse, GEMINI_BASE_URL};
pub use pipeline::{StudioCommand, StudioEvent, StudioPipeline};
pub use types::{
    AdObjective, AdStrategy, ConsumerSentiment, DataPoint, GeneratedContent, GroundingSource, Language,
    LiveSignal, ModelType, OsintReport, Platform, SocialInsight, StrategySuggestion, TrendMetric,
};

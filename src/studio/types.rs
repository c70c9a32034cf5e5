//! Ad strategy domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Where an ad will run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    #[serde(rename = "Meta (FB/Insta)")]
    Meta,
    #[serde(rename = "WhatsApp Business")]
    WhatsApp,
    #[serde(rename = "X (Twitter)")]
    X,
    #[serde(rename = "LinkedIn")]
    LinkedIn,
    #[serde(rename = "TikTok Ads")]
    TikTok,
    #[serde(rename = "Google Search (SEM)")]
    GoogleSearch,
    #[serde(rename = "Programmatic Display")]
    Programmatic,
}

impl Platform {
    pub const ALL: [Platform; 7] = [
        Platform::Meta,
        Platform::WhatsApp,
        Platform::X,
        Platform::LinkedIn,
        Platform::TikTok,
        Platform::GoogleSearch,
        Platform::Programmatic,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Platform::Meta => "Meta (FB/Insta)",
            Platform::WhatsApp => "WhatsApp Business",
            Platform::X => "X (Twitter)",
            Platform::LinkedIn => "LinkedIn",
            Platform::TikTok => "TikTok Ads",
            Platform::GoogleSearch => "Google Search (SEM)",
            Platform::Programmatic => "Programmatic Display",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdObjective {
    Conversion,
    Awareness,
    #[serde(rename = "Fear of Missing Out")]
    FearOfMissingOut,
    Educational,
    #[serde(rename = "Political Persuasion")]
    PoliticalPersuasion,
    #[serde(rename = "Crisis Mgmt")]
    CrisisManagement,
}

impl AdObjective {
    pub const ALL: [AdObjective; 6] = [
        AdObjective::Conversion,
        AdObjective::Awareness,
        AdObjective::FearOfMissingOut,
        AdObjective::Educational,
        AdObjective::PoliticalPersuasion,
        AdObjective::CrisisManagement,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AdObjective::Conversion => "Conversion",
            AdObjective::Awareness => "Awareness",
            AdObjective::FearOfMissingOut => "Fear of Missing Out",
            AdObjective::Educational => "Educational",
            AdObjective::PoliticalPersuasion => "Political Persuasion",
            AdObjective::CrisisManagement => "Crisis Mgmt",
        }
    }
}

impl fmt::Display for AdObjective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AdObjective {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AdObjective::ALL
            .into_iter()
            .find(|o| o.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown objective: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConsumerSentiment {
    Anxious,
    Optimistic,
    Skeptical,
    Apathetic,
    Urgent,
}

impl ConsumerSentiment {
    pub const ALL: [ConsumerSentiment; 5] = [
        ConsumerSentiment::Anxious,
        ConsumerSentiment::Optimistic,
        ConsumerSentiment::Skeptical,
        ConsumerSentiment::Apathetic,
        ConsumerSentiment::Urgent,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ConsumerSentiment::Anxious => "Anxious",
            ConsumerSentiment::Optimistic => "Optimistic",
            ConsumerSentiment::Skeptical => "Skeptical",
            ConsumerSentiment::Apathetic => "Apathetic",
            ConsumerSentiment::Urgent => "Urgent",
        }
    }
}

impl fmt::Display for ConsumerSentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ConsumerSentiment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConsumerSentiment::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown sentiment: {}", s))
    }
}

/// Targeting parameters for one ad
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdStrategy {
    pub objective: AdObjective,
    pub sentiment: ConsumerSentiment,
    pub segment: String,
    /// Polymarket market, OSINT topic or similar
    pub external_signal: String,
}

impl Default for AdStrategy {
    fn default() -> Self {
        Self {
            objective: AdObjective::Conversion,
            sentiment: ConsumerSentiment::Optimistic,
            segment: "Global Audience".to_string(),
            external_signal: "Polymarket: Crypto Sentiment".to_string(),
        }
    }
}

/// Partial strategy proposed by the model; unset fields keep their value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrategySuggestion {
    pub objective: Option<AdObjective>,
    pub sentiment: Option<ConsumerSentiment>,
    pub segment: Option<String>,
    pub external_signal: Option<String>,
}

impl StrategySuggestion {
    pub fn is_empty(&self) -> bool {
        self.objective.is_none()
            && self.sentiment.is_none()
            && self.segment.is_none()
            && self.external_signal.is_none()
    }

    /// Overwrite the fields this suggestion sets
    pub fn apply_to(&self, strategy: &mut AdStrategy) {
        if let Some(objective) = self.objective {
            strategy.objective = objective;
        }
        if let Some(sentiment) = self.sentiment {
            strategy.sentiment = sentiment;
        }
        if let Some(segment) = &self.segment {
            strategy.segment = segment.clone();
        }
        if let Some(signal) = &self.external_signal {
            strategy.external_signal = signal.clone();
        }
    }
}

/// A generated ad with the model's reasoning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedContent {
    pub id: String,
    pub platform: Platform,
    pub strategy: AdStrategy,
    pub content: String,
    pub reasoning: String,
    pub hashtags: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl GeneratedContent {
    pub fn new(platform: Platform, strategy: AdStrategy, content: String, reasoning: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            platform,
            strategy,
            content,
            reasoning,
            hashtags: vec!["#AI".to_string(), "#Context".to_string()],
            timestamp: Utc::now(),
        }
    }
}

/// A web page the model cited
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingSource {
    pub title: String,
    pub uri: String,
}

/// Which hosted model to call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelType {
    Flash,
    Pro,
    Live,
}

impl ModelType {
    /// Built-in model id, used when the config does not override it
    pub fn default_id(&self) -> &'static str {
        match self {
            ModelType::Flash => "gemini-3-flash-preview",
            ModelType::Pro => "gemini-3-pro-preview",
            ModelType::Live => "gemini-2.5-flash-native-audio-preview-12-2025",
        }
    }
}

/// Output language for generated copy and the live director
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Es,
    En,
}

impl Language {
    /// Name used inside prompts
    pub fn prompt_name(&self) -> &'static str {
        match self {
            Language::Es => "SPANISH",
            Language::En => "ENGLISH",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Language::Es => "Spanish",
            Language::En => "English",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendMetric {
    pub name: String,
    pub value: f64,
    pub delta: f64,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub time: String,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value2: Option<f64>,
}

/// Search-grounded summary of a topic
#[derive(Debug, Clone, PartialEq)]
pub struct LiveSignal {
    pub signal: String,
    pub sources: Vec<GroundingSource>,
    pub suggestion: StrategySuggestion,
}

/// Audience and tone read from a social media link
#[derive(Debug, Clone, PartialEq)]
pub struct SocialInsight {
    pub insights: String,
    pub suggested_segment: String,
    pub suggested_tone: ConsumerSentiment,
}

/// Open-ended research answer
#[derive(Debug, Clone, PartialEq)]
pub struct OsintReport {
    pub query: String,
    pub analysis: String,
    pub sources: Vec<GroundingSource>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(
            serde_json::to_string(&AdObjective::FearOfMissingOut).unwrap(),
            "\"Fear of Missing Out\""
        );
        assert_eq!(
            serde_json::to_string(&Platform::GoogleSearch).unwrap(),
            "\"Google Search (SEM)\""
        );
        assert_eq!(serde_json::to_string(&Language::En).unwrap(), "\"en\"");
    }

    #[test]
    fn test_parse_labels() {
        assert_eq!("crisis mgmt".parse::<AdObjective>(), Ok(AdObjective::CrisisManagement));
        assert_eq!(" Urgent ".parse::<ConsumerSentiment>(), Ok(ConsumerSentiment::Urgent));
        assert!("Joyful".parse::<ConsumerSentiment>().is_err());
    }

    #[test]
    fn test_suggestion_applies_only_set_fields() {
        let mut strategy = AdStrategy::default();
        let suggestion = StrategySuggestion {
            sentiment: Some(ConsumerSentiment::Skeptical),
            segment: Some("Crypto natives".to_string()),
            ..Default::default()
        };

        suggestion.apply_to(&mut strategy);
        assert_eq!(strategy.objective, AdObjective::Conversion);
        assert_eq!(strategy.sentiment, ConsumerSentiment::Skeptical);
        assert_eq!(strategy.segment, "Crypto natives");
        assert_eq!(strategy.external_signal, "Polymarket: Crypto Sentiment");
    }

    #[test]
    fn test_generated_content_tags() {
        let content = GeneratedContent::new(
            Platform::Meta,
            AdStrategy::default(),
            "copy".to_string(),
            "why".to_string(),
        );
        assert_eq!(content.hashtags, vec!["#AI", "#Context"]);
        assert!(!content.id.is_empty());
    }
}

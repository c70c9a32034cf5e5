//! Gemini Live wire messages
//!
//! Client messages are typed and serialized with serde. Server messages are
//! parsed leniently: one frame may carry several audio parts plus turn
//! markers, so it is flattened into a list of [`ServerEvent`]s.

use crate::{AdArchitectError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub setup: Option<Setup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub realtime_input: Option<RealtimeInput>,
}

impl ClientMessage {
    pub fn setup(setup: Setup) -> Self {
        Self {
            setup: Some(setup),
            ..Default::default()
        }
    }

    /// One base64 audio chunk as realtime input
    pub fn audio(mime_type: impl Into<String>, data: String) -> Self {
        Self {
            realtime_input: Some(RealtimeInput {
                media_chunks: vec![Blob {
                    mime_type: mime_type.into(),
                    data,
                }],
            }),
            ..Default::default()
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// First message on every connection
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Setup {
    pub model: String,
    pub generation_config: GenerationConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
}

impl Setup {
    /// Audio-only setup speaking with a prebuilt voice
    pub fn audio(model: &str, voice: &str, system_instruction: Option<&str>) -> Self {
        let model = if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{}", model)
        };

        Self {
            model,
            generation_config: GenerationConfig {
                response_modalities: vec!["AUDIO".to_string()],
                speech_config: Some(SpeechConfig {
                    voice_config: VoiceConfig {
                        prebuilt_voice_config: PrebuiltVoiceConfig {
                            voice_name: voice.to_string(),
                        },
                    },
                }),
            },
            system_instruction: system_instruction.map(Content::text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_modalities: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speech_config: Option<SpeechConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechConfig {
    pub voice_config: VoiceConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceConfig {
    pub prebuilt_voice_config: PrebuiltVoiceConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrebuiltVoiceConfig {
    pub voice_name: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    pub fn text(text: &str) -> Self {
        Self {
            parts: vec![Part {
                text: Some(text.to_string()),
                inline_data: None,
            }],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<Blob>,
}

/// Base64 payload tagged with its MIME type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blob {
    #[serde(default)]
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RealtimeInput {
    pub media_chunks: Vec<Blob>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServerMessage {
    #[serde(default)]
    setup_complete: Option<serde_json::Value>,
    #[serde(default)]
    server_content: Option<ServerContent>,
    #[serde(default)]
    go_away: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServerContent {
    #[serde(default)]
    model_turn: Option<Content>,
    #[serde(default)]
    turn_complete: bool,
    #[serde(default)]
    interrupted: bool,
}

/// A single thing the server told us
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    /// The setup message was accepted; audio may flow
    SetupComplete,

    /// Base64 audio from the model's turn
    Audio { data: String, mime_type: String },

    /// Text from the model's turn
    Text(String),

    TurnComplete,

    /// The model stopped its turn because the user spoke over it
    Interrupted,

    /// The server is about to close the connection
    GoAway,

    Unknown,
}

/// Flatten one server frame into events, in part order
pub fn parse_server_message(raw: &str) -> Result<Vec<ServerEvent>> {
    let message: ServerMessage = serde_json::from_str(raw)
        .map_err(|e| AdArchitectError::ProtocolError(format!("Invalid server message: {}", e)))?;

    let mut events = Vec::new();

    if message.setup_complete.is_some() {
        events.push(ServerEvent::SetupComplete);
    }

    if let Some(content) = message.server_content {
        if content.interrupted {
            events.push(ServerEvent::Interrupted);
        }

        for part in content.model_turn.map(|turn| turn.parts).unwrap_or_default() {
            if let Some(blob) = part.inline_data {
                events.push(ServerEvent::Audio {
                    data: blob.data,
                    mime_type: blob.mime_type,
                });
            }
            if let Some(text) = part.text {
                events.push(ServerEvent::Text(text));
            }
        }

        if content.turn_complete {
            events.push(ServerEvent::TurnComplete);
        }
    }

    if message.go_away.is_some() {
        events.push(ServerEvent::GoAway);
    }

    if events.is_empty() {
        debug!("Ignoring server message: {}", raw);
        events.push(ServerEvent::Unknown);
    }

    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_setup_declares_audio_and_voice() {
        let setup = Setup::audio(
            "gemini-2.5-flash-native-audio-preview-12-2025",
            "Kore",
            Some("Be brief."),
        );
        let value: serde_json::Value =
            serde_json::from_str(&ClientMessage::setup(setup).to_json().unwrap()).unwrap();

        assert_eq!(
            value,
            json!({
                "setup": {
                    "model": "models/gemini-2.5-flash-native-audio-preview-12-2025",
                    "generationConfig": {
                        "responseModalities": ["AUDIO"],
                        "speechConfig": {
                            "voiceConfig": { "prebuiltVoiceConfig": { "voiceName": "Kore" } }
                        }
                    },
                    "systemInstruction": { "parts": [{ "text": "Be brief." }] }
                }
            })
        );
    }

    #[test]
    fn test_model_prefix_not_doubled() {
        let setup = Setup::audio("models/x", "Kore", None);
        assert_eq!(setup.model, "models/x");
        assert!(setup.system_instruction.is_none());
    }

    #[test]
    fn test_audio_chunk_shape() {
        let msg = ClientMessage::audio("audio/pcm;rate=16000", "AAAA".to_string());
        let value: serde_json::Value = serde_json::from_str(&msg.to_json().unwrap()).unwrap();

        assert_eq!(
            value,
            json!({
                "realtimeInput": {
                    "mediaChunks": [{ "mimeType": "audio/pcm;rate=16000", "data": "AAAA" }]
                }
            })
        );
    }

    #[test]
    fn test_parse_setup_complete() {
        let events = parse_server_message(r#"{"setupComplete":{}}"#).unwrap();
        assert_eq!(events, vec![ServerEvent::SetupComplete]);
    }

    #[test]
    fn test_parse_every_audio_part() {
        let raw = json!({
            "serverContent": {
                "modelTurn": {
                    "parts": [
                        { "inlineData": { "mimeType": "audio/pcm;rate=24000", "data": "AAA=" } },
                        { "text": "hola" },
                        { "inlineData": { "mimeType": "audio/pcm;rate=24000", "data": "BBB=" } }
                    ]
                },
                "turnComplete": true
            }
        })
        .to_string();

        let events = parse_server_message(&raw).unwrap();
        assert_eq!(events.len(), 4);
        assert!(matches!(&events[0], ServerEvent::Audio { data, .. } if data == "AAA="));
        assert_eq!(events[1], ServerEvent::Text("hola".to_string()));
        assert!(matches!(&events[2], ServerEvent::Audio { data, .. } if data == "BBB="));
        assert_eq!(events[3], ServerEvent::TurnComplete);
    }

    #[test]
    fn test_parse_interrupted_and_go_away() {
        let events =
            parse_server_message(r#"{"serverContent":{"interrupted":true},"goAway":{"timeLeft":"5s"}}"#)
                .unwrap();
        assert_eq!(events, vec![ServerEvent::Interrupted, ServerEvent::GoAway]);
    }

    #[test]
    fn test_parse_unknown_and_invalid() {
        assert_eq!(
            parse_server_message(r#"{"usageMetadata":{}}"#).unwrap(),
            vec![ServerEvent::Unknown]
        );
        assert!(matches!(
            parse_server_message("not json"),
            Err(AdArchitectError::ProtocolError(_))
        ));
    }
}

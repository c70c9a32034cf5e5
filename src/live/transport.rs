//! Duplex link to the live model
//!
//! A [`LiveLink`] is a pair of channels: outgoing client messages and
//! incoming [`LinkEvent`]s. The WebSocket connector drives the socket with
//! one writer task and one reader task; tests use an in-memory pair.

use crate::live::protocol::{parse_server_message, ClientMessage, ServerEvent, Setup};
use crate::{AdArchitectError, Result};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

/// Default Gemini Live endpoint
pub const LIVE_ENDPOINT: &str =
    "wss://generativelanguage.googleapis.com/ws/google.ai.generativelanguage.v1beta.GenerativeService.BidiGenerateContent";

/// Lifecycle and data events coming from the remote end
#[derive(Debug, Clone, PartialEq)]
pub enum LinkEvent {
    /// The server accepted the setup; fires once per connection
    Open,

    Message(ServerEvent),

    /// The remote closed the connection, with its reason if any
    Closed(Option<String>),

    /// The connection failed mid-session
    Error(String),
}

/// What the session asks the writer to do
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    /// A serialized client message
    Message(String),
    Close,
}

/// Owned duplex connection handed to one session
pub struct LiveLink {
    outgoing: UnboundedSender<Outbound>,
    incoming: UnboundedReceiver<LinkEvent>,
}

impl LiveLink {
    pub fn new(outgoing: UnboundedSender<Outbound>, incoming: UnboundedReceiver<LinkEvent>) -> Self {
        Self { outgoing, incoming }
    }

    /// In-memory link; the returned [`RemoteEnd`] plays the server
    pub fn pair() -> (Self, RemoteEnd) {
        let (outgoing_tx, outgoing_rx) = unbounded_channel();
        let (event_tx, event_rx) = unbounded_channel();

        (
            Self::new(outgoing_tx, event_rx),
            RemoteEnd {
                sent: outgoing_rx,
                events: event_tx,
            },
        )
    }

    /// Queue a message for the writer
    pub fn send(&self, message: &ClientMessage) -> Result<()> {
        let json = message.to_json()?;
        self.outgoing
            .send(Outbound::Message(json))
            .map_err(|_| AdArchitectError::TransportError("Connection writer has stopped".to_string()))
    }

    /// Next event from the remote, `None` once the reader is gone
    pub async fn recv(&mut self) -> Option<LinkEvent> {
        self.incoming.recv().await
    }

    pub fn close(&self) {
        if self.outgoing.send(Outbound::Close).is_err() {
            debug!("Link already closed");
        }
    }
}

/// The server side of [`LiveLink::pair`]
pub struct RemoteEnd {
    sent: UnboundedReceiver<Outbound>,
    events: UnboundedSender<LinkEvent>,
}

impl RemoteEnd {
    pub fn open(&self) {
        let _ = self.events.send(LinkEvent::Open);
    }

    /// Deliver a raw server frame as the reader would
    pub fn deliver(&self, raw: &str) -> Result<()> {
        for event in parse_server_message(raw)? {
            let _ = self.events.send(LinkEvent::Message(event));
        }
        Ok(())
    }

    pub fn close(&self, reason: Option<&str>) {
        let _ = self.events.send(LinkEvent::Closed(reason.map(str::to_string)));
    }

    pub fn fail(&self, message: &str) {
        let _ = self.events.send(LinkEvent::Error(message.to_string()));
    }

    /// Next thing the client sent
    pub async fn next_sent(&mut self) -> Option<Outbound> {
        self.sent.recv().await
    }

    pub fn try_next_sent(&mut self) -> Option<Outbound> {
        self.sent.try_recv().ok()
    }
}

/// Opens duplex links to the live model
#[async_trait]
pub trait LiveConnector: Send + Sync {
    /// Connect and send `setup` as the first message
    async fn connect(&self, setup: Setup) -> Result<LiveLink>;
}

/// Connector speaking the Gemini Live WebSocket protocol
#[derive(Debug, Clone)]
pub struct WebSocketConnector {
    endpoint: String,
    api_key: String,
}

impl WebSocketConnector {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }

    fn url(&self) -> Result<url::Url> {
        if self.api_key.is_empty() {
            return Err(AdArchitectError::ConnectionFailed("No API key configured".to_string()));
        }
        url::Url::parse_with_params(&self.endpoint, &[("key", self.api_key.as_str())])
            .map_err(|e| AdArchitectError::ConnectionFailed(format!("Invalid endpoint: {}", e)))
    }
}

#[async_trait]
impl LiveConnector for WebSocketConnector {
    async fn connect(&self, setup: Setup) -> Result<LiveLink> {
        let url = self.url()?;

        info!("Connecting to live model {}", setup.model);

        let (mut ws_stream, _response) = tokio_tungstenite::connect_async(url.as_str())
            .await
            .map_err(|e| AdArchitectError::ConnectionFailed(format!("WebSocket connect error: {}", e)))?;

        let setup_json = ClientMessage::setup(setup).to_json()?;
        debug!("Sending live setup: {}", setup_json);
        ws_stream
            .send(Message::Text(setup_json.into()))
            .await
            .map_err(|e| AdArchitectError::ConnectionFailed(format!("Failed to send setup: {}", e)))?;

        let (mut sink, mut source) = ws_stream.split();
        let (outgoing_tx, mut outgoing_rx) = unbounded_channel::<Outbound>();
        let (event_tx, event_rx) = unbounded_channel::<LinkEvent>();

        let writer_events = event_tx.clone();
        tokio::spawn(async move {
            let mut sent: u64 = 0;
            while let Some(outbound) = outgoing_rx.recv().await {
                match outbound {
                    Outbound::Message(json) => {
                        if let Err(e) = sink.send(Message::Text(json.into())).await {
                            error!("Live send failed after {} messages: {}", sent, e);
                            let _ = writer_events.send(LinkEvent::Error(format!("Send error: {}", e)));
                            break;
                        }
                        sent += 1;
                    }
                    Outbound::Close => {
                        let _ = sink.send(Message::Close(None)).await;
                        debug!("Live writer closed after {} messages", sent);
                        break;
                    }
                }
            }
        });

        tokio::spawn(async move {
            let mut opened = false;
            loop {
                let text = match source.next().await {
                    Some(Ok(Message::Text(text))) => text.to_string(),
                    // Gemini Live often sends JSON as binary frames
                    Some(Ok(Message::Binary(bytes))) => match String::from_utf8(bytes.to_vec()) {
                        Ok(text) => text,
                        Err(e) => {
                            warn!("Dropping non UTF-8 binary frame: {}", e);
                            continue;
                        }
                    },
                    Some(Ok(Message::Close(frame))) => {
                        let reason = frame.map(|f| f.reason.to_string()).filter(|r| !r.is_empty());
                        info!("Live connection closed: {:?}", reason);
                        let _ = event_tx.send(LinkEvent::Closed(reason));
                        break;
                    }
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        error!("Live receive error: {}", e);
                        let _ = event_tx.send(LinkEvent::Error(format!("Receive error: {}", e)));
                        break;
                    }
                    None => {
                        let _ = event_tx.send(LinkEvent::Closed(None));
                        break;
                    }
                };

                let events = match parse_server_message(&text) {
                    Ok(events) => events,
                    Err(e) => {
                        warn!("Dropping server frame: {}", e);
                        continue;
                    }
                };

                for event in events {
                    let link_event = match event {
                        ServerEvent::SetupComplete if !opened => {
                            opened = true;
                            LinkEvent::Open
                        }
                        ServerEvent::SetupComplete => continue,
                        other => LinkEvent::Message(other),
                    };
                    if event_tx.send(link_event).is_err() {
                        debug!("Session dropped its link");
                        return;
                    }
                }
            }
        });

        Ok(LiveLink::new(outgoing_tx, event_rx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pair_carries_messages_both_ways() {
        let (mut link, mut remote) = LiveLink::pair();

        link.send(&ClientMessage::audio("audio/pcm;rate=16000", "AAAA".to_string()))
            .unwrap();
        match remote.next_sent().await {
            Some(Outbound::Message(json)) => assert!(json.contains("mediaChunks")),
            other => panic!("unexpected {:?}", other),
        }

        remote.open();
        remote.deliver(r#"{"serverContent":{"turnComplete":true}}"#).unwrap();
        assert_eq!(link.recv().await, Some(LinkEvent::Open));
        assert_eq!(
            link.recv().await,
            Some(LinkEvent::Message(ServerEvent::TurnComplete))
        );
    }

    #[tokio::test]
    async fn test_send_after_remote_drop_is_transport_error() {
        let (link, remote) = LiveLink::pair();
        drop(remote);

        let err = link
            .send(&ClientMessage::audio("audio/pcm;rate=16000", String::new()))
            .unwrap_err();
        assert!(matches!(err, AdArchitectError::TransportError(_)));
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_to_connect() {
        let connector = WebSocketConnector::new(LIVE_ENDPOINT, "");
        let err = connector
            .connect(Setup::audio("m", "Kore", None))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, AdArchitectError::ConnectionFailed(_)));
    }

    #[test]
    fn test_endpoint_gets_key_param() {
        let connector = WebSocketConnector::new(LIVE_ENDPOINT, "abc");
        let url = connector.url().unwrap();
        assert_eq!(url.scheme(), "wss");
        assert_eq!(url.query(), Some("key=abc"));
    }
}

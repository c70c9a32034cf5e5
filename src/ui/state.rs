//! Application state management
//!
//! Central state for the console. Backends are reached only through
//! channels: the studio pipeline and the live agent worker.

use crate::live::agent::LiveAgent;
use crate::live::session::LiveEvent;
use crate::live::state::{SessionState, SessionStatus, SharedSessionState};
use crate::studio::pipeline::{StudioCommand, StudioEvent};
use crate::studio::trends::{election_projection, mock_trends};
use crate::studio::types::{
    AdStrategy, DataPoint, GeneratedContent, GroundingSource, Language, ModelType, OsintReport, Platform,
    TrendMetric,
};
use crossbeam_channel::{Receiver, Sender};
use std::collections::{HashMap, VecDeque};
use tracing::{debug, warn};
use uuid::Uuid;

const MAX_LOGS: usize = 100;
const MAX_TRANSCRIPT: usize = 200;

/// Top-level navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Dashboard,
    Campaigns,
    Live,
    Osint,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Dashboard, Tab::Campaigns, Tab::Live, Tab::Osint];

    pub fn label(&self, language: Language) -> &'static str {
        match (self, language) {
            (Tab::Dashboard, Language::Es) => "Centro de Inteligencia",
            (Tab::Dashboard, Language::En) => "Intelligence Hub",
            (Tab::Campaigns, Language::Es) => "Campañas",
            (Tab::Campaigns, Language::En) => "Campaigns",
            (Tab::Live, _) => "Live Director",
            (Tab::Osint, _) => "OSINT Lab",
        }
    }
}

/// Kind of studio request awaiting a reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PendingRequest {
    Ad,
    Orchestrate,
    Signal,
    Social,
    Osint,
}

/// Campaign builder inputs
#[derive(Debug, Clone)]
pub struct CampaignForm {
    pub platform: Platform,
    pub strategy: AdStrategy,
    /// Master brief sent with every generation
    pub brief: String,
    pub model: ModelType,
    pub social_url: String,
}

impl Default for CampaignForm {
    fn default() -> Self {
        Self {
            platform: Platform::Meta,
            strategy: AdStrategy::default(),
            brief: String::new(),
            model: ModelType::Pro,
            social_url: String::new(),
        }
    }
}

impl CampaignForm {
    fn append_to_brief(&mut self, section: &str) {
        if !self.brief.is_empty() {
            self.brief.push_str("\n\n");
        }
        self.brief.push_str(section);
    }
}

/// Central application state
pub struct AppState {
    pub active_tab: Tab,
    pub language: Language,

    pub campaign: CampaignForm,
    /// Generated ads, newest first
    pub generated: Vec<GeneratedContent>,
    /// Sources backing the last live signal scan
    pub verified_sources: Vec<GroundingSource>,

    pub osint_query: String,
    pub osint_report: Option<OsintReport>,

    /// Text the live director produced
    pub transcript: VecDeque<String>,

    pub trends: Vec<TrendMetric>,
    pub projection: Vec<DataPoint>,

    pub last_error: Option<String>,
    pub logs: VecDeque<String>,
    pub fps: f32,

    pending: HashMap<Uuid, PendingRequest>,
    studio_tx: Option<Sender<StudioCommand>>,
    studio_rx: Option<Receiver<StudioEvent>>,
    live: Option<LiveAgent>,
    live_state: SharedSessionState,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Language::default())
    }
}

impl AppState {
    pub fn new(language: Language) -> Self {
        Self {
            active_tab: Tab::default(),
            language,
            campaign: CampaignForm::default(),
            generated: Vec::new(),
            verified_sources: Vec::new(),
            osint_query: String::new(),
            osint_report: None,
            transcript: VecDeque::with_capacity(MAX_TRANSCRIPT),
            trends: mock_trends(),
            projection: election_projection(),
            last_error: None,
            logs: VecDeque::with_capacity(MAX_LOGS),
            fps: 0.0,
            pending: HashMap::new(),
            studio_tx: None,
            studio_rx: None,
            live: None,
            live_state: SharedSessionState::new(),
        }
    }

    /// Connect to the studio pipeline channels
    pub fn with_studio(mut self, commands: Sender<StudioCommand>, events: Receiver<StudioEvent>) -> Self {
        self.studio_tx = Some(commands);
        self.studio_rx = Some(events);
        self
    }

    /// Attach the live director worker
    pub fn with_live(mut self, agent: LiveAgent) -> Self {
        self.live_state = agent.state().clone();
        self.live = Some(agent);
        self
    }

    pub fn add_log(&mut self, message: impl Into<String>) {
        if self.logs.len() >= MAX_LOGS {
            self.logs.pop_front();
        }
        self.logs.push_back(message.into());
    }

    pub fn update_fps(&mut self, delta: f64) {
        if delta > 0.0 {
            self.fps = self.fps * 0.9 + (1.0 / delta as f32) * 0.1;
        }
    }

    fn fail(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!("{}", message);
        self.add_log(format!("Error: {}", message));
        self.last_error = Some(message);
    }

    // ---- Live director ----

    pub fn has_live(&self) -> bool {
        self.live.is_some()
    }

    pub fn live_status(&self) -> SessionStatus {
        self.live_state.status()
    }

    pub fn live_snapshot(&self) -> SessionState {
        self.live_state.snapshot()
    }

    /// Connect when idle, disconnect otherwise
    pub fn toggle_live(&mut self) {
        let Some(agent) = &self.live else {
            self.fail("Live director is unavailable");
            return;
        };

        let result = if self.live_state.status().is_active() {
            agent.disconnect()
        } else {
            self.transcript.clear();
            agent.connect()
        };

        if let Err(e) = result {
            self.fail(e.user_message());
        }
    }

    pub fn handle_live_event(&mut self, event: LiveEvent) {
        debug!("Live event: {:?}", event);
        match event {
            LiveEvent::Connecting => self.add_log("Live: connecting"),
            LiveEvent::Connected => {
                self.last_error = None;
                self.add_log("Live: connected");
            }
            LiveEvent::ConnectFailed(error) => self.fail(error),
            LiveEvent::Disconnected => self.add_log("Live: disconnected"),
            LiveEvent::Closed(reason) => {
                self.add_log(format!("Live: closed ({})", reason.as_deref().unwrap_or("no reason")))
            }
            LiveEvent::TransportError(error) => self.fail(error),
            LiveEvent::Transcript(text) => {
                if self.transcript.len() >= MAX_TRANSCRIPT {
                    self.transcript.pop_front();
                }
                self.transcript.push_back(text);
            }
            LiveEvent::TurnComplete => debug!("Live turn complete"),
            LiveEvent::Interrupted => self.add_log("Live: interrupted"),
        }
    }

    // ---- Studio ----

    pub fn is_pending(&self, kind: PendingRequest) -> bool {
        self.pending.values().any(|k| *k == kind)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    fn send_studio(&mut self, kind: PendingRequest, build: impl FnOnce(Uuid) -> StudioCommand) {
        let Some(tx) = &self.studio_tx else {
            self.fail("Studio is unavailable");
            return;
        };

        let request_id = Uuid::new_v4();
        match tx.send(build(request_id)) {
            Ok(()) => {
                self.pending.insert(request_id, kind);
            }
            Err(e) => self.fail(format!("Failed to send studio request: {}", e)),
        }
    }

    pub fn generate_ad(&mut self) {
        if self.campaign.brief.trim().is_empty() || self.is_pending(PendingRequest::Ad) {
            return;
        }

        let platform = self.campaign.platform;
        let strategy = self.campaign.strategy.clone();
        let brief = self.campaign.brief.clone();
        let model = self.campaign.model;
        let language = self.language;
        self.send_studio(PendingRequest::Ad, |request_id| StudioCommand::GenerateAd {
            platform,
            strategy,
            brief,
            model,
            language,
            request_id,
        });
    }

    pub fn orchestrate(&mut self) {
        if self.campaign.brief.trim().is_empty() || self.is_pending(PendingRequest::Orchestrate) {
            return;
        }

        let brief = self.campaign.brief.clone();
        self.send_studio(PendingRequest::Orchestrate, |request_id| StudioCommand::Orchestrate {
            brief,
            request_id,
        });
    }

    /// Scan the current external signal
    pub fn scan_signal(&mut self) {
        let topic = self.campaign.strategy.external_signal.trim().to_string();
        if topic.is_empty() || self.is_pending(PendingRequest::Signal) {
            return;
        }

        self.send_studio(PendingRequest::Signal, |request_id| StudioCommand::ScanSignal {
            topic,
            request_id,
        });
    }

    pub fn analyze_social(&mut self) {
        let url = self.campaign.social_url.trim().to_string();
        if url.is_empty() || self.is_pending(PendingRequest::Social) {
            return;
        }

        self.send_studio(PendingRequest::Social, |request_id| StudioCommand::AnalyzeSocial {
            url,
            request_id,
        });
    }

    pub fn run_osint(&mut self) {
        let query = self.osint_query.trim().to_string();
        if query.is_empty() || self.is_pending(PendingRequest::Osint) {
            return;
        }

        let language = self.language;
        self.send_studio(PendingRequest::Osint, |request_id| StudioCommand::DeepOsint {
            query,
            language,
            request_id,
        });
    }

    pub fn handle_studio_event(&mut self, event: StudioEvent) {
        match event {
            StudioEvent::AdGenerated {
                content,
                request_id,
                total_ms,
            } => {
                self.pending.remove(&request_id);
                self.add_log(format!("Ad for {} generated in {} ms", content.platform, total_ms));
                self.generated.insert(0, content);
            }

            StudioEvent::ParametersSuggested { suggestion, request_id } => {
                self.pending.remove(&request_id);
                if suggestion.is_empty() {
                    self.add_log("Orchestration returned no suggestions");
                } else {
                    suggestion.apply_to(&mut self.campaign.strategy);
                    self.add_log("Strategy parameters updated");
                }
            }

            StudioEvent::SignalScanned { signal, request_id } => {
                self.pending.remove(&request_id);
                self.campaign
                    .append_to_brief(&format!("LIVE DATA GROUNDING: {}", signal.signal));
                self.verified_sources = signal.sources;
            }

            StudioEvent::SocialAnalyzed { insight, request_id } => {
                self.pending.remove(&request_id);
                self.campaign.strategy.sentiment = insight.suggested_tone;
                if !insight.suggested_segment.is_empty() {
                    self.campaign.strategy.segment = insight.suggested_segment;
                }
                let url = self.campaign.social_url.clone();
                self.campaign.append_to_brief(&format!(
                    "SOCIAL INTELLIGENCE ({}):\n{}",
                    url, insight.insights
                ));
            }

            StudioEvent::OsintReady { report, request_id } => {
                self.pending.remove(&request_id);
                self.add_log(format!("OSINT report ready ({} sources)", report.sources.len()));
                self.osint_report = Some(report);
            }

            StudioEvent::Error { error, request_id } => {
                if let Some(id) = request_id {
                    self.pending.remove(&id);
                }
                self.fail(error);
            }

            StudioEvent::Shutdown => {
                self.pending.clear();
                self.studio_tx = None;
                self.add_log("Studio pipeline stopped");
            }
        }
    }

    /// Drain pending backend events without blocking
    pub fn poll_events(&mut self) {
        let studio_events: Vec<StudioEvent> = self
            .studio_rx
            .as_ref()
            .map(|rx| rx.try_iter().collect())
            .unwrap_or_default();
        for event in studio_events {
            self.handle_studio_event(event);
        }

        let mut live_events = Vec::new();
        if let Some(agent) = &self.live {
            while let Some(event) = agent.try_recv_event() {
                live_events.push(event);
            }
        }
        for event in live_events {
            self.handle_live_event(event);
        }
    }

    /// True while something on screen is still changing
    pub fn needs_repaint(&self) -> bool {
        !self.pending.is_empty() || self.live_status() != SessionStatus::Disconnected
    }
}

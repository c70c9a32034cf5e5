pub mod agent;
pub mod protocol;
pub mod scheduler;
pub mod session;
pub mod state;
pub mod transport;

pub use agent::{LiveAgent, LiveCommand, LiveController};
pub use protocol::{ClientMessage, ServerEvent, Setup};
pub use scheduler::{PlaybackScheduler, Scheduled};
pub use session::{LiveEvent, LiveSession};
pub use state::{SessionState, SessionStatus, SharedSessionState};
pub use transport::{LinkEvent, LiveConnector, LiveLink, Outbound, RemoteEnd, WebSocketConnector, LIVE_ENDPOINT};

//! Application wiring
//!
//! Configuration shared by the live director and the studio.

pub mod config;

pub use config::{AppConfig, LiveConfig, StudioConfig, API_KEY_ENV};

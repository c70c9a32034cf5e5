//! UI components
//!
//! Each component borrows the state and theme for one frame.

mod campaign_panel;
mod dashboard;
mod live_panel;
mod osint_panel;
mod volume_meter;

pub use campaign_panel::CampaignPanel;
pub use dashboard::Dashboard;
pub use live_panel::LivePanel;
pub use osint_panel::OsintPanel;
pub use volume_meter::VolumeMeter;

//! Settings configuration types

mod analytics;
mod voice;

pub use analytics::{AnalyticsSettings, StoreKind};
pub use voice::VoiceSettings;

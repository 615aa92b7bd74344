//! Export and import command implementations

use anyhow::{Context, Result};
use std::path::Path;

use voxport::config::{Config, write_atomic};
use voxport::stats::{AnalyticsExport, VoiceAnalytics};

/// Write the event log and session history as JSON
pub fn export_command(config: &Config, file: &Path) -> Result<()> {
    let analytics = VoiceAnalytics::open(&config.analytics)?;
    let export = analytics.export_data();

    let json = serde_json::to_string_pretty(&export)?;
    write_atomic(file, &json)
        .with_context(|| format!("Failed to write export: {}", file.display()))?;

    println!(
        "Exported {} events and {} sessions to {}",
        export.events.len(),
        export.sessions.len(),
        file.display()
    );
    Ok(())
}

/// Replace the stored analytics with an export file
pub fn import_command(config: &Config, file: &Path) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read export: {}", file.display()))?;
    let export: AnalyticsExport = serde_json::from_str(&content)
        .with_context(|| format!("Invalid analytics export: {}", file.display()))?;

    let mut analytics = VoiceAnalytics::open(&config.analytics)?;
    analytics.import_data(export);

    if analytics.is_persistence_degraded() {
        eprintln!("Warning: analytics store rejected the import; data was not saved.");
    }
    println!(
        "Imported {} events and {} sessions",
        analytics.events().len(),
        analytics.sessions().len()
    );
    Ok(())
}

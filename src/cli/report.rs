//! Report and recommendations command implementations

use anyhow::Result;

use voxport::config::Config;
use voxport::stats::{AnalyticsSnapshot, Recommendation, VoiceAnalytics, trailing_day_buckets};

const RECENT_DAYS: u32 = 7;

/// Print the analytics snapshot from the configured store
pub fn report_command(config: &Config, json: bool) -> Result<()> {
    let analytics = VoiceAnalytics::open(&config.analytics)?;
    let snapshot = analytics.get_analytics();

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print_snapshot(&snapshot);
    }
    Ok(())
}

/// Print the stored optimization recommendations
pub fn recommendations_command(config: &Config) -> Result<()> {
    let analytics = VoiceAnalytics::open(&config.analytics)?;
    print_recommendations(analytics.get_optimization_recommendations());
    Ok(())
}

pub fn print_snapshot(snapshot: &AnalyticsSnapshot) {
    println!(
        "Voice analytics ({} events in window, {} stored)\n",
        snapshot.window_commands, snapshot.total_commands
    );
    println!("  Success rate:         {:.1}%", snapshot.success_rate);
    println!("  Average confidence:   {:.2}", snapshot.average_confidence);
    println!(
        "  Recognition accuracy: {:.1}%",
        snapshot.performance.recognition_accuracy
    );
    println!(
        "  Satisfaction:         {:.1}",
        snapshot.performance.user_satisfaction
    );
    println!(
        "  Avg execution time:   {:.0} ms",
        snapshot.performance.average_execution_time_ms
    );

    let engagement = &snapshot.user_engagement;
    println!(
        "  Engagement:           {} users, {:.0}s/session, {:.1} commands/session",
        engagement.active_users,
        engagement.average_session_duration_secs,
        engagement.commands_per_session
    );

    let trends = &snapshot.trends;
    println!(
        "  Trends:               usage {:+.1}%, confidence {:+.1}%, failures {:+.1}%",
        trends.usage_growth(),
        trends.confidence_change(),
        trends.failure_change()
    );

    if !snapshot.most_used_commands.is_empty() {
        println!("\nMost used commands:");
        for usage in &snapshot.most_used_commands {
            println!(
                "  {:<28} {:>5}  {:>5.1}% ok",
                usage.command, usage.count, usage.success_rate
            );
        }
    }

    if !snapshot.error_patterns.is_empty() {
        println!("\nErrors:");
        for pattern in &snapshot.error_patterns {
            println!(
                "  {:<28} {:>5}  {:>5.1}%",
                pattern.error, pattern.count, pattern.percentage
            );
        }
    }

    if !snapshot.daily_usage.is_empty() {
        println!("\nLast {} days:", RECENT_DAYS);
        for bucket in trailing_day_buckets(snapshot.generated_at, RECENT_DAYS) {
            let (total, successful) = snapshot
                .daily_usage
                .iter()
                .find(|day| day.day == bucket)
                .map_or((0, 0), |day| (day.total, day.successful));
            println!("  {}  {:>5} total  {:>5} ok", bucket, total, successful);
        }
    }
}

pub fn print_recommendations(recommendations: &[Recommendation]) {
    if recommendations.is_empty() {
        println!("No recommendations.");
        return;
    }

    println!("Recommendations ({}):\n", recommendations.len());
    for rec in recommendations {
        println!("  [{}] {}: {}", rec.priority, rec.target, rec.issue);
        println!("    {}", rec.suggestion);
    }
}

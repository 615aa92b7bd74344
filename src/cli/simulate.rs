//! Simulate command implementation
//!
//! Replays a script of adapter callbacks against the full engine, driven
//! on a tokio task exactly as a live host would drive it.
//!
//! Script format, one step per line:
//!
//! ```text
//! # comment
//! say 0.92 show students with score above 85
//! interim show stu
//! error network
//! end
//! speech-ended
//! wait 1500
//! start | stop | mute | unmute
//! ```

use anyhow::{Context, Result, bail};
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;

use voxport::config::Config;
use voxport::stats::VoiceAnalytics;
use voxport::voice::{
    ActionSink, AdapterEvent, AppCommand, EngineInput, SpeechAdapter, SpeechOptions, VoiceEngine,
    catalog, drive,
};

use super::report::{print_recommendations, print_snapshot};

/// One parsed script line
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptStep {
    Input(EngineInput),
    Wait(Duration),
}

/// Parse a whole script. Blank lines and comments are skipped.
pub fn parse_script(script: &str) -> Result<Vec<ScriptStep>> {
    script
        .lines()
        .enumerate()
        .filter_map(|(i, line)| {
            parse_line(line)
                .with_context(|| format!("line {}: {}", i + 1, line.trim()))
                .transpose()
        })
        .collect()
}

fn parse_line(line: &str) -> Result<Option<ScriptStep>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (keyword, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();

    let step = match keyword {
        "say" => {
            let (confidence, text) = rest
                .split_once(char::is_whitespace)
                .context("expected: say <confidence> <text>")?;
            let confidence: f64 = confidence.parse().context("invalid confidence")?;
            let text = text.trim();
            if text.is_empty() {
                bail!("say needs some text");
            }
            ScriptStep::Input(AdapterEvent::final_result(text, confidence).into())
        }
        "interim" => ScriptStep::Input(AdapterEvent::interim(rest).into()),
        "error" => {
            if rest.is_empty() {
                bail!("expected: error <kind>");
            }
            ScriptStep::Input(AdapterEvent::error(rest).into())
        }
        "end" => ScriptStep::Input(AdapterEvent::End.into()),
        "speech-ended" => ScriptStep::Input(AdapterEvent::SpeechEnded.into()),
        "wait" => {
            let ms: u64 = rest.parse().context("expected: wait <ms>")?;
            ScriptStep::Wait(Duration::from_millis(ms))
        }
        "start" => ScriptStep::Input(EngineInput::StartListening),
        "stop" => ScriptStep::Input(EngineInput::StopListening),
        "mute" => ScriptStep::Input(EngineInput::SetMuted(true)),
        "unmute" => ScriptStep::Input(EngineInput::SetMuted(false)),
        other => bail!("unknown step '{}'", other),
    };
    Ok(Some(step))
}

/// Prints what would be spoken and reports the end of each utterance
/// right away.
struct ScriptedAdapter {
    inputs: mpsc::UnboundedSender<EngineInput>,
}

impl SpeechAdapter for ScriptedAdapter {
    fn is_supported(&self) -> bool {
        true
    }

    fn start_listening(&mut self) -> Result<(), String> {
        println!("  (listening)");
        Ok(())
    }

    fn stop_listening(&mut self) {
        println!("  (stopped)");
    }

    fn speak(&mut self, text: &str, _options: &SpeechOptions) {
        println!("  assistant: {}", text);
        let _ = self.inputs.send(AdapterEvent::SpeechEnded.into());
    }
}

/// Replay `script` and print the resulting analytics
pub async fn simulate_command(
    config: &Config,
    script: &Path,
    user: &str,
    persist: bool,
) -> Result<()> {
    let content = std::fs::read_to_string(script)
        .with_context(|| format!("Failed to read script: {}", script.display()))?;
    let steps = parse_script(&content)?;

    let analytics = if persist {
        VoiceAnalytics::open(&config.analytics)?
    } else {
        VoiceAnalytics::in_memory(config.analytics.clone())
    };

    let (sink, mut actions) = ActionSink::channel();
    let registry = catalog::default_registry(&sink, config.voice.wake_gating)?;
    let (tx, rx) = mpsc::unbounded_channel();
    let adapter = ScriptedAdapter { inputs: tx.clone() };

    let mut engine =
        VoiceEngine::with_settings(Box::new(adapter), &config.voice, registry, analytics);
    engine.start_voice_mode(user)?;

    let printer = tokio::spawn(async move {
        while let Some(action) = actions.recv().await {
            print_action(&action);
        }
    });
    let driver = tokio::spawn(drive(engine, rx));

    for step in steps {
        match step {
            ScriptStep::Input(input) => {
                if let EngineInput::Adapter(AdapterEvent::Result {
                    text,
                    is_final: true,
                    ..
                }) = &input
                {
                    println!("user: {}", text);
                }
                tx.send(input).context("voice driver stopped")?;
            }
            ScriptStep::Wait(duration) => tokio::time::sleep(duration).await,
        }
    }
    tx.send(EngineInput::Shutdown).context("voice driver stopped")?;

    let mut engine = driver.await?;
    engine.stop_voice_mode();
    let snapshot = engine.analytics().get_analytics();
    let recommendations = engine.analytics().get_optimization_recommendations().to_vec();

    // Command actions hold sink clones; dropping them ends the printer
    drop(engine);
    drop(sink);
    printer.await?;

    println!();
    print_snapshot(&snapshot);
    println!();
    print_recommendations(&recommendations);
    Ok(())
}

fn print_action(action: &AppCommand) {
    match action {
        AppCommand::Filter { field, params } => println!("  -> filter {} {}", field, params),
        AppCommand::Assistant { request, filters, .. } => println!(
            "  -> assistant '{}' ({} filters)",
            request,
            filters.as_ref().map_or(0, Vec::len)
        ),
        AppCommand::Export => println!("  -> export"),
    }
}

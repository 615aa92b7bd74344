//! Commands command implementation

use anyhow::Result;

use voxport::config::Config;
use voxport::voice::{ActionSink, CommandKind, catalog};

/// List the command catalog in registration order
pub fn commands_command(config: &Config) -> Result<()> {
    let (sink, _actions) = ActionSink::channel();
    let registry = catalog::default_registry(&sink, config.voice.wake_gating)?;

    println!("Voice commands ({}):\n", registry.len());
    for command in registry.commands() {
        let kind = match command.kind {
            CommandKind::Action => "",
            CommandKind::Wake => " [wake]",
            CommandKind::Sleep => " [sleep]",
        };
        println!("  {}{} - {}", command.id, kind, command.description);
        for example in &command.examples {
            println!("      \"{}\"", example);
        }
    }

    Ok(())
}

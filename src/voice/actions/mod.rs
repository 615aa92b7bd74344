//! Voice commands - mapping spoken patterns to actions
//!
//! A command binds a case-insensitive pattern to an action. Transcripts are
//! resolved against commands in registration order; the first match wins.
//!
//! Example:
//! - `show students with score above (\d+)` -> `filter_score` with `["85"]`
//! - `clear filters` -> `clear_filters`

mod command;
mod registry;

pub use command::{ActionFn, CommandDefinition, CommandKind, CommandMatch, CommandPattern};
pub use registry::{CommandRegistry, normalize};

#[cfg(test)]
mod tests;

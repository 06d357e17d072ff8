//! Command registry for REPL commands
//!
//! Each command is a prefix and a handler; the longest matching prefix
//! wins, and whatever follows it is handed to the handler as arguments.

pub mod general;
pub mod patterns;
pub mod transport;

use crate::engine::Engine;
use groove_core::PatternId;
use std::path::PathBuf;

/// Result of executing a command
#[derive(Debug, PartialEq)]
pub enum CommandResult {
    /// Command executed successfully, continue REPL
    Success,
    /// Command executed, show this message
    Message(String),
    /// Exit the REPL
    Exit,
    /// No command matched
    NotACommand,
    /// Error occurred
    Error(String),
    /// Watch a set file for changes
    Watch(PathBuf),
}

/// Context passed to command handlers
pub struct CommandContext {
    pub engine: Engine,
    /// Last file loaded or saved; `save` and `watch` default to it
    pub set_path: Option<PathBuf>,
}

impl CommandContext {
    pub fn new(engine: Engine) -> Self {
        Self {
            engine,
            set_path: None,
        }
    }
}

/// A command handler function
pub type CommandHandler = fn(&str, &mut CommandContext) -> CommandResult;

/// Registry of available commands
pub struct CommandRegistry {
    /// Sorted by prefix length descending for longest-match-first lookup
    commands: Vec<(String, CommandHandler)>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    pub fn register(&mut self, prefix: &str, handler: CommandHandler) {
        self.commands.push((prefix.to_string(), handler));
        self.commands.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    }

    /// Execute a command, returning NotACommand if no match found
    pub fn execute(&self, input: &str, ctx: &mut CommandContext) -> CommandResult {
        for (prefix, handler) in &self.commands {
            if let Some(rest) = input.strip_prefix(prefix.as_str()) {
                if rest.is_empty() || rest.starts_with(char::is_whitespace) {
                    return handler(rest.trim(), ctx);
                }
            }
        }
        CommandResult::NotACommand
    }

    pub fn list_commands(&self) -> Vec<&str> {
        self.commands.iter().map(|(p, _)| p.as_str()).collect()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a fully populated command registry with all built-in commands
pub fn create_registry() -> CommandRegistry {
    let mut registry = CommandRegistry::new();

    // Transport
    registry.register("play", transport::cmd_play);
    registry.register("stop", transport::cmd_stop);
    registry.register("bpm", transport::cmd_bpm);
    registry.register("tap", transport::cmd_tap);
    registry.register("feel", transport::cmd_feel);
    registry.register("humanize", transport::cmd_humanize);
    registry.register("density", transport::cmd_density);
    registry.register("volume", transport::cmd_volume);
    registry.register("mode", transport::cmd_mode);
    registry.register("fill", transport::cmd_fill);
    registry.register("fill-on-switch", transport::cmd_fill_on_switch);
    registry.register("switch", transport::cmd_switch);

    // Pattern editing
    registry.register("pattern", patterns::cmd_pattern);
    registry.register("add", patterns::cmd_add);
    registry.register("remove", patterns::cmd_remove);
    registry.register("move", patterns::cmd_move);
    registry.register("repeat", patterns::cmd_repeat);
    registry.register("cycle", patterns::cmd_cycle);
    registry.register("name", patterns::cmd_name);
    registry.register("list", patterns::cmd_list);
    registry.register("status", patterns::cmd_status);

    // General
    registry.register("load", general::cmd_load);
    registry.register("save", general::cmd_save);
    registry.register("watch", general::cmd_watch);
    registry.register("help", general::cmd_help);
    registry.register("quit", general::cmd_quit);
    registry.register("exit", general::cmd_quit);

    registry
}

/// Parse a 1-based pattern id
pub(crate) fn parse_id(arg: &str) -> Result<PatternId, String> {
    match arg.parse::<u32>() {
        Ok(id) if id >= 1 => Ok(PatternId(id)),
        _ => Err(format!("Invalid pattern id '{}'", arg)),
    }
}

/// Parse an amount in 0..=1; percentages above 1 are accepted too
pub(crate) fn parse_amount(arg: &str) -> Result<f32, String> {
    match arg.trim_end_matches('%').parse::<f32>() {
        Ok(value) if value.is_finite() && value > 1.0 => Ok(value / 100.0),
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(format!("Invalid amount '{}'. Use 0-1 or 0-100%", arg)),
    }
}

pub(crate) fn parse_on_off(arg: &str) -> Result<bool, String> {
    match arg {
        "on" | "true" | "yes" => Ok(true),
        "off" | "false" | "no" => Ok(false),
        _ => Err(format!("Expected 'on' or 'off', got '{}'", arg)),
    }
}

/// Split off the first whitespace-separated word
pub(crate) fn split_first(args: &str) -> (&str, &str) {
    match args.split_once(char::is_whitespace) {
        Some((first, rest)) => (first, rest.trim()),
        None => (args, ""),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::CommandContext;
    use crate::audio::AudioBackend;
    use crate::engine::Engine;
    use groove_core::engine::RecordingVoices;
    use groove_core::{DrumSet, ManualClock, SchedulerConfig};
    use std::sync::Arc;

    pub fn context() -> CommandContext {
        let backend = AudioBackend {
            clock: Arc::new(ManualClock::new(0.0)),
            voices: Box::new(RecordingVoices::new()),
            output: None,
        };
        CommandContext::new(Engine::new(
            DrumSet::default(),
            backend,
            SchedulerConfig::default(),
        ))
    }
}

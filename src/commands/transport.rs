//! Transport and feel commands

use crate::commands::{parse_amount, parse_id, parse_on_off, CommandContext, CommandResult};
use colored::*;
use groove_core::types::drum_set::{MAX_BPM, MIN_BPM};
use groove_core::{Feel, PlaybackMode, SwitchOutcome};

/// Handle `play`
pub fn cmd_play(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    match ctx.engine.play() {
        Ok(()) => {
            let label = ctx.engine.with(|seq| {
                seq.session()
                    .current_pattern()
                    .map(|p| p.label())
                    .unwrap_or_default()
            });
            CommandResult::Message(format!("▶ Playing {}", label).bright_green().to_string())
        }
        Err(e) => CommandResult::Error(format!("Cannot play: {}", e)),
    }
}

/// Handle `stop`
pub fn cmd_stop(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    ctx.engine.stop();
    CommandResult::Message("■ Stopped".yellow().to_string())
}

/// Handle `bpm [n]`
pub fn cmd_bpm(args: &str, ctx: &mut CommandContext) -> CommandResult {
    if args.is_empty() {
        let bpm = ctx.engine.with(|seq| seq.set().bpm());
        return CommandResult::Message(format!("Current tempo: {} BPM", bpm));
    }
    match args.parse::<u32>() {
        Ok(bpm) => {
            let applied = ctx.engine.with(|seq| seq.set_bpm(bpm));
            CommandResult::Message(
                format!("🎵 Tempo set to {} BPM", applied)
                    .bright_green()
                    .to_string(),
            )
        }
        Err(_) => CommandResult::Error(format!(
            "Invalid tempo. Use a value between {}-{} BPM",
            MIN_BPM, MAX_BPM
        )),
    }
}

/// Handle `tap`
pub fn cmd_tap(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    match ctx.engine.tap() {
        Some(bpm) => CommandResult::Message(
            format!("👆 Tap tempo: {} BPM", bpm)
                .bright_green()
                .to_string(),
        ),
        None => CommandResult::Message("👆 Keep tapping...".to_string()),
    }
}

/// Handle `feel <straight|swing|shuffle>`
pub fn cmd_feel(args: &str, ctx: &mut CommandContext) -> CommandResult {
    if args.is_empty() {
        let feel = ctx.engine.with(|seq| seq.set().feel());
        return CommandResult::Message(format!("Feel: {}", feel));
    }
    match args.parse::<Feel>() {
        Ok(feel) => {
            ctx.engine.with(|seq| seq.set_feel(feel));
            CommandResult::Message(format!("Feel set to {}", feel.to_string().cyan()))
        }
        Err(e) => CommandResult::Error(e),
    }
}

/// Handle `humanize <amount>`
pub fn cmd_humanize(args: &str, ctx: &mut CommandContext) -> CommandResult {
    if args.is_empty() {
        let amount = ctx.engine.with(|seq| seq.set().humanize());
        return CommandResult::Message(format!("Humanize: {:.0}%", amount * 100.0));
    }
    match parse_amount(args) {
        Ok(amount) => {
            let applied = ctx.engine.with(|seq| seq.set_humanize(amount));
            CommandResult::Message(format!("Humanize set to {:.0}%", applied * 100.0))
        }
        Err(e) => CommandResult::Error(e),
    }
}

/// Handle `density <amount>`
pub fn cmd_density(args: &str, ctx: &mut CommandContext) -> CommandResult {
    if args.is_empty() {
        let amount = ctx.engine.with(|seq| seq.set().density());
        return CommandResult::Message(format!("Density: {:.0}%", amount * 100.0));
    }
    match parse_amount(args) {
        Ok(amount) => {
            let applied = ctx.engine.with(|seq| seq.set_density(amount));
            CommandResult::Message(format!("Density set to {:.0}%", applied * 100.0))
        }
        Err(e) => CommandResult::Error(e),
    }
}

/// Handle `volume <level>`
pub fn cmd_volume(args: &str, ctx: &mut CommandContext) -> CommandResult {
    if args.is_empty() {
        let volume = ctx.engine.with(|seq| seq.set().master_volume());
        return CommandResult::Message(format!("Volume: {:.0}%", volume * 100.0));
    }
    match parse_amount(args) {
        Ok(volume) => {
            let applied = ctx.engine.set_master_volume(volume);
            CommandResult::Message(format!("🔊 Volume set to {:.0}%", applied * 100.0))
        }
        Err(e) => CommandResult::Error(e),
    }
}

/// Handle `mode <loop|cycle>`
pub fn cmd_mode(args: &str, ctx: &mut CommandContext) -> CommandResult {
    if args.is_empty() {
        let mode = ctx.engine.with(|seq| seq.set().mode());
        return CommandResult::Message(format!("Mode: {}", mode));
    }
    match args.parse::<PlaybackMode>() {
        Ok(mode) => {
            ctx.engine.with(|seq| seq.set_mode(mode));
            CommandResult::Message(format!("Mode set to {}", mode.to_string().cyan()))
        }
        Err(e) => CommandResult::Error(e),
    }
}

/// Handle `fill`
pub fn cmd_fill(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    match ctx.engine.with(|seq| seq.trigger_fill()) {
        Ok(true) => CommandResult::Message("🥁 Fill!".bright_yellow().to_string()),
        Ok(false) => CommandResult::Message("No room left in this bar for a fill".to_string()),
        Err(e) => CommandResult::Error(format!("Cannot fill: {}", e)),
    }
}

/// Handle `fill-on-switch <on|off>`
pub fn cmd_fill_on_switch(args: &str, ctx: &mut CommandContext) -> CommandResult {
    match parse_on_off(args) {
        Ok(enabled) => {
            ctx.engine.with(|seq| seq.set_fill_on_switch(enabled));
            let state = if enabled { "on" } else { "off" };
            CommandResult::Message(format!("Fill on switch {}", state))
        }
        Err(e) => CommandResult::Error(e),
    }
}

/// Handle `switch <id>`
pub fn cmd_switch(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let id = match parse_id(args) {
        Ok(id) => id,
        Err(e) => return CommandResult::Error(e),
    };
    match ctx.engine.with(|seq| seq.switch_pattern(id)) {
        Ok(SwitchOutcome::Switched) => CommandResult::Message(format!("Switched to pattern {}", id)),
        Ok(SwitchOutcome::Queued) => CommandResult::Message(format!(
            "⏭ Pattern {} queued for the next bar",
            id
        )),
        Ok(SwitchOutcome::AlreadyActive) => {
            CommandResult::Message(format!("Pattern {} is already playing, fill!", id))
        }
        Err(e) => CommandResult::Error(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::context;
    use groove_core::PatternId;

    #[test]
    fn test_bpm_is_clamped() {
        let mut ctx = context();
        assert!(matches!(cmd_bpm("500", &mut ctx), CommandResult::Message(_)));
        assert_eq!(ctx.engine.with(|seq| seq.set().bpm()), 240);
        assert!(matches!(cmd_bpm("fast", &mut ctx), CommandResult::Error(_)));
    }

    #[test]
    fn test_feel_and_mode() {
        let mut ctx = context();
        cmd_feel("swing", &mut ctx);
        cmd_mode("cycle", &mut ctx);
        assert_eq!(ctx.engine.with(|seq| seq.set().feel()), Feel::Swing);
        assert_eq!(ctx.engine.with(|seq| seq.set().mode()), PlaybackMode::Cycle);
        assert!(matches!(cmd_feel("waltz", &mut ctx), CommandResult::Error(_)));
    }

    #[test]
    fn test_amounts() {
        let mut ctx = context();
        cmd_humanize("40%", &mut ctx);
        cmd_density("0.3", &mut ctx);
        cmd_volume("2", &mut ctx);
        let set = ctx.engine.snapshot();
        assert_eq!(set.humanize, 0.4);
        assert_eq!(set.density, 0.3);
        assert_eq!(set.volume, 0.02);
    }

    #[test]
    fn test_switch_while_playing_is_queued() {
        let mut ctx = context();
        cmd_play("", &mut ctx);
        assert!(matches!(cmd_switch("2", &mut ctx), CommandResult::Message(_)));
        assert_eq!(
            ctx.engine.with(|seq| seq.state().next_pattern_id),
            Some(PatternId(2))
        );
        assert!(matches!(cmd_switch("9", &mut ctx), CommandResult::Error(_)));
        cmd_stop("", &mut ctx);
        assert_eq!(
            ctx.engine.with(|seq| seq.state().current_pattern_id),
            PatternId(2)
        );
    }
}

//! Pattern editing and inspection commands

use crate::commands::{parse_id, parse_on_off, split_first, CommandContext, CommandResult};
use colored::*;
use groove_core::parser::format_steps;
use groove_core::{PatternId, PlaybackState};
use std::fmt::Write;

/// Handle `pattern <id> <text>`
pub fn cmd_pattern(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let (id, text) = split_first(args);
    let id = match parse_id(id) {
        Ok(id) => id,
        Err(e) => return CommandResult::Error(e),
    };
    if text.is_empty() {
        return match ctx.engine.with(|seq| seq.set().pattern(id).map(|p| p.raw_text().to_string())) {
            Some(text) => CommandResult::Message(format!("{}: {}", id, text.cyan())),
            None => CommandResult::Error(format!("No pattern with id {}", id)),
        };
    }
    match ctx.engine.with(|seq| seq.set_pattern_text(id, text)) {
        Ok(()) => CommandResult::Message(format!("✓ Pattern {} updated", id).green().to_string()),
        Err(e) => CommandResult::Error(e.to_string()),
    }
}

/// Handle `add <text>`
pub fn cmd_add(args: &str, ctx: &mut CommandContext) -> CommandResult {
    if args.is_empty() {
        return CommandResult::Error("Usage: add <pattern text>".to_string());
    }
    match ctx.engine.with(|seq| seq.add_pattern(args)) {
        Ok(id) => CommandResult::Message(format!("✓ Added pattern {}", id).green().to_string()),
        Err(e) => CommandResult::Error(e.to_string()),
    }
}

/// Handle `remove <id>`
pub fn cmd_remove(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let id = match parse_id(args) {
        Ok(id) => id,
        Err(e) => return CommandResult::Error(e),
    };
    match ctx.engine.with(|seq| seq.remove_pattern(id)) {
        Ok(()) => CommandResult::Message(format!("Removed pattern {}", id)),
        Err(e) => CommandResult::Error(e.to_string()),
    }
}

/// Handle `move <from> <to>`
pub fn cmd_move(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let (from, to) = split_first(args);
    let (from, to) = match (parse_id(from), parse_id(to)) {
        (Ok(from), Ok(to)) => (from, to),
        (Err(e), _) | (_, Err(e)) => return CommandResult::Error(e),
    };
    match ctx.engine.with(|seq| seq.move_pattern(from, to)) {
        Ok(()) => CommandResult::Message(format!("Moved pattern {} to {}", from, to)),
        Err(e) => CommandResult::Error(e.to_string()),
    }
}

/// Handle `repeat <id> <n>`
pub fn cmd_repeat(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let (id, count) = split_first(args);
    let id = match parse_id(id) {
        Ok(id) => id,
        Err(e) => return CommandResult::Error(e),
    };
    let Ok(count) = count.parse::<u32>() else {
        return CommandResult::Error("Usage: repeat <id> <count>".to_string());
    };
    match ctx.engine.with(|seq| seq.set_repeat_count(id, count)) {
        Ok(applied) => CommandResult::Message(format!("Pattern {} repeats x{}", id, applied)),
        Err(e) => CommandResult::Error(e.to_string()),
    }
}

/// Handle `cycle <id> <on|off>`
pub fn cmd_cycle(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let (id, flag) = split_first(args);
    let id = match parse_id(id) {
        Ok(id) => id,
        Err(e) => return CommandResult::Error(e),
    };
    let include = match parse_on_off(flag) {
        Ok(include) => include,
        Err(e) => return CommandResult::Error(e),
    };
    match ctx.engine.with(|seq| seq.set_include_in_cycle(id, include)) {
        Ok(()) if include => CommandResult::Message(format!("Pattern {} is in the cycle", id)),
        Ok(()) => CommandResult::Message(format!("Pattern {} is skipped by the cycle", id)),
        Err(e) => CommandResult::Error(e.to_string()),
    }
}

/// Handle `name <id> [text]`; no text clears the name
pub fn cmd_name(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let (id, name) = split_first(args);
    let id = match parse_id(id) {
        Ok(id) => id,
        Err(e) => return CommandResult::Error(e),
    };
    let name = Some(name.to_string()).filter(|n| !n.is_empty());
    match ctx.engine.with(|seq| seq.set_display_name(id, name)) {
        Ok(()) => CommandResult::Success,
        Err(e) => CommandResult::Error(e.to_string()),
    }
}

/// Handle `list`
pub fn cmd_list(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    let output = ctx.engine.with(|seq| {
        let state = seq.state();
        let mut out = String::new();
        for pattern in seq.set().patterns() {
            let marker = if pattern.id() == state.current_pattern_id {
                "▶".bright_green()
            } else if Some(pattern.id()) == state.next_pattern_id {
                "⏭".yellow()
            } else {
                " ".normal()
            };
            let mut flags = format!("x{}", pattern.repeat_count());
            if !pattern.include_in_cycle() {
                flags.push_str(" skip");
            }
            let _ = writeln!(
                out,
                "{} {:>2}  {:<12} {:<8} {}",
                marker,
                pattern.id(),
                pattern.label(),
                flags.dimmed(),
                format_steps(pattern.steps()).cyan()
            );
        }
        out
    });
    CommandResult::Message(output.trim_end().to_string())
}

/// Handle `status`
pub fn cmd_status(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    let silent = ctx.engine.is_silent();
    let output = ctx.engine.with(|seq| {
        let set = seq.set();
        let state = seq.state();
        let mut out = String::new();
        let _ = writeln!(out, "{}", transport_line(&state));
        let _ = writeln!(
            out,
            "Tempo {} BPM  Feel {}  Mode {}",
            set.bpm(),
            set.feel(),
            set.mode()
        );
        let _ = writeln!(
            out,
            "Humanize {:.0}%  Density {:.0}%  Volume {:.0}%",
            set.humanize() * 100.0,
            set.density() * 100.0,
            set.master_volume() * 100.0
        );
        let fill = if seq.session().fill_on_switch() { "on" } else { "off" };
        let output = if silent { "silent" } else { "audio" };
        let _ = write!(out, "Fill on switch {}  Output {}", fill, output);
        out
    });
    CommandResult::Message(output)
}

fn transport_line(state: &PlaybackState) -> String {
    let transport = if state.is_playing {
        "▶ playing".bright_green()
    } else {
        "■ stopped".yellow()
    };
    let next = state
        .next_pattern_id
        .map(|id: PatternId| format!(" → {}", id))
        .unwrap_or_default();
    format!(
        "{}  pattern {}{}  bar {} step {}  repeat {}",
        transport,
        state.current_pattern_id,
        next,
        state.current_bar + 1,
        state.current_step + 1,
        state.repeat_count
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::context;

    #[test]
    fn test_edit_and_reject() {
        let mut ctx = context();
        assert!(matches!(
            cmd_pattern("1 k k s s", &mut ctx),
            CommandResult::Message(_)
        ));
        match cmd_pattern("1 k x s", &mut ctx) {
            CommandResult::Error(e) => assert!(e.contains("'x'")),
            other => panic!("expected an error, got {:?}", other),
        }
        let text = ctx
            .engine
            .with(|seq| seq.set().pattern(PatternId(1)).unwrap().raw_text().to_string());
        assert_eq!(text, "k k s s");
    }

    #[test]
    fn test_add_remove_move() {
        let mut ctx = context();
        assert!(matches!(cmd_add("s s s s", &mut ctx), CommandResult::Message(_)));
        assert_eq!(ctx.engine.with(|seq| seq.set().len()), 5);
        cmd_move("5 1", &mut ctx);
        let first = ctx
            .engine
            .with(|seq| seq.set().pattern(PatternId(1)).unwrap().raw_text().to_string());
        assert_eq!(first, "s s s s");
        cmd_remove("1", &mut ctx);
        assert_eq!(ctx.engine.with(|seq| seq.set().len()), 4);
        assert!(matches!(cmd_add("k", &mut ctx), CommandResult::Error(_)));
    }

    #[test]
    fn test_repeat_cycle_and_name() {
        let mut ctx = context();
        cmd_repeat("2 150", &mut ctx);
        cmd_cycle("3 off", &mut ctx);
        cmd_name("4 break", &mut ctx);
        ctx.engine.with(|seq| {
            let set = seq.set();
            assert_eq!(set.pattern(PatternId(2)).unwrap().repeat_count(), 99);
            assert!(!set.pattern(PatternId(3)).unwrap().include_in_cycle());
            assert_eq!(set.pattern(PatternId(4)).unwrap().label(), "break");
        });
        assert!(matches!(cmd_repeat("2 lots", &mut ctx), CommandResult::Error(_)));
        assert!(matches!(cmd_cycle("2 maybe", &mut ctx), CommandResult::Error(_)));
    }

    #[test]
    fn test_list_and_status() {
        let mut ctx = context();
        match cmd_list("", &mut ctx) {
            CommandResult::Message(list) => {
                assert_eq!(list.lines().count(), 4);
                assert!(list.contains("Pattern 1"));
            }
            other => panic!("unexpected {:?}", other),
        }
        match cmd_status("", &mut ctx) {
            CommandResult::Message(status) => {
                assert!(status.contains("stopped"));
                assert!(status.contains("120 BPM"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}

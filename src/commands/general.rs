//! General REPL commands (files, help, quit)

use crate::commands::{CommandContext, CommandResult};
use crate::set_file::SetFile;
use colored::*;
use groove_core::DrumSymbol;
use std::path::PathBuf;

/// Handle `help` command
pub fn cmd_help(_args: &str, _ctx: &mut CommandContext) -> CommandResult {
    print_help();
    CommandResult::Success
}

/// Handle `quit` or `exit` command
pub fn cmd_quit(_args: &str, _ctx: &mut CommandContext) -> CommandResult {
    CommandResult::Exit
}

/// Handle `load <file>`
pub fn cmd_load(args: &str, ctx: &mut CommandContext) -> CommandResult {
    if args.is_empty() {
        return CommandResult::Error("Usage: load <file>".to_string());
    }
    let path = PathBuf::from(args);
    match SetFile::load(&path).and_then(|file| ctx.engine.load(&file)) {
        Ok(()) => {
            let message = format!("✓ Loaded {}", path.display()).green().to_string();
            ctx.set_path = Some(path);
            CommandResult::Message(message)
        }
        Err(e) => CommandResult::Error(format!("{:#}", e)),
    }
}

/// Handle `save [file]`; defaults to the last loaded or saved file
pub fn cmd_save(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let path = match (args.is_empty(), &ctx.set_path) {
        (false, _) => PathBuf::from(args),
        (true, Some(path)) => path.clone(),
        (true, None) => return CommandResult::Error("Usage: save <file>".to_string()),
    };
    match ctx.engine.snapshot().save(&path) {
        Ok(()) => {
            let message = format!("✓ Saved {}", path.display()).green().to_string();
            ctx.set_path = Some(path);
            CommandResult::Message(message)
        }
        Err(e) => CommandResult::Error(format!("{:#}", e)),
    }
}

/// Handle `watch [file]`
pub fn cmd_watch(args: &str, ctx: &mut CommandContext) -> CommandResult {
    match (args.is_empty(), &ctx.set_path) {
        (false, _) => CommandResult::Watch(PathBuf::from(args)),
        (true, Some(path)) => CommandResult::Watch(path.clone()),
        (true, None) => CommandResult::Error("Usage: watch <file>".to_string()),
    }
}

/// Print help information
fn print_help() {
    println!("{}", "🥁 Groove Help".bold());
    println!("{}", "==============".bold());
    println!();
    println!("{}", "Pattern Text:".green());
    println!(
        "  Tokens are separated by spaces; each token is one sixteenth step."
    );
    println!(
        "  {} is a rest, {} plays kick and closed hat together.",
        ".".cyan(),
        "kh".cyan()
    );
    println!("  16 steps make a bar; patterns hold 2-64 steps.");
    println!();
    println!("{}", "Voices:".green());
    for chunk in DrumSymbol::ALL.chunks(6) {
        let line: Vec<String> = chunk
            .iter()
            .map(|voice| format!("{} {:<11}", voice.symbol().to_string().cyan(), voice.sample_name()))
            .collect();
        println!("  {}", line.join(" "));
    }
    println!();
    println!("{}", "Transport:".green());
    println!("  {}                  - Start playback", "play".cyan());
    println!("  {}                  - Stop playback", "stop".cyan());
    println!("  {}              - Show or set tempo (40-240)", "bpm [n]".cyan());
    println!("  {}                   - Tap tempo", "tap".cyan());
    println!(
        "  {}              - straight, swing or shuffle",
        "feel <f>".cyan()
    );
    println!("  {}          - Timing and velocity jitter (0-1)", "humanize <x>".cyan());
    println!("  {}           - Ghost notes and extra hats (0-1)", "density <x>".cyan());
    println!("  {}            - Master volume (0-1)", "volume <x>".cyan());
    println!("  {}  - Loop one pattern or cycle through all", "mode <loop|cycle>".cyan());
    println!("  {}                  - Fill to the end of the bar", "fill".cyan());
    println!("  {} - Fill whenever a switch is queued", "fill-on-switch <on|off>".cyan());
    println!("  {}           - Switch pattern (next bar while playing)", "switch <id>".cyan());
    println!();
    println!("{}", "Patterns:".green());
    println!("  {}    - Replace a pattern's text", "pattern <id> <text>".cyan());
    println!("  {}            - Add a pattern", "add <text>".cyan());
    println!("  {}           - Remove a pattern", "remove <id>".cyan());
    println!("  {}      - Reorder patterns", "move <from> <to>".cyan());
    println!("  {}       - Loops before the cycle advances", "repeat <id> <n>".cyan());
    println!("  {}  - Include or skip in cycle mode", "cycle <id> <on|off>".cyan());
    println!("  {}      - Name a pattern (empty clears)", "name <id> [text]".cyan());
    println!("  {}                  - List patterns", "list".cyan());
    println!("  {}                - Show playback state", "status".cyan());
    println!();
    println!("{}", "Files:".green());
    println!("  {}           - Load a set file", "load <file>".cyan());
    println!("  {}         - Save the current set", "save [file]".cyan());
    println!("  {}        - Reload the set file when it changes", "watch [file]".cyan());
    println!();
    println!("{}", "Other Commands:".green());
    println!("  {}              - Show this help", "help".bright_green());
    println!("  {}              - Exit the REPL", "quit".bright_red());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::context;
    use groove_core::PatternId;
    use std::fs;

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir().join(format!("groove-cmd-{}.json", std::process::id()));
        let arg = path.to_string_lossy().to_string();
        let mut ctx = context();
        ctx.engine.with(|seq| seq.set_bpm(77));

        assert!(matches!(cmd_save(&arg, &mut ctx), CommandResult::Message(_)));
        assert_eq!(ctx.set_path.as_deref(), Some(path.as_path()));

        ctx.engine.with(|seq| seq.set_bpm(120));
        ctx.engine.with(|seq| seq.set_pattern_text(PatternId(1), "s s").unwrap());
        assert!(matches!(cmd_load(&arg, &mut ctx), CommandResult::Message(_)));
        ctx.engine.with(|seq| {
            assert_eq!(seq.set().bpm(), 77);
            assert_eq!(seq.set().pattern(PatternId(1)).unwrap().raw_text(), "k h s h k h s h");
        });
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_file_commands_need_a_path() {
        let mut ctx = context();
        assert!(matches!(cmd_save("", &mut ctx), CommandResult::Error(_)));
        assert!(matches!(cmd_watch("", &mut ctx), CommandResult::Error(_)));
        assert!(matches!(cmd_load("", &mut ctx), CommandResult::Error(_)));
        assert!(matches!(
            cmd_load("/nonexistent/groove.json", &mut ctx),
            CommandResult::Error(_)
        ));
        ctx.set_path = Some(PathBuf::from("set.json"));
        assert_eq!(
            cmd_watch("", &mut ctx),
            CommandResult::Watch(PathBuf::from("set.json"))
        );
    }
}

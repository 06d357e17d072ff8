//! Interactive REPL for driving the sequencer

use crate::commands::{create_registry, transport, CommandContext, CommandRegistry, CommandResult};
use crate::engine::Engine;
use crate::repl::watcher::SetWatcher;
use crate::set_file::SetFile;
use anyhow::Result;
use colored::*;
use crossbeam_channel::{unbounded, Receiver, Sender};
use notify::Event;
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RustylineResult};
use std::path::Path;
use std::thread;
use tracing::{info, warn};

pub mod watcher;

/// Types of events the REPL loop handles
enum ReplEvent {
    Input(Result<String, ReadlineError>),
}

/// What the loop should do after handling a line
#[derive(Debug, PartialEq)]
enum Flow {
    Continue,
    Exit,
}

pub struct Repl {
    editor: Option<DefaultEditor>,
    registry: CommandRegistry,
    ctx: CommandContext,

    // Event channels
    tx_input: Sender<ReplEvent>,
    rx_input: Receiver<ReplEvent>,
    tx_watcher: Sender<notify::Result<Event>>,
    rx_watcher: Receiver<notify::Result<Event>>,

    watcher: Option<SetWatcher>,
}

impl Repl {
    pub fn new(engine: Engine) -> RustylineResult<Self> {
        let editor = DefaultEditor::new()?;
        let (tx_input, rx_input) = unbounded();
        let (tx_watcher, rx_watcher) = unbounded();

        Ok(Repl {
            editor: Some(editor),
            registry: create_registry(),
            ctx: CommandContext::new(engine),
            tx_input,
            rx_input,
            tx_watcher,
            rx_watcher,
            watcher: None,
        })
    }

    pub fn context(&self) -> &CommandContext {
        &self.ctx
    }

    /// Remember `path` as the current set file (used by `save`/`watch`)
    pub fn set_path<P: AsRef<Path>>(&mut self, path: P) {
        self.ctx.set_path = Some(path.as_ref().to_path_buf());
    }

    /// Start reloading `path` whenever it changes on disk
    pub fn watch<P: AsRef<Path>>(&mut self, path: P) {
        let path = path.as_ref();
        if self.watcher.is_none() {
            match SetWatcher::new(self.tx_watcher.clone()) {
                Ok(w) => self.watcher = Some(w),
                Err(e) => {
                    println!("{} Failed to create watcher: {}", "Error:".red(), e);
                    return;
                }
            }
        }
        if let Some(w) = &mut self.watcher {
            match w.watch(path) {
                Ok(()) => {
                    info!(path = %path.display(), "watching set file");
                    println!(
                        "{} Watching {} for changes...",
                        "👀".bright_cyan(),
                        path.display().to_string().bright_green()
                    );
                }
                Err(e) => println!("{} Failed to watch {}: {}", "Error:".red(), path.display(), e),
            }
        }
    }

    /// Run one line of input
    fn handle_line(&mut self, line: &str) -> Flow {
        let result = match self.registry.execute(line, &mut self.ctx) {
            // a bare number switches pattern
            CommandResult::NotACommand if line.parse::<u32>().is_ok() => {
                transport::cmd_switch(line, &mut self.ctx)
            }
            other => other,
        };
        match result {
            CommandResult::Success => {}
            CommandResult::Message(msg) => println!("{}", msg),
            CommandResult::Exit => return Flow::Exit,
            CommandResult::Error(e) => println!("{} {}", "Error:".bright_red().bold(), e.red()),
            CommandResult::Watch(path) => {
                self.ctx.set_path = Some(path.clone());
                self.watch(&path);
            }
            CommandResult::NotACommand => println!(
                "{} Unknown command '{}'. Type '{}' for a list.",
                "Error:".bright_red().bold(),
                line,
                "help".bright_green()
            ),
        }
        Flow::Continue
    }

    /// Reload a changed set file as live edits
    fn reload(&mut self, path: &Path) {
        println!("{} File changed: {}", "⚡".bright_yellow(), path.display());
        let file = match SetFile::load(path) {
            Ok(file) => file,
            Err(e) => {
                warn!(path = %path.display(), "reload failed: {:#}", e);
                println!("{} {:#}", "Error:".red(), e);
                return;
            }
        };
        let report = self.ctx.engine.reload(&file);
        for (entry, err) in &report.rejected {
            println!("{} pattern {}: {}", "Skipped:".yellow(), entry, err);
        }
        println!(
            "{} Reloaded ({} edited, {} added, {} removed)",
            "✓".bright_green(),
            report.edited,
            report.added,
            report.removed
        );
    }

    /// Start the REPL loop
    pub fn run(&mut self) -> Result<()> {
        println!(
            "{} {}",
            "🥁".bright_yellow(),
            "Groove Drum Sequencer".bright_cyan().bold()
        );
        println!(
            "Try: {}, {}, {}",
            "play".cyan(),
            "pattern 1 kh . sh h".cyan(),
            "switch 2".cyan()
        );
        println!(
            "Type '{}' for more information, '{}' or {} to exit.\n",
            "help".bright_green(),
            "quit".bright_red(),
            "Ctrl+C".bright_red()
        );
        if self.ctx.engine.is_silent() {
            println!("{} no audio output, triggers are only logged\n", "Silent:".yellow());
        }

        let Some(mut editor) = self.editor.take() else {
            anyhow::bail!("REPL is already running");
        };
        let tx_input = self.tx_input.clone();

        thread::spawn(move || loop {
            let prompt = format!("{} ", "groove>".bright_magenta().bold());
            match editor.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim().to_string();
                    if !line.is_empty() {
                        let _ = editor.add_history_entry(&line);
                    }
                    if tx_input.send(ReplEvent::Input(Ok(line))).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    let _ = tx_input.send(ReplEvent::Input(Err(err)));
                    break;
                }
            }
        });

        loop {
            crossbeam_channel::select! {
                recv(self.rx_input) -> msg => match msg {
                    Ok(ReplEvent::Input(Ok(line))) => {
                        if line.is_empty() {
                            continue;
                        }
                        if self.handle_line(&line) == Flow::Exit {
                            break;
                        }
                    }
                    Ok(ReplEvent::Input(Err(ReadlineError::Interrupted | ReadlineError::Eof))) => break,
                    Ok(ReplEvent::Input(Err(err))) => {
                        println!(
                            "{} {}",
                            "Error reading input:".bright_red().bold(),
                            err.to_string().red()
                        );
                        break;
                    }
                    Err(_) => break,
                },

                recv(self.rx_watcher) -> msg => match msg {
                    Ok(Ok(event)) => {
                        let changed = self
                            .watcher
                            .as_ref()
                            .map(|w| w.changed_files(&event))
                            .unwrap_or_default();
                        for path in changed {
                            self.reload(&path);
                        }
                    }
                    Ok(Err(e)) => println!("{} Watch error: {}", "Error:".red(), e),
                    Err(_) => break,
                }
            }
        }

        self.ctx.engine.stop();
        println!("{} 🥁", "Goodbye!".bright_cyan());
        Ok(())
    }
}

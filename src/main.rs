use anyhow::Result;
use clap::Parser;
use groove::audio::AudioBackend;
use groove::repl::Repl;
use groove::{DrumSet, Engine, SetFile};
use groove_core::SchedulerConfig;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::filter::LevelFilter;

#[derive(Parser)]
#[command(name = "groove")]
#[command(about = "Live text-driven drum sequencer", long_about = None)]
struct Cli {
    /// Set file (JSON) to load at startup
    set: Option<PathBuf>,

    /// Tempo in BPM, overriding the set file
    #[arg(short, long)]
    bpm: Option<u32>,

    /// Reload the set file whenever it changes
    #[arg(short, long, requires = "set")]
    watch: bool,

    /// Run without an audio device; triggers are logged
    #[arg(long)]
    silent: bool,

    /// More log output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let mut set = match &cli.set {
        Some(path) => SetFile::load(path)?.to_drum_set()?,
        None => DrumSet::default(),
    };
    if let Some(bpm) = cli.bpm {
        set.set_bpm(bpm);
    }

    let backend = AudioBackend::open_or_silent(cli.silent, set.master_volume());
    info!(silent = backend.is_silent(), patterns = set.len(), "starting");
    let engine = Engine::new(set, backend, SchedulerConfig::default());

    let mut repl = Repl::new(engine)?;
    if let Some(path) = &cli.set {
        repl.set_path(path);
        if cli.watch {
            repl.watch(path);
        }
    }
    repl.run()
}

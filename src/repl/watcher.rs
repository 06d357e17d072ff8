use crossbeam_channel::Sender;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};

/// Watches set files and forwards notify events to a channel.
///
/// The parent directory is watched rather than the file itself, since many
/// editors save by writing a new file and renaming it over the old one.
pub struct SetWatcher {
    watcher: RecommendedWatcher,
    files: Vec<PathBuf>,
}

impl SetWatcher {
    pub fn new(tx: Sender<notify::Result<Event>>) -> notify::Result<Self> {
        let watcher = notify::recommended_watcher(move |res| {
            // the receiver is gone once the REPL exits
            let _ = tx.send(res);
        })?;
        Ok(Self {
            watcher,
            files: Vec::new(),
        })
    }

    pub fn watch<P: AsRef<Path>>(&mut self, path: P) -> notify::Result<()> {
        let file = absolute(path.as_ref());
        if self.files.contains(&file) {
            return Ok(());
        }
        let dir = file.parent().unwrap_or(Path::new("/")).to_path_buf();
        if !self.files.iter().any(|f| f.parent() == Some(dir.as_path())) {
            self.watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        }
        self.files.push(file);
        Ok(())
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Watched files touched by a content change in `event`
    pub fn changed_files(&self, event: &Event) -> Vec<PathBuf> {
        if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
            return Vec::new();
        }
        let mut changed: Vec<PathBuf> = self
            .files
            .iter()
            .filter(|file| event.paths.iter().any(|p| absolute(p) == **file))
            .cloned()
            .collect();
        changed.dedup();
        changed
    }
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

//! JSON set files: save, load and hot reload a drum set.
//!
//! ```json
//! {
//!   "name": "practice",
//!   "bpm": 96,
//!   "feel": "swing",
//!   "mode": "cycle",
//!   "humanize": 0.3,
//!   "density": 0.2,
//!   "volume": 0.8,
//!   "patterns": [
//!     { "text": "k h s h k h s h", "repeat": 2 },
//!     { "text": "k . s . k k s .", "name": "push", "cycle": false }
//!   ]
//! }
//! ```

use anyhow::{anyhow, Context, Result};
use groove_core::types::drum_set::{DEFAULT_BPM, DEFAULT_VOLUME};
use groove_core::{
    DrumSet, Feel, PatternError, PatternId, PlaybackMode, Sequencer, VoiceTrigger,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default = "default_bpm")]
    pub bpm: u32,
    #[serde(default)]
    pub feel: Feel,
    #[serde(default)]
    pub mode: PlaybackMode,
    #[serde(default)]
    pub humanize: f32,
    #[serde(default)]
    pub density: f32,
    #[serde(default = "default_volume")]
    pub volume: f32,
    pub patterns: Vec<PatternEntry>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatternEntry {
    pub text: String,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default = "default_cycle")]
    pub cycle: bool,
}

fn default_bpm() -> u32 {
    u32::from(DEFAULT_BPM)
}

fn default_volume() -> f32 {
    DEFAULT_VOLUME
}

fn default_repeat() -> u32 {
    1
}

fn default_cycle() -> bool {
    true
}

/// What a hot reload changed
#[derive(Debug, Default, PartialEq)]
pub struct ReloadReport {
    pub edited: usize,
    pub added: usize,
    pub removed: usize,
    /// Entries (1-based) that were skipped, with the reason
    pub rejected: Vec<(usize, PatternError)>,
}

impl SetFile {
    pub fn from_set(set: &DrumSet) -> Self {
        Self {
            name: set.name().map(str::to_string),
            bpm: u32::from(set.bpm()),
            feel: set.feel(),
            mode: set.mode(),
            humanize: set.humanize(),
            density: set.density(),
            volume: set.master_volume(),
            patterns: set
                .patterns()
                .iter()
                .map(|p| PatternEntry {
                    text: p.raw_text().to_string(),
                    repeat: u32::from(p.repeat_count()),
                    name: p.display_name().map(str::to_string),
                    cycle: p.include_in_cycle(),
                })
                .collect(),
        }
    }

    /// Build a drum set. Every pattern must be valid; out-of-range
    /// parameters are clamped.
    pub fn to_drum_set(&self) -> Result<DrumSet> {
        let mut set = DrumSet::from_texts(self.patterns.iter().map(|p| p.text.as_str()))
            .map_err(|err| match err {
                PatternError::Empty => anyhow!("set file has no patterns"),
                other => anyhow!(other),
            })?;
        set.set_name(self.name.clone());
        set.set_bpm(self.bpm);
        set.set_feel(self.feel);
        set.set_mode(self.mode);
        set.set_humanize(self.humanize);
        set.set_density(self.density);
        set.set_master_volume(self.volume);
        for (index, entry) in self.patterns.iter().enumerate() {
            let pattern = set.pattern_mut(PatternId::from_index(index))?;
            pattern.set_repeat_count(entry.repeat);
            pattern.set_display_name(entry.name.clone());
            pattern.set_include_in_cycle(entry.cycle);
        }
        Ok(set)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let file: SetFile = serde_json::from_str(json)?;
        if file.patterns.is_empty() {
            return Err(anyhow!("set file has no patterns"));
        }
        Ok(file)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("Invalid set file {}", path.display()))
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_json()? + "\n")
            .with_context(|| format!("Failed to write {}", path.display()))
    }

    /// Apply the file to a running sequencer without stopping it.
    ///
    /// Pattern texts go through the same validation as live edits; an
    /// invalid one is reported and the pattern keeps its previous text.
    pub fn apply_to<V: VoiceTrigger>(&self, seq: &mut Sequencer<V>) -> ReloadReport {
        let mut report = ReloadReport::default();

        seq.set_name(self.name.clone());
        seq.set_bpm(self.bpm);
        seq.set_feel(self.feel);
        seq.set_mode(self.mode);
        seq.set_humanize(self.humanize);
        seq.set_density(self.density);
        seq.set_master_volume(self.volume);

        for (index, entry) in self.patterns.iter().enumerate() {
            let number = index + 1;
            let id = if index < seq.set().len() {
                let id = PatternId::from_index(index);
                let unchanged = seq
                    .set()
                    .pattern(id)
                    .is_some_and(|p| p.raw_text() == entry.text);
                if !unchanged {
                    match seq.set_pattern_text(id, &entry.text) {
                        Ok(()) => report.edited += 1,
                        Err(err) => report.rejected.push((number, err)),
                    }
                }
                id
            } else {
                match seq.add_pattern(&entry.text) {
                    Ok(id) => {
                        report.added += 1;
                        id
                    }
                    Err(err) => {
                        report.rejected.push((number, err));
                        continue;
                    }
                }
            };
            // the id exists at this point
            let _ = seq.set_repeat_count(id, entry.repeat);
            let _ = seq.set_display_name(id, entry.name.clone());
            let _ = seq.set_include_in_cycle(id, entry.cycle);
        }

        let keep = self.patterns.len().max(1);
        while seq.set().len() > keep {
            let last = PatternId::from_index(seq.set().len() - 1);
            if seq.remove_pattern(last).is_err() {
                break;
            }
            report.removed += 1;
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use groove_core::engine::RecordingVoices;
    use groove_core::{ManualClock, Scheduler, SchedulerConfig};
    use std::sync::Arc;

    fn sequencer(set: DrumSet) -> Sequencer<RecordingVoices> {
        let scheduler = Scheduler::new(
            Arc::new(ManualClock::new(0.0)),
            RecordingVoices::new(),
            SchedulerConfig::default(),
        );
        Sequencer::new(set, scheduler)
    }

    #[test]
    fn test_parse_with_defaults() {
        let file = SetFile::from_json(r#"{ "patterns": [ { "text": "k h s h" } ] }"#).unwrap();
        assert_eq!(file.bpm, 120);
        assert_eq!(file.feel, Feel::Straight);
        assert_eq!(file.mode, PlaybackMode::Loop);
        assert_eq!(file.volume, 0.8);
        assert_eq!(file.patterns[0].repeat, 1);
        assert!(file.patterns[0].cycle);
    }

    #[test]
    fn test_full_file() {
        let json = r#"{
            "name": "practice",
            "bpm": 300,
            "feel": "swing",
            "mode": "cycle",
            "humanize": 0.3,
            "density": 0.2,
            "volume": 0.5,
            "patterns": [
                { "text": "k h s h", "repeat": 2 },
                { "text": "k . s .", "name": "push", "cycle": false }
            ]
        }"#;
        let set = SetFile::from_json(json).unwrap().to_drum_set().unwrap();
        assert_eq!(set.name(), Some("practice"));
        assert_eq!(set.bpm(), 240);
        assert_eq!(set.feel(), Feel::Swing);
        assert_eq!(set.mode(), PlaybackMode::Cycle);
        assert_eq!(set.master_volume(), 0.5);
        assert_eq!(set.pattern(PatternId(1)).unwrap().repeat_count(), 2);
        let second = set.pattern(PatternId(2)).unwrap();
        assert_eq!(second.display_name(), Some("push"));
        assert!(!second.include_in_cycle());
    }

    #[test]
    fn test_rejects_unknown_fields_and_empty_sets() {
        assert!(SetFile::from_json(r#"{ "tempo": 90, "patterns": [] }"#).is_err());
        assert!(SetFile::from_json(r#"{ "patterns": [] }"#).is_err());
        assert!(SetFile::from_json(r#"{ "patterns": [ { "text": "k", "vel": 1 } ] }"#).is_err());
    }

    #[test]
    fn test_invalid_pattern_fails_to_load() {
        let file = SetFile::from_json(r#"{ "patterns": [ { "text": "k x s" } ] }"#).unwrap();
        let err = file.to_drum_set().unwrap_err();
        assert!(err.to_string().contains("'x'"));
    }

    #[test]
    fn test_from_set_round_trips_settings() {
        let mut set = DrumSet::default();
        set.set_bpm(96);
        set.set_feel(Feel::Shuffle);
        set.pattern_mut(PatternId(3)).unwrap().set_repeat_count(4);
        let file = SetFile::from_set(&set);
        let json = file.to_json().unwrap();
        assert!(json.contains("\"shuffle\""));
        assert_eq!(SetFile::from_json(&json).unwrap(), file);
        assert_eq!(file.to_drum_set().unwrap().pattern(PatternId(3)).unwrap().repeat_count(), 4);
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("groove-set-{}.json", std::process::id()));
        let file = SetFile::from_set(&DrumSet::default());
        file.save(&path).unwrap();
        assert_eq!(SetFile::load(&path).unwrap(), file);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_reload_applies_edits_in_place() {
        let mut seq = sequencer(DrumSet::default());
        seq.play().unwrap();
        let file = SetFile::from_json(
            r#"{
                "bpm": 90,
                "density": 0.5,
                "patterns": [
                    { "text": "k k k k" },
                    { "text": "k x s h" },
                    { "text": "kh . sh ." }
                ]
            }"#,
        )
        .unwrap();

        let report = file.apply_to(&mut seq);
        assert_eq!(report.edited, 2);
        assert_eq!(report.removed, 1);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].0, 2);

        assert!(seq.is_playing());
        assert_eq!(seq.set().len(), 3);
        assert_eq!(seq.scheduler().bpm(), 90);
        assert_eq!(seq.scheduler().pattern().len(), 4);
        // the rejected entry keeps its previous text
        assert_eq!(
            seq.set().pattern(PatternId(2)).unwrap().raw_text(),
            "k . s . k k s ."
        );
    }

    #[test]
    fn test_reload_adds_patterns() {
        let mut seq = sequencer(DrumSet::from_texts(["k h"]).unwrap());
        let file = SetFile::from_json(
            r#"{ "patterns": [ { "text": "k h" }, { "text": "s s", "repeat": 3 } ] }"#,
        )
        .unwrap();
        let report = file.apply_to(&mut seq);
        assert_eq!(report.added, 1);
        assert_eq!(report.edited, 0);
        assert_eq!(seq.set().pattern(PatternId(2)).unwrap().repeat_count(), 3);
    }
}

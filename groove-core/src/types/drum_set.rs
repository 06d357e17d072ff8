//! The drum set: patterns plus the global playback parameters.

use super::pattern::{Pattern, PatternId, MAX_PATTERNS};
use super::playback::{Feel, PlaybackMode};
use crate::error::PatternError;

pub const MIN_BPM: u16 = 40;
pub const MAX_BPM: u16 = 240;
pub const DEFAULT_BPM: u16 = 120;
pub const DEFAULT_VOLUME: f32 = 0.8;

/// Patterns every new session starts with
pub const DEFAULT_PATTERNS: [&str; 4] = [
    "k h s h k h s h",
    "k . s . k k s .",
    "kh . sh . kh . sh .",
    "k h sh h k . s h",
];

/// How pattern ids moved after a structural edit.
///
/// Ids are always 1..N; every add, remove or move renumbers them, and
/// anything holding an old id resolves it through the remap.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdRemap {
    mapping: Vec<Option<PatternId>>,
    len: usize,
}

impl IdRemap {
    fn identity(len: usize) -> Self {
        Self {
            mapping: (0..len).map(|i| Some(PatternId::from_index(i))).collect(),
            len,
        }
    }

    /// New id of the pattern that had `old`, if it still exists
    pub fn get(&self, old: PatternId) -> Option<PatternId> {
        self.mapping.get(old.index()).copied().flatten()
    }

    /// New id for `old`, clamping a vanished id to the nearest valid one
    pub fn resolve(&self, old: PatternId) -> PatternId {
        self.get(old)
            .unwrap_or_else(|| PatternId(old.0.clamp(1, self.len.max(1) as u32)))
    }
}

/// Mutable configuration state. Only the host mutates it; the scheduler
/// works from snapshots of the active pattern.
#[derive(Clone, Debug, PartialEq)]
pub struct DrumSet {
    name: Option<String>,
    patterns: Vec<Pattern>,
    bpm: u16,
    feel: Feel,
    mode: PlaybackMode,
    humanize: f32,
    density: f32,
    master_volume: f32,
}

impl DrumSet {
    /// Build a set from pattern texts, with default parameters
    pub fn from_texts<'a, I>(texts: I) -> Result<Self, PatternError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut patterns = Vec::new();
        for (i, text) in texts.into_iter().enumerate() {
            if i >= MAX_PATTERNS {
                return Err(PatternError::LimitReached(MAX_PATTERNS));
            }
            patterns.push(Pattern::new(PatternId::from_index(i), text)?);
        }
        if patterns.is_empty() {
            return Err(PatternError::Empty);
        }
        Ok(Self {
            name: None,
            patterns,
            bpm: DEFAULT_BPM,
            feel: Feel::default(),
            mode: PlaybackMode::default(),
            humanize: 0.0,
            density: 0.0,
            master_volume: DEFAULT_VOLUME,
        })
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    pub fn bpm(&self) -> u16 {
        self.bpm
    }

    /// Clamped to 40..=240; returns the stored value
    pub fn set_bpm(&mut self, bpm: u32) -> u16 {
        self.bpm = bpm.clamp(MIN_BPM as u32, MAX_BPM as u32) as u16;
        self.bpm
    }

    pub fn feel(&self) -> Feel {
        self.feel
    }

    pub fn set_feel(&mut self, feel: Feel) {
        self.feel = feel;
    }

    pub fn mode(&self) -> PlaybackMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: PlaybackMode) {
        self.mode = mode;
    }

    pub fn humanize(&self) -> f32 {
        self.humanize
    }

    pub fn set_humanize(&mut self, amount: f32) -> f32 {
        self.humanize = unit(amount);
        self.humanize
    }

    pub fn density(&self) -> f32 {
        self.density
    }

    pub fn set_density(&mut self, amount: f32) -> f32 {
        self.density = unit(amount);
        self.density
    }

    pub fn master_volume(&self) -> f32 {
        self.master_volume
    }

    pub fn set_master_volume(&mut self, volume: f32) -> f32 {
        self.master_volume = unit(volume);
        self.master_volume
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Never true for a constructed set; kept for API symmetry
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn pattern(&self, id: PatternId) -> Option<&Pattern> {
        self.patterns.get(id.index()).filter(|p| p.id() == id)
    }

    pub fn pattern_mut(&mut self, id: PatternId) -> Result<&mut Pattern, PatternError> {
        self.patterns
            .get_mut(id.index())
            .filter(|p| p.id() == id)
            .ok_or(PatternError::UnknownPattern(id))
    }

    pub fn first_id(&self) -> PatternId {
        PatternId(1)
    }

    /// Replace a pattern's text; the old text stays on error
    pub fn set_pattern_text(&mut self, id: PatternId, text: &str) -> Result<(), PatternError> {
        self.pattern_mut(id)?.set_text(text)
    }

    /// Append a pattern and return its id
    pub fn add_pattern(&mut self, text: &str) -> Result<PatternId, PatternError> {
        if self.patterns.len() >= MAX_PATTERNS {
            return Err(PatternError::LimitReached(MAX_PATTERNS));
        }
        let id = PatternId::from_index(self.patterns.len());
        self.patterns.push(Pattern::new(id, text)?);
        Ok(id)
    }

    /// Remove a pattern; the last one can never be removed
    pub fn remove_pattern(&mut self, id: PatternId) -> Result<IdRemap, PatternError> {
        self.pattern_mut(id)?;
        if self.patterns.len() <= 1 {
            return Err(PatternError::LastPattern);
        }
        let removed = id.index();
        self.patterns.remove(removed);

        let mapping = (0..=self.patterns.len())
            .map(|old| match old.cmp(&removed) {
                std::cmp::Ordering::Less => Some(PatternId::from_index(old)),
                std::cmp::Ordering::Equal => None,
                std::cmp::Ordering::Greater => Some(PatternId::from_index(old - 1)),
            })
            .collect();
        self.renumber();
        Ok(IdRemap {
            mapping,
            len: self.patterns.len(),
        })
    }

    /// Move a pattern to position `to`, shifting the others
    pub fn move_pattern(&mut self, from: PatternId, to: PatternId) -> Result<IdRemap, PatternError> {
        self.pattern_mut(from)?;
        self.pattern_mut(to)?;
        let len = self.patterns.len();

        let mut order: Vec<usize> = (0..len).collect();
        let moved = order.remove(from.index());
        order.insert(to.index(), moved);

        let pattern = self.patterns.remove(from.index());
        self.patterns.insert(to.index(), pattern);

        // order[new] = old; invert it
        let mut mapping = vec![None; len];
        for (new, old) in order.into_iter().enumerate() {
            mapping[old] = Some(PatternId::from_index(new));
        }
        self.renumber();
        Ok(IdRemap { mapping, len })
    }

    /// Identity remap for edits that keep ids
    pub fn unchanged(&self) -> IdRemap {
        IdRemap::identity(self.patterns.len())
    }

    fn renumber(&mut self) {
        for (i, pattern) in self.patterns.iter_mut().enumerate() {
            pattern.set_id(PatternId::from_index(i));
        }
    }
}

impl Default for DrumSet {
    fn default() -> Self {
        let patterns = DEFAULT_PATTERNS
            .iter()
            .enumerate()
            .filter_map(|(i, text)| Pattern::new(PatternId::from_index(i), text).ok())
            .collect();
        Self {
            name: None,
            patterns,
            bpm: DEFAULT_BPM,
            feel: Feel::default(),
            mode: PlaybackMode::default(),
            humanize: 0.0,
            density: 0.0,
            master_volume: DEFAULT_VOLUME,
        }
    }
}

fn unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

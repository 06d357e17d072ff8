//! A named, validated drum pattern.

use super::step::Step;
use crate::error::PatternError;
use crate::parser;
use std::fmt;
use std::sync::Arc;

/// Fewest steps an editable pattern may have
pub const MIN_STEPS: usize = 2;
/// Most steps an editable pattern may have (four bars)
pub const MAX_STEPS: usize = 64;
/// Most patterns a drum set may hold
pub const MAX_PATTERNS: usize = 10;
/// Bounds for the cycle-mode repeat target
pub const MIN_REPEAT: u8 = 1;
pub const MAX_REPEAT: u8 = 99;

/// 1-based position of a pattern in its drum set
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PatternId(pub u32);

impl PatternId {
    /// Zero-based index into the drum set's pattern list
    pub fn index(self) -> usize {
        (self.0 as usize).saturating_sub(1)
    }

    pub fn from_index(index: usize) -> Self {
        PatternId(index as u32 + 1)
    }
}

impl fmt::Display for PatternId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A pattern owned by a [`DrumSet`](super::DrumSet).
///
/// Steps and bar count are derived from `raw_text` and recomputed whenever
/// the text changes. Steps are shared behind an `Arc` so the scheduler can
/// hold the live pattern without copying it.
#[derive(Clone, Debug, PartialEq)]
pub struct Pattern {
    id: PatternId,
    raw_text: String,
    steps: Arc<[Step]>,
    bar_count: usize,
    repeat_count: u8,
    display_name: Option<String>,
    include_in_cycle: bool,
}

impl Pattern {
    /// Parse and validate `text`; fails without side effects
    pub fn new(id: PatternId, text: &str) -> Result<Self, PatternError> {
        let steps = compile(text)?;
        Ok(Self {
            id,
            raw_text: text.trim().to_string(),
            bar_count: parser::bar_count(steps.len()),
            steps,
            repeat_count: MIN_REPEAT,
            display_name: None,
            include_in_cycle: true,
        })
    }

    /// Replace the text. On error the pattern keeps its last good text.
    pub fn set_text(&mut self, text: &str) -> Result<(), PatternError> {
        let steps = compile(text)?;
        self.raw_text = text.trim().to_string();
        self.bar_count = parser::bar_count(steps.len());
        self.steps = steps;
        Ok(())
    }

    pub fn id(&self) -> PatternId {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: PatternId) {
        self.id = id;
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn steps(&self) -> &Arc<[Step]> {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn bar_count(&self) -> usize {
        self.bar_count
    }

    pub fn repeat_count(&self) -> u8 {
        self.repeat_count
    }

    /// Set the cycle-mode repeat target, clamped to 1..=99
    pub fn set_repeat_count(&mut self, count: u32) -> u8 {
        self.repeat_count = count.clamp(MIN_REPEAT as u32, MAX_REPEAT as u32) as u8;
        self.repeat_count
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// Blank names clear the display name
    pub fn set_display_name(&mut self, name: Option<String>) {
        self.display_name = name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
    }

    pub fn include_in_cycle(&self) -> bool {
        self.include_in_cycle
    }

    pub fn set_include_in_cycle(&mut self, include: bool) {
        self.include_in_cycle = include;
    }

    /// Display name, or `Pattern <id>`
    pub fn label(&self) -> String {
        match &self.display_name {
            Some(name) => name.clone(),
            None => format!("Pattern {}", self.id),
        }
    }
}

fn compile(text: &str) -> Result<Arc<[Step]>, PatternError> {
    let steps = parser::parse(text)?;
    parser::validate_length(steps.len())?;
    Ok(steps.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_pattern_derives_steps_and_bars() {
        let pattern = Pattern::new(PatternId(1), "k h s h k h s h").unwrap();
        assert_eq!(pattern.len(), 8);
        assert_eq!(pattern.bar_count(), 1);
        assert_eq!(pattern.repeat_count(), 1);
        assert!(pattern.include_in_cycle());
        assert_eq!(pattern.label(), "Pattern 1");
    }

    #[test]
    fn test_rejected_edit_keeps_last_good_text() {
        let mut pattern = Pattern::new(PatternId(1), "k . s .").unwrap();
        let err = pattern.set_text("k x s").unwrap_err();
        assert!(matches!(err, PatternError::Parse(_)));
        assert_eq!(pattern.raw_text(), "k . s .");
        assert_eq!(pattern.len(), 4);

        assert_eq!(pattern.set_text("k"), Err(PatternError::TooShort { len: 1 }));
        assert_eq!(pattern.set_text("   "), Err(PatternError::Empty));
        assert_eq!(pattern.raw_text(), "k . s .");
    }

    #[test]
    fn test_length_bounds() {
        let max = vec!["h"; MAX_STEPS].join(" ");
        let pattern = Pattern::new(PatternId(1), &max).unwrap();
        assert_eq!(pattern.bar_count(), 4);

        let too_long = vec!["h"; MAX_STEPS + 1].join(" ");
        assert_eq!(
            Pattern::new(PatternId(1), &too_long),
            Err(PatternError::TooLong { len: 65 })
        );
    }

    #[test]
    fn test_repeat_count_is_clamped() {
        let mut pattern = Pattern::new(PatternId(1), "k s").unwrap();
        assert_eq!(pattern.set_repeat_count(0), 1);
        assert_eq!(pattern.set_repeat_count(250), 99);
        assert_eq!(pattern.set_repeat_count(4), 4);
    }

    #[test]
    fn test_blank_display_name_clears() {
        let mut pattern = Pattern::new(PatternId(2), "k s").unwrap();
        pattern.set_display_name(Some("Verse".to_string()));
        assert_eq!(pattern.label(), "Verse");
        pattern.set_display_name(Some("  ".to_string()));
        assert_eq!(pattern.display_name(), None);
        assert_eq!(pattern.label(), "Pattern 2");
    }
}

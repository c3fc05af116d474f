//! Vocabulary Schema Types
//!
//! The accepted values a filter is checked against, and the JSON files they
//! are loaded from.

use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};

/// `items.json`: item class → base types of that class
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct ItemsFile {
    pub classes: BTreeMap<String, Vec<String>>,
}

/// `sounds.json`: sound id → sample description
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct SoundsFile {
    pub sounds: BTreeMap<String, String>,
}

/// How a class or base type value relates to the vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueMatch {
    /// Listed verbatim in the vocabulary or the whitelist
    Exact,
    /// Word-initial substring of this many entries; the game matches by
    /// substring
    Partial(usize),
    None,
}

/// Read-only lookup sets for one validation pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Vocabulary {
    pub valid_classes: HashSet<String>,
    pub valid_bases: HashSet<String>,
    pub valid_sounds: HashSet<String>,
    pub class_whitelist: Vec<String>,
    pub base_whitelist: Vec<String>,
}

impl Vocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the lookup sets from parsed data files
    pub fn from_files(items: &ItemsFile, sounds: &SoundsFile) -> Self {
        let valid_classes = items.classes.keys().cloned().collect();
        let valid_bases = items.classes.values().flatten().cloned().collect();
        let valid_sounds = sounds.sounds.keys().cloned().collect();

        Self {
            valid_classes,
            valid_bases,
            valid_sounds,
            class_whitelist: Vec::new(),
            base_whitelist: Vec::new(),
        }
    }

    /// Replace the whitelists, keeping the loaded data
    pub fn with_whitelists(mut self, classes: Vec<String>, bases: Vec<String>) -> Self {
        self.class_whitelist = classes;
        self.base_whitelist = bases;
        self
    }

    pub fn match_class(&self, value: &str) -> ValueMatch {
        match_value(&self.valid_classes, &self.class_whitelist, value)
    }

    pub fn match_base(&self, value: &str) -> ValueMatch {
        match_value(&self.valid_bases, &self.base_whitelist, value)
    }

    pub fn has_sound(&self, key: &str) -> bool {
        self.valid_sounds.contains(key)
    }
}

/// Shortest value still accepted as a substring of a known entry
const MIN_PARTIAL_CHARS: usize = 3;

/// Whether `value` occurs in `entry` starting at the beginning of a word
fn starts_word_in(entry: &str, value: &str) -> bool {
    entry.match_indices(value).any(|(index, _)| {
        entry[..index]
            .chars()
            .next_back()
            .is_none_or(char::is_whitespace)
    })
}

fn match_value(valid: &HashSet<String>, whitelist: &[String], value: &str) -> ValueMatch {
    if value.is_empty() {
        return ValueMatch::None;
    }
    if valid.contains(value) || whitelist.iter().any(|entry| entry == value) {
        return ValueMatch::Exact;
    }

    if value.chars().count() < MIN_PARTIAL_CHARS {
        return ValueMatch::None;
    }
    let partial = valid
        .iter()
        .chain(whitelist.iter())
        .filter(|entry| starts_word_in(entry, value))
        .count();
    if partial > 0 {
        ValueMatch::Partial(partial)
    } else {
        ValueMatch::None
    }
}

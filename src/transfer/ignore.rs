//! Ignore patterns for backup and restore.
//!
//! Patterns are glob-style and matched against a single file or folder
//! name, never against a full path. See <https://docs.rs/globset/latest/globset/#syntax>.

use globset::{Glob, GlobSet, GlobSetBuilder};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::{Config, ItemToggles};

static SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[,\s]+").expect("valid regex"));

/// A compiled list of ignore patterns.
#[derive(Debug, Clone)]
pub struct IgnoreList {
    patterns: Vec<String>,
    set: GlobSet,
}

impl IgnoreList {
    /// Compile a list of patterns. Malformed patterns are logged and dropped.
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut kept = Vec::new();
        let mut builder = GlobSetBuilder::new();

        for pattern in patterns {
            let pattern = pattern.into();
            match Glob::new(&pattern) {
                Ok(glob) => {
                    builder.add(glob);
                    kept.push(pattern);
                }
                Err(e) => tracing::warn!("Skipping invalid ignore pattern '{}': {}", pattern, e),
            }
        }

        let set = builder.build().unwrap_or_else(|e| {
            tracing::warn!("Could not compile ignore patterns: {}", e);
            kept.clear();
            GlobSet::empty()
        });

        Self { patterns: kept, set }
    }

    /// An ignore list that matches nothing.
    pub fn empty() -> Self {
        Self { patterns: Vec::new(), set: GlobSet::empty() }
    }

    /// Whether a file or folder name should be skipped.
    pub fn matches(&self, name: &str) -> bool {
        self.set.is_match(name)
    }

    /// Patterns in the order they were added.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl Default for IgnoreList {
    fn default() -> Self {
        Self::empty()
    }
}

/// Ignore lists for both directions of a transfer.
#[derive(Debug, Clone, Default)]
pub struct IgnoreRules {
    pub backup: IgnoreList,
    pub restore: IgnoreList,
}

impl IgnoreRules {
    /// Build both lists from free-text patterns and the item toggles.
    ///
    /// User patterns come first; the name of every disabled item follows.
    /// Toggles are only honored in advanced mode.
    pub fn build(
        user_patterns: &str,
        advanced_mode: bool,
        backup: &ItemToggles,
        restore: &ItemToggles,
    ) -> Self {
        let base = split_patterns(user_patterns);

        let with_items = |toggles: &ItemToggles| {
            let mut patterns = base.clone();
            if advanced_mode {
                patterns.extend(toggles.disabled_names().into_iter().map(str::to_string));
            }
            IgnoreList::new(patterns)
        };

        Self { backup: with_items(backup), restore: with_items(restore) }
    }

    /// Build both lists from a loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::build(
            &config.general.ignore_patterns,
            config.general.advanced_mode,
            &config.backup,
            &config.restore,
        )
    }
}

/// Split free text on commas and whitespace, dropping empty pieces.
pub fn split_patterns(text: &str) -> Vec<String> {
    SEPARATORS.split(text.trim()).filter(|s| !s.is_empty()).map(str::to_string).collect()
}

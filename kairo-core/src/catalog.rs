//! Label and priority catalogs
//!
//! A catalog is a fixed preset list merged with a user-extensible custom list.
//! Only the custom list is persisted. Colors are opaque style tokens
//! ("text-orange-500"); front ends decide how to render them.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Token used for names found in neither list
pub const DEFAULT_COLOR: &str = "text-gray-400";

/// Background used for priorities outside the numbered presets
pub const DEFAULT_BACKGROUND: &str = "bg-gray-500/20";

const PRESET_LABELS: &[(&str, &str)] = &[
    ("#ByKairo", "text-blue-500"),
    ("#School", "text-green-500"),
    ("#Work", "text-orange-500"),
    ("#Personal", "text-pink-500"),
    ("#Urgent", "text-red-500"),
    ("#Shopping", "text-cyan-500"),
    ("#Health", "text-emerald-500"),
    ("#Finance", "text-amber-500"),
    ("#Family", "text-rose-500"),
    ("#Projects", "text-teal-500"),
];

const PRESET_PRIORITIES: &[(&str, &str)] = &[
    ("Priority 1", "text-red-500"),
    ("Priority 2", "text-orange-500"),
    ("Priority 3", "text-yellow-500"),
    ("Priority 4", "text-green-500"),
    ("Priority 5", "text-blue-500"),
    ("Priority 6", "text-purple-500"),
];

/// Badge styles for "Priority 1" through "Priority 6"
const PRIORITY_LEVEL_STYLES: &[(&str, &str)] = &[
    ("bg-red-500/20", "text-red-400"),
    ("bg-orange-500/20", "text-orange-400"),
    ("bg-yellow-500/20", "text-yellow-400"),
    ("bg-green-500/20", "text-green-400"),
    ("bg-blue-500/20", "text-blue-400"),
    ("bg-purple-500/20", "text-purple-400"),
];

static PRIORITY_LEVEL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Priority (\d+)$").expect("Invalid priority regex pattern")
});

/// One named entry with its color token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    pub color: String,
}

impl CatalogEntry {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
        }
    }
}

/// Which list a catalog entry came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntrySource {
    Custom,
    Preset,
}

/// Background and text tokens for a priority badge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityStyle {
    pub background: String,
    pub text: String,
}

/// Preset list plus custom list
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    presets: Vec<CatalogEntry>,
    custom: Vec<CatalogEntry>,
}

impl Catalog {
    /// Label catalog with the built-in presets
    pub fn labels(custom: Vec<CatalogEntry>) -> Self {
        Self::with_presets(PRESET_LABELS, custom)
    }

    /// Priority catalog with the built-in presets
    pub fn priorities(custom: Vec<CatalogEntry>) -> Self {
        Self::with_presets(PRESET_PRIORITIES, custom)
    }

    fn with_presets(presets: &[(&str, &str)], custom: Vec<CatalogEntry>) -> Self {
        Self {
            presets: presets
                .iter()
                .map(|(name, color)| CatalogEntry::new(*name, *color))
                .collect(),
            custom,
        }
    }

    pub fn presets(&self) -> &[CatalogEntry] {
        &self.presets
    }

    pub fn custom(&self) -> &[CatalogEntry] {
        &self.custom
    }

    /// All entries, custom first
    pub fn entries(&self) -> impl Iterator<Item = (EntrySource, &CatalogEntry)> {
        self.custom
            .iter()
            .map(|e| (EntrySource::Custom, e))
            .chain(self.presets.iter().map(|e| (EntrySource::Preset, e)))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries().any(|(_, e)| e.name == name)
    }

    /// Color token for a name: custom list, then presets, then the muted default
    pub fn resolve_color(&self, name: &str) -> &str {
        self.custom
            .iter()
            .chain(self.presets.iter())
            .find(|e| e.name == name)
            .map(|e| e.color.as_str())
            .unwrap_or(DEFAULT_COLOR)
    }

    /// Append a custom entry
    ///
    /// Returns false (and changes nothing) when the name is already known.
    pub fn add_custom(&mut self, name: impl Into<String>, color: impl Into<String>) -> bool {
        let name = name.into();
        if self.contains(&name) {
            return false;
        }
        self.custom.push(CatalogEntry::new(name, color));
        true
    }

    /// Badge style for a priority name
    ///
    /// Numbered presets have fixed styles. Other names starting with
    /// "Priority " are gray. Anything else gets the gray background and the
    /// color of a matching custom priority.
    pub fn priority_style(&self, name: &str) -> PriorityStyle {
        if let Some(caps) = PRIORITY_LEVEL_REGEX.captures(name) {
            let level = caps[1].parse::<usize>().ok();
            if let Some((background, text)) = level
                .and_then(|l| l.checked_sub(1))
                .and_then(|i| PRIORITY_LEVEL_STYLES.get(i))
            {
                return PriorityStyle {
                    background: background.to_string(),
                    text: text.to_string(),
                };
            }
        }

        // Names in the "Priority ..." family never take a custom color
        if name.starts_with("Priority ") {
            return PriorityStyle {
                background: DEFAULT_BACKGROUND.to_string(),
                text: DEFAULT_COLOR.to_string(),
            };
        }

        let text = self
            .custom
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.color.clone())
            .unwrap_or_else(|| DEFAULT_COLOR.to_string());
        PriorityStyle {
            background: DEFAULT_BACKGROUND.to_string(),
            text,
        }
    }
}

/// Normalize user input into a label name ("work" -> "#work")
pub fn label_name(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.starts_with('#') {
        trimmed.to_string()
    } else {
        format!("#{}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_preset_and_default() {
        let labels = Catalog::labels(Vec::new());
        assert_eq!(labels.resolve_color("#Work"), "text-orange-500");
        assert_eq!(labels.resolve_color("#Nope"), DEFAULT_COLOR);
    }

    #[test]
    fn test_custom_overrides_preset() {
        let labels = Catalog::labels(vec![CatalogEntry::new("#Work", "text-lime-500")]);
        assert_eq!(labels.resolve_color("#Work"), "text-lime-500");
    }

    #[test]
    fn test_add_custom_rejects_known_names() {
        let mut labels = Catalog::labels(Vec::new());

        assert!(!labels.add_custom("#Work", "text-lime-500"));
        assert!(labels.add_custom("#Garden", "text-lime-500"));
        assert!(!labels.add_custom("#Garden", "text-red-500"));

        assert_eq!(labels.custom().len(), 1);
        assert_eq!(labels.resolve_color("#Garden"), "text-lime-500");
    }

    #[test]
    fn test_entries_list_custom_first() {
        let labels = Catalog::labels(vec![CatalogEntry::new("#Garden", "text-lime-500")]);
        let first = labels.entries().next().unwrap();
        assert_eq!(first.0, EntrySource::Custom);
        assert_eq!(first.1.name, "#Garden");
        assert_eq!(labels.entries().count(), 11);
    }

    #[test]
    fn test_priority_style_for_numbered_presets() {
        let priorities = Catalog::priorities(Vec::new());
        let style = priorities.priority_style("Priority 1");
        assert_eq!(style.background, "bg-red-500/20");
        assert_eq!(style.text, "text-red-400");

        let out_of_range = priorities.priority_style("Priority 9");
        assert_eq!(out_of_range.background, DEFAULT_BACKGROUND);
        assert_eq!(out_of_range.text, DEFAULT_COLOR);
    }

    #[test]
    fn test_priority_style_for_custom_priority() {
        let priorities =
            Catalog::priorities(vec![CatalogEntry::new("Someday", "text-indigo-500")]);
        let style = priorities.priority_style("Someday");
        assert_eq!(style.background, DEFAULT_BACKGROUND);
        assert_eq!(style.text, "text-indigo-500");
        assert_eq!(priorities.priority_style("Unknown").text, DEFAULT_COLOR);
    }

    #[test]
    fn test_priority_prefixed_custom_name_stays_gray() {
        let priorities =
            Catalog::priorities(vec![CatalogEntry::new("Priority High", "text-red-500")]);
        let style = priorities.priority_style("Priority High");
        assert_eq!(style.background, DEFAULT_BACKGROUND);
        assert_eq!(style.text, DEFAULT_COLOR);
    }

    #[test]
    fn test_label_name() {
        assert_eq!(label_name("work"), "#work");
        assert_eq!(label_name(" #Work "), "#Work");
    }
}

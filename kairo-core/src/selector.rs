//! Label and priority pickers
//!
//! A selector holds only its own view state (search text, cursor). The
//! selection it edits belongs to the caller and is passed in.

use crate::catalog::{Catalog, CatalogEntry};

/// How many entries a selector may hold at once
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    /// Picking a new entry replaces the previous one
    Single,
    Multi,
}

/// Entries visible under the current search, split by source
#[derive(Debug, Default)]
pub struct SelectorSections<'a> {
    pub custom: Vec<&'a CatalogEntry>,
    pub preset: Vec<&'a CatalogEntry>,
}

impl<'a> SelectorSections<'a> {
    pub fn is_empty(&self) -> bool {
        self.custom.is_empty() && self.preset.is_empty()
    }

    pub fn len(&self) -> usize {
        self.custom.len() + self.preset.len()
    }

    /// Entry at a flat index (custom section first)
    pub fn get(&self, index: usize) -> Option<&'a CatalogEntry> {
        self.custom
            .get(index)
            .or_else(|| self.preset.get(index.checked_sub(self.custom.len())?))
            .copied()
    }
}

/// Search-and-toggle popover state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    mode: SelectionMode,
    noun: &'static str,
    query: String,
    cursor: usize,
}

impl Selector {
    /// Multi-select label picker
    pub fn labels() -> Self {
        Self::new(SelectionMode::Multi, "Label")
    }

    /// Single-select priority picker
    pub fn priorities() -> Self {
        Self::new(SelectionMode::Single, "Priority")
    }

    pub fn new(mode: SelectionMode, noun: &'static str) -> Self {
        Self {
            mode,
            noun,
            query: String::new(),
            cursor: 0,
        }
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn noun(&self) -> &'static str {
        self.noun
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Replace the search text; the cursor returns to the top
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.cursor = 0;
    }

    pub fn push_char(&mut self, c: char) {
        self.query.push(c);
        self.cursor = 0;
    }

    pub fn pop_char(&mut self) {
        self.query.pop();
        self.cursor = 0;
    }

    /// Case-insensitive substring match on the entry name
    pub fn matches(&self, name: &str) -> bool {
        name.to_lowercase().contains(&self.query.to_lowercase())
    }

    /// Entries matching the search text
    pub fn sections<'a>(&self, catalog: &'a Catalog) -> SelectorSections<'a> {
        SelectorSections {
            custom: catalog
                .custom()
                .iter()
                .filter(|e| self.matches(&e.name))
                .collect(),
            preset: catalog
                .presets()
                .iter()
                .filter(|e| self.matches(&e.name))
                .collect(),
        }
    }

    /// Move the cursor within `len` visible entries
    pub fn move_cursor(&mut self, delta: i32, len: usize) {
        if len == 0 {
            self.cursor = 0;
            return;
        }
        self.cursor = if delta < 0 {
            self.cursor.saturating_sub(delta.unsigned_abs() as usize)
        } else {
            (self.cursor + delta as usize).min(len - 1)
        };
    }

    /// Entry under the cursor
    pub fn highlighted<'a>(&self, catalog: &'a Catalog) -> Option<&'a CatalogEntry> {
        self.sections(catalog).get(self.cursor)
    }

    pub fn is_selected(selection: &[String], name: &str) -> bool {
        selection.iter().any(|s| s == name)
    }

    /// Select or deselect a name
    pub fn toggle(&self, selection: &mut Vec<String>, name: &str) {
        if Self::is_selected(selection, name) {
            selection.retain(|s| s != name);
            return;
        }
        if self.mode == SelectionMode::Single {
            selection.clear();
        }
        selection.push(name.to_string());
    }

    /// Reset the selection to empty
    pub fn clear(&self, selection: &mut Vec<String>) {
        selection.clear();
    }

    /// Trigger caption: "Label" or "2 Label"
    pub fn caption(&self, selection: &[String]) -> String {
        if selection.is_empty() {
            self.noun.to_string()
        } else {
            format!("{} {}", selection.len(), self.noun)
        }
    }
}

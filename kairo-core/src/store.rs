//! Persistence port
//!
//! The controller reads and writes named slices of JSON through a `Store`.
//! Adapters decide where the bytes live; this crate only ships the in-memory
//! one used by tests and embedders.

use std::collections::HashMap;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{CoreError, Result};

/// Independently persisted pieces of state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slice {
    Tasks,
    CustomLabels,
    CustomPriorities,
    FilterSettings,
    FilterValues,
    SortSettings,
}

impl Slice {
    pub const ALL: [Slice; 6] = [
        Slice::Tasks,
        Slice::CustomLabels,
        Slice::CustomPriorities,
        Slice::FilterSettings,
        Slice::FilterValues,
        Slice::SortSettings,
    ];

    /// Stable key for the slice
    pub fn key(&self) -> &'static str {
        match self {
            Slice::Tasks => "tasks",
            Slice::CustomLabels => "labels",
            Slice::CustomPriorities => "custom-priorities",
            Slice::FilterSettings => "filter-settings",
            Slice::FilterValues => "filter-values",
            Slice::SortSettings => "sort-settings",
        }
    }
}

impl std::fmt::Display for Slice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Key-value persistence for slices
pub trait Store {
    /// Read a slice; `Ok(None)` when nothing was ever saved
    fn load(&self, slice: Slice) -> Result<Option<Value>>;

    /// Replace a slice
    fn save(&mut self, slice: Slice, value: &Value) -> Result<()>;
}

/// Read a slice into a typed value
///
/// Missing and malformed slices both yield the default. A malformed slice is
/// logged and left on disk until the next save replaces it.
pub fn load_slice<T, S>(store: &S, slice: Slice) -> T
where
    T: DeserializeOwned + Default,
    S: Store + ?Sized,
{
    match store.load(slice) {
        Ok(Some(value)) => match serde_json::from_value(value) {
            Ok(parsed) => parsed,
            Err(e) => {
                log::warn!("slice {} has an unexpected shape, using defaults: {}", slice, e);
                T::default()
            }
        },
        Ok(None) => T::default(),
        Err(e) => {
            log::warn!("could not read slice {}, using defaults: {}", slice, e);
            T::default()
        }
    }
}

/// Write a typed value into a slice
pub fn save_slice<T, S>(store: &mut S, slice: Slice, value: &T) -> Result<()>
where
    T: Serialize,
    S: Store + ?Sized,
{
    let json = serde_json::to_value(value).map_err(|e| {
        CoreError::store_with_source(slice.key(), "Could not serialize slice", e)
    })?;
    store.save(slice, &json)?;
    log::debug!("saved slice {}", slice);
    Ok(())
}

/// Store that keeps slices in memory
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    slices: HashMap<Slice, Value>,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a slice without counting it as a write
    pub fn with_slice(mut self, slice: Slice, value: Value) -> Self {
        self.slices.insert(slice, value);
        self
    }

    /// Raw contents of a slice
    pub fn get(&self, slice: Slice) -> Option<&Value> {
        self.slices.get(&slice)
    }

    /// Number of saves performed
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl Store for MemoryStore {
    fn load(&self, slice: Slice) -> Result<Option<Value>> {
        Ok(self.slices.get(&slice).cloned())
    }

    fn save(&mut self, slice: Slice, value: &Value) -> Result<()> {
        self.slices.insert(slice, value.clone());
        self.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::SortSettings;
    use serde_json::json;

    #[test]
    fn test_missing_slice_is_default() {
        let store = MemoryStore::new();
        let sort: SortSettings = load_slice(&store, Slice::SortSettings);
        assert_eq!(sort, SortSettings::default());
    }

    #[test]
    fn test_malformed_slice_is_default() {
        let store = MemoryStore::new().with_slice(Slice::SortSettings, json!("garbage"));
        let sort: SortSettings = load_slice(&store, Slice::SortSettings);
        assert_eq!(sort, SortSettings::default());
    }

    #[test]
    fn test_save_then_load() {
        let mut store = MemoryStore::new();
        let sort = SortSettings {
            completion_status: true,
            ..SortSettings::default()
        };

        save_slice(&mut store, Slice::SortSettings, &sort).unwrap();
        assert_eq!(store.writes(), 1);
        assert_eq!(store.get(Slice::SortSettings).unwrap()["completionStatus"], true);

        let loaded: SortSettings = load_slice(&store, Slice::SortSettings);
        assert_eq!(loaded, sort);
    }

    #[test]
    fn test_slice_keys_are_distinct() {
        let mut keys: Vec<&str> = Slice::ALL.iter().map(|s| s.key()).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), Slice::ALL.len());
    }
}

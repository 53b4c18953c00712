//! JSON file storage adapter
//!
//! One `<slice>.json` file per slice in the data directory. Each save copies
//! the previous file to `<slice>.json.bak`, then writes through a temporary
//! file and renames it into place.

use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;

use serde_json::Value;

use kairo_core::{CoreError, Slice, Store, TaskCollection};

use crate::error::{CliError, Result};

/// Slice store backed by JSON files
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    /// Create a store rooted at the given directory
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// File holding a slice
    pub fn path(&self, slice: Slice) -> PathBuf {
        self.dir.join(format!("{}.json", slice.key()))
    }

    fn backup_path(&self, slice: Slice) -> PathBuf {
        self.path(slice).with_extension("json.bak")
    }

    /// Check if a backup of the slice exists
    pub fn backup_exists(&self, slice: Slice) -> bool {
        self.backup_path(slice).exists()
    }

    /// Read the task list from its backup file
    pub fn recover_tasks(&self) -> Result<TaskCollection> {
        let backup_path = self.backup_path(Slice::Tasks);
        if !backup_path.exists() {
            return Err(CliError::storage("Backup file not found"));
        }

        let contents = fs::read_to_string(&backup_path)
            .map_err(|e| CliError::io(format!("reading {}", backup_path.display()), e))?;
        let tasks = serde_json::from_str(&contents)
            .map_err(|e| CliError::storage_with_source("Backup file is not a task list", e))?;
        Ok(tasks)
    }

    fn backup(&self, slice: Slice) -> std::io::Result<()> {
        let path = self.path(slice);
        if !path.exists() {
            return Ok(());
        }
        fs::copy(&path, self.backup_path(slice))?;
        Ok(())
    }

    fn write_atomic(&self, slice: Slice, value: &Value) -> std::io::Result<()> {
        let path = self.path(slice);
        let temp_path = path.with_extension("json.tmp");
        let json = serde_json::to_vec_pretty(value)?;
        {
            let mut file = File::create(&temp_path)?;
            file.write_all(&json)?;
            file.sync_all()?;
        }
        fs::rename(temp_path, path)
    }
}

impl Store for JsonStore {
    fn load(&self, slice: Slice) -> kairo_core::Result<Option<Value>> {
        let path = self.path(slice);
        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&path)
            .map_err(|e| CoreError::store_with_source(slice.key(), "Could not read file", e))?;
        let value = serde_json::from_str(&contents)
            .map_err(|e| CoreError::store_with_source(slice.key(), "File is not valid JSON", e))?;
        Ok(Some(value))
    }

    fn save(&mut self, slice: Slice, value: &Value) -> kairo_core::Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            CoreError::store_with_source(slice.key(), "Could not create data directory", e)
        })?;
        self.backup(slice)
            .map_err(|e| CoreError::store_with_source(slice.key(), "Could not write backup", e))?;
        self.write_atomic(slice, value)
            .map_err(|e| CoreError::store_with_source(slice.key(), "Could not write file", e))?;
        log::debug!("wrote {}", self.path(slice).display());
        Ok(())
    }
}

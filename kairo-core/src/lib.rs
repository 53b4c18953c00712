//! Kairo Core - Pure domain logic for task management
//!
//! This crate contains no file I/O. Persistence goes through the `Store`
//! port; adapters live in consuming crates.

pub mod catalog;
pub mod controller;
pub mod date;
pub mod draft;
pub mod error;
pub mod pipeline;
pub mod selector;
pub mod store;
pub mod task;

pub use catalog::{Catalog, CatalogEntry, EntrySource, PriorityStyle};
pub use controller::{DragState, TaskController};
pub use draft::{EditBuffer, TaskDraft};
pub use error::{CoreError, Result};
pub use pipeline::{FilterSettings, FilterValues, QueryExt, SortSettings, SortStrategy, TaskQuery};
pub use selector::{SelectionMode, Selector, SelectorSections};
pub use store::{MemoryStore, Slice, Store};
pub use task::{Task, TaskCollection, TaskId, TaskStats};

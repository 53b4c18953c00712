//! Kairo TUI
//!
//! A terminal user interface over the Kairo task controller.

mod app;
mod error;
mod ui;

pub use app::{AddField, App, DialogMode, EditField, PickerState, PickerTarget, run};
pub use error::TuiError;

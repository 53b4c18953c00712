//! Task domain model
//!
//! Pure domain logic for task management with no I/O operations.

use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::date::{format_locale_date, parse_locale_date};

/// Priority given to tasks created without an explicit choice
pub const DEFAULT_PRIORITY: &str = "Priority 3";

/// Newtype wrapper for task IDs
///
/// IDs are time-based: the creation instant in milliseconds since the Unix
/// epoch, rendered as a decimal string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl TaskId {
    /// ID for a task created at the given instant
    pub fn from_instant(instant: DateTime<Local>) -> Self {
        TaskId(instant.timestamp_millis().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The next ID after this one, used when two tasks land on the same millisecond
    fn successor(&self) -> Self {
        match self.0.parse::<u64>() {
            Ok(millis) => TaskId((millis + 1).to_string()),
            Err(_) => TaskId(format!("{}-1", self.0)),
        }
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        TaskId(id.to_string())
    }
}

impl From<String> for TaskId {
    fn from(id: String) -> Self {
        TaskId(id)
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn default_priority() -> String {
    DEFAULT_PRIORITY.to_string()
}

/// A single task
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    /// Locale-formatted creation date ("M/D/YYYY")
    pub creation_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default = "default_priority")]
    pub priority: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder: Option<String>,
    /// Label names in the order they were picked (duplicates allowed)
    #[serde(default)]
    pub labels: Vec<String>,
    /// Free-form recurrence rule such as "every-week"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat: Option<String>,
}

impl Task {
    /// Create a new task with the given id and title, created today
    pub fn new(id: impl Into<TaskId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            completed: false,
            creation_date: crate::date::today_locale(),
            due_date: None,
            time: None,
            priority: default_priority(),
            description: String::new(),
            reminder: None,
            labels: Vec::new(),
            repeat: None,
        }
    }

    /// Builder method to set the creation date
    pub fn with_creation_date(mut self, date: NaiveDate) -> Self {
        self.creation_date = format_locale_date(date);
        self
    }

    /// Builder method to set the due date
    pub fn with_due_date(mut self, date: Option<NaiveDate>) -> Self {
        self.due_date = date.map(format_locale_date);
        self
    }

    /// Builder method to set completion status
    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }

    /// Builder method to set priority
    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = priority.into();
        self
    }

    /// Builder method to set labels
    pub fn with_labels(mut self, labels: Vec<String>) -> Self {
        self.labels = labels;
        self
    }

    /// Toggle completion status
    pub fn toggle_complete(&mut self) {
        self.completed = !self.completed;
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    /// Creation date as a date, if the stored string is readable
    pub fn created_on(&self) -> Option<NaiveDate> {
        parse_locale_date(&self.creation_date)
    }

    /// Due date as a date, if present and readable
    pub fn due_on(&self) -> Option<NaiveDate> {
        self.due_date.as_deref().and_then(parse_locale_date)
    }

    /// Repeat rule for display ("every-week" -> "every week")
    pub fn repeat_display(&self) -> Option<String> {
        self.repeat.as_ref().map(|rule| rule.replace('-', " "))
    }
}

/// Counts shown in the list header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
}

/// Ordered in-memory collection of tasks
///
/// Order is meaningful: it is the manual order produced by drag-and-drop and
/// the input order for the filter/sort pipeline.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(transparent)]
pub struct TaskCollection {
    pub tasks: Vec<Task>,
}

impl TaskCollection {
    /// Create a new empty task collection
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    /// Pick an unused ID for a task created at `instant`
    pub fn next_id(&self, instant: DateTime<Local>) -> TaskId {
        let mut id = TaskId::from_instant(instant);
        while self.contains(&id) {
            id = id.successor();
        }
        id
    }

    /// Append a task at the end of the manual order
    pub fn push(&mut self, task: Task) {
        self.tasks.push(task);
    }

    pub fn contains(&self, id: &TaskId) -> bool {
        self.position(id).is_some()
    }

    /// Index of a task in the manual order
    pub fn position(&self, id: &TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| &t.id == id)
    }

    /// Get a task by ID
    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    /// Get a mutable reference to a task by ID
    pub fn get_mut(&mut self, id: &TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| &t.id == id)
    }

    /// Remove a task by ID, keeping the order of the rest
    pub fn remove(&mut self, id: &TaskId) -> Option<Task> {
        let index = self.position(id)?;
        Some(self.tasks.remove(index))
    }

    /// Move `dragged` to the index `target` held before the move
    ///
    /// Returns false when the IDs are equal or either one is missing.
    pub fn move_before(&mut self, dragged: &TaskId, target: &TaskId) -> bool {
        if dragged == target {
            return false;
        }
        let (Some(from), Some(to)) = (self.position(dragged), self.position(target)) else {
            return false;
        };
        let task = self.tasks.remove(from);
        self.tasks.insert(to, task);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    /// Count total tasks
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Check if collection is empty
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Count completed tasks
    pub fn count_completed(&self) -> usize {
        self.tasks.iter().filter(|task| task.completed).count()
    }

    pub fn stats(&self) -> TaskStats {
        let completed = self.count_completed();
        TaskStats {
            total: self.len(),
            completed,
            pending: self.len() - completed,
        }
    }
}

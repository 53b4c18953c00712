//! Transient input state: the new-task draft and the edit buffer

use chrono::NaiveDate;

use crate::date::{format_locale_date, parse_locale_date};
use crate::task::{DEFAULT_PRIORITY, Task, TaskId};

/// Fields of the "add task" form
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub due_date: Option<NaiveDate>,
    /// "HH:MM" as typed; empty means no time
    pub time: String,
    pub priority: String,
    pub reminder: Option<String>,
    pub labels: Vec<String>,
    /// Recurrence rule; empty means no repeat
    pub repeat: String,
}

impl Default for TaskDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            due_date: None,
            time: String::new(),
            priority: DEFAULT_PRIORITY.to_string(),
            reminder: None,
            labels: Vec::new(),
            repeat: String::new(),
        }
    }
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// True when the title would be rejected
    pub fn is_blank(&self) -> bool {
        self.title.trim().is_empty()
    }

    /// Drop what was typed, keep the picked metadata
    pub fn discard_text(&mut self) {
        self.title.clear();
        self.description.clear();
    }

    /// Turn the draft into a task
    pub(crate) fn build(self, id: TaskId, created: NaiveDate) -> Task {
        Task {
            id,
            title: self.title.trim().to_string(),
            completed: false,
            creation_date: format_locale_date(created),
            due_date: self.due_date.map(format_locale_date),
            time: non_empty(self.time),
            priority: self.priority,
            description: self.description.trim().to_string(),
            reminder: self.reminder.and_then(non_empty),
            labels: self.labels,
            repeat: non_empty(self.repeat),
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Fields of the edit form for one task
#[derive(Debug, Clone, PartialEq)]
pub struct EditBuffer {
    pub task_id: TaskId,
    pub title: String,
    pub description: String,
    pub priority: String,
    /// None when the task had no readable due date or none was chosen
    pub due_date: Option<NaiveDate>,
}

impl EditBuffer {
    /// Load a task into a fresh buffer
    ///
    /// An absent or unreadable due date leaves the date empty.
    pub fn from_task(task: &Task) -> Self {
        Self {
            task_id: task.id.clone(),
            title: task.title.clone(),
            description: task.description.clone(),
            priority: task.priority.clone(),
            due_date: task.due_date.as_deref().and_then(parse_locale_date),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.title.trim().is_empty()
    }

    /// Write the buffer into its task; the old due date stays when none is set
    pub(crate) fn apply_to(&self, task: &mut Task) {
        task.title = self.title.trim().to_string();
        task.description = self.description.trim().to_string();
        task.priority = self.priority.clone();
        if let Some(date) = self.due_date {
            task.due_date = Some(format_locale_date(date));
        }
    }
}

//! Task filtering and sorting pipeline
//!
//! Turns the canonical task collection into the ordered view a front end
//! renders. Filtering runs first, then the enabled comparator passes. The
//! source collection is never touched.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::task::{Task, TaskCollection};

/// Which filters are switched on
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSettings {
    pub date: bool,
    pub priority: bool,
    pub label: bool,
}

/// Value each filter matches against
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterValues {
    /// Due date in stored form ("1/25/2026")
    pub date: String,
    pub priority: String,
    pub label: String,
}

/// Which comparator passes run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SortSettings {
    pub completion_status: bool,
    pub creation_date: bool,
    /// Carried through storage; no comparator reads it
    pub pages: bool,
    /// Carried through storage; no comparator reads it
    pub chats: bool,
}

impl Default for SortSettings {
    fn default() -> Self {
        Self {
            completion_status: false,
            creation_date: true,
            pages: false,
            chats: false,
        }
    }
}

/// How the completion and creation-date passes combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortStrategy {
    /// Two independent stable sorts. With both passes on, creation date
    /// dominates and completion only orders tasks sharing a date.
    #[default]
    Sequential,
    /// One sort keyed on (completion, creation date newest first).
    Lexicographic,
}

/// Incomplete tasks before completed ones
fn by_completion(a: &Task, b: &Task) -> Ordering {
    a.completed.cmp(&b.completed)
}

/// Newest creation date first; unreadable dates after every readable one
fn by_creation_desc(a: &Task, b: &Task) -> Ordering {
    match (a.created_on(), b.created_on()) {
        (Some(a_date), Some(b_date)) => b_date.cmp(&a_date),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// A complete pipeline configuration
#[derive(Debug, Clone, Default)]
pub struct TaskQuery {
    pub filters: FilterSettings,
    pub values: FilterValues,
    pub sort: SortSettings,
    pub strategy: SortStrategy,
}

impl TaskQuery {
    /// Create a query with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set filter switches
    pub fn with_filters(mut self, filters: FilterSettings) -> Self {
        self.filters = filters;
        self
    }

    /// Set filter values
    pub fn with_values(mut self, values: FilterValues) -> Self {
        self.values = values;
        self
    }

    /// Set sort passes
    pub fn with_sort(mut self, sort: SortSettings) -> Self {
        self.sort = sort;
        self
    }

    /// Set how sort passes combine
    pub fn with_strategy(mut self, strategy: SortStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Filter only on due date
    pub fn due_on(mut self, date: impl Into<String>) -> Self {
        self.filters.date = true;
        self.values.date = date.into();
        self
    }

    /// Filter only on priority
    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.filters.priority = true;
        self.values.priority = priority.into();
        self
    }

    /// Filter only on label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.filters.label = true;
        self.values.label = label.into();
        self
    }

    /// Check if a task passes every active filter
    ///
    /// A filter is active when it is switched on and has a non-empty value.
    pub fn matches(&self, task: &Task) -> bool {
        if self.filters.date
            && !self.values.date.is_empty()
            && task.due_date.as_deref() != Some(self.values.date.as_str())
        {
            return false;
        }

        if self.filters.priority
            && !self.values.priority.is_empty()
            && task.priority != self.values.priority
        {
            return false;
        }

        if self.filters.label && !self.values.label.is_empty() && !task.has_label(&self.values.label)
        {
            return false;
        }

        true
    }

    /// Apply filters and sort passes to a sequence of tasks
    pub fn apply<'a>(&self, tasks: impl Iterator<Item = &'a Task>) -> Vec<&'a Task> {
        let mut filtered: Vec<&Task> = tasks.filter(|t| self.matches(t)).collect();

        match self.strategy {
            SortStrategy::Sequential => {
                if self.sort.completion_status {
                    filtered.sort_by(|a, b| by_completion(a, b));
                }
                if self.sort.creation_date {
                    filtered.sort_by(|a, b| by_creation_desc(a, b));
                }
            }
            SortStrategy::Lexicographic => {
                filtered.sort_by(|a, b| {
                    let completion = if self.sort.completion_status {
                        by_completion(a, b)
                    } else {
                        Ordering::Equal
                    };
                    let creation = if self.sort.creation_date {
                        by_creation_desc(a, b)
                    } else {
                        Ordering::Equal
                    };
                    completion.then(creation)
                });
            }
        }

        filtered
    }
}

/// Run the pipeline with the sequential strategy
pub fn apply<'a>(
    tasks: &'a TaskCollection,
    filters: &FilterSettings,
    values: &FilterValues,
    sort: &SortSettings,
) -> Vec<&'a Task> {
    TaskQuery::new()
        .with_filters(filters.clone())
        .with_values(values.clone())
        .with_sort(sort.clone())
        .apply(tasks.iter())
}

/// Extension trait for TaskCollection to support querying
pub trait QueryExt {
    /// Get tasks filtered and sorted according to the query
    fn query(&self, query: &TaskQuery) -> Vec<&Task>;
}

impl QueryExt for TaskCollection {
    fn query(&self, query: &TaskQuery) -> Vec<&Task> {
        query.apply(self.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn titles(tasks: &[&Task]) -> Vec<String> {
        tasks.iter().map(|t| t.title.clone()).collect()
    }

    fn no_sort() -> SortSettings {
        SortSettings {
            creation_date: false,
            ..SortSettings::default()
        }
    }

    #[test]
    fn test_filter_by_due_date() {
        let collection = TaskCollection::from_tasks(vec![
            Task::new("1", "first").with_due_date(NaiveDate::from_ymd_opt(2024, 1, 1)),
            Task::new("2", "second").with_due_date(NaiveDate::from_ymd_opt(2024, 2, 2)),
        ]);

        let query = TaskQuery::new().with_sort(no_sort()).due_on("1/1/2024");
        let results = collection.query(&query);

        assert_eq!(titles(&results), vec!["first"]);
    }

    #[test]
    fn test_enabled_filter_with_empty_value_is_inactive() {
        let collection = TaskCollection::from_tasks(vec![
            Task::new("1", "a").with_priority("Priority 1"),
            Task::new("2", "b"),
        ]);

        let query = TaskQuery::new().with_sort(no_sort()).with_priority("");
        assert_eq!(collection.query(&query).len(), 2);
    }

    #[test]
    fn test_disabled_filter_ignores_value() {
        let collection = TaskCollection::from_tasks(vec![Task::new("1", "a")]);
        let values = FilterValues {
            priority: "Priority 1".to_string(),
            ..FilterValues::default()
        };

        let results = apply(&collection, &FilterSettings::default(), &values, &no_sort());
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_filters_are_anded() {
        let collection = TaskCollection::from_tasks(vec![
            Task::new("1", "both")
                .with_priority("Priority 1")
                .with_labels(vec!["#Work".into()]),
            Task::new("2", "priority only").with_priority("Priority 1"),
            Task::new("3", "label only").with_labels(vec!["#Work".into()]),
        ]);

        let query = TaskQuery::new()
            .with_sort(no_sort())
            .with_priority("Priority 1")
            .with_label("#Work");

        assert_eq!(titles(&collection.query(&query)), vec!["both"]);
    }

    #[test]
    fn test_sort_by_creation_date_newest_first() {
        let collection = TaskCollection::from_tasks(vec![
            Task::new("1", "older").with_creation_date(day(1)),
            Task::new("2", "newer").with_creation_date(day(2)),
        ]);

        let results = collection.query(&TaskQuery::new());
        assert_eq!(titles(&results), vec!["newer", "older"]);
    }

    #[test]
    fn test_sort_by_completion_is_stable() {
        let collection = TaskCollection::from_tasks(vec![
            Task::new("1", "done a").with_completed(true),
            Task::new("2", "open a"),
            Task::new("3", "done b").with_completed(true),
            Task::new("4", "open b"),
        ]);
        let sort = SortSettings {
            completion_status: true,
            creation_date: false,
            ..SortSettings::default()
        };

        let results = collection.query(&TaskQuery::new().with_sort(sort));
        assert_eq!(
            titles(&results),
            vec!["open a", "open b", "done a", "done b"]
        );
    }

    #[test]
    fn test_sequential_strategy_lets_date_dominate() {
        let collection = TaskCollection::from_tasks(vec![
            Task::new("1", "old open").with_creation_date(day(1)),
            Task::new("2", "new done")
                .with_creation_date(day(2))
                .with_completed(true),
            Task::new("3", "new open").with_creation_date(day(2)),
        ]);
        let sort = SortSettings {
            completion_status: true,
            creation_date: true,
            ..SortSettings::default()
        };

        let results = collection.query(&TaskQuery::new().with_sort(sort));
        assert_eq!(titles(&results), vec!["new open", "new done", "old open"]);
    }

    #[test]
    fn test_lexicographic_strategy_groups_by_completion() {
        let collection = TaskCollection::from_tasks(vec![
            Task::new("1", "old open").with_creation_date(day(1)),
            Task::new("2", "new done")
                .with_creation_date(day(2))
                .with_completed(true),
            Task::new("3", "new open").with_creation_date(day(2)),
        ]);
        let sort = SortSettings {
            completion_status: true,
            creation_date: true,
            ..SortSettings::default()
        };

        let query = TaskQuery::new()
            .with_sort(sort)
            .with_strategy(SortStrategy::Lexicographic);
        assert_eq!(
            titles(&collection.query(&query)),
            vec!["new open", "old open", "new done"]
        );
    }

    #[test]
    fn test_unreadable_creation_dates_sort_last() {
        let mut broken = Task::new("1", "broken");
        broken.creation_date = "sometime".to_string();
        let collection = TaskCollection::from_tasks(vec![
            broken,
            Task::new("2", "dated").with_creation_date(day(1)),
        ]);

        assert_eq!(
            titles(&collection.query(&TaskQuery::new())),
            vec!["dated", "broken"]
        );
    }

    #[test]
    fn test_apply_leaves_source_untouched() {
        let collection = TaskCollection::from_tasks(vec![
            Task::new("1", "older").with_creation_date(day(1)),
            Task::new("2", "newer").with_creation_date(day(2)),
        ]);
        let before = collection.clone();

        let _ = apply(
            &collection,
            &FilterSettings::default(),
            &FilterValues::default(),
            &SortSettings::default(),
        );
        assert_eq!(collection, before);
    }

    #[test]
    fn test_sort_settings_json_shape() {
        let json = r#"{"completionStatus":true,"creationDate":false,"pages":false,"chats":true}"#;
        let sort: SortSettings = serde_json::from_str(json).unwrap();
        assert!(sort.completion_status);
        assert!(!sort.creation_date);
        assert!(sort.chats);
    }
}

//! Task lifecycle controller
//!
//! Owns the canonical task collection together with everything a front end
//! needs around it: the catalogs, the view settings, the new-task draft, the
//! edit buffer, the drag session and the context menu. Every mutation of a
//! persisted slice writes that slice back through the store before returning.
//! A failed write is returned as an error; the in-memory state keeps the
//! change.

use chrono::{DateTime, Local};

use crate::catalog::{Catalog, CatalogEntry};
use crate::draft::{EditBuffer, TaskDraft};
use crate::error::Result;
use crate::pipeline::{
    FilterSettings, FilterValues, QueryExt, SortSettings, SortStrategy, TaskQuery,
};
use crate::store::{Slice, Store, load_slice, save_slice};
use crate::task::{Task, TaskCollection, TaskId, TaskStats};

/// Transient drag-and-drop state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DragState {
    /// Task being dragged
    pub dragged: Option<TaskId>,
    /// Task currently under the pointer
    pub over: Option<TaskId>,
}

impl DragState {
    pub fn is_active(&self) -> bool {
        self.dragged.is_some()
    }
}

/// The task list state machine
#[derive(Debug)]
pub struct TaskController<S: Store> {
    store: S,
    tasks: TaskCollection,
    labels: Catalog,
    priorities: Catalog,
    filters: FilterSettings,
    values: FilterValues,
    sort: SortSettings,
    strategy: SortStrategy,
    draft: TaskDraft,
    edit: Option<EditBuffer>,
    drag: DragState,
    context_menu: Option<TaskId>,
}

impl<S: Store> TaskController<S> {
    /// Read every slice from the store
    ///
    /// Missing or malformed slices fall back to their defaults.
    pub fn load(store: S) -> Self {
        let tasks: TaskCollection = load_slice(&store, Slice::Tasks);
        let custom_labels: Vec<CatalogEntry> = load_slice(&store, Slice::CustomLabels);
        let custom_priorities: Vec<CatalogEntry> = load_slice(&store, Slice::CustomPriorities);
        let filters = load_slice(&store, Slice::FilterSettings);
        let values = load_slice(&store, Slice::FilterValues);
        let sort = load_slice(&store, Slice::SortSettings);

        log::debug!("loaded {} tasks", tasks.len());

        Self {
            store,
            tasks,
            labels: Catalog::labels(custom_labels),
            priorities: Catalog::priorities(custom_priorities),
            filters,
            values,
            sort,
            strategy: SortStrategy::default(),
            draft: TaskDraft::default(),
            edit: None,
            drag: DragState::default(),
            context_menu: None,
        }
    }

    /// Builder method to pick how sort passes combine
    pub fn with_strategy(mut self, strategy: SortStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn tasks(&self) -> &TaskCollection {
        &self.tasks
    }

    pub fn labels(&self) -> &Catalog {
        &self.labels
    }

    pub fn priorities(&self) -> &Catalog {
        &self.priorities
    }

    pub fn filter_settings(&self) -> &FilterSettings {
        &self.filters
    }

    pub fn filter_values(&self) -> &FilterValues {
        &self.values
    }

    pub fn sort_settings(&self) -> &SortSettings {
        &self.sort
    }

    pub fn strategy(&self) -> SortStrategy {
        self.strategy
    }

    pub fn draft(&self) -> &TaskDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut TaskDraft {
        &mut self.draft
    }

    pub fn edit(&self) -> Option<&EditBuffer> {
        self.edit.as_ref()
    }

    pub fn edit_mut(&mut self) -> Option<&mut EditBuffer> {
        self.edit.as_mut()
    }

    pub fn drag(&self) -> &DragState {
        &self.drag
    }

    pub fn context_menu(&self) -> Option<&TaskId> {
        self.context_menu.as_ref()
    }

    fn persist_tasks(&mut self) -> Result<()> {
        save_slice(&mut self.store, Slice::Tasks, &self.tasks)
    }

    // ---- lifecycle ----

    /// Create a task from the draft, stamped with the current time
    pub fn create(&mut self) -> Result<Option<TaskId>> {
        self.create_at(Local::now())
    }

    /// Create a task from the draft as if it were `instant`
    ///
    /// A blank title leaves the collection and the draft untouched. Otherwise
    /// the draft resets to its defaults.
    pub fn create_at(&mut self, instant: DateTime<Local>) -> Result<Option<TaskId>> {
        if self.draft.is_blank() {
            log::warn!("not creating a task with an empty title");
            return Ok(None);
        }

        let id = self.tasks.next_id(instant);
        let draft = std::mem::take(&mut self.draft);
        let task = draft.build(id.clone(), instant.date_naive());
        self.tasks.push(task);
        log::debug!("created task {}", id);

        self.persist_tasks()?;
        Ok(Some(id))
    }

    /// Clear the typed title and description of the draft
    pub fn discard_draft(&mut self) {
        self.draft.discard_text();
    }

    /// Flip completion; returns the new state, or None when the task is missing
    pub fn toggle_complete(&mut self, id: &TaskId) -> Result<Option<bool>> {
        let Some(task) = self.tasks.get_mut(id) else {
            log::warn!("toggle: task {} not found", id);
            return Ok(None);
        };
        task.toggle_complete();
        let completed = task.completed;
        log::debug!("task {} completed={}", id, completed);

        self.persist_tasks()?;
        Ok(Some(completed))
    }

    /// Remove a task; returns it, or None when it was not there
    pub fn delete(&mut self, id: &TaskId) -> Result<Option<Task>> {
        let Some(task) = self.tasks.remove(id) else {
            log::warn!("delete: task {} not found", id);
            return Ok(None);
        };
        if self.context_menu.as_ref() == Some(id) {
            self.context_menu = None;
        }
        if self.edit.as_ref().is_some_and(|e| &e.task_id == id) {
            self.edit = None;
        }
        log::debug!("deleted task {}", id);

        self.persist_tasks()?;
        Ok(Some(task))
    }

    /// Load a task into the edit buffer and close the context menu
    pub fn begin_edit(&mut self, id: &TaskId) -> bool {
        let Some(task) = self.tasks.get(id) else {
            log::warn!("edit: task {} not found", id);
            return false;
        };
        self.edit = Some(EditBuffer::from_task(task));
        self.context_menu = None;
        true
    }

    /// Write the edit buffer into its task
    ///
    /// Returns false when there is no buffer, when its title is blank (the
    /// buffer stays open) or when the task has since disappeared (the buffer
    /// is dropped).
    pub fn commit_edit(&mut self) -> Result<bool> {
        let Some(buffer) = self.edit.as_ref() else {
            return Ok(false);
        };
        if buffer.is_blank() {
            log::warn!("not saving task {} with an empty title", buffer.task_id);
            return Ok(false);
        }

        let Some(buffer) = self.edit.take() else {
            return Ok(false);
        };
        let Some(task) = self.tasks.get_mut(&buffer.task_id) else {
            log::warn!("edit: task {} no longer exists", buffer.task_id);
            return Ok(false);
        };
        buffer.apply_to(task);
        log::debug!("edited task {}", buffer.task_id);

        self.persist_tasks()?;
        Ok(true)
    }

    /// Drop the edit buffer without touching the task
    pub fn cancel_edit(&mut self) {
        self.edit = None;
    }

    /// Move `dragged` to the position `target` holds
    pub fn reorder(&mut self, dragged: &TaskId, target: &TaskId) -> Result<bool> {
        if !self.tasks.move_before(dragged, target) {
            log::debug!("reorder {} -> {} skipped", dragged, target);
            return Ok(false);
        }
        log::debug!("moved task {} to the slot of {}", dragged, target);

        self.persist_tasks()?;
        Ok(true)
    }

    // ---- drag session ----

    /// Start dragging a task; false when it does not exist
    pub fn drag_start(&mut self, id: &TaskId) -> bool {
        if !self.tasks.contains(id) {
            return false;
        }
        self.drag = DragState {
            dragged: Some(id.clone()),
            over: None,
        };
        true
    }

    pub fn drag_over(&mut self, id: &TaskId) {
        if self.drag.is_active() {
            self.drag.over = Some(id.clone());
        }
    }

    pub fn drag_leave(&mut self) {
        self.drag.over = None;
    }

    /// Drop the dragged task onto `target` and end the session
    pub fn drop_on(&mut self, target: &TaskId) -> Result<bool> {
        let Some(dragged) = std::mem::take(&mut self.drag).dragged else {
            return Ok(false);
        };
        self.reorder(&dragged, target)
    }

    /// End the session without moving anything
    pub fn drag_end(&mut self) {
        self.drag = DragState::default();
    }

    // ---- context menu ----

    pub fn open_context_menu(&mut self, id: &TaskId) -> bool {
        if !self.tasks.contains(id) {
            return false;
        }
        self.context_menu = Some(id.clone());
        true
    }

    pub fn close_context_menu(&mut self) {
        self.context_menu = None;
    }

    // ---- view settings ----

    pub fn set_filter_settings(&mut self, filters: FilterSettings) -> Result<()> {
        if self.filters == filters {
            return Ok(());
        }
        self.filters = filters;
        save_slice(&mut self.store, Slice::FilterSettings, &self.filters)
    }

    pub fn set_filter_values(&mut self, values: FilterValues) -> Result<()> {
        if self.values == values {
            return Ok(());
        }
        self.values = values;
        save_slice(&mut self.store, Slice::FilterValues, &self.values)
    }

    pub fn set_sort_settings(&mut self, sort: SortSettings) -> Result<()> {
        if self.sort == sort {
            return Ok(());
        }
        self.sort = sort;
        save_slice(&mut self.store, Slice::SortSettings, &self.sort)
    }

    /// Not persisted: the strategy comes from configuration
    pub fn set_strategy(&mut self, strategy: SortStrategy) {
        self.strategy = strategy;
    }

    // ---- catalogs ----

    /// Add a custom label; false when the name is already known
    pub fn add_custom_label(&mut self, name: &str, color: &str) -> Result<bool> {
        if !self.labels.add_custom(name, color) {
            return Ok(false);
        }
        log::debug!("added custom label {}", name);
        save_slice(&mut self.store, Slice::CustomLabels, &self.labels.custom())?;
        Ok(true)
    }

    /// Add a custom priority; false when the name is already known
    pub fn add_custom_priority(&mut self, name: &str, color: &str) -> Result<bool> {
        if !self.priorities.add_custom(name, color) {
            return Ok(false);
        }
        log::debug!("added custom priority {}", name);
        save_slice(&mut self.store, Slice::CustomPriorities, &self.priorities.custom())?;
        Ok(true)
    }

    // ---- views ----

    /// The pipeline configuration currently in effect
    pub fn query(&self) -> TaskQuery {
        TaskQuery::new()
            .with_filters(self.filters.clone())
            .with_values(self.values.clone())
            .with_sort(self.sort.clone())
            .with_strategy(self.strategy)
    }

    /// Tasks as the list shows them
    pub fn visible_tasks(&self) -> Vec<&Task> {
        self.tasks.query(&self.query())
    }

    pub fn stats(&self) -> TaskStats {
        self.tasks.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::{NaiveDate, TimeZone};
    use serde_json::json;

    fn at(millis: i64) -> DateTime<Local> {
        Local.timestamp_millis_opt(millis).unwrap()
    }

    fn controller() -> TaskController<MemoryStore> {
        TaskController::load(MemoryStore::new())
    }

    fn add(c: &mut TaskController<MemoryStore>, title: &str, millis: i64) -> TaskId {
        c.draft_mut().title = title.to_string();
        c.create_at(at(millis)).unwrap().unwrap()
    }

    fn seeded() -> (TaskController<MemoryStore>, Vec<TaskId>) {
        let mut c = controller();
        let ids = ["A", "B", "C", "D"]
            .iter()
            .enumerate()
            .map(|(i, t)| add(&mut c, t, 1_700_000_000_000 + i as i64))
            .collect();
        (c, ids)
    }

    fn titles(c: &TaskController<MemoryStore>) -> Vec<String> {
        c.tasks().iter().map(|t| t.title.clone()).collect()
    }

    /// Reads from a seeded memory store; every save fails
    struct FailingStore(MemoryStore);

    impl Store for FailingStore {
        fn load(&self, slice: Slice) -> Result<Option<serde_json::Value>> {
            self.0.load(slice)
        }

        fn save(&mut self, slice: Slice, _value: &serde_json::Value) -> Result<()> {
            Err(crate::error::CoreError::store(slice.key(), "disk full"))
        }
    }

    fn failing() -> TaskController<FailingStore> {
        let tasks = json!([
            {"id": "1", "title": "A", "creationDate": "1/1/2024"},
            {"id": "2", "title": "B", "creationDate": "1/1/2024"},
            {"id": "3", "title": "C", "creationDate": "1/1/2024"},
        ]);
        TaskController::load(FailingStore(MemoryStore::new().with_slice(Slice::Tasks, tasks)))
    }

    #[test]
    fn test_failed_create_reports_error_and_keeps_task() {
        let mut c = failing();
        c.draft_mut().title = "New".to_string();

        assert!(c.create_at(at(1_700_000_000_000)).is_err());
        assert_eq!(c.tasks().len(), 4);
        assert!(c.tasks().contains(&TaskId::from("1700000000000")));
        assert!(c.draft().is_blank());
    }

    #[test]
    fn test_failed_writes_do_not_roll_back() {
        let mut c = failing();
        let (a, b, cc) = (TaskId::from("1"), TaskId::from("2"), TaskId::from("3"));

        assert!(c.toggle_complete(&a).is_err());
        assert!(c.tasks().get(&a).unwrap().completed);

        assert!(c.reorder(&cc, &a).is_err());
        let order: Vec<&str> = c.tasks().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(order, vec!["3", "1", "2"]);

        assert!(c.delete(&b).is_err());
        assert!(!c.tasks().contains(&b));
        assert_eq!(c.tasks().len(), 2);
    }

    #[test]
    fn test_load_reads_every_slice() {
        let store = MemoryStore::new()
            .with_slice(
                Slice::Tasks,
                json!([{"id": "1", "title": "Stored", "creationDate": "1/1/2024"}]),
            )
            .with_slice(
                Slice::CustomLabels,
                json!([{"name": "#Garden", "color": "text-lime-500"}]),
            )
            .with_slice(Slice::FilterSettings, json!({"date": true}))
            .with_slice(Slice::SortSettings, json!(42));

        let c = TaskController::load(store);
        assert_eq!(c.tasks().len(), 1);
        assert_eq!(c.labels().resolve_color("#Garden"), "text-lime-500");
        assert!(c.filter_settings().date);
        assert_eq!(c.sort_settings(), &SortSettings::default());
    }

    #[test]
    fn test_create_with_blank_title_is_noop() {
        let mut c = controller();
        c.draft_mut().title = "   ".to_string();
        c.draft_mut().description = "kept".to_string();

        assert_eq!(c.create_at(at(1)).unwrap(), None);
        assert!(c.tasks().is_empty());
        assert_eq!(c.draft().description, "kept");
        assert_eq!(c.store().writes(), 0);
    }

    #[test]
    fn test_create_builds_task_and_resets_draft() {
        let mut c = controller();
        {
            let draft = c.draft_mut();
            draft.title = "  Buy milk ".to_string();
            draft.description = " 2 liters ".to_string();
            draft.due_date = NaiveDate::from_ymd_opt(2024, 3, 2);
            draft.priority = "Priority 1".to_string();
            draft.labels = vec!["#Shopping".to_string()];
            draft.repeat = "every-week".to_string();
        }

        let id = c.create_at(at(1_709_300_000_000)).unwrap().unwrap();
        let task = c.tasks().get(&id).unwrap();
        assert_eq!(task.title, "Buy milk");
        assert_eq!(task.description, "2 liters");
        assert_eq!(task.due_date.as_deref(), Some("3/2/2024"));
        assert_eq!(task.priority, "Priority 1");
        assert_eq!(task.repeat.as_deref(), Some("every-week"));
        assert!(!task.completed);
        assert_eq!(
            task.creation_date,
            crate::date::format_locale_date(at(1_709_300_000_000).date_naive())
        );

        assert_eq!(c.draft(), &TaskDraft::default());
        assert_eq!(c.store().writes(), 1);
        assert_eq!(c.store().get(Slice::Tasks).unwrap()[0]["title"], "Buy milk");
    }

    #[test]
    fn test_ids_unique_within_same_millisecond() {
        let mut c = controller();
        let a = add(&mut c, "a", 5);
        let b = add(&mut c, "b", 5);
        let d = add(&mut c, "c", 5);

        assert_ne!(a, b);
        assert_ne!(b, d);
        assert_ne!(a, d);
    }

    #[test]
    fn test_discard_draft_clears_text_only() {
        let mut c = controller();
        c.draft_mut().title = "typed".to_string();
        c.draft_mut().priority = "Priority 1".to_string();

        c.discard_draft();
        assert!(c.draft().is_blank());
        assert_eq!(c.draft().priority, "Priority 1");
    }

    #[test]
    fn test_toggle_twice_restores() {
        let (mut c, ids) = seeded();
        let before = c.tasks().get(&ids[1]).unwrap().clone();

        assert_eq!(c.toggle_complete(&ids[1]).unwrap(), Some(true));
        assert_eq!(c.toggle_complete(&ids[1]).unwrap(), Some(false));
        assert_eq!(c.tasks().get(&ids[1]).unwrap(), &before);
    }

    #[test]
    fn test_toggle_missing_is_noop() {
        let (mut c, _) = seeded();
        let writes = c.store().writes();
        assert_eq!(c.toggle_complete(&TaskId::from("nope")).unwrap(), None);
        assert_eq!(c.store().writes(), writes);
    }

    #[test]
    fn test_delete_keeps_order_and_closes_menu() {
        let (mut c, ids) = seeded();
        assert!(c.open_context_menu(&ids[1]));

        let removed = c.delete(&ids[1]).unwrap().unwrap();
        assert_eq!(removed.title, "B");
        assert_eq!(titles(&c), vec!["A", "C", "D"]);
        assert_eq!(c.context_menu(), None);
        assert_eq!(c.delete(&ids[1]).unwrap(), None);
    }

    #[test]
    fn test_delete_leaves_menu_for_other_task() {
        let (mut c, ids) = seeded();
        c.open_context_menu(&ids[0]);
        c.delete(&ids[2]).unwrap();
        assert_eq!(c.context_menu(), Some(&ids[0]));
    }

    #[test]
    fn test_begin_edit_closes_menu_and_loads_buffer() {
        let (mut c, ids) = seeded();
        c.open_context_menu(&ids[0]);

        assert!(c.begin_edit(&ids[0]));
        assert_eq!(c.context_menu(), None);
        let buffer = c.edit().unwrap();
        assert_eq!(buffer.title, "A");
        assert_eq!(buffer.due_date, None);

        assert!(!c.begin_edit(&TaskId::from("nope")));
    }

    #[test]
    fn test_commit_edit_applies_and_clears() {
        let (mut c, ids) = seeded();
        c.begin_edit(&ids[0]);
        {
            let buffer = c.edit_mut().unwrap();
            buffer.title = " Renamed ".to_string();
            buffer.priority = "Priority 2".to_string();
            buffer.due_date = NaiveDate::from_ymd_opt(2024, 1, 1);
        }

        assert!(c.commit_edit().unwrap());
        assert!(c.edit().is_none());
        let task = c.tasks().get(&ids[0]).unwrap();
        assert_eq!(task.title, "Renamed");
        assert_eq!(task.priority, "Priority 2");
        assert_eq!(task.due_date.as_deref(), Some("1/1/2024"));
    }

    #[test]
    fn test_empty_edit_title_keeps_original() {
        let (mut c, ids) = seeded();
        let writes = c.store().writes();

        c.begin_edit(&ids[0]);
        c.edit_mut().unwrap().title = "  ".to_string();
        assert!(!c.commit_edit().unwrap());
        assert!(c.edit().is_some());
        assert_eq!(c.tasks().get(&ids[0]).unwrap().title, "A");

        c.cancel_edit();
        assert!(c.edit().is_none());
        assert_eq!(c.tasks().get(&ids[0]).unwrap().title, "A");
        assert_eq!(c.store().writes(), writes);
    }

    #[test]
    fn test_commit_after_task_vanished() {
        let (mut c, ids) = seeded();
        c.begin_edit(&ids[3]);
        c.delete(&ids[3]).unwrap();
        assert!(!c.commit_edit().unwrap());
        assert!(c.edit().is_none());
    }

    #[test]
    fn test_reorder() {
        let (mut c, ids) = seeded();
        assert!(c.reorder(&ids[0], &ids[2]).unwrap());
        assert_eq!(titles(&c), vec!["B", "C", "A", "D"]);

        let writes = c.store().writes();
        assert!(!c.reorder(&ids[1], &ids[1]).unwrap());
        assert!(!c.reorder(&ids[1], &TaskId::from("nope")).unwrap());
        assert_eq!(titles(&c), vec!["B", "C", "A", "D"]);
        assert_eq!(c.store().writes(), writes);
    }

    #[test]
    fn test_drag_session() {
        let (mut c, ids) = seeded();
        assert!(c.drag_start(&ids[3]));
        c.drag_over(&ids[0]);
        assert_eq!(c.drag().over.as_ref(), Some(&ids[0]));
        c.drag_leave();
        assert_eq!(c.drag().over, None);

        assert!(c.drop_on(&ids[0]).unwrap());
        assert_eq!(titles(&c), vec!["D", "A", "B", "C"]);
        assert!(!c.drag().is_active());

        assert!(!c.drop_on(&ids[0]).unwrap());
    }

    #[test]
    fn test_drag_end_moves_nothing() {
        let (mut c, ids) = seeded();
        c.drag_start(&ids[0]);
        c.drag_over(&ids[2]);
        c.drag_end();
        assert_eq!(c.drag(), &DragState::default());
        assert_eq!(titles(&c), vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn test_settings_persist_own_slice_once() {
        let mut c = controller();
        let filters = FilterSettings {
            label: true,
            ..FilterSettings::default()
        };

        c.set_filter_settings(filters.clone()).unwrap();
        c.set_filter_settings(filters).unwrap();
        assert_eq!(c.store().writes(), 1);
        assert_eq!(c.store().get(Slice::FilterSettings).unwrap()["label"], true);

        c.set_filter_values(FilterValues {
            label: "#Work".to_string(),
            ..FilterValues::default()
        })
        .unwrap();
        assert_eq!(c.store().get(Slice::FilterValues).unwrap()["label"], "#Work");
    }

    #[test]
    fn test_visible_tasks_use_settings() {
        let (mut c, ids) = seeded();
        c.toggle_complete(&ids[0]).unwrap();
        c.set_sort_settings(SortSettings {
            completion_status: true,
            creation_date: false,
            ..SortSettings::default()
        })
        .unwrap();

        let visible: Vec<&str> = c.visible_tasks().iter().map(|t| t.title.as_str()).collect();
        assert_eq!(visible, vec!["B", "C", "D", "A"]);
        assert_eq!(c.stats().completed, 1);
        assert_eq!(c.stats().pending, 3);
    }

    #[test]
    fn test_custom_label_overrides_preset() {
        let mut c = controller();
        assert!(!c.add_custom_label("#Work", "text-lime-500").unwrap());
        assert_eq!(c.labels().resolve_color("#Work"), "text-orange-500");

        let store = MemoryStore::new().with_slice(
            Slice::CustomLabels,
            json!([{"name": "#Work", "color": "text-lime-500"}]),
        );
        let c = TaskController::load(store);
        assert_eq!(c.labels().resolve_color("#Work"), "text-lime-500");
    }

    #[test]
    fn test_add_custom_priority_persists() {
        let mut c = controller();
        assert!(c.add_custom_priority("Someday", "text-indigo-500").unwrap());
        assert_eq!(
            c.store().get(Slice::CustomPriorities).unwrap()[0]["name"],
            "Someday"
        );
        assert_eq!(c.priorities().priority_style("Someday").text, "text-indigo-500");
    }
}

//! TUI Application state and event handling

use std::io;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::{Backend, CrosstermBackend};

use kairo_core::date::{format_locale_date, parse_date};
use kairo_core::task::DEFAULT_PRIORITY;
use kairo_core::{
    Catalog, FilterSettings, FilterValues, SelectionMode, Selector, Store, Task, TaskController,
    TaskId,
};

use crate::error::TuiError;
use crate::ui;

/// Fields of the add form, in tab order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddField {
    Title,
    Description,
    Due,
    Time,
    Reminder,
    Repeat,
}

impl AddField {
    pub const ALL: [AddField; 6] = [
        AddField::Title,
        AddField::Description,
        AddField::Due,
        AddField::Time,
        AddField::Reminder,
        AddField::Repeat,
    ];

    fn index(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    pub fn as_str(&self) -> &str {
        match self {
            AddField::Title => "Title",
            AddField::Description => "Description",
            AddField::Due => "Due date",
            AddField::Time => "Time",
            AddField::Reminder => "Reminder",
            AddField::Repeat => "Repeat",
        }
    }
}

/// Fields of the edit form, in tab order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditField {
    Title,
    Description,
    Due,
}

impl EditField {
    pub fn next(self) -> Self {
        match self {
            EditField::Title => EditField::Description,
            EditField::Description => EditField::Due,
            EditField::Due => EditField::Title,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            EditField::Title => EditField::Due,
            EditField::Description => EditField::Title,
            EditField::Due => EditField::Description,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            EditField::Title => "Title",
            EditField::Description => "Description",
            EditField::Due => "Due date",
        }
    }
}

/// What a picker writes its selection into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerTarget {
    DraftLabels,
    DraftPriority,
    EditPriority,
    FilterPriority,
    FilterLabel,
}

impl PickerTarget {
    pub fn uses_labels(&self) -> bool {
        matches!(self, PickerTarget::DraftLabels | PickerTarget::FilterLabel)
    }
}

/// An open label or priority picker
#[derive(Debug, Clone, PartialEq)]
pub struct PickerState {
    pub target: PickerTarget,
    pub selector: Selector,
    pub selection: Vec<String>,
}

pub const CONTEXT_ACTIONS: [&str; 3] = ["Open", "Edit", "Delete"];
pub const FILTER_ROWS: [&str; 3] = ["Date", "Priority", "Label"];
pub const SORT_ROWS: [&str; 2] = ["Completion status", "Creation date"];

#[derive(Debug, Clone, PartialEq)]
pub enum DialogMode {
    None,
    /// Due date is kept as typed and parsed on submit
    AddTask { field: AddField, due: String },
    EditTask { field: EditField, due: String },
    ContextMenu { selected: usize },
    Details { id: TaskId },
    DeleteConfirm { id: TaskId },
    /// `date_input` is Some while the date value is being typed
    FilterMenu { selected: usize, date_input: Option<String> },
    SortMenu { selected: usize },
    Help,
}

pub struct App<S: Store> {
    pub controller: TaskController<S>,
    pub selected_index: usize,
    pub dialog: DialogMode,
    /// Drawn and handled above the dialog
    pub picker: Option<PickerState>,
    pub should_quit: bool,
    pub status_message: Option<String>,
}

fn single(value: &str) -> Vec<String> {
    if value.is_empty() {
        Vec::new()
    } else {
        vec![value.to_string()]
    }
}

impl<S: Store> App<S> {
    pub fn new(controller: TaskController<S>) -> Self {
        Self {
            controller,
            selected_index: 0,
            dialog: DialogMode::None,
            picker: None,
            should_quit: false,
            status_message: None,
        }
    }

    pub fn visible_ids(&self) -> Vec<TaskId> {
        self.controller
            .visible_tasks()
            .iter()
            .map(|t| t.id.clone())
            .collect()
    }

    pub fn selected_task_id(&self) -> Option<TaskId> {
        self.visible_ids().get(self.selected_index).cloned()
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.controller.visible_tasks().get(self.selected_index).copied()
    }

    pub fn catalog_for(&self, target: PickerTarget) -> &Catalog {
        if target.uses_labels() {
            self.controller.labels()
        } else {
            self.controller.priorities()
        }
    }

    /// Keep the selection inside the visible list
    fn clamp_selection(&mut self) {
        let len = self.controller.visible_tasks().len();
        if self.selected_index >= len {
            self.selected_index = len.saturating_sub(1);
        }
    }

    fn select_task(&mut self, id: &TaskId) {
        if let Some(index) = self.visible_ids().iter().position(|v| v == id) {
            self.selected_index = index;
        }
    }

    pub fn move_selection(&mut self, delta: i32) {
        let len = self.controller.visible_tasks().len();
        if len == 0 {
            return;
        }

        self.selected_index = if delta < 0 {
            self.selected_index.saturating_sub(delta.unsigned_abs() as usize)
        } else {
            (self.selected_index + delta as usize).min(len - 1)
        };
    }

    /// Surface a failed save in the status line
    fn report<T>(&mut self, result: kairo_core::Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                log::error!("{}", e);
                self.status_message = Some(format!("Failed to save: {}", e));
                None
            }
        }
    }

    // ---- input dispatch ----

    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        self.status_message = None;

        if self.picker.is_some() {
            self.handle_picker_key(code);
        } else if self.dialog != DialogMode::None {
            self.handle_dialog_key(code, modifiers);
        } else if self.controller.drag().is_active() {
            self.handle_drag_key(code);
        } else {
            self.handle_list_key(code);
        }
    }

    fn handle_list_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Char('g') | KeyCode::Home => self.selected_index = 0,
            KeyCode::Char('G') | KeyCode::End => {
                self.selected_index = self.controller.visible_tasks().len().saturating_sub(1);
            }
            KeyCode::Char(' ') | KeyCode::Char('x') => self.toggle_selected(),
            KeyCode::Char('a') => self.open_add(),
            KeyCode::Char('e') => self.edit_selected(),
            KeyCode::Enter => self.open_context_menu(),
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(id) = self.selected_task_id() {
                    self.dialog = DialogMode::DeleteConfirm { id };
                }
            }
            KeyCode::Char('m') => self.start_drag(),
            KeyCode::Char('f') => {
                self.dialog = DialogMode::FilterMenu {
                    selected: 0,
                    date_input: None,
                };
            }
            KeyCode::Char('s') => self.dialog = DialogMode::SortMenu { selected: 0 },
            KeyCode::Char('?') => self.dialog = DialogMode::Help,
            _ => {}
        }
    }

    fn handle_dialog_key(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        match &self.dialog {
            DialogMode::None => {}
            DialogMode::AddTask { .. } => self.handle_add_key(code, modifiers),
            DialogMode::EditTask { .. } => self.handle_edit_key(code, modifiers),
            DialogMode::ContextMenu { .. } => self.handle_context_key(code),
            DialogMode::Details { id } => match code {
                KeyCode::Char('e') => {
                    let id = id.clone();
                    self.dialog = DialogMode::None;
                    self.begin_edit(&id);
                }
                _ => self.dialog = DialogMode::None,
            },
            DialogMode::DeleteConfirm { id } => match code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    let id = id.clone();
                    let result = self.controller.delete(&id);
                    self.report(result);
                    self.clamp_selection();
                    self.dialog = DialogMode::None;
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    self.controller.close_context_menu();
                    self.dialog = DialogMode::None;
                }
                _ => {}
            },
            DialogMode::FilterMenu { .. } => self.handle_filter_key(code),
            DialogMode::SortMenu { .. } => self.handle_sort_key(code),
            DialogMode::Help => match code {
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Enter | KeyCode::Char('q') => {
                    self.dialog = DialogMode::None;
                }
                _ => {}
            },
        }
    }

    // ---- list actions ----

    pub fn toggle_selected(&mut self) {
        if let Some(id) = self.selected_task_id() {
            let result = self.controller.toggle_complete(&id);
            self.report(result);
            self.select_task(&id);
        }
    }

    fn open_add(&mut self) {
        let due = self
            .controller
            .draft()
            .due_date
            .map(format_locale_date)
            .unwrap_or_default();
        self.dialog = DialogMode::AddTask {
            field: AddField::Title,
            due,
        };
    }

    fn edit_selected(&mut self) {
        if let Some(id) = self.selected_task_id() {
            self.begin_edit(&id);
        }
    }

    fn begin_edit(&mut self, id: &TaskId) {
        if !self.controller.begin_edit(id) {
            return;
        }
        let due = self
            .controller
            .edit()
            .and_then(|b| b.due_date)
            .map(format_locale_date)
            .unwrap_or_default();
        self.dialog = DialogMode::EditTask {
            field: EditField::Title,
            due,
        };
    }

    fn open_context_menu(&mut self) {
        if let Some(id) = self.selected_task_id()
            && self.controller.open_context_menu(&id)
        {
            self.dialog = DialogMode::ContextMenu { selected: 0 };
        }
    }

    // ---- add form ----

    fn add_field_text(&mut self, field: AddField) -> Option<&mut String> {
        match field {
            AddField::Title => Some(&mut self.controller.draft_mut().title),
            AddField::Description => Some(&mut self.controller.draft_mut().description),
            AddField::Time => Some(&mut self.controller.draft_mut().time),
            AddField::Repeat => Some(&mut self.controller.draft_mut().repeat),
            AddField::Reminder => Some(
                self.controller
                    .draft_mut()
                    .reminder
                    .get_or_insert_with(String::new),
            ),
            AddField::Due => match &mut self.dialog {
                DialogMode::AddTask { due, .. } => Some(due),
                _ => None,
            },
        }
    }

    fn handle_add_key(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        let DialogMode::AddTask { field, .. } = &mut self.dialog else {
            return;
        };
        let ctrl = modifiers.contains(KeyModifiers::CONTROL);

        match code {
            KeyCode::Esc => {
                self.controller.discard_draft();
                self.dialog = DialogMode::None;
            }
            KeyCode::Tab | KeyCode::Down => *field = field.next(),
            KeyCode::BackTab | KeyCode::Up => *field = field.prev(),
            KeyCode::Enter => self.submit_add(),
            KeyCode::Char('l') if ctrl => self.open_picker(PickerTarget::DraftLabels),
            KeyCode::Char('p') if ctrl => self.open_picker(PickerTarget::DraftPriority),
            KeyCode::Char(_) if ctrl => {}
            KeyCode::Backspace => {
                let field = *field;
                if let Some(text) = self.add_field_text(field) {
                    text.pop();
                }
            }
            KeyCode::Char(c) => {
                let field = *field;
                if let Some(text) = self.add_field_text(field) {
                    text.push(c);
                }
            }
            _ => {}
        }
    }

    fn submit_add(&mut self) {
        let DialogMode::AddTask { due, .. } = &self.dialog else {
            return;
        };
        let due_text = due.trim().to_string();

        let due_date = if due_text.is_empty() {
            None
        } else {
            match parse_date(&due_text) {
                Ok(date) => Some(date),
                Err(e) => {
                    self.status_message = Some(e.to_string());
                    return;
                }
            }
        };
        self.controller.draft_mut().due_date = due_date;

        match self.controller.create() {
            Ok(Some(id)) => {
                self.dialog = DialogMode::None;
                self.select_task(&id);
            }
            Ok(None) => {
                self.status_message = Some("Task title cannot be empty".to_string());
            }
            Err(e) => {
                self.dialog = DialogMode::None;
                self.report::<()>(Err(e));
            }
        }
    }

    // ---- edit form ----

    fn edit_field_text(&mut self, field: EditField) -> Option<&mut String> {
        match field {
            EditField::Title => self.controller.edit_mut().map(|b| &mut b.title),
            EditField::Description => self.controller.edit_mut().map(|b| &mut b.description),
            EditField::Due => match &mut self.dialog {
                DialogMode::EditTask { due, .. } => Some(due),
                _ => None,
            },
        }
    }

    fn handle_edit_key(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        let DialogMode::EditTask { field, .. } = &mut self.dialog else {
            return;
        };
        let ctrl = modifiers.contains(KeyModifiers::CONTROL);

        match code {
            KeyCode::Esc => {
                self.controller.cancel_edit();
                self.dialog = DialogMode::None;
            }
            KeyCode::Tab | KeyCode::Down => *field = field.next(),
            KeyCode::BackTab | KeyCode::Up => *field = field.prev(),
            KeyCode::Enter => self.submit_edit(),
            KeyCode::Char('p') if ctrl => self.open_picker(PickerTarget::EditPriority),
            KeyCode::Char(_) if ctrl => {}
            KeyCode::Backspace => {
                let field = *field;
                if let Some(text) = self.edit_field_text(field) {
                    text.pop();
                }
            }
            KeyCode::Char(c) => {
                let field = *field;
                if let Some(text) = self.edit_field_text(field) {
                    text.push(c);
                }
            }
            _ => {}
        }
    }

    fn submit_edit(&mut self) {
        let DialogMode::EditTask { due, .. } = &self.dialog else {
            return;
        };
        let due_text = due.trim().to_string();

        let due_date = if due_text.is_empty() {
            None
        } else {
            match parse_date(&due_text) {
                Ok(date) => Some(date),
                Err(e) => {
                    self.status_message = Some(e.to_string());
                    return;
                }
            }
        };
        if let Some(buffer) = self.controller.edit_mut() {
            buffer.due_date = due_date;
        }

        match self.controller.commit_edit() {
            Ok(true) => self.dialog = DialogMode::None,
            Ok(false) if self.controller.edit().is_some() => {
                self.status_message = Some("Task title cannot be empty".to_string());
            }
            Ok(false) => {
                self.dialog = DialogMode::None;
                self.status_message = Some("Task no longer exists".to_string());
            }
            Err(e) => {
                self.dialog = DialogMode::None;
                self.report::<()>(Err(e));
            }
        }
        self.clamp_selection();
    }

    // ---- context menu ----

    fn handle_context_key(&mut self, code: KeyCode) {
        let DialogMode::ContextMenu { selected } = &mut self.dialog else {
            return;
        };

        match code {
            KeyCode::Esc => {
                self.controller.close_context_menu();
                self.dialog = DialogMode::None;
            }
            KeyCode::Up | KeyCode::Char('k') => *selected = selected.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => {
                *selected = (*selected + 1).min(CONTEXT_ACTIONS.len() - 1);
            }
            KeyCode::Enter => {
                let action = *selected;
                let Some(id) = self.controller.context_menu().cloned() else {
                    self.dialog = DialogMode::None;
                    return;
                };
                match action {
                    0 => {
                        self.controller.close_context_menu();
                        self.dialog = DialogMode::Details { id };
                    }
                    1 => {
                        self.dialog = DialogMode::None;
                        self.begin_edit(&id);
                    }
                    _ => self.dialog = DialogMode::DeleteConfirm { id },
                }
            }
            _ => {}
        }
    }

    // ---- drag and drop ----

    fn start_drag(&mut self) {
        if let Some(id) = self.selected_task_id() {
            self.controller.drag_start(&id);
        }
    }

    fn handle_drag_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.move_selection(-1);
                self.hover_selected();
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.move_selection(1);
                self.hover_selected();
            }
            KeyCode::Enter | KeyCode::Char('m') => {
                let dragged = self.controller.drag().dragged.clone();
                let Some(target) = self.selected_task_id() else {
                    self.controller.drag_end();
                    return;
                };
                let result = self.controller.drop_on(&target);
                if self.report(result) == Some(true)
                    && let Some(dragged) = dragged
                {
                    self.select_task(&dragged);
                }
            }
            KeyCode::Esc => self.controller.drag_end(),
            _ => {}
        }
    }

    fn hover_selected(&mut self) {
        match self.selected_task_id() {
            Some(id) if self.controller.drag().dragged.as_ref() != Some(&id) => {
                self.controller.drag_over(&id);
            }
            _ => self.controller.drag_leave(),
        }
    }

    // ---- pickers ----

    pub fn open_picker(&mut self, target: PickerTarget) {
        let (selector, selection) = match target {
            PickerTarget::DraftLabels => {
                (Selector::labels(), self.controller.draft().labels.clone())
            }
            PickerTarget::DraftPriority => (
                Selector::priorities(),
                single(&self.controller.draft().priority),
            ),
            PickerTarget::EditPriority => (
                Selector::priorities(),
                self.controller
                    .edit()
                    .map(|b| single(&b.priority))
                    .unwrap_or_default(),
            ),
            PickerTarget::FilterPriority => (
                Selector::priorities(),
                single(&self.controller.filter_values().priority),
            ),
            PickerTarget::FilterLabel => (
                Selector::new(SelectionMode::Single, "Label"),
                single(&self.controller.filter_values().label),
            ),
        };

        self.picker = Some(PickerState {
            target,
            selector,
            selection,
        });
    }

    fn handle_picker_key(&mut self, code: KeyCode) {
        let Some(picker) = self.picker.as_mut() else {
            return;
        };
        let catalog = if picker.target.uses_labels() {
            self.controller.labels()
        } else {
            self.controller.priorities()
        };
        let len = picker.selector.sections(catalog).len();
        let mut changed = false;

        match code {
            KeyCode::Esc => {
                self.picker = None;
                return;
            }
            KeyCode::Up => picker.selector.move_cursor(-1, len),
            KeyCode::Down => picker.selector.move_cursor(1, len),
            KeyCode::Enter => {
                if let Some(entry) = picker.selector.highlighted(catalog) {
                    let name = entry.name.clone();
                    picker.selector.toggle(&mut picker.selection, &name);
                    changed = true;
                }
            }
            KeyCode::Delete => {
                picker.selector.clear(&mut picker.selection);
                changed = true;
            }
            KeyCode::Backspace => picker.selector.pop_char(),
            KeyCode::Char(c) => picker.selector.push_char(c),
            _ => {}
        }

        if changed {
            let target = picker.target;
            let selection = picker.selection.clone();
            self.apply_picker(target, selection);
        }
    }

    /// Write a picker selection into its target
    fn apply_picker(&mut self, target: PickerTarget, selection: Vec<String>) {
        let first = selection.first().cloned();
        match target {
            PickerTarget::DraftLabels => self.controller.draft_mut().labels = selection,
            PickerTarget::DraftPriority => {
                self.controller.draft_mut().priority =
                    first.unwrap_or_else(|| DEFAULT_PRIORITY.to_string());
            }
            PickerTarget::EditPriority => {
                if let Some(buffer) = self.controller.edit_mut() {
                    buffer.priority = first.unwrap_or_else(|| DEFAULT_PRIORITY.to_string());
                }
            }
            PickerTarget::FilterPriority => self.update_filters(|filters, values| {
                values.priority = first.unwrap_or_default();
                filters.priority = !values.priority.is_empty();
            }),
            PickerTarget::FilterLabel => self.update_filters(|filters, values| {
                values.label = first.unwrap_or_default();
                filters.label = !values.label.is_empty();
            }),
        }
    }

    // ---- filter and sort menus ----

    fn update_filters(&mut self, update: impl FnOnce(&mut FilterSettings, &mut FilterValues)) {
        let mut filters = self.controller.filter_settings().clone();
        let mut values = self.controller.filter_values().clone();
        update(&mut filters, &mut values);

        let result = match self.controller.set_filter_settings(filters) {
            Ok(()) => self.controller.set_filter_values(values),
            Err(e) => Err(e),
        };
        self.report(result);
        self.clamp_selection();
    }

    fn apply_date_filter(&mut self, text: &str) {
        if text.is_empty() {
            self.update_filters(|filters, values| {
                filters.date = false;
                values.date.clear();
            });
            return;
        }

        match parse_date(text) {
            Ok(date) => self.update_filters(|filters, values| {
                filters.date = true;
                values.date = format_locale_date(date);
            }),
            Err(e) => self.status_message = Some(e.to_string()),
        }
    }

    fn handle_filter_key(&mut self, code: KeyCode) {
        let DialogMode::FilterMenu {
            selected,
            date_input,
        } = &mut self.dialog
        else {
            return;
        };

        if let Some(input) = date_input.as_mut() {
            match code {
                KeyCode::Esc => *date_input = None,
                KeyCode::Backspace => {
                    input.pop();
                }
                KeyCode::Char(c) => input.push(c),
                KeyCode::Enter => {
                    let text = input.trim().to_string();
                    *date_input = None;
                    self.apply_date_filter(&text);
                }
                _ => {}
            }
            return;
        }

        let row = *selected;
        match code {
            KeyCode::Esc | KeyCode::Char('f') => self.dialog = DialogMode::None,
            KeyCode::Up | KeyCode::Char('k') => *selected = selected.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => {
                *selected = (*selected + 1).min(FILTER_ROWS.len() - 1);
            }
            KeyCode::Char(' ') => self.update_filters(|filters, _| match row {
                0 => filters.date = !filters.date,
                1 => filters.priority = !filters.priority,
                _ => filters.label = !filters.label,
            }),
            KeyCode::Char('c') => self.update_filters(|filters, values| {
                *filters = FilterSettings::default();
                *values = FilterValues::default();
            }),
            KeyCode::Enter => match row {
                0 => *date_input = Some(self.controller.filter_values().date.clone()),
                1 => self.open_picker(PickerTarget::FilterPriority),
                _ => self.open_picker(PickerTarget::FilterLabel),
            },
            _ => {}
        }
    }

    fn handle_sort_key(&mut self, code: KeyCode) {
        let DialogMode::SortMenu { selected } = &mut self.dialog else {
            return;
        };

        match code {
            KeyCode::Esc | KeyCode::Char('s') => self.dialog = DialogMode::None,
            KeyCode::Up | KeyCode::Char('k') => *selected = selected.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => {
                *selected = (*selected + 1).min(SORT_ROWS.len() - 1);
            }
            KeyCode::Char(' ') | KeyCode::Enter => {
                let mut sort = self.controller.sort_settings().clone();
                if *selected == 0 {
                    sort.completion_status = !sort.completion_status;
                } else {
                    sort.creation_date = !sort.creation_date;
                }
                let result = self.controller.set_sort_settings(sort);
                self.report(result);
            }
            _ => {}
        }
    }
}

/// Take over the terminal and run the task list until the user quits
pub fn run<S: Store>(controller: TaskController<S>) -> Result<(), TuiError> {
    enable_raw_mode().map_err(|e| TuiError::terminal("Failed to enable raw mode", e))?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)
        .map_err(|e| TuiError::terminal("Failed to setup terminal", e))?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal =
        Terminal::new(backend).map_err(|e| TuiError::terminal("Failed to create terminal", e))?;

    let mut app = App::new(controller);
    log::info!("tui started with {} tasks", app.controller.tasks().len());

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();

    result
}

fn run_app<B: Backend, S: Store>(
    terminal: &mut Terminal<B>,
    app: &mut App<S>,
) -> Result<(), TuiError> {
    loop {
        terminal
            .draw(|f| ui::draw(f, app))
            .map_err(|e| TuiError::terminal("Failed to draw", e))?;

        if let Event::Key(key) =
            event::read().map_err(|e| TuiError::terminal("Failed to read event", e))?
            && key.kind == KeyEventKind::Press
        {
            app.handle_key(key.code, key.modifiers);
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kairo_core::{MemoryStore, Slice};
    use serde_json::json;

    fn empty_app() -> App<MemoryStore> {
        App::new(TaskController::load(MemoryStore::new()))
    }

    /// Four open tasks sharing one creation date, so the list keeps manual order
    fn seeded_app() -> App<MemoryStore> {
        let tasks: Vec<_> = ["A", "B", "C", "D"]
            .iter()
            .enumerate()
            .map(|(i, title)| {
                json!({
                    "id": (i + 1).to_string(),
                    "title": title,
                    "creationDate": "1/1/2024",
                    "priority": if i == 0 { "Priority 1" } else { "Priority 3" },
                })
            })
            .collect();
        let store = MemoryStore::new().with_slice(Slice::Tasks, json!(tasks));
        App::new(TaskController::load(store))
    }

    /// Loads seeded data; every save fails
    struct FailingStore(MemoryStore);

    impl Store for FailingStore {
        fn load(&self, slice: Slice) -> kairo_core::Result<Option<serde_json::Value>> {
            self.0.load(slice)
        }

        fn save(&mut self, slice: Slice, _value: &serde_json::Value) -> kairo_core::Result<()> {
            Err(kairo_core::CoreError::store(slice.key(), "disk full"))
        }
    }

    fn press(app: &mut App<MemoryStore>, code: KeyCode) {
        app.handle_key(code, KeyModifiers::NONE);
    }

    fn ctrl(app: &mut App<MemoryStore>, c: char) {
        app.handle_key(KeyCode::Char(c), KeyModifiers::CONTROL);
    }

    fn type_text(app: &mut App<MemoryStore>, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn titles(app: &App<MemoryStore>) -> Vec<String> {
        app.controller
            .tasks()
            .iter()
            .map(|t| t.title.clone())
            .collect()
    }

    #[test]
    fn test_add_task_flow() {
        let mut app = empty_app();
        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "Buy milk q");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "2 liters");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.dialog, DialogMode::None);
        assert!(!app.should_quit);
        let task = &app.controller.tasks().tasks[0];
        assert_eq!(task.title, "Buy milk q");
        assert_eq!(task.description, "2 liters");
        assert_eq!(app.controller.draft().title, "");
    }

    #[test]
    fn test_add_blank_title_keeps_form_open() {
        let mut app = empty_app();
        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "   ");
        press(&mut app, KeyCode::Enter);

        assert!(matches!(app.dialog, DialogMode::AddTask { .. }));
        assert!(app.controller.tasks().is_empty());
        assert!(app.status_message.is_some());
    }

    #[test]
    fn test_add_with_bad_due_date_reports() {
        let mut app = empty_app();
        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "Task");
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "not a date");
        press(&mut app, KeyCode::Enter);

        assert!(app.controller.tasks().is_empty());
        assert!(app.status_message.is_some());
    }

    #[test]
    fn test_escape_discards_text_but_keeps_priority() {
        let mut app = empty_app();
        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "half typed");

        ctrl(&mut app, 'p');
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Esc);
        assert!(app.picker.is_none());
        assert_eq!(app.controller.draft().priority, "Priority 1");

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.dialog, DialogMode::None);
        assert_eq!(app.controller.draft().title, "");
        assert_eq!(app.controller.draft().priority, "Priority 1");
    }

    #[test]
    fn test_label_picker_is_multi_select() {
        let mut app = empty_app();
        press(&mut app, KeyCode::Char('a'));
        ctrl(&mut app, 'l');

        type_text(&mut app, "work");
        press(&mut app, KeyCode::Enter);
        for _ in 0..4 {
            press(&mut app, KeyCode::Backspace);
        }
        type_text(&mut app, "urgent");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.controller.draft().labels, vec!["#Work", "#Urgent"]);

        press(&mut app, KeyCode::Delete);
        assert!(app.controller.draft().labels.is_empty());
        assert!(matches!(app.dialog, DialogMode::AddTask { .. }));
    }

    #[test]
    fn test_priority_picker_replaces_selection() {
        let mut app = empty_app();
        press(&mut app, KeyCode::Char('a'));
        ctrl(&mut app, 'p');
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.picker.as_ref().unwrap().selection, vec!["Priority 2"]);
        assert_eq!(app.controller.draft().priority, "Priority 2");
    }

    #[test]
    fn test_toggle_selected() {
        let mut app = seeded_app();
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Char(' '));
        assert!(app.controller.tasks().tasks[1].completed);
        assert_eq!(app.selected_index, 1);
    }

    #[test]
    fn test_edit_flow_and_blank_title() {
        let mut app = seeded_app();
        press(&mut app, KeyCode::Char('e'));
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Enter);

        assert!(matches!(app.dialog, DialogMode::EditTask { .. }));
        assert!(app.status_message.is_some());
        assert_eq!(app.controller.tasks().tasks[0].title, "A");

        type_text(&mut app, "Alpha");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.dialog, DialogMode::None);
        assert_eq!(app.controller.tasks().tasks[0].title, "Alpha");
    }

    #[test]
    fn test_edit_cancel_keeps_task() {
        let mut app = seeded_app();
        press(&mut app, KeyCode::Char('e'));
        type_text(&mut app, " changed");
        press(&mut app, KeyCode::Esc);

        assert!(app.controller.edit().is_none());
        assert_eq!(app.controller.tasks().tasks[0].title, "A");
    }

    #[test]
    fn test_context_menu_delete() {
        let mut app = seeded_app();
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);
        assert!(matches!(app.dialog, DialogMode::ContextMenu { .. }));
        assert_eq!(app.controller.context_menu(), Some(&TaskId::from("2")));

        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('y'));

        assert_eq!(titles(&app), vec!["A", "C", "D"]);
        assert_eq!(app.controller.context_menu(), None);
        assert_eq!(app.dialog, DialogMode::None);
    }

    #[test]
    fn test_context_menu_edit_closes_menu() {
        let mut app = seeded_app();
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);

        assert!(matches!(app.dialog, DialogMode::EditTask { .. }));
        assert_eq!(app.controller.context_menu(), None);
    }

    #[test]
    fn test_delete_confirm_cancel() {
        let mut app = seeded_app();
        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.controller.tasks().len(), 4);
    }

    #[test]
    fn test_grab_and_drop_reorders() {
        let mut app = seeded_app();
        press(&mut app, KeyCode::Char('m'));
        assert!(app.controller.drag().is_active());

        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.controller.drag().over, Some(TaskId::from("3")));

        press(&mut app, KeyCode::Enter);
        assert!(!app.controller.drag().is_active());
        assert_eq!(titles(&app), vec!["B", "C", "A", "D"]);
        assert_eq!(app.selected_index, 2);
    }

    #[test]
    fn test_drag_cancel() {
        let mut app = seeded_app();
        press(&mut app, KeyCode::Char('m'));
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Esc);

        assert!(!app.controller.drag().is_active());
        assert!(!app.should_quit);
        assert_eq!(titles(&app), vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn test_priority_filter_from_menu() {
        let mut app = seeded_app();
        press(&mut app, KeyCode::Char('f'));
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Esc);

        assert!(app.controller.filter_settings().priority);
        assert_eq!(app.controller.filter_values().priority, "Priority 1");
        assert_eq!(app.visible_ids(), vec![TaskId::from("1")]);

        press(&mut app, KeyCode::Char('c'));
        assert_eq!(app.visible_ids().len(), 4);
    }

    #[test]
    fn test_date_filter_from_menu() {
        let mut app = seeded_app();
        press(&mut app, KeyCode::Char('f'));
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "2024-01-01");
        press(&mut app, KeyCode::Enter);

        assert!(app.controller.filter_settings().date);
        assert_eq!(app.controller.filter_values().date, "1/1/2024");
        assert!(app.visible_ids().is_empty());
    }

    #[test]
    fn test_sort_menu_toggles_completion() {
        let mut app = seeded_app();
        press(&mut app, KeyCode::Char('x'));
        press(&mut app, KeyCode::Char('s'));
        press(&mut app, KeyCode::Char(' '));

        assert!(app.controller.sort_settings().completion_status);
        press(&mut app, KeyCode::Esc);
        assert_eq!(
            app.visible_ids(),
            vec!["2", "3", "4", "1"]
                .into_iter()
                .map(TaskId::from)
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_failed_save_shows_status() {
        let tasks = json!([{"id": "1", "title": "A", "creationDate": "1/1/2024"}]);
        let store = FailingStore(MemoryStore::new().with_slice(Slice::Tasks, tasks));
        let mut app = App::new(TaskController::load(store));

        app.handle_key(KeyCode::Char('x'), KeyModifiers::NONE);

        let status = app.status_message.clone().unwrap_or_default();
        assert!(status.starts_with("Failed to save"));
        assert!(app.controller.tasks().tasks[0].completed);
    }

    #[test]
    fn test_quit_keys() {
        let mut app = empty_app();
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);

        let mut app = empty_app();
        press(&mut app, KeyCode::Char('a'));
        ctrl(&mut app, 'c');
        assert!(app.should_quit);
    }
}

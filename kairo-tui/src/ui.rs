//! TUI rendering module

use chrono::Local;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};

use kairo_core::date::format_date_human;
use kairo_core::{Catalog, Selector, Store, Task};

use crate::app::{
    AddField, App, CONTEXT_ACTIONS, DialogMode, EditField, FILTER_ROWS, PickerState, SORT_ROWS,
};

/// Terminal color for a style token such as "text-orange-500"
fn token_color(token: &str) -> Color {
    let name = token
        .strip_prefix("text-")
        .and_then(|rest| rest.split('-').next())
        .unwrap_or("");
    match name {
        "red" | "rose" => Color::Red,
        "orange" | "amber" => Color::LightRed,
        "yellow" => Color::Yellow,
        "green" | "emerald" | "lime" => Color::Green,
        "teal" | "cyan" => Color::Cyan,
        "blue" | "indigo" | "sky" => Color::Blue,
        "purple" | "violet" | "pink" | "fuchsia" => Color::Magenta,
        _ => Color::Gray,
    }
}

pub fn draw<S: Store>(f: &mut Frame, app: &App<S>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Min(10),   // Task list
            Constraint::Length(3), // Status bar
            Constraint::Length(3), // Controls
        ])
        .split(f.area());

    draw_task_list(f, app, chunks[0]);
    draw_status_bar(f, app, chunks[1]);
    draw_controls(f, app, chunks[2]);

    // Draw dialogs on top
    match &app.dialog {
        DialogMode::None => {}
        DialogMode::AddTask { field, due } => draw_add_dialog(f, app, *field, due),
        DialogMode::EditTask { field, due } => draw_edit_dialog(f, app, *field, due),
        DialogMode::ContextMenu { selected } => {
            let title = app
                .controller
                .context_menu()
                .and_then(|id| app.controller.tasks().get(id))
                .map(|t| t.title.as_str())
                .unwrap_or("");
            draw_menu(f, title, &CONTEXT_ACTIONS, *selected, |_| None);
        }
        DialogMode::Details { id } => {
            if let Some(task) = app.controller.tasks().get(id) {
                draw_details_dialog(f, app, task);
            }
        }
        DialogMode::DeleteConfirm { id } => {
            if let Some(task) = app.controller.tasks().get(id) {
                draw_confirm_dialog(f, "Delete task?", &task.title);
            }
        }
        DialogMode::FilterMenu {
            selected,
            date_input,
        } => {
            let filters = app.controller.filter_settings();
            let values = app.controller.filter_values();
            draw_menu(f, "Filters", &FILTER_ROWS, *selected, |row| {
                let (on, value) = match row {
                    0 => (filters.date, values.date.as_str()),
                    1 => (filters.priority, values.priority.as_str()),
                    _ => (filters.label, values.label.as_str()),
                };
                Some(format!("{} {}", if on { "[x]" } else { "[ ]" }, value))
            });
            if let Some(input) = date_input {
                draw_input_dialog(f, "Due date filter", input);
            }
        }
        DialogMode::SortMenu { selected } => {
            let sort = app.controller.sort_settings();
            draw_menu(f, "Sort", &SORT_ROWS, *selected, |row| {
                let on = if row == 0 {
                    sort.completion_status
                } else {
                    sort.creation_date
                };
                Some(if on { "[x]" } else { "[ ]" }.to_string())
            });
        }
        DialogMode::Help => draw_help_dialog(f),
    }

    if let Some(picker) = &app.picker {
        draw_picker(f, picker, app.catalog_for(picker.target));
    }

    if let Some(msg) = &app.status_message {
        draw_error_message(f, msg);
    }
}

fn draw_task_list<S: Store>(f: &mut Frame, app: &App<S>, area: Rect) {
    let tasks = app.controller.visible_tasks();
    let drag = app.controller.drag();

    let items: Vec<ListItem> = tasks
        .iter()
        .enumerate()
        .map(|(i, task)| {
            let is_selected = i == app.selected_index;
            let marker = if drag.dragged.as_ref() == Some(&task.id) {
                "≡ "
            } else if drag.over.as_ref() == Some(&task.id) {
                "→ "
            } else {
                "  "
            };
            create_task_item(app, task, marker, is_selected)
        })
        .collect();

    let title = format!(
        " Kairo ({}/{} shown) ",
        tasks.len(),
        app.controller.tasks().len()
    );

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .title_alignment(Alignment::Left)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    f.render_widget(list, area);
}

fn create_task_item<'a, S: Store>(
    app: &App<S>,
    task: &Task,
    marker: &'a str,
    is_selected: bool,
) -> ListItem<'a> {
    let checkbox = if task.completed { "[✓]" } else { "[ ]" };
    let priority_style = app.controller.priorities().priority_style(&task.priority);

    let mut spans = vec![
        Span::raw(marker),
        Span::styled(
            format!("{} ", checkbox),
            if task.completed {
                Style::default().fg(Color::Green)
            } else {
                Style::default()
            },
        ),
        Span::styled(
            format!("[{}] ", task.priority),
            Style::default().fg(token_color(&priority_style.text)),
        ),
    ];

    let title_style = if task.completed {
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::CROSSED_OUT)
    } else if is_selected {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    spans.push(Span::styled(task.title.clone(), title_style));

    for label in &task.labels {
        let color = app.controller.labels().resolve_color(label);
        spans.push(Span::styled(
            format!(" {}", label),
            Style::default().fg(token_color(color)),
        ));
    }

    if let Some(date) = task.due_on() {
        let diff = date
            .signed_duration_since(Local::now().date_naive())
            .num_days();
        let date_style = if task.completed {
            Style::default().fg(Color::Green)
        } else if diff < 0 {
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
        } else if diff <= 1 {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(
            format!(" ({})", format_date_human(date, true)),
            date_style,
        ));
    }

    if let Some(repeat) = task.repeat_display() {
        spans.push(Span::styled(
            format!(" ↻ {}", repeat),
            Style::default().fg(Color::DarkGray),
        ));
    }

    let style = if is_selected {
        Style::default().bg(Color::DarkGray)
    } else {
        Style::default()
    };

    ListItem::new(Line::from(spans)).style(style)
}

fn draw_status_bar<S: Store>(f: &mut Frame, app: &App<S>, area: Rect) {
    let stats = app.controller.stats();
    let query = app.controller.query();

    let mut active = Vec::new();
    if query.filters.date && !query.values.date.is_empty() {
        active.push(format!("due {}", query.values.date));
    }
    if query.filters.priority && !query.values.priority.is_empty() {
        active.push(query.values.priority.clone());
    }
    if query.filters.label && !query.values.label.is_empty() {
        active.push(query.values.label.clone());
    }

    let mut status = vec![
        Span::raw(" "),
        Span::raw(format!("{} total", stats.total)),
        Span::raw(" | "),
        Span::styled(
            format!("{} done", stats.completed),
            Style::default().fg(Color::Green),
        ),
        Span::raw(" | "),
        Span::raw(format!("{} pending", stats.pending)),
    ];
    if !active.is_empty() {
        status.push(Span::raw(" | "));
        status.push(Span::styled(
            format!("Filter: {}", active.join(", ")),
            Style::default().fg(Color::Yellow),
        ));
    }

    let paragraph = Paragraph::new(Line::from(status))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .alignment(Alignment::Center);

    f.render_widget(paragraph, area);
}

fn key_hints(hints: &[(&'static str, &'static str)]) -> Vec<Span<'static>> {
    hints
        .iter()
        .flat_map(|(key, action)| {
            [
                Span::styled(*key, Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(format!(":{} ", action)),
            ]
        })
        .collect()
}

fn draw_controls<S: Store>(f: &mut Frame, app: &App<S>, area: Rect) {
    let controls = if app.controller.drag().is_active() {
        let mut spans = vec![Span::styled(
            " Moving task",
            Style::default().fg(Color::Yellow),
        )];
        spans.push(Span::raw(" | "));
        spans.extend(key_hints(&[
            ("↑↓", "Target"),
            ("Enter", "Drop"),
            ("Esc", "Cancel"),
        ]));
        spans
    } else {
        key_hints(&[
            ("↑↓", "Nav"),
            ("Space", "Toggle"),
            ("a", "Add"),
            ("e", "Edit"),
            ("Enter", "Menu"),
            ("d", "Del"),
            ("m", "Move"),
            ("f", "Filter"),
            ("s", "Sort"),
            ("?", "Help"),
            ("q", "Quit"),
        ])
    };

    let paragraph = Paragraph::new(Line::from(controls))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Controls ")
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .alignment(Alignment::Center);

    f.render_widget(paragraph, area);
}

fn field_line(label: &str, value: &str, focused: bool) -> Line<'static> {
    let cursor = if focused { "_" } else { "" };
    let style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    Line::from(Span::styled(
        format!("{}: {}{}", label, value, cursor),
        style,
    ))
}

fn draw_add_dialog<S: Store>(f: &mut Frame, app: &App<S>, field: AddField, due: &str) {
    let area = centered_rect(60, 60, f.area());

    f.render_widget(Clear, area);

    let block = Block::default()
        .title(" Add New Task ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Min(8), Constraint::Length(2)])
        .split(inner);

    let draft = app.controller.draft();
    let reminder = draft.reminder.as_deref().unwrap_or("");
    let mut lines: Vec<Line> = AddField::ALL
        .iter()
        .map(|add_field| {
            let value = match add_field {
                AddField::Title => draft.title.as_str(),
                AddField::Description => draft.description.as_str(),
                AddField::Due => due,
                AddField::Time => draft.time.as_str(),
                AddField::Reminder => reminder,
                AddField::Repeat => draft.repeat.as_str(),
            };
            field_line(add_field.as_str(), value, *add_field == field)
        })
        .collect();

    lines.push(Line::from(""));
    lines.push(Line::from(format!("Priority: {}", draft.priority)));
    lines.push(Line::from(format!(
        "{}: {}",
        Selector::labels().caption(&draft.labels),
        draft.labels.join(" ")
    )));

    f.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: false }),
        chunks[0],
    );

    let hint = Paragraph::new("Tab next field, Ctrl-l labels, Ctrl-p priority, Enter save, Esc cancel")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    f.render_widget(hint, chunks[1]);
}

fn draw_edit_dialog<S: Store>(f: &mut Frame, app: &App<S>, field: EditField, due: &str) {
    let Some(buffer) = app.controller.edit() else {
        return;
    };
    let area = centered_rect(50, 40, f.area());

    f.render_widget(Clear, area);

    let block = Block::default()
        .title(" Edit Task ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Min(5), Constraint::Length(2)])
        .split(inner);

    let lines = vec![
        field_line(
            EditField::Title.as_str(),
            &buffer.title,
            field == EditField::Title,
        ),
        field_line(
            EditField::Description.as_str(),
            &buffer.description,
            field == EditField::Description,
        ),
        field_line(EditField::Due.as_str(), due, field == EditField::Due),
        Line::from(""),
        Line::from(format!("Priority: {}", buffer.priority)),
    ];

    f.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: false }),
        chunks[0],
    );

    let hint = Paragraph::new("Tab next field, Ctrl-p priority, Enter save, Esc cancel")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);

    f.render_widget(hint, chunks[1]);
}

fn draw_details_dialog<S: Store>(f: &mut Frame, app: &App<S>, task: &Task) {
    let area = centered_rect(60, 60, f.area());

    f.render_widget(Clear, area);

    let priority_color = token_color(&app.controller.priorities().priority_style(&task.priority).text);
    let mut lines = vec![
        Line::from(Span::styled(
            task.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            Span::raw("Priority: "),
            Span::styled(task.priority.clone(), Style::default().fg(priority_color)),
        ]),
        Line::from(format!(
            "Status: {}",
            if task.completed { "Complete" } else { "Incomplete" }
        )),
        Line::from(format!("Created: {}", task.creation_date)),
    ];

    if let Some(due) = &task.due_date {
        let time = task.time.as_deref().map(|t| format!(" {}", t)).unwrap_or_default();
        lines.push(Line::from(format!("Due: {}{}", due, time)));
    }
    if let Some(reminder) = &task.reminder {
        lines.push(Line::from(format!("Reminder: {}", reminder)));
    }
    if let Some(repeat) = task.repeat_display() {
        lines.push(Line::from(format!("Repeat: {}", repeat)));
    }
    if !task.labels.is_empty() {
        let mut spans = vec![Span::raw("Labels:")];
        for label in &task.labels {
            let color = token_color(app.controller.labels().resolve_color(label));
            spans.push(Span::styled(format!(" {}", label), Style::default().fg(color)));
        }
        lines.push(Line::from(spans));
    }
    if !task.description.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(task.description.clone()));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "e to edit, any other key to close",
        Style::default().fg(Color::DarkGray),
    )));

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .title(" Task ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, area);
}

/// A small list dialog; `detail` adds text after each row
fn draw_menu(
    f: &mut Frame,
    title: &str,
    rows: &[&str],
    selected: usize,
    detail: impl Fn(usize) -> Option<String>,
) {
    let area = centered_rect(40, 30, f.area());

    f.render_widget(Clear, area);

    let block = Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let inner = block.inner(area);
    f.render_widget(block, area);

    let items: Vec<ListItem> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let style = if i == selected {
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let text = match detail(i) {
                Some(extra) => format!("{:<18} {}", row, extra),
                None => row.to_string(),
            };
            ListItem::new(text).style(style)
        })
        .collect();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Min(3), Constraint::Length(2)])
        .split(inner);

    f.render_widget(List::new(items), chunks[0]);

    let hint = Paragraph::new("↑/↓ to select, Enter/Space to choose, Esc to close")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    f.render_widget(hint, chunks[1]);
}

fn draw_input_dialog(f: &mut Frame, title: &str, input: &str) {
    let area = centered_rect(40, 20, f.area());

    f.render_widget(Clear, area);

    let block = Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta));

    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Length(2), Constraint::Length(2)])
        .split(inner);

    f.render_widget(Paragraph::new(format!("Date: {}_", input)), chunks[0]);

    let hint = Paragraph::new("Enter to apply (empty clears), Esc to cancel")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);

    f.render_widget(hint, chunks[1]);
}

/// "Label" -> "labels", "Priority" -> "priorities"
fn plural(noun: &str) -> String {
    let lower = noun.to_lowercase();
    match lower.strip_suffix('y') {
        Some(stem) => format!("{}ies", stem),
        None => format!("{}s", lower),
    }
}

fn draw_picker(f: &mut Frame, picker: &PickerState, catalog: &Catalog) {
    let area = centered_rect(45, 60, f.area());

    f.render_widget(Clear, area);

    let selector = &picker.selector;
    let block = Block::default()
        .title(format!(" {} ", selector.caption(&picker.selection)))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta));

    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(2),
        ])
        .split(inner);

    let search = if selector.query().is_empty() {
        Paragraph::new(format!("Search {}...", plural(selector.noun())))
            .style(Style::default().fg(Color::DarkGray))
    } else {
        Paragraph::new(format!("Search: {}_", selector.query()))
    };
    f.render_widget(search, chunks[0]);

    let sections = selector.sections(catalog);
    let mut items: Vec<ListItem> = Vec::new();
    if sections.is_empty() {
        items.push(
            ListItem::new(format!("No {} found", plural(selector.noun())))
                .style(Style::default().fg(Color::DarkGray)),
        );
    }

    let mut index = 0;
    for (heading, entries) in [("Custom", &sections.custom), ("Preset", &sections.preset)] {
        if entries.is_empty() {
            continue;
        }
        items.push(
            ListItem::new(heading)
                .style(Style::default().fg(Color::DarkGray).add_modifier(Modifier::BOLD)),
        );
        for entry in entries.iter() {
            let checked = if Selector::is_selected(&picker.selection, &entry.name) {
                "✓ "
            } else {
                "  "
            };
            let mut style = Style::default().fg(token_color(&entry.color));
            if index == selector.cursor() {
                style = style.bg(Color::DarkGray).add_modifier(Modifier::BOLD);
            }
            items.push(ListItem::new(format!("{}{}", checked, entry.name)).style(style));
            index += 1;
        }
    }

    f.render_widget(List::new(items), chunks[1]);

    let hint = Paragraph::new("Type to search, Enter to toggle, Del to clear, Esc to close")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    f.render_widget(hint, chunks[2]);
}

fn draw_confirm_dialog(f: &mut Frame, title: &str, message: &str) {
    let area = centered_rect(40, 25, f.area());

    f.render_widget(Clear, area);

    let block = Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));

    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Length(2), Constraint::Length(2)])
        .split(inner);

    let msg = Paragraph::new(message)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    f.render_widget(msg, chunks[0]);

    let hint = Paragraph::new("Y to confirm, N/Esc to cancel")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);

    f.render_widget(hint, chunks[1]);
}

fn draw_help_dialog(f: &mut Frame) {
    let area = centered_rect(65, 80, f.area());

    f.render_widget(Clear, area);

    let heading = |text: &'static str| {
        Line::from(Span::styled(
            text,
            Style::default().add_modifier(Modifier::BOLD),
        ))
    };

    let help_text = vec![
        heading("Navigation"),
        Line::from("  ↑/↓ or j/k  Move selection"),
        Line::from("  g/G         Go to top/bottom"),
        Line::from(""),
        heading("Task Actions"),
        Line::from("  Space/x     Toggle completion"),
        Line::from("  a           Add new task"),
        Line::from("  e           Edit selected task"),
        Line::from("  Enter       Open task menu"),
        Line::from("  d/Delete    Delete selected task"),
        Line::from("  m           Pick up task, then Enter to drop it"),
        Line::from(""),
        heading("Forms"),
        Line::from("  Tab         Next field"),
        Line::from("  Ctrl-l      Choose labels"),
        Line::from("  Ctrl-p      Choose priority"),
        Line::from(""),
        heading("View Controls"),
        Line::from("  f           Filters (Space toggles, c clears)"),
        Line::from("  s           Sort order"),
        Line::from(""),
        heading("General"),
        Line::from("  ?           Toggle this help"),
        Line::from("  q/Esc       Quit"),
        Line::from(""),
        Line::from(Span::styled(
            "Press Esc to close",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let paragraph = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(" Help ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, area);
}

fn draw_error_message(f: &mut Frame, message: &str) {
    let full = f.area();
    if full.height < 2 || full.width < 4 {
        return;
    }
    let area = Rect {
        x: 2,
        y: full.height - 2,
        width: full.width - 4,
        height: 1,
    };

    let msg = Paragraph::new(message)
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center);

    f.render_widget(msg, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use kairo_core::{MemoryStore, TaskController};
    use ratatui::{Terminal, backend::TestBackend};

    fn render(app: &App<MemoryStore>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect::<String>()
    }

    #[test]
    fn test_token_color() {
        assert_eq!(token_color("text-red-500"), Color::Red);
        assert_eq!(token_color("text-sky-300"), Color::Blue);
        assert_eq!(token_color("bg-red-500/20"), Color::Gray);
    }

    #[test]
    fn test_plural() {
        assert_eq!(plural("Label"), "labels");
        assert_eq!(plural("Priority"), "priorities");
    }

    #[test]
    fn test_draw_task_list() {
        let mut controller = TaskController::load(MemoryStore::new());
        controller.draft_mut().title = "Water plants".to_string();
        controller.create().unwrap();
        let app = App::new(controller);

        let screen = render(&app);
        assert!(screen.contains("Water plants"));
        assert!(screen.contains("1 total"));
    }

    #[test]
    fn test_draw_empty_picker() {
        let mut app = App::new(TaskController::load(MemoryStore::new()));
        app.open_picker(crate::app::PickerTarget::DraftLabels);
        if let Some(picker) = app.picker.as_mut() {
            picker.selector.set_query("zzz");
        }

        let screen = render(&app);
        assert!(screen.contains("No labels found"));
    }
}

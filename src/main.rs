use std::io::{self, Write};

use chrono::NaiveTime;
use clap::Parser;

use kairo_core::catalog::label_name;
use kairo_core::date::{format_locale_date, parse_date};
use kairo_core::store::save_slice;
use kairo_core::{
    Catalog, EntrySource, FilterSettings, FilterValues, Selector, Slice, Store, TaskController,
    TaskId,
};

use crate::cli::{CatalogAction, Cli, Commands, FilterAction};
use crate::display::{
    DisplayMode, Palette, color_token, format_catalog_entry, format_summary, format_task,
    supports_color,
};
use crate::error::{CliError, Result};
use crate::logging::{LogTarget, init_logging};
use crate::storage::JsonStore;

mod cli;
mod config;
mod display;
mod error;
mod logging;
mod storage;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let cfg: config::Config = confy::load("kairo", None)?;
    let data_dir = cfg.data_path();

    let _logger = match cli.command {
        Commands::Tui => init_logging(LogTarget::File(&data_dir))?,
        _ => init_logging(LogTarget::Stderr)?,
    };

    let store = JsonStore::new(&data_dir);
    let mut controller = TaskController::load(store).with_strategy(cfg.sort_strategy);
    let color_allowed = cfg.color && supports_color();

    match cli.command {
        Commands::Add {
            title,
            description,
            due,
            time,
            priority,
            reminder,
            label,
            repeat,
        } => {
            let due_date = due.as_deref().map(parse_date).transpose()?;
            let time = time.map(|t| parse_time(&t)).transpose()?;
            let priority = priority
                .map(|p| resolve_priority(controller.priorities(), &p))
                .transpose()?;

            let draft = controller.draft_mut();
            draft.title = title.join(" ");
            draft.description = description.unwrap_or_default();
            draft.due_date = due_date;
            draft.time = time.unwrap_or_default();
            if let Some(priority) = priority {
                draft.priority = priority;
            }
            draft.reminder = reminder;
            draft.labels = label.iter().map(|l| label_name(l)).collect();
            draft.repeat = repeat.unwrap_or_default();

            let id = controller
                .create()?
                .ok_or_else(|| CliError::validation("title", "Title cannot be empty"))?;
            let task = controller
                .tasks()
                .get(&id)
                .ok_or_else(|| CliError::TaskNotFound(id.to_string()))?;

            match &task.due_date {
                Some(due) => println!("Task added: {} (due: {})", task.title, due),
                None => println!("Task added: {}", task.title),
            }
        }

        Commands::List {
            compact,
            detailed,
            no_color,
        } => {
            let tasks = controller.visible_tasks();

            if tasks.is_empty() {
                println!("No tasks found.");
            } else {
                let mode = if compact {
                    DisplayMode::Compact
                } else if detailed {
                    DisplayMode::Detailed
                } else {
                    DisplayMode::Default
                };

                let use_color = !no_color && color_allowed;
                let palette = Palette {
                    labels: controller.labels(),
                    priorities: controller.priorities(),
                };

                for (index, task) in tasks.iter().enumerate() {
                    println!("{}", format_task(task, index + 1, &palette, mode, use_color));
                }

                println!();
                println!(
                    "{}",
                    format_summary(controller.stats(), tasks.len(), use_color)
                );
            }
        }

        Commands::Check { task } => {
            let id = resolve_task(&controller, &task)?;
            let completed = controller
                .toggle_complete(&id)?
                .ok_or_else(|| CliError::TaskNotFound(task.clone()))?;
            let status = if completed { "done" } else { "open" };
            if let Some(task) = controller.tasks().get(&id) {
                println!("Marked task {} as {}: {}", id, status, task.title);
            }
        }

        Commands::Remove { task } => {
            let id = resolve_task(&controller, &task)?;
            let removed = controller
                .delete(&id)?
                .ok_or(CliError::TaskNotFound(task))?;
            println!("Removed: {}", removed.title);
        }

        Commands::Edit {
            task,
            title,
            description,
            priority,
            due,
        } => {
            if title.is_none() && description.is_none() && priority.is_none() && due.is_none() {
                return Err(CliError::validation(
                    "edit",
                    "At least one of --title, --description, --priority or --due must be provided",
                ));
            }

            let id = resolve_task(&controller, &task)?;
            let due_date = due.as_deref().map(parse_date).transpose()?;
            let priority = priority
                .map(|p| resolve_priority(controller.priorities(), &p))
                .transpose()?;

            if !controller.begin_edit(&id) {
                return Err(CliError::TaskNotFound(task));
            }
            if let Some(buffer) = controller.edit_mut() {
                if let Some(title) = title {
                    buffer.title = title;
                }
                if let Some(description) = description {
                    buffer.description = description;
                }
                if let Some(priority) = priority {
                    buffer.priority = priority;
                }
                if due_date.is_some() {
                    buffer.due_date = due_date;
                }
            }

            if !controller.commit_edit()? {
                controller.cancel_edit();
                return Err(CliError::validation("title", "Title cannot be empty"));
            }

            if let Some(task) = controller.tasks().get(&id) {
                println!("Updated task {}: {}", id, task.title);
                if let Some(due) = &task.due_date {
                    println!("  Due: {}", due);
                }
            }
        }

        Commands::Move { task, before } => {
            let dragged = resolve_task(&controller, &task)?;
            let target = resolve_task(&controller, &before)?;

            if controller.reorder(&dragged, &target)? {
                println!("Moved task {} into the place of {}", dragged, target);
            } else {
                println!("Nothing to move.");
            }
        }

        Commands::Filter { action } => {
            let mut filters = controller.filter_settings().clone();
            let mut values = controller.filter_values().clone();

            match action {
                FilterAction::Date { value } => {
                    let date = value.as_deref().map(parse_date).transpose()?;
                    filters.date = date.is_some();
                    values.date = date.map(format_locale_date).unwrap_or_default();
                }
                FilterAction::Priority { value } => {
                    let priority = value
                        .map(|p| resolve_priority(controller.priorities(), &p))
                        .transpose()?;
                    filters.priority = priority.is_some();
                    values.priority = priority.unwrap_or_default();
                }
                FilterAction::Label { value } => {
                    let label = value.map(|l| label_name(&l));
                    filters.label = label.is_some();
                    values.label = label.unwrap_or_default();
                }
                FilterAction::Show => {}
            }

            controller.set_filter_settings(filters)?;
            controller.set_filter_values(values)?;
            print_filters(controller.filter_settings(), controller.filter_values());
        }

        Commands::Sort {
            completion,
            creation,
        } => {
            let mut sort = controller.sort_settings().clone();
            if let Some(completion) = completion {
                sort.completion_status = completion;
            }
            if let Some(creation) = creation {
                sort.creation_date = creation;
            }
            controller.set_sort_settings(sort)?;

            let sort = controller.sort_settings();
            println!("Sort by completion: {}", on_off(sort.completion_status));
            println!("Sort by creation date: {}", on_off(sort.creation_date));
        }

        Commands::Labels { search, action } => match action {
            Some(CatalogAction::Add { name, color }) => {
                let name = label_name(&name);
                if controller.add_custom_label(&name, &color_token(&color))? {
                    println!("Added label {}", name);
                } else {
                    println!("Label {} already exists.", name);
                }
            }
            None => {
                let mut selector = Selector::labels();
                print_catalog(&mut selector, controller.labels(), search, color_allowed);
            }
        },

        Commands::Priorities { search, action } => match action {
            Some(CatalogAction::Add { name, color }) => {
                let name = name.trim().to_string();
                if name.is_empty() {
                    return Err(CliError::validation("name", "Priority name cannot be empty"));
                }
                if controller.add_custom_priority(&name, &color_token(&color))? {
                    println!("Added priority {}", name);
                } else {
                    println!("Priority {} already exists.", name);
                }
            }
            None => {
                let mut selector = Selector::priorities();
                print_catalog(&mut selector, controller.priorities(), search, color_allowed);
            }
        },

        Commands::Stats => {
            let stats = controller.stats();
            println!("Total:     {}", stats.total);
            println!("Completed: {}", stats.completed);
            println!("Pending:   {}", stats.pending);
        }

        Commands::Recover { force } => {
            let store = JsonStore::new(&data_dir);
            if !store.backup_exists(Slice::Tasks) {
                return Err(CliError::storage("No backup file found"));
            }

            if !force && !confirm("Restore tasks from backup? Current tasks will be replaced.")? {
                println!("Cancelled.");
                return Ok(());
            }

            let recovered = store.recover_tasks()?;
            let mut store = store;
            save_slice(&mut store, Slice::Tasks, &recovered)?;
            println!("Recovered {} tasks from backup.", recovered.len());
        }

        Commands::Tui => {
            kairo_tui::run(controller)?;
        }
    }

    Ok(())
}

/// Find a task by exact ID, then by 1-based position in the current list
fn resolve_task<S: Store>(controller: &TaskController<S>, input: &str) -> Result<TaskId> {
    let id = TaskId::from(input.trim());
    if controller.tasks().contains(&id) {
        return Ok(id);
    }

    input
        .trim()
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|index| controller.visible_tasks().get(index).map(|t| t.id.clone()))
        .ok_or_else(|| CliError::TaskNotFound(input.to_string()))
}

/// Accept "Priority 2", "priority 2" or "2"; the name must be in the catalog
fn resolve_priority(catalog: &Catalog, input: &str) -> Result<String> {
    let trimmed = input.trim();
    let name = if trimmed.chars().all(|c| c.is_ascii_digit()) && !trimmed.is_empty() {
        format!("Priority {}", trimmed)
    } else {
        catalog
            .entries()
            .map(|(_, e)| e.name.clone())
            .find(|name| name.eq_ignore_ascii_case(trimmed))
            .unwrap_or_else(|| trimmed.to_string())
    };

    if catalog.contains(&name) {
        Ok(name)
    } else {
        Err(CliError::validation(
            "priority",
            format!("Unknown priority '{}'", input),
        ))
    }
}

fn parse_time(input: &str) -> Result<String> {
    let time = NaiveTime::parse_from_str(input.trim(), "%H:%M")
        .map_err(|e| CliError::parse_with_source(format!("Invalid time '{}'", input), e))?;
    Ok(time.format("%H:%M").to_string())
}

fn on_off(value: bool) -> &'static str {
    if value { "on" } else { "off" }
}

fn print_filters(filters: &FilterSettings, values: &FilterValues) {
    let describe = |enabled: bool, value: &str| {
        if enabled && !value.is_empty() {
            value.to_string()
        } else {
            "off".to_string()
        }
    };
    println!("Date:     {}", describe(filters.date, &values.date));
    println!("Priority: {}", describe(filters.priority, &values.priority));
    println!("Label:    {}", describe(filters.label, &values.label));
}

fn print_catalog(
    selector: &mut Selector,
    catalog: &Catalog,
    search: Option<String>,
    use_color: bool,
) {
    if let Some(term) = search {
        selector.set_query(term);
    }

    let sections = selector.sections(catalog);
    if sections.is_empty() {
        println!("No entries found.");
        return;
    }

    if !sections.custom.is_empty() {
        println!("Custom");
        for entry in &sections.custom {
            println!("{}", format_catalog_entry(EntrySource::Custom, entry, use_color));
        }
    }
    if !sections.preset.is_empty() {
        println!("Preset");
        for entry in &sections.preset {
            println!("{}", format_catalog_entry(EntrySource::Preset, entry, use_color));
        }
    }
}

/// Ask user for confirmation
fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(input.trim().to_lowercase() == "y")
}

#[cfg(test)]
mod tests {
    use super::*;
    use kairo_core::MemoryStore;

    #[test]
    fn test_resolve_priority_forms() {
        let catalog = Catalog::priorities(Vec::new());
        assert_eq!(resolve_priority(&catalog, "2").unwrap(), "Priority 2");
        assert_eq!(resolve_priority(&catalog, "priority 4").unwrap(), "Priority 4");
        assert!(resolve_priority(&catalog, "9").is_err());
        assert!(resolve_priority(&catalog, "").is_err());
    }

    #[test]
    fn test_parse_time() {
        assert_eq!(parse_time("9:05").unwrap(), "09:05");
        assert!(parse_time("25:00").is_err());
    }

    #[test]
    fn test_resolve_task_by_id_then_position() {
        let mut controller = TaskController::load(MemoryStore::new());
        controller.draft_mut().title = "first".to_string();
        let first = controller.create().unwrap().unwrap();
        controller.draft_mut().title = "second".to_string();
        let second = controller.create().unwrap().unwrap();

        assert_eq!(resolve_task(&controller, first.as_str()).unwrap(), first);

        let top = controller.visible_tasks()[0].id.clone();
        assert_eq!(resolve_task(&controller, "1").unwrap(), top);
        assert!([first, second].contains(&resolve_task(&controller, "2").unwrap()));

        assert!(matches!(
            resolve_task(&controller, "3"),
            Err(CliError::TaskNotFound(_))
        ));
        assert!(resolve_task(&controller, "0").is_err());
    }
}

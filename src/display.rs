//! Task display formatting module
//!
//! Handles colored output and different view modes for tasks

use chrono::Local;
use colored::*;

use kairo_core::date::format_date_human;
use kairo_core::{Catalog, CatalogEntry, EntrySource, Task, TaskStats};

/// Display mode for task list
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DisplayMode {
    /// Minimal one-line format
    Compact,
    /// Every field on its own line
    Detailed,
    /// Balanced view with clear status indicators (default)
    Default,
}

/// Check if terminal supports colors
pub fn supports_color() -> bool {
    atty::is(atty::Stream::Stdout)
}

/// Terminal color for a style token such as "text-orange-500"
pub fn token_color(token: &str) -> Option<Color> {
    let name = token.strip_prefix("text-")?.split('-').next()?;
    let color = match name {
        "red" => Color::Red,
        "orange" => Color::TrueColor {
            r: 249,
            g: 115,
            b: 22,
        },
        "amber" => Color::TrueColor {
            r: 245,
            g: 158,
            b: 11,
        },
        "yellow" => Color::Yellow,
        "green" | "emerald" | "lime" => Color::Green,
        "teal" | "cyan" => Color::Cyan,
        "blue" | "indigo" | "sky" => Color::Blue,
        "purple" | "violet" | "pink" | "rose" | "fuchsia" => Color::Magenta,
        "gray" | "slate" | "zinc" | "neutral" | "stone" => Color::BrightBlack,
        _ => return None,
    };
    Some(color)
}

/// Normalize a color argument into a style token ("lime" -> "text-lime-500")
pub fn color_token(input: &str) -> String {
    let trimmed = input.trim().to_lowercase();
    if trimmed.starts_with("text-") {
        trimmed
    } else {
        format!("text-{}-500", trimmed)
    }
}

fn paint(text: &str, token: &str, use_color: bool) -> String {
    match token_color(token) {
        Some(color) if use_color => text.color(color).to_string(),
        _ => text.to_string(),
    }
}

/// Catalogs needed to color labels and priorities
pub struct Palette<'a> {
    pub labels: &'a Catalog,
    pub priorities: &'a Catalog,
}

impl Palette<'_> {
    fn label(&self, name: &str, use_color: bool) -> String {
        paint(name, self.labels.resolve_color(name), use_color)
    }

    fn priority(&self, name: &str, use_color: bool) -> String {
        paint(name, &self.priorities.priority_style(name).text, use_color)
    }
}

/// Format a task for display; `position` is its 1-based place in the list
pub fn format_task(
    task: &Task,
    position: usize,
    palette: &Palette<'_>,
    mode: DisplayMode,
    use_color: bool,
) -> String {
    let today = Local::now().date_naive();

    let checkbox = if task.completed { "[✓]" } else { "[ ]" };

    let due_info = match (task.due_on(), task.due_date.as_deref()) {
        (Some(date), _) => {
            let diff_days = date.signed_duration_since(today).num_days();
            let mut date_str = format_date_human(date, mode != DisplayMode::Compact);
            if let Some(time) = &task.time {
                date_str = format!("{} {}", date_str, time);
            }
            let text = format!("(due {})", date_str);

            if !use_color {
                text
            } else if task.completed {
                text.green().to_string()
            } else if diff_days < 0 {
                text.red().bold().to_string()
            } else if diff_days <= 1 {
                text.yellow().to_string()
            } else {
                text.normal().to_string()
            }
        }
        // Unreadable dates are shown as stored
        (None, Some(raw)) => format!("(due {})", raw),
        (None, None) => String::new(),
    };

    let title = if use_color && task.completed {
        task.title.green().to_string()
    } else {
        task.title.clone()
    };

    let labels_str = if task.labels.is_empty() {
        String::new()
    } else {
        format!(
            " {}",
            task.labels
                .iter()
                .map(|l| palette.label(l, use_color))
                .collect::<Vec<_>>()
                .join(" ")
        )
    };

    match mode {
        DisplayMode::Compact => {
            format!("{} {} {}{}", checkbox, position, title, labels_str)
        }
        DisplayMode::Detailed => {
            let mut parts = vec![
                format!("{} {} [ID: {}]", checkbox, position, task.id),
                format!("Title: {}", title),
            ];

            if !task.description.is_empty() {
                parts.push(format!("Description: {}", task.description));
            }

            parts.push(format!(
                "Priority: {}",
                palette.priority(&task.priority, use_color)
            ));

            if !task.labels.is_empty() {
                parts.push(format!("Labels:{}", labels_str));
            }

            match &task.due_date {
                Some(raw) => parts.push(format!("Due: {} {}", raw, due_info)),
                None => parts.push("Due: (none)".to_string()),
            }

            if let Some(reminder) = &task.reminder {
                parts.push(format!("Reminder: {}", reminder));
            }

            if let Some(repeat) = task.repeat_display() {
                parts.push(format!("Repeat: {}", repeat));
            }

            parts.push(format!("Created: {}", task.creation_date));
            parts.push(format!(
                "Status: {}",
                if task.completed {
                    "Complete"
                } else {
                    "Incomplete"
                }
            ));
            parts.join("\n  ")
        }
        DisplayMode::Default => {
            let position_str = if use_color {
                format!("{:>2}", position).cyan().to_string()
            } else {
                format!("{:>2}", position)
            };
            let priority = palette.priority(&task.priority, use_color);

            let mut line = format!(
                "{} {} {} [{}]{}",
                checkbox, position_str, title, priority, labels_str
            );
            if !due_info.is_empty() {
                line = format!("{} {}", line, due_info);
            }
            if let Some(repeat) = task.repeat_display() {
                line = format!("{} ↻ {}", line, repeat);
            }
            line
        }
    }
}

/// Format a summary line for task list
pub fn format_summary(stats: TaskStats, shown: usize, use_color: bool) -> String {
    let mut parts = vec![
        format!("{} total", stats.total),
        if use_color {
            format!("{} done", stats.completed).green().to_string()
        } else {
            format!("{} done", stats.completed)
        },
        format!("{} pending", stats.pending),
    ];

    if shown != stats.total {
        parts.push(format!("{} shown", shown));
    }

    format!("[{}]", parts.join(" | "))
}

/// Format a catalog listing: custom entries first, then presets
pub fn format_catalog_entry(
    source: EntrySource,
    entry: &CatalogEntry,
    use_color: bool,
) -> String {
    let marker = match source {
        EntrySource::Custom => "*",
        EntrySource::Preset => " ",
    };
    format!(
        "{} {} {}",
        marker,
        paint(&entry.name, &entry.color, use_color),
        entry.color.dimmed()
    )
}

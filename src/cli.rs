use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "kairo")]
#[command(about = concat!(
    ">>==============================<<\n",
    "||  _  __     _               ||\n",
    "|| | |/ /__ _(_)_ __ ___      ||\n",
    "|| | ' // _` | | '__/ _ \\     ||\n",
    "|| | . \\ (_| | | | | (_) |    ||\n",
    "|| |_|\\_\\__,_|_|_|  \\___/     ||\n",
    ">>==============================<<\n",
    "~Tasks, labels, priorities, and the right moment~"
))]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_version = concat!(
    "v",
    env!("CARGO_PKG_VERSION"),
    "\nCodeName: ",
    env!("CODENAME")
))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Adds a task
    Add {
        #[arg(required = true, num_args = 1..)]
        title: Vec<String>,
        /// Longer notes for the task
        #[arg(long, short = 'm', value_name = "TEXT")]
        description: Option<String>,
        /// Due date ("tomorrow", "friday", "in 3 days", "2026-01-25", "1/25/2026")
        #[arg(long, short = 'd', value_name = "DATE")]
        due: Option<String>,
        /// Due time (HH:MM)
        #[arg(long, value_name = "HH:MM")]
        time: Option<String>,
        /// Priority name or number ("Priority 1" or "1")
        #[arg(long, short = 'p', value_name = "PRIORITY")]
        priority: Option<String>,
        /// Reminder note (stored only)
        #[arg(long, value_name = "REMINDER")]
        reminder: Option<String>,
        /// Label for the task (can be specified multiple times)
        #[arg(long, short = 'l', value_name = "LABEL")]
        label: Vec<String>,
        /// Recurrence rule such as "every-week"
        #[arg(long, value_name = "RULE")]
        repeat: Option<String>,
    },

    /// Lists tasks through the saved filters and sort order
    List {
        /// Use compact one-line format
        #[arg(long, short = 'c')]
        compact: bool,
        /// Use detailed format with full info
        #[arg(long)]
        detailed: bool,
        /// Disable colors
        #[arg(long)]
        no_color: bool,
    },

    /// Toggles task completion status
    Check {
        /// Task ID or list position
        task: String,
    },

    /// Removes a task
    Remove {
        /// Task ID or list position
        task: String,
    },

    /// Edit a task's title, description, priority or due date
    Edit {
        /// Task ID or list position
        task: String,
        /// New title
        #[arg(long, value_name = "TITLE")]
        title: Option<String>,
        /// New description
        #[arg(long, short = 'm', value_name = "TEXT")]
        description: Option<String>,
        /// New priority
        #[arg(long, short = 'p', value_name = "PRIORITY")]
        priority: Option<String>,
        /// New due date
        #[arg(long, short = 'd', value_name = "DATE")]
        due: Option<String>,
    },

    /// Move a task into another task's place
    Move {
        /// Task ID or list position to move
        task: String,
        /// Task whose place it takes
        #[arg(long, value_name = "TASK")]
        before: String,
    },

    /// Set, clear or show list filters
    Filter {
        #[command(subcommand)]
        action: FilterAction,
    },

    /// Choose which sort passes run
    Sort {
        /// Incomplete tasks first
        #[arg(long, value_name = "BOOL")]
        completion: Option<bool>,
        /// Newest tasks first
        #[arg(long, value_name = "BOOL")]
        creation: Option<bool>,
    },

    /// List or add labels
    Labels {
        /// Only show labels containing this text
        #[arg(long, short = 's', value_name = "TERM")]
        search: Option<String>,
        #[command(subcommand)]
        action: Option<CatalogAction>,
    },

    /// List or add priorities
    Priorities {
        /// Only show priorities containing this text
        #[arg(long, short = 's', value_name = "TERM")]
        search: Option<String>,
        #[command(subcommand)]
        action: Option<CatalogAction>,
    },

    /// Show task counts
    Stats,

    /// Recover tasks from backup file
    Recover {
        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Open the interactive terminal UI
    Tui,
}

/// Filter subcommands; omitting the value switches the filter off
#[derive(Subcommand)]
pub enum FilterAction {
    /// Filter by due date
    Date { value: Option<String> },
    /// Filter by priority
    Priority { value: Option<String> },
    /// Filter by label
    Label { value: Option<String> },
    /// Show the current filters
    Show,
}

/// Catalog subcommands
#[derive(Subcommand)]
pub enum CatalogAction {
    /// Add a custom entry
    Add {
        name: String,
        /// Color name or style token ("lime", "text-lime-500")
        color: String,
    },
}

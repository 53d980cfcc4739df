use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::ops::view::{FilterMode, SortMode};

#[derive(Parser, Debug)]
#[command(name = "xt", about = concat!("executive tasks v", env!("CARGO_PKG_VERSION"), " - todos that stay put"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Use a different store file
    #[arg(long, global = true, value_name = "FILE")]
    pub store: Option<PathBuf>,

    /// Use a different config file
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// More log output (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Less log output (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub quiet: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add a todo
    Add(AddArgs),
    /// List todos
    #[command(alias = "ls")]
    List(ListArgs),
    /// Mark a todo done, or not done again
    Toggle(IdArgs),
    /// Delete a todo
    Rm(IdArgs),
    /// Change a todo's text, priority or due date
    Edit(EditArgs),
    /// Show active/completed counts
    Stats,
    /// Show today's focus and what's next
    Plan(PlanArgs),
    /// Show, cycle or set the theme
    Theme(ThemeArgs),
    /// Print (or write) a backup of all stored data
    Export(ExportArgs),
    /// Restore stored data from a backup file
    Import(ImportArgs),
    /// Remove all stored data
    Clear(ClearArgs),
    /// Read commands from stdin, one per line
    Shell,
}

/// Priority accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum PriorityArg {
    Low,
    Medium,
    High,
}

impl From<PriorityArg> for crate::model::todo::Priority {
    fn from(p: PriorityArg) -> Self {
        match p {
            PriorityArg::Low => crate::model::todo::Priority::Low,
            PriorityArg::Medium => crate::model::todo::Priority::Medium,
            PriorityArg::High => crate::model::todo::Priority::High,
        }
    }
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Todo text (words are joined with spaces)
    #[arg(required = true, num_args = 1..)]
    pub text: Vec<String>,
    /// Priority (default: medium)
    #[arg(short, long, value_enum, default_value_t = PriorityArg::Medium)]
    pub priority: PriorityArg,
    /// Due date, YYYY-MM-DD
    #[arg(short, long, value_name = "DATE")]
    pub due: Option<String>,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Which todos to show (saved for next time)
    #[arg(short, long, value_enum)]
    pub filter: Option<FilterMode>,
    /// How to order them (saved for next time)
    #[arg(short, long, value_enum)]
    pub sort: Option<SortMode>,
}

#[derive(Args, Debug)]
pub struct IdArgs {
    /// Todo ID
    pub id: String,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Todo ID
    pub id: String,
    /// New text
    #[arg(short, long)]
    pub text: Option<String>,
    /// New priority
    #[arg(short, long, value_enum)]
    pub priority: Option<PriorityArg>,
    /// New due date, YYYY-MM-DD
    #[arg(short, long, value_name = "DATE", conflicts_with = "clear_due")]
    pub due: Option<String>,
    /// Remove the due date
    #[arg(long)]
    pub clear_due: bool,
}

#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Number of tasks in the plan (default: from config)
    #[arg(long)]
    pub size: Option<usize>,
}

#[derive(Args, Debug)]
pub struct ThemeArgs {
    /// Advance light -> dark -> vibe -> light
    #[arg(long, conflicts_with = "set")]
    pub cycle: bool,
    /// Set a specific theme (light, dark, vibe)
    #[arg(long, value_name = "THEME")]
    pub set: Option<String>,
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Write to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Backup file produced by `xt export`
    pub file: PathBuf,
}

#[derive(Args, Debug)]
pub struct ClearArgs {
    /// Confirm removal of all data
    #[arg(long)]
    pub yes: bool,
}

/// Parser for one line of `xt shell` input (no global flags, no binary name)
#[derive(Parser, Debug)]
#[command(name = "xt", no_binary_name = true, disable_version_flag = true)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: Commands,
}

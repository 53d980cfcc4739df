use std::cmp::Ordering;
use std::fmt;

use deunicode::deunicode;
use serde::{Deserialize, Serialize};

use crate::model::todo::Todo;
use crate::ops::overdue::parse_due_date;

/// Which todos a list shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    #[default]
    All,
    Active,
    Completed,
}

/// How a list is ordered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "camelCase")]
pub enum SortMode {
    /// Newest first
    #[default]
    Created,
    /// High, then medium, then low
    Priority,
    /// Earliest due date first, undated last
    DueDate,
    /// By text, ignoring case
    Alphabetical,
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FilterMode::All => "all",
            FilterMode::Active => "active",
            FilterMode::Completed => "completed",
        })
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortMode::Created => "created",
            SortMode::Priority => "priority",
            SortMode::DueDate => "dueDate",
            SortMode::Alphabetical => "alphabetical",
        })
    }
}

/// Persisted list preferences (the `filters` key)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ViewPrefs {
    #[serde(default)]
    pub filter: FilterMode,
    #[serde(default)]
    pub sort: SortMode,
}

/// Counts shown above the list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Stats {
    pub total: usize,
    pub active: usize,
    pub completed: usize,
    /// Completed share, rounded to the nearest whole percent
    pub percentage: u8,
}

pub fn filter(todos: &[Todo], mode: FilterMode) -> Vec<&Todo> {
    todos
        .iter()
        .filter(|t| match mode {
            FilterMode::All => true,
            FilterMode::Active => !t.completed,
            FilterMode::Completed => t.completed,
        })
        .collect()
}

/// Stable in-place sort of a view
pub fn sort(view: &mut [&Todo], mode: SortMode) {
    match mode {
        SortMode::Created => view.sort_by(|a, b| b.id.cmp(&a.id)),
        SortMode::Priority => view.sort_by(|a, b| cmp_priority(a, b)),
        SortMode::DueDate => view.sort_by(|a, b| cmp_due_date(a, b)),
        SortMode::Alphabetical => view.sort_by(|a, b| cmp_text(&a.text, &b.text)),
    }
}

pub fn sorted(todos: &[Todo], mode: SortMode) -> Vec<&Todo> {
    let mut view: Vec<&Todo> = todos.iter().collect();
    sort(&mut view, mode);
    view
}

/// Filter, then sort
pub fn visible(todos: &[Todo], filter_mode: FilterMode, sort_mode: SortMode) -> Vec<&Todo> {
    let mut view = filter(todos, filter_mode);
    sort(&mut view, sort_mode);
    view
}

pub fn stats(todos: &[Todo]) -> Stats {
    let total = todos.len();
    let completed = todos.iter().filter(|t| t.completed).count();
    let percentage = if total == 0 {
        0
    } else {
        (completed as f64 / total as f64 * 100.0).round() as u8
    };
    Stats {
        total,
        active: total - completed,
        completed,
        percentage,
    }
}

/// Higher priority first
pub(crate) fn cmp_priority(a: &Todo, b: &Todo) -> Ordering {
    b.priority.rank().cmp(&a.priority.rank())
}

/// Earlier due date first; todos without a usable date go last
pub(crate) fn cmp_due_date(a: &Todo, b: &Todo) -> Ordering {
    let a_due = a.due_date().and_then(parse_due_date);
    let b_due = b.due_date().and_then(parse_due_date);
    match (a_due, b_due) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Accent- and case-insensitive, so "école" sorts with the e's
fn cmp_text(a: &str, b: &str) -> Ordering {
    fold(a)
        .cmp(&fold(b))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| a.cmp(b))
}

fn fold(s: &str) -> String {
    deunicode(s).to_lowercase()
}

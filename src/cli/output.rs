use chrono::NaiveDateTime;
use serde::Serialize;

use crate::model::todo::{Priority, Todo, TodoId};
use crate::ops::overdue::is_overdue;
use crate::ops::planner::DayPlan;
use crate::ops::view::{Stats, ViewPrefs};
use crate::util::unicode::{display_width, pad_to_width, truncate_to_width};

/// Widest the text column gets before truncation
const TEXT_COLUMN: usize = 48;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TodoJson {
    pub id: TodoId,
    pub text: String,
    pub completed: bool,
    pub priority: Priority,
    #[serde(rename = "dueDate")]
    pub due_date: Option<String>,
    pub overdue: bool,
}

#[derive(Serialize)]
pub struct TodoListJson {
    pub filter: String,
    pub sort: String,
    pub todos: Vec<TodoJson>,
    pub stats: Stats,
}

#[derive(Serialize)]
pub struct PlanJson {
    pub focused: Option<TodoJson>,
    pub upcoming: Vec<TodoJson>,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn todo_to_json(todo: &Todo, now: NaiveDateTime) -> TodoJson {
    TodoJson {
        id: todo.id,
        text: todo.text.clone(),
        completed: todo.completed,
        priority: todo.priority,
        due_date: todo.due_date().map(String::from),
        overdue: is_overdue(todo, now),
    }
}

pub fn list_to_json(view: &[&Todo], prefs: ViewPrefs, stats: Stats, now: NaiveDateTime) -> TodoListJson {
    TodoListJson {
        filter: prefs.filter.to_string(),
        sort: prefs.sort.to_string(),
        todos: view.iter().map(|t| todo_to_json(t, now)).collect(),
        stats,
    }
}

pub fn plan_to_json(plan: &DayPlan<'_>, now: NaiveDateTime) -> PlanJson {
    PlanJson {
        focused: plan.focused.map(|t| todo_to_json(t, now)),
        upcoming: plan.upcoming.iter().map(|t| todo_to_json(t, now)).collect(),
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

fn priority_marker(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "!!!",
        Priority::Medium => "!! ",
        Priority::Low => "!  ",
    }
}

/// One-line summary: `[x] #3   !!  Text…   due 2024-12-25 (overdue)`
pub fn format_todo_line(todo: &Todo, id_width: usize, now: NaiveDateTime) -> String {
    let check = if todo.completed { 'x' } else { ' ' };
    let id = format!("#{}", todo.id);
    let mut line = format!(
        "[{}] {:<id_width$} {} {}",
        check,
        id,
        priority_marker(todo.priority),
        pad_to_width(&truncate_to_width(&todo.text, TEXT_COLUMN), TEXT_COLUMN),
        id_width = id_width + 1,
    );
    if let Some(due) = todo.due_date() {
        line.push_str(&format!("  due {}", due));
        if is_overdue(todo, now) {
            line.push_str(" (overdue)");
        }
    }
    line.trim_end().to_string()
}

/// All lines of a list, with ID column width fitted to the widest ID
pub fn format_todo_list(view: &[&Todo], now: NaiveDateTime) -> Vec<String> {
    if view.is_empty() {
        return vec!["No tasks found".to_string()];
    }
    let id_width = view
        .iter()
        .map(|t| display_width(&t.id.to_string()))
        .max()
        .unwrap_or(1);
    view.iter()
        .map(|t| format_todo_line(t, id_width, now))
        .collect()
}

pub fn format_stats(stats: &Stats) -> String {
    format!(
        "{} active, {} completed ({}%)",
        stats.active, stats.completed, stats.percentage
    )
}

pub fn format_plan(plan: &DayPlan<'_>, now: NaiveDateTime) -> Vec<String> {
    let mut lines = vec!["Today's program".to_string()];
    match plan.focused {
        Some(todo) => {
            lines.push(format!(
                "  Focus: [{}] {}",
                todo.priority.as_str().to_uppercase(),
                todo.text
            ));
            if is_overdue(todo, now) {
                lines.push("         (overdue)".to_string());
            }
        }
        None => lines.push("  Nothing to focus on".to_string()),
    }
    if !plan.upcoming.is_empty() {
        lines.push("  Up next:".to_string());
        for todo in &plan.upcoming {
            lines.push(format!(
                "    {} [{}]",
                todo.text,
                todo.priority.as_str().to_uppercase()
            ));
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::view::Stats;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 12, 22)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_line_shows_check_id_and_priority() {
        let mut todo = Todo::new(TodoId::new(7), "Ship release", Priority::High);
        todo.completed = true;
        let line = format_todo_line(&todo, 1, now());
        assert!(line.starts_with("[x] #7 "));
        assert!(line.contains("!!!"));
        assert!(line.ends_with("Ship release"));
    }

    #[test]
    fn test_line_flags_overdue() {
        let todo = Todo::new(TodoId::new(1), "Pay invoice", Priority::Medium).with_due_date("2024-12-20");
        let line = format_todo_line(&todo, 1, now());
        assert!(line.ends_with("due 2024-12-20 (overdue)"));

        let done = Todo {
            completed: true,
            ..todo
        };
        assert!(format_todo_line(&done, 1, now()).ends_with("due 2024-12-20"));
    }

    #[test]
    fn test_long_text_is_truncated() {
        let todo = Todo::new(TodoId::new(1), "word ".repeat(30), Priority::Low);
        let line = format_todo_line(&todo, 1, now());
        assert!(line.contains('\u{2026}'));
    }

    #[test]
    fn test_empty_list_message() {
        assert_eq!(format_todo_list(&[], now()), vec!["No tasks found".to_string()]);
    }

    #[test]
    fn test_stats_line() {
        let stats = Stats {
            total: 3,
            active: 2,
            completed: 1,
            percentage: 33,
        };
        assert_eq!(format_stats(&stats), "2 active, 1 completed (33%)");
    }

    #[test]
    fn test_json_includes_overdue_and_null_due_date() {
        let todo = Todo::new(TodoId::new(2), "x", Priority::Low);
        let value = serde_json::to_value(todo_to_json(&todo, now())).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "id": 2,
                "text": "x",
                "completed": false,
                "priority": "low",
                "dueDate": null,
                "overdue": false
            })
        );
    }
}

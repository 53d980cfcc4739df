use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};

use crate::model::todo::Todo;

/// Parse a due date string as a calendar date.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps and naive `YYYY-MM-DDTHH:MM:SS`.
/// Returns `None` for anything else.
pub fn parse_due_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
}

/// A todo is overdue when it is incomplete and its due date falls strictly
/// before the day containing `now`. Unparsable dates are never overdue.
pub fn is_overdue(todo: &Todo, now: NaiveDateTime) -> bool {
    if todo.completed {
        return false;
    }
    todo.due_date()
        .and_then(parse_due_date)
        .is_some_and(|due| due < now.date())
}

/// [`is_overdue`] against the local clock
pub fn is_overdue_today(todo: &Todo) -> bool {
    is_overdue(todo, Local::now().naive_local())
}

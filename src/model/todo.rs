use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::de::{self, Unexpected, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// 2^64 as a float: the first integral value past `u64::MAX`
const U64_LIMIT: f64 = 18_446_744_073_709_551_616.0;

/// Unique identifier of a todo within a collection.
///
/// New ids are always integers, but stored data may carry any JSON number
/// (older records used fractional timestamps). Those are kept as they are,
/// so they read, compare and write back unchanged.
#[derive(Debug, Clone, Copy)]
pub struct TodoId(Repr);

#[derive(Debug, Clone, Copy)]
enum Repr {
    Int(u64),
    /// Finite, and not an integer in `u64` range
    Float(f64),
}

impl TodoId {
    pub const fn new(n: u64) -> Self {
        TodoId(Repr::Int(n))
    }

    /// Id for any finite number. Integral values in `u64` range become
    /// plain integer ids, so `4.0` and `4` are the same id.
    pub fn from_f64(f: f64) -> Option<Self> {
        if !f.is_finite() {
            return None;
        }
        if f.fract() == 0.0 && (0.0..U64_LIMIT).contains(&f) {
            Some(TodoId::new(f as u64))
        } else {
            Some(TodoId(Repr::Float(f)))
        }
    }

    /// The integer value, if this is an integer id
    pub fn as_u64(self) -> Option<u64> {
        match self.0 {
            Repr::Int(n) => Some(n),
            Repr::Float(_) => None,
        }
    }

    /// Largest integer id at or below this one; `None` below zero
    pub fn floor_u64(self) -> Option<u64> {
        match self.0 {
            Repr::Int(n) => Some(n),
            Repr::Float(f) if f < 0.0 => None,
            Repr::Float(f) if f >= U64_LIMIT => Some(u64::MAX),
            Repr::Float(f) => Some(f.floor() as u64),
        }
    }
}

impl Ord for TodoId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.0, other.0) {
            (Repr::Int(a), Repr::Int(b)) => a.cmp(&b),
            (Repr::Float(a), Repr::Float(b)) => a.total_cmp(&b),
            // u64::MAX rounds up to 2^64 as a float; the integer sorts first
            (Repr::Int(a), Repr::Float(b)) => (a as f64).total_cmp(&b).then(Ordering::Less),
            (Repr::Float(a), Repr::Int(b)) => a.total_cmp(&(b as f64)).then(Ordering::Greater),
        }
    }
}

impl PartialOrd for TodoId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for TodoId {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for TodoId {}

impl Hash for TodoId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self.0 {
            Repr::Int(n) => {
                0u8.hash(state);
                n.hash(state);
            }
            Repr::Float(f) => {
                1u8.hash(state);
                f.to_bits().hash(state);
            }
        }
    }
}

impl From<u64> for TodoId {
    fn from(n: u64) -> Self {
        TodoId::new(n)
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Repr::Int(n) => write!(f, "{}", n),
            Repr::Float(x) => write!(f, "{}", x),
        }
    }
}

/// Error parsing a [`TodoId`] from text
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid todo id '{0}'")]
pub struct ParseIdError(String);

impl FromStr for TodoId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim().trim_start_matches('#');
        if let Ok(n) = digits.parse::<u64>() {
            return Ok(TodoId::new(n));
        }
        digits
            .parse::<f64>()
            .ok()
            .and_then(TodoId::from_f64)
            .ok_or_else(|| ParseIdError(s.to_string()))
    }
}

impl Serialize for TodoId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            Repr::Int(n) => serializer.serialize_u64(n),
            Repr::Float(f) => serializer.serialize_f64(f),
        }
    }
}

struct TodoIdVisitor;

impl Visitor<'_> for TodoIdVisitor {
    type Value = TodoId;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a finite number")
    }

    fn visit_u64<E: de::Error>(self, n: u64) -> Result<TodoId, E> {
        Ok(TodoId::new(n))
    }

    fn visit_i64<E: de::Error>(self, n: i64) -> Result<TodoId, E> {
        match u64::try_from(n) {
            Ok(n) => Ok(TodoId::new(n)),
            Err(_) => self.visit_f64(n as f64),
        }
    }

    fn visit_f64<E: de::Error>(self, f: f64) -> Result<TodoId, E> {
        TodoId::from_f64(f).ok_or_else(|| E::invalid_value(Unexpected::Float(f), &self))
    }
}

impl<'de> Deserialize<'de> for TodoId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(TodoIdVisitor)
    }
}

/// Task priority. Anything unrecognized in stored data reads back as `Medium`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "&'static str")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Numeric rank used for sorting (high = 3, medium = 2, low = 1)
    pub fn rank(self) -> u8 {
        match self {
            Priority::Low => 1,
            Priority::Medium => 2,
            Priority::High => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    /// Parse a priority name, case-insensitively
    pub fn parse_priority(s: &str) -> Option<Priority> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }
}

impl From<Option<String>> for Priority {
    fn from(raw: Option<String>) -> Self {
        raw.as_deref()
            .and_then(Priority::parse_priority)
            .unwrap_or_default()
    }
}

impl From<Priority> for &'static str {
    fn from(p: Priority) -> Self {
        p.as_str()
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single todo record as persisted under the `todos` key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub priority: Priority,
    /// Raw due date string, usually `YYYY-MM-DD`
    #[serde(rename = "dueDate", default)]
    pub due_date: Option<String>,
}

impl Todo {
    /// Create an incomplete todo
    pub fn new(id: TodoId, text: impl Into<String>, priority: Priority) -> Self {
        Todo {
            id,
            text: text.into(),
            completed: false,
            priority,
            due_date: None,
        }
    }

    pub fn with_due_date(mut self, due_date: impl Into<String>) -> Self {
        self.due_date = Some(due_date.into());
        self
    }

    /// The due date, treating an empty string as absent
    pub fn due_date(&self) -> Option<&str> {
        self.due_date.as_deref().filter(|d| !d.trim().is_empty())
    }
}

/// Field-level changes applied by an edit. `None` leaves a field alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoUpdate {
    pub text: Option<String>,
    pub priority: Option<Priority>,
    /// `Some(None)` clears the due date
    pub due_date: Option<Option<String>>,
}

impl TodoUpdate {
    pub fn text(text: impl Into<String>) -> Self {
        TodoUpdate {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.priority.is_none() && self.due_date.is_none()
    }
}

/// Todos shown to a first-time user (or whenever the `todos` key is absent)
pub fn seed_todos() -> Vec<Todo> {
    let mut meeting = Todo::new(TodoId::new(2), "Schedule client meeting", Priority::Medium);
    meeting.completed = true;
    vec![
        Todo::new(TodoId::new(1), "Review quarterly reports", Priority::High),
        meeting,
        Todo::new(TodoId::new(3), "Update project documentation", Priority::Low),
    ]
}

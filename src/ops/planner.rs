use crate::model::todo::Todo;
use crate::ops::view::{cmp_due_date, cmp_priority};

/// Today's program: one task to focus on and a short queue behind it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayPlan<'a> {
    pub focused: Option<&'a Todo>,
    pub upcoming: Vec<&'a Todo>,
}

/// Build a plan of at most `size` active todos, ordered by priority, then
/// due date, then insertion order.
pub fn day_plan(todos: &[Todo], size: usize) -> DayPlan<'_> {
    let mut active: Vec<&Todo> = todos.iter().filter(|t| !t.completed).collect();
    active.sort_by(|a, b| cmp_priority(a, b).then_with(|| cmp_due_date(a, b)));
    active.truncate(size);

    let mut queue = active.into_iter();
    DayPlan {
        focused: queue.next(),
        upcoming: queue.collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::todo::{Priority, TodoId, seed_todos};

    #[test]
    fn test_empty_collection_has_no_focus() {
        let todos: Vec<Todo> = Vec::new();
        let plan = day_plan(&todos, 3);
        assert!(plan.focused.is_none());
        assert!(plan.upcoming.is_empty());
    }

    #[test]
    fn test_seed_plan_skips_completed() {
        let todos = seed_todos();
        let plan = day_plan(&todos, 3);
        assert_eq!(plan.focused.map(|t| t.id), Some(TodoId::new(1)));
        let upcoming: Vec<TodoId> = plan.upcoming.iter().map(|t| t.id).collect();
        assert_eq!(upcoming, vec![TodoId::new(3)]);
    }

    #[test]
    fn test_earlier_due_date_breaks_priority_ties() {
        let todos = vec![
            Todo::new(TodoId::new(1), "later", Priority::High).with_due_date("2024-12-30"),
            Todo::new(TodoId::new(2), "undated", Priority::High),
            Todo::new(TodoId::new(3), "sooner", Priority::High).with_due_date("2024-12-01"),
            Todo::new(TodoId::new(4), "low", Priority::Low),
        ];
        let plan = day_plan(&todos, 3);
        assert_eq!(plan.focused.map(|t| t.id), Some(TodoId::new(3)));
        let upcoming: Vec<TodoId> = plan.upcoming.iter().map(|t| t.id).collect();
        assert_eq!(upcoming, vec![TodoId::new(1), TodoId::new(2)]);
    }

    #[test]
    fn test_size_zero_is_empty() {
        let todos = seed_todos();
        let plan = day_plan(&todos, 0);
        assert!(plan.focused.is_none());
        assert!(plan.upcoming.is_empty());
    }
}

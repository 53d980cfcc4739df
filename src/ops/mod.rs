pub mod overdue;
pub mod planner;
pub mod todo_ops;
pub mod view;

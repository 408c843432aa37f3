//! Display ordering and completion summaries

use crate::model::{Todo, TodoList};

/// Incomplete lists first, then complete ones; order within each group is kept.
pub fn sort_lists(lists: &[TodoList]) -> Vec<&TodoList> {
    let (complete, mut incomplete): (Vec<_>, Vec<_>) =
        lists.iter().partition(|l| l.is_complete());
    incomplete.extend(complete);
    incomplete
}

/// Incomplete todos first, then completed ones; order within each group is kept.
pub fn sort_todos(todos: &[Todo]) -> Vec<&Todo> {
    let (complete, mut incomplete): (Vec<_>, Vec<_>) = todos.iter().partition(|t| t.completed);
    incomplete.extend(complete);
    incomplete
}

/// `"remaining/total"`, e.g. `"2/5"`.
pub fn completion_ratio(todos: &[Todo]) -> String {
    let remaining = todos.iter().filter(|t| !t.completed).count();
    format!("{}/{}", remaining, todos.len())
}

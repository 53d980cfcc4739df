use indexmap::IndexMap;
use tracing::debug;

use crate::io::backup::{self, ImportReport, StorageKey};
use crate::io::persist::{Persisted, PersistentStore};
use crate::io::storage::Storage;
use crate::model::theme::Theme;
use crate::model::todo::{Priority, Todo, TodoId, TodoUpdate, seed_todos};
use crate::ops::planner::{DayPlan, day_plan};
use crate::ops::todo_ops::{self, TodoError};
use crate::ops::view::{self, Stats, ViewPrefs};

/// The running state of one user: todos, theme and list preferences,
/// each mirrored to its storage key after every change.
pub struct TodoSession<S: Storage> {
    store: PersistentStore<S>,
    todos: Persisted<Vec<Todo>>,
    theme: Persisted<Theme>,
    prefs: Persisted<ViewPrefs>,
    default_theme: Theme,
}

impl<S: Storage> TodoSession<S> {
    /// Load state from `store`, seeding anything absent or unreadable.
    pub fn open(store: PersistentStore<S>, prefers_dark: bool) -> Self {
        let default_theme = Theme::default_for(prefers_dark);
        let todos = Persisted::load(&store, StorageKey::Todos.as_str(), seed_todos());
        let theme = Persisted::load(&store, StorageKey::Theme.as_str(), default_theme);
        let prefs = Persisted::load(&store, StorageKey::Filters.as_str(), ViewPrefs::default());
        debug!(
            todos = todos.get().len(),
            theme = %theme.get(),
            "session loaded"
        );
        TodoSession {
            store,
            todos,
            theme,
            prefs,
            default_theme,
        }
    }

    /// Re-read everything from storage (after an import, for instance)
    pub fn reload(&mut self) {
        self.todos = Persisted::load(&self.store, StorageKey::Todos.as_str(), seed_todos());
        self.theme = Persisted::load(&self.store, StorageKey::Theme.as_str(), self.default_theme);
        self.prefs = Persisted::load(
            &self.store,
            StorageKey::Filters.as_str(),
            ViewPrefs::default(),
        );
    }

    pub fn todos(&self) -> &[Todo] {
        self.todos.get()
    }

    pub fn theme(&self) -> Theme {
        *self.theme.get()
    }

    pub fn prefs(&self) -> ViewPrefs {
        *self.prefs.get()
    }

    pub fn find(&self, id: TodoId) -> Option<&Todo> {
        todo_ops::find(self.todos(), id)
    }

    pub fn store(&self) -> &PersistentStore<S> {
        &self.store
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Add a todo and return its id. Blank text leaves everything untouched.
    pub fn add(
        &mut self,
        text: &str,
        priority: Priority,
        due_date: Option<String>,
    ) -> Result<TodoId, TodoError> {
        let next = todo_ops::add(self.todos(), text, priority, due_date)?;
        let id = next.last().map(|t| t.id).ok_or(TodoError::EmptyText)?;
        self.todos.set(&mut self.store, next);
        Ok(id)
    }

    /// Flip completion. Returns the new `completed` value.
    pub fn toggle(&mut self, id: TodoId) -> Result<bool, TodoError> {
        self.require(id)?;
        let next = todo_ops::toggle(self.todos(), id);
        self.todos.set(&mut self.store, next);
        Ok(self.find(id).is_some_and(|t| t.completed))
    }

    /// Delete a todo, returning the removed record
    pub fn delete(&mut self, id: TodoId) -> Result<Todo, TodoError> {
        let removed = self.require(id)?.clone();
        let next = todo_ops::delete(self.todos(), id);
        self.todos.set(&mut self.store, next);
        Ok(removed)
    }

    pub fn edit(&mut self, id: TodoId, update: &TodoUpdate) -> Result<(), TodoError> {
        self.require(id)?;
        if update.is_empty() {
            return Ok(());
        }
        let next = todo_ops::edit(self.todos(), id, update)?;
        self.todos.set(&mut self.store, next);
        Ok(())
    }

    /// Advance light → dark → vibe → light and return the new theme
    pub fn cycle_theme(&mut self) -> Theme {
        self.theme.update(&mut self.store, |t| t.next());
        self.theme()
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme.set(&mut self.store, theme);
    }

    pub fn set_prefs(&mut self, prefs: ViewPrefs) {
        if prefs != self.prefs() {
            self.prefs.set(&mut self.store, prefs);
        }
    }

    fn require(&self, id: TodoId) -> Result<&Todo, TodoError> {
        self.find(id).ok_or(TodoError::NotFound(id))
    }

    // -----------------------------------------------------------------------
    // Derived views
    // -----------------------------------------------------------------------

    /// Todos under the saved filter and sort
    pub fn visible(&self) -> Vec<&Todo> {
        let prefs = self.prefs();
        view::visible(self.todos(), prefs.filter, prefs.sort)
    }

    pub fn stats(&self) -> Stats {
        view::stats(self.todos())
    }

    pub fn plan(&self, size: usize) -> DayPlan<'_> {
        day_plan(self.todos(), size)
    }

    // -----------------------------------------------------------------------
    // Backup
    // -----------------------------------------------------------------------

    pub fn export(&self) -> IndexMap<String, serde_json::Value> {
        backup::export_data(self.store.storage())
    }

    /// Write `data` to storage and reload so the session reflects it
    pub fn import(&mut self, data: &IndexMap<String, serde_json::Value>) -> ImportReport {
        let report = backup::import_data(self.store.storage_mut(), data);
        self.reload();
        report
    }

    /// Remove all stored keys. In-memory state falls back to the defaults.
    pub fn clear(&mut self) {
        backup::clear_all_data(self.store.storage_mut());
        self.reload();
    }

    pub fn into_store(self) -> PersistentStore<S> {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::storage::MemoryStorage;
    use crate::ops::view::{FilterMode, SortMode};
    use crate::ui::SaveIndicator;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::time::Duration;

    fn session() -> TodoSession<MemoryStorage> {
        TodoSession::open(PersistentStore::new(MemoryStorage::new()), false)
    }

    fn stored_todos(session: &TodoSession<MemoryStorage>) -> serde_json::Value {
        let raw = session.store().storage().raw("todos").unwrap();
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn test_first_run_uses_seed_and_preference() {
        let s = session();
        assert_eq!(s.todos(), seed_todos().as_slice());
        assert_eq!(s.theme(), Theme::Light);

        let dark = TodoSession::open(PersistentStore::new(MemoryStorage::new()), true);
        assert_eq!(dark.theme(), Theme::Dark);
    }

    #[test]
    fn test_corrupt_todos_fall_back_to_seed() {
        let mut storage = MemoryStorage::new();
        storage.set_item("todos", "[{oops").unwrap();
        let s = TodoSession::open(PersistentStore::new(storage), false);
        assert_eq!(s.todos(), seed_todos().as_slice());
    }

    #[test]
    fn test_fractional_ids_load_and_survive_an_add() {
        let mut storage = MemoryStorage::new();
        storage
            .set_item(
                "todos",
                r#"[{"id":1734567890123.456,"text":"Real user task","completed":false,"priority":"high","dueDate":null}]"#,
            )
            .unwrap();
        let mut s = TodoSession::open(PersistentStore::new(storage), false);
        assert_eq!(s.todos().len(), 1);
        assert_eq!(s.todos()[0].text, "Real user task");

        let id = s.add("new", Priority::Medium, None).unwrap();
        assert_eq!(id, TodoId::new(1734567890124));

        let stored = stored_todos(&s);
        assert_eq!(stored[0]["id"], json!(1734567890123.456));
        assert_eq!(stored[0]["text"], "Real user task");
        assert_eq!(stored[1]["text"], "new");

        let float_id = s.todos()[0].id;
        assert!(s.toggle(float_id).unwrap());
    }

    #[test]
    fn test_add_after_max_id_does_not_overflow() {
        let mut storage = MemoryStorage::new();
        storage
            .set_item("todos", r#"[{"id":18446744073709551615,"text":"big"}]"#)
            .unwrap();
        let mut s = TodoSession::open(PersistentStore::new(storage), false);
        let id = s.add("next", Priority::Medium, None).unwrap();
        assert_eq!(id, TodoId::new(1));
        assert_eq!(s.todos().len(), 2);
    }

    #[test]
    fn test_add_persists_whole_collection() {
        let mut s = session();
        let id = s.add("Plan offsite", Priority::High, Some("2025-03-01".into())).unwrap();
        assert_eq!(id, TodoId::new(4));
        assert_eq!(s.todos().len(), 4);

        let stored = stored_todos(&s);
        assert_eq!(stored.as_array().unwrap().len(), 4);
        assert_eq!(
            stored[3],
            json!({
                "id": 4,
                "text": "Plan offsite",
                "completed": false,
                "priority": "high",
                "dueDate": "2025-03-01"
            })
        );
    }

    #[test]
    fn test_rejected_add_changes_nothing() {
        let mut s = session();
        assert_eq!(s.add("   ", Priority::Medium, None), Err(TodoError::EmptyText));
        assert_eq!(s.todos().len(), 3);
        assert!(s.store().storage().raw("todos").is_none());
    }

    #[test]
    fn test_toggle_delete_edit_round_trip_through_storage() {
        let mut s = session();
        assert_eq!(s.toggle(TodoId::new(1)), Ok(true));
        s.edit(TodoId::new(3), &TodoUpdate::text("Refresh docs")).unwrap();
        let removed = s.delete(TodoId::new(2)).unwrap();
        assert_eq!(removed.text, "Schedule client meeting");

        let reopened = TodoSession::open(s.into_store(), false);
        let texts: Vec<&str> = reopened.todos().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["Review quarterly reports", "Refresh docs"]);
        assert!(reopened.find(TodoId::new(1)).unwrap().completed);
    }

    #[test]
    fn test_unknown_ids_are_reported() {
        let mut s = session();
        assert_eq!(s.toggle(TodoId::new(99)), Err(TodoError::NotFound(TodoId::new(99))));
        assert!(s.delete(TodoId::new(99)).is_err());
        assert!(s.edit(TodoId::new(99), &TodoUpdate::text("x")).is_err());
        assert!(s.store().storage().raw("todos").is_none());
    }

    #[test]
    fn test_theme_cycles_and_persists() {
        let mut s = session();
        assert_eq!(s.cycle_theme(), Theme::Dark);
        assert_eq!(s.cycle_theme(), Theme::Vibe);
        assert_eq!(s.store().storage().raw("theme"), Some("\"vibe\""));
        assert_eq!(s.cycle_theme(), Theme::Light);
    }

    #[test]
    fn test_prefs_drive_visible_list() {
        let mut s = session();
        s.set_prefs(ViewPrefs {
            filter: FilterMode::Active,
            sort: SortMode::Alphabetical,
        });
        let texts: Vec<&str> = s.visible().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["Review quarterly reports", "Update project documentation"]);
        assert_eq!(
            s.store().storage().raw("filters"),
            Some(r#"{"filter":"active","sort":"alphabetical"}"#)
        );
    }

    #[test]
    fn test_write_failure_keeps_memory_authoritative() {
        let mut s = TodoSession::open(PersistentStore::new(MemoryStorage::with_quota(16)), false);
        let id = s.add("Still here", Priority::Medium, None).unwrap();
        assert_eq!(s.find(id).unwrap().text, "Still here");
        assert!(s.store().storage().raw("todos").is_none());
    }

    #[test]
    fn test_saves_show_the_indicator() {
        let indicator = SaveIndicator::new(Duration::from_secs(60));
        let notifier = indicator.notifier();
        let store = PersistentStore::new(MemoryStorage::new()).with_on_save(move |_| notifier.notify());
        let mut s = TodoSession::open(store, false);

        assert!(!indicator.is_visible());
        s.toggle(TodoId::new(2)).unwrap();
        assert!(indicator.is_visible());
    }

    #[test]
    fn test_import_reloads_session() {
        let mut s = session();
        let data: IndexMap<String, serde_json::Value> = [
            ("todos".to_string(), json!([{ "id": 10, "text": "From backup" }])),
            ("theme".to_string(), json!("vibe")),
        ]
        .into_iter()
        .collect();

        let report = s.import(&data);
        assert_eq!(report.imported.len(), 2);
        assert_eq!(s.todos().len(), 1);
        assert_eq!(s.todos()[0].priority, Priority::Medium);
        assert_eq!(s.theme(), Theme::Vibe);
    }

    #[test]
    fn test_clear_resets_to_defaults() {
        let mut s = session();
        s.add("Temporary", Priority::Low, None).unwrap();
        s.cycle_theme();
        s.clear();
        assert_eq!(s.todos(), seed_todos().as_slice());
        assert_eq!(s.theme(), Theme::Light);
        assert!(s.export().is_empty());
    }

    #[test]
    fn test_stats_and_plan_follow_todos() {
        let s = session();
        let stats = s.stats();
        assert_eq!((stats.active, stats.completed, stats.percentage), (2, 1, 33));
        assert_eq!(s.plan(3).focused.map(|t| t.id), Some(TodoId::new(1)));
    }
}

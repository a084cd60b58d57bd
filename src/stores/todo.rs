use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::persist::{persist, PersistHandle};
use crate::storage::StorageAdapter;
use crate::store::{logger, Store};

/// Storage key of the persisted todo list.
pub const TODO_STORAGE_KEY: &str = "todo-storage";

/// Schema version of the persisted todo list. Version 0 records have the
/// same shape and are read as-is.
pub const TODO_SCHEMA_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: String,
    pub text: String,
    pub completed: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoState {
    pub todos: Vec<Todo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TodoError {
    #[error("todo text must not be empty")]
    EmptyText,
}

/// Hands out millisecond-timestamp ids that strictly increase and never
/// collide with ids already in the list.
///
/// Once the counter saturates at `u64::MAX` the numeric id is reused with a
/// `-<n>` suffix picked to be free in the list.
#[derive(Debug, Default)]
struct IdSource {
    last: AtomicU64,
}

impl IdSource {
    fn next(&self, existing: &[Todo]) -> String {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as u64)
            .unwrap_or(0);
        let above_existing = existing
            .iter()
            .filter_map(|todo| todo.id.parse::<u64>().ok())
            .max()
            .map_or(0, |max| max.saturating_add(1));
        let candidate = now.max(above_existing);

        let prev = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |prev| {
                Some(candidate.max(prev.saturating_add(1)))
            })
            .unwrap_or_else(|prev| prev);
        let base = candidate.max(prev.saturating_add(1)).to_string();
        let taken = |id: &str| existing.iter().any(|todo| todo.id == id);
        if !taken(&base) {
            return base;
        }
        let mut suffix = 1u64;
        loop {
            let id = format!("{base}-{suffix}");
            if !taken(&id) {
                return id;
            }
            suffix += 1;
        }
    }
}

/// The todo list store.
#[derive(Clone)]
pub struct TodoStore {
    store: Store<TodoState>,
    persist: Option<PersistHandle<TodoState>>,
    ids: Arc<IdSource>,
}

impl TodoStore {
    /// A todo list that lives only in memory.
    pub fn in_memory() -> Self {
        Self {
            store: Store::builder(TodoState::default())
                .with(logger("todos"))
                .build(),
            persist: None,
            ids: Arc::default(),
        }
    }

    /// A todo list hydrated from and written back to `storage` under `key`.
    pub fn persisted(storage: Arc<dyn StorageAdapter>, key: &str) -> Self {
        let persist = persist(key, storage)
            .version(TODO_SCHEMA_VERSION)
            .migrate(|state, from| match from {
                0 => Ok(state),
                other => Err(format!("unknown todo schema version {other}")),
            })
            .build();
        let handle = persist.handle();
        let store = Store::builder(TodoState::default())
            .with(persist)
            .with(logger("todos"))
            .build();

        Self {
            store,
            persist: Some(handle),
            ids: Arc::default(),
        }
    }

    /// The underlying store, for subscribing.
    pub fn store(&self) -> &Store<TodoState> {
        &self.store
    }

    /// Persistence controls, when the list is persisted.
    pub fn persistence(&self) -> Option<&PersistHandle<TodoState>> {
        self.persist.as_ref()
    }

    /// Whether the list is ready to render. In-memory lists always are.
    pub fn has_hydrated(&self) -> bool {
        self.persist
            .as_ref()
            .map_or(true, PersistHandle::has_hydrated)
    }

    /// Snapshot of the list.
    pub fn todos(&self) -> Vec<Todo> {
        self.store.read(|s| s.todos.clone())
    }

    /// Number of todos not yet completed.
    pub fn remaining(&self) -> usize {
        self.store
            .read(|s| s.todos.iter().filter(|todo| !todo.completed).count())
    }

    /// Append a todo and return its id. The text is trimmed.
    pub fn add_todo(&self, text: &str) -> Result<String, TodoError> {
        let text = text.trim();
        let mut id = String::new();
        self.store.try_update(|state| {
            if text.is_empty() {
                return Err(TodoError::EmptyText);
            }
            id = self.ids.next(&state.todos);
            let mut todos = state.todos.clone();
            todos.push(Todo {
                id: id.clone(),
                text: text.to_string(),
                completed: false,
            });
            Ok(TodoState { todos })
        })?;
        Ok(id)
    }

    /// Remove the todo with `id`, if present.
    pub fn remove_todo(&self, id: &str) {
        self.store.update(|state| TodoState {
            todos: state
                .todos
                .iter()
                .filter(|todo| todo.id != id)
                .cloned()
                .collect(),
        });
    }

    /// Flip the completed flag of the todo with `id`, if present.
    pub fn toggle_todo(&self, id: &str) {
        self.map_todo(id, |todo| todo.completed = !todo.completed);
    }

    /// Replace a todo's text. Unknown ids are ignored; empty text is rejected.
    pub fn edit_todo(&self, id: &str, text: &str) -> Result<(), TodoError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(TodoError::EmptyText);
        }
        self.map_todo(id, |todo| todo.text = text.to_string());
        Ok(())
    }

    /// Drop every completed todo.
    pub fn clear_completed(&self) {
        self.store.update(|state| TodoState {
            todos: state
                .todos
                .iter()
                .filter(|todo| !todo.completed)
                .cloned()
                .collect(),
        });
    }

    fn map_todo(&self, id: &str, f: impl Fn(&mut Todo)) {
        self.store.update(|state| TodoState {
            todos: state
                .todos
                .iter()
                .cloned()
                .map(|mut todo| {
                    if todo.id == id {
                        f(&mut todo);
                    }
                    todo
                })
                .collect(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn add_toggle_clear() {
        let todos = TodoStore::in_memory();
        let id = todos.add_todo("buy milk").unwrap();
        assert_eq!(todos.remaining(), 1);

        todos.toggle_todo(&id);
        assert_eq!(todos.remaining(), 0);

        todos.clear_completed();
        assert!(todos.todos().is_empty());
    }

    #[test]
    fn add_trims_and_rejects_empty() {
        let todos = TodoStore::in_memory();
        assert_eq!(todos.add_todo("   "), Err(TodoError::EmptyText));
        assert!(todos.todos().is_empty());

        todos.add_todo("  walk dog ").unwrap();
        assert_eq!(todos.todos()[0].text, "walk dog");
    }

    #[test]
    fn ids_are_unique_and_increasing() {
        let todos = TodoStore::in_memory();
        let ids: Vec<u64> = (0..50)
            .map(|i| todos.add_todo(&format!("item {i}")).unwrap().parse().unwrap())
            .collect();
        assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn ids_stay_above_loaded_ids() {
        let source = IdSource::default();
        let existing = vec![Todo {
            id: u64::MAX.saturating_sub(10).to_string(),
            text: "from the future".to_string(),
            completed: false,
        }];
        let id: u64 = source.next(&existing).parse().unwrap();
        assert_eq!(id, u64::MAX - 9);
    }

    #[test]
    fn saturated_ids_get_a_free_suffix() {
        let storage = MemoryStorage::new();
        storage
            .set_item(
                TODO_STORAGE_KEY,
                &format!(
                    r#"{{"state":{{"todos":[{{"id":"{max}","text":"x","completed":false}},{{"id":"{max}-1","text":"y","completed":false}}]}},"version":1}}"#,
                    max = u64::MAX
                ),
            )
            .unwrap();

        let todos = TodoStore::persisted(Arc::new(storage), TODO_STORAGE_KEY);
        let first = todos.add_todo("z").unwrap();
        let second = todos.add_todo("w").unwrap();

        assert_eq!(first, format!("{}-2", u64::MAX));
        assert_eq!(second, format!("{}-3", u64::MAX));
        let list = todos.todos();
        let mut ids: Vec<_> = list.iter().map(|todo| todo.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 4);
    }

    #[test]
    fn edit_and_remove() {
        let todos = TodoStore::in_memory();
        let a = todos.add_todo("a").unwrap();
        let b = todos.add_todo("b").unwrap();

        todos.edit_todo(&a, "alpha").unwrap();
        assert_eq!(todos.edit_todo(&a, " "), Err(TodoError::EmptyText));
        todos.edit_todo("missing", "ignored").unwrap();
        todos.remove_todo(&b);

        let list = todos.todos();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].text, "alpha");
    }

    #[test]
    fn unknown_id_does_not_commit() {
        let todos = TodoStore::in_memory();
        todos.add_todo("a").unwrap();
        let before = todos.store().get();
        todos.toggle_todo("missing");
        todos.remove_todo("missing");
        assert!(Arc::ptr_eq(&before, &todos.store().get()));
    }

    #[test]
    fn persisted_list_survives_reload() {
        let storage = MemoryStorage::new();
        let first = TodoStore::persisted(Arc::new(storage.clone()), TODO_STORAGE_KEY);
        assert!(first.has_hydrated());
        let id = first.add_todo("buy milk").unwrap();
        first.toggle_todo(&id);

        let reloaded = TodoStore::persisted(Arc::new(storage.clone()), TODO_STORAGE_KEY);
        assert_eq!(reloaded.todos(), first.todos());
        assert!(reloaded.todos()[0].completed);
    }

    #[test]
    fn reads_version_zero_records() {
        let storage = MemoryStorage::new();
        storage
            .set_item(
                TODO_STORAGE_KEY,
                r#"{"state":{"todos":[{"id":"1","text":"old","completed":false}]},"version":0}"#,
            )
            .unwrap();

        let todos = TodoStore::persisted(Arc::new(storage.clone()), TODO_STORAGE_KEY);
        assert_eq!(todos.todos()[0].text, "old");

        let raw = storage.get_item(TODO_STORAGE_KEY).unwrap().unwrap();
        assert!(raw.contains(r#""version":1"#));
    }
}

use std::fmt;
use std::sync::Arc;

use crate::config::{AppConfig, ConfigError};
use crate::routing::LocaleRouting;
use crate::storage::{FileStorage, MemoryStorage, StorageAdapter};
use crate::stores::{CounterStore, TodoStore, TODO_STORAGE_KEY};

/// Everything the application shares, built once at startup and passed by
/// reference to whichever layer needs it.
///
/// There is no global instance: each `AppContext` owns its own stores, so
/// tests get fully isolated state.
///
/// # Examples
///
/// ```
/// use shelf::app::AppContext;
///
/// let app = AppContext::in_memory();
/// app.counter().increment();
/// assert_eq!(app.counter().count(), 1);
/// ```
#[derive(Clone)]
pub struct AppContext {
    counter: CounterStore,
    todos: TodoStore,
    routing: Arc<LocaleRouting>,
    storage: Arc<dyn StorageAdapter>,
}

impl AppContext {
    /// Build the context from `config`, persisting into `storage`.
    ///
    /// The todo list hydrates from `storage` before this returns.
    pub fn new(config: &AppConfig, storage: Arc<dyn StorageAdapter>) -> Result<Self, ConfigError> {
        let routing = Arc::new(config.routing()?);
        let todos = TodoStore::persisted(Arc::clone(&storage), &config.persist.todo_key);
        Ok(Self {
            counter: CounterStore::new(),
            todos,
            routing,
            storage,
        })
    }

    /// Build the context with the storage the config asks for: files under
    /// `[storage] dir`, or memory when no directory is set.
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let storage: Arc<dyn StorageAdapter> = match &config.storage.dir {
            Some(dir) => Arc::new(FileStorage::new(dir)),
            None => Arc::new(MemoryStorage::new()),
        };
        Self::new(config, storage)
    }

    /// Default locales and routing with in-memory storage.
    pub fn in_memory() -> Self {
        let storage: Arc<dyn StorageAdapter> = Arc::new(MemoryStorage::new());
        Self {
            counter: CounterStore::new(),
            todos: TodoStore::persisted(Arc::clone(&storage), TODO_STORAGE_KEY),
            routing: Arc::new(LocaleRouting::default()),
            storage,
        }
    }

    pub fn counter(&self) -> &CounterStore {
        &self.counter
    }

    pub fn todos(&self) -> &TodoStore {
        &self.todos
    }

    pub fn routing(&self) -> &Arc<LocaleRouting> {
        &self.routing
    }

    pub fn storage(&self) -> &Arc<dyn StorageAdapter> {
        &self.storage
    }
}

impl fmt::Debug for AppContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppContext")
            .field("count", &self.counter.count())
            .field("todos", &self.todos.todos().len())
            .field("routing", &self.routing)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::RewriteDecision;

    #[test]
    fn contexts_are_isolated() {
        let a = AppContext::in_memory();
        let b = AppContext::in_memory();
        a.counter().increment();
        a.todos().add_todo("only in a").unwrap();

        assert_eq!(b.counter().count(), 0);
        assert!(b.todos().todos().is_empty());
    }

    #[test]
    fn clones_share_stores() {
        let app = AppContext::in_memory();
        let clone = app.clone();
        clone.counter().increment_by_amount(3);
        assert_eq!(app.counter().count(), 3);
    }

    #[test]
    fn config_drives_routing_and_key() {
        let config = AppConfig::from_toml_str(
            r#"
            [locales]
            supported = ["en", "de"]
            default = "de"

            [persist]
            todo_key = "custom-todos"
            "#,
        )
        .unwrap();
        let storage = MemoryStorage::new();
        let app = AppContext::new(&config, Arc::new(storage.clone())).unwrap();

        assert_eq!(
            app.routing().decide("/", Some("fr")),
            RewriteDecision::Redirect {
                to: "/de".to_string()
            }
        );

        app.todos().add_todo("x").unwrap();
        assert!(storage.get_item("custom-todos").unwrap().is_some());
    }

    #[test]
    fn file_storage_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::from_toml_str(&format!(
            "[storage]\ndir = {:?}\n",
            dir.path().display().to_string()
        ))
        .unwrap();

        let first = AppContext::from_config(&config).unwrap();
        first.todos().add_todo("on disk").unwrap();

        let second = AppContext::from_config(&config).unwrap();
        assert_eq!(second.todos().todos()[0].text, "on disk");
    }
}

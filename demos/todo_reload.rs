//! Persisted todo list that survives a process restart.
//!
//! Run it twice: the second run starts with the items the first one left.
//!
//! ```text
//! cargo run --example todo_reload -- /tmp/shelf-demo
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use shelf::stores::{TodoStore, TODO_STORAGE_KEY};
use shelf::{AppConfig, AppContext, FileStorage, StorageAdapter};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    shelf::logging::init();

    let dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join("shelf-demo"));
    println!("=== Todo Reload (storage: {}) ===\n", dir.display());

    let storage: Arc<dyn StorageAdapter> = Arc::new(FileStorage::new(&dir));
    let app = AppContext::new(&AppConfig::default(), Arc::clone(&storage))?;
    let todos = app.todos();

    println!("Loaded {} item(s):", todos.todos().len());
    for todo in todos.todos() {
        println!("   [{}] {}", if todo.completed { "x" } else { " " }, todo.text);
    }

    let _sub = todos.store().subscribe(|next, _prev| {
        println!("   [Saved] {} item(s)", next.todos.len());
    });

    println!("\nAdding two items and completing the first");
    let first = todos.add_todo("write the demo")?;
    todos.add_todo("run it again")?;
    todos.toggle_todo(&first);

    if let Err(err) = todos.add_todo("   ") {
        println!("Rejected blank item: {err}");
    }

    println!("\nClearing completed items");
    todos.clear_completed();
    println!("{} remaining", todos.remaining());

    // A second store over the same storage sees everything written so far.
    let reloaded = TodoStore::persisted(storage, TODO_STORAGE_KEY);
    println!(
        "\nReloaded store: hydrated={} items={}",
        reloaded.has_hydrated(),
        reloaded.todos().len()
    );

    Ok(())
}

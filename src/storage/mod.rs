//! Key-value storage adapters used by the persistence middleware.

mod adapter;
mod error;
mod file;
mod memory;

pub use adapter::StorageAdapter;
pub use error::StorageError;
pub use file::FileStorage;
pub use memory::MemoryStorage;

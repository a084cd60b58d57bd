//! Persistence middleware.
//!
//! Wraps store creation so that the store starts from the state found in a
//! [`StorageAdapter`](crate::storage::StorageAdapter) and writes every commit
//! back to it.

mod envelope;
mod error;
mod middleware;

pub use envelope::Envelope;
pub use error::PersistError;
pub use middleware::{persist, ErrorSink, Persist, PersistHandle, PersistOptions};

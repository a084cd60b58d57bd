//! Application-level wiring.

mod context;

pub use context::AppContext;

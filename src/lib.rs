//! # Shelf
//!
//! Persisted reactive stores and request-time locale routing.
//!
//! Shelf provides two pieces that both derive and keep shared state outside
//! of any render tree:
//!
//! ## Stores
//!
//! Observable state containers with selector-based subscription:
//! - `Store<S>` - State container; commits notify listeners in order
//! - `Middleware` - Decorators around store creation (logging, persistence)
//! - `persist` - Hydrates a store from a `StorageAdapter` and writes back every commit
//!
//! ## Locale routing
//!
//! Per-request decisions for locale-prefixed URLs:
//! - `negotiate` - Best supported locale for an `Accept-Language` header
//! - `LocaleRouting` - Passthrough or redirect under the negotiated locale
//! - `routing::http` - axum middleware applying the decision (`http` feature)

pub mod app;
pub mod config;
pub mod locale;
pub mod logging;
pub mod persist;
pub mod routing;
pub mod storage;
pub mod store;
pub mod stores;

// Re-export main types for convenience
pub use app::AppContext;
pub use config::{AppConfig, ConfigError};
pub use locale::{negotiate, LocaleSet};
pub use persist::{persist, PersistError, PersistHandle};
pub use routing::{decide, LocaleRouting, RewriteDecision};
pub use storage::{FileStorage, MemoryStorage, StorageAdapter, StorageError};
pub use store::{Store, Subscription};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_works() {
        // Basic smoke test
        let store = Store::new(0);
        assert_eq!(*store.get(), 0);
        store.set(42);
        assert_eq!(*store.get(), 42);

        assert_eq!(negotiate(Some("en"), &["zh_CN", "en"], "zh_CN"), "en");
    }
}

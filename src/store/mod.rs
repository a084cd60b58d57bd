//! The store engine.
//!
//! A [`Store`] owns one state value. Updates produce a new value that is
//! committed only when it differs from the current one, and every commit is
//! delivered to listeners in registration order. Creation goes through an
//! optional [`Middleware`] chain.

mod locks;
mod middleware;
mod store;
mod subscription;

pub use middleware::{logger, Creator, Logger, Middleware};
pub use store::{Partial, State, Store, StoreBuilder, WeakStore};
pub use subscription::Subscription;

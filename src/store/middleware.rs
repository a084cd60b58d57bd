use std::fmt;

use super::store::{State, Store};

/// The "create" capability: turns an initial state into a live store.
pub struct Creator<S> {
    create: Box<dyn FnOnce(S) -> Store<S>>,
}

impl<S: State> Creator<S> {
    /// Wrap a creation function.
    pub fn new<F>(create: F) -> Self
    where
        F: FnOnce(S) -> Store<S> + 'static,
    {
        Self {
            create: Box::new(create),
        }
    }

    /// Plain store creation with no decoration.
    pub fn base() -> Self {
        Self::new(Store::new)
    }

    /// Run creation with `initial` as the starting state.
    pub fn create(self, initial: S) -> Store<S> {
        (self.create)(initial)
    }
}

/// A store decorator.
///
/// A middleware receives the next creator in the chain and returns a creator
/// that wraps it. It may change the initial state before calling through
/// (hydration) and may register commit hooks on the created store
/// (persistence, logging). The base engine knows nothing about it.
pub trait Middleware<S: State> {
    fn wrap(self: Box<Self>, next: Creator<S>) -> Creator<S>;
}

/// Traces every commit at debug level.
#[derive(Clone, Debug)]
pub struct Logger {
    name: &'static str,
}

/// Middleware that logs each commit under the given store name.
pub fn logger(name: &'static str) -> Logger {
    Logger { name }
}

impl<S: State + fmt::Debug> Middleware<S> for Logger {
    fn wrap(self: Box<Self>, next: Creator<S>) -> Creator<S> {
        let name = self.name;
        Creator::new(move |initial| {
            let store = next.create(initial);
            store.add_commit_hook(move |next, prev| {
                tracing::debug!(store = name, ?prev, ?next, "state committed");
            });
            store
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Records the order it was applied in and offsets the initial state.
    struct Tag {
        label: &'static str,
        offset: i32,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    impl Middleware<i32> for Tag {
        fn wrap(self: Box<Self>, next: Creator<i32>) -> Creator<i32> {
            Creator::new(move |initial| {
                self.log.lock().unwrap().push(self.label);
                next.create(initial + self.offset)
            })
        }
    }

    #[test]
    fn first_middleware_is_outermost() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let store = Store::builder(0)
            .with(Tag {
                label: "outer",
                offset: 1,
                log: log.clone(),
            })
            .with(Tag {
                label: "inner",
                offset: 10,
                log: log.clone(),
            })
            .build();

        assert_eq!(*log.lock().unwrap(), vec!["outer", "inner"]);
        assert_eq!(*store.get(), 11);
        assert_eq!(*store.get_initial_state(), 11);
    }

    #[test]
    fn builder_without_middleware_is_plain_store() {
        let store = Store::builder(3).build();
        store.set(4);
        assert_eq!(*store.get(), 4);
    }

    #[test]
    fn logger_passes_state_through() {
        let store = Store::builder(vec![1]).with(logger("numbers")).build();
        store.update(|v: &Vec<i32>| {
            let mut next = v.clone();
            next.push(2);
            next
        });
        assert_eq!(*store.get(), vec![1, 2]);
    }
}

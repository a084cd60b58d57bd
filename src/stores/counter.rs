use serde::{Deserialize, Serialize};

use crate::store::{logger, Store};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterState {
    pub count: i64,
}

/// A counter. Arithmetic saturates, so every action is total.
#[derive(Clone, Debug)]
pub struct CounterStore {
    store: Store<CounterState>,
}

impl Default for CounterStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CounterStore {
    /// A counter at zero, logging its commits.
    pub fn new() -> Self {
        Self::from_store(
            Store::builder(CounterState::default())
                .with(logger("counter"))
                .build(),
        )
    }

    /// Drive an existing store, for example one built with persistence.
    pub fn from_store(store: Store<CounterState>) -> Self {
        Self { store }
    }

    /// The underlying store, for subscribing.
    pub fn store(&self) -> &Store<CounterState> {
        &self.store
    }

    /// Current count.
    pub fn count(&self) -> i64 {
        self.store.read(|s| s.count)
    }

    /// Add one.
    pub fn increment(&self) {
        self.increment_by_amount(1);
    }

    /// Subtract one.
    pub fn decrement(&self) {
        self.increment_by_amount(-1);
    }

    /// Back to zero.
    pub fn reset(&self) {
        self.store.set(CounterState::default());
    }

    /// Add `amount`, which may be negative.
    pub fn increment_by_amount(&self, amount: i64) {
        self.store.update(|s| CounterState {
            count: s.count.saturating_add(amount),
        });
    }
}

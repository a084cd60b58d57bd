use std::fmt;
use std::sync::Mutex;

use super::locks::lock;

type Cancel = Box<dyn FnOnce() + Send>;

/// Handle to a registered store listener.
///
/// Calling [`unsubscribe`](Subscription::unsubscribe) removes exactly the
/// listener this handle was returned for. It can be called any number of
/// times. Dropping the handle unsubscribes as well, so an observer that owns
/// its subscription is deregistered on teardown.
#[must_use = "dropping a Subscription unsubscribes its listener"]
pub struct Subscription {
    cancel: Mutex<Option<Cancel>>,
}

impl Subscription {
    pub(crate) fn new<F>(cancel: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            cancel: Mutex::new(Some(Box::new(cancel))),
        }
    }

    /// Remove the listener. Later calls do nothing.
    pub fn unsubscribe(&self) {
        let cancel = lock(&self.cancel).take();
        if let Some(cancel) = cancel {
            cancel();
        }
    }

    /// Whether the listener is still registered through this handle.
    pub fn is_active(&self) -> bool {
        lock(&self.cancel).is_some()
    }

    /// Keep the listener registered for the rest of the store's life.
    pub fn detach(self) {
        lock(&self.cancel).take();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

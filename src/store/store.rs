use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock, Weak};

use super::locks::{lock, read, write};
use super::middleware::{Creator, Middleware};
use super::subscription::Subscription;

type Listener<S> = Box<dyn Fn(&S, &S) + Send + Sync>;
type CommitHook<S> = Box<dyn Fn(&S, &S) + Send + Sync>;

/// Values a store can hold.
///
/// Equality decides whether an update is a commit: an update that produces a
/// state equal to the current one is dropped and nobody is notified.
pub trait State: Clone + PartialEq + Send + Sync + 'static {}

impl<T> State for T where T: Clone + PartialEq + Send + Sync + 'static {}

/// A partial update that is merged into the current state to produce the next.
///
/// Every state is a partial of itself (whole replacement). Stores with wider
/// states can define patch types that only touch some fields.
pub trait Partial<S> {
    fn merge_into(self, current: &S) -> S;
}

impl<S> Partial<S> for S {
    fn merge_into(self, _current: &S) -> S {
        self
    }
}

struct ListenerEntry<S> {
    id: u64,
    active: AtomicBool,
    callback: Listener<S>,
}

struct Pending<S> {
    next: Arc<S>,
    prev: Arc<S>,
    listeners: Vec<Arc<ListenerEntry<S>>>,
}

struct Delivery<S> {
    running: bool,
    queue: VecDeque<Pending<S>>,
}

struct StoreInner<S> {
    state: RwLock<Arc<S>>,
    initial: Arc<S>,
    // Serializes compute + commit + hooks so hooks observe commits in order.
    commit: Mutex<()>,
    listeners: RwLock<Vec<Arc<ListenerEntry<S>>>>,
    hooks: RwLock<Vec<CommitHook<S>>>,
    delivery: Mutex<Delivery<S>>,
    next_listener: AtomicU64,
}

impl<S> StoreInner<S> {
    fn remove_listener(&self, id: u64) {
        let mut listeners = write(&self.listeners);
        if let Some(pos) = listeners.iter().position(|entry| entry.id == id) {
            let entry = listeners.remove(pos);
            // A delivery pass that already snapshotted this entry skips it.
            entry.active.store(false, Ordering::Release);
        }
    }

    /// Queue a commit for delivery and drain the queue unless a pass is
    /// already running (re-entrant `set` from a listener, or another thread).
    fn deliver(&self, pending: Pending<S>) {
        {
            let mut delivery = lock(&self.delivery);
            delivery.queue.push_back(pending);
            if delivery.running {
                return;
            }
            delivery.running = true;
        }

        let _running = RunningGuard {
            delivery: &self.delivery,
        };
        loop {
            let pending = {
                let mut delivery = lock(&self.delivery);
                match delivery.queue.pop_front() {
                    Some(pending) => pending,
                    None => {
                        delivery.running = false;
                        break;
                    }
                }
            };
            for entry in &pending.listeners {
                if entry.active.load(Ordering::Acquire) {
                    (entry.callback)(&pending.next, &pending.prev);
                }
            }
        }
    }
}

/// Releases the delivery slot if a listener panics mid-pass.
struct RunningGuard<'a, S> {
    delivery: &'a Mutex<Delivery<S>>,
}

impl<S> Drop for RunningGuard<'_, S> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            lock(self.delivery).running = false;
        }
    }
}

/// An observable state container.
///
/// The state is held behind an `Arc` that is replaced on every commit, so
/// observers can compare snapshots with [`Arc::ptr_eq`] to detect change.
/// Cloning a store yields another handle to the same state.
///
/// # Examples
///
/// ```
/// use shelf::Store;
///
/// let store = Store::new(0);
/// store.update(|n| n + 1);
/// assert_eq!(*store.get(), 1);
/// ```
pub struct Store<S> {
    inner: Arc<StoreInner<S>>,
}

impl<S: State> Store<S> {
    /// Create a new store with the given initial state.
    pub fn new(initial: S) -> Self {
        let initial = Arc::new(initial);
        Self {
            inner: Arc::new(StoreInner {
                state: RwLock::new(Arc::clone(&initial)),
                initial,
                commit: Mutex::new(()),
                listeners: RwLock::new(Vec::new()),
                hooks: RwLock::new(Vec::new()),
                delivery: Mutex::new(Delivery {
                    running: false,
                    queue: VecDeque::new(),
                }),
                next_listener: AtomicU64::new(0),
            }),
        }
    }

    /// Start building a store whose creation runs through middleware.
    pub fn builder(initial: S) -> StoreBuilder<S> {
        StoreBuilder {
            initial,
            middleware: Vec::new(),
        }
    }

    /// Current state snapshot.
    pub fn get(&self) -> Arc<S> {
        Arc::clone(&read(&self.inner.state))
    }

    /// The state the store was created with.
    pub fn get_initial_state(&self) -> Arc<S> {
        Arc::clone(&self.inner.initial)
    }

    /// Read state through a closure without cloning the `Arc`.
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&S) -> R,
    {
        let state = read(&self.inner.state);
        f(&state)
    }

    /// Merge a partial state into the current one.
    ///
    /// Returns whether a commit happened.
    pub fn set<P>(&self, partial: P) -> bool
    where
        P: Partial<S>,
    {
        self.update(move |current| partial.merge_into(current))
    }

    /// Compute the next state from the previous one.
    ///
    /// If the result equals the current state nothing is committed and no
    /// listener runs. Returns whether a commit happened.
    pub fn update<F, P>(&self, f: F) -> bool
    where
        F: FnOnce(&S) -> P,
        P: Partial<S>,
    {
        match self.try_update(|current| Ok::<_, std::convert::Infallible>(f(current))) {
            Ok(committed) => committed,
            Err(never) => match never {},
        }
    }

    /// Fallible variant of [`update`](Store::update).
    ///
    /// When `f` returns an error the store keeps its previous state and the
    /// error is handed back to the caller.
    pub fn try_update<F, P, E>(&self, f: F) -> Result<bool, E>
    where
        F: FnOnce(&S) -> Result<P, E>,
        P: Partial<S>,
    {
        let pending = {
            let _commit = lock(&self.inner.commit);
            let prev = self.get();
            let next = f(&prev)?.merge_into(&prev);
            if next == *prev {
                return Ok(false);
            }

            let next = Arc::new(next);
            *write(&self.inner.state) = Arc::clone(&next);

            for hook in read(&self.inner.hooks).iter() {
                hook(&next, &prev);
            }

            Pending {
                next,
                prev,
                listeners: read(&self.inner.listeners).clone(),
            }
        };

        self.inner.deliver(pending);
        Ok(true)
    }

    /// Subscribe to state changes.
    ///
    /// The listener receives `(next, prev)` once per commit, in registration
    /// order. Listeners added while a commit is being delivered first hear
    /// about the following commit.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&S, &S) + Send + Sync + 'static,
    {
        let id = self.inner.next_listener.fetch_add(1, Ordering::Relaxed);
        write(&self.inner.listeners).push(Arc::new(ListenerEntry {
            id,
            active: AtomicBool::new(true),
            callback: Box::new(listener),
        }));

        let inner = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = inner.upgrade() {
                inner.remove_listener(id);
            }
        })
    }

    /// Subscribe to a slice of the state.
    ///
    /// The listener receives `(next_slice, prev_slice)` only when the selected
    /// slice changes.
    pub fn subscribe_select<T, Sel, F>(&self, selector: Sel, listener: F) -> Subscription
    where
        T: PartialEq,
        Sel: Fn(&S) -> T + Send + Sync + 'static,
        F: Fn(&T, &T) + Send + Sync + 'static,
    {
        self.subscribe(move |next, prev| {
            let next = selector(next);
            let prev = selector(prev);
            if next != prev {
                listener(&next, &prev);
            }
        })
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        read(&self.inner.listeners).len()
    }

    /// Register a hook that runs after every commit, before listeners.
    ///
    /// Hooks run while the commit is still serialized, so they see commits
    /// strictly in order. This is the interception point middleware uses.
    pub fn add_commit_hook<F>(&self, hook: F)
    where
        F: Fn(&S, &S) + Send + Sync + 'static,
    {
        write(&self.inner.hooks).push(Box::new(hook));
    }

    /// A handle that does not keep the store alive.
    pub fn downgrade(&self) -> WeakStore<S> {
        WeakStore {
            inner: Arc::downgrade(&self.inner),
        }
    }
}

impl<S> Clone for Store<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: State + fmt::Debug> fmt::Debug for Store<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store").field("state", &self.get()).finish()
    }
}

/// Non-owning store handle.
pub struct WeakStore<S> {
    inner: Weak<StoreInner<S>>,
}

impl<S> WeakStore<S> {
    /// The store, if any strong handle is still alive.
    pub fn upgrade(&self) -> Option<Store<S>> {
        self.inner.upgrade().map(|inner| Store { inner })
    }
}

impl<S> Clone for WeakStore<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

/// Collects middleware and creates the store.
pub struct StoreBuilder<S> {
    initial: S,
    middleware: Vec<Box<dyn Middleware<S>>>,
}

impl<S: State> StoreBuilder<S> {
    /// Add a middleware. The first one added is the outermost wrapper.
    pub fn with<M>(mut self, middleware: M) -> Self
    where
        M: Middleware<S> + 'static,
    {
        self.middleware.push(Box::new(middleware));
        self
    }

    /// Run the middleware chain and create the store.
    pub fn build(self) -> Store<S> {
        let creator = self
            .middleware
            .into_iter()
            .rev()
            .fold(Creator::base(), |next, middleware| middleware.wrap(next));
        creator.create(self.initial)
    }
}

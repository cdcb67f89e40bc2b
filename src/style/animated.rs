//! Animated (shared) style values.
//!
//! An animated value is a live reference with a subscription mechanism. The
//! resolver stores its current snapshot on the node and registers a listener
//! that patches the node's field whenever the value changes, without any
//! reconciliation pass in between.
//!
//! Listeners run on whichever thread updates the value, which is normally the
//! render thread.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock};

use super::value::StyleValue;

/// Identifies a registered listener on one animated value.
pub type ListenerId = u64;

/// Callback invoked with each new value.
pub type Listener = Arc<dyn Fn(&StyleValue) + Send + Sync>;

/// A value that can change outside of a reconciliation pass.
///
/// Implementations must not hold internal locks while invoking listeners:
/// a listener takes the node's write lock, and the node may call back into
/// `add_listener` / `remove_listener` while holding it.
pub trait AnimatedValue: Send + Sync {
    /// The current value.
    fn snapshot(&self) -> StyleValue;

    /// Register a listener and return its id.
    fn add_listener(&self, listener: Listener) -> ListenerId;

    /// Unregister a listener. Unknown ids are ignored.
    fn remove_listener(&self, id: ListenerId);
}

// =============================================================================
// SharedValue
// =============================================================================

/// Thread-safe animated value.
///
/// # Example
///
/// ```
/// use flexcanvas::style::{AnimatedValue, SharedValue, StyleValue};
///
/// let width = SharedValue::new(10.0);
/// width.set(20.0);
/// assert_eq!(width.snapshot(), StyleValue::Number(20.0));
/// ```
pub struct SharedValue {
    value: RwLock<StyleValue>,
    listeners: Mutex<Vec<(ListenerId, Listener)>>,
    next_id: AtomicU64,
}

impl SharedValue {
    pub fn new(initial: impl Into<StyleValue>) -> Arc<Self> {
        Arc::new(Self {
            value: RwLock::new(initial.into()),
            listeners: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn get(&self) -> StyleValue {
        self.value.read().clone()
    }

    /// Store a new value and notify every listener.
    ///
    /// A panicking listener is logged and skipped; the remaining listeners
    /// still run.
    pub fn set(&self, value: impl Into<StyleValue>) {
        let value = value.into();
        *self.value.write() = value.clone();

        let listeners: Vec<(ListenerId, Listener)> = self.listeners.lock().clone();
        for (id, listener) in listeners {
            let result = panic::catch_unwind(AssertUnwindSafe(|| listener(&value)));
            if result.is_err() {
                tracing::error!(listener = id, "animated value listener panicked");
            }
        }
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }
}

impl AnimatedValue for SharedValue {
    fn snapshot(&self) -> StyleValue {
        self.get()
    }

    fn add_listener(&self, listener: Listener) -> ListenerId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners.lock().push((id, listener));
        id
    }

    fn remove_listener(&self, id: ListenerId) {
        self.listeners.lock().retain(|(lid, _)| *lid != id);
    }
}

impl fmt::Debug for SharedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedValue")
            .field("value", &*self.value.read())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

// =============================================================================
// Subscription
// =============================================================================

/// A registered listener. Dropping it unregisters the listener.
pub struct Subscription {
    source: Arc<dyn AnimatedValue>,
    id: ListenerId,
}

impl Subscription {
    pub fn new(source: Arc<dyn AnimatedValue>, listener: Listener) -> Self {
        let id = source.add_listener(listener);
        Self { source, id }
    }

    pub fn source(&self) -> &Arc<dyn AnimatedValue> {
        &self.source
    }

    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// True if this subscription listens to `source`.
    pub fn is_for(&self, source: &Arc<dyn AnimatedValue>) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.source), Arc::as_ptr(source))
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.source.remove_listener(self.id);
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

//! Teardown and subscription handles.
//!
//! A producer returns a [`Teardown`] describing how to release whatever it
//! acquired. `subscribe` wraps it in a [`Subscription`], which owns the
//! "already torn down" flag shared with the producer's [`Subscriber`].
//!
//! [`Subscriber`]: crate::Subscriber

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

/// Release action returned by a producer.
///
/// The action runs at most once. An empty teardown releases nothing.
pub struct Teardown {
    action: Option<Box<dyn FnOnce() + Send>>,
}

impl Teardown {
    /// Create a teardown that runs `action` when the subscription ends.
    pub fn new<F>(action: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            action: Some(Box::new(action)),
        }
    }

    /// A teardown with nothing to release.
    pub fn empty() -> Self {
        Self { action: None }
    }

    /// Check if this teardown carries no action.
    pub fn is_empty(&self) -> bool {
        self.action.is_none()
    }

    /// Run the action, consuming the teardown.
    pub fn run(mut self) {
        if let Some(action) = self.action.take() {
            action();
        }
    }
}

impl Default for Teardown {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Teardown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Teardown")
            .field("empty", &self.is_empty())
            .finish()
    }
}

impl From<Subscription> for Teardown {
    fn from(subscription: Subscription) -> Self {
        Teardown::new(move || subscription.unsubscribe())
    }
}

/// Handle returned by every `subscribe` call.
///
/// `unsubscribe` closes the subscription, so the subscriber delivers nothing
/// more, and then runs the producer's teardown. Repeated calls are no-ops.
/// Dropping a `Subscription` does not unsubscribe.
#[derive(Clone)]
pub struct Subscription {
    closed: Arc<AtomicBool>,
    teardown: Arc<Mutex<Option<Teardown>>>,
}

impl Subscription {
    pub(crate) fn new(closed: Arc<AtomicBool>, teardown: Teardown) -> Self {
        Self {
            closed,
            teardown: Arc::new(Mutex::new(Some(teardown))),
        }
    }

    /// A handle that is already torn down.
    pub fn closed() -> Self {
        Self {
            closed: Arc::new(AtomicBool::new(true)),
            teardown: Arc::new(Mutex::new(None)),
        }
    }

    /// Stop delivery and release the producer's resources.
    pub fn unsubscribe(&self) {
        self.closed.store(true, Ordering::SeqCst);
        // Take before running: the action may re-enter this handle.
        let teardown = self.teardown.lock().take();
        if let Some(teardown) = teardown {
            tracing::trace!("unsubscribe");
            teardown.run();
        }
    }

    /// Whether delivery on this subscription has stopped, either through
    /// `unsubscribe` or a terminal signal.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Unsubscribes when dropped.
pub(crate) struct SubscriptionGuard(pub(crate) Subscription);

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        self.0.unsubscribe();
    }
}

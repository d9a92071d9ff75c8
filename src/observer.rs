//! Observer contract and the normalized subscriber handed to producers.
//!
//! Callers subscribe with any of three observer shapes:
//!
//! - a function-only observer (`Observable::subscribe_fn`)
//! - a partial observer: a [`Callbacks`] value or an [`Observer`] impl that
//!   overrides only some methods
//! - a full observer: an [`Observer`] impl overriding all three methods
//!
//! Whatever the shape, `subscribe` resolves it once into a [`Subscriber`],
//! the only observer type a producer ever sees.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A sink for the three signals of an observable.
///
/// Every method defaults to a no-op, so implementors override only the
/// signals they care about. Methods take `&self`; observers that keep state
/// use interior mutability.
///
/// # Example
///
/// ```rust
/// use coldstream::Observer;
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// #[derive(Default)]
/// struct Counter {
///     seen: AtomicUsize,
/// }
///
/// impl Observer<u32, String> for Counter {
///     fn next(&self, _value: u32) {
///         self.seen.fetch_add(1, Ordering::SeqCst);
///     }
/// }
/// ```
pub trait Observer<T, E>: Send + Sync {
    /// Receive the next value.
    fn next(&self, _value: T) {}

    /// Receive a terminal error.
    fn error(&self, _err: E) {}

    /// Receive the terminal completion signal.
    fn complete(&self) {}
}

impl<T, E, O> Observer<T, E> for Arc<O>
where
    O: Observer<T, E> + ?Sized,
{
    fn next(&self, value: T) {
        (**self).next(value)
    }

    fn error(&self, err: E) {
        (**self).error(err)
    }

    fn complete(&self) {
        (**self).complete()
    }
}

type NextFn<T> = Box<dyn Fn(T) + Send + Sync>;
type ErrorFn<E> = Box<dyn Fn(E) + Send + Sync>;
type CompleteFn = Box<dyn Fn() + Send + Sync>;

/// Closure-based observer. Callbacks left unset are no-ops.
///
/// # Example
///
/// ```rust
/// use coldstream::{Callbacks, Observable};
///
/// let observable = Observable::<i32, String>::of([1, 2, 3]);
/// observable.subscribe(
///     Callbacks::new()
///         .on_next(|v| println!("value {v}"))
///         .on_complete(|| println!("done")),
/// );
/// ```
pub struct Callbacks<T, E> {
    next: Option<NextFn<T>>,
    error: Option<ErrorFn<E>>,
    complete: Option<CompleteFn>,
}

impl<T, E> Callbacks<T, E> {
    /// Create an observer with every callback unset.
    pub fn new() -> Self {
        Self {
            next: None,
            error: None,
            complete: None,
        }
    }

    /// Set the `next` callback.
    pub fn on_next<F>(mut self, f: F) -> Self
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        self.next = Some(Box::new(f));
        self
    }

    /// Set the `error` callback.
    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: Fn(E) + Send + Sync + 'static,
    {
        self.error = Some(Box::new(f));
        self
    }

    /// Set the `complete` callback.
    pub fn on_complete<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.complete = Some(Box::new(f));
        self
    }
}

impl<T, E> Default for Callbacks<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> Observer<T, E> for Callbacks<T, E> {
    fn next(&self, value: T) {
        if let Some(f) = &self.next {
            f(value);
        }
    }

    fn error(&self, err: E) {
        if let Some(f) = &self.error {
            f(err);
        }
    }

    fn complete(&self) {
        if let Some(f) = &self.complete {
            f();
        }
    }
}

impl<T, E> fmt::Debug for Callbacks<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("next", &self.next.is_some())
            .field("error", &self.error.is_some())
            .field("complete", &self.complete.is_some())
            .finish()
    }
}

struct SubscriberInner<T, E> {
    observer: Box<dyn Observer<T, E>>,
    closed: Arc<AtomicBool>,
}

/// The normalized observer a producer pushes into.
///
/// Cloning yields another handle to the same subscriber. Once the owning
/// subscription is closed, by `unsubscribe` or by a first `error` or
/// `complete`, every further signal is dropped.
pub struct Subscriber<T, E> {
    inner: Arc<SubscriberInner<T, E>>,
}

impl<T, E> Subscriber<T, E> {
    pub(crate) fn new<O>(observer: O) -> Self
    where
        O: Observer<T, E> + 'static,
    {
        Self {
            inner: Arc::new(SubscriberInner {
                observer: Box::new(observer),
                closed: Arc::new(AtomicBool::new(false)),
            }),
        }
    }

    pub(crate) fn closed_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.inner.closed)
    }

    /// Push a value.
    pub fn next(&self, value: T) {
        if self.is_closed() {
            tracing::debug!("next dropped on closed subscriber");
            return;
        }
        self.inner.observer.next(value);
    }

    /// Signal a terminal error.
    pub fn error(&self, err: E) {
        if self.inner.closed.swap(true, Ordering::SeqCst) {
            tracing::debug!("error dropped on closed subscriber");
            return;
        }
        self.inner.observer.error(err);
    }

    /// Signal completion.
    pub fn complete(&self) {
        if self.inner.closed.swap(true, Ordering::SeqCst) {
            tracing::debug!("complete dropped on closed subscriber");
            return;
        }
        self.inner.observer.complete();
    }

    /// Whether this subscriber still delivers signals.
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }
}

impl<T, E> Clone for Subscriber<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T, E> fmt::Debug for Subscriber<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscriber")
            .field("closed", &self.is_closed())
            .finish()
    }
}

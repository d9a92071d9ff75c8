//! The `Observable` type and its subscription core.
//!
//! An observable wraps exactly one producer. Building one does no work;
//! every `subscribe` call runs the producer again against a fresh
//! [`Subscriber`], so observables are cold and unicast.

use std::fmt;
use std::sync::Arc;

use crate::observer::{Callbacks, Observer, Subscriber};
use crate::subscription::{Subscription, Teardown};

type Producer<T, E> = dyn Fn(Subscriber<T, E>) -> Teardown + Send + Sync;

/// A lazy, cold, push-based producer of `T` values that may fail with `E`.
///
/// Cloning an observable is cheap and shares the producer, not any
/// subscription state.
///
/// # Example
///
/// ```rust
/// use coldstream::{Observable, Teardown};
///
/// let numbers = Observable::<i32, String>::new(|subscriber| {
///     subscriber.next(1);
///     subscriber.next(2);
///     subscriber.complete();
///     Teardown::empty()
/// });
///
/// let subscription = numbers.subscribe_fn(|v| println!("got {v}"));
/// assert!(subscription.is_closed());
/// ```
pub struct Observable<T, E> {
    producer: Arc<Producer<T, E>>,
}

impl<T, E> Observable<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Create an observable from a producer.
    ///
    /// The producer receives the normalized subscriber and returns the
    /// teardown that releases whatever it acquired.
    pub fn new<F>(producer: F) -> Self
    where
        F: Fn(Subscriber<T, E>) -> Teardown + Send + Sync + 'static,
    {
        Self {
            producer: Arc::new(producer),
        }
    }

    /// Subscribe with an observer object.
    ///
    /// Runs the producer synchronously. A panic raised by the producer, or
    /// by any operator callback it reaches, propagates to the caller instead
    /// of being delivered as an `error`.
    pub fn subscribe<O>(&self, observer: O) -> Subscription
    where
        O: Observer<T, E> + 'static,
    {
        let subscriber = Subscriber::new(observer);
        let closed = subscriber.closed_flag();
        tracing::trace!("subscribe");
        let teardown = (self.producer)(subscriber);
        Subscription::new(closed, teardown)
    }

    /// Subscribe with only a `next` callback. Errors are discarded.
    pub fn subscribe_fn<N>(&self, next: N) -> Subscription
    where
        N: Fn(T) + Send + Sync + 'static,
    {
        self.subscribe(Callbacks::new().on_next(next))
    }

    /// Subscribe with all three callbacks.
    pub fn subscribe_all<N, Er, C>(&self, next: N, error: Er, complete: C) -> Subscription
    where
        N: Fn(T) + Send + Sync + 'static,
        Er: Fn(E) + Send + Sync + 'static,
        C: Fn() + Send + Sync + 'static,
    {
        self.subscribe(
            Callbacks::new()
                .on_next(next)
                .on_error(error)
                .on_complete(complete),
        )
    }

    /// Hand an existing subscriber to this observable's producer.
    pub(crate) fn subscribe_subscriber(&self, subscriber: Subscriber<T, E>) -> Teardown {
        (self.producer)(subscriber)
    }
}

impl<T, E> Clone for Observable<T, E> {
    fn clone(&self) -> Self {
        Self {
            producer: Arc::clone(&self.producer),
        }
    }
}

impl<T, E> fmt::Debug for Observable<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable").finish_non_exhaustive()
    }
}

//! Constructors over discrete values and existing sources: `of` and `from`.
//!
//! `from` works on a closed set of source variants. Statically typed inputs
//! pick their variant through `From`; dynamically typed inputs go through
//! [`Source::classify`], which is the only place a value's shape is probed.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::error::{ObservableError, ObservableResult};
use crate::observable::Observable;
use crate::observer::Subscriber;
use crate::subscription::Teardown;

type IterFactory<T> = Arc<dyn Fn() -> Box<dyn Iterator<Item = T> + Send> + Send + Sync>;

/// Anything `Observable::from_source` can adapt.
pub enum Source<T, E> {
    /// An existing observable, subscribed to directly.
    Observable(Observable<T, E>),
    /// A re-startable iterable, drained in iteration order.
    Iterable(IterFactory<T>),
    /// An indexed sequence, drained by index.
    Sequence(Arc<[T]>),
}

/// The variant a [`Source`] was classified as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Wraps an observable
    Observable,
    /// Wraps an iterable
    Iterable,
    /// Wraps an indexed sequence
    Sequence,
}

impl<T, E> Source<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Wrap an iterable. It is cloned and re-iterated on every subscription.
    pub fn iterable<I>(iterable: I) -> Self
    where
        I: IntoIterator<Item = T> + Clone + Send + Sync + 'static,
        I::IntoIter: Send + 'static,
    {
        Source::Iterable(Arc::new(move || {
            Box::new(iterable.clone().into_iter()) as Box<dyn Iterator<Item = T> + Send>
        }))
    }
}

impl<T, E> Source<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Send + 'static,
{
    /// Classify a dynamically typed value.
    ///
    /// Observables take precedence, then the sequence shapes `Vec<T>`,
    /// `Box<[T]>` and `Arc<[T]>`. Anything else is rejected with
    /// [`ObservableError::NotConvertible`].
    pub fn classify(value: Box<dyn Any + Send>) -> ObservableResult<Self> {
        let value = match value.downcast::<Observable<T, E>>() {
            Ok(observable) => return Ok(Source::Observable(*observable)),
            Err(value) => value,
        };
        let value = match value.downcast::<Vec<T>>() {
            Ok(items) => return Ok(Source::Sequence((*items).into())),
            Err(value) => value,
        };
        let value = match value.downcast::<Box<[T]>>() {
            Ok(items) => return Ok(Source::Sequence((*items).into())),
            Err(value) => value,
        };
        match value.downcast::<Arc<[T]>>() {
            Ok(items) => Ok(Source::Sequence(*items)),
            Err(_) => Err(ObservableError::NotConvertible),
        }
    }
}

impl<T, E> Source<T, E> {
    /// Which variant this source is.
    pub fn kind(&self) -> SourceKind {
        match self {
            Source::Observable(_) => SourceKind::Observable,
            Source::Iterable(_) => SourceKind::Iterable,
            Source::Sequence(_) => SourceKind::Sequence,
        }
    }
}

impl<T, E> From<Observable<T, E>> for Source<T, E> {
    fn from(observable: Observable<T, E>) -> Self {
        Source::Observable(observable)
    }
}

impl<T, E> From<Vec<T>> for Source<T, E> {
    fn from(items: Vec<T>) -> Self {
        Source::Sequence(items.into())
    }
}

impl<T, E, const N: usize> From<[T; N]> for Source<T, E> {
    fn from(items: [T; N]) -> Self {
        Source::Sequence(Arc::from(Vec::from(items)))
    }
}

impl<T, E> From<Arc<[T]>> for Source<T, E> {
    fn from(items: Arc<[T]>) -> Self {
        Source::Sequence(items)
    }
}

impl<T, E> fmt::Debug for Source<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Source").field(&self.kind()).finish()
    }
}

fn drain<T, E>(subscriber: &Subscriber<T, E>, items: impl Iterator<Item = T>) {
    for item in items {
        if subscriber.is_closed() {
            return;
        }
        subscriber.next(item);
    }
    subscriber.complete();
}

impl<T, E> Observable<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Send + 'static,
{
    /// Emit every value in order, then complete, all before `subscribe`
    /// returns. The values are replayed for each subscription.
    ///
    /// # Example
    ///
    /// ```rust
    /// use coldstream::Observable;
    ///
    /// let letters = Observable::<&str, String>::of(["a", "b", "c"]);
    /// let subscription = letters.subscribe_fn(|v| println!("{v}"));
    /// assert!(subscription.is_closed());
    /// ```
    pub fn of<I>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let values: Arc<[T]> = values.into_iter().collect();
        Observable::new(move |subscriber: Subscriber<T, E>| {
            drain(&subscriber, values.iter().cloned());
            Teardown::empty()
        })
    }

    /// Adapt a [`Source`] into an observable.
    ///
    /// A wrapped observable is subscribed to directly and its teardown is
    /// returned; iterables and sequences are drained synchronously and have
    /// nothing to tear down.
    pub fn from_source(source: impl Into<Source<T, E>>) -> Self {
        match source.into() {
            Source::Observable(observable) => {
                Observable::new(move |subscriber| observable.subscribe_subscriber(subscriber))
            }
            Source::Iterable(factory) => Observable::new(move |subscriber: Subscriber<T, E>| {
                drain(&subscriber, factory());
                Teardown::empty()
            }),
            Source::Sequence(items) => Observable::new(move |subscriber: Subscriber<T, E>| {
                drain(&subscriber, (0..items.len()).map(|i| items[i].clone()));
                Teardown::empty()
            }),
        }
    }

    /// Classify a dynamically typed value and adapt it.
    ///
    /// Fails immediately with [`ObservableError::NotConvertible`] when the
    /// value is not a recognised source.
    pub fn try_from_any(value: Box<dyn Any + Send>) -> ObservableResult<Self> {
        Source::classify(value).map(|source| Self::from_source(source))
    }
}

//! Per-item operators: `filter`, `map`, `reduce`.
//!
//! Each operator returns a new observable whose producer subscribes to the
//! source with a derived observer. Nothing runs until that new observable is
//! subscribed, and its teardown is the source subscription's teardown.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::observable::Observable;
use crate::observer::{Observer, Subscriber};
use crate::subscription::Teardown;

struct FilterObserver<T, E, P> {
    downstream: Subscriber<T, E>,
    predicate: Arc<P>,
}

impl<T, E, P> Observer<T, E> for FilterObserver<T, E, P>
where
    P: Fn(&T) -> bool + Send + Sync,
{
    fn next(&self, value: T) {
        if (self.predicate)(&value) {
            self.downstream.next(value);
        }
    }

    fn error(&self, err: E) {
        self.downstream.error(err);
    }

    fn complete(&self) {
        self.downstream.complete();
    }
}

struct MapObserver<U, E, F> {
    downstream: Subscriber<U, E>,
    transform: Arc<F>,
}

impl<T, U, E, F> Observer<T, E> for MapObserver<U, E, F>
where
    F: Fn(T) -> U + Send + Sync,
{
    fn next(&self, value: T) {
        self.downstream.next((self.transform)(value));
    }

    fn error(&self, err: E) {
        self.downstream.error(err);
    }

    fn complete(&self) {
        self.downstream.complete();
    }
}

struct ReduceObserver<A, U, E, S, F> {
    downstream: Subscriber<U, E>,
    acc: Mutex<Option<A>>,
    step: Arc<S>,
    finish: Arc<F>,
}

impl<T, A, U, E, S, F> Observer<T, E> for ReduceObserver<A, U, E, S, F>
where
    A: Send,
    S: Fn(A, T) -> A + Send + Sync,
    F: Fn(A) -> Option<U> + Send + Sync,
{
    fn next(&self, value: T) {
        // The combiner runs outside the lock.
        let Some(acc) = self.acc.lock().take() else {
            return;
        };
        let acc = (self.step)(acc, value);
        *self.acc.lock() = Some(acc);
    }

    fn error(&self, err: E) {
        self.downstream.error(err);
    }

    fn complete(&self) {
        let acc = self.acc.lock().take();
        if let Some(result) = acc.and_then(|acc| (self.finish)(acc)) {
            self.downstream.next(result);
        }
        self.downstream.complete();
    }
}

impl<T, E> Observable<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Forward only the values for which `predicate` holds.
    ///
    /// # Example
    ///
    /// ```rust
    /// use coldstream::Observable;
    ///
    /// let evens = Observable::<i32, String>::of(1..=6).filter(|v| v % 2 == 0);
    /// evens.subscribe_fn(|v| assert_eq!(v % 2, 0));
    /// ```
    pub fn filter<P>(&self, predicate: P) -> Observable<T, E>
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let source = self.clone();
        let predicate = Arc::new(predicate);
        Observable::new(move |subscriber: Subscriber<T, E>| {
            let observer = FilterObserver {
                downstream: subscriber,
                predicate: Arc::clone(&predicate),
            };
            Teardown::from(source.subscribe(observer))
        })
    }

    /// Forward `transform(value)` for every value.
    pub fn map<U, F>(&self, transform: F) -> Observable<U, E>
    where
        U: Send + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        let source = self.clone();
        let transform = Arc::new(transform);
        Observable::new(move |subscriber: Subscriber<U, E>| {
            let observer = MapObserver {
                downstream: subscriber,
                transform: Arc::clone(&transform),
            };
            Teardown::from(source.subscribe(observer))
        })
    }

    /// Fold every value into one, seeding the accumulator with the first.
    ///
    /// The result is pushed once when the source completes, followed by
    /// `complete`. A source that completes without values produces only the
    /// completion.
    pub fn reduce<F>(&self, combiner: F) -> Observable<T, E>
    where
        F: Fn(T, T) -> T + Send + Sync + 'static,
    {
        self.accumulate(
            || None,
            move |acc: Option<T>, value| {
                Some(match acc {
                    Some(acc) => combiner(acc, value),
                    None => value,
                })
            },
            |acc| acc,
        )
    }

    /// Fold every value into `initial`.
    ///
    /// Each subscription starts from its own clone of `initial`, so the
    /// result is pushed even when the source completes without values.
    ///
    /// # Example
    ///
    /// ```rust
    /// use coldstream::Observable;
    ///
    /// let total = Observable::<i32, String>::of([1, 2, 3]).reduce_with(10, |acc, v| acc + v);
    /// total.subscribe_fn(|sum| assert_eq!(sum, 16));
    /// ```
    pub fn reduce_with<A, F>(&self, initial: A, combiner: F) -> Observable<A, E>
    where
        A: Clone + Send + Sync + 'static,
        F: Fn(A, T) -> A + Send + Sync + 'static,
    {
        self.accumulate(move || initial.clone(), combiner, Some)
    }

    fn accumulate<A, U, I, S, F>(&self, init: I, step: S, finish: F) -> Observable<U, E>
    where
        A: Send + 'static,
        U: Send + 'static,
        I: Fn() -> A + Send + Sync + 'static,
        S: Fn(A, T) -> A + Send + Sync + 'static,
        F: Fn(A) -> Option<U> + Send + Sync + 'static,
    {
        let source = self.clone();
        let step = Arc::new(step);
        let finish = Arc::new(finish);
        Observable::new(move |subscriber: Subscriber<U, E>| {
            let observer = ReduceObserver {
                downstream: subscriber,
                acc: Mutex::new(Some(init())),
                step: Arc::clone(&step),
                finish: Arc::clone(&finish),
            };
            Teardown::from(source.subscribe(observer))
        })
    }
}

//! Sequential composition of observables.
//!
//! A concatenation walks its sources strictly in order. Its state is a small
//! machine: `Active(i)` while source `i` is subscribed, `Completed` after the
//! last source completes, `Unsubscribed` once the caller tears it down. The
//! subscription of the active source lives in a single owned slot that is
//! replaced on every advance.
//!
//! Advancing never recurses. A source that completes while it is still being
//! subscribed only moves the phase forward; the outermost `subscribe_to` call
//! picks the next source up in a loop, so stack depth stays constant however
//! many sources finish synchronously.

use std::any::Any;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::error::{ObservableError, ObservableResult};
use crate::observable::Observable;
use crate::observer::{Observer, Subscriber};
use crate::subscription::{Subscription, Teardown};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConcatPhase {
    Active(usize),
    Completed,
    Unsubscribed,
}

struct ConcatState {
    phase: ConcatPhase,
    current: Option<Subscription>,
    /// Set while a source is inside its `subscribe` call.
    advancing: bool,
}

/// The observer shared by every source of one concatenation.
struct ConcatObserver<T, E> {
    me: Weak<ConcatObserver<T, E>>,
    downstream: Subscriber<T, E>,
    sources: Arc<[Observable<T, E>]>,
    state: Arc<Mutex<ConcatState>>,
}

impl<T, E> ConcatObserver<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    fn subscribe_to(&self, mut index: usize) {
        let Some(me) = self.me.upgrade() else {
            return;
        };
        loop {
            tracing::trace!(index, total = self.sources.len(), "concat subscribing to source");
            self.state.lock().advancing = true;
            let subscription = self.sources[index].subscribe(Arc::clone(&me));

            let mut state = self.state.lock();
            state.advancing = false;
            match state.phase {
                ConcatPhase::Active(active) if active == index => {
                    state.current = Some(subscription);
                    return;
                }
                // The source completed synchronously and requested the next one.
                ConcatPhase::Active(next) => index = next,
                ConcatPhase::Unsubscribed => {
                    drop(state);
                    subscription.unsubscribe();
                    return;
                }
                ConcatPhase::Completed => return,
            }
        }
    }
}

impl<T, E> Observer<T, E> for ConcatObserver<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    fn next(&self, value: T) {
        self.downstream.next(value);
    }

    fn error(&self, err: E) {
        self.state.lock().phase = ConcatPhase::Completed;
        self.downstream.error(err);
    }

    fn complete(&self) {
        let advance = {
            let mut state = self.state.lock();
            let ConcatPhase::Active(index) = state.phase else {
                return;
            };
            state.current = None;
            if index + 1 < self.sources.len() {
                state.phase = ConcatPhase::Active(index + 1);
                if state.advancing {
                    // The running `subscribe_to` loop takes it from here.
                    return;
                }
                Some(index + 1)
            } else {
                state.phase = ConcatPhase::Completed;
                None
            }
        };

        match advance {
            Some(index) => self.subscribe_to(index),
            None => {
                tracing::trace!("concat completed");
                self.downstream.complete();
            }
        }
    }
}

impl<T, E> Observable<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Emit every value of `self`, then of each of `others`, in argument
    /// order. Sources are never interleaved and only the final completion is
    /// forwarded.
    ///
    /// Tearing the result down tears down only the source that is currently
    /// active; earlier sources have already finished.
    ///
    /// # Example
    ///
    /// ```rust
    /// use coldstream::Observable;
    ///
    /// let first = Observable::<i32, String>::of([1, 2]);
    /// let second = Observable::of([3]);
    /// let all = first.concat([second]);
    /// all.subscribe_fn(|v| println!("{v}"));
    /// ```
    pub fn concat<I>(&self, others: I) -> Observable<T, E>
    where
        I: IntoIterator<Item = Observable<T, E>>,
    {
        let sources: Arc<[Observable<T, E>]> =
            std::iter::once(self.clone()).chain(others).collect();

        Observable::new(move |subscriber: Subscriber<T, E>| {
            let state = Arc::new(Mutex::new(ConcatState {
                phase: ConcatPhase::Active(0),
                current: None,
                advancing: false,
            }));
            let observer = Arc::new_cyclic(|me| ConcatObserver {
                me: me.clone(),
                downstream: subscriber,
                sources: Arc::clone(&sources),
                state: Arc::clone(&state),
            });
            observer.subscribe_to(0);

            Teardown::new(move || {
                let current = {
                    let mut state = state.lock();
                    if let ConcatPhase::Active(index) = state.phase {
                        tracing::trace!(index, "concat unsubscribed");
                    }
                    state.phase = ConcatPhase::Unsubscribed;
                    state.current.take()
                };
                if let Some(current) = current {
                    current.unsubscribe();
                }
            })
        })
    }

    /// Like [`concat`](Self::concat), for dynamically typed arguments.
    ///
    /// Every argument is checked before anything is subscribed; the first one
    /// that is not an `Observable<T, E>` fails with
    /// [`ObservableError::NotObservable`].
    pub fn concat_dyn(
        &self,
        others: Vec<Box<dyn Any + Send>>,
    ) -> ObservableResult<Observable<T, E>> {
        let others = others
            .into_iter()
            .enumerate()
            .map(|(index, other)| {
                other
                    .downcast::<Observable<T, E>>()
                    .map(|observable| *observable)
                    .map_err(|_| ObservableError::NotObservable { index })
            })
            .collect::<ObservableResult<Vec<_>>>()?;
        Ok(self.concat(others))
    }
}

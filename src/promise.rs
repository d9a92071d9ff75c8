//! Bridges to single-shot async results: `from_promise` and `for_each`.

use std::future::Future;

use futures_util::future::{BoxFuture, Shared};
use futures_util::FutureExt;
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::oneshot;

use crate::observable::Observable;
use crate::observer::{Observer, Subscriber};
use crate::subscription::{SubscriptionGuard, Teardown};

type SharedResult<T, E> = Shared<BoxFuture<'static, Result<T, E>>>;

impl<T, E> Observable<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Push the single outcome of `future`.
    ///
    /// `Ok(value)` becomes `next(value)` followed by `complete`; `Err(err)`
    /// becomes `error(err)`. The future runs at most once and every
    /// subscription observes the same outcome. Tearing a subscription down
    /// before the outcome is known suppresses delivery; the future itself
    /// keeps running.
    ///
    /// # Runtime
    ///
    /// Each subscription waits for the outcome on a task spawned onto the
    /// current Tokio runtime. Subscribing outside a runtime never panics: an
    /// outcome that is already known is delivered immediately, otherwise a
    /// warning is logged and the subscription stays open without signals.
    ///
    /// # Example
    ///
    /// ```rust
    /// use coldstream::Observable;
    ///
    /// # #[tokio::main]
    /// # async fn main() {
    /// let answer = Observable::<u32, String>::from_promise(async { Ok(42) });
    /// let result = answer.for_each(|v| assert_eq!(v, 42)).await;
    /// assert!(result.is_ok());
    /// # }
    /// ```
    pub fn from_promise<F>(future: F) -> Self
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
    {
        let outcome: SharedResult<T, E> = future.boxed().shared();
        Observable::new(move |subscriber: Subscriber<T, E>| {
            match Handle::try_current() {
                Ok(runtime) => {
                    let outcome = outcome.clone();
                    let delivery = subscriber.clone();
                    runtime.spawn(async move {
                        let result = outcome.await;
                        if delivery.is_closed() {
                            tracing::debug!(
                                "promise settled after unsubscribe, delivery suppressed"
                            );
                            return;
                        }
                        settle_into(&delivery, result);
                    });
                }
                Err(_) => match outcome.peek() {
                    Some(result) => settle_into(&subscriber, result.clone()),
                    None => {
                        tracing::warn!("no Tokio runtime at subscribe, promise outcome dropped")
                    }
                },
            }
            // Unsubscribing closes the subscriber; the task checks that flag.
            Teardown::empty()
        })
    }
}

fn settle_into<T, E>(subscriber: &Subscriber<T, E>, result: Result<T, E>) {
    match result {
        Ok(value) => {
            subscriber.next(value);
            subscriber.complete();
        }
        Err(err) => subscriber.error(err),
    }
}

struct ForEachObserver<F, E> {
    callback: F,
    done: Mutex<Option<oneshot::Sender<Result<(), E>>>>,
}

impl<F, E> ForEachObserver<F, E> {
    fn settle(&self, result: Result<(), E>) {
        if let Some(done) = self.done.lock().take() {
            // The receiver is gone only if the caller dropped the future.
            let _ = done.send(result);
        }
    }
}

impl<T, E, F> Observer<T, E> for ForEachObserver<F, E>
where
    E: Send,
    F: Fn(T) + Send + Sync,
{
    fn next(&self, value: T) {
        (self.callback)(value);
    }

    fn error(&self, err: E) {
        self.settle(Err(err));
    }

    fn complete(&self) {
        self.settle(Ok(()));
    }
}

impl<T, E> Observable<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Run `callback` for every value and resolve when the stream ends.
    ///
    /// Subscribes immediately, before the returned future is first polled.
    /// The future resolves to `Ok(())` on completion and to `Err(err)` on
    /// error. Dropping it unsubscribes. If the producer abandons its
    /// subscriber without a terminal signal the future never resolves.
    pub fn for_each<F>(
        &self,
        callback: F,
    ) -> impl Future<Output = Result<(), E>> + Send + 'static
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        let (done, settled) = oneshot::channel();
        let guard = SubscriptionGuard(self.subscribe(ForEachObserver {
            callback,
            done: Mutex::new(Some(done)),
        }));

        async move {
            let _guard = guard;
            match settled.await {
                Ok(result) => result,
                Err(_) => {
                    tracing::debug!("for_each source dropped without completing");
                    std::future::pending().await
                }
            }
        }
    }
}

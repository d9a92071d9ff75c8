//! Async stream bridge.
//!
//! Converts an observable into a [`Stream`] of `Result<T, E>` so it can be
//! consumed with `StreamExt` combinators. The stream ends after `complete`,
//! or right after yielding the first `Err`.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_stream::wrappers::{ReceiverStream, UnboundedReceiverStream};

use crate::config::{Config, StreamConfig};
use crate::error::ObservableResult;
use crate::observable::Observable;
use crate::observer::Observer;
use crate::subscription::SubscriptionGuard;

/// Type alias for a boxed async stream of events.
pub type EventStream<T> = Pin<Box<dyn Stream<Item = T> + Send>>;

/// Extension trait for working with event streams.
pub trait EventStreamExt<T> {
    /// Convert into a boxed stream.
    fn boxed(self) -> EventStream<T>;
}

impl<S, T> EventStreamExt<T> for S
where
    S: Stream<Item = T> + Send + 'static,
{
    fn boxed(self) -> EventStream<T> {
        Box::pin(self)
    }
}

enum ChannelSender<V> {
    Unbounded(mpsc::UnboundedSender<V>),
    Bounded(mpsc::Sender<V>),
}

impl<V> ChannelSender<V> {
    fn send(&self, value: V, stream: &str) {
        match self {
            ChannelSender::Unbounded(tx) => {
                // A send error means the stream was dropped.
                let _ = tx.send(value);
            }
            ChannelSender::Bounded(tx) => {
                if let Err(mpsc::error::TrySendError::Full(_)) = tx.try_send(value) {
                    tracing::warn!(stream, "stream buffer full, value dropped");
                }
            }
        }
    }
}

struct StreamObserver<V> {
    tx: Mutex<Option<ChannelSender<V>>>,
    name: Arc<str>,
}

impl<V> StreamObserver<V> {
    fn send(&self, value: V) {
        if let Some(tx) = self.tx.lock().as_ref() {
            tx.send(value, &self.name);
        }
    }

    fn close(&self) {
        self.tx.lock().take();
    }
}

impl<T, E> Observer<T, E> for StreamObserver<Result<T, E>>
where
    T: Send,
    E: Send,
{
    fn next(&self, value: T) {
        self.send(Ok(value));
    }

    fn error(&self, err: E) {
        self.send(Err(err));
        self.close();
    }

    fn complete(&self) {
        tracing::trace!(stream = %self.name, "stream source completed");
        self.close();
    }
}

/// A stream that keeps its subscription alive and unsubscribes on drop.
struct SubscriptionStream<V> {
    inner: EventStream<V>,
    _guard: SubscriptionGuard,
}

impl<V> Stream for SubscriptionStream<V> {
    type Item = V;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<V>> {
        self.get_mut().inner.as_mut().poll_next(cx)
    }
}

impl<T, E> Observable<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Subscribe and expose the signals as an unbounded async stream.
    ///
    /// # Example
    ///
    /// ```rust
    /// use coldstream::Observable;
    /// use futures::StreamExt;
    ///
    /// # #[tokio::main]
    /// # async fn main() {
    /// let stream = Observable::<i32, String>::of([1, 2]).into_stream();
    /// let items: Vec<_> = stream.collect().await;
    /// assert_eq!(items, vec![Ok(1), Ok(2)]);
    /// # }
    /// ```
    pub fn into_stream(&self) -> EventStream<Result<T, E>> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.stream_through(
            ChannelSender::Unbounded(tx),
            UnboundedReceiverStream::new(rx).boxed(),
            Arc::from("stream"),
        )
    }

    /// Subscribe and expose the signals as an async stream shaped by `config`.
    ///
    /// Fails with [`ObservableError::InvalidConfig`] before subscribing when
    /// the configuration does not validate.
    ///
    /// [`ObservableError::InvalidConfig`]: crate::ObservableError::InvalidConfig
    pub fn into_stream_with(
        &self,
        config: &StreamConfig,
    ) -> ObservableResult<EventStream<Result<T, E>>> {
        let config = config.validated()?;
        let name: Arc<str> = Arc::from(config.name());
        let stream = match config.buffer_size {
            Some(size) => {
                let (tx, rx) = mpsc::channel(size);
                self.stream_through(
                    ChannelSender::Bounded(tx),
                    ReceiverStream::new(rx).boxed(),
                    name,
                )
            }
            None => {
                let (tx, rx) = mpsc::unbounded_channel();
                self.stream_through(
                    ChannelSender::Unbounded(tx),
                    UnboundedReceiverStream::new(rx).boxed(),
                    name,
                )
            }
        };
        Ok(stream)
    }

    fn stream_through(
        &self,
        tx: ChannelSender<Result<T, E>>,
        rx: EventStream<Result<T, E>>,
        name: Arc<str>,
    ) -> EventStream<Result<T, E>> {
        let subscription = self.subscribe(StreamObserver {
            tx: Mutex::new(Some(tx)),
            name,
        });
        SubscriptionStream {
            inner: rx,
            _guard: SubscriptionGuard(subscription),
        }
        .boxed()
    }
}

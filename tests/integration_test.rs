//! Integration tests for Coldstream
//!
//! These tests exercise the public API the way a consumer would: building
//! pipelines from constructors and operators and observing the signals.

use coldstream::prelude::*;
use futures::StreamExt;
use std::any::Any;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// =============================================================================
// Test Helpers
// =============================================================================

/// Signal observed by a [`Recorder`].
#[derive(Debug, Clone, PartialEq)]
enum Signal<T> {
    Next(T),
    Error(String),
    Complete,
}

/// A full observer object that records every signal it receives.
#[derive(Debug)]
struct Recorder<T> {
    signals: Mutex<Vec<Signal<T>>>,
}

impl<T: Clone> Recorder<T> {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            signals: Mutex::new(Vec::new()),
        })
    }

    fn signals(&self) -> Vec<Signal<T>> {
        self.signals.lock().unwrap().clone()
    }
}

impl<T: Send> Observer<T, String> for Recorder<T> {
    fn next(&self, value: T) {
        self.signals.lock().unwrap().push(Signal::Next(value));
    }

    fn error(&self, err: String) {
        self.signals.lock().unwrap().push(Signal::Error(err));
    }

    fn complete(&self) {
        self.signals.lock().unwrap().push(Signal::Complete);
    }
}

fn nexts<T>(values: impl IntoIterator<Item = T>) -> Vec<Signal<T>> {
    values.into_iter().map(Signal::Next).collect()
}

fn completed<T>(values: impl IntoIterator<Item = T>) -> Vec<Signal<T>> {
    let mut signals = nexts(values);
    signals.push(Signal::Complete);
    signals
}

/// A producer driven from the test body.
type Handle = Arc<Mutex<Vec<Subscriber<i32, String>>>>;

fn controlled() -> (Observable<i32, String>, Handle) {
    let handle: Handle = Arc::new(Mutex::new(Vec::new()));
    let producer_handle = Arc::clone(&handle);
    let observable = Observable::new(move |subscriber| {
        producer_handle.lock().unwrap().push(subscriber);
        Teardown::empty()
    });
    (observable, handle)
}

// =============================================================================
// Subscription Core
// =============================================================================

#[test]
fn test_observer_shapes_receive_same_signals() {
    let source = Observable::<i32, String>::of([1, 2]);

    let full = Recorder::new();
    source.subscribe(Arc::clone(&full));

    let from_fn = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&from_fn);
    source.subscribe_fn(move |v| sink.lock().unwrap().push(v));

    let completions = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&completions);
    source.subscribe(Callbacks::new().on_complete(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    }));

    assert_eq!(full.signals(), completed([1, 2]));
    assert_eq!(*from_fn.lock().unwrap(), vec![1, 2]);
    assert_eq!(completions.load(Ordering::SeqCst), 1);
}

#[test]
fn test_terminal_signal_is_final() {
    let (source, handle) = controlled();
    let recorder = Recorder::new();
    let subscription = source.subscribe(Arc::clone(&recorder));

    let subscriber = handle.lock().unwrap()[0].clone();
    subscriber.next(1);
    subscriber.complete();
    subscriber.next(2);
    subscriber.error("late".to_string());
    subscriber.complete();

    assert_eq!(recorder.signals(), completed([1]));
    assert!(subscription.is_closed());
}

#[test]
fn test_each_subscription_runs_producer_independently() {
    let (source, handle) = controlled();
    let first = Recorder::new();
    let second = Recorder::new();
    source.subscribe(Arc::clone(&first));
    source.subscribe(Arc::clone(&second));

    let subscribers = handle.lock().unwrap().clone();
    assert_eq!(subscribers.len(), 2);
    subscribers[0].next(10);
    subscribers[1].next(20);

    assert_eq!(first.signals(), nexts([10]));
    assert_eq!(second.signals(), nexts([20]));
}

// =============================================================================
// Operators
// =============================================================================

#[test]
fn test_filter_map_reduce_pipeline() {
    let recorder = Recorder::new();
    Observable::<i32, String>::of(1..=10)
        .filter(|v| v % 3 == 0)
        .map(|v| v * v)
        .reduce(|acc, v| acc + v)
        .subscribe(Arc::clone(&recorder));

    assert_eq!(recorder.signals(), completed([9 + 36 + 81]));
}

#[test]
fn test_reduce_with_folds_from_initial_value() {
    let recorder = Recorder::new();
    Observable::<&str, String>::of(["x", "y", "z"])
        .reduce_with(Vec::new(), |mut acc, v| {
            acc.push(v.to_uppercase());
            acc
        })
        .subscribe(Arc::clone(&recorder));

    assert_eq!(
        recorder.signals(),
        completed([vec!["X".to_string(), "Y".to_string(), "Z".to_string()]])
    );
}

#[test]
fn test_reduce_keeps_state_per_subscription() {
    let (source, handle) = controlled();
    let counted = source.reduce_with(0, |count, _| count + 1);

    let first = Recorder::new();
    let second = Recorder::new();
    counted.subscribe(Arc::clone(&first));
    counted.subscribe(Arc::clone(&second));

    let subscribers = handle.lock().unwrap().clone();
    subscribers[0].next(1);
    subscribers[0].next(1);
    subscribers[1].next(1);
    subscribers[0].complete();
    subscribers[1].complete();

    assert_eq!(first.signals(), completed([2]));
    assert_eq!(second.signals(), completed([1]));
}

#[test]
fn test_operator_unsubscribe_reaches_source() {
    let released = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&released);
    let source = Observable::<i32, String>::new(move |_subscriber| {
        let counter = Arc::clone(&counter);
        Teardown::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    });

    let subscription = source.map(|v| v + 1).filter(|_| true).subscribe_fn(|_| {});
    subscription.unsubscribe();

    assert_eq!(released.load(Ordering::SeqCst), 1);
}

// =============================================================================
// Concat
// =============================================================================

#[test]
fn test_concat_forwards_only_last_completion() {
    let recorder = Recorder::new();
    let a = Observable::<i32, String>::of([1, 2]);
    let b = Observable::of([3]);
    let c = Observable::of(Vec::new());
    a.concat([b, c]).subscribe(Arc::clone(&recorder));

    assert_eq!(recorder.signals(), completed([1, 2, 3]));
}

#[test]
fn test_concat_never_interleaves_sources() {
    let (a, a_handle) = controlled();
    let (b, b_handle) = controlled();
    let recorder = Recorder::new();
    a.concat([b]).subscribe(Arc::clone(&recorder));

    assert!(b_handle.lock().unwrap().is_empty());
    let a_subscriber = a_handle.lock().unwrap()[0].clone();
    a_subscriber.next(1);
    a_subscriber.complete();

    let b_subscriber = b_handle.lock().unwrap()[0].clone();
    b_subscriber.next(2);
    b_subscriber.complete();

    assert_eq!(recorder.signals(), completed([1, 2]));
}

#[test]
fn test_concat_rejects_non_observable_argument() {
    let (a, a_handle) = controlled();
    let others: Vec<Box<dyn Any + Send>> = vec![Box::new(vec![1, 2, 3])];

    let result = a.concat_dyn(others);

    assert_eq!(
        result.unwrap_err(),
        ObservableError::NotObservable { index: 0 }
    );
    assert!(a_handle.lock().unwrap().is_empty());
}

// =============================================================================
// Sources
// =============================================================================

#[test]
fn test_from_existing_observable_is_transparent() {
    let original = Observable::<i32, String>::new(|subscriber| {
        subscriber.next(1);
        subscriber.next(2);
        subscriber.error("stop".to_string());
        Teardown::empty()
    });

    let direct = Recorder::new();
    let wrapped = Recorder::new();
    original.subscribe(Arc::clone(&direct));
    Observable::<i32, String>::from_source(original.clone()).subscribe(Arc::clone(&wrapped));

    assert_eq!(direct.signals(), wrapped.signals());
}

#[test]
fn test_from_iterable_and_sequence() {
    let iterable = Recorder::new();
    let letters: Vec<char> = "abc".chars().collect();
    Observable::<char, String>::from_source(Source::<char, String>::iterable(letters))
        .subscribe(Arc::clone(&iterable));

    let sequence = Recorder::new();
    Observable::<char, String>::from_source(['x', 'y']).subscribe(Arc::clone(&sequence));

    assert_eq!(iterable.signals(), completed(['a', 'b', 'c']));
    assert_eq!(sequence.signals(), completed(['x', 'y']));
}

#[test]
fn test_from_unsupported_value_fails() {
    let result = Observable::<i32, String>::try_from_any(Box::new("plain string"));
    assert_eq!(result.unwrap_err(), ObservableError::NotConvertible);
}

// =============================================================================
// Events
// =============================================================================

#[test]
fn test_from_event_pushes_until_teardown() {
    let target = Arc::new(EventEmitter::<String>::new());
    let keys = Observable::<String, String>::from_event(Arc::clone(&target), "key", None);

    let recorder = Recorder::new();
    target.emit("key", "early".to_string());
    let subscription = keys.subscribe(Arc::clone(&recorder));

    target.emit("key", "a".to_string());
    target.emit("key", "b".to_string());
    subscription.unsubscribe();
    target.emit("key", "c".to_string());

    assert_eq!(
        recorder.signals(),
        nexts(["a".to_string(), "b".to_string()])
    );
    assert_eq!(target.listener_count("key"), 0);
}

#[test]
fn test_from_event_through_dyn_target() {
    let emitter = Arc::new(EventEmitter::<u8>::new());
    let target: Arc<dyn EventTarget<Event = u8>> = emitter.clone();
    let observable = Observable::<u8, String>::from_event(
        target,
        "byte",
        Some(ListenerOptions::new().passive()),
    );

    let recorder = Recorder::new();
    let subscription = observable.map(|b| b as u32 * 2).subscribe(Arc::clone(&recorder));
    emitter.emit("byte", 21);
    subscription.unsubscribe();

    assert_eq!(recorder.signals(), nexts([42]));
    assert_eq!(emitter.listener_count("byte"), 0);
}

// =============================================================================
// Async Bridges
// =============================================================================

#[tokio::test]
async fn test_from_promise_then_for_each() {
    let observable = Observable::<String, String>::from_promise(async {
        tokio::task::yield_now().await;
        Ok("resolved".to_string())
    });

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let result = observable.for_each(move |v| sink.lock().unwrap().push(v)).await;

    assert_eq!(result, Ok(()));
    assert_eq!(*seen.lock().unwrap(), vec!["resolved".to_string()]);
}

#[tokio::test]
async fn test_for_each_surfaces_rejection() {
    let observable =
        Observable::<i32, String>::from_promise(async { Err("rejected".to_string()) });
    let result = observable.map(|v| v + 1).for_each(|_| {}).await;
    assert_eq!(result, Err("rejected".to_string()));
}

#[tokio::test]
async fn test_for_each_on_concatenated_promises_preserves_order() {
    let first = Observable::<i32, String>::from_promise(async {
        tokio::task::yield_now().await;
        Ok(1)
    });
    let second = Observable::from_promise(async { Ok(2) });

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    first
        .concat([second])
        .for_each(move |v| sink.lock().unwrap().push(v))
        .await
        .unwrap();

    assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
}

#[tokio::test]
async fn test_into_stream_collects_pipeline() {
    let items: Vec<_> = Observable::<i32, String>::of([5, 6, 7])
        .filter(|v| *v != 6)
        .into_stream()
        .collect()
        .await;
    assert_eq!(items, vec![Ok(5), Ok(7)]);
}

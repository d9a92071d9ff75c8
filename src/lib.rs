//! # Coldstream
//!
//! **Coldstream** is a minimal push-based reactive-stream primitive: a lazy,
//! cold, unicast [`Observable`] plus a small algebra of operators and a
//! family of constructors that adapt other sources into the same abstraction.
//!
//! ## Overview
//!
//! - **Observer contract**: `next`, `error`, `complete`. Any observer shape is
//!   normalized into a [`Subscriber`] before the producer sees it.
//! - **Producer**: a closure taking the subscriber and returning a
//!   [`Teardown`]. Every observable wraps exactly one.
//! - **Operators and constructors**: build new observables around existing
//!   producers without running anything until subscription.
//!
//! ## Layer Structure
//!
//! ```text
//! Constructors - of, from_source, from_event, from_promise
//! Operators    - filter, map, reduce, concat
//! Core         - Observable, Subscriber, Subscription, Teardown
//! Bridges      - for_each (Future), into_stream (Stream)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use coldstream::prelude::*;
//! use std::sync::{Arc, Mutex};
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&seen);
//!
//! Observable::<i32, String>::of([1, 2, 3, 4])
//!     .filter(|v| v % 2 == 0)
//!     .map(|v| v * 10)
//!     .concat([Observable::of([100])])
//!     .subscribe_fn(move |v| sink.lock().unwrap().push(v));
//!
//! assert_eq!(*seen.lock().unwrap(), vec![20, 40, 100]);
//! ```
//!
//! ## Error Handling
//!
//! Failures of a running stream travel on the observable's `E` channel.
//! Argument validation (`concat_dyn`, `try_from_any`) and configuration
//! failures are returned synchronously as [`ObservableError`]. Panics in
//! user callbacks propagate out of `subscribe` unchanged.

mod concat;
mod config;
mod error;
mod event;
mod observable;
mod observer;
mod operators;
mod promise;
mod source;
pub mod stream;
mod subscription;

pub mod prelude;

// Re-export core types
pub use config::{Config, StreamConfig};
pub use error::{ObservableError, ObservableResult};
pub use event::{EventEmitter, EventTarget, Listener, ListenerOptions};
pub use observable::Observable;
pub use observer::{Callbacks, Observer, Subscriber};
pub use source::{Source, SourceKind};
pub use stream::{EventStream, EventStreamExt};
pub use subscription::{Subscription, Teardown};

//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types and traits
//! from Coldstream for convenient glob imports.
//!
//! # Example
//!
//! ```rust
//! use coldstream::prelude::*;
//! ```

// Core
pub use crate::observable::Observable;
pub use crate::observer::{Callbacks, Observer, Subscriber};
pub use crate::subscription::{Subscription, Teardown};

// Sources
pub use crate::event::{EventEmitter, EventTarget, Listener, ListenerOptions};
pub use crate::source::{Source, SourceKind};

// Streams
pub use crate::stream::{EventStream, EventStreamExt};

// Configuration
pub use crate::config::{Config, StreamConfig};

// Errors
pub use crate::error::{ObservableError, ObservableResult};

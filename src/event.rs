//! Event-target adapter: `from_event`.
//!
//! [`EventTarget`] is the extension point for anything that can register
//! listeners by event name. [`EventEmitter`] is an in-process implementation.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::observable::Observable;
use crate::observer::Subscriber;
use crate::subscription::Teardown;

/// A registered event handler. Listeners are compared by pointer identity.
pub type Listener<Ev> = Arc<dyn Fn(Ev) + Send + Sync>;

/// Options passed through on registration and removal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ListenerOptions {
    /// Register for the capture phase
    pub capture: bool,
    /// Remove the listener after its first dispatch
    pub once: bool,
    /// The listener promises not to cancel the event
    pub passive: bool,
}

impl ListenerOptions {
    /// Options with every flag unset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the capture flag.
    pub fn capture(mut self) -> Self {
        self.capture = true;
        self
    }

    /// Set the once flag.
    pub fn once(mut self) -> Self {
        self.once = true;
        self
    }

    /// Set the passive flag.
    pub fn passive(mut self) -> Self {
        self.passive = true;
        self
    }
}

/// Something listeners can be attached to by event name.
///
/// `remove_event_listener` must detach the registration made with the same
/// name, the same listener `Arc` and the same options.
pub trait EventTarget: Send + Sync {
    /// The event value handed to listeners.
    type Event;

    /// Attach `listener` for `name`.
    fn add_event_listener(
        &self,
        name: &str,
        listener: Listener<Self::Event>,
        options: Option<&ListenerOptions>,
    );

    /// Detach a listener previously attached with `add_event_listener`.
    fn remove_event_listener(
        &self,
        name: &str,
        listener: &Listener<Self::Event>,
        options: Option<&ListenerOptions>,
    );
}

impl<T, E> Observable<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Push every `name` event dispatched by `target`.
    ///
    /// The listener is attached at subscribe time, one per subscription.
    /// The stream never completes or errors; tearing it down detaches the
    /// exact listener that was attached.
    ///
    /// # Example
    ///
    /// ```rust
    /// use coldstream::{EventEmitter, Observable};
    /// use std::sync::Arc;
    ///
    /// let clicks = Arc::new(EventEmitter::<u32>::new());
    /// let observable = Observable::<u32, String>::from_event(Arc::clone(&clicks), "click", None);
    ///
    /// let subscription = observable.subscribe_fn(|x| println!("click at {x}"));
    /// clicks.emit("click", 10);
    /// subscription.unsubscribe();
    /// assert_eq!(clicks.listener_count("click"), 0);
    /// ```
    pub fn from_event<Tg>(
        target: Arc<Tg>,
        name: impl Into<String>,
        options: Option<ListenerOptions>,
    ) -> Self
    where
        Tg: EventTarget<Event = T> + ?Sized + 'static,
    {
        let name: Arc<str> = Arc::from(name.into());
        Observable::new(move |subscriber: Subscriber<T, E>| {
            let listener: Listener<T> = Arc::new(move |event| subscriber.next(event));
            target.add_event_listener(&name, Arc::clone(&listener), options.as_ref());
            tracing::trace!(event = %name, "listener attached");

            let target = Arc::clone(&target);
            let name = Arc::clone(&name);
            Teardown::new(move || {
                target.remove_event_listener(&name, &listener, options.as_ref());
                tracing::trace!(event = %name, "listener detached");
            })
        })
    }
}

struct Registration<Ev> {
    name: String,
    listener: Listener<Ev>,
    options: ListenerOptions,
}

impl<Ev> Registration<Ev> {
    fn matches(&self, name: &str, listener: &Listener<Ev>, options: &ListenerOptions) -> bool {
        self.name == name
            && Arc::ptr_eq(&self.listener, listener)
            && self.options.capture == options.capture
    }
}

/// In-process [`EventTarget`].
///
/// Attaching the same listener twice for the same name and capture flag is
/// a no-op. Listeners run outside the internal lock, so they may attach or
/// detach listeners themselves.
pub struct EventEmitter<Ev> {
    registrations: Mutex<Vec<Registration<Ev>>>,
}

impl<Ev> EventEmitter<Ev> {
    /// Create an emitter with no listeners.
    pub fn new() -> Self {
        Self {
            registrations: Mutex::new(Vec::new()),
        }
    }

    /// Number of listeners attached for `name`.
    pub fn listener_count(&self, name: &str) -> usize {
        self.registrations
            .lock()
            .iter()
            .filter(|r| r.name == name)
            .count()
    }

    /// Dispatch `event` to every listener attached for `name`, in
    /// registration order. Returns the number of listeners invoked.
    pub fn emit(&self, name: &str, event: Ev) -> usize
    where
        Ev: Clone,
    {
        let listeners: Vec<Listener<Ev>> = {
            let mut registrations = self.registrations.lock();
            let listeners = registrations
                .iter()
                .filter(|r| r.name == name)
                .map(|r| Arc::clone(&r.listener))
                .collect();
            registrations.retain(|r| !(r.name == name && r.options.once));
            listeners
        };

        for listener in &listeners {
            listener(event.clone());
        }
        listeners.len()
    }
}

impl<Ev> Default for EventEmitter<Ev> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Ev> fmt::Debug for EventEmitter<Ev> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEmitter")
            .field("listeners", &self.registrations.lock().len())
            .finish()
    }
}

impl<Ev: 'static> EventTarget for EventEmitter<Ev> {
    type Event = Ev;

    fn add_event_listener(
        &self,
        name: &str,
        listener: Listener<Ev>,
        options: Option<&ListenerOptions>,
    ) {
        let options = options.copied().unwrap_or_default();
        let mut registrations = self.registrations.lock();
        if registrations
            .iter()
            .any(|r| r.matches(name, &listener, &options))
        {
            return;
        }
        registrations.push(Registration {
            name: name.to_string(),
            listener,
            options,
        });
    }

    fn remove_event_listener(
        &self,
        name: &str,
        listener: &Listener<Ev>,
        options: Option<&ListenerOptions>,
    ) {
        let options = options.copied().unwrap_or_default();
        self.registrations
            .lock()
            .retain(|r| !r.matches(name, listener, &options));
    }
}

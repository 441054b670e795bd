//! Event objects and listener registration types.
//!
//! Listeners are stored per node under a [`TypeName`] (`click`, `click.menu`).
//! They are invoked by [`Document::dispatch`](crate::Document::dispatch),
//! never by the selection layer itself.

use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::document::{Element, NodeId};

/// Type-erased payload carried by an event.
pub type Detail = Arc<dyn Any + Send + Sync>;

/// A registered event listener.
///
/// Receives the event and the element whose listener is running (the
/// current target, which differs from the event target while bubbling).
pub type Listener = Arc<dyn Fn(&Event, &Element) + Send + Sync>;

/// A parsed `type.name` listener key.
///
/// The name part allows several listeners for the same event type to be
/// registered and removed independently.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeName {
    /// Event type, e.g. `click`. Empty when only a name was given (`.menu`).
    pub event_type: String,
    /// Optional listener name.
    pub name: Option<String>,
}

impl TypeName {
    /// Parse a single `type[.name]` token.
    pub fn parse(token: &str) -> Self {
        match token.split_once('.') {
            Some((event_type, name)) => Self {
                event_type: event_type.to_string(),
                name: Some(name.to_string()),
            },
            None => Self {
                event_type: token.to_string(),
                name: None,
            },
        }
    }

    /// Parse a whitespace-separated list of `type[.name]` tokens.
    pub fn parse_list(typenames: &str) -> Vec<Self> {
        typenames.split_whitespace().map(Self::parse).collect()
    }

    /// Whether a removal request for `self` covers the registered key `other`.
    ///
    /// `.name` matches every type with that name; `type` matches only the
    /// unnamed listener of that type.
    pub fn covers(&self, other: &TypeName) -> bool {
        if self.event_type.is_empty() {
            self.name.is_some() && self.name == other.name
        } else {
            self.event_type == other.event_type && self.name == other.name
        }
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}.{}", self.event_type, name),
            None => write!(f, "{}", self.event_type),
        }
    }
}

/// Parameters for constructing a custom [`Event`].
#[derive(Clone, Default)]
pub struct EventInit {
    /// Whether the event propagates to ancestors after the target.
    pub bubbles: bool,
    /// Whether [`Event::prevent_default`] has any effect.
    pub cancelable: bool,
    /// Optional payload.
    pub detail: Option<Detail>,
}

impl EventInit {
    /// Create parameters for a non-bubbling, non-cancelable event.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether the event bubbles.
    pub fn bubbles(mut self, bubbles: bool) -> Self {
        self.bubbles = bubbles;
        self
    }

    /// Set whether the event is cancelable.
    pub fn cancelable(mut self, cancelable: bool) -> Self {
        self.cancelable = cancelable;
        self
    }

    /// Attach a payload.
    pub fn detail<T: Any + Send + Sync>(mut self, detail: T) -> Self {
        self.detail = Some(Arc::new(detail));
        self
    }
}

impl fmt::Debug for EventInit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventInit")
            .field("bubbles", &self.bubbles)
            .field("cancelable", &self.cancelable)
            .field("has_detail", &self.detail.is_some())
            .finish()
    }
}

/// An event being dispatched through the document.
pub struct Event {
    event_type: String,
    target: NodeId,
    bubbles: bool,
    cancelable: bool,
    detail: Option<Detail>,
    propagation_stopped: AtomicBool,
    default_prevented: AtomicBool,
}

impl Event {
    /// Create an event of the given type targeted at `target`.
    pub fn new(event_type: impl Into<String>, target: NodeId, init: EventInit) -> Self {
        Self {
            event_type: event_type.into(),
            target,
            bubbles: init.bubbles,
            cancelable: init.cancelable,
            detail: init.detail,
            propagation_stopped: AtomicBool::new(false),
            default_prevented: AtomicBool::new(false),
        }
    }

    /// The event type, e.g. `click`.
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// The node the event was dispatched to.
    pub fn target(&self) -> NodeId {
        self.target
    }

    /// Whether the event bubbles.
    pub fn bubbles(&self) -> bool {
        self.bubbles
    }

    /// Whether the event is cancelable.
    pub fn cancelable(&self) -> bool {
        self.cancelable
    }

    /// Downcast the payload to `T`.
    pub fn detail<T: Any>(&self) -> Option<&T> {
        self.detail.as_ref().and_then(|d| d.downcast_ref::<T>())
    }

    /// Stop the event from reaching further ancestors.
    ///
    /// Remaining listeners on the current node still run.
    pub fn stop_propagation(&self) {
        self.propagation_stopped.store(true, Ordering::Relaxed);
    }

    /// Whether [`stop_propagation`](Self::stop_propagation) was called.
    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped.load(Ordering::Relaxed)
    }

    /// Cancel the event's default action. No-op unless cancelable.
    pub fn prevent_default(&self) {
        if self.cancelable {
            self.default_prevented.store(true, Ordering::Relaxed);
        }
    }

    /// Whether the default action was cancelled.
    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented.load(Ordering::Relaxed)
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("event_type", &self.event_type)
            .field("target", &self.target)
            .field("bubbles", &self.bubbles)
            .field("cancelable", &self.cancelable)
            .finish()
    }
}

use std::time::Duration;

use crate::node::NodeId;

/// Handle for a registered listener, scoped to the document that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId {
    document: u64,
    raw: u64,
}

impl ListenerId {
    pub(crate) fn new(document: u64, raw: u64) -> Self {
        Self { document, raw }
    }
}

impl std::fmt::Display for ListenerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "listener-{}.{}", self.document, self.raw)
    }
}

/// What a listener subscribes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// Activation of the node or one of its descendants.
    Click,
    /// End of a transition of the given property on the node itself.
    TransitionEnd { property: String },
}

impl EventKind {
    pub fn transition_end(property: impl Into<String>) -> Self {
        EventKind::TransitionEnd {
            property: property.into(),
        }
    }
}

/// Events delivered by the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Click {
        target: NodeId,
    },
    TransitionEnd {
        target: NodeId,
        property: String,
        elapsed: Duration,
    },
}

impl Event {
    pub fn target(&self) -> NodeId {
        match self {
            Event::Click { target } | Event::TransitionEnd { target, .. } => *target,
        }
    }

    /// Returns true if a listener of `kind` should receive this event.
    pub fn is(&self, kind: &EventKind) -> bool {
        match (self, kind) {
            (Event::Click { .. }, EventKind::Click) => true,
            (
                Event::TransitionEnd { property, .. },
                EventKind::TransitionEnd { property: wanted },
            ) => property == wanted,
            _ => false,
        }
    }
}

/// An event routed to one listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub listener: ListenerId,
    /// Node the listener is registered on.
    pub current_target: NodeId,
    pub event: Event,
}

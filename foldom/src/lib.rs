mod animation;
pub mod document;
pub mod error;
pub mod event;
pub mod node;
pub mod selector;
pub mod style;
pub mod transition;

pub use document::{Document, MemoryDocument};
pub use error::{DomError, Result};
pub use event::{Event, EventKind, ListenerId, Notification};
pub use node::{ClassList, Node, NodeId};
pub use selector::Selector;
pub use style::{Height, InlineStyle, Rule, Stylesheet};
pub use transition::{mentions_property, parse_transitions, Easing, TransitionConfig};

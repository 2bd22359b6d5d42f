use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use crate::animation::HeightTransition;
use crate::error::{DomError, Result};
use crate::event::{Event, EventKind, ListenerId, Notification};
use crate::node::{Arena, Node, NodeId};
use crate::selector::Selector;
use crate::style::{Height, Rule, Stylesheet};
use crate::transition::{parse_transitions, TransitionConfig};

/// The host document surface the expand/collapse engine runs against.
///
/// Implementations own the nodes; callers only hold [`NodeId`] handles.
/// Reads on a node that is not rendered report zero heights, as a browser does.
pub trait Document {
    /// All attached nodes matching `selector`, in document order.
    fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>>;

    /// Whether the node is attached and has a layout box.
    fn is_rendered(&self, node: NodeId) -> bool;

    /// Natural content height (`scrollHeight`).
    fn scroll_height(&self, node: NodeId) -> Result<u32>;

    /// Current rendered height (`clientHeight`), mid-transition values included.
    fn client_height(&self, node: NodeId) -> Result<u32>;

    fn has_class(&self, node: NodeId, class: &str) -> Result<bool>;

    /// Returns true if the class was added.
    fn add_class(&mut self, node: NodeId, class: &str) -> Result<bool>;

    /// Returns true if the class was removed.
    fn remove_class(&mut self, node: NodeId, class: &str) -> Result<bool>;

    /// The inline height override, if any.
    fn inline_height(&self, node: NodeId) -> Result<Option<Height>>;

    fn set_height(&mut self, node: NodeId, height: Height) -> Result<()>;

    /// Drop the inline height override so the stylesheet value applies.
    fn clear_height(&mut self, node: NodeId) -> Result<()>;

    /// The inline transition declaration, empty when unset.
    fn inline_transition(&self, node: NodeId) -> Result<String>;

    /// Set the inline transition declaration. An empty string clears it.
    fn set_transition(&mut self, node: NodeId, declaration: &str) -> Result<()>;

    /// The effective transition declaration after the cascade.
    fn computed_transition(&self, node: NodeId) -> Result<String>;

    /// Whether a transition of `property` is currently running on the node.
    fn is_transitioning(&self, node: NodeId, property: &str) -> Result<bool>;

    fn add_listener(&mut self, node: NodeId, kind: EventKind) -> Result<ListenerId>;

    /// Returns true if the listener was registered.
    fn remove_listener(&mut self, listener: ListenerId) -> bool;
}

#[derive(Debug)]
struct Listener {
    node: NodeId,
    kind: EventKind,
}

/// In-memory document with a stylesheet cascade and a virtual clock.
///
/// Height changes between two pixel values start a transition when the
/// computed `transition` covers `height` with a non-zero time. Transitions to
/// or from `auto` snap. The clock only moves through [`MemoryDocument::advance`],
/// which returns the notifications for every transition that ended.
#[derive(Debug)]
pub struct MemoryDocument {
    arena: Arena,
    body: NodeId,
    stylesheet: Stylesheet,
    clock: Duration,
    transitions: HashMap<NodeId, HeightTransition>,
    listeners: BTreeMap<ListenerId, Listener>,
    next_listener: u64,
    mutations: u64,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocument {
    pub fn new() -> Self {
        let mut arena = Arena::default();
        let body = arena.push(Node::new("body"));
        Self {
            arena,
            body,
            stylesheet: Stylesheet::default(),
            clock: Duration::ZERO,
            transitions: HashMap::new(),
            listeners: BTreeMap::new(),
            next_listener: 0,
            mutations: 0,
        }
    }

    pub fn with_stylesheet(stylesheet: Stylesheet) -> Self {
        Self {
            stylesheet,
            ..Self::new()
        }
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.arena.get(id)
    }

    /// Add a rule. Existing nodes pick it up without transitioning.
    pub fn add_rule(&mut self, rule: Rule) {
        self.stylesheet.push(rule);
    }

    pub fn append(&mut self, parent: NodeId, node: Node) -> Result<NodeId> {
        if self.arena.get(parent).is_none() {
            return Err(DomError::UnknownNode(parent));
        }
        Ok(self.attach(parent, node))
    }

    pub fn append_to_body(&mut self, node: Node) -> NodeId {
        self.attach(self.body, node)
    }

    /// Remove the node (and its subtree) from the document. Running
    /// transitions in the subtree are dropped without an end event.
    pub fn detach(&mut self, id: NodeId) -> Result<()> {
        let parent = self.node_ref(id)?.parent;
        if let Some(parent) = parent {
            if let Some(p) = self.arena.get_mut(parent) {
                p.children.retain(|child| *child != id);
            }
            if let Some(node) = self.arena.get_mut(id) {
                node.parent = None;
            }
            self.mutations += 1;
        }
        self.cancel_subtree(id);
        Ok(())
    }

    /// Toggle inline `display: none`.
    pub fn set_hidden(&mut self, id: NodeId, hidden: bool) -> Result<()> {
        let node = self.arena.get_mut(id).ok_or(DomError::UnknownNode(id))?;
        if node.display_none != hidden {
            node.display_none = hidden;
            self.mutations += 1;
        }
        if !self.is_rendered(id) {
            self.cancel_subtree(id);
        }
        Ok(())
    }

    /// Change the natural content height, as new content would.
    pub fn set_content_height(&mut self, id: NodeId, height: u32) -> Result<()> {
        let node = self.arena.get_mut(id).ok_or(DomError::UnknownNode(id))?;
        if node.content_height != height {
            node.content_height = height;
            self.mutations += 1;
        }
        Ok(())
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.clock
    }

    /// Count of DOM mutations performed so far.
    pub fn mutations(&self) -> u64 {
        self.mutations
    }

    pub fn listener_count(&self, id: NodeId) -> usize {
        self.listeners.values().filter(|l| l.node == id).count()
    }

    pub fn has_running_transitions(&self) -> bool {
        !self.transitions.is_empty()
    }

    /// The cascaded `height` value.
    pub fn computed_height(&self, id: NodeId) -> Height {
        let Some(node) = self.arena.get(id) else {
            return Height::Auto;
        };
        node.style
            .height
            .or_else(|| self.cascade(id, |rule| rule.height))
            .unwrap_or_default()
    }

    /// Activate a node. Listeners on the node and its ancestors are notified,
    /// nearest first. Nodes that are not rendered cannot be clicked.
    pub fn click(&self, id: NodeId) -> Vec<Notification> {
        if !self.is_rendered(id) {
            return Vec::new();
        }
        let path: Vec<NodeId> = self.arena.ancestry(id).collect();
        self.dispatch(&Event::Click { target: id }, path)
    }

    /// Move the clock forward and end every transition that finished.
    pub fn advance(&mut self, elapsed: Duration) -> Vec<Notification> {
        self.clock += elapsed;
        let now = self.clock;

        let mut finished: Vec<(NodeId, HeightTransition)> = self
            .transitions
            .iter()
            .filter(|(_, transition)| transition.is_finished(now))
            .map(|(id, transition)| (*id, transition.clone()))
            .collect();
        finished.sort_by_key(|(id, transition)| (transition.end(), *id));

        let mut notifications = Vec::new();
        for (id, transition) in finished {
            self.transitions.remove(&id);
            log::trace!("{}: height transition ended at {}px", id, transition.to);
            let event = Event::TransitionEnd {
                target: id,
                property: "height".to_string(),
                elapsed: transition.duration,
            };
            notifications.extend(self.dispatch(&event, [id]));
        }
        notifications
    }

    /// Advance the clock until every running transition has ended.
    pub fn finish_transitions(&mut self) -> Vec<Notification> {
        let Some(end) = self.transitions.values().map(HeightTransition::end).max() else {
            return Vec::new();
        };
        self.advance(end.saturating_sub(self.clock))
    }

    fn attach(&mut self, parent: NodeId, mut node: Node) -> NodeId {
        node.parent = Some(parent);
        node.children.clear();
        let id = self.arena.push(node);
        if let Some(p) = self.arena.get_mut(parent) {
            p.children.push(id);
        }
        self.mutations += 1;
        id
    }

    fn node_ref(&self, id: NodeId) -> Result<&Node> {
        self.arena.get(id).ok_or(DomError::UnknownNode(id))
    }

    fn cancel_subtree(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if self.transitions.remove(&current).is_some() {
                log::debug!("{}: height transition cancelled", current);
            }
            if let Some(node) = self.arena.get(current) {
                stack.extend(node.children.iter().copied());
            }
        }
    }

    /// Last matching rule that sets the picked property.
    fn cascade<T>(&self, id: NodeId, pick: impl Fn(&Rule) -> Option<T>) -> Option<T> {
        self.stylesheet
            .rules()
            .iter()
            .rev()
            .filter(|rule| rule.selector.matches(&self.arena, id))
            .find_map(pick)
    }

    fn is_hidden(&self, id: NodeId) -> bool {
        self.arena.get(id).is_some_and(|n| n.display_none)
            || self
                .cascade(id, |rule| rule.display_none.then_some(()))
                .is_some()
    }

    fn transition_declaration(&self, id: NodeId) -> String {
        self.arena
            .get(id)
            .and_then(|n| n.style.transition.clone())
            .filter(|decl| !decl.is_empty())
            .or_else(|| self.cascade(id, |rule| rule.transition.clone()))
            .unwrap_or_default()
    }

    fn height_transition(&self, id: NodeId) -> Option<TransitionConfig> {
        parse_transitions(&self.transition_declaration(id))
            .into_iter()
            .rev()
            .find(|config| config.applies_to("height"))
    }

    fn rendered_height(&self, id: NodeId) -> u32 {
        if !self.is_rendered(id) {
            return 0;
        }
        if let Some(transition) = self.transitions.get(&id) {
            return transition.value_at(self.clock);
        }
        match self.computed_height(id) {
            Height::Px(px) => px,
            Height::Auto => self.arena.get(id).map_or(0, |n| n.content_height),
        }
    }

    /// Apply a style mutation and start, replace or drop the height
    /// transition according to how the computed height changed.
    fn restyle(&mut self, id: NodeId, mutate: impl FnOnce(&mut Node) -> bool) -> Result<bool> {
        let was_rendered = self.is_rendered(id);
        let before = self.computed_height(id);
        let from = self.rendered_height(id);

        let node = self.arena.get_mut(id).ok_or(DomError::UnknownNode(id))?;
        if !mutate(node) {
            return Ok(false);
        }
        self.mutations += 1;

        if !self.is_rendered(id) {
            self.cancel_subtree(id);
            return Ok(true);
        }

        let after = self.computed_height(id);
        if before == after {
            return Ok(true);
        }

        // A new height always supersedes the running transition.
        self.transitions.remove(&id);
        let (Height::Px(_), Height::Px(to)) = (before, after) else {
            return Ok(true);
        };
        if !was_rendered || from == to {
            return Ok(true);
        }
        let Some(config) = self.height_transition(id) else {
            return Ok(true);
        };
        if config.total().is_zero() {
            return Ok(true);
        }

        log::debug!(
            "{}: height transition {}px -> {}px over {:?}",
            id,
            from,
            to,
            config.duration
        );
        self.transitions
            .insert(id, HeightTransition::new(from, to, self.clock, &config));
        Ok(true)
    }

    fn dispatch(&self, event: &Event, path: impl IntoIterator<Item = NodeId>) -> Vec<Notification> {
        let mut notifications = Vec::new();
        for current in path {
            for (listener, registered) in &self.listeners {
                if registered.node == current && event.is(&registered.kind) {
                    notifications.push(Notification {
                        listener: *listener,
                        current_target: current,
                        event: event.clone(),
                    });
                }
            }
        }
        notifications
    }
}

impl Document for MemoryDocument {
    fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>> {
        let selector = Selector::parse(selector)?;
        let mut matches = Vec::new();
        let mut stack = vec![self.body];
        while let Some(id) = stack.pop() {
            if selector.matches(&self.arena, id) {
                matches.push(id);
            }
            if let Some(node) = self.arena.get(id) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        Ok(matches)
    }

    fn is_rendered(&self, node: NodeId) -> bool {
        let chain: Vec<NodeId> = self.arena.ancestry(node).collect();
        chain.last() == Some(&self.body) && !chain.iter().any(|id| self.is_hidden(*id))
    }

    fn scroll_height(&self, node: NodeId) -> Result<u32> {
        let content = self.node_ref(node)?.content_height;
        if !self.is_rendered(node) {
            return Ok(0);
        }
        Ok(content.max(self.rendered_height(node)))
    }

    fn client_height(&self, node: NodeId) -> Result<u32> {
        self.node_ref(node)?;
        Ok(self.rendered_height(node))
    }

    fn has_class(&self, node: NodeId, class: &str) -> Result<bool> {
        Ok(self.node_ref(node)?.classes.contains(class))
    }

    fn add_class(&mut self, node: NodeId, class: &str) -> Result<bool> {
        self.restyle(node, |n| n.classes.add(class))
    }

    fn remove_class(&mut self, node: NodeId, class: &str) -> Result<bool> {
        self.restyle(node, |n| n.classes.remove(class))
    }

    fn inline_height(&self, node: NodeId) -> Result<Option<Height>> {
        Ok(self.node_ref(node)?.style.height)
    }

    fn set_height(&mut self, node: NodeId, height: Height) -> Result<()> {
        self.restyle(node, |n| n.style.height.replace(height) != Some(height))?;
        Ok(())
    }

    fn clear_height(&mut self, node: NodeId) -> Result<()> {
        self.restyle(node, |n| n.style.height.take().is_some())?;
        Ok(())
    }

    fn inline_transition(&self, node: NodeId) -> Result<String> {
        Ok(self.node_ref(node)?.style.transition.clone().unwrap_or_default())
    }

    fn set_transition(&mut self, node: NodeId, declaration: &str) -> Result<()> {
        let value = (!declaration.is_empty()).then(|| declaration.to_string());
        self.restyle(node, |n| {
            if n.style.transition == value {
                return false;
            }
            n.style.transition = value;
            true
        })?;
        Ok(())
    }

    fn computed_transition(&self, node: NodeId) -> Result<String> {
        self.node_ref(node)?;
        Ok(self.transition_declaration(node))
    }

    fn is_transitioning(&self, node: NodeId, property: &str) -> Result<bool> {
        self.node_ref(node)?;
        Ok(property == "height" && self.transitions.contains_key(&node))
    }

    fn add_listener(&mut self, node: NodeId, kind: EventKind) -> Result<ListenerId> {
        self.node_ref(node)?;
        let id = ListenerId::new(self.arena.document(), self.next_listener);
        self.next_listener += 1;
        self.listeners.insert(id, Listener { node, kind });
        self.mutations += 1;
        Ok(id)
    }

    fn remove_listener(&mut self, listener: ListenerId) -> bool {
        let removed = self.listeners.remove(&listener).is_some();
        if removed {
            self.mutations += 1;
        }
        removed
    }
}

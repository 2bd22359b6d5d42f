//! The expand/collapse transition engine.

use std::collections::HashMap;

use foldom::{mentions_property, Document, Event, EventKind, Height, ListenerId, NodeId, Notification};
use log::{debug, trace};

use crate::config::{Config, Settings};
use crate::error::{Error, Result};
use crate::state::ElementState;

const HEIGHT: &str = "height";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Expand,
    Collapse,
}

impl Direction {
    fn in_flight(self) -> ElementState {
        match self {
            Direction::Expand => ElementState::Expanding,
            Direction::Collapse => ElementState::Collapsing,
        }
    }

    fn settled(self) -> ElementState {
        match self {
            Direction::Expand => ElementState::Expanded,
            Direction::Collapse => ElementState::Collapsed,
        }
    }
}

/// Work left for when the height transition of `node` ends.
#[derive(Debug)]
struct Completion {
    node: NodeId,
    token: u64,
    direction: Direction,
    config: Config,
}

/// Animates elements between zero height and their natural content height.
///
/// Each call snapshots the height as pixels, makes sure a height transition
/// exists, sets the target and waits for the document's `transitionend`.
/// A newer call on the same element supersedes any pending completion.
///
/// The engine never owns elements: it only keeps per-node bookkeeping keyed
/// by [`NodeId`] and talks to the host through [`Document`].
#[derive(Debug, Default)]
pub struct Expander {
    settings: Settings,
    states: HashMap<NodeId, ElementState>,
    tokens: HashMap<NodeId, u64>,
    pending: HashMap<ListenerId, Completion>,
    active: HashMap<NodeId, ListenerId>,
    /// Inline transitions saved before the default one was injected.
    saved_transitions: HashMap<NodeId, String>,
}

impl Expander {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: Settings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The recorded state of a node the engine has animated.
    pub fn state(&self, node: NodeId) -> Option<ElementState> {
        self.states.get(&node).copied()
    }

    /// The state the next call acts on.
    ///
    /// An in-flight state is trusted as recorded. A settled state only holds
    /// while the rendered height agrees with it; otherwise, as for nodes the
    /// engine has never seen, the state is inferred from the rendered height.
    pub fn state_of<D: Document>(&self, doc: &D, node: NodeId) -> Result<ElementState> {
        let inferred = ElementState::from_rendered_height(doc.client_height(node)?);
        match self.state(node) {
            Some(state) if !state.is_settled() => return Ok(state),
            Some(state) if state != inferred => {
                trace!("{}: recorded {} but rendered as {}", node, state, inferred);
            }
            _ => {}
        }
        Ok(inferred)
    }

    /// Whether a completion is waiting on the node's transition.
    pub fn is_pending(&self, node: NodeId) -> bool {
        self.active.contains_key(&node)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Expand when closed or closing, collapse otherwise.
    pub fn toggle<D: Document>(&mut self, doc: &mut D, node: NodeId, config: &Config) -> Result<()> {
        self.ensure_rendered(doc, node)?;
        if self.state_of(doc, node)?.is_open() {
            self.collapse(doc, node, config)
        } else {
            self.expand(doc, node, config)
        }
    }

    pub fn expand<D: Document>(&mut self, doc: &mut D, node: NodeId, config: &Config) -> Result<()> {
        self.ensure_rendered(doc, node)?;

        self.mark(doc, node, ElementState::Expanding)?;

        let height = doc.scroll_height(node)?;
        self.ensure_transition(doc, node)?;
        doc.set_height(node, Height::Px(height))?;

        debug!("{}: expanding to {}px", node, height);
        self.begin(doc, node, Direction::Expand, config)
    }

    /// Collapse to zero height. Does nothing if the element is settled with
    /// no rendered height.
    pub fn collapse<D: Document>(&mut self, doc: &mut D, node: NodeId, config: &Config) -> Result<()> {
        self.ensure_rendered(doc, node)?;

        if self.state_of(doc, node)? == ElementState::Collapsed {
            trace!("{}: already collapsed", node);
            self.states.insert(node, ElementState::Collapsed);
            return Ok(());
        }

        self.mark(doc, node, ElementState::Collapsing)?;

        // Height cannot transition from `auto`; pin the natural height first.
        let height = doc.scroll_height(node)?;
        doc.set_height(node, Height::Px(height))?;
        self.ensure_transition(doc, node)?;
        doc.set_height(node, Height::Px(0))?;

        debug!("{}: collapsing from {}px", node, height);
        self.begin(doc, node, Direction::Collapse, config)
    }

    pub fn toggle_matching<D: Document>(&mut self, doc: &mut D, selector: &str, config: &Config) -> Result<usize> {
        self.each_matching(doc, selector, |engine, doc, node| engine.toggle(doc, node, config))
    }

    pub fn expand_matching<D: Document>(&mut self, doc: &mut D, selector: &str, config: &Config) -> Result<usize> {
        self.each_matching(doc, selector, |engine, doc, node| engine.expand(doc, node, config))
    }

    pub fn collapse_matching<D: Document>(&mut self, doc: &mut D, selector: &str, config: &Config) -> Result<usize> {
        self.each_matching(doc, selector, |engine, doc, node| engine.collapse(doc, node, config))
    }

    /// Run the completion a transition-end notification belongs to.
    ///
    /// Returns false when the notification is not for this engine.
    pub fn handle<D: Document>(&mut self, doc: &mut D, notification: &Notification) -> Result<bool> {
        let Event::TransitionEnd { target, property, .. } = &notification.event else {
            return Ok(false);
        };
        if property != HEIGHT {
            return Ok(false);
        }
        let listener = notification.listener;
        match self.pending.get(&listener) {
            // Ends bubbling up from descendants are not ours.
            Some(completion) if completion.node == *target => {}
            _ => return Ok(false),
        }
        let Some(completion) = self.pending.remove(&listener) else {
            return Ok(false);
        };

        doc.remove_listener(listener);
        if self.active.get(&completion.node) == Some(&listener) {
            self.active.remove(&completion.node);
        }

        if self.tokens.get(&completion.node) != Some(&completion.token) {
            trace!("{}: dropping superseded completion", completion.node);
            return Ok(true);
        }

        self.complete(doc, completion)?;
        Ok(true)
    }

    /// Drop all bookkeeping for a node, removing its pending listener and
    /// restoring any injected transition. Marker classes are left as they are.
    ///
    /// Entries are never pruned on their own: call this when a node the
    /// engine has animated is detached or discarded.
    pub fn forget<D: Document>(&mut self, doc: &mut D, node: NodeId) -> Result<()> {
        if let Some(listener) = self.active.remove(&node) {
            self.pending.remove(&listener);
            doc.remove_listener(listener);
        }
        self.restore_transition(doc, node)?;
        self.states.remove(&node);
        self.tokens.remove(&node);
        Ok(())
    }

    fn ensure_rendered<D: Document>(&self, doc: &D, node: NodeId) -> Result<()> {
        // Surfaces foreign handles as document errors first.
        doc.client_height(node)?;
        if doc.is_rendered(node) {
            Ok(())
        } else {
            Err(Error::NotRendered(node))
        }
    }

    fn each_matching<D: Document>(
        &mut self,
        doc: &mut D,
        selector: &str,
        mut apply: impl FnMut(&mut Self, &mut D, NodeId) -> Result<()>,
    ) -> Result<usize> {
        let nodes = doc.query_selector_all(selector)?;
        if nodes.is_empty() {
            return Err(Error::NoMatchingElements {
                selector: selector.to_string(),
            });
        }
        // Validate everything before touching anything.
        if let Some(node) = nodes.iter().find(|node| !doc.is_rendered(**node)) {
            return Err(Error::NotRendered(*node));
        }
        for node in &nodes {
            apply(&mut *self, &mut *doc, *node)?;
        }
        Ok(nodes.len())
    }

    /// Project `state` onto the transition marker classes.
    fn mark<D: Document>(&self, doc: &mut D, node: NodeId, state: ElementState) -> Result<()> {
        for marked in [ElementState::Expanding, ElementState::Collapsing] {
            let Some(class) = marked.marker(&self.settings) else {
                continue;
            };
            if marked == state {
                doc.add_class(node, class)?;
            } else {
                doc.remove_class(node, class)?;
            }
        }
        Ok(())
    }

    /// Inject the default height transition unless one is already declared.
    fn ensure_transition<D: Document>(&mut self, doc: &mut D, node: NodeId) -> Result<()> {
        if self.saved_transitions.contains_key(&node) {
            return Ok(());
        }
        if mentions_property(&doc.computed_transition(node)?, HEIGHT) {
            return Ok(());
        }
        let original = doc.inline_transition(node)?;
        let injected = self.settings.transition_declaration();
        doc.set_transition(node, &injected)?;
        trace!("{}: injected transition '{}'", node, injected);
        self.saved_transitions.insert(node, original);
        Ok(())
    }

    fn restore_transition<D: Document>(&mut self, doc: &mut D, node: NodeId) -> Result<()> {
        if let Some(original) = self.saved_transitions.remove(&node) {
            doc.set_transition(node, &original)?;
        }
        Ok(())
    }

    /// Supersede any pending completion, then wait for the transition or
    /// settle right away when none is running.
    fn begin<D: Document>(&mut self, doc: &mut D, node: NodeId, direction: Direction, config: &Config) -> Result<()> {
        let token = {
            let token = self.tokens.entry(node).or_default();
            *token += 1;
            *token
        };
        if let Some(stale) = self.active.remove(&node) {
            self.pending.remove(&stale);
            doc.remove_listener(stale);
            trace!("{}: superseded pending completion {}", node, stale);
        }

        let completion = Completion {
            node,
            token,
            direction,
            config: config.clone(),
        };

        if doc.is_transitioning(node, HEIGHT)? {
            let listener = doc.add_listener(node, EventKind::transition_end(HEIGHT))?;
            self.pending.insert(listener, completion);
            self.active.insert(node, listener);
            self.states.insert(node, direction.in_flight());
            Ok(())
        } else {
            debug!("{}: no height transition running, settling now", node);
            self.complete(doc, completion)
        }
    }

    fn complete<D: Document>(&mut self, doc: &mut D, completion: Completion) -> Result<()> {
        let Completion {
            node,
            direction,
            config,
            ..
        } = completion;

        let state = direction.settled();
        self.mark(doc, node, state)?;
        match direction {
            Direction::Expand => {
                match config.expanded_class() {
                    Some(class) => {
                        doc.add_class(node, class)?;
                        doc.clear_height(node)?;
                    }
                    None => doc.set_height(node, Height::Auto)?,
                }
                if let Some(class) = config.collapsed_class() {
                    doc.remove_class(node, class)?;
                }
            }
            Direction::Collapse => {
                if let Some(class) = config.expanded_class() {
                    doc.remove_class(node, class)?;
                    doc.clear_height(node)?;
                }
                if let Some(class) = config.collapsed_class() {
                    doc.add_class(node, class)?;
                }
            }
        }

        self.restore_transition(doc, node)?;
        self.states.insert(node, state);
        debug!("{}: {}", node, state);
        Ok(())
    }
}

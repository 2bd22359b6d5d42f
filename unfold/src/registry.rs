//! Click-driven bindings from toggle elements to target elements.

use std::collections::HashMap;

use foldom::{Document, Event, EventKind, ListenerId, NodeId, Notification, Selector};
use log::{debug, warn};

use crate::config::Config;
use crate::engine::Expander;
use crate::error::{Error, Result};

/// What a click on a bound toggle does to its targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Toggle,
    Expand,
    Collapse,
}

/// Registration data for one toggle element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub target_selector: String,
    pub config: Config,
    mode: Mode,
    listener: ListenerId,
}

impl Binding {
    pub fn mode(&self) -> Mode {
        self.mode
    }
}

/// Side table of toggle bindings, keyed by the toggle element.
///
/// Registering a toggle that is already bound replaces its binding and its
/// click listener, so a toggle never carries more than one handler.
#[derive(Debug, Default)]
pub struct Registry {
    bindings: HashMap<NodeId, Binding>,
    by_listener: HashMap<ListenerId, NodeId>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind every element matching `toggle_selector` so that a click toggles
    /// the elements matching `target_selector`. Returns how many toggles
    /// were bound.
    pub fn register_toggle<D: Document>(
        &mut self,
        doc: &mut D,
        toggle_selector: &str,
        target_selector: &str,
        config: Option<Config>,
    ) -> Result<usize> {
        self.register(doc, Mode::Toggle, toggle_selector, target_selector, config)
    }

    /// Like [`Registry::register_toggle`], but clicks only ever expand.
    pub fn register_expander<D: Document>(
        &mut self,
        doc: &mut D,
        toggle_selector: &str,
        target_selector: &str,
        config: Option<Config>,
    ) -> Result<usize> {
        self.register(doc, Mode::Expand, toggle_selector, target_selector, config)
    }

    /// Like [`Registry::register_toggle`], but clicks only ever collapse.
    pub fn register_collapser<D: Document>(
        &mut self,
        doc: &mut D,
        toggle_selector: &str,
        target_selector: &str,
        config: Option<Config>,
    ) -> Result<usize> {
        self.register(doc, Mode::Collapse, toggle_selector, target_selector, config)
    }

    pub fn register<D: Document>(
        &mut self,
        doc: &mut D,
        mode: Mode,
        toggle_selector: &str,
        target_selector: &str,
        config: Option<Config>,
    ) -> Result<usize> {
        if target_selector.trim().is_empty() {
            return Ok(0);
        }
        Selector::parse(target_selector)?;

        let toggles = doc.query_selector_all(toggle_selector)?;
        let config = config.unwrap_or_default();
        for toggle in &toggles {
            self.unregister(doc, *toggle);
            let listener = doc.add_listener(*toggle, EventKind::Click)?;
            self.by_listener.insert(listener, *toggle);
            self.bindings.insert(
                *toggle,
                Binding {
                    target_selector: target_selector.to_string(),
                    config: config.clone(),
                    mode,
                    listener,
                },
            );
        }

        debug!(
            "Bound {} toggle(s) '{}' -> '{}' ({:?})",
            toggles.len(),
            toggle_selector,
            target_selector,
            mode
        );
        Ok(toggles.len())
    }

    pub fn binding(&self, toggle: NodeId) -> Option<&Binding> {
        self.bindings.get(&toggle)
    }

    /// Mutable access; changes apply from the next click.
    pub fn binding_mut(&mut self, toggle: NodeId) -> Option<&mut Binding> {
        self.bindings.get_mut(&toggle)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Remove the binding and click listener of a toggle.
    ///
    /// Bindings of detached toggles stay until removed here or by
    /// [`Registry::clear`].
    pub fn unregister<D: Document>(&mut self, doc: &mut D, toggle: NodeId) -> Option<Binding> {
        let binding = self.bindings.remove(&toggle)?;
        self.by_listener.remove(&binding.listener);
        doc.remove_listener(binding.listener);
        Some(binding)
    }

    /// Remove every binding.
    pub fn clear<D: Document>(&mut self, doc: &mut D) {
        for (_, binding) in self.bindings.drain() {
            doc.remove_listener(binding.listener);
        }
        self.by_listener.clear();
    }

    /// Apply a click to the targets of the bound toggle.
    ///
    /// The binding is read at click time. Targets that are not rendered are
    /// skipped. Returns false when the notification is not for this registry.
    pub fn handle<D: Document>(
        &mut self,
        doc: &mut D,
        engine: &mut Expander,
        notification: &Notification,
    ) -> Result<bool> {
        if !matches!(notification.event, Event::Click { .. }) {
            return Ok(false);
        }
        let Some(toggle) = self.by_listener.get(&notification.listener) else {
            return Ok(false);
        };
        let Some(binding) = self.bindings.get(toggle) else {
            return Ok(false);
        };

        let targets = doc.query_selector_all(&binding.target_selector)?;
        for target in targets {
            let result = match binding.mode {
                Mode::Toggle => engine.toggle(doc, target, &binding.config),
                Mode::Expand => engine.expand(doc, target, &binding.config),
                Mode::Collapse => engine.collapse(doc, target, &binding.config),
            };
            match result {
                Ok(()) => {}
                Err(Error::NotRendered(node)) => {
                    warn!("Skipping {} for '{}': not rendered", node, binding.target_selector);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(true)
    }
}

//! Engine and registry bundled behind one dispatch entry point.

use std::cell::RefCell;

use foldom::{Document, NodeId, Notification};
use log::{trace, warn};

use crate::config::{Config, Settings};
use crate::engine::Expander;
use crate::error::Result;
use crate::registry::Registry;

#[derive(Debug, Default)]
pub struct Controller {
    pub engine: Expander,
    pub registry: Registry,
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: Settings) -> Self {
        Self {
            engine: Expander::with_settings(settings),
            registry: Registry::new(),
        }
    }

    /// Route notifications from the document. Returns how many were handled.
    ///
    /// A failing notification does not stop the batch: every notification is
    /// routed, then the first error is returned.
    pub fn dispatch<D: Document>(
        &mut self,
        doc: &mut D,
        notifications: impl IntoIterator<Item = Notification>,
    ) -> Result<usize> {
        let mut handled = 0;
        let mut first_error = None;
        for notification in notifications {
            match self.route(doc, &notification) {
                Ok(true) => handled += 1,
                Ok(false) => trace!("Unhandled notification {}", notification.listener),
                Err(e) => {
                    warn!("Notification {} failed: {}", notification.listener, e);
                    first_error.get_or_insert(e);
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(handled),
        }
    }

    fn route<D: Document>(&mut self, doc: &mut D, notification: &Notification) -> Result<bool> {
        let claimed = self.registry.handle(doc, &mut self.engine, notification)?;
        Ok(claimed || self.engine.handle(doc, notification)?)
    }

    pub fn toggle<D: Document>(&mut self, doc: &mut D, node: NodeId, config: Option<&Config>) -> Result<()> {
        let config = config.cloned().unwrap_or_default();
        self.engine.toggle(doc, node, &config)
    }

    pub fn expand<D: Document>(&mut self, doc: &mut D, node: NodeId, config: Option<&Config>) -> Result<()> {
        let config = config.cloned().unwrap_or_default();
        self.engine.expand(doc, node, &config)
    }

    pub fn collapse<D: Document>(&mut self, doc: &mut D, node: NodeId, config: Option<&Config>) -> Result<()> {
        let config = config.cloned().unwrap_or_default();
        self.engine.collapse(doc, node, &config)
    }

    pub fn register_toggle<D: Document>(
        &mut self,
        doc: &mut D,
        toggle_selector: &str,
        target_selector: &str,
        config: Option<Config>,
    ) -> Result<usize> {
        self.registry
            .register_toggle(doc, toggle_selector, target_selector, config)
    }

    pub fn register_expander<D: Document>(
        &mut self,
        doc: &mut D,
        toggle_selector: &str,
        target_selector: &str,
        config: Option<Config>,
    ) -> Result<usize> {
        self.registry
            .register_expander(doc, toggle_selector, target_selector, config)
    }

    pub fn register_collapser<D: Document>(
        &mut self,
        doc: &mut D,
        toggle_selector: &str,
        target_selector: &str,
        config: Option<Config>,
    ) -> Result<usize> {
        self.registry
            .register_collapser(doc, toggle_selector, target_selector, config)
    }
}

thread_local! {
    static DEFAULT: RefCell<Controller> = RefCell::new(Controller::new());
}

/// Run `f` with this thread's default controller.
///
/// The controller is shared by every document on the thread. Its bookkeeping
/// is keyed by [`NodeId`], which is scoped to the issuing document, so
/// documents never see each other's state.
///
/// # Panics
///
/// Panics if called re-entrantly from inside `f`.
pub fn with_default<R>(f: impl FnOnce(&mut Controller) -> R) -> R {
    DEFAULT.with(|controller| f(&mut controller.borrow_mut()))
}

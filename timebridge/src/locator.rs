use tracing::{debug, instrument};

use crate::element::UiElement;
use crate::engine::DomEngine;
use crate::errors::AutomationError;
use crate::selector::Selector;
use std::sync::Arc;

/// A high-level API for finding controls on the page.
///
/// There is no polling loop here: the target UIs expose no readiness signal,
/// so all waiting lives behind [`DomEngine::settle`] and callers insert
/// settle delays between mutations instead of retrying lookups.
#[derive(Clone)]
pub struct Locator {
    engine: Arc<dyn DomEngine>,
    selector: Selector,
    root: Option<UiElement>,
}

impl Locator {
    /// Create a new locator with the given selector
    pub(crate) fn new(engine: Arc<dyn DomEngine>, selector: Selector) -> Self {
        Self {
            engine,
            selector,
            root: None,
        }
    }

    /// Scope this locator to descendants of the given element
    pub fn within(mut self, element: UiElement) -> Self {
        self.root = Some(element);
        self
    }

    /// Get all matching elements, in document order.
    #[instrument(level = "debug", skip(self))]
    pub fn all(&self) -> Result<Vec<UiElement>, AutomationError> {
        debug!("Finding elements matching selector: {:?}", self.selector);
        self.engine.find_elements(&self.selector, self.root.as_ref())
    }

    /// Get the first matching element in document order.
    pub fn first(&self) -> Result<UiElement, AutomationError> {
        self.engine.find_element(&self.selector, self.root.as_ref())
    }

    /// Get a nested locator
    pub fn locator(&self, selector: impl Into<Selector>) -> Locator {
        let appended = selector.into();
        let chain = match (self.selector.clone(), appended) {
            (Selector::Chain(mut existing), Selector::Chain(mut next)) => {
                existing.append(&mut next);
                existing
            }
            (Selector::Chain(mut existing), s) => {
                existing.push(s);
                existing
            }
            (head, Selector::Chain(mut next)) => {
                let mut chain = vec![head];
                chain.append(&mut next);
                chain
            }
            (head, s) => vec![head, s],
        };

        Locator {
            engine: self.engine.clone(),
            selector: Selector::Chain(chain),
            root: self.root.clone(),
        }
    }

    pub fn selector_string(&self) -> String {
        format!("{:?}", self.selector)
    }
}

impl std::fmt::Debug for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Locator")
            .field("selector", &self.selector)
            .field("root", &self.root.as_ref().map(UiElement::object_id))
            .finish()
    }
}

use crate::element::UiElement;
use crate::errors::AutomationError;
use crate::selector::Selector;
use async_trait::async_trait;
use std::time::Duration;

/// The automation boundary between this crate and a hosting browser
/// transport.
///
/// This is the entire contract with the environment: locate elements, read
/// them back (via [`UiElement`]), write through the native path, dispatch
/// synthetic events, move focus, and pause. A real implementation drives a
/// live page; [`crate::fake::FakeDom`] drives an in-memory document.
#[async_trait]
pub trait DomEngine: Send + Sync {
    /// The document root. Its accessible name carries the page title.
    fn get_root_element(&self) -> UiElement;

    /// All elements under `root` (or the document root) matching `selector`,
    /// in document order.
    fn find_elements(
        &self,
        selector: &Selector,
        root: Option<&UiElement>,
    ) -> Result<Vec<UiElement>, AutomationError>;

    /// First matching element in document order.
    fn find_element(
        &self,
        selector: &Selector,
        root: Option<&UiElement>,
    ) -> Result<UiElement, AutomationError> {
        self.find_elements(selector, root)?
            .into_iter()
            .next()
            .ok_or_else(|| AutomationError::ControlNotFound(selector.to_string()))
    }

    /// Redirect input focus away from whatever control holds it, onto the
    /// document body. Forces the host UI to run its on-blur revalidation.
    fn focus_body(&self) -> Result<(), AutomationError>;

    /// Pause to let the reactive UI finish re-rendering. The destination
    /// exposes no completion signal, so this is the single injectable wait
    /// capability; test engines override it with a recorded no-op.
    async fn settle(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

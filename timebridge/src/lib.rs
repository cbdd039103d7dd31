//! Timesheet transfer automation for reactive web UIs
//!
//! This crate moves weekly time entries between two unmodifiable web
//! applications by driving their rendered interfaces, in the style of
//! Playwright's automation model: a source app exposing a tabular weekly
//! summary is read by [`extract`], and a destination app exposing a
//! row-based weekly entry form is written by [`sequencer`].
//!
//! The hard part is that the destination is a reactive UI: naive
//! focus-type-blur across its 7 duration inputs makes the framework reset
//! earlier fields when later ones blur, without raising any error. The
//! [`writer`] and [`batch`] modules implement the write protocol that avoids
//! this (silent native-path writes, batched notifications, whole-row blur,
//! verification read-back).
//!
//! All page access flows through the [`DomEngine`] boundary, so tests run
//! the full protocol against the in-memory [`fake::FakeDom`].

use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

pub mod autocomplete;
pub mod batch;
pub mod config;
pub mod element;
pub mod engine;
pub mod errors;
pub mod extract;
pub mod fake;
pub mod locator;
pub mod selector;
pub mod sequencer;
pub mod types;
pub mod writer;

pub use config::SettleConfig;
pub use element::{EventKind, UiAttributes, UiElement};
pub use engine::DomEngine;
pub use errors::AutomationError;
pub use locator::Locator;
pub use selector::Selector;
pub use sequencer::TimeEntrySequencer;
pub use types::{
    DayHours, DayOfWeek, FieldVerification, SequenceResult, SourceEntry, StepResult,
    TimeEntryRequest, WeekSummary,
};

/// The main entry point: one live page, behind a caller-supplied engine.
///
/// The browser transport itself is an external collaborator; anything able
/// to satisfy [`DomEngine`]'s six primitives can host this crate.
pub struct Page {
    engine: Arc<dyn DomEngine>,
}

impl Page {
    pub fn new(engine: Arc<dyn DomEngine>) -> Self {
        Self { engine }
    }

    /// The document root element.
    pub fn root(&self) -> UiElement {
        self.engine.get_root_element()
    }

    /// The page title, carried as the document root's accessible name.
    pub fn title(&self) -> String {
        self.root().attributes().name.unwrap_or_default()
    }

    #[instrument(skip(self, selector))]
    pub fn locator(&self, selector: impl Into<Selector>) -> Locator {
        let selector = selector.into();
        Locator::new(self.engine.clone(), selector)
    }

    /// Redirect focus onto the document body, blurring whatever row control
    /// currently holds it.
    pub fn focus_body(&self) -> Result<(), AutomationError> {
        self.engine.focus_body()
    }

    /// Pause for a settle interval via the engine's wait capability.
    pub async fn settle(&self, duration: Duration) {
        self.engine.settle(duration).await;
    }
}

impl Clone for Page {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
        }
    }
}

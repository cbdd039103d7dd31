use crate::errors::AutomationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Debug;
use tracing::debug;

/// The synthetic notification events a reactive front end listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Input,
    Change,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Input => write!(f, "input"),
            EventKind::Change => write!(f, "change"),
        }
    }
}

/// Attributes associated with a UI control
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UiAttributes {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub role: String,
    /// Accessible name (what a screen reader announces)
    #[serde(default, skip_serializing_if = "is_empty_string")]
    pub name: Option<String>,
    /// Explicit label, the `aria-label` contract both target UIs rely on
    #[serde(default, skip_serializing_if = "is_empty_string")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "is_empty_string")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "is_empty_string")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "is_empty_string")]
    pub class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

fn is_empty_string(opt: &Option<String>) -> bool {
    match opt {
        Some(s) => s.is_empty(),
        None => true,
    }
}

/// Backend implementation of a live control.
///
/// The two write-path primitives are deliberately separate and must never be
/// conflated: `set_value_native` stores a value through the unwrapped
/// assignment path (invisible to the framework's input interception), and
/// `dispatch_event` fires one synthetic bubbling notification. Decoupling
/// "store the value" from "notify the framework" is what lets a caller batch
/// several writes before the framework revalidates anything.
pub trait UiElementImpl: Send + Sync + Debug {
    fn object_id(&self) -> usize;
    fn attributes(&self) -> UiAttributes;
    fn role(&self) -> String {
        self.attributes().role
    }
    fn children(&self) -> Result<Vec<UiElement>, AutomationError>;
    fn parent(&self) -> Result<Option<UiElement>, AutomationError>;
    fn click(&self) -> Result<(), AutomationError>;
    fn focus(&self) -> Result<(), AutomationError>;
    /// Assign the control's underlying value through the native, unwrapped
    /// path. Fires no events.
    fn set_value_native(&self, value: &str) -> Result<(), AutomationError>;
    /// Dispatch one synthetic event of the given kind, with bubbling enabled
    /// so ancestor listeners observe it.
    fn dispatch_event(&self, kind: EventKind) -> Result<(), AutomationError>;
    /// The control's currently rendered value.
    fn value(&self) -> Result<Option<String>, AutomationError>;
    /// The control's visible text content.
    fn text(&self) -> Result<String, AutomationError>;
    fn is_enabled(&self) -> Result<bool, AutomationError>;
    fn clone_box(&self) -> Box<dyn UiElementImpl>;
    fn as_any(&self) -> &dyn std::any::Any;
}

/// Represents a control on the live page
#[derive(Debug)]
pub struct UiElement {
    inner: Box<dyn UiElementImpl>,
}

impl UiElement {
    pub fn new(impl_: Box<dyn UiElementImpl>) -> Self {
        Self { inner: impl_ }
    }

    pub fn object_id(&self) -> usize {
        self.inner.object_id()
    }

    pub fn attributes(&self) -> UiAttributes {
        self.inner.attributes()
    }

    pub fn role(&self) -> String {
        self.inner.role()
    }

    pub fn children(&self) -> Result<Vec<UiElement>, AutomationError> {
        self.inner.children()
    }

    pub fn parent(&self) -> Result<Option<UiElement>, AutomationError> {
        self.inner.parent()
    }

    pub fn click(&self) -> Result<(), AutomationError> {
        debug!(id = self.object_id(), role = %self.role(), "clicking element");
        self.inner.click()
    }

    pub fn focus(&self) -> Result<(), AutomationError> {
        self.inner.focus()
    }

    pub fn set_value_native(&self, value: &str) -> Result<(), AutomationError> {
        self.inner.set_value_native(value)
    }

    pub fn dispatch_event(&self, kind: EventKind) -> Result<(), AutomationError> {
        self.inner.dispatch_event(kind)
    }

    pub fn value(&self) -> Result<Option<String>, AutomationError> {
        self.inner.value()
    }

    pub fn text(&self) -> Result<String, AutomationError> {
        self.inner.text()
    }

    pub fn is_enabled(&self) -> Result<bool, AutomationError> {
        self.inner.is_enabled()
    }

    /// Downcast to a concrete backend type
    pub fn as_any(&self) -> &dyn std::any::Any {
        self.inner.as_any()
    }
}

impl Clone for UiElement {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone_box(),
        }
    }
}

impl PartialEq for UiElement {
    fn eq(&self, other: &Self) -> bool {
        self.inner.object_id() == other.inner.object_id()
    }
}

impl Eq for UiElement {}

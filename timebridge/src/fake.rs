//! In-memory DOM engine for tests and local development.
//!
//! Backs the [`DomEngine`] boundary with a mutable node tree and a journal
//! recording every primitive invocation, so tests can assert ordering
//! invariants (e.g. "no notification fires before the batch-set phase
//! ends"). Settle calls are recorded but do not sleep. Nodes can opt into
//! `revert_on_blur`, simulating a reactive framework silently resetting a
//! value it did not see arrive through its own event path.

use crate::element::{EventKind, UiAttributes, UiElement, UiElementImpl};
use crate::engine::DomEngine;
use crate::errors::AutomationError;
use crate::selector::Selector;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

/// One recorded primitive invocation against the fake document.
#[derive(Debug, Clone, PartialEq)]
pub enum DomEvent {
    SetValue { id: usize, value: String },
    Dispatch { id: usize, kind: EventKind },
    Focus { id: usize },
    Click { id: usize },
    FocusBody,
    Settle(Duration),
}

#[derive(Debug)]
struct NodeState {
    attrs: UiAttributes,
    revert_on_blur: Option<String>,
}

/// A node in the fake document tree.
#[derive(Debug)]
pub struct FakeNode {
    id: usize,
    state: Mutex<NodeState>,
    parent: Mutex<Weak<FakeNode>>,
    children: Mutex<Vec<Arc<FakeNode>>>,
    journal: Arc<Mutex<Vec<DomEvent>>>,
}

pub type FakeHandle = Arc<FakeNode>;

impl FakeNode {
    pub fn id(&self) -> usize {
        self.id
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Declarative description of a node to append to the tree.
#[derive(Debug, Clone, Default)]
pub struct NodeSpec {
    attrs: UiAttributes,
    revert_on_blur: Option<String>,
}

impl NodeSpec {
    pub fn new(role: &str) -> Self {
        Self {
            attrs: UiAttributes {
                role: role.to_string(),
                ..Default::default()
            },
            revert_on_blur: None,
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.attrs.name = Some(name.to_string());
        self
    }

    pub fn label(mut self, label: &str) -> Self {
        self.attrs.label = Some(label.to_string());
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.attrs.text = Some(text.to_string());
        self
    }

    pub fn value(mut self, value: &str) -> Self {
        self.attrs.value = Some(value.to_string());
        self
    }

    pub fn class_name(mut self, class_name: &str) -> Self {
        self.attrs.class_name = Some(class_name.to_string());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.attrs.enabled = Some(false);
        self
    }

    /// When focus leaves the document body, this node's value snaps back to
    /// the given string.
    pub fn revert_on_blur(mut self, value: &str) -> Self {
        self.revert_on_blur = Some(value.to_string());
        self
    }
}

/// The fake document and its engine. Cloning shares the same tree and
/// journal.
#[derive(Clone)]
pub struct FakeDom {
    root: FakeHandle,
    journal: Arc<Mutex<Vec<DomEvent>>>,
    next_id: Arc<AtomicUsize>,
}

impl FakeDom {
    /// A fresh document whose root carries `title` as its accessible name.
    pub fn new(title: &str) -> Self {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let root = Arc::new(FakeNode {
            id: 0,
            state: Mutex::new(NodeState {
                attrs: UiAttributes {
                    role: "document".to_string(),
                    name: Some(title.to_string()),
                    ..Default::default()
                },
                revert_on_blur: None,
            }),
            parent: Mutex::new(Weak::new()),
            children: Mutex::new(Vec::new()),
            journal: journal.clone(),
        });
        Self {
            root,
            journal,
            next_id: Arc::new(AtomicUsize::new(1)),
        }
    }

    /// Append a node under `parent` (or the document root) and return its
    /// handle.
    pub fn append(&self, parent: Option<&FakeHandle>, spec: NodeSpec) -> FakeHandle {
        let parent = parent.unwrap_or(&self.root);
        let node = Arc::new(FakeNode {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            state: Mutex::new(NodeState {
                attrs: spec.attrs,
                revert_on_blur: spec.revert_on_blur,
            }),
            parent: Mutex::new(Arc::downgrade(parent)),
            children: Mutex::new(Vec::new()),
            journal: self.journal.clone(),
        });
        lock(&parent.children).push(node.clone());
        node
    }

    /// Detach a node (and its subtree) from the document.
    pub fn remove(&self, node: &FakeHandle) {
        if let Some(parent) = lock(&node.parent).upgrade() {
            lock(&parent.children).retain(|c| c.id != node.id);
        }
    }

    /// Overwrite a node's rendered value directly, bypassing the journal.
    pub fn force_value(&self, node: &FakeHandle, value: &str) {
        lock(&node.state).attrs.value = Some(value.to_string());
    }

    /// Snapshot of everything recorded so far.
    pub fn journal(&self) -> Vec<DomEvent> {
        lock(&self.journal).clone()
    }

    pub fn clear_journal(&self) {
        lock(&self.journal).clear();
    }

    fn record(&self, event: DomEvent) {
        lock(&self.journal).push(event);
    }

    fn collect_matches(node: &FakeHandle, selector: &Selector, out: &mut Vec<FakeHandle>) {
        for child in lock(&node.children).iter() {
            if selector.matches_attributes(&lock(&child.state).attrs) {
                out.push(child.clone());
            }
            Self::collect_matches(child, selector, out);
        }
    }

    fn find_handles(
        &self,
        selector: &Selector,
        scope: &FakeHandle,
    ) -> Result<Vec<FakeHandle>, AutomationError> {
        match selector {
            Selector::Invalid(reason) => Err(AutomationError::InvalidSelector(reason.clone())),
            Selector::Chain(links) => {
                let mut scopes = vec![scope.clone()];
                for link in links {
                    let mut next = Vec::new();
                    for scope in &scopes {
                        next.extend(self.find_handles(link, scope)?);
                    }
                    // Dedup while preserving document order
                    next.dedup_by_key(|n| n.id);
                    scopes = next;
                }
                Ok(scopes)
            }
            _ => {
                let mut out = Vec::new();
                Self::collect_matches(scope, selector, &mut out);
                Ok(out)
            }
        }
    }

    fn apply_blur_reverts(node: &FakeHandle) {
        {
            let mut state = lock(&node.state);
            if let Some(value) = state.revert_on_blur.clone() {
                state.attrs.value = Some(value);
            }
        }
        for child in lock(&node.children).iter() {
            Self::apply_blur_reverts(child);
        }
    }
}

impl std::fmt::Debug for FakeDom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FakeDom")
            .field("events", &lock(&self.journal).len())
            .finish()
    }
}

#[async_trait]
impl DomEngine for FakeDom {
    fn get_root_element(&self) -> UiElement {
        UiElement::new(Box::new(FakeElement {
            node: self.root.clone(),
        }))
    }

    fn find_elements(
        &self,
        selector: &Selector,
        root: Option<&UiElement>,
    ) -> Result<Vec<UiElement>, AutomationError> {
        let scope = match root {
            Some(element) => as_fake(element)?.node.clone(),
            None => self.root.clone(),
        };
        Ok(self
            .find_handles(selector, &scope)?
            .into_iter()
            .map(|node| UiElement::new(Box::new(FakeElement { node })))
            .collect())
    }

    fn focus_body(&self) -> Result<(), AutomationError> {
        self.record(DomEvent::FocusBody);
        Self::apply_blur_reverts(&self.root);
        Ok(())
    }

    async fn settle(&self, duration: Duration) {
        self.record(DomEvent::Settle(duration));
    }
}

fn as_fake(element: &UiElement) -> Result<&FakeElement, AutomationError> {
    element
        .as_any()
        .downcast_ref::<FakeElement>()
        .ok_or_else(|| AutomationError::BoundaryError("element is not a fake node".to_string()))
}

#[derive(Debug)]
struct FakeElement {
    node: FakeHandle,
}

impl UiElementImpl for FakeElement {
    fn object_id(&self) -> usize {
        self.node.id
    }

    fn attributes(&self) -> UiAttributes {
        lock(&self.node.state).attrs.clone()
    }

    fn children(&self) -> Result<Vec<UiElement>, AutomationError> {
        Ok(lock(&self.node.children)
            .iter()
            .map(|node| {
                UiElement::new(Box::new(FakeElement { node: node.clone() }))
            })
            .collect())
    }

    fn parent(&self) -> Result<Option<UiElement>, AutomationError> {
        Ok(lock(&self.node.parent)
            .upgrade()
            .map(|node| UiElement::new(Box::new(FakeElement { node }))))
    }

    fn click(&self) -> Result<(), AutomationError> {
        lock(&self.node.journal).push(DomEvent::Click { id: self.node.id });
        Ok(())
    }

    fn focus(&self) -> Result<(), AutomationError> {
        lock(&self.node.journal).push(DomEvent::Focus { id: self.node.id });
        Ok(())
    }

    fn set_value_native(&self, value: &str) -> Result<(), AutomationError> {
        lock(&self.node.journal).push(DomEvent::SetValue {
            id: self.node.id,
            value: value.to_string(),
        });
        lock(&self.node.state).attrs.value = Some(value.to_string());
        Ok(())
    }

    fn dispatch_event(&self, kind: EventKind) -> Result<(), AutomationError> {
        lock(&self.node.journal).push(DomEvent::Dispatch {
            id: self.node.id,
            kind,
        });
        Ok(())
    }

    fn value(&self) -> Result<Option<String>, AutomationError> {
        Ok(lock(&self.node.state).attrs.value.clone())
    }

    fn text(&self) -> Result<String, AutomationError> {
        Ok(lock(&self.node.state)
            .attrs
            .text
            .clone()
            .unwrap_or_default())
    }

    fn is_enabled(&self) -> Result<bool, AutomationError> {
        Ok(lock(&self.node.state).attrs.enabled.unwrap_or(true))
    }

    fn clone_box(&self) -> Box<dyn UiElementImpl> {
        Box::new(FakeElement {
            node: self.node.clone(),
        })
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_nodes_by_selector_in_document_order() {
        let dom = FakeDom::new("Test");
        dom.append(None, NodeSpec::new("button").text("New Row"));
        dom.append(None, NodeSpec::new("button").text("Save row"));

        let buttons = dom
            .find_elements(&Selector::from("role:button"), None)
            .unwrap();
        assert_eq!(buttons.len(), 2);
        assert_eq!(buttons[0].text().unwrap(), "New Row");
    }

    #[test]
    fn chain_scopes_each_link_to_previous_matches() {
        let dom = FakeDom::new("Test");
        let listbox = dom.append(None, NodeSpec::new("listbox"));
        dom.append(Some(&listbox), NodeSpec::new("option").text("Technomic"));
        dom.append(None, NodeSpec::new("option").text("Orphan"));

        let options = dom
            .find_elements(&Selector::from("role:listbox >> role:option"), None)
            .unwrap();
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].text().unwrap(), "Technomic");
    }

    #[test]
    fn journal_records_write_primitives_in_order() {
        let dom = FakeDom::new("Test");
        dom.append(None, NodeSpec::new("input").label("Duration"));
        let element = dom
            .find_elements(&Selector::Label("Duration".to_string()), None)
            .unwrap()
            .remove(0);

        element.set_value_native("7.5").unwrap();
        element.dispatch_event(EventKind::Change).unwrap();

        assert_eq!(
            dom.journal(),
            vec![
                DomEvent::SetValue {
                    id: element.object_id(),
                    value: "7.5".to_string()
                },
                DomEvent::Dispatch {
                    id: element.object_id(),
                    kind: EventKind::Change
                },
            ]
        );
    }

    #[test]
    fn blur_applies_revert_behavior() {
        let dom = FakeDom::new("Test");
        dom.append(
            None,
            NodeSpec::new("input").label("Duration").revert_on_blur(""),
        );
        let element = dom
            .find_elements(&Selector::Label("Duration".to_string()), None)
            .unwrap()
            .remove(0);

        element.set_value_native("7.5").unwrap();
        assert_eq!(element.value().unwrap().as_deref(), Some("7.5"));

        dom.focus_body().unwrap();
        assert_eq!(element.value().unwrap().as_deref(), Some(""));
    }
}

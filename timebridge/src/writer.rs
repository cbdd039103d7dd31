//! The reactive field write protocol.
//!
//! Reactive front ends wrap the native value setter so every assignment runs
//! through their own revalidation, which can synchronously reset fields that
//! were written "out of band". The protocol here keeps the two halves of a
//! write apart: [`set_silent`] stores the value through the original,
//! unwrapped path (the framework never sees it happen), and [`notify`] fires
//! the bubbling event the framework listens for. Callers that need the plain
//! focus-type-notify shape use [`write`]; callers filling several related
//! fields call `set_silent` for all of them first and notify afterwards.

use crate::element::{EventKind, UiElement};
use crate::errors::AutomationError;
use tracing::debug;

/// Store `value` through the native path. No events fire; the framework
/// stays unaware until a separate [`notify`].
pub fn set_silent(control: &UiElement, value: &str) -> Result<(), AutomationError> {
    debug!(id = control.object_id(), value, "silent native write");
    control.set_value_native(value)
}

/// Dispatch one bubbling notification event on the control.
pub fn notify(control: &UiElement, kind: EventKind) -> Result<(), AutomationError> {
    debug!(id = control.object_id(), %kind, "dispatching notification");
    control.dispatch_event(kind)
}

/// Single-field write: silent store, then an `input` notification.
pub fn write(control: &UiElement, value: &str) -> Result<(), AutomationError> {
    set_silent(control, value)?;
    notify(control, EventKind::Input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::DomEngine;
    use crate::fake::{DomEvent, FakeDom, NodeSpec};
    use crate::selector::Selector;

    fn input_fixture() -> (FakeDom, UiElement) {
        let dom = FakeDom::new("Test");
        dom.append(None, NodeSpec::new("input").label("Add a service"));
        let element = dom
            .find_elements(&Selector::Label("Add a service".to_string()), None)
            .unwrap()
            .remove(0);
        (dom, element)
    }

    #[test]
    fn write_stores_silently_then_fires_one_input_event() {
        let (dom, input) = input_fixture();
        write(&input, "Development").unwrap();

        assert_eq!(input.value().unwrap().as_deref(), Some("Development"));
        assert_eq!(
            dom.journal(),
            vec![
                DomEvent::SetValue {
                    id: input.object_id(),
                    value: "Development".to_string()
                },
                DomEvent::Dispatch {
                    id: input.object_id(),
                    kind: EventKind::Input
                },
            ]
        );
    }

    #[test]
    fn set_silent_fires_no_events() {
        let (dom, input) = input_fixture();
        set_silent(&input, "7.5").unwrap();

        assert!(dom
            .journal()
            .iter()
            .all(|e| !matches!(e, DomEvent::Dispatch { .. })));
        assert_eq!(input.value().unwrap().as_deref(), Some("7.5"));
    }

    #[test]
    fn notify_is_independently_invokable() {
        let (dom, input) = input_fixture();
        notify(&input, EventKind::Change).unwrap();

        assert_eq!(
            dom.journal(),
            vec![DomEvent::Dispatch {
                id: input.object_id(),
                kind: EventKind::Change
            }]
        );
    }
}

//! Verified batch writes for the destination's 7-day duration row.

use crate::config::SettleConfig;
use crate::element::{EventKind, UiElement};
use crate::errors::AutomationError;
use crate::types::{DayHours, DayOfWeek, FieldVerification};
use crate::writer;
use crate::Page;
use tracing::{debug, instrument, warn};

/// Number of duration inputs a complete destination row renders, Sun..Sat.
pub const ROW_WIDTH: usize = 7;

/// Fill one row of duration inputs and read every value back.
///
/// `controls` must be the row's 7 inputs in the destination's Sun..Sat
/// layout; anything else fails with [`AutomationError::IncompleteRow`]
/// (the row was not created, or controls are disabled or hidden).
///
/// The ordering is the whole point: every non-zero day is written silently
/// first, then all change notifications fire, then the entire row loses
/// focus at once. Blur-time revalidation therefore runs against a fully
/// populated row instead of a partially filled one, which is what stops the
/// framework from resetting earlier fields. Zero-hour days are left
/// untouched, matching the destination's default empty state.
///
/// A locatable row always yields 7 [`FieldVerification`] entries, written
/// days or not; silent reverts and drift in untouched fields surface there,
/// never as an error.
#[instrument(level = "debug", skip_all, fields(total = hours.total()))]
pub async fn fill_row(
    page: &Page,
    controls: &[UiElement],
    hours: &DayHours,
    config: &SettleConfig,
) -> Result<Vec<FieldVerification>, AutomationError> {
    if controls.len() != ROW_WIDTH {
        return Err(AutomationError::IncompleteRow {
            found: controls.len(),
        });
    }

    // Phase 1: batch-set. No notifications yet, for any field.
    for (control, day) in controls.iter().zip(DayOfWeek::DEST_ORDER) {
        let value = hours.get(day);
        if value > 0.0 {
            writer::set_silent(control, &value.to_string())?;
        }
    }
    page.settle(config.batch_set).await;

    // Phase 2: change notifications for the written fields, in day order.
    for (control, day) in controls.iter().zip(DayOfWeek::DEST_ORDER) {
        if hours.get(day) > 0.0 {
            writer::notify(control, EventKind::Change)?;
        }
    }
    page.settle(config.after_notify).await;

    // Phase 3: blur the whole row at once.
    page.focus_body()?;
    page.settle(config.after_blur).await;

    // Phase 4: verification read-back, every field regardless of writes.
    let mut verification = Vec::with_capacity(ROW_WIDTH);
    for (control, day) in controls.iter().zip(DayOfWeek::DEST_ORDER) {
        let actual = control.value()?.unwrap_or_default();
        verification.push(FieldVerification {
            day,
            expected: hours.get(day),
            actual,
        });
    }

    let mismatches = verification.iter().filter(|v| !v.matches()).count();
    if mismatches > 0 {
        warn!(mismatches, "row verification found mismatched fields");
    } else {
        debug!("row verification clean");
    }

    Ok(verification)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{DomEvent, FakeDom, NodeSpec};
    use std::sync::Arc;

    fn row_fixture(inputs: usize) -> (Page, FakeDom, Vec<UiElement>) {
        let dom = FakeDom::new("FreshBooks");
        for _ in 0..inputs {
            dom.append(None, NodeSpec::new("input").label("Duration"));
        }
        let page = Page::new(Arc::new(dom.clone()));
        let controls = page.locator("label:Duration").all().unwrap();
        (page, dom, controls)
    }

    fn hours(pairs: &[(DayOfWeek, f64)]) -> DayHours {
        DayHours::from_pairs(pairs.iter().copied())
    }

    #[tokio::test]
    async fn writes_only_days_with_positive_hours() {
        let (page, dom, controls) = row_fixture(7);
        let hours = hours(&[(DayOfWeek::Mon, 7.5), (DayOfWeek::Tue, 4.5)]);

        let verification = fill_row(&page, &controls, &hours, &SettleConfig::default())
            .await
            .unwrap();

        let set_values: Vec<_> = dom
            .journal()
            .into_iter()
            .filter(|e| matches!(e, DomEvent::SetValue { .. }))
            .collect();
        assert_eq!(set_values.len(), 2);

        assert_eq!(verification.len(), 7);
        let written: Vec<_> = verification.iter().filter(|v| v.expected > 0.0).collect();
        assert_eq!(written.len(), 2);
        assert!(verification.iter().all(FieldVerification::matches));
    }

    #[tokio::test]
    async fn all_silent_writes_precede_the_first_notification() {
        let (page, dom, controls) = row_fixture(7);
        let hours = hours(&[
            (DayOfWeek::Mon, 7.5),
            (DayOfWeek::Wed, 4.5),
            (DayOfWeek::Fri, 4.5),
        ]);

        fill_row(&page, &controls, &hours, &SettleConfig::default())
            .await
            .unwrap();

        let journal = dom.journal();
        let first_dispatch = journal
            .iter()
            .position(|e| matches!(e, DomEvent::Dispatch { .. }))
            .unwrap();
        let last_set = journal
            .iter()
            .rposition(|e| matches!(e, DomEvent::SetValue { .. }))
            .unwrap();
        assert!(last_set < first_dispatch);
    }

    #[tokio::test]
    async fn blur_happens_after_notifications_and_before_read_back() {
        let (page, dom, controls) = row_fixture(7);
        let hours = hours(&[(DayOfWeek::Mon, 1.0)]);

        fill_row(&page, &controls, &hours, &SettleConfig::default())
            .await
            .unwrap();

        let journal = dom.journal();
        let blur = journal
            .iter()
            .position(|e| matches!(e, DomEvent::FocusBody))
            .unwrap();
        let last_dispatch = journal
            .iter()
            .rposition(|e| matches!(e, DomEvent::Dispatch { .. }))
            .unwrap();
        assert!(last_dispatch < blur);
    }

    #[tokio::test]
    async fn short_row_is_incomplete() {
        let (page, _dom, controls) = row_fixture(5);
        let hours = hours(&[(DayOfWeek::Mon, 7.5)]);

        let err = fill_row(&page, &controls, &hours, &SettleConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AutomationError::IncompleteRow { found: 5 }));
    }

    #[tokio::test]
    async fn silent_revert_surfaces_in_verification_not_as_error() {
        let dom = FakeDom::new("FreshBooks");
        for day in 0..7 {
            let spec = NodeSpec::new("input").label("Duration");
            // Monday's control snaps back to empty when the row blurs.
            let spec = if day == 1 { spec.revert_on_blur("") } else { spec };
            dom.append(None, spec);
        }
        let page = Page::new(Arc::new(dom));
        let controls = page.locator("label:Duration").all().unwrap();
        let hours = hours(&[(DayOfWeek::Mon, 7.5), (DayOfWeek::Tue, 4.5)]);

        let verification = fill_row(&page, &controls, &hours, &SettleConfig::default())
            .await
            .unwrap();

        let monday = verification
            .iter()
            .find(|v| v.day == DayOfWeek::Mon)
            .unwrap();
        assert!(!monday.matches());
        let tuesday = verification
            .iter()
            .find(|v| v.day == DayOfWeek::Tue)
            .unwrap();
        assert!(tuesday.matches());
    }
}

//! Type-ahead candidate resolution for the destination's project search.

use crate::config::SettleConfig;
use crate::element::UiElement;
use crate::errors::AutomationError;
use crate::writer;
use crate::Page;
use tracing::{debug, instrument};

const LOADING_SENTINEL: &str = "Loading";

/// Type `query` into the search control, wait for the candidate list to
/// materialize, and click the best match. Returns the chosen candidate's
/// visible text.
///
/// Candidates are scanned in rendered order. Placeholder entries containing
/// "Loading" are never selectable. An exact case-insensitive match wins over
/// any earlier substring match; when no exact match exists, the first
/// substring match in document order is taken.
///
/// Clicking a candidate is expected to populate the destination's hidden
/// selection state; verifying that is left to the caller's later steps.
#[instrument(level = "debug", skip(page, search_control, config))]
pub async fn resolve(
    page: &Page,
    search_control: &UiElement,
    query: &str,
    config: &SettleConfig,
) -> Result<String, AutomationError> {
    search_control.focus()?;
    writer::write(search_control, query)?;
    page.settle(config.dropdown).await;

    let listbox = page
        .locator("role:listbox")
        .first()
        .map_err(|_| AutomationError::DropdownNotFound(format!("no candidate list for {query:?}")))?;

    let options = page.locator("role:option").within(listbox).all()?;
    let wanted = query.to_lowercase();
    let mut exact = None;
    let mut substring = None;

    for option in options {
        let text = option.text()?;
        if text.contains(LOADING_SENTINEL) {
            debug!("skipping loading placeholder");
            continue;
        }
        let candidate = text.trim().to_lowercase();
        if candidate == wanted && exact.is_none() {
            exact = Some((option, text));
        } else if candidate.contains(&wanted) && substring.is_none() {
            substring = Some((option, text));
        }
    }

    let (winner, text) = exact.or(substring).ok_or_else(|| {
        AutomationError::NoMatchingOption(format!("no candidate matched {query:?}"))
    })?;

    debug!(candidate = %text, "selecting candidate");
    winner.click()?;
    page.settle(config.after_select).await;
    Ok(text)
}

//! Structured extraction of the source application's weekly summary table.

use crate::errors::AutomationError;
use crate::types::{DayHours, DayOfWeek, SourceEntry, WeekSummary};
use crate::{Page, Selector};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, instrument};

/// Class token the source app puts on every client/project cell.
const CLIENT_PROJECT_CLASS: &str = "col-timesheet-clientproject";

/// Positional row schema after the client/project cell:
/// `[billable, Mon, Tue, Wed, Thu, Fri, Sat, Sun, Total]`.
const BILLABLE_CELL: usize = 1;
const FIRST_DAY_CELL: usize = 2;
const TOTAL_CELL: usize = 9;

static WEEK_OF: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"Week of ([A-Za-z]+ \d{1,2}, \d{4})").ok());

/// Parse the rendered weekly summary into structured entries.
///
/// Rows are keyed off their client/project cells; each cell's row is read
/// positionally in the source's Mon-first column order. Rows whose Total
/// cell is zero or unparsable are noise (days with no logged time) and are
/// filtered out. The grand total is summed from the included entries, never
/// read from the page's own total row. Pure read: touches nothing, safe to
/// call repeatedly.
#[instrument(level = "debug", skip(page))]
pub fn extract(page: &Page) -> Result<WeekSummary, AutomationError> {
    let cells = page
        .locator(Selector::ClassName(CLIENT_PROJECT_CLASS.to_string()))
        .all()?;

    let mut entries = Vec::new();
    for cell in cells {
        let Some(row) = cell.parent()? else {
            continue;
        };

        let mut texts = Vec::new();
        for child in row.children()? {
            if child.role().eq_ignore_ascii_case("cell") {
                texts.push(child.text()?);
            }
        }

        let (client, project) = split_client_project(&cell.text()?);
        let billable = cell_text(&texts, BILLABLE_CELL) == "Yes";

        let mut hours_by_day = DayHours::new();
        for (offset, day) in DayOfWeek::SOURCE_ORDER.iter().enumerate() {
            hours_by_day.set(*day, parse_cell_number(cell_text(&texts, FIRST_DAY_CELL + offset)));
        }
        let total_hours = parse_cell_number(cell_text(&texts, TOTAL_CELL));

        if total_hours > 0.0 {
            entries.push(SourceEntry {
                client,
                project,
                billable,
                hours_by_day,
                total_hours,
            });
        }
    }

    let week_label = week_label_from_title(&page.title());
    let grand_total = entries.iter().map(|e| e.total_hours).sum();
    debug!(
        entries = entries.len(),
        grand_total, "extracted weekly summary"
    );

    Ok(WeekSummary {
        week_label,
        entries,
        grand_total,
    })
}

fn cell_text(texts: &[String], index: usize) -> &str {
    texts.get(index).map(String::as_str).unwrap_or("").trim()
}

/// The client/project cell renders "Client\nProject". A single line means
/// client and project are the same.
fn split_client_project(raw: &str) -> (String, String) {
    let parts: Vec<&str> = raw
        .split('\n')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    let client = parts.first().copied().unwrap_or("").to_string();
    let project = parts.get(1).copied().unwrap_or(client.as_str()).to_string();
    (client, project)
}

fn parse_cell_number(raw: &str) -> f64 {
    raw.trim().parse::<f64>().unwrap_or(0.0)
}

fn week_label_from_title(title: &str) -> String {
    WEEK_OF
        .as_ref()
        .and_then(|re| re.captures(title))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

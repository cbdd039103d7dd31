use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A day of the week.
///
/// Two fixed orderings exist in this domain and must not be confused: the
/// destination's duration row is laid out Sun-first ([`DayOfWeek::DEST_ORDER`])
/// while the source summary table's columns run Mon-first with Sun last
/// ([`DayOfWeek::SOURCE_ORDER`]). Hours are therefore always keyed by this
/// enum, never by position.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Sun,
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
}

impl DayOfWeek {
    /// Destination UI layout: the 7 duration inputs run Sun..Sat.
    pub const DEST_ORDER: [DayOfWeek; 7] = [
        DayOfWeek::Sun,
        DayOfWeek::Mon,
        DayOfWeek::Tue,
        DayOfWeek::Wed,
        DayOfWeek::Thu,
        DayOfWeek::Fri,
        DayOfWeek::Sat,
    ];

    /// Source table layout: day columns run Mon..Sat with Sun last.
    pub const SOURCE_ORDER: [DayOfWeek; 7] = [
        DayOfWeek::Mon,
        DayOfWeek::Tue,
        DayOfWeek::Wed,
        DayOfWeek::Thu,
        DayOfWeek::Fri,
        DayOfWeek::Sat,
        DayOfWeek::Sun,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            DayOfWeek::Sun => "sun",
            DayOfWeek::Mon => "mon",
            DayOfWeek::Tue => "tue",
            DayOfWeek::Wed => "wed",
            DayOfWeek::Thu => "thu",
            DayOfWeek::Fri => "fri",
            DayOfWeek::Sat => "sat",
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Hours keyed by day, always materialized with all 7 days.
///
/// Values are clamped to be non-negative on the way in; reading a day never
/// fails and never returns a negative number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DayHours {
    hours: BTreeMap<DayOfWeek, f64>,
}

impl DayHours {
    /// All 7 days at zero hours.
    pub fn new() -> Self {
        let mut hours = BTreeMap::new();
        for day in DayOfWeek::DEST_ORDER {
            hours.insert(day, 0.0);
        }
        Self { hours }
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (DayOfWeek, f64)>) -> Self {
        let mut hours = Self::new();
        for (day, value) in pairs {
            hours.set(day, value);
        }
        hours
    }

    pub fn get(&self, day: DayOfWeek) -> f64 {
        self.hours.get(&day).copied().unwrap_or(0.0)
    }

    pub fn set(&mut self, day: DayOfWeek, value: f64) {
        self.hours.insert(day, value.max(0.0));
    }

    /// Sum of all 7 days.
    pub fn total(&self) -> f64 {
        DayOfWeek::DEST_ORDER.iter().map(|d| self.get(*d)).sum()
    }

    /// Values in a caller-chosen day order.
    pub fn in_order(&self, order: &[DayOfWeek; 7]) -> Vec<(DayOfWeek, f64)> {
        order.iter().map(|d| (*d, self.get(*d))).collect()
    }
}

impl Default for DayHours {
    fn default() -> Self {
        Self::new()
    }
}

/// What the caller wants written into the destination: one new row with a
/// project, a service and per-day hours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeEntryRequest {
    pub project_query: String,
    pub service_query: String,
    pub hours_by_day: DayHours,
}

/// Outcome of one named step in a sequenced run. Immutable once produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub step: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Step-specific payload (selected candidate text, mismatch count, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl StepResult {
    pub fn ok(step: &str) -> Self {
        Self {
            step: step.to_string(),
            success: true,
            error: None,
            data: None,
        }
    }

    pub fn ok_with(step: &str, data: serde_json::Value) -> Self {
        Self {
            step: step.to_string(),
            success: true,
            error: None,
            data: Some(data),
        }
    }

    pub fn failed(step: &str, error: impl fmt::Display) -> Self {
        Self {
            step: step.to_string(),
            success: false,
            error: Some(error.to_string()),
            data: None,
        }
    }
}

/// Expected-vs-rendered value for one duration input, read back after the
/// batch write's notifications fired and focus left the row. A mismatch here
/// is the only trace of the destination silently reverting a value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldVerification {
    pub day: DayOfWeek,
    pub expected: f64,
    pub actual: String,
}

impl FieldVerification {
    /// Whether the rendered value agrees with the expectation. An empty
    /// rendered value counts as zero (the destination's default state).
    pub fn matches(&self) -> bool {
        match parse_rendered_hours(&self.actual) {
            Some(actual) => (actual - self.expected).abs() < f64::EPSILON,
            None => false,
        }
    }
}

/// Parse a rendered duration value; empty text is zero, anything unparsable
/// is `None`.
pub(crate) fn parse_rendered_hours(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    trimmed.parse::<f64>().ok()
}

/// Terminal result of a sequenced run. Plain data, never an error object;
/// callers must check `success` explicitly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequenceResult {
    pub success: bool,
    pub steps: Vec<StepResult>,
    /// One entry per day once the fill-hours step ran, empty otherwise.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub verification: Vec<FieldVerification>,
    /// Sum of the hours the caller asked for.
    pub requested_total: f64,
    /// Sum of the parseable read-back values; `None` until the fill-hours
    /// step has run. Divergence from `requested_total` means the destination
    /// silently dropped something.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified_total: Option<f64>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
}

/// One non-empty row of the source summary table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceEntry {
    pub client: String,
    pub project: String,
    pub billable: bool,
    pub hours_by_day: DayHours,
    /// As rendered in the row's Total cell.
    pub total_hours: f64,
}

/// Structured view of the source application's weekly summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekSummary {
    /// Matched out of the page title; empty when the title carries no week.
    pub week_label: String,
    pub entries: Vec<SourceEntry>,
    /// Independently summed from entry totals, never read from the page's
    /// own total row.
    pub grand_total: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_hours_defaults_to_seven_zeroed_days() {
        let hours = DayHours::new();
        for day in DayOfWeek::DEST_ORDER {
            assert_eq!(hours.get(day), 0.0);
        }
        assert_eq!(hours.total(), 0.0);
    }

    #[test]
    fn day_hours_clamps_negative_values() {
        let mut hours = DayHours::new();
        hours.set(DayOfWeek::Mon, -3.0);
        assert_eq!(hours.get(DayOfWeek::Mon), 0.0);
    }

    #[test]
    fn source_to_dest_order_round_trip_preserves_values() {
        // Values laid out positionally in source order (Mon..Sun)
        let source_cells = [7.5, 4.5, 0.0, 2.0, 4.5, 0.0, 1.0];
        let hours = DayHours::from_pairs(
            DayOfWeek::SOURCE_ORDER
                .iter()
                .copied()
                .zip(source_cells.iter().copied()),
        );

        // Read out in destination order, then rebuild from that layout
        let dest_cells: Vec<f64> = hours
            .in_order(&DayOfWeek::DEST_ORDER)
            .into_iter()
            .map(|(_, v)| v)
            .collect();
        let rebuilt = DayHours::from_pairs(
            DayOfWeek::DEST_ORDER
                .iter()
                .copied()
                .zip(dest_cells.iter().copied()),
        );

        assert_eq!(hours, rebuilt);
        assert_eq!(rebuilt.get(DayOfWeek::Mon), 7.5);
        assert_eq!(rebuilt.get(DayOfWeek::Sun), 1.0);
    }

    #[test]
    fn day_hours_serializes_with_lowercase_day_keys() {
        let hours = DayHours::from_pairs([(DayOfWeek::Mon, 7.5)]);
        let json = serde_json::to_value(&hours).unwrap();
        assert_eq!(json["mon"], 7.5);
        assert_eq!(json["sun"], 0.0);
    }

    #[test]
    fn verification_treats_empty_rendered_value_as_zero() {
        let v = FieldVerification {
            day: DayOfWeek::Thu,
            expected: 0.0,
            actual: String::new(),
        };
        assert!(v.matches());
    }

    #[test]
    fn verification_flags_reverted_value() {
        let v = FieldVerification {
            day: DayOfWeek::Mon,
            expected: 7.5,
            actual: "0".to_string(),
        };
        assert!(!v.matches());
    }

    #[test]
    fn verification_flags_unparsable_rendered_value() {
        let v = FieldVerification {
            day: DayOfWeek::Mon,
            expected: 7.5,
            actual: "--".to_string(),
        };
        assert!(!v.matches());
    }
}

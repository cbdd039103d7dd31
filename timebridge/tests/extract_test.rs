use std::sync::Arc;
use timebridge::extract::extract;
use timebridge::fake::{FakeDom, FakeHandle, NodeSpec};
use timebridge::{DayHours, DayOfWeek, Page, TimeEntryRequest};

fn add_row(dom: &FakeDom, table: &FakeHandle, cells: &[&str]) {
    let row = dom.append(Some(table), NodeSpec::new("row"));
    for (i, text) in cells.iter().enumerate() {
        let mut spec = NodeSpec::new("cell").text(text);
        if i == 0 {
            spec = spec.class_name("col-timesheet-clientproject");
        }
        dom.append(Some(&row), spec);
    }
}

fn source_page() -> Page {
    let dom = FakeDom::new("Timesheet - Week of January 6, 2025");
    let table = dom.append(None, NodeSpec::new("table"));
    add_row(
        &dom,
        &table,
        &[
            "Acme\nWebsite",
            "Yes",
            "7.5",
            "4.5",
            "4.5",
            "0",
            "4.5",
            "0",
            "0",
            "21",
        ],
    );
    add_row(
        &dom,
        &table,
        &["Globex\nAudit", "No", "0", "0", "0", "0", "0", "0", "0", "0"],
    );
    add_row(
        &dom,
        &table,
        &["Internal", "No", "0", "0", "1", "0", "0", "0", "0.5", "1.5"],
    );
    Page::new(Arc::new(dom))
}

#[test]
fn extracts_week_summary_with_zero_rows_filtered() {
    let _ = tracing_subscriber::fmt::try_init();
    let summary = extract(&source_page()).unwrap();

    assert_eq!(summary.week_label, "January 6, 2025");
    assert_eq!(summary.entries.len(), 2);
    assert_eq!(summary.grand_total, 22.5);

    let acme = &summary.entries[0];
    assert_eq!((acme.client.as_str(), acme.project.as_str()), ("Acme", "Website"));
    assert!(acme.billable);
    assert_eq!(acme.hours_by_day.get(DayOfWeek::Fri), 4.5);
    assert_eq!(acme.hours_by_day.get(DayOfWeek::Sat), 0.0);

    let internal = &summary.entries[1];
    assert_eq!(internal.client, "Internal");
    assert_eq!(internal.hours_by_day.get(DayOfWeek::Sun), 0.5);
}

/// A source entry's Mon-first hours feed a Sun-first destination request
/// without any day shifting, because hours are keyed by day, not position.
#[test]
fn source_entry_maps_into_a_destination_request_day_for_day() {
    let summary = extract(&source_page()).unwrap();
    let entry = &summary.entries[0];

    let request = TimeEntryRequest {
        project_query: entry.project.clone(),
        service_query: "Development".to_string(),
        hours_by_day: entry.hours_by_day.clone(),
    };

    for day in DayOfWeek::DEST_ORDER {
        assert_eq!(
            request.hours_by_day.get(day),
            entry.hours_by_day.get(day),
            "hours drifted for {day}"
        );
    }
    assert_eq!(request.hours_by_day.total(), 21.0);
}

#[test]
fn week_summary_serializes_to_stable_json() {
    let summary = extract(&source_page()).unwrap();
    let json = serde_json::to_value(&summary).unwrap();

    assert_eq!(json["week_label"], "January 6, 2025");
    assert_eq!(json["grand_total"], 22.5);
    assert_eq!(json["entries"][0]["client"], "Acme");
    assert_eq!(json["entries"][0]["hours_by_day"]["mon"], 7.5);
}

#[test]
fn repeated_extraction_of_unchanged_table_is_structurally_equal() {
    let page = source_page();
    assert_eq!(extract(&page).unwrap(), extract(&page).unwrap());
}

#[test]
fn day_hours_round_trip_between_source_and_destination_orders() {
    let source_cells = [7.5, 4.5, 4.5, 0.0, 4.5, 0.0, 0.0];
    let hours = DayHours::from_pairs(
        DayOfWeek::SOURCE_ORDER
            .iter()
            .copied()
            .zip(source_cells.iter().copied()),
    );

    let dest_layout = hours.in_order(&DayOfWeek::DEST_ORDER);
    let rebuilt = DayHours::from_pairs(dest_layout);

    let source_layout_again: Vec<f64> = rebuilt
        .in_order(&DayOfWeek::SOURCE_ORDER)
        .into_iter()
        .map(|(_, v)| v)
        .collect();
    assert_eq!(source_layout_again, source_cells);
}

//! End-to-end exercises of the exploration pipeline: role inference over a
//! realistic table, filter narrowing, chart projection, and the geographic
//! view, without any UI involved.

use std::collections::BTreeSet;

use tablero::data::chart::{ChartError, ChartSpec, build_chart, build_points};
use tablero::data::filter::{FilterSpec, FilterState, apply_filters, detected_time_range, init_filters};
use tablero::data::model::{CellValue, Column, Table};
use tablero::data::roles::{Role, infer_roles};

/// 100 rows, no missing values, three income groups cycling 0,1,2,0,...
fn urban_table() -> Table {
    let n = 100;
    let income: Vec<CellValue> = (0..n)
        .map(|i| CellValue::String(format!("Q{}", i % 3 + 1)))
        .collect();
    let gender: Vec<CellValue> = (0..n)
        .map(|i| CellValue::String(if i % 2 == 0 { "female" } else { "male" }.into()))
        .collect();
    let municipality: Vec<CellValue> = (0..n)
        .map(|i| CellValue::String(format!("city_{}", i % 5)))
        .collect();
    let year: Vec<CellValue> = (0..n)
        .map(|i| CellValue::Integer(2018 + (i % 5) as i64))
        .collect();
    let value_a: Vec<CellValue> = (0..n).map(|i| CellValue::Float(i as f64 * 0.5)).collect();
    let value_b: Vec<CellValue> = (0..n).map(|i| CellValue::Float(100.0 - i as f64)).collect();

    Table::new(vec![
        Column::new("income_group", income),
        Column::new("gender", gender),
        Column::new("municipality", municipality),
        Column::new("year", year),
        Column::new("value_a", value_a),
        Column::new("value_b", value_b),
    ])
    .unwrap()
}

#[test]
fn roles_cover_all_heuristic_columns() {
    let table = urban_table();
    let roles = infer_roles(&table);
    assert_eq!(roles.get(&Role::Income).map(String::as_str), Some("income_group"));
    assert_eq!(roles.get(&Role::Gender).map(String::as_str), Some("gender"));
    assert_eq!(roles.get(&Role::Region).map(String::as_str), Some("municipality"));
    assert_eq!(roles.get(&Role::Time).map(String::as_str), Some("year"));
    assert!(!roles.contains_key(&Role::Latitude));
    assert!(!roles.contains_key(&Role::Longitude));
}

#[test]
fn narrowing_income_to_one_group_keeps_exactly_its_rows() {
    let table = urban_table();
    let roles = infer_roles(&table);

    let mut selected = BTreeSet::new();
    selected.insert(CellValue::String("Q2".into()));
    let mut filters = init_filters(&table, &roles);
    filters.insert(Role::Income, FilterSpec::Values(selected));

    let filtered = apply_filters(&table, &roles, &filters);
    // i % 3 == 1 over 0..100 → 33 rows.
    assert_eq!(filtered.n_rows(), 33);
    for value in &filtered.column("income_group").unwrap().values {
        assert_eq!(value, &CellValue::String("Q2".into()));
    }
}

#[test]
fn unparseable_dates_drop_their_rows_under_the_full_range() {
    let raw: Vec<String> = (0..50)
        .map(|i| {
            if i % 10 == 3 {
                "not-a-date".to_string()
            } else {
                format!("2020-{:02}-{:02}", i % 12 + 1, i % 28 + 1)
            }
        })
        .collect();
    let raw_refs: Vec<&str> = raw.iter().map(String::as_str).collect();
    let values: Vec<String> = (0..50).map(|i| i.to_string()).collect();
    let value_refs: Vec<&str> = values.iter().map(String::as_str).collect();

    let table = Table::new(vec![
        Column::from_text("date", &raw_refs),
        Column::from_text("value", &value_refs),
    ])
    .unwrap();
    let roles = infer_roles(&table);
    assert_eq!(roles.get(&Role::Time).map(String::as_str), Some("date"));

    let (min, max) = detected_time_range(&table, "date").unwrap();
    let mut filters = FilterState::new();
    filters.insert(Role::Time, FilterSpec::TimeRange { min, max });

    let filtered = apply_filters(&table, &roles, &filters);
    assert_eq!(filtered.n_rows(), 45);
}

#[test]
fn tables_without_coordinates_produce_no_map_points() {
    let table = urban_table();
    let roles = infer_roles(&table);
    assert!(build_points(&table, &roles).is_empty());
}

#[test]
fn text_axis_fails_without_disturbing_filters_or_roles() {
    let table = urban_table();
    let roles = infer_roles(&table);
    let filters = init_filters(&table, &roles);
    let filtered = apply_filters(&table, &roles, &filters);
    let rows_before = filtered.n_rows();

    let spec = ChartSpec {
        x: "gender".into(),
        y: "value_b".into(),
        color: None,
    };
    let err = build_chart(&filtered, &roles, &spec).unwrap_err();
    assert!(matches!(err, ChartError::InvalidAxis { axis: "x", .. }));

    // The failure is confined to the chart: the filtered view and role map
    // still drive a valid projection.
    assert_eq!(apply_filters(&table, &roles, &filters).n_rows(), rows_before);
    let good = ChartSpec {
        x: "value_a".into(),
        y: "value_b".into(),
        color: Some(Role::Income),
    };
    let data = build_chart(&filtered, &roles, &good).unwrap();
    assert_eq!(data.points.len(), rows_before);
}

#[test]
fn grouped_projection_emits_one_point_per_row_with_hover_metadata() {
    let table = urban_table();
    let roles = infer_roles(&table);
    let spec = ChartSpec {
        x: "value_a".into(),
        y: "value_b".into(),
        color: Some(Role::Region),
    };
    let data = build_chart(&table, &roles, &spec).unwrap();
    assert_eq!(data.points.len(), 100);
    assert_eq!(
        data.points[7].group,
        Some(CellValue::String("city_2".into()))
    );
    assert!(data.points[7].hover.contains("income_group: Q2"));
    assert!(data.points[7].hover.contains("year: 2020"));
}

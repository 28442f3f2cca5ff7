use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use super::model::{CellValue, Table};
use super::roles::{ColumnRoleMap, Role};

// ---------------------------------------------------------------------------
// Filter predicates: accepted values per categorical role, date range for time
// ---------------------------------------------------------------------------

/// The constraint currently active for one role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterSpec {
    /// Accepted values for a categorical role. A full set (all distinct
    /// observed values) means "unfiltered"; an empty set matches nothing.
    Values(BTreeSet<CellValue>),
    /// Inclusive bounds for the time role. An inverted range matches nothing.
    TimeRange { min: NaiveDate, max: NaiveDate },
}

/// Per-role filter state. Roles absent from the map impose no constraint.
pub type FilterState = BTreeMap<Role, FilterSpec>;

/// The inclusive [min, max] span of parseable dates in a column, or `None`
/// when no cell parses as a date.
pub fn detected_time_range(table: &Table, column: &str) -> Option<(NaiveDate, NaiveDate)> {
    let col = table.column(column)?;
    let mut range: Option<(NaiveDate, NaiveDate)> = None;
    for value in &col.values {
        if let Some(d) = value.as_date() {
            range = Some(match range {
                None => (d, d),
                Some((lo, hi)) => (lo.min(d), hi.max(d)),
            });
        }
    }
    range
}

/// Initialise a [`FilterState`] that accepts everything: every distinct value
/// selected per categorical role, the full detected range for the time role.
pub fn init_filters(table: &Table, roles: &ColumnRoleMap) -> FilterState {
    let mut filters = FilterState::new();
    for (&role, column) in roles {
        if role.is_categorical() {
            filters.insert(role, FilterSpec::Values(table.distinct_values(column)));
        } else if role == Role::Time {
            if let Some((min, max)) = detected_time_range(table, column) {
                filters.insert(role, FilterSpec::TimeRange { min, max });
            }
        }
    }
    filters
}

/// Return indices of rows passing all active filters.
///
/// A row passes a categorical filter when:
/// * the role is unmapped or absent from `filters` → passes (no constraint)
/// * every distinct value is still selected → passes (no effective filter)
/// * otherwise its value must be a member of the selected set; null values
///   fail once the filter is narrowed
///
/// For the time filter, a row passes when its cell parses as a date inside
/// the inclusive range; unparseable cells drop the row.
pub fn filtered_indices(table: &Table, roles: &ColumnRoleMap, filters: &FilterState) -> Vec<usize> {
    // Resolve each active filter to its column up front; a full selection is
    // no effective filter and is dropped here.
    let active: Vec<(&crate::data::model::Column, &FilterSpec)> = filters
        .iter()
        .filter_map(|(role, spec)| {
            let col = table.column(roles.get(role)?)?;
            if let FilterSpec::Values(selected) = spec {
                if !selected.is_empty() && *selected == table.distinct_values(&col.name) {
                    return None;
                }
            }
            Some((col, spec))
        })
        .collect();

    (0..table.n_rows())
        .filter(|&row| {
            for (col, spec) in &active {
                let value = &col.values[row];
                match spec {
                    FilterSpec::Values(selected) => {
                        if value.is_null() || !selected.contains(value) {
                            return false;
                        }
                    }
                    FilterSpec::TimeRange { min, max } => match value.as_date() {
                        Some(d) if d >= *min && d <= *max => {}
                        _ => return false,
                    },
                }
            }
            true
        })
        .collect()
}

/// Derive the filtered table: the conjunction of all active filters applied
/// to `table`, as a new table. Never mutates `table` in place.
pub fn apply_filters(table: &Table, roles: &ColumnRoleMap, filters: &FilterState) -> Table {
    table.select_rows(&filtered_indices(table, roles, filters))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Column;
    use crate::data::roles::infer_roles;

    fn sample_table() -> Table {
        Table::new(vec![
            Column::from_text("income_group", &["low", "mid", "high", "low", ""]),
            Column::from_text("date", &["2020-01-01", "2020-06-01", "bad", "2021-01-01", "2021-06-01"]),
            Column::from_text("value", &["1", "2", "3", "4", "5"]),
        ])
        .unwrap()
    }

    fn one_value(v: &str) -> FilterSpec {
        let mut set = BTreeSet::new();
        set.insert(CellValue::String(v.into()));
        FilterSpec::Values(set)
    }

    #[test]
    fn default_filters_keep_every_row() {
        let table = sample_table();
        let roles = infer_roles(&table);
        let filters = init_filters(&table, &roles);
        // The time filter still drops the one unparseable date.
        assert_eq!(filtered_indices(&table, &roles, &filters), vec![0, 1, 3, 4]);
    }

    #[test]
    fn narrowed_value_set_excludes_nulls_and_others() {
        let table = sample_table();
        let roles = infer_roles(&table);
        let mut filters = FilterState::new();
        filters.insert(Role::Income, one_value("low"));
        assert_eq!(filtered_indices(&table, &roles, &filters), vec![0, 3]);
    }

    #[test]
    fn empty_selection_yields_empty_table() {
        let table = sample_table();
        let roles = infer_roles(&table);
        let mut filters = FilterState::new();
        filters.insert(Role::Income, FilterSpec::Values(BTreeSet::new()));
        let out = apply_filters(&table, &roles, &filters);
        assert!(out.is_empty());
    }

    #[test]
    fn inverted_time_range_yields_empty_table() {
        let table = sample_table();
        let roles = infer_roles(&table);
        let mut filters = FilterState::new();
        filters.insert(
            Role::Time,
            FilterSpec::TimeRange {
                min: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
                max: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            },
        );
        assert!(apply_filters(&table, &roles, &filters).is_empty());
    }

    #[test]
    fn time_range_is_inclusive_and_drops_unparseable() {
        let table = sample_table();
        let roles = infer_roles(&table);
        let mut filters = FilterState::new();
        filters.insert(
            Role::Time,
            FilterSpec::TimeRange {
                min: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
                max: NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
            },
        );
        // Row 2 ("bad") is dropped, row 4 is past the bound.
        assert_eq!(filtered_indices(&table, &roles, &filters), vec![0, 1, 3]);
    }

    #[test]
    fn filtering_is_idempotent() {
        let table = sample_table();
        let roles = infer_roles(&table);
        let mut filters = FilterState::new();
        filters.insert(Role::Income, one_value("low"));
        filters.insert(
            Role::Time,
            FilterSpec::TimeRange {
                min: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
                max: NaiveDate::from_ymd_opt(2021, 12, 31).unwrap(),
            },
        );

        let once = apply_filters(&table, &roles, &filters);
        let twice = apply_filters(&once, &roles, &filters);
        assert_eq!(once.n_rows(), twice.n_rows());
        for (a, b) in once.columns().iter().zip(twice.columns()) {
            assert_eq!(a.values, b.values);
        }
    }

    #[test]
    fn shrinking_a_selection_never_grows_the_result() {
        let table = sample_table();
        let roles = infer_roles(&table);

        let mut wide = BTreeSet::new();
        wide.insert(CellValue::String("low".into()));
        wide.insert(CellValue::String("mid".into()));

        let mut filters = FilterState::new();
        filters.insert(Role::Income, FilterSpec::Values(wide.clone()));
        let n_wide = filtered_indices(&table, &roles, &filters).len();

        wide.remove(&CellValue::String("mid".into()));
        filters.insert(Role::Income, FilterSpec::Values(wide));
        let n_narrow = filtered_indices(&table, &roles, &filters).len();

        assert!(n_narrow <= n_wide);
    }

    #[test]
    fn filters_compose_by_conjunction() {
        let table = sample_table();
        let roles = infer_roles(&table);
        let mut filters = FilterState::new();
        filters.insert(Role::Income, one_value("low"));
        filters.insert(
            Role::Time,
            FilterSpec::TimeRange {
                min: NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
                max: NaiveDate::from_ymd_opt(2021, 12, 31).unwrap(),
            },
        );
        assert_eq!(filtered_indices(&table, &roles, &filters), vec![3]);
    }
}

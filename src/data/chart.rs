use thiserror::Error;

use super::model::{CellValue, Table};
use super::roles::{ColumnRoleMap, Role};

// ---------------------------------------------------------------------------
// Chart projection: table → per-row point set
// ---------------------------------------------------------------------------

/// The chosen x/y/color-by columns for the current chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartSpec {
    pub x: String,
    pub y: String,
    /// Group points by this mapped categorical role, or `None` for a single
    /// ungrouped series.
    pub color: Option<Role>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChartError {
    #[error("{axis} axis '{column}' is not a numeric column of this table")]
    InvalidAxis { axis: &'static str, column: String },
    #[error("'{0}' is not a mapped categorical role")]
    InvalidGroup(Role),
}

/// One projected row.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    pub x: f64,
    pub y: f64,
    /// Label of the color-by group, if grouping is active.
    pub group: Option<CellValue>,
    /// Full-row metadata for display on hover.
    pub hover: String,
}

/// A direct per-row projection of the table: no aggregation or binning.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartData {
    pub points: Vec<ChartPoint>,
}

fn numeric_column<'t>(
    table: &'t Table,
    name: &str,
    axis: &'static str,
) -> Result<&'t super::model::Column, ChartError> {
    match table.column(name) {
        Some(col) if col.ty.is_numeric() => Ok(col),
        _ => Err(ChartError::InvalidAxis {
            axis,
            column: name.to_string(),
        }),
    }
}

/// Project `table` onto the spec's axes: one point per row whose x and y
/// cells are numeric (rows with null cells are dropped, not reported).
pub fn build_chart(
    table: &Table,
    roles: &ColumnRoleMap,
    spec: &ChartSpec,
) -> Result<ChartData, ChartError> {
    let x_col = numeric_column(table, &spec.x, "x")?;
    let y_col = numeric_column(table, &spec.y, "y")?;

    let group_col = match spec.color {
        None => None,
        Some(role) => {
            let column = roles
                .get(&role)
                .filter(|_| role.is_categorical())
                .ok_or(ChartError::InvalidGroup(role))?;
            table.column(column)
        }
    };

    let mut points = Vec::new();
    for row in 0..table.n_rows() {
        let (Some(x), Some(y)) = (x_col.values[row].as_f64(), y_col.values[row].as_f64()) else {
            continue;
        };
        let group = group_col.map(|c| c.values[row].clone());
        let hover = table
            .row(row)
            .map(|(name, value)| format!("{name}: {value}"))
            .collect::<Vec<_>>()
            .join("\n");
        points.push(ChartPoint { x, y, group, hover });
    }
    Ok(ChartData { points })
}

// ---------------------------------------------------------------------------
// Geographic projection
// ---------------------------------------------------------------------------

/// Project the mapped latitude/longitude columns into (lat, lon) pairs.
/// Returns the empty sequence when either geographic role is unmapped; rows
/// with non-numeric or out-of-range coordinates are dropped silently.
pub fn build_points(table: &Table, roles: &ColumnRoleMap) -> Vec<(f64, f64)> {
    let (Some(lat_name), Some(lon_name)) =
        (roles.get(&Role::Latitude), roles.get(&Role::Longitude))
    else {
        return Vec::new();
    };
    let (Some(lat_col), Some(lon_col)) = (table.column(lat_name), table.column(lon_name)) else {
        return Vec::new();
    };

    (0..table.n_rows())
        .filter_map(|row| {
            let lat = lat_col.values[row].as_f64()?;
            let lon = lon_col.values[row].as_f64()?;
            ((-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon))
                .then_some((lat, lon))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Column;
    use crate::data::roles::infer_roles;

    fn sample_table() -> Table {
        Table::new(vec![
            Column::from_text("gender", &["f", "m", "f"]),
            Column::from_text("value_a", &["1", "2", ""]),
            Column::from_text("value_b", &["10", "20", "30"]),
            Column::from_text("lat", &["19.4", "95.0", "25.7"]),
            Column::from_text("lon", &["-99.1", "-100.3", "-100.3"]),
        ])
        .unwrap()
    }

    #[test]
    fn one_point_per_row_with_numeric_cells() {
        let table = sample_table();
        let roles = infer_roles(&table);
        let spec = ChartSpec {
            x: "value_a".into(),
            y: "value_b".into(),
            color: Some(Role::Gender),
        };
        let data = build_chart(&table, &roles, &spec).unwrap();
        // Row 2 has a null x cell and is dropped.
        assert_eq!(data.points.len(), 2);
        assert_eq!(data.points[0].group, Some(CellValue::String("f".into())));
        assert!(data.points[0].hover.contains("value_b: 10"));
    }

    #[test]
    fn text_axis_is_rejected() {
        let table = sample_table();
        let roles = infer_roles(&table);
        let spec = ChartSpec {
            x: "gender".into(),
            y: "value_b".into(),
            color: None,
        };
        assert_eq!(
            build_chart(&table, &roles, &spec),
            Err(ChartError::InvalidAxis {
                axis: "x",
                column: "gender".into()
            })
        );
    }

    #[test]
    fn missing_axis_column_is_rejected() {
        let table = sample_table();
        let roles = infer_roles(&table);
        let spec = ChartSpec {
            x: "value_a".into(),
            y: "nope".into(),
            color: None,
        };
        assert!(matches!(
            build_chart(&table, &roles, &spec),
            Err(ChartError::InvalidAxis { axis: "y", .. })
        ));
    }

    #[test]
    fn unmapped_group_role_is_rejected() {
        let table = sample_table();
        let roles = infer_roles(&table);
        let spec = ChartSpec {
            x: "value_a".into(),
            y: "value_b".into(),
            color: Some(Role::Income),
        };
        assert_eq!(
            build_chart(&table, &roles, &spec),
            Err(ChartError::InvalidGroup(Role::Income))
        );
    }

    #[test]
    fn geo_points_drop_out_of_range_rows() {
        let table = sample_table();
        let roles = infer_roles(&table);
        let pts = build_points(&table, &roles);
        // Row 1 has lat 95.0, outside [-90, 90].
        assert_eq!(pts, vec![(19.4, -99.1), (25.7, -100.3)]);
    }

    #[test]
    fn geo_points_empty_without_both_roles() {
        let table = Table::new(vec![
            Column::from_text("lat", &["19.4"]),
            Column::from_text("value", &["1"]),
        ])
        .unwrap();
        let roles = infer_roles(&table);
        assert!(build_points(&table, &roles).is_empty());
    }

    #[test]
    fn chart_error_leaves_inputs_usable() {
        let table = sample_table();
        let roles = infer_roles(&table);
        let bad = ChartSpec {
            x: "gender".into(),
            y: "value_b".into(),
            color: None,
        };
        let _ = build_chart(&table, &roles, &bad);
        // Role map and table still drive a valid projection afterwards.
        let good = ChartSpec {
            x: "value_a".into(),
            y: "value_b".into(),
            color: Some(Role::Gender),
        };
        assert!(build_chart(&table, &roles, &good).is_ok());
    }
}

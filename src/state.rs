use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::color::ColorMap;
use crate::data::chart::{ChartData, ChartSpec, build_chart, build_points};
use crate::data::filter::{FilterSpec, FilterState, filtered_indices, init_filters};
use crate::data::model::{CellValue, Table};
use crate::data::roles::{ColumnRoleMap, Role, infer_roles};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
///
/// Derived values (`visible_indices`, `filtered`, `chart_data`, `geo_points`)
/// are recomputed from the original table on every filter or axis change;
/// the original table itself is never mutated.
pub struct AppState {
    /// Loaded table (None until a source is fetched or a file opened).
    pub table: Option<Table>,

    /// Semantic roles inferred from column names.
    pub roles: ColumnRoleMap,

    /// Per-role filter selections.
    pub filters: FilterState,

    /// Indices of rows passing the current filters (cached).
    pub visible_indices: Vec<usize>,

    /// The filtered view of the table (cached).
    pub filtered: Option<Table>,

    /// Chosen numeric axes for the scatter chart.
    pub x_column: Option<String>,
    pub y_column: Option<String>,

    /// Which mapped categorical role colours the points, if any.
    pub color_role: Option<Role>,

    /// Active colour map for the colour-by role.
    pub color_map: Option<ColorMap>,

    /// Chart projection of the filtered table, when the axes are valid.
    pub chart_data: Option<ChartData>,

    /// Chart projection failure, shown without disturbing filters/preview.
    pub chart_error: Option<String>,

    /// (lat, lon) pairs for the geographic view; empty unless both
    /// geographic roles are mapped.
    pub geo_points: Vec<(f64, f64)>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Whether a fetch is in progress.
    pub loading: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            table: None,
            roles: ColumnRoleMap::new(),
            filters: FilterState::new(),
            visible_indices: Vec::new(),
            filtered: None,
            x_column: None,
            y_column: None,
            color_role: None,
            color_map: None,
            chart_data: None,
            chart_error: None,
            geo_points: Vec::new(),
            status_message: None,
            loading: false,
        }
    }
}

impl AppState {
    /// Ingest a newly acquired table: infer roles, reset filters to accept
    /// everything, pick default axes, and derive the first views.
    pub fn set_table(&mut self, table: Table) {
        self.roles = infer_roles(&table);
        self.filters = init_filters(&table, &self.roles);

        let numeric: Vec<String> = table
            .numeric_columns()
            .into_iter()
            .map(str::to_string)
            .collect();
        self.x_column = numeric.first().cloned();
        self.y_column = numeric.get(1).or(numeric.first()).cloned();

        self.color_role = self
            .roles
            .keys()
            .copied()
            .find(|r| r.is_categorical());

        self.table = Some(table);
        self.status_message = None;
        self.loading = false;
        self.rebuild_color_map();
        self.rederive();
    }

    /// Recompute every derived view from the original table.
    pub fn rederive(&mut self) {
        let Some(table) = &self.table else {
            return;
        };

        self.visible_indices = filtered_indices(table, &self.roles, &self.filters);
        let filtered = table.select_rows(&self.visible_indices);

        self.geo_points = build_points(&filtered, &self.roles);

        self.chart_data = None;
        self.chart_error = None;
        if let (Some(x), Some(y)) = (&self.x_column, &self.y_column) {
            let spec = ChartSpec {
                x: x.clone(),
                y: y.clone(),
                color: self.color_role,
            };
            match build_chart(&filtered, &self.roles, &spec) {
                Ok(data) => self.chart_data = Some(data),
                Err(e) => self.chart_error = Some(e.to_string()),
            }
        }

        self.filtered = Some(filtered);
    }

    /// Rebuild the colour map from the current colour-by role. Colours are
    /// assigned over the full table's distinct values so they stay stable
    /// while filtering.
    pub fn rebuild_color_map(&mut self) {
        self.color_map = None;
        let (Some(table), Some(role)) = (&self.table, self.color_role) else {
            return;
        };
        if let Some(column) = self.roles.get(&role) {
            let distinct = table.distinct_values(column);
            self.color_map = Some(ColorMap::new(column, &distinct));
        }
    }

    pub fn set_axes(&mut self, x: Option<String>, y: Option<String>) {
        self.x_column = x;
        self.y_column = y;
        self.rederive();
    }

    pub fn set_color_role(&mut self, role: Option<Role>) {
        self.color_role = role;
        self.rebuild_color_map();
        self.rederive();
    }

    /// Toggle a single accepted value in a categorical role's filter.
    pub fn toggle_filter_value(&mut self, role: Role, value: &CellValue) {
        let spec = self
            .filters
            .entry(role)
            .or_insert_with(|| FilterSpec::Values(BTreeSet::new()));
        if let FilterSpec::Values(selected) = spec {
            if !selected.remove(value) {
                selected.insert(value.clone());
            }
        }
        self.rederive();
    }

    /// Accept every distinct value for a role again.
    pub fn select_all(&mut self, role: Role) {
        let Some(table) = &self.table else { return };
        if let Some(column) = self.roles.get(&role) {
            let all = table.distinct_values(column);
            self.filters.insert(role, FilterSpec::Values(all));
        }
        self.rederive();
    }

    /// Accept nothing for a role (matches no rows).
    pub fn select_none(&mut self, role: Role) {
        self.filters
            .insert(role, FilterSpec::Values(BTreeSet::new()));
        self.rederive();
    }

    /// Narrow or widen the time filter's inclusive bounds.
    pub fn set_time_range(&mut self, min: NaiveDate, max: NaiveDate) {
        self.filters.insert(Role::Time, FilterSpec::TimeRange { min, max });
        self.rederive();
    }

    /// The accepted-value set currently active for a categorical role.
    pub fn selected_values(&self, role: Role) -> Option<&BTreeSet<CellValue>> {
        match self.filters.get(&role) {
            Some(FilterSpec::Values(set)) => Some(set),
            _ => None,
        }
    }

    /// The time filter's current bounds.
    pub fn time_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        match self.filters.get(&Role::Time) {
            Some(FilterSpec::TimeRange { min, max }) => Some((*min, *max)),
            _ => None,
        }
    }
}

use std::collections::BTreeMap;

use eframe::egui::{self, Color32, Ui};
use egui_plot::{Plot, PlotPoints, Points};

use crate::data::model::CellValue;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Axis selectors (central panel header)
// ---------------------------------------------------------------------------

/// Render the x/y axis combo boxes, restricted to numeric columns.
pub fn chart_controls(ui: &mut Ui, state: &mut AppState) {
    let Some(table) = &state.table else {
        return;
    };
    let numeric: Vec<String> = table
        .numeric_columns()
        .into_iter()
        .map(str::to_string)
        .collect();

    ui.horizontal(|ui: &mut Ui| {
        for (label, id, current) in [
            ("X axis", "x_axis", state.x_column.clone()),
            ("Y axis", "y_axis", state.y_column.clone()),
        ] {
            ui.label(label);
            let mut selection = current.clone();
            egui::ComboBox::from_id_salt(id)
                .selected_text(selection.clone().unwrap_or_default())
                .show_ui(ui, |ui: &mut Ui| {
                    for col in &numeric {
                        if ui
                            .selectable_label(current.as_deref() == Some(col), col)
                            .clicked()
                        {
                            selection = Some(col.clone());
                        }
                    }
                });
            if selection != current {
                if id == "x_axis" {
                    state.set_axes(selection, state.y_column.clone());
                } else {
                    state.set_axes(state.x_column.clone(), selection);
                }
            }
            ui.separator();
        }
    });
}

// ---------------------------------------------------------------------------
// Scatter chart (central panel)
// ---------------------------------------------------------------------------

/// Render the scatter chart of the current projection.
pub fn scatter_plot(ui: &mut Ui, state: &AppState) {
    if state.table.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Fetch or open a dataset to explore it  (Data menu)");
        });
        return;
    }
    let Some(chart) = &state.chart_data else {
        // An invalid axis pair is already reported in the top bar.
        return;
    };

    // Group points by colour-by value so each group is one legend entry.
    let mut groups: BTreeMap<Option<CellValue>, Vec<[f64; 2]>> = BTreeMap::new();
    for p in &chart.points {
        groups
            .entry(p.group.clone())
            .or_default()
            .push([p.x, p.y]);
    }

    // Full-row metadata for the hovered point.
    let points_for_hover = chart.points.clone();
    let label_formatter = move |name: &str, value: &egui_plot::PlotPoint| {
        let nearest = points_for_hover
            .iter()
            .min_by(|a, b| {
                let da = (a.x - value.x).powi(2) + (a.y - value.y).powi(2);
                let db = (b.x - value.x).powi(2) + (b.y - value.y).powi(2);
                da.total_cmp(&db)
            });
        match nearest {
            Some(p) => {
                if name.is_empty() {
                    p.hover.clone()
                } else {
                    format!("{name}\n{}", p.hover)
                }
            }
            None => String::new(),
        }
    };

    let x_label = state.x_column.clone().unwrap_or_default();
    let y_label = state.y_column.clone().unwrap_or_default();

    Plot::new("scatter_plot")
        .legend(egui_plot::Legend::default())
        .x_axis_label(x_label)
        .y_axis_label(y_label)
        .label_formatter(label_formatter)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for (group, coords) in groups {
                let color = group
                    .as_ref()
                    .and_then(|v| state.color_map.as_ref().map(|cm| cm.color_for(v)))
                    .unwrap_or(Color32::LIGHT_BLUE);
                let name = group
                    .as_ref()
                    .map(|v| v.to_string())
                    .unwrap_or_default();

                let points = Points::new(PlotPoints::from(coords))
                    .name(name)
                    .color(color)
                    .radius(2.5);
                plot_ui.points(points);
            }
        });
}

// ---------------------------------------------------------------------------
// Geographic point view
// ---------------------------------------------------------------------------

/// Render the (lon, lat) point view. Only called when points exist, i.e.
/// both geographic roles are mapped.
pub fn map_plot(ui: &mut Ui, state: &AppState) {
    let coords: Vec<[f64; 2]> = state
        .geo_points
        .iter()
        .map(|&(lat, lon)| [lon, lat])
        .collect();

    Plot::new("map_plot")
        .data_aspect(1.0)
        .x_axis_label("longitude")
        .y_axis_label("latitude")
        .show(ui, |plot_ui| {
            plot_ui.points(
                Points::new(PlotPoints::from(coords))
                    .color(Color32::from_rgb(80, 160, 220))
                    .radius(3.0),
            );
        });
}

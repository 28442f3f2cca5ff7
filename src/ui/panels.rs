use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column as TableColumn, DatePickerButton, TableBuilder};

use crate::data::loader::load_file;
use crate::data::roles::Role;
use crate::data::source::{CatalogSource, DataSource};
use crate::state::AppState;

/// How many filtered rows the preview table shows.
const PREVIEW_ROWS: usize = 20;

// ---------------------------------------------------------------------------
// Left side panel – role-driven filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel: one collapsible widget per mapped
/// categorical role, plus a date-range picker when the time role is mapped.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let Some(table) = &state.table else {
        ui.label("No dataset loaded.");
        return;
    };

    // Clone what we need so we can mutate state inside the loop.
    let categorical: Vec<(Role, String, std::collections::BTreeSet<_>)> = state
        .roles
        .iter()
        .filter(|(role, _)| role.is_categorical())
        .map(|(&role, col)| (role, col.clone(), table.distinct_values(col)))
        .collect();
    let time_column = state.roles.get(&Role::Time).cloned();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Colour-by selector ----
            ui.strong("Color by");
            let current = state
                .color_role
                .map(|r| r.label().to_string())
                .unwrap_or_else(|| "none".to_string());
            egui::ComboBox::from_id_salt("color_by")
                .selected_text(&current)
                .show_ui(ui, |ui: &mut Ui| {
                    if ui
                        .selectable_label(state.color_role.is_none(), "none")
                        .clicked()
                    {
                        state.set_color_role(None);
                    }
                    for (role, _, _) in &categorical {
                        if ui
                            .selectable_label(state.color_role == Some(*role), role.label())
                            .clicked()
                        {
                            state.set_color_role(Some(*role));
                        }
                    }
                });
            ui.separator();

            // ---- Per-role value filters (collapsible) ----
            for (role, column, all_values) in &categorical {
                let n_selected = state
                    .selected_values(*role)
                    .map_or(all_values.len(), |s| s.len());
                let header_text =
                    format!("{}  ({n_selected}/{})", role.label(), all_values.len());

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(column)
                    .default_open(false)
                    .show(ui, |ui: &mut Ui| {
                        ui.horizontal(|ui: &mut Ui| {
                            if ui.small_button("All").clicked() {
                                state.select_all(*role);
                            }
                            if ui.small_button("None").clicked() {
                                state.select_none(*role);
                            }
                        });

                        for val in all_values {
                            let is_selected = state
                                .selected_values(*role)
                                .is_some_and(|s| s.contains(val));

                            // Show colour swatch if this is the colour role.
                            let mut text = RichText::new(val.to_string());
                            if state.color_role == Some(*role) {
                                if let Some(cm) = &state.color_map {
                                    text = text.color(cm.color_for(val));
                                }
                            }

                            let mut checked = is_selected;
                            if ui.checkbox(&mut checked, text).changed() {
                                state.toggle_filter_value(*role, val);
                            }
                        }
                    });
            }

            // ---- Time range ----
            if let (Some(column), Some((mut min, mut max))) = (time_column, state.time_range()) {
                ui.separator();
                ui.strong(format!("Time range ({column})"));
                let mut changed = false;
                ui.horizontal(|ui: &mut Ui| {
                    changed |= ui
                        .add(DatePickerButton::new(&mut min).id_salt("time_min"))
                        .changed();
                    ui.label("to");
                    changed |= ui
                        .add(DatePickerButton::new(&mut max).id_salt("time_max"))
                        .changed();
                });
                if changed {
                    state.set_time_range(min, max);
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("Data", |ui: &mut Ui| {
            if ui.button("Fetch catalog dataset").clicked() {
                fetch_catalog(state);
                ui.close_menu();
            }
            if ui.button("Open file…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(table) = &state.table {
            ui.label(format!(
                "{} rows loaded, {} match filters",
                table.n_rows(),
                state.visible_indices.len()
            ));
            // An empty result is a normal state, not an error.
            if state.visible_indices.is_empty() && !table.is_empty() {
                ui.label(RichText::new("no rows match the current filters").weak());
            }
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
        if let Some(err) = &state.chart_error {
            ui.separator();
            ui.label(RichText::new(err).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Bottom panel – filtered data preview
// ---------------------------------------------------------------------------

/// Render the preview of the filtered table (first rows only).
pub fn preview_panel(ui: &mut Ui, state: &AppState) {
    let Some(filtered) = &state.filtered else {
        return;
    };

    ui.strong(format!(
        "Filtered data (first {} of {} rows)",
        filtered.n_rows().min(PREVIEW_ROWS),
        filtered.n_rows()
    ));

    let n_cols = filtered.columns().len();
    if n_cols == 0 {
        return;
    }

    TableBuilder::new(ui)
        .striped(true)
        .columns(TableColumn::auto().resizable(true), n_cols)
        .header(18.0, |mut header| {
            for name in filtered.column_names() {
                header.col(|ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|mut body| {
            for row in 0..filtered.n_rows().min(PREVIEW_ROWS) {
                body.row(16.0, |mut table_row| {
                    for (_, value) in filtered.row(row) {
                        table_row.col(|ui| {
                            ui.label(value.to_string());
                        });
                    }
                });
            }
        });
}

// ---------------------------------------------------------------------------
// Data acquisition
// ---------------------------------------------------------------------------

/// Fetch the configured catalog dataset. A single synchronous call; failure
/// surfaces as a status message and abandons this cycle.
pub fn fetch_catalog(state: &mut AppState) {
    state.loading = true;
    let source = CatalogSource::default();
    match source.fetch_table() {
        Ok(table) => {
            log::info!(
                "Fetched {} rows with columns {:?}",
                table.n_rows(),
                table.column_names().collect::<Vec<_>>()
            );
            state.set_table(table);
        }
        Err(e) => {
            log::error!("Catalog fetch failed: {e}");
            state.status_message = Some(format!("Error: {e}"));
            state.loading = false;
        }
    }
}

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open tabular data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.loading = true;
        match load_file(&path) {
            Ok(table) => {
                log::info!(
                    "Loaded {} rows with columns {:?}",
                    table.n_rows(),
                    table.column_names().collect::<Vec<_>>()
                );
                state.set_table(table);
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
                state.loading = false;
            }
        }
    }
}

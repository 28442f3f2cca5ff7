use eframe::egui;

use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct TableroApp {
    pub state: AppState,
}

impl eframe::App for TableroApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar and status ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: role-driven filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Bottom panel: filtered data preview ----
        if self.state.filtered.is_some() {
            egui::TopBottomPanel::bottom("preview_panel")
                .resizable(true)
                .default_height(180.0)
                .show(ctx, |ui| {
                    panels::preview_panel(ui, &self.state);
                });
        }

        // ---- Central panel: axis controls, scatter chart, optional map ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::chart_controls(ui, &mut self.state);
            if self.state.geo_points.is_empty() {
                plot::scatter_plot(ui, &self.state);
            } else {
                let half = ui.available_height() / 2.0;
                ui.allocate_ui(egui::vec2(ui.available_width(), half), |ui| {
                    plot::scatter_plot(ui, &self.state);
                });
                ui.separator();
                plot::map_plot(ui, &self.state);
            }
        });
    }
}

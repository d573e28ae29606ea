use eframe::egui::{self, Ui};

use crate::state::AppState;
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct OutcomesApp {
    pub state: AppState,
}

impl OutcomesApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for OutcomesApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: metrics, charts, preview, export ----
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.state.view.is_none() {
                ui.centered_and_justified(|ui: &mut Ui| {
                    ui.heading("Open a file to explore outcomes  (File → Open…)");
                });
                return;
            }

            egui::ScrollArea::vertical()
                .id_salt("dashboard_scroll")
                .show(ui, |ui: &mut Ui| {
                    panels::metric_cards(ui, &self.state);
                    ui.add_space(8.0);
                    plot::chart_tabs(ui, &mut self.state);
                    ui.add_space(8.0);
                    table::preview_table(ui, &self.state);
                    ui.add_space(8.0);
                    if ui.button("⬇ Download filtered data (CSV)").clicked() {
                        panels::export_dialog(&mut self.state);
                    }
                });
        });
    }
}

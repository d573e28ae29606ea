use eframe::egui::{self, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::CellValue;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Preview table – first rows of the filtered view
// ---------------------------------------------------------------------------

pub fn preview_table(ui: &mut Ui, state: &AppState) {
    let Some(view) = &state.view else {
        return;
    };
    let preview = &view.preview;

    ui.strong(format!(
        "Preview: first {} of {} filtered records",
        preview.len(),
        view.filtered.len()
    ));
    if preview.is_empty() {
        ui.label(RichText::new("No records match the current filters.").weak());
        return;
    }

    egui::ScrollArea::horizontal()
        .id_salt("preview_scroll")
        .show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .resizable(true)
                .max_scroll_height(360.0)
                .columns(Column::auto().at_least(70.0), preview.column_names().len())
                .header(22.0, |mut header| {
                    for name in preview.column_names() {
                        header.col(|ui: &mut Ui| {
                            ui.strong(name);
                        });
                    }
                })
                .body(|body| {
                    body.rows(20.0, preview.len(), |mut row| {
                        let cells = &preview.rows()[row.index()];
                        for cell in cells {
                            row.col(|ui: &mut Ui| {
                                ui.label(cell_text(cell));
                            });
                        }
                    });
                });
        });
}

fn cell_text(cell: &CellValue) -> String {
    match cell {
        CellValue::Null => String::new(),
        CellValue::Float(v) => format!("{v:.2}"),
        other => other.to_string(),
    }
}

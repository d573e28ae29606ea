use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::filter::{ALL_GENDERS, NumericRange};
use crate::data::model::col;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    if state.dataset.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            field_filter(ui, state);
            ui.separator();

            ui.strong("University GPA");
            match state.gpa_bounds {
                Some(bounds) => range_sliders(ui, "gpa", bounds, &mut state.criteria.gpa_range, 2),
                None => no_range(ui, state, col::UNIVERSITY_GPA),
            }
            ui.separator();

            ui.strong("Starting salary");
            match state.salary_bounds {
                Some(bounds) => {
                    range_sliders(ui, "salary", bounds, &mut state.criteria.salary_range, 0)
                }
                None => no_range(ui, state, col::STARTING_SALARY),
            }
            ui.separator();

            gender_filter(ui, state);

            if let Some(view) = &state.view {
                ui.separator();
                ui.label(
                    RichText::new(format!("{} filters active", view.active_filters)).weak(),
                );
            }
        });

    // Recompute the view if any widget changed the criteria.
    state.refresh();
}

fn field_filter(ui: &mut Ui, state: &mut AppState) {
    if state.field_options.is_empty() {
        ui.strong("Field of study");
        missing(ui, &[col::FIELD_OF_STUDY]);
        return;
    }

    let n_selected = state.criteria.selected_fields.len();
    let n_total = state.field_options.len();
    let header_text = format!("Field of study  ({n_selected}/{n_total})");

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt("field_filter")
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    state.select_all_fields();
                }
                if ui.small_button("None").clicked() {
                    state.select_no_fields();
                }
            });
            if state.criteria.selected_fields.is_empty() {
                ui.label(RichText::new("Nothing selected: showing every field").weak());
            }

            let options: Vec<String> = state.field_options.iter().cloned().collect();
            for field in &options {
                let mut checked = state.criteria.selected_fields.contains(field);
                let text = RichText::new(field).color(state.field_colors.color_for(field));
                if ui.checkbox(&mut checked, text).changed() {
                    state.toggle_field(field);
                }
            }
        });
}

/// Two sliders (min, max) over the observed bounds. Keeps `min <= max`.
fn range_sliders(
    ui: &mut Ui,
    id: &str,
    (lo, hi): (f64, f64),
    range: &mut Option<NumericRange>,
    decimals: usize,
) {
    let current = range.get_or_insert(NumericRange::new(lo, hi));
    ui.push_id(id, |ui: &mut Ui| {
        ui.add(egui::Slider::new(&mut current.min, lo..=hi).text("min").max_decimals(decimals));
        ui.add(egui::Slider::new(&mut current.max, lo..=hi).text("max").max_decimals(decimals));
    });
    if current.min > current.max {
        current.max = current.min;
    }
}

fn gender_filter(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Gender");
    if state.gender_options.is_empty() {
        missing(ui, &[col::GENDER]);
        return;
    }

    let current = state.criteria.gender.to_string();
    let mut chosen: Option<String> = None;
    egui::ComboBox::from_id_salt("gender")
        .selected_text(&current)
        .show_ui(ui, |ui: &mut Ui| {
            let options = std::iter::once(ALL_GENDERS).chain(state.gender_options.iter().map(String::as_str));
            for option in options {
                if ui.selectable_label(current == option, option).clicked() {
                    chosen = Some(option.to_string());
                }
            }
        });
    if let Some(label) = chosen {
        state.set_gender(&label);
    }
}

/// Warning shown in place of a widget whose source columns are absent.
/// Shown in place of range sliders: the column is either absent (filter off)
/// or present without numeric values (every record excluded).
fn no_range(ui: &mut Ui, state: &AppState, column: &str) {
    let present = state.dataset.as_ref().is_some_and(|d| d.has_column(column));
    if present {
        let color = ui.visuals().warn_fg_color;
        ui.label(RichText::new(format!("No numeric values in {column}: every record is excluded")).color(color));
    } else {
        missing(ui, &[column]);
    }
}

pub fn missing(ui: &mut Ui, columns: &[&str]) {
    let color = ui.visuals().warn_fg_color;
    ui.label(RichText::new(format!("Not available: requires column {}", columns.join(", "))).color(color));
}

// ---------------------------------------------------------------------------
// Metric cards
// ---------------------------------------------------------------------------

/// The five summary cards across the top of the central panel.
pub fn metric_cards(ui: &mut Ui, state: &AppState) {
    let Some(view) = &state.view else {
        return;
    };
    let metrics = &view.summary.metrics;
    let cards = [
        ("Average GPA", metrics.gpa_label()),
        ("Average starting salary", metrics.salary_label()),
        ("Total job offers", metrics.job_offers_label()),
        ("Internships completed", metrics.internships_label()),
        ("Projects completed", metrics.projects_label()),
    ];

    ui.columns(cards.len(), |columns: &mut [Ui]| {
        for (ui, (title, value)) in columns.iter_mut().zip(cards) {
            egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
                ui.vertical_centered(|ui: &mut Ui| {
                    ui.label(RichText::new(title).weak());
                    ui.label(RichText::new(value).size(22.0).strong());
                });
            });
        }
    });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(state.source.is_some(), egui::Button::new("Reload"))
                .clicked()
            {
                // Failures are logged and shown in the status bar by `open`.
                let _ = state.reload();
                ui.close_menu();
            }
            if ui
                .add_enabled(state.view.is_some(), egui::Button::new("Export filtered CSV…"))
                .clicked()
            {
                export_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(ds), Some(view)) = (&state.dataset, &state.view) {
            ui.label(format!(
                "{} records loaded, {} match the filters",
                ds.len(),
                view.filtered.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            let color = if msg.starts_with("Error") {
                Color32::RED
            } else {
                ui.visuals().text_color()
            };
            ui.label(RichText::new(msg).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open outcomes data")
        .add_filter("Supported files", &["csv", "parquet", "pq", "json"])
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        // Failures are logged and shown in the status bar by `open`.
        let _ = state.open(&path);
    }
}

pub fn export_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export filtered records")
        .set_file_name(&state.config.export_name)
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        // Failures are logged and shown in the status bar by `export`.
        let _ = state.export(&path);
    }
}

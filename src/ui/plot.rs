use std::collections::BTreeMap;

use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, Legend, Plot, PlotUi, Points};

use crate::color::generate_palette;
use crate::data::aggregate::{CategoryCount, EmploymentBreakdown, GroupMean, HistogramBin, PairCount};
use crate::data::model::col;
use crate::state::{AppState, ChartTab};
use crate::ui::panels::missing;

const CHART_HEIGHT: f32 = 320.0;

// ---------------------------------------------------------------------------
// Chart tabs (central panel)
// ---------------------------------------------------------------------------

/// Tab strip plus the selected chart.
pub fn chart_tabs(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        for tab in ChartTab::ALL {
            ui.selectable_value(&mut state.tab, tab, tab.label());
        }
    });
    ui.separator();

    let Some(view) = &state.view else {
        return;
    };
    let summary = &view.summary;

    match state.tab {
        ChartTab::FieldShare => match &summary.field_shares {
            Some(shares) => field_share_chart(ui, state, shares),
            None => missing(ui, &[col::FIELD_OF_STUDY]),
        },
        ChartTab::SalaryByField => match &summary.salary_by_field {
            Some(means) => salary_by_field_chart(ui, state, means),
            None => missing(ui, &[col::FIELD_OF_STUDY, col::STARTING_SALARY]),
        },
        ChartTab::Internships => match &summary.internships_by_field {
            Some(pairs) => internships_chart(ui, state, pairs),
            None => missing(ui, &[col::FIELD_OF_STUDY, col::INTERNSHIPS_COMPLETED]),
        },
        ChartTab::Employment => match &summary.employment {
            EmploymentBreakdown::Status(counts) => employment_status_chart(ui, counts),
            EmploymentBreakdown::JobOfferHistogram(bins) => job_offer_histogram(ui, bins),
            EmploymentBreakdown::Unavailable => {
                missing(ui, &[col::EMPLOYMENT_STATUS, col::JOB_OFFERS])
            }
        },
        ChartTab::GpaVsSalary => match &summary.gpa_vs_salary {
            Some(points) => gpa_vs_salary_chart(ui, points),
            None => missing(ui, &[col::UNIVERSITY_GPA, col::STARTING_SALARY]),
        },
    }
}

fn show_plot(ui: &mut Ui, id: &str, x_label: &str, y_label: &str, add: impl FnOnce(&mut PlotUi)) {
    Plot::new(id)
        .legend(Legend::default())
        .height(CHART_HEIGHT)
        .x_axis_label(x_label.to_string())
        .y_axis_label(y_label.to_string())
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(true)
        .show(ui, add);
}

// ---------------------------------------------------------------------------
// Individual charts
// ---------------------------------------------------------------------------

/// Share of records per field, in percent. One series per field so the
/// legend names them.
fn field_share_chart(ui: &mut Ui, state: &AppState, shares: &[CategoryCount]) {
    show_plot(ui, "field_share", "Field of study", "Share of graduates (%)", |plot_ui| {
        for (i, share) in shares.iter().enumerate() {
            let color = state.field_colors.color_for(&share.label);
            let bar = Bar::new(i as f64, share.share * 100.0)
                .name(format!("{} ({})", share.label, share.count))
                .width(0.7)
                .fill(color);
            plot_ui.bar_chart(BarChart::new(vec![bar]).name(&share.label).color(color));
        }
    });
}

/// Mean starting salary per field, horizontal bars, lowest first.
fn salary_by_field_chart(ui: &mut Ui, state: &AppState, means: &[GroupMean]) {
    show_plot(ui, "salary_by_field", "Average starting salary", "Field of study", |plot_ui| {
        for (i, group) in means.iter().enumerate() {
            let color = state.field_colors.color_for(&group.label);
            let bar = Bar::new(i as f64, group.mean)
                .name(&group.label)
                .width(0.7)
                .fill(color);
            plot_ui.bar_chart(
                BarChart::new(vec![bar])
                    .name(&group.label)
                    .color(color)
                    .horizontal(),
            );
        }
    });
}

/// Records per internship count, bars grouped side by side per field.
fn internships_chart(ui: &mut Ui, state: &AppState, pairs: &[PairCount]) {
    let mut by_field: BTreeMap<&str, Vec<&PairCount>> = BTreeMap::new();
    for pair in pairs {
        by_field.entry(pair.field.as_str()).or_default().push(pair);
    }
    let n_fields = by_field.len().max(1) as f64;
    let width = 0.8 / n_fields;

    show_plot(ui, "internships", "Internships completed", "Graduates", |plot_ui| {
        for (slot, (field, entries)) in by_field.iter().enumerate() {
            let color = state.field_colors.color_for(field);
            let offset = -0.4 + width * (slot as f64 + 0.5);
            let bars: Vec<Bar> = entries
                .iter()
                .filter_map(|pair| {
                    let x = pair.internships.as_f64()?;
                    Some(Bar::new(x + offset, pair.count as f64).width(width).fill(color))
                })
                .collect();
            plot_ui.bar_chart(BarChart::new(bars).name(*field).color(color));
        }
    });
}

fn employment_status_chart(ui: &mut Ui, counts: &[CategoryCount]) {
    let palette = generate_palette(counts.len());
    show_plot(ui, "employment_status", "Employment status", "Graduates", |plot_ui| {
        for (i, (status, color)) in counts.iter().zip(palette).enumerate() {
            let bar = Bar::new(i as f64, status.count as f64)
                .name(&status.label)
                .width(0.7)
                .fill(color);
            plot_ui.bar_chart(BarChart::new(vec![bar]).name(&status.label).color(color));
        }
    });
}

fn job_offer_histogram(ui: &mut Ui, bins: &[HistogramBin]) {
    ui.label("Employment_Status not present: showing the job offer distribution.");
    show_plot(ui, "job_offers", "Job offers", "Graduates", |plot_ui| {
        let bars: Vec<Bar> = bins
            .iter()
            .map(|bin| {
                Bar::new(bin.value, bin.count as f64).width(0.8)
            })
            .collect();
        plot_ui.bar_chart(BarChart::new(bars).name("Job offers").color(Color32::LIGHT_BLUE));
    });
}

fn gpa_vs_salary_chart(ui: &mut Ui, points: &[[f64; 2]]) {
    show_plot(ui, "gpa_vs_salary", "University GPA", "Starting salary", |plot_ui| {
        plot_ui.points(
            Points::new(points.to_vec())
                .radius(2.5)
                .color(Color32::LIGHT_BLUE)
                .name("Graduates"),
        );
    });
}

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use crate::color::ColorMap;
use crate::config::DashboardConfig;
use crate::data::aggregate::Summary;
use crate::data::cache::DatasetCache;
use crate::data::export::{ExportError, export_to_path};
use crate::data::filter::{FilterCriteria, GenderFilter, active_predicates, apply};
use crate::data::model::{Dataset, col};

// ---------------------------------------------------------------------------
// Chart tabs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartTab {
    #[default]
    FieldShare,
    SalaryByField,
    Internships,
    Employment,
    GpaVsSalary,
}

impl ChartTab {
    pub const ALL: [ChartTab; 5] = [
        ChartTab::FieldShare,
        ChartTab::SalaryByField,
        ChartTab::Internships,
        ChartTab::Employment,
        ChartTab::GpaVsSalary,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ChartTab::FieldShare => "Field share",
            ChartTab::SalaryByField => "Salary by field",
            ChartTab::Internships => "Internships",
            ChartTab::Employment => "Employment",
            ChartTab::GpaVsSalary => "GPA vs salary",
        }
    }
}

// ---------------------------------------------------------------------------
// Derived view
// ---------------------------------------------------------------------------

/// Everything computed from (dataset, criteria). Rebuilt from scratch on
/// every criteria change.
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub filtered: Dataset,
    pub preview: Dataset,
    pub summary: Summary,
    pub active_filters: usize,
}

impl DashboardView {
    pub fn compute(dataset: &Dataset, criteria: &FilterCriteria, preview_rows: usize) -> Self {
        let filtered = apply(dataset, criteria);
        let preview = filtered.head(preview_rows);
        let summary = Summary::compute(&filtered);
        DashboardView {
            active_filters: active_predicates(dataset, criteria).len(),
            filtered,
            preview,
            summary,
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    cache: DatasetCache,

    /// Loaded dataset (None until a file loads successfully).
    pub dataset: Option<Arc<Dataset>>,

    /// File the current dataset came from.
    pub source: Option<PathBuf>,

    /// Current sidebar selections.
    pub criteria: FilterCriteria,

    /// Criteria the current `view` was computed from.
    applied: Option<FilterCriteria>,

    pub view: Option<DashboardView>,

    /// Sidebar options, fixed per dataset.
    pub field_options: BTreeSet<String>,
    pub gender_options: Vec<String>,
    pub gpa_bounds: Option<(f64, f64)>,
    pub salary_bounds: Option<(f64, f64)>,

    /// Stable colour per field of study.
    pub field_colors: ColorMap,

    pub tab: ChartTab,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            cache: DatasetCache::new(),
            dataset: None,
            source: None,
            criteria: FilterCriteria::default(),
            applied: None,
            view: None,
            field_options: BTreeSet::new(),
            gender_options: Vec::new(),
            gpa_bounds: None,
            salary_bounds: None,
            field_colors: ColorMap::default(),
            tab: ChartTab::default(),
            status_message: None,
        }
    }

    /// Load `path` through the cache and make it the current dataset.
    /// On failure the previous dashboard is dropped so no partial UI remains.
    pub fn open(&mut self, path: &Path) -> Result<()> {
        match self.cache.get_or_load(path) {
            Ok(dataset) => {
                self.set_dataset(dataset);
                self.source = Some(path.to_path_buf());
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to load {}: {e:#}", path.display());
                self.dataset = None;
                self.source = None;
                self.view = None;
                self.applied = None;
                self.status_message = Some(format!("Error: {e:#}"));
                Err(e)
            }
        }
    }

    /// Drop the cached copy of the current file and load it again.
    pub fn reload(&mut self) -> Result<()> {
        let Some(path) = self.source.clone() else {
            return Ok(());
        };
        self.cache.invalidate(&path);
        self.open(&path)
    }

    /// Ingest a newly loaded dataset, initialise filters, options and colours.
    pub fn set_dataset(&mut self, dataset: Arc<Dataset>) {
        self.criteria = FilterCriteria::for_dataset(&dataset);
        self.field_options = dataset.unique_values(col::FIELD_OF_STUDY).unwrap_or_default();
        self.field_colors = ColorMap::new(&self.field_options);
        self.gender_options = dataset
            .unique_values(col::GENDER)
            .map(|genders| genders.into_iter().collect())
            .unwrap_or_default();
        self.gpa_bounds = dataset.numeric_bounds(col::UNIVERSITY_GPA);
        self.salary_bounds = dataset.numeric_bounds(col::STARTING_SALARY);

        self.dataset = Some(dataset);
        self.applied = None;
        self.status_message = None;
        self.refresh();
    }

    /// Recompute the view when the criteria changed since the last pass.
    pub fn refresh(&mut self) {
        let Some(dataset) = &self.dataset else {
            return;
        };
        if self.applied.as_ref() == Some(&self.criteria) {
            return;
        }
        let view = DashboardView::compute(dataset, &self.criteria, self.config.preview_rows);
        log::debug!(
            "recomputed view: {} of {} records, {} active filters",
            view.filtered.len(),
            dataset.len(),
            view.active_filters
        );
        self.view = Some(view);
        self.applied = Some(self.criteria.clone());
    }

    // -- Sidebar actions --

    pub fn select_all_fields(&mut self) {
        self.criteria.selected_fields = self.field_options.clone();
    }

    pub fn select_no_fields(&mut self) {
        self.criteria.selected_fields.clear();
    }

    /// Toggle a single field of study in the selection.
    pub fn toggle_field(&mut self, field: &str) {
        if !self.criteria.selected_fields.remove(field) {
            self.criteria.selected_fields.insert(field.to_string());
        }
    }

    pub fn set_gender(&mut self, label: &str) {
        self.criteria.gender = GenderFilter::from_label(label);
    }

    /// Export the current filtered records.
    pub fn export(&mut self, path: &Path) -> Result<(), ExportError> {
        let Some(view) = &self.view else {
            return Ok(());
        };
        match export_to_path(&view.filtered, path) {
            Ok(()) => {
                self.status_message = Some(format!(
                    "Exported {} records to {}",
                    view.filtered.len(),
                    path.display()
                ));
                Ok(())
            }
            Err(e) => {
                log::error!("Export failed: {e}");
                self.status_message = Some(format!("Error: {e}"));
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
Field_of_Study,University_GPA,Starting_Salary,Gender,Job_Offers
CS,3.5,60000,Female,3
CS,2.8,52000,Male,1
Arts,3.9,39000,Female,2
Law,bad,71000,Male,4
";

    fn loaded() -> (tempfile::TempDir, AppState) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("outcomes.csv");
        std::fs::write(&path, CSV).unwrap();
        let mut state = AppState::new(DashboardConfig::default());
        state.open(&path).unwrap();
        (dir, state)
    }

    #[test]
    fn open_initialises_sidebar_and_view() {
        let (_dir, state) = loaded();
        assert_eq!(state.field_options.len(), 3);
        assert_eq!(state.gender_options, vec!["Female", "Male"]);
        assert_eq!(state.gpa_bounds, Some((2.8, 3.9)));
        assert_eq!(state.criteria.gender, GenderFilter::All);

        let view = state.view.as_ref().unwrap();
        // Law has no usable GPA so the default GPA range drops it.
        assert_eq!(view.filtered.len(), 3);
        assert_eq!(view.summary.records, 3);
    }

    #[test]
    fn changes_are_picked_up_by_refresh() {
        let (_dir, mut state) = loaded();
        state.set_gender("Male");
        state.refresh();
        assert_eq!(state.view.as_ref().unwrap().filtered.len(), 1);

        state.set_gender("All");
        state.toggle_field("CS");
        state.refresh();
        let view = state.view.as_ref().unwrap();
        assert_eq!(view.filtered.len(), 1);
        assert_eq!(view.summary.metrics.salary_label(), "$39,000");
    }

    #[test]
    fn clearing_fields_shows_everything_again() {
        let (_dir, mut state) = loaded();
        state.criteria.gpa_range = None;
        state.select_no_fields();
        state.refresh();
        assert_eq!(state.view.as_ref().unwrap().filtered.len(), 4);
    }

    #[test]
    fn reload_resets_the_filters() {
        let (_dir, mut state) = loaded();
        state.set_gender("Male");
        state.refresh();
        state.reload().unwrap();
        assert_eq!(state.criteria.gender, GenderFilter::All);
        assert_eq!(state.view.as_ref().unwrap().filtered.len(), 3);
    }

    #[test]
    fn salary_column_without_numbers_empties_the_view() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("outcomes.csv");
        std::fs::write(&path, "Field_of_Study,Starting_Salary\nCS,undisclosed\nArts,\n").unwrap();
        let mut state = AppState::new(DashboardConfig::default());
        state.open(&path).unwrap();

        assert_eq!(state.salary_bounds, None);
        let view = state.view.as_ref().unwrap();
        assert_eq!(view.active_filters, 2);
        assert_eq!(view.filtered.len(), 0);
        assert_eq!(view.summary.records, 0);
    }

    #[test]
    fn failed_open_drops_the_dashboard() {
        let (dir, mut state) = loaded();
        assert!(state.open(&dir.path().join("missing.csv")).is_err());
        assert!(state.dataset.is_none());
        assert!(state.view.is_none());
        assert!(state.status_message.as_deref().unwrap_or("").starts_with("Error"));
    }

    #[test]
    fn export_writes_the_filtered_rows() {
        let (dir, mut state) = loaded();
        state.set_gender("Female");
        state.refresh();
        let out = dir.path().join("out.csv");
        state.export(&out).unwrap();
        let text = std::fs::read_to_string(&out).unwrap();
        assert_eq!(text.lines().count(), 3);
    }
}

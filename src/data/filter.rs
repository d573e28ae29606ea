use std::collections::BTreeSet;
use std::fmt;

use super::model::{CellValue, Dataset, col};

// ---------------------------------------------------------------------------
// Filter criteria: what the sidebar currently asks for
// ---------------------------------------------------------------------------

/// Label of the gender option that disables the gender predicate.
pub const ALL_GENDERS: &str = "All";

/// Inclusive numeric interval `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericRange {
    pub min: f64,
    pub max: f64,
}

impl NumericRange {
    pub fn new(min: f64, max: f64) -> Self {
        NumericRange { min, max }
    }

    /// A range no value satisfies, for a column with no defined values.
    pub fn empty() -> Self {
        NumericRange::new(f64::INFINITY, f64::NEG_INFINITY)
    }

    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }

    /// Inclusive on both ends.
    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

/// Gender selector: every gender, or exactly one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum GenderFilter {
    #[default]
    All,
    Only(String),
}

impl GenderFilter {
    /// Map a selector label to a filter; `"All"` is the sentinel.
    pub fn from_label(label: &str) -> Self {
        if label == ALL_GENDERS {
            GenderFilter::All
        } else {
            GenderFilter::Only(label.to_string())
        }
    }
}

impl fmt::Display for GenderFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenderFilter::All => write!(f, "{ALL_GENDERS}"),
            GenderFilter::Only(g) => write!(f, "{g}"),
        }
    }
}

/// The transient constraints of one recompute.
///
/// * `selected_fields` empty → field filter off (show everything, not nothing)
/// * a range of `None` → no range chosen, predicate off
/// * `gender == All` → gender filter off
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    pub selected_fields: BTreeSet<String>,
    pub gpa_range: Option<NumericRange>,
    pub salary_range: Option<NumericRange>,
    pub gender: GenderFilter,
}

impl FilterCriteria {
    /// Sidebar defaults for a freshly loaded dataset: every field selected,
    /// ranges spanning the observed values, all genders. A range column
    /// without a single defined value gets an empty range, so every record
    /// is excluded rather than the predicate switching off.
    pub fn for_dataset(dataset: &Dataset) -> Self {
        FilterCriteria {
            selected_fields: dataset.unique_values(col::FIELD_OF_STUDY).unwrap_or_default(),
            gpa_range: observed_range(dataset, col::UNIVERSITY_GPA),
            salary_range: observed_range(dataset, col::STARTING_SALARY),
            gender: GenderFilter::All,
        }
    }
}

fn observed_range(dataset: &Dataset, column: &str) -> Option<NumericRange> {
    if !dataset.has_column(column) {
        return None;
    }
    Some(
        dataset
            .numeric_bounds(column)
            .map_or_else(NumericRange::empty, |(lo, hi)| NumericRange::new(lo, hi)),
    )
}

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

/// One per-record test, resolved against a dataset's schema.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate<'a> {
    FieldIn(&'a BTreeSet<String>),
    GpaWithin(NumericRange),
    SalaryWithin(NumericRange),
    GenderIs(&'a str),
}

impl Predicate<'_> {
    pub fn column(&self) -> &'static str {
        match self {
            Predicate::FieldIn(_) => col::FIELD_OF_STUDY,
            Predicate::GpaWithin(_) => col::UNIVERSITY_GPA,
            Predicate::SalaryWithin(_) => col::STARTING_SALARY,
            Predicate::GenderIs(_) => col::GENDER,
        }
    }

    fn test(&self, cell: &CellValue) -> bool {
        match self {
            Predicate::FieldIn(fields) => cell
                .as_category()
                .is_some_and(|v| fields.contains(&v)),
            Predicate::GpaWithin(range) | Predicate::SalaryWithin(range) => {
                cell.as_f64().is_some_and(|v| range.contains(v))
            }
            Predicate::GenderIs(gender) => cell.as_category().is_some_and(|v| v == *gender),
        }
    }
}

/// The predicates that actually constrain `dataset`. A predicate whose
/// column is missing is silently dropped.
pub fn active_predicates<'a>(dataset: &Dataset, criteria: &'a FilterCriteria) -> Vec<Predicate<'a>> {
    let mut predicates = Vec::new();
    if !criteria.selected_fields.is_empty() {
        predicates.push(Predicate::FieldIn(&criteria.selected_fields));
    }
    if let Some(range) = criteria.gpa_range {
        predicates.push(Predicate::GpaWithin(range));
    }
    if let Some(range) = criteria.salary_range {
        predicates.push(Predicate::SalaryWithin(range));
    }
    if let GenderFilter::Only(gender) = &criteria.gender {
        predicates.push(Predicate::GenderIs(gender));
    }
    predicates.retain(|p| dataset.has_column(p.column()));
    predicates
}

// ---------------------------------------------------------------------------
// Mask / filtered view
// ---------------------------------------------------------------------------

/// One boolean per record: true when the record passes every active predicate.
pub fn build_mask(dataset: &Dataset, criteria: &FilterCriteria) -> Vec<bool> {
    let mut mask = vec![true; dataset.len()];
    for predicate in active_predicates(dataset, criteria) {
        let Some(cells) = dataset.column(predicate.column()) else {
            continue;
        };
        for (keep, cell) in mask.iter_mut().zip(cells) {
            *keep = *keep && predicate.test(cell);
        }
    }
    mask
}

/// Return indices of records that pass all active filters.
pub fn filtered_indices(dataset: &Dataset, criteria: &FilterCriteria) -> Vec<usize> {
    build_mask(dataset, criteria)
        .into_iter()
        .enumerate()
        .filter_map(|(i, keep)| keep.then_some(i))
        .collect()
}

/// The filtered view. With no active predicate this is a copy of `dataset`.
pub fn apply(dataset: &Dataset, criteria: &FilterCriteria) -> Dataset {
    dataset.select(&filtered_indices(dataset, criteria))
}

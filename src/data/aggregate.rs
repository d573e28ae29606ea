use std::collections::BTreeMap;

use serde::Serialize;

use super::model::{CellValue, Dataset, col};

/// Marker shown wherever an aggregate cannot be computed.
pub const NOT_AVAILABLE: &str = "N/A";

// ---------------------------------------------------------------------------
// Scalar aggregates
// ---------------------------------------------------------------------------

/// Mean of the defined numeric values of `column`. `None` when the column is
/// absent or has no defined values.
pub fn mean(dataset: &Dataset, column: &str) -> Option<f64> {
    let values = dataset.f64_values(column)?;
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sum of the defined numeric values of `column`, same `None` rules as [`mean`].
pub fn sum(dataset: &Dataset, column: &str) -> Option<f64> {
    let values = dataset.f64_values(column)?;
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum())
}

/// The five headline numbers of the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metrics {
    pub avg_gpa: Option<f64>,
    pub avg_salary: Option<f64>,
    pub total_job_offers: Option<f64>,
    pub total_internships: Option<f64>,
    pub total_projects: Option<f64>,
}

impl Metrics {
    pub fn compute(dataset: &Dataset) -> Self {
        Metrics {
            avg_gpa: mean(dataset, col::UNIVERSITY_GPA),
            avg_salary: mean(dataset, col::STARTING_SALARY),
            total_job_offers: sum(dataset, col::JOB_OFFERS),
            total_internships: sum(dataset, col::INTERNSHIPS_COMPLETED),
            total_projects: sum(dataset, col::PROJECTS_COMPLETED),
        }
    }

    pub fn gpa_label(&self) -> String {
        self.avg_gpa
            .map(|v| format!("{v:.2}"))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }

    pub fn salary_label(&self) -> String {
        self.avg_salary
            .map(format_currency)
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }

    pub fn job_offers_label(&self) -> String {
        count_label(self.total_job_offers)
    }

    pub fn internships_label(&self) -> String {
        count_label(self.total_internships)
    }

    pub fn projects_label(&self) -> String {
        count_label(self.total_projects)
    }
}

fn count_label(value: Option<f64>) -> String {
    value
        .map(|v| group_thousands(v.round() as i64))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// `$` prefix, thousands separators, no decimals: `55000.4` → `$55,000`.
pub fn format_currency(value: f64) -> String {
    let rounded = value.round() as i64;
    if rounded < 0 {
        format!("-${}", group_thousands(-rounded))
    } else {
        format!("${}", group_thousands(rounded))
    }
}

fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

// ---------------------------------------------------------------------------
// Grouped aggregates
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub label: String,
    pub count: usize,
    /// Fraction of all non-null values, `0.0..=1.0`.
    pub share: f64,
}

/// Frequency of each category, most frequent first (ties by label).
/// Nulls are not counted.
pub fn value_counts(dataset: &Dataset, column: &str) -> Option<Vec<CategoryCount>> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for label in dataset.column(column)?.filter_map(CellValue::as_category) {
        *counts.entry(label).or_default() += 1;
    }
    let total: usize = counts.values().sum();

    let mut out: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(label, count)| CategoryCount {
            label,
            count,
            share: if total == 0 { 0.0 } else { count as f64 / total as f64 },
        })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    Some(out)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupMean {
    pub label: String,
    pub mean: f64,
}

/// Mean of `value_column` per category of `group_column`, ascending by mean.
/// Groups without a single defined value are left out.
pub fn grouped_mean(dataset: &Dataset, group_column: &str, value_column: &str) -> Option<Vec<GroupMean>> {
    let groups = dataset.column(group_column)?;
    let values = dataset.column(value_column)?;

    let mut acc: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    for (group, value) in groups.zip(values) {
        let (Some(label), Some(v)) = (group.as_category(), value.as_f64()) else {
            continue;
        };
        let entry = acc.entry(label).or_insert((0.0, 0));
        entry.0 += v;
        entry.1 += 1;
    }

    let mut out: Vec<GroupMean> = acc
        .into_iter()
        .map(|(label, (total, n))| GroupMean {
            label,
            mean: total / n as f64,
        })
        .collect();
    out.sort_by(|a, b| a.mean.total_cmp(&b.mean));
    Some(out)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairCount {
    pub field: String,
    pub internships: CellValue,
    pub count: usize,
}

/// Number of records per `(Field_of_Study, Internships_Completed)` pair,
/// ordered by field then internship count.
pub fn internships_by_field(dataset: &Dataset) -> Option<Vec<PairCount>> {
    let fields = dataset.column(col::FIELD_OF_STUDY)?;
    let internships = dataset.column(col::INTERNSHIPS_COMPLETED)?;

    let mut counts: BTreeMap<(String, CellValue), usize> = BTreeMap::new();
    for (field, n) in fields.zip(internships) {
        let Some(field) = field.as_category() else {
            continue;
        };
        if n.is_null() {
            continue;
        }
        *counts.entry((field, n.clone())).or_default() += 1;
    }

    Some(
        counts
            .into_iter()
            .map(|((field, internships), count)| PairCount {
                field,
                internships,
                count,
            })
            .collect(),
    )
}

// ---------------------------------------------------------------------------
// Employment breakdown
// ---------------------------------------------------------------------------

/// One histogram bucket: a distinct observed value and how often it occurs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub value: f64,
    pub count: usize,
}

/// One bucket per distinct defined value, ascending. Missing values are
/// not counted.
pub fn distinct_histogram(dataset: &Dataset, column: &str) -> Option<Vec<HistogramBin>> {
    let mut counts: BTreeMap<CellValue, usize> = BTreeMap::new();
    for v in dataset.f64_values(column)? {
        *counts.entry(CellValue::Float(v)).or_default() += 1;
    }
    Some(
        counts
            .into_iter()
            .filter_map(|(value, count)| Some(HistogramBin { value: value.as_f64()?, count }))
            .collect(),
    )
}

/// What the employment chart shows: status counts when the column exists,
/// otherwise the job-offer distribution, otherwise nothing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum EmploymentBreakdown {
    Status(Vec<CategoryCount>),
    JobOfferHistogram(Vec<HistogramBin>),
    Unavailable,
}

impl EmploymentBreakdown {
    pub fn compute(dataset: &Dataset) -> Self {
        if let Some(counts) = value_counts(dataset, col::EMPLOYMENT_STATUS) {
            return EmploymentBreakdown::Status(counts);
        }
        if dataset.has_column(col::JOB_OFFERS) {
            return EmploymentBreakdown::JobOfferHistogram(
                distinct_histogram(dataset, col::JOB_OFFERS).unwrap_or_default(),
            );
        }
        EmploymentBreakdown::Unavailable
    }
}

// ---------------------------------------------------------------------------
// Everything the dashboard renders for one filtered view
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub records: usize,
    pub metrics: Metrics,
    pub field_shares: Option<Vec<CategoryCount>>,
    pub salary_by_field: Option<Vec<GroupMean>>,
    pub internships_by_field: Option<Vec<PairCount>>,
    pub employment: EmploymentBreakdown,
    /// `[gpa, salary]` for records where both are defined.
    pub gpa_vs_salary: Option<Vec<[f64; 2]>>,
}

impl Summary {
    pub fn compute(dataset: &Dataset) -> Self {
        Summary {
            records: dataset.len(),
            metrics: Metrics::compute(dataset),
            field_shares: value_counts(dataset, col::FIELD_OF_STUDY),
            salary_by_field: grouped_mean(dataset, col::FIELD_OF_STUDY, col::STARTING_SALARY),
            internships_by_field: internships_by_field(dataset),
            employment: EmploymentBreakdown::compute(dataset),
            gpa_vs_salary: gpa_vs_salary(dataset),
        }
    }
}

fn gpa_vs_salary(dataset: &Dataset) -> Option<Vec<[f64; 2]>> {
    let gpa = dataset.column(col::UNIVERSITY_GPA)?;
    let salary = dataset.column(col::STARTING_SALARY)?;
    Some(
        gpa.zip(salary)
            .filter_map(|(g, s)| Some([g.as_f64()?, s.as_f64()?]))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{FilterCriteria, NumericRange, apply};

    fn s(v: &str) -> CellValue {
        CellValue::String(v.to_string())
    }

    fn salaries_by_field() -> Dataset {
        let fields = ["CS", "CS", "Biz", "Biz", "Art"];
        let salaries = [50000.0, 60000.0, 40000.0, 45000.0, 30000.0];
        Dataset::new(
            vec![col::FIELD_OF_STUDY.into(), col::STARTING_SALARY.into()],
            fields
                .iter()
                .zip(salaries)
                .map(|(f, v)| vec![s(f), CellValue::Float(v)])
                .collect(),
        )
    }

    #[test]
    fn grouped_salary_sorted_ascending() {
        let ds = salaries_by_field();
        let criteria = FilterCriteria {
            selected_fields: ["CS", "Biz"].iter().map(|f| f.to_string()).collect(),
            ..Default::default()
        };
        let filtered = apply(&ds, &criteria);
        assert_eq!(filtered.len(), 4);

        let means = grouped_mean(&filtered, col::FIELD_OF_STUDY, col::STARTING_SALARY).unwrap();
        assert_eq!(
            means,
            vec![
                GroupMean { label: "Biz".into(), mean: 42500.0 },
                GroupMean { label: "CS".into(), mean: 55000.0 },
            ]
        );
    }

    #[test]
    fn gpa_mean_after_range_filter() {
        let ds = Dataset::new(
            vec![col::UNIVERSITY_GPA.into()],
            [2.0, 3.0, f64::NAN, 3.5]
                .into_iter()
                .map(|v| vec![CellValue::Float(v).coerce_numeric()])
                .collect(),
        );
        let criteria = FilterCriteria {
            gpa_range: Some(NumericRange::new(2.5, 4.0)),
            ..Default::default()
        };
        let filtered = apply(&ds, &criteria);
        assert_eq!(filtered.len(), 2);
        let metrics = Metrics::compute(&filtered);
        assert_eq!(metrics.avg_gpa, Some(3.25));
        assert_eq!(metrics.gpa_label(), "3.25");
    }

    #[test]
    fn labels_format_like_the_cards() {
        assert_eq!(format_currency(55000.0), "$55,000");
        assert_eq!(format_currency(1234567.6), "$1,234,568");
        assert_eq!(format_currency(999.0), "$999");
        assert_eq!(format_currency(-1500.0), "-$1,500");
        assert_eq!(count_label(Some(12345.0)), "12,345");
        assert_eq!(count_label(None), NOT_AVAILABLE);
    }

    #[test]
    fn empty_view_reports_not_available() {
        let ds = salaries_by_field().select(&[]);
        let metrics = Metrics::compute(&ds);
        assert_eq!(metrics.salary_label(), NOT_AVAILABLE);
        assert_eq!(metrics.gpa_label(), NOT_AVAILABLE);
        assert_eq!(metrics.projects_label(), NOT_AVAILABLE);
        assert_eq!(value_counts(&ds, col::FIELD_OF_STUDY), Some(vec![]));
    }

    #[test]
    fn value_counts_most_frequent_first() {
        let ds = salaries_by_field();
        let counts = value_counts(&ds, col::FIELD_OF_STUDY).unwrap();
        let labels: Vec<&str> = counts.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["Biz", "CS", "Art"]);
        assert!((counts[2].share - 0.2).abs() < 1e-12);
        assert!(value_counts(&ds, col::GENDER).is_none());
    }

    #[test]
    fn internship_pairs_are_counted() {
        let ds = Dataset::new(
            vec![col::FIELD_OF_STUDY.into(), col::INTERNSHIPS_COMPLETED.into()],
            vec![
                vec![s("CS"), CellValue::Integer(2)],
                vec![s("CS"), CellValue::Integer(2)],
                vec![s("CS"), CellValue::Integer(0)],
                vec![s("Art"), CellValue::Null],
            ],
        );
        let pairs = internships_by_field(&ds).unwrap();
        assert_eq!(
            pairs,
            vec![
                PairCount { field: "CS".into(), internships: CellValue::Integer(0), count: 1 },
                PairCount { field: "CS".into(), internships: CellValue::Integer(2), count: 2 },
            ]
        );
    }

    #[test]
    fn employment_falls_back_to_job_offer_histogram() {
        let ds = Dataset::new(
            vec![col::JOB_OFFERS.into()],
            [0, 2, 2, 3].into_iter().map(|v| vec![CellValue::Integer(v)]).collect(),
        );
        let EmploymentBreakdown::JobOfferHistogram(bins) = EmploymentBreakdown::compute(&ds) else {
            panic!("expected histogram");
        };
        let counts: Vec<(f64, usize)> = bins.iter().map(|b| (b.value, b.count)).collect();
        assert_eq!(counts, vec![(0.0, 1), (2.0, 2), (3.0, 1)]);

        let none = Dataset::new(vec![col::GENDER.into()], vec![]);
        assert_eq!(EmploymentBreakdown::compute(&none), EmploymentBreakdown::Unavailable);
    }

    #[test]
    fn job_offer_outlier_adds_a_single_bucket() {
        let ds = Dataset::new(
            vec![col::JOB_OFFERS.into()],
            [0, i64::MAX / 4, 0]
                .into_iter()
                .map(|v| vec![CellValue::Integer(v)])
                .collect(),
        );
        let EmploymentBreakdown::JobOfferHistogram(bins) = EmploymentBreakdown::compute(&ds) else {
            panic!("expected histogram");
        };
        assert_eq!(bins.len(), 2);
        assert_eq!(bins[0], HistogramBin { value: 0.0, count: 2 });
        assert_eq!(bins[1].count, 1);

        let huge = Dataset::new(vec![col::JOB_OFFERS.into()], vec![vec![CellValue::Float(1e18)]]);
        assert_eq!(distinct_histogram(&huge, col::JOB_OFFERS).map(|b| b.len()), Some(1));
    }

    #[test]
    fn summary_serializes_missing_parts_as_null() {
        let summary = Summary::compute(&salaries_by_field());
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["records"], 5);
        assert!(json["internships_by_field"].is_null());
        assert_eq!(json["employment"]["kind"], "unavailable");
        assert_eq!(json["metrics"]["avg_salary"], 45000.0);
    }
}

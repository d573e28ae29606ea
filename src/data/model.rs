use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Well-known column names
// ---------------------------------------------------------------------------

/// Columns the dashboard knows how to filter, chart or summarise.
/// All of them are optional in the source file.
pub mod col {
    pub const FIELD_OF_STUDY: &str = "Field_of_Study";
    pub const UNIVERSITY_GPA: &str = "University_GPA";
    pub const STARTING_SALARY: &str = "Starting_Salary";
    pub const GENDER: &str = "Gender";
    pub const JOB_OFFERS: &str = "Job_Offers";
    pub const INTERNSHIPS_COMPLETED: &str = "Internships_Completed";
    pub const PROJECTS_COMPLETED: &str = "Projects_Completed";
    pub const EMPLOYMENT_STATUS: &str = "Employment_Status";

    /// Columns whose dirty input is coerced to floats (or null) on load.
    pub const COERCED_NUMERIC: [&str; 2] = [STARTING_SALARY, UNIVERSITY_GPA];
}

// ---------------------------------------------------------------------------
// CellValue – a single cell of the table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring common Pandas dtypes.
/// Used as a `BTreeMap` / `BTreeSet` key downstream so it must be `Ord`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

// -- Manual Eq/Ord so we can put CellValue in BTreeSet --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::String(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Interpret the value as an `f64` for ranges and means.
    /// Non-finite floats count as missing.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) if v.is_finite() => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Textual form used for category comparisons (field, gender).
    /// `Null` has no category.
    pub fn as_category(&self) -> Option<String> {
        match self {
            CellValue::Null => None,
            other => Some(other.to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Guess the type of a raw text cell the way `pandas.read_csv` would.
    pub fn parse(s: &str) -> CellValue {
        if is_missing_marker(s) {
            return CellValue::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return CellValue::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return CellValue::Float(f);
        }
        if s.eq_ignore_ascii_case("true") {
            return CellValue::Bool(true);
        }
        if s.eq_ignore_ascii_case("false") {
            return CellValue::Bool(false);
        }
        CellValue::String(s.to_string())
    }

    /// Coerce to a float, turning anything unparseable into `Null`.
    pub fn coerce_numeric(&self) -> CellValue {
        match self {
            CellValue::Integer(i) => CellValue::Float(*i as f64),
            CellValue::Float(v) if v.is_finite() => CellValue::Float(*v),
            CellValue::String(s) => match s.trim().parse::<f64>() {
                Ok(v) if v.is_finite() => CellValue::Float(v),
                _ => CellValue::Null,
            },
            _ => CellValue::Null,
        }
    }

    /// Text written to an exported CSV cell. Floats always keep a decimal
    /// point or exponent so they re-parse as floats.
    pub fn to_csv_field(&self) -> String {
        match self {
            CellValue::Float(v) => format!("{v:?}"),
            CellValue::Null => String::new(),
            other => other.to_string(),
        }
    }
}

fn is_missing_marker(s: &str) -> bool {
    matches!(s.trim(), "" | "NA" | "N/A" | "NaN" | "nan" | "null" | "NULL")
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed table. Rows are stored positionally, aligned with
/// `column_names`; the index maps a column name to its position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    column_names: Vec<String>,
    rows: Vec<Vec<CellValue>>,
    index: HashMap<String, usize>,
}

impl Dataset {
    /// Build a dataset from ordered column names and positional rows.
    /// Short rows are padded with `Null`, long rows truncated.
    pub fn new(column_names: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let width = column_names.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, CellValue::Null);
                row
            })
            .collect();
        let index = column_names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        Dataset {
            column_names,
            rows,
            index,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset has no records.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Iterator over one column's cells, or `None` if the column is absent.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &CellValue> + '_> {
        let idx = *self.index.get(name)?;
        Some(self.rows.iter().map(move |row| &row[idx]))
    }

    /// Cell at `(row, column)`, `None` if either is out of range.
    #[cfg(test)]
    pub fn cell(&self, row: usize, name: &str) -> Option<&CellValue> {
        let idx = *self.index.get(name)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    /// Defined numeric values of a column (missing values skipped).
    pub fn f64_values(&self, name: &str) -> Option<Vec<f64>> {
        Some(self.column(name)?.filter_map(CellValue::as_f64).collect())
    }

    /// `(min, max)` over the defined numeric values, `None` if the column is
    /// absent or holds no numbers.
    pub fn numeric_bounds(&self, name: &str) -> Option<(f64, f64)> {
        self.column(name)?
            .filter_map(CellValue::as_f64)
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Sorted distinct category labels of a column (nulls excluded).
    pub fn unique_values(&self, name: &str) -> Option<BTreeSet<String>> {
        Some(self.column(name)?.filter_map(CellValue::as_category).collect())
    }

    /// Replace every cell of `name` by `f(cell)`. No-op when absent.
    pub fn map_column(&mut self, name: &str, f: impl Fn(&CellValue) -> CellValue) {
        if let Some(&idx) = self.index.get(name) {
            for row in &mut self.rows {
                row[idx] = f(&row[idx]);
            }
        }
    }

    /// New dataset holding the given records, in the given order.
    pub fn select(&self, indices: &[usize]) -> Dataset {
        let rows = indices
            .iter()
            .filter_map(|&i| self.rows.get(i).cloned())
            .collect();
        Dataset {
            column_names: self.column_names.clone(),
            rows,
            index: self.index.clone(),
        }
    }

    /// The first `n` records (table preview).
    pub fn head(&self, n: usize) -> Dataset {
        let indices: Vec<usize> = (0..self.len().min(n)).collect();
        self.select(&indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset::new(
            vec!["Field_of_Study".into(), "University_GPA".into()],
            vec![
                vec![CellValue::String("CS".into()), CellValue::Float(3.5)],
                vec![CellValue::String("Art".into()), CellValue::Null],
                vec![CellValue::String("CS".into()), CellValue::Integer(2)],
            ],
        )
    }

    #[test]
    fn parse_guesses_pandas_like_types() {
        assert_eq!(CellValue::parse("42"), CellValue::Integer(42));
        assert_eq!(CellValue::parse("3.25"), CellValue::Float(3.25));
        assert_eq!(CellValue::parse("true"), CellValue::Bool(true));
        assert_eq!(CellValue::parse("True"), CellValue::Bool(true));
        assert_eq!(CellValue::parse("FALSE"), CellValue::Bool(false));
        assert_eq!(CellValue::parse("Truth"), CellValue::String("Truth".into()));
        assert_eq!(CellValue::parse("Computer Science"), CellValue::String("Computer Science".into()));
        assert_eq!(CellValue::parse(""), CellValue::Null);
        assert_eq!(CellValue::parse("NaN"), CellValue::Null);
    }

    #[test]
    fn coerce_numeric_drops_garbage() {
        assert_eq!(CellValue::String("abc".into()).coerce_numeric(), CellValue::Null);
        assert_eq!(CellValue::String(" 55000 ".into()).coerce_numeric(), CellValue::Float(55000.0));
        assert_eq!(CellValue::Integer(4).coerce_numeric(), CellValue::Float(4.0));
        assert_eq!(CellValue::Float(f64::NAN).coerce_numeric(), CellValue::Null);
        assert_eq!(CellValue::Bool(true).coerce_numeric(), CellValue::Null);
    }

    #[test]
    fn csv_field_keeps_floats_floats() {
        assert_eq!(CellValue::Float(3.0).to_csv_field(), "3.0");
        assert_eq!(CellValue::parse(&CellValue::Float(3.0).to_csv_field()), CellValue::Float(3.0));
        assert_eq!(CellValue::Null.to_csv_field(), "");
    }

    #[test]
    fn accessors_report_absent_columns() {
        let ds = sample();
        assert!(ds.has_column("University_GPA"));
        assert!(!ds.has_column("Gender"));
        assert!(ds.column("Gender").is_none());
        assert!(ds.numeric_bounds("Gender").is_none());
        assert_eq!(ds.f64_values("University_GPA"), Some(vec![3.5, 2.0]));
        assert_eq!(ds.numeric_bounds("University_GPA"), Some((2.0, 3.5)));
        let fields = ds.unique_values("Field_of_Study").unwrap();
        assert_eq!(fields.into_iter().collect::<Vec<_>>(), vec!["Art", "CS"]);
    }

    #[test]
    fn select_and_head_keep_schema() {
        let ds = sample();
        let picked = ds.select(&[2, 0]);
        assert_eq!(picked.len(), 2);
        assert_eq!(picked.column_names(), ds.column_names());
        assert_eq!(picked.cell(0, "University_GPA"), Some(&CellValue::Integer(2)));
        assert_eq!(ds.head(100).len(), 3);
        assert_eq!(ds.head(1).len(), 1);
    }

    #[test]
    fn ragged_rows_are_padded() {
        let ds = Dataset::new(vec!["a".into(), "b".into()], vec![vec![CellValue::Integer(1)]]);
        assert_eq!(ds.cell(0, "b"), Some(&CellValue::Null));
    }
}

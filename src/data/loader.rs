use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{
    Array, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array,
    StringArray,
};
use arrow::datatypes::DataType;
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, Dataset, col};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load an outcomes table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row followed by records (the usual export)
/// * `.parquet` – flat table of scalar columns
/// * `.json`    – `[{ "Field_of_Study": "...", "Starting_Salary": 55000, ... }, ...]`
///
/// Salary and GPA columns are coerced to numbers afterwards; unparseable
/// cells become null instead of failing the load.
pub fn load_file(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("opening CSV {}", path.display()))?;
            load_csv(file)?
        }
        "parquet" | "pq" => load_parquet(path)?,
        "json" => load_json(path)?,
        other => bail!("Unsupported file extension: .{other}"),
    };

    Ok(coerce_numeric_columns(dataset))
}

/// Apply the salary / GPA numeric coercion.
pub fn coerce_numeric_columns(mut dataset: Dataset) -> Dataset {
    for name in col::COERCED_NUMERIC {
        dataset.map_column(name, CellValue::coerce_numeric);
    }
    dataset
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one record per line.
/// Every cell is type-guessed independently.
pub fn load_csv<R: Read>(source: R) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(source);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        rows.push(record.iter().map(CellValue::parse).collect());
    }

    Ok(Dataset::new(headers, rows))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Field_of_Study": "Computer Science", "University_GPA": 3.4, "Gender": "Female" },
///   ...
/// ]
/// ```
///
/// Columns are the union of all record keys, in order of first appearance.
fn load_json(path: &Path) -> Result<Dataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut column_names: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !column_names.contains(key) {
                column_names.push(key.clone());
            }
        }
    }

    let rows = records
        .iter()
        .filter_map(|rec| rec.as_object())
        .map(|obj| {
            column_names
                .iter()
                .map(|name| obj.get(name).map(json_to_cell).unwrap_or(CellValue::Null))
                .collect()
        })
        .collect();

    Ok(Dataset::new(column_names, rows))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::parse(s),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file holding one scalar column per outcome field.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`). Nested columns are stringified.
fn load_parquet(path: &Path) -> Result<Dataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let column_names: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for row in 0..batch.num_rows() {
            let cells = batch
                .columns()
                .iter()
                .map(|col_array| extract_cell(col_array, row))
                .collect::<Result<Vec<_>>>()
                .with_context(|| format!("Row {row}: failed to read cell"))?;
            rows.push(cells);
        }
    }

    Ok(Dataset::new(column_names, rows))
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> Result<CellValue> {
    if col.is_null(row) {
        return Ok(CellValue::Null);
    }
    let value = match col.data_type() {
        DataType::Utf8 => {
            let arr = downcast::<StringArray>(col)?;
            CellValue::String(arr.value(row).to_string())
        }
        DataType::LargeUtf8 => {
            let s = col.as_string::<i64>();
            CellValue::String(s.value(row).to_string())
        }
        DataType::Int32 => CellValue::Integer(downcast::<Int32Array>(col)?.value(row) as i64),
        DataType::Int64 => CellValue::Integer(downcast::<Int64Array>(col)?.value(row)),
        DataType::Float32 => CellValue::Float(downcast::<Float32Array>(col)?.value(row) as f64),
        DataType::Float64 => CellValue::Float(downcast::<Float64Array>(col)?.value(row)),
        DataType::Boolean => CellValue::Bool(downcast::<BooleanArray>(col)?.value(row)),
        _ => CellValue::String(
            array_value_to_string(col.as_ref(), row).context("formatting arrow value")?,
        ),
    };
    Ok(value)
}

fn downcast<T: 'static>(col: &Arc<dyn Array>) -> Result<&T> {
    col.as_any()
        .downcast_ref::<T>()
        .with_context(|| format!("unexpected array layout for {:?}", col.data_type()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const CSV: &str = "\
Field_of_Study,University_GPA,Starting_Salary,Gender,Job_Offers
Computer Science,3.4,65000,Female,3
Business,abc,not disclosed,Male,1
Arts,,42000,Other,0
";

    #[test]
    fn csv_preserves_column_order_and_types() {
        let ds = coerce_numeric_columns(load_csv(CSV.as_bytes()).unwrap());
        assert_eq!(
            ds.column_names(),
            ["Field_of_Study", "University_GPA", "Starting_Salary", "Gender", "Job_Offers"]
        );
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.cell(0, "Job_Offers"), Some(&CellValue::Integer(3)));
        assert_eq!(ds.cell(0, "Starting_Salary"), Some(&CellValue::Float(65000.0)));
    }

    #[test]
    fn dirty_numeric_cells_become_null() {
        let ds = coerce_numeric_columns(load_csv(CSV.as_bytes()).unwrap());
        assert_eq!(ds.cell(1, "University_GPA"), Some(&CellValue::Null));
        assert_eq!(ds.cell(1, "Starting_Salary"), Some(&CellValue::Null));
        assert_eq!(ds.cell(2, "University_GPA"), Some(&CellValue::Null));
        assert_eq!(ds.f64_values("Starting_Salary"), Some(vec![65000.0, 42000.0]));
    }

    #[test]
    fn load_file_dispatches_on_extension() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("outcomes.csv");
        std::fs::write(&csv_path, CSV).unwrap();
        assert_eq!(load_file(&csv_path).unwrap().len(), 3);

        let txt_path = dir.path().join("outcomes.txt");
        std::fs::write(&txt_path, CSV).unwrap();
        assert!(load_file(&txt_path).is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_file(&dir.path().join("nope.csv")).unwrap_err();
        assert!(format!("{err:#}").contains("opening CSV"));
    }

    #[test]
    fn json_records_union_their_keys() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"[{{"Field_of_Study":"Law","Starting_Salary":"50000"}},{{"Gender":"Male","Starting_Salary":null}}]"#
        )
        .unwrap();
        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.column_names(), ["Field_of_Study", "Starting_Salary", "Gender"]);
        assert_eq!(ds.cell(0, "Starting_Salary"), Some(&CellValue::Float(50000.0)));
        assert_eq!(ds.cell(0, "Gender"), Some(&CellValue::Null));
        assert_eq!(ds.cell(1, "Starting_Salary"), Some(&CellValue::Null));
    }
}

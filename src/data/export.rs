use std::io::Write;
use std::path::Path;

use thiserror::Error;

use super::model::Dataset;

/// Default file name offered by the save dialog.
pub const EXPORT_FILE_NAME: &str = "filtered_employability_data.csv";
pub const EXPORT_MIME: &str = "text/csv";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("writing CSV record: {0}")]
    Csv(#[from] csv::Error),
    #[error("writing {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Write `dataset` as UTF-8 CSV: header row, then every record.
pub fn write_csv<W: Write>(dataset: &Dataset, sink: W) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_writer(sink);
    writer.write_record(dataset.column_names())?;
    for row in dataset.rows() {
        writer.write_record(row.iter().map(|cell| cell.to_csv_field()))?;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// The whole export in memory.
#[cfg(test)]
pub fn to_csv_bytes(dataset: &Dataset) -> Result<Vec<u8>, ExportError> {
    let mut buf = Vec::new();
    write_csv(dataset, &mut buf)?;
    Ok(buf)
}

/// Export to a file on disk, replacing it if present.
pub fn export_to_path(dataset: &Dataset, path: &Path) -> Result<(), ExportError> {
    let file = std::fs::File::create(path).map_err(|source| ExportError::Io {
        path: path.display().to_string(),
        source,
    })?;
    write_csv(dataset, file)?;
    log::info!(
        "Exported {} records ({EXPORT_MIME}) to {}",
        dataset.len(),
        path.display()
    );
    Ok(())
}

use std::path::PathBuf;

use clap::Parser;

use crate::data::export::EXPORT_FILE_NAME;

/// Rows shown in the on-screen table preview.
pub const DEFAULT_PREVIEW_ROWS: usize = 100;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "grad-outcomes",
    about = "Explore graduate career outcomes: filter, summarise, chart and export",
    version
)]
pub struct Cli {
    /// Outcomes table to open at startup (.csv, .parquet or .json)
    pub dataset: Option<PathBuf>,

    /// Number of records shown in the table preview
    #[arg(long, default_value_t = DEFAULT_PREVIEW_ROWS)]
    pub preview_rows: usize,

    /// File name suggested when exporting the filtered records
    #[arg(long, default_value = EXPORT_FILE_NAME)]
    pub export_name: String,

    /// Print the summary of the whole dataset as JSON and exit
    #[arg(long, requires = "dataset")]
    pub summary: bool,
}

/// Settings the running dashboard needs.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub preview_rows: usize,
    pub export_name: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            preview_rows: DEFAULT_PREVIEW_ROWS,
            export_name: EXPORT_FILE_NAME.to_string(),
        }
    }
}

impl From<&Cli> for DashboardConfig {
    fn from(cli: &Cli) -> Self {
        Self {
            preview_rows: cli.preview_rows,
            export_name: cli.export_name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_dashboard() {
        let cli = Cli::try_parse_from(["grad-outcomes"]).unwrap();
        assert!(cli.dataset.is_none());
        let config = DashboardConfig::from(&cli);
        assert_eq!(config.preview_rows, 100);
        assert_eq!(config.export_name, "filtered_employability_data.csv");
    }

    #[test]
    fn summary_needs_a_dataset() {
        assert!(Cli::try_parse_from(["grad-outcomes", "--summary"]).is_err());
        let cli = Cli::try_parse_from(["grad-outcomes", "data.csv", "--summary", "--preview-rows", "20"])
            .unwrap();
        assert!(cli.summary);
        assert_eq!(cli.preview_rows, 20);
        assert_eq!(cli.dataset, Some(PathBuf::from("data.csv")));
    }
}

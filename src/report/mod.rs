/// Presentation layer: upload checks, the processing pipeline and its
/// rendered outputs (preview HTML and chart images).
///
/// ```text
///  Upload ─► validate ─► decode ─► load ─► normalize ─► preview (≤ N rows)
///                                              │              │
///                                              │              ▼
///                                              │            split
///                                              ▼              │
///                                     histogram (full) histogram ×3
///                                              └──────┬───────┘
///                                                     ▼
///                                             charts ─► Report
/// ```
pub mod chart;
pub mod html;

use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use serde::Serialize;
use thiserror::Error;

use crate::config::Config;
use crate::data::histogram::{histogram, preferred_order, Bin};
use crate::data::loader::{self, ParseError};
use crate::data::model::Table;
use crate::data::normalize::normalize;
use crate::data::split::{split, Partition, SplitError, SplitSizes};

use chart::{chart_pair, ChartPair};

pub const ACCEPTED_EXTENSION: &str = ".arff";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq)]
pub enum UploadError {
    #[error("No file was selected.")]
    NoFile,
    #[error("The file must have the .arff extension (got '{0}').")]
    WrongExtension(String),
}

#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Split(#[from] SplitError),
}

impl AnalyzeError {
    /// Text shown to the user in place of the report.
    pub fn user_message(&self) -> String {
        match self {
            AnalyzeError::Upload(e) => e.to_string(),
            other => format!("Error processing file: {other}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Upload
// ---------------------------------------------------------------------------

/// A single uploaded file as received at the boundary.
#[derive(Debug, Clone, Default)]
pub struct Upload {
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Upload {
            file_name: Some(file_name.into()),
            bytes,
        }
    }

    /// Read a file from disk, keeping only its file name.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned());
        Ok(Upload { file_name, bytes })
    }
}

/// Check that a file was given and that it ends in `.arff` (any case).
pub fn validate_upload(upload: &Upload) -> Result<&str, UploadError> {
    let name = upload
        .file_name
        .as_deref()
        .filter(|n| !n.is_empty())
        .ok_or(UploadError::NoFile)?;
    if !name.to_ascii_lowercase().ends_with(ACCEPTED_EXTENSION) {
        return Err(UploadError::WrongExtension(name.to_string()));
    }
    Ok(name)
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Which table a frequency series was computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Subset {
    Full,
    Train,
    Validation,
    Test,
}

impl Subset {
    pub const ALL: [Subset; 4] = [Subset::Full, Subset::Train, Subset::Validation, Subset::Test];

    pub fn label(self) -> &'static str {
        match self {
            Subset::Full => "Full dataset",
            Subset::Train => "Train",
            Subset::Validation => "Validation",
            Subset::Test => "Test",
        }
    }
}

/// Category counts of the stratification column for one subset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub subset: Subset,
    pub title: String,
    pub bins: Vec<Bin>,
}

/// Rendered charts; a chart that failed to render is `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Charts {
    pub full: Option<ChartPair>,
    pub train: Option<ChartPair>,
    pub validation: Option<ChartPair>,
    pub test: Option<ChartPair>,
}

impl Charts {
    fn slot(&mut self, subset: Subset) -> &mut Option<ChartPair> {
        match subset {
            Subset::Full => &mut self.full,
            Subset::Train => &mut self.train,
            Subset::Validation => &mut self.validation,
            Subset::Test => &mut self.test,
        }
    }

    /// The charts that rendered, in full / train / validation / test order.
    pub fn iter(&self) -> impl Iterator<Item = &ChartPair> {
        [&self.full, &self.train, &self.validation, &self.test]
            .into_iter()
            .flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

/// Everything produced for one upload.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub file_name: String,
    /// Counts of the full (untruncated) dataset.
    pub num_rows: usize,
    pub num_cols: usize,
    pub truncated: bool,
    pub preview_rows: usize,
    pub stratify_column: Option<String>,
    pub split_sizes: SplitSizes,
    pub series: Vec<Series>,
    pub charts: Charts,
    #[serde(skip)]
    pub preview_html: String,
    #[serde(skip)]
    pub preview: Table,
    #[serde(skip)]
    pub partition: Partition,
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Run the whole pipeline for one upload.
///
/// The split runs over the preview rows; the full-dataset series is counted
/// over every row. Chart rendering failures are logged and leave that chart
/// out without failing the report.
pub fn analyze(upload: &Upload, config: &Config) -> Result<Report, AnalyzeError> {
    let file_name = validate_upload(upload)?.to_string();
    let text = loader::decode_bytes(&upload.bytes);
    let table = normalize(&loader::load(&text)?);

    let truncated = table.n_rows() > config.preview_rows;
    let preview = table.head(config.preview_rows);
    let preview_html = html::table_to_html(&preview);

    let stratify_column = preview
        .column_ci(&config.stratify_column)
        .map(str::to_string);
    let partition = split(&preview, stratify_column.as_deref(), config.seed, &config.ratios)?;

    let series = match stratify_column.as_deref() {
        Some(col) => build_series(&table, &partition, col, config),
        None => {
            log::info!(
                "no '{}' column, skipping charts",
                config.stratify_column
            );
            Vec::new()
        }
    };
    let charts = match stratify_column.as_deref() {
        Some(col) => render_charts(&series, col, config),
        None => Charts::default(),
    };

    Ok(Report {
        file_name,
        num_rows: table.n_rows(),
        num_cols: table.n_cols(),
        truncated,
        preview_rows: preview.n_rows(),
        stratify_column,
        split_sizes: SplitSizes {
            train: partition.train.n_rows(),
            validation: partition.validation.n_rows(),
            test: partition.test.n_rows(),
        },
        series,
        charts,
        preview_html,
        preview,
        partition,
    })
}

/// Frequency series for the full table and each subset, all in the same
/// canonical order when it applies.
fn build_series(table: &Table, partition: &Partition, column: &str, config: &Config) -> Vec<Series> {
    let full_values = table
        .column(column)
        .map(|c| c.values.as_slice())
        .unwrap_or_default();
    let order = preferred_order(full_values, &config.preferred_order, &config.anchor_category);

    Subset::ALL
        .into_iter()
        .map(|subset| {
            let source = match subset {
                Subset::Full => table,
                Subset::Train => &partition.train,
                Subset::Validation => &partition.validation,
                Subset::Test => &partition.test,
            };
            let values = source
                .column(column)
                .map(|c| c.values.as_slice())
                .unwrap_or_default();
            Series {
                subset,
                title: format!("{column} - {}", subset.label()),
                bins: histogram(values, order.as_deref()),
            }
        })
        .collect()
}

fn render_charts(series: &[Series], column: &str, config: &Config) -> Charts {
    let mut charts = Charts::default();
    for s in series {
        match chart_pair(&s.title, column, &s.bins, config.thumb_size, config.full_size) {
            Ok(pair) => *charts.slot(s.subset) = Some(pair),
            Err(e) => log::warn!("chart '{}' skipped: {e}", s.title),
        }
    }
    charts
}

/// Result of handling one upload at the outermost layer.
#[derive(Debug)]
pub enum Outcome {
    Report(Box<Report>),
    Error(String),
}

/// Top-level entry point: never panics or returns an error, only a report
/// or a user-facing message.
pub fn handle(upload: &Upload, config: &Config) -> Outcome {
    match panic::catch_unwind(AssertUnwindSafe(|| analyze(upload, config))) {
        Ok(Ok(report)) => Outcome::Report(Box::new(report)),
        Ok(Err(e)) => {
            log::error!("upload rejected: {e}");
            Outcome::Error(e.user_message())
        }
        Err(_) => {
            log::error!("unexpected failure while processing upload");
            Outcome::Error("Error processing file: unexpected internal failure".to_string())
        }
    }
}

impl Outcome {
    /// Render the outcome as a standalone HTML page.
    pub fn to_html(&self) -> String {
        match self {
            Outcome::Report(report) => html::render_page(report),
            Outcome::Error(message) => html::render_error_page(message),
        }
    }
}

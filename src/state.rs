use std::path::Path;

use anyhow::{Context, Result};
use arff_splitter::config::Config;
use arff_splitter::report::{handle, Outcome, Report, Subset, Upload};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: Config,

    /// Result of the last processed file (None until a file is opened).
    pub report: Option<Report>,

    /// Which subset the frequency chart shows.
    pub selected_subset: Subset,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            report: None,
            selected_subset: Subset::Full,
            status_message: None,
        }
    }

    /// Run the pipeline on an upload and keep either the report or the
    /// user-facing error. A rejected upload clears the previous report.
    pub fn process(&mut self, upload: &Upload) {
        match handle(upload, &self.config) {
            Outcome::Report(report) => {
                log::info!(
                    "processed {}: {} rows x {} columns",
                    report.file_name,
                    report.num_rows,
                    report.num_cols
                );
                self.report = Some(*report);
                self.selected_subset = Subset::Full;
                self.status_message = None;
            }
            Outcome::Error(message) => {
                self.report = None;
                self.status_message = Some(message);
            }
        }
    }

    /// Write the current report as a standalone HTML page.
    pub fn export_html(&self, path: &Path) -> Result<()> {
        let report = self.report.as_ref().context("no report to export")?;
        let page = Outcome::Report(Box::new(report.clone())).to_html();
        std::fs::write(path, page).with_context(|| format!("writing {}", path.display()))?;
        log::info!("exported report to {}", path.display());
        Ok(())
    }
}

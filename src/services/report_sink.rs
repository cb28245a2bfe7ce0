use chrono::{Local, NaiveDateTime};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::Result;
use crate::models::report::{ReportRow, ScreeningReport};

/// Destination for finished reports: `accept` once per security, then `finish`.
pub trait ReportSink {
    type Output;

    fn accept(&mut self, report: ScreeningReport) -> Result<()>;

    fn finish(self) -> Result<Self::Output>;
}

/// Collects reports in memory.
impl ReportSink for Vec<ScreeningReport> {
    type Output = Vec<ScreeningReport>;

    fn accept(&mut self, report: ScreeningReport) -> Result<()> {
        self.push(report);
        Ok(())
    }

    fn finish(self) -> Result<Self::Output> {
        Ok(self)
    }
}

/// Writes `RESULTS_<YYYYmmdd_HHMMSS>.csv`, one row per report, most conservative threshold first.
pub struct CsvReportSink {
    path: PathBuf,
    rows: Vec<ReportRow>,
}

impl CsvReportSink {
    pub fn new(results_dir: &Path) -> Self {
        Self::with_timestamp(results_dir, Local::now().naive_local())
    }

    pub fn with_timestamp(results_dir: &Path, timestamp: NaiveDateTime) -> Self {
        let file_name = format!("RESULTS_{}.csv", timestamp.format("%Y%m%d_%H%M%S"));
        Self {
            path: results_dir.join(file_name),
            rows: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReportSink for CsvReportSink {
    type Output = PathBuf;

    fn accept(&mut self, report: ScreeningReport) -> Result<()> {
        self.rows.push(ReportRow::from(&report));
        Ok(())
    }

    fn finish(mut self) -> Result<PathBuf> {
        self.rows
            .sort_by(|a, b| b.threshold_pct.total_cmp(&a.threshold_pct));

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut writer = csv::Writer::from_path(&self.path)?;
        for row in &self.rows {
            writer.serialize(row)?;
        }
        writer.flush()?;

        info!("Wrote {} results to {}", self.rows.len(), self.path.display());
        Ok(self.path)
    }
}

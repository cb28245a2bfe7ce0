pub mod report_sink;
pub mod screening_service;

pub use report_sink::{CsvReportSink, ReportSink};
pub use screening_service::{BatchOutcome, ScreeningService};

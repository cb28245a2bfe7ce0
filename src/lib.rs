pub mod analysis;
pub mod config;
pub mod data_provider;
pub mod errors;
pub mod models;
pub mod pricing;
pub mod services;
pub mod util;

pub use analysis::{CspEngine, HistoryAnalysis};
pub use config::{Config, ThresholdComparison};
pub use data_provider::{MarketDataProvider, OptionsChainProvider, RiskFreeRateProvider, SnapshotStore};
pub use errors::{Result, ScreenerError};
pub use models::report::{PutLeg, ScreeningReport};
pub use services::{BatchOutcome, CsvReportSink, ReportSink, ScreeningService};

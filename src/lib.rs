pub mod chart;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod report;
pub mod util;

pub use chart::{ChartSeries, build_status_series, build_success_rate_series};
pub use error::ReportError;
pub use report::{MigrationReport, SheetReport, select_sheet};

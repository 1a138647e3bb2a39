pub mod aggregate;
pub mod cli;
pub mod client;
pub mod collector;
pub mod config;
pub mod dimensions;
pub mod logging;
pub mod metrics;
pub mod report;
pub mod store;
pub mod timeframe;
pub mod units;
pub mod xlsx;

pub use aggregate::{reduce, Aggregate, StreamFilter};
pub use metrics::MetricKind;
pub use report::{build_report, ColumnSpec, ReportRow, ReportTable};
pub use store::{QueryResult, SampleStream, SeriesStore};
pub use timeframe::{ReportType, ReportWindow, TimeframeError};

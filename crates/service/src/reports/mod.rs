//! Sales reports per event: aggregation, persistence and CSV export.

pub mod csv;
pub mod service;
pub mod summary;

pub use service::{export_csv, generate_report, get_report, list_reports, ReportRequest};
pub use summary::{summarize, ReportSummary, SaleRow};

//! Pipeline entry points.
//!
//! - `run_crawler`: Crawl all pages for one period
//! - `write_result`: Save a crawl result as CSV or JSON

pub mod crawl;
pub mod export;

pub use crawl::{period_label, run_crawler};
pub use export::{ExportFormat, write_result};

//! Output of a completed crawl session.

use chrono::{DateTime, Utc};

use crate::models::{Diagnostic, NormalizedRecord, Schema};

/// Records from every visited page, in visit order (page 1 first).
#[derive(Debug, Clone)]
pub struct CrawlResult {
    pub records: Vec<NormalizedRecord>,
    pub schema: Schema,
    pub diagnostics: Vec<Diagnostic>,
    /// Page count from the pager or the caller
    pub total_pages: u32,
    pub pages_visited: u32,
    /// Stopped early on the caller's request
    pub cancelled: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CrawlResult {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn elapsed_secs(&self) -> f64 {
        (self.finished_at - self.started_at).num_milliseconds() as f64 / 1000.0
    }
}

// src/pipeline/crawl.rs

//! Record crawling pipeline.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use crate::error::Result;
use crate::models::{Config, CrawlParams, CrawlResult};
use crate::services::CrawlSession;
use crate::utils::http::ReqwestTransport;
use crate::utils::log;

/// Human-readable period, e.g. `2024` or `2024-05`.
pub fn period_label(params: &CrawlParams) -> String {
    match params.month {
        Some(month) => format!("{}-{:02}", params.year, month),
        None => params.year.to_string(),
    }
}

/// Crawl every page of the listing for `params` over a fresh HTTP session.
pub async fn run_crawler(
    config: Arc<Config>,
    params: CrawlParams,
    cancel: Arc<AtomicBool>,
) -> Result<CrawlResult> {
    log::header(&format!("KBO record crawl {}", period_label(&params)));
    log::sub_item(&format!("Source: {}", config.site.base_url));

    let transport = ReqwestTransport::new(&config.crawler)?;
    let mut session = CrawlSession::new(transport, Arc::clone(&config), params)
        .with_cancel_flag(cancel);

    let result = match session.run().await {
        Ok(result) => result,
        Err(e) => {
            if e.is_transport() {
                log_discarded(session.collected().len(), session.diagnostics().len());
            }
            return Err(e);
        }
    };

    log::separator();
    log::summary(
        "Crawl finished",
        &[
            (
                "Pages",
                format!("{}/{}", result.pages_visited, result.total_pages),
            ),
            ("Records", result.len().to_string()),
            ("Diagnostics", result.diagnostics.len().to_string()),
            ("Elapsed", format!("{:.1}s", result.elapsed_secs())),
        ],
    );
    if result.cancelled {
        ::log::warn!("Crawl was cancelled; the result is partial");
    }

    Ok(result)
}

/// Report what an aborted session had gathered before it failed.
fn log_discarded(records: usize, diagnostics: usize) {
    if records > 0 {
        ::log::warn!(
            "{records} record(s) and {diagnostics} diagnostic(s) from completed pages were not saved"
        );
    }
}

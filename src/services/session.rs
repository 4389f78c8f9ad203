// src/services/session.rs

//! Crawl session: the postback traversal state machine.
//!
//! A session fetches page 1 with a GET, then walks pages 2..=N by posting
//! back the hidden state captured from the immediately preceding response.
//! Pages are strictly sequential because every postback body depends on the
//! previous page's tokens.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use scraper::Html;

use crate::error::{AppError, Result};
use crate::models::{
    Config, CrawlParams, CrawlResult, Diagnostic, NormalizedRecord, PageState, Schema,
};
use crate::services::normalizer::{ColumnAliases, NormalizeContext, TableNormalizer};
use crate::services::pager::{PagePlan, PageTransitionPlanner};
use crate::services::state::StateExtractor;
use crate::services::table::TableParser;
use crate::utils::http::{PageRequest, Transport};

/// Where the session is in its traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Init,
    FetchingFirst,
    PostingNext { page: u32 },
    Done,
    /// A request for `page` failed; nothing further is fetched.
    Aborted { page: u32 },
}

/// One traversal of the record listing for one period.
///
/// The session owns its transport (and with it the cookie jar) for its whole
/// lifetime and holds exactly one current [`PageState`].
pub struct CrawlSession<T: Transport> {
    transport: T,
    config: Arc<Config>,
    params: CrawlParams,
    planner: PageTransitionPlanner,
    normalizer: TableNormalizer,
    cancel: Option<Arc<AtomicBool>>,
    state: SessionState,
    page_state: PageState,
    records: Vec<NormalizedRecord>,
    schema: Schema,
    diagnostics: Vec<Diagnostic>,
    pages_visited: u32,
}

impl<T: Transport> CrawlSession<T> {
    /// Create a session for `params` against the site in `config`.
    pub fn new(transport: T, config: Arc<Config>, params: CrawlParams) -> Self {
        let planner = PageTransitionPlanner::from_site(&config.site);
        let normalizer = TableNormalizer::new(ColumnAliases::new(&config.aliases));

        Self {
            transport,
            config,
            params,
            planner,
            normalizer,
            cancel: None,
            state: SessionState::Init,
            page_state: PageState::default(),
            records: Vec::new(),
            schema: Schema::default(),
            diagnostics: Vec::new(),
            pages_visited: 0,
        }
    }

    /// Stop before the next page once `flag` is set.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Records gathered so far. After a transport failure these are the
    /// pages that completed; the caller decides whether to keep them.
    pub fn collected(&self) -> &[NormalizedRecord] {
        &self.records
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Release the transport handle.
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Run the traversal to completion.
    ///
    /// Only transport failures abort; missing tables and bad cells are
    /// recorded as diagnostics. A session can run once.
    pub async fn run(&mut self) -> Result<CrawlResult> {
        if self.state != SessionState::Init {
            return Err(AppError::crawl("session", "a crawl session can only run once"));
        }
        let started_at = Utc::now();
        let config = Arc::clone(&self.config);
        let delay = config.crawler.request_delay();

        self.transition(SessionState::FetchingFirst);
        let request = PageRequest::get(&config.site.base_url, self.period_query());
        let body = self.fetch(1, &request).await?;
        let plan = self.absorb_first_page(&body);

        let mut cancelled = false;
        for page in plan.postback_pages() {
            if self.is_cancelled() {
                log::warn!("Crawl cancelled before page {}/{}", page, plan.total_pages());
                cancelled = true;
                break;
            }

            self.transition(SessionState::PostingNext { page });
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            let form = self.page_state.postback_form(&plan.target_for(page));
            let request = PageRequest::post(&config.site.base_url, form);
            let body = self.fetch(page, &request).await?;
            self.absorb_next_page(page, &body);
        }

        self.transition(SessionState::Done);
        Ok(CrawlResult {
            records: std::mem::take(&mut self.records),
            schema: std::mem::take(&mut self.schema),
            diagnostics: self.diagnostics.clone(),
            total_pages: plan.total_pages(),
            pages_visited: self.pages_visited,
            cancelled,
            started_at,
            finished_at: Utc::now(),
        })
    }

    fn transition(&mut self, next: SessionState) {
        log::debug!("Session state {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    fn period_query(&self) -> Vec<(String, String)> {
        let site = &self.config.site;
        let mut query = vec![(site.year_param.clone(), self.params.year.to_string())];
        if let Some(month) = self.params.month {
            query.push((site.month_param.clone(), month.to_string()));
        }
        query
    }

    /// Issue one request; any failure or non-2xx status aborts the session.
    async fn fetch(&mut self, page: u32, request: &PageRequest) -> Result<String> {
        let outcome = match self.transport.fetch(request).await {
            Ok(response) if response.is_success() => Ok(response.body),
            Ok(response) => Err(AppError::transport(page, format!("HTTP {}", response.status))),
            Err(e) => Err(AppError::transport(page, e)),
        };

        if let Err(e) = &outcome {
            log::error!("Aborting crawl: {e}");
            self.transition(SessionState::Aborted { page });
        }
        outcome
    }

    fn absorb_first_page(&mut self, body: &str) -> PagePlan {
        let document = Html::parse_document(body);
        self.replace_page_state(1, &document);

        let explicit = self.params.max_pages.or(self.config.site.max_pages);
        let (plan, diagnostic) = self.planner.plan(&document, explicit);
        if let Some(diagnostic) = diagnostic {
            self.push_diagnostic(diagnostic);
        }
        log::info!("Planned {} page(s)", plan.total_pages());

        self.absorb_table(1, &document);
        plan
    }

    fn absorb_next_page(&mut self, page: u32, body: &str) {
        let document = Html::parse_document(body);
        self.replace_page_state(page, &document);
        self.absorb_table(page, &document);
    }

    /// The new page's tokens replace the old ones outright.
    fn replace_page_state(&mut self, page: u32, document: &Html) {
        self.page_state = StateExtractor::extract(document);
        log::debug!(
            "Page {} state: viewstate {}B, validation {}B, generator '{}'",
            page,
            self.page_state.view_state.len(),
            self.page_state.event_validation.len(),
            self.page_state.generator
        );
    }

    fn absorb_table(&mut self, page: u32, document: &Html) {
        self.pages_visited += 1;

        let tables = TableParser::parse_tables(document);
        let Some(last) = tables.len().checked_sub(1) else {
            self.push_diagnostic(Diagnostic::MissingTable { page });
            return;
        };
        let table = &tables[self.config.site.table_index.min(last)];

        let context = NormalizeContext {
            page,
            year: self.params.year,
            month: self.params.month,
        };
        let normalized = self.normalizer.normalize(table, &context);

        log::info!("Page {}: {} record(s)", page, normalized.records.len());
        for diagnostic in normalized.diagnostics {
            self.push_diagnostic(diagnostic);
        }
        self.schema.merge(&normalized.schema);
        self.records.extend(normalized.records);
    }

    fn push_diagnostic(&mut self, diagnostic: Diagnostic) {
        log::warn!("{diagnostic}");
        self.diagnostics.push(diagnostic);
    }
}

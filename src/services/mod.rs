//! Service layer for the crawler.
//!
//! - Hidden-state extraction (`StateExtractor`)
//! - Pager inspection and event targets (`PageTransitionPlanner`)
//! - HTML table parsing (`TableParser`)
//! - Canonical record normalization (`TableNormalizer`)
//! - The postback traversal itself (`CrawlSession`)

pub mod normalizer;
pub mod pager;
pub mod session;
pub mod state;
pub mod table;

pub use normalizer::{ColumnAliases, NormalizeContext, NormalizedTable, TableNormalizer};
pub use pager::{PagePlan, PageTransitionPlanner};
pub use session::{CrawlSession, SessionState};
pub use state::StateExtractor;
pub use table::TableParser;

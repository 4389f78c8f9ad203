// src/models/mod.rs

//! Domain models for the crawler application.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod diagnostic;
mod record;
mod result;
mod state;
mod table;

// Re-export all public types
pub use config::{Config, CrawlerConfig, LoggingConfig, SiteConfig};
pub use diagnostic::Diagnostic;
pub use record::{CrawlParams, Field, FieldKind, NormalizedRecord, Schema};
pub use result::CrawlResult;
pub use state::PageState;
pub use table::{RawRow, RawTable};

pub mod form {
    //! Names of the ASP.NET postback form fields.
    pub use super::state::{
        EVENT_ARGUMENT, EVENT_TARGET, EVENT_VALIDATION, VIEW_STATE, VIEW_STATE_GENERATOR,
    };
}

// src/lib.rs

//! KBO record crawler library.
//!
//! Walks ASP.NET postback-paginated record listings and normalizes the
//! tables into canonical batting records.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod utils;

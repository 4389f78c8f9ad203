// src/utils/http.rs

//! HTTP client utilities and the page transport used by crawl sessions.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT_LANGUAGE, HeaderMap, HeaderValue};

use crate::error::{AppError, Result};
use crate::models::CrawlerConfig;

/// Request method for a page fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// A single page request: a GET with query parameters or a form POST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub form: Vec<(String, String)>,
}

impl PageRequest {
    pub fn get(url: impl Into<String>, query: Vec<(String, String)>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            query,
            form: Vec::new(),
        }
    }

    pub fn post(url: impl Into<String>, form: Vec<(String, String)>) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            query: Vec::new(),
            form,
        }
    }

    /// Value of a form field, if present.
    pub fn form_value(&self, key: &str) -> Option<&str> {
        self.form
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Status and body of a fetched page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResponse {
    pub status: u16,
    pub body: String,
}

impl PageResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Fetch capability consumed by the crawl session.
///
/// Implementations return `Err` only for failures below HTTP (connect,
/// timeout, body decoding); status handling is left to the caller.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(&self, request: &PageRequest) -> Result<PageResponse>;
}

/// Create a configured asynchronous HTTP client.
///
/// The client keeps cookies so the server-side session survives across
/// postbacks.
pub fn create_async_client(config: &CrawlerConfig) -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    let accept_language = HeaderValue::from_str(&config.accept_language)
        .map_err(|e| AppError::config(format!("invalid accept_language: {e}")))?;
    headers.insert(ACCEPT_LANGUAGE, accept_language);

    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .default_headers(headers)
        .cookie_store(true)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// `reqwest`-backed transport owning one cookie-carrying client.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(config: &CrawlerConfig) -> Result<Self> {
        Ok(Self {
            client: create_async_client(config)?,
        })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn fetch(&self, request: &PageRequest) -> Result<PageResponse> {
        let builder = match request.method {
            Method::Get => self.client.get(&request.url).query(&request.query),
            Method::Post => self.client.post(&request.url).form(&request.form),
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(PageResponse { status, body })
    }
}

//! Application configuration structures.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::Field;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP and pacing settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Target site layout (URL, control id prefixes, table index)
    #[serde(default)]
    pub site: SiteConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Source column name to canonical column name
    #[serde(default = "defaults::aliases")]
    pub aliases: BTreeMap<String, String>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }

        let base = url::Url::parse(&self.site.base_url)?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(AppError::validation(format!(
                "site.base_url must be http(s), got '{}'",
                base.scheme()
            )));
        }
        if self.site.event_target_prefix.trim().is_empty() {
            return Err(AppError::validation("site.event_target_prefix is empty"));
        }
        if self.site.max_pages == Some(0) {
            return Err(AppError::validation("site.max_pages must be > 0"));
        }
        if self.site.year_param.trim().is_empty() {
            return Err(AppError::validation("site.year_param is empty"));
        }

        for (source, target) in &self.aliases {
            if Field::from_canonical(target).is_none() {
                return Err(AppError::validation(format!(
                    "alias '{source}' maps to unknown column '{target}'"
                )));
            }
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            crawler: CrawlerConfig::default(),
            site: SiteConfig::default(),
            logging: LoggingConfig::default(),
            aliases: defaults::aliases(),
        }
    }
}

/// HTTP client and pacing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Accept-Language header for HTTP requests
    #[serde(default = "defaults::accept_language")]
    pub accept_language: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Delay before each postback in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,
}

impl CrawlerConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            accept_language: defaults::accept_language(),
            timeout_secs: defaults::timeout(),
            request_delay_ms: defaults::request_delay(),
        }
    }
}

/// Layout of the postback-driven record page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Record page URL; both the initial GET and every postback go here
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Which table on the page holds the records (clamped to what exists)
    #[serde(default)]
    pub table_index: usize,

    /// `id` prefix of the pager buttons in the rendered markup
    #[serde(default = "defaults::pager_id_prefix")]
    pub pager_id_prefix: String,

    /// `__EVENTTARGET` prefix of the pager buttons (server control name)
    #[serde(default = "defaults::event_target_prefix")]
    pub event_target_prefix: String,

    /// Known page count; skips pager inspection when set
    #[serde(default)]
    pub max_pages: Option<u32>,

    /// Query parameter carrying the season year
    #[serde(default = "defaults::year_param")]
    pub year_param: String,

    /// Query parameter carrying the month, sent only for monthly crawls
    #[serde(default = "defaults::month_param")]
    pub month_param: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            table_index: 0,
            pager_id_prefix: defaults::pager_id_prefix(),
            event_target_prefix: defaults::event_target_prefix(),
            max_pages: None,
            year_param: defaults::year_param(),
            month_param: defaults::month_param(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log level when `RUST_LOG` is not set
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    use std::collections::BTreeMap;

    // Crawler defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
            .into()
    }
    pub fn accept_language() -> String {
        "ko-KR,ko;q=0.9,en-US;q=0.8,en;q=0.7".into()
    }
    pub fn timeout() -> u64 {
        20
    }
    pub fn request_delay() -> u64 {
        800
    }

    // Site defaults
    pub fn base_url() -> String {
        "https://example.com/kbo/records/batter/monthly".into()
    }
    pub fn pager_id_prefix() -> String {
        "cphContents_cphContents_cphContents_ucPager_btnNo".into()
    }
    pub fn event_target_prefix() -> String {
        "ctl00$ctl00$ctl00$cphContents$cphContents$cphContents$ucPager$btnNo".into()
    }
    pub fn year_param() -> String {
        "year".into()
    }
    pub fn month_param() -> String {
        "month".into()
    }

    pub fn log_level() -> String {
        "info".into()
    }

    // Column alias defaults
    pub fn aliases() -> BTreeMap<String, String> {
        [
            ("선수", "player"),
            ("선수명", "player"),
            ("팀", "team"),
            ("팀명", "team"),
            ("연도", "year"),
            ("월", "month"),
            ("경기", "G"),
            ("타수", "AB"),
            ("안타", "H"),
            ("타율", "AVG"),
            ("홈런", "HR"),
            ("볼넷", "BB"),
            ("삼진", "SO"),
            ("출루율", "OBP"),
            ("장타율", "SLG"),
            ("OPS", "OPS"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }
}

//! Runtime settings read from the environment (and `.env` through `dotenvy`)

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Directory holding the pre-scraped `<category>.csv` files
    pub data_dir: PathBuf,
    pub user_agent: String,
    /// Pause between two listing pages
    pub page_delay: Duration,
    /// Pause after each detail page request
    pub detail_delay: Duration,
    /// Listing page requests have no timeout unless this is set
    pub page_timeout: Option<Duration>,
    pub detail_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            page_delay: Duration::from_millis(2000),
            detail_delay: Duration::from_millis(1000),
            page_timeout: None,
            detail_timeout: Duration::from_secs(10),
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup, falling back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        if let Some(dir) = lookup("SCRAPER_DATA_DIR") {
            settings.data_dir = PathBuf::from(dir);
        }
        if let Some(agent) = lookup("SCRAPER_USER_AGENT")
            && !agent.trim().is_empty()
        {
            settings.user_agent = agent;
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, "SCRAPER_PAGE_DELAY_MS", "milliseconds")? {
            settings.page_delay = Duration::from_millis(ms);
        }
        if let Some(ms) =
            parse_var::<u64, _>(&lookup, "SCRAPER_DETAIL_DELAY_MS", "milliseconds")?
        {
            settings.detail_delay = Duration::from_millis(ms);
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, "SCRAPER_PAGE_TIMEOUT_SECS", "seconds")? {
            settings.page_timeout = Some(Duration::from_secs(secs));
        }
        if let Some(secs) =
            parse_var::<u64, _>(&lookup, "SCRAPER_DETAIL_TIMEOUT_SECS", "seconds")?
        {
            // detail requests must never wait forever
            if secs == 0 {
                return Err(ConfigError {
                    key: "SCRAPER_DETAIL_TIMEOUT_SECS",
                    value: secs.to_string(),
                    expected: "a positive number of seconds",
                });
            }
            settings.detail_timeout = Duration::from_secs(secs);
        }

        Ok(settings)
    }
}

fn parse_var<T, F>(
    lookup: &F,
    key: &'static str,
    expected: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    raw.trim().parse::<T>().map(Some).map_err(|_| ConfigError {
        key,
        value: raw,
        expected,
    })
}

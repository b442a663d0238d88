//! Error taxonomy for the scrape, clean and load flows.
//!
//! None of these are fatal: each one is caught at the smallest unit of work
//! (a card, a page, a file) and turned into "skip this unit".

use std::path::PathBuf;

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Transport-level failure for one page or detail request
#[derive(Debug, Error)]
#[error("failed to fetch {url}: {source}")]
pub struct FetchError {
    pub url: String,
    #[source]
    pub source: BoxError,
}

impl FetchError {
    pub fn new(url: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self {
            url: url.into(),
            source: source.into(),
        }
    }
}

/// Structural mismatch in one card or one detail page
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("card has no {0} element")]
    MissingElement(&'static str),

    #[error("detail page {url} has no description box")]
    MissingDetailBox { url: String },

    #[error("detail page {url} has {found} description paragraph(s), expected at least 2")]
    MissingDetailParagraph { url: String, found: usize },

    #[error("detail page unavailable: {0}")]
    DetailFetch(#[from] FetchError),
}

/// Why a unit of work was skipped during a scrape
#[derive(Debug, Error)]
pub enum SkipReason {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}

/// Failure to read or write a per-category CSV file
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("file '{}' not found", .path.display())]
    MissingFile { path: PathBuf },

    #[error("malformed CSV in '{}': {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Invalid scrape session parameters
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("page count must be between 1 and {max}, got {got}")]
    PageCount { got: u32, max: u32 },
}

/// Unparsable environment setting
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid value '{value}' for {key}: expected {expected}")]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
    pub expected: &'static str,
}

//! Traits and configuration shared by the fetcher, the extractor and the paginator

use std::time::Duration;

use async_trait::async_trait;

use crate::error::FetchError;

/// Configuration for the scraped website
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// Scheme and host, prepended to relative detail links
    pub origin: String,
    /// CSS selectors for extracting data
    pub selectors: SiteSelectors,
}

/// CSS selectors for the parts of a listing card and of a detail page
#[derive(Debug, Clone)]
pub struct SiteSelectors {
    /// Container selector for individual cards
    pub card_container: String,
    /// Description paragraph within a card
    pub description: String,
    /// Link to the detail page within a card
    pub detail_link: String,
    /// Price paragraph within a card
    pub price: String,
    /// Location paragraph within a card
    pub location: String,
    /// Element holding the location text, inside the location paragraph
    pub location_text: String,
    /// Thumbnail image within a card
    pub image: String,
    /// Description container on a detail page
    pub detail_box: String,
    /// Paragraphs inside the description container
    pub detail_paragraph: String,
}

/// Source of raw page bytes
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch `url`, giving up after `timeout` when one is set.
    ///
    /// A non-2xx status is not an error; the body is returned regardless.
    async fn fetch(&self, url: &str, timeout: Option<Duration>) -> Result<Vec<u8>, FetchError>;
}

/// Which pause the paginator is asking for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pause {
    /// Between two listing pages
    Page,
    /// After a detail page request
    Detail,
}

/// Politeness delay strategy between requests
#[async_trait]
pub trait Pacer: Send + Sync {
    async fn pause(&self, kind: Pause);
}

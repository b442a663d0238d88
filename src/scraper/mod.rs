//! Paginated scraping of a category's listing pages

pub mod cards;
pub mod detail;

use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::error::{SessionError, SkipReason};
use crate::models::{Category, ExtractionMode, Listing, ListingCollection, PrimaryField};
use crate::scrapers::coinafrique;
use crate::traits::{Fetcher, Pacer, Pause};

pub use cards::{CardExtractor, CardHandle, CardSelectors};
pub use detail::follow_detail;

/// Upper bound on pages per run
pub const MAX_PAGES: u32 = 100;

/// Everything one scrape run needs to know, passed in by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeSession {
    pub base_url: String,
    pub page_count: u32,
    pub mode: ExtractionMode,
}

impl ScrapeSession {
    pub fn new(
        base_url: impl Into<String>,
        page_count: u32,
        mode: ExtractionMode,
    ) -> Result<Self, SessionError> {
        if !(1..=MAX_PAGES).contains(&page_count) {
            return Err(SessionError::PageCount {
                got: page_count,
                max: MAX_PAGES,
            });
        }

        Ok(Self {
            base_url: base_url.into(),
            page_count,
            mode,
        })
    }

    pub fn for_category(category: Category, page_count: u32) -> Result<Self, SessionError> {
        Self::new(coinafrique::category_url(category), page_count, category.mode())
    }
}

/// URL of page `page` (1-based) of a listing
pub fn page_url(base_url: &str, page: u32) -> String {
    if page <= 1 {
        base_url.to_string()
    } else if base_url.contains('?') {
        format!("{base_url}&page={page}")
    } else {
        format!("{base_url}?page={page}")
    }
}

/// Position within a page while detail pages are being followed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardProgress {
    /// 1-based
    pub index: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// 1-based page being processed or just finished
    pub page: u32,
    pub page_count: u32,
    pub cards_found: usize,
    /// Set for per-card updates, `None` once the page is done
    pub card: Option<CardProgress>,
}

impl Progress {
    /// Completed pages over requested pages
    pub fn fraction(&self) -> f32 {
        let done = if self.card.is_some() {
            self.page.saturating_sub(1)
        } else {
            self.page
        };
        done as f32 / self.page_count.max(1) as f32
    }
}

/// One skipped page or card
#[derive(Debug)]
pub struct ScrapeIssue {
    pub page: u32,
    /// 1-based card index, `None` when the whole page was lost
    pub card: Option<usize>,
    pub reason: SkipReason,
}

/// Outcome of a scrape run, partial failures included
#[derive(Debug)]
pub struct ScrapeReport {
    pub listings: ListingCollection,
    /// Cards found but not turned into listings
    pub skipped_count: usize,
    pub errors: Vec<ScrapeIssue>,
    pub pages_requested: u32,
    pub pages_fetched: u32,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl ScrapeReport {
    fn start(session: &ScrapeSession) -> Self {
        let now = Utc::now();
        Self {
            listings: ListingCollection::new(session.mode),
            skipped_count: 0,
            errors: Vec::new(),
            pages_requested: session.page_count,
            pages_fetched: 0,
            started_at: now,
            finished_at: now,
        }
    }

    /// True when nothing at all was scraped
    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    pub fn failed_pages(&self) -> usize {
        self.errors.iter().filter(|issue| issue.card.is_none()).count()
    }
}

/// Drives the fetcher and the card extractor across the pages of one listing
pub struct Paginator<F, P> {
    fetcher: F,
    pacer: P,
    extractor: CardExtractor,
    page_timeout: Option<Duration>,
    detail_timeout: Duration,
}

impl<F: Fetcher, P: Pacer> Paginator<F, P> {
    pub fn new(fetcher: F, pacer: P, extractor: CardExtractor, detail_timeout: Duration) -> Self {
        Self {
            fetcher,
            pacer,
            extractor,
            page_timeout: None,
            detail_timeout,
        }
    }

    pub fn with_page_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.page_timeout = timeout;
        self
    }

    /// Scrapes `session.page_count` pages one after the other.
    ///
    /// Lost pages and broken cards are recorded in the report and skipped;
    /// this never fails as a whole. `on_progress` is called after every page
    /// and, in detail mode, after every card.
    pub async fn scrape<C>(&self, session: &ScrapeSession, mut on_progress: C) -> ScrapeReport
    where
        C: FnMut(Progress),
    {
        let mut report = ScrapeReport::start(session);

        info!(
            "Scraping {} page(s) from {} ({:?})",
            session.page_count, session.base_url, session.mode
        );

        for page in 1..=session.page_count {
            let url = page_url(&session.base_url, page);
            info!("Scraping page {}/{}: {}", page, session.page_count, url);

            match self.fetcher.fetch(&url, self.page_timeout).await {
                Ok(body) => {
                    report.pages_fetched += 1;
                    self.scrape_page(session, page, &body, &mut report, &mut on_progress)
                        .await;
                }
                Err(e) => {
                    warn!("Skipping page {}/{}: {}", page, session.page_count, e);
                    report.errors.push(ScrapeIssue {
                        page,
                        card: None,
                        reason: e.into(),
                    });
                }
            }

            on_progress(Progress {
                page,
                page_count: session.page_count,
                cards_found: report.listings.len(),
                card: None,
            });

            if page < session.page_count {
                self.pacer.pause(Pause::Page).await;
            }
        }

        report.finished_at = Utc::now();
        info!(
            "Scraped {} listing(s) over {}/{} page(s), {} card(s) skipped",
            report.listings.len(),
            report.pages_fetched,
            report.pages_requested,
            report.skipped_count
        );
        report
    }

    async fn scrape_page<C>(
        &self,
        session: &ScrapeSession,
        page: u32,
        body: &[u8],
        report: &mut ScrapeReport,
        on_progress: &mut C,
    ) where
        C: FnMut(Progress),
    {
        let cards = self.extractor.extract_cards(body);
        let total = cards.len();
        info!("Page {}/{}: {} card(s) found", page, session.page_count, total);

        for (i, card) in cards.iter().enumerate() {
            let index = i + 1;

            match self.scrape_card(card, session.mode).await {
                Ok(listing) => report.listings.push(listing),
                Err(reason) => {
                    debug!("Skipping card {}/{} on page {}: {}", index, total, page, reason);
                    report.skipped_count += 1;
                    report.errors.push(ScrapeIssue {
                        page,
                        card: Some(index),
                        reason,
                    });
                }
            }

            if session.mode == ExtractionMode::DetailLink {
                on_progress(Progress {
                    page,
                    page_count: session.page_count,
                    cards_found: report.listings.len(),
                    card: Some(CardProgress { index, total }),
                });
            }
        }
    }

    async fn scrape_card(
        &self,
        card: &CardHandle,
        mode: ExtractionMode,
    ) -> Result<Listing, SkipReason> {
        let extracted = self.extractor.extract_listing(card, mode)?;

        let target = match &extracted.primary {
            PrimaryField::Text(text) => {
                let text = text.clone();
                return Ok(extracted.into_listing(text));
            }
            PrimaryField::Detail(target) => target.clone(),
        };

        let details =
            follow_detail(&self.fetcher, &self.extractor, &target, self.detail_timeout).await;
        self.pacer.pause(Pause::Detail).await;

        Ok(extracted.into_listing(details?))
    }
}

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cleaner;
use crate::config::Settings;
use crate::dashboard::{self, Dashboard};
use crate::dataset::{self, LoadedCategories};
use crate::fetcher::HttpFetcher;
use crate::models::ListingCollection;
use crate::pacing::FixedPacer;
use crate::scraper::{CardExtractor, Paginator, Progress, ScrapeReport, ScrapeSession};
use crate::scrapers::site_config;
use crate::traits::{Fetcher, Pacer};

/// Raw and cleaned data of one scrape run
#[derive(Debug)]
pub struct ScrapeOutcome {
    pub report: ScrapeReport,
    pub cleaned: ListingCollection,
}

/// Pipeline talking to the real site with fixed delays
pub type HttpPipeline = ListingPipeline<HttpFetcher, FixedPacer>;

/// The three flows of the application: scrape and clean, raw data, dashboard
pub struct ListingPipeline<F, P> {
    paginator: Paginator<F, P>,
    settings: Settings,
}

impl ListingPipeline<HttpFetcher, FixedPacer> {
    pub fn new(settings: Settings) -> Result<Self> {
        let fetcher =
            HttpFetcher::new(&settings.user_agent).context("Failed to create HTTP client")?;
        let pacer = FixedPacer::from_settings(&settings);

        Self::with_parts(settings, fetcher, pacer)
    }
}

impl<F: Fetcher, P: Pacer> ListingPipeline<F, P> {
    pub fn with_parts(settings: Settings, fetcher: F, pacer: P) -> Result<Self> {
        let extractor = CardExtractor::new(&site_config())?;
        let paginator = Paginator::new(fetcher, pacer, extractor, settings.detail_timeout)
            .with_page_timeout(settings.page_timeout);

        Ok(Self { paginator, settings })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Scrapes the session's pages and cleans the result
    pub async fn scrape_and_clean<C>(
        &self,
        session: &ScrapeSession,
        on_progress: C,
    ) -> ScrapeOutcome
    where
        C: FnMut(Progress),
    {
        let report = self.paginator.scrape(session, on_progress).await;

        if report.is_empty() {
            warn!("No listing was scraped; the site layout may have changed");
        }

        let cleaned = cleaner::clean(&report.listings);
        info!("{} listing(s) after cleaning", cleaned.len());

        ScrapeOutcome { report, cleaned }
    }

    /// Pre-scraped files as they are, tool columns removed
    pub fn load_raw(&self) -> LoadedCategories {
        dataset::load_all(&self.settings.data_dir)
    }

    pub fn dashboard(&self) -> Dashboard {
        dashboard::load_dashboard(&self.settings.data_dir)
    }
}

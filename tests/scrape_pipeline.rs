use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use coinafrique_scraper::cleaner;
use coinafrique_scraper::config::Settings;
use coinafrique_scraper::error::{ExtractionError, FetchError, SkipReason};
use coinafrique_scraper::models::{Category, ExtractionMode};
use coinafrique_scraper::pacing::NoPacer;
use coinafrique_scraper::pipeline::ListingPipeline;
use coinafrique_scraper::scraper::{CardExtractor, Paginator, Progress, ScrapeSession, page_url};
use coinafrique_scraper::scrapers::site_config;
use coinafrique_scraper::traits::{Fetcher, Pacer, Pause};

const CHIENS_PAGE: &str = include_str!("fixtures/chiens_page1.html");
const POULES_PAGE: &str = include_str!("fixtures/poules_page1.html");
const POULES_DETAIL: &str = include_str!("fixtures/poules_detail_901.html");

/// Serves fixture pages by URL and records every request
#[derive(Clone, Default)]
struct FixtureFetcher {
    pages: HashMap<String, Vec<u8>>,
    requests: Arc<Mutex<Vec<(String, Option<Duration>)>>>,
}

impl FixtureFetcher {
    fn with_page(mut self, url: impl Into<String>, body: &str) -> Self {
        self.pages.insert(url.into(), body.as_bytes().to_vec());
        self
    }

    fn requests(&self) -> Vec<(String, Option<Duration>)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for FixtureFetcher {
    async fn fetch(&self, url: &str, timeout: Option<Duration>) -> Result<Vec<u8>, FetchError> {
        self.requests.lock().unwrap().push((url.to_string(), timeout));
        self.pages.get(url).cloned().ok_or_else(|| {
            FetchError::new(
                url,
                std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused"),
            )
        })
    }
}

#[derive(Clone, Default)]
struct RecordingPacer {
    pauses: Arc<Mutex<Vec<Pause>>>,
}

#[async_trait]
impl Pacer for RecordingPacer {
    async fn pause(&self, kind: Pause) {
        self.pauses.lock().unwrap().push(kind);
    }
}

fn paginator<F: Fetcher, P: Pacer>(fetcher: F, pacer: P) -> Paginator<F, P> {
    let extractor = CardExtractor::new(&site_config()).unwrap();
    Paginator::new(fetcher, pacer, extractor, Duration::from_secs(10))
}

#[tokio::test]
async fn malformed_card_is_skipped_and_the_rest_kept() {
    let base = "https://sn.coinafrique.com/categorie/chiens";
    let fetcher = FixtureFetcher::default().with_page(base, CHIENS_PAGE);
    let session = ScrapeSession::new(base, 1, ExtractionMode::SimpleName).unwrap();

    let report = paginator(fetcher, NoPacer).scrape(&session, |_| {}).await;

    assert_eq!(report.listings.len(), 3);
    assert_eq!(report.skipped_count, 1);
    assert_eq!(report.pages_fetched, 1);

    let names: Vec<_> = report
        .listings
        .iter()
        .map(|l| l.primary_field.as_deref().unwrap())
        .collect();
    assert_eq!(names, ["Berger allemand", "Chiots rottweiler", "Boerboel mâle 8 mois"]);

    let issue = &report.errors[0];
    assert_eq!(issue.page, 1);
    assert_eq!(issue.card, Some(3));
    assert!(matches!(
        issue.reason,
        SkipReason::Extraction(ExtractionError::MissingElement("price"))
    ));
}

#[tokio::test]
async fn lost_pages_are_reported_and_skipped() {
    let base = "https://sn.coinafrique.com/categorie/chiens";
    // only page 2 is reachable
    let fetcher = FixtureFetcher::default().with_page(page_url(base, 2), CHIENS_PAGE);
    let pacer = RecordingPacer::default();
    let session = ScrapeSession::new(base, 3, ExtractionMode::SimpleName).unwrap();

    let mut progress: Vec<Progress> = Vec::new();
    let report = paginator(fetcher.clone(), pacer.clone())
        .scrape(&session, |p| progress.push(p))
        .await;

    assert_eq!(report.listings.len(), 3);
    assert_eq!(report.pages_fetched, 1);
    assert_eq!(report.failed_pages(), 2);

    let urls: Vec<_> = fetcher.requests().into_iter().map(|(url, _)| url).collect();
    assert_eq!(urls, [base.to_string(), format!("{base}?page=2"), format!("{base}?page=3")]);

    // one update per page, even for lost ones
    let pages: Vec<_> = progress.iter().map(|p| (p.page, p.cards_found)).collect();
    assert_eq!(pages, [(1, 0), (2, 3), (3, 3)]);
    assert_eq!(progress.last().unwrap().fraction(), 1.0);

    // no pause after the last page
    assert_eq!(*pacer.pauses.lock().unwrap(), [Pause::Page, Pause::Page]);
}

#[tokio::test]
async fn nothing_reachable_gives_an_empty_report() {
    let session = ScrapeSession::for_category(Category::Sheep, 2).unwrap();
    let report = paginator(FixtureFetcher::default(), NoPacer)
        .scrape(&session, |_| {})
        .await;

    assert!(report.is_empty());
    assert_eq!(report.errors.len(), 2);
    assert_eq!(report.skipped_count, 0);
}

#[tokio::test]
async fn detail_mode_follows_links_and_falls_back_without_one() {
    let session = ScrapeSession::for_category(Category::Poultry, 1).unwrap();
    let fetcher = FixtureFetcher::default()
        .with_page(session.base_url.clone(), POULES_PAGE)
        .with_page(
            "https://sn.coinafrique.com/annonce/poules-lapins-et-pigeons/poules-pondeuses-901",
            POULES_DETAIL,
        );
    let pacer = RecordingPacer::default();

    let mut card_updates = Vec::new();
    let report = paginator(fetcher.clone(), pacer.clone())
        .scrape(&session, |p| {
            if let Some(card) = p.card {
                card_updates.push((card.index, card.total));
            }
        })
        .await;

    // the 902 detail page is unreachable, so that card is dropped
    assert_eq!(report.listings.len(), 2);
    assert_eq!(report.skipped_count, 1);
    assert_eq!(
        report.listings.listings[0].primary_field.as_deref(),
        Some("Poules pondeuses de 6 mois, vaccinées, vendues par lot de 10.")
    );
    assert_eq!(report.listings.listings[0].price_raw.as_deref(), Some("3 500 CFA"));
    assert_eq!(report.listings.listings[1].primary_field.as_deref(), Some("Pigeons voyageurs"));
    assert!(matches!(
        report.errors[0].reason,
        SkipReason::Extraction(ExtractionError::DetailFetch(_))
    ));

    assert_eq!(card_updates, [(1, 3), (2, 3), (3, 3)]);

    // one pause per detail request, none between pages of a single-page run
    assert_eq!(*pacer.pauses.lock().unwrap(), [Pause::Detail, Pause::Detail]);

    let requests = fetcher.requests();
    assert_eq!(requests[0].1, None);
    assert!(
        requests[1..]
            .iter()
            .all(|(_, timeout)| *timeout == Some(Duration::from_secs(10)))
    );
}

#[tokio::test]
async fn pipeline_scrapes_then_cleans() {
    let session = ScrapeSession::for_category(Category::Dogs, 1).unwrap();
    let fetcher = FixtureFetcher::default().with_page(session.base_url.clone(), CHIENS_PAGE);
    let pipeline = ListingPipeline::with_parts(Settings::default(), fetcher, NoPacer).unwrap();

    let outcome = pipeline.scrape_and_clean(&session, |_| {}).await;

    assert_eq!(outcome.cleaned.len(), 3);
    let first = &outcome.cleaned.listings[0];
    assert_eq!(first.price_clean, Some(150_000));
    assert_eq!(first.location.as_deref(), Some("Dakar, Sénégal"));

    let on_request = &outcome.cleaned.listings[1];
    assert_eq!(on_request.price_clean, Some(0));

    let last = &outcome.cleaned.listings[2];
    assert_eq!(last.location.as_deref(), Some("Saint-Louis, Sénégal"));

    // the raw capture keeps the page's spacing
    assert_eq!(
        outcome.report.listings.listings[0].location.as_deref(),
        Some("Dakar,  Sénégal")
    );
    assert_eq!(cleaner::clean(&outcome.cleaned), outcome.cleaned);
}

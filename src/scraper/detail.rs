use std::time::Duration;

use tracing::debug;

use crate::error::ExtractionError;
use crate::models::DetailTarget;
use crate::scraper::cards::CardExtractor;
use crate::traits::Fetcher;

/// Fetches a listing's detail page and returns its description text.
///
/// Pacing is left to the caller.
pub async fn follow_detail<F>(
    fetcher: &F,
    extractor: &CardExtractor,
    target: &DetailTarget,
    timeout: Duration,
) -> Result<String, ExtractionError>
where
    F: Fetcher + ?Sized,
{
    debug!("Following detail page {}", target.url);

    let body = fetcher.fetch(&target.url, Some(timeout)).await?;
    extractor.detail_description(&body, &target.url)
}

//! Scraper and cleaner for the animal classified ads of CoinAfrique Senegal.
//!
//! [`scraper::Paginator`] walks the listing pages of a category, extracting
//! one [`models::Listing`] per card (following detail pages where the
//! category needs them); [`cleaner::clean`] normalizes the result. Pre-scraped
//! CSV files are read by [`dataset`] and summarized by [`dashboard`].

pub mod cleaner;
pub mod config;
pub mod dashboard;
pub mod dataset;
pub mod error;
pub mod fetcher;
pub mod models;
pub mod pacing;
pub mod pipeline;
pub mod scraper;
pub mod scrapers;
pub mod traits;

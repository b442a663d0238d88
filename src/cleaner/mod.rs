//! Post-processing of raw listing collections.
//!
//! The steps run in a fixed order over the whole collection: dedup first so
//! duplicates do not weigh on medians, price conversion before any fill.

use std::collections::HashSet;

use tracing::debug;

use crate::models::{Listing, ListingCollection, NOT_AVAILABLE};

/// Cleans a collection, leaving the input untouched
pub fn clean(collection: &ListingCollection) -> ListingCollection {
    let before = collection.len();

    let mut listings = dedup(&collection.listings);

    for listing in &mut listings {
        listing.price_clean = Some(clean_price(listing.price_raw.as_deref().unwrap_or("")));
        listing.location = listing.location.as_deref().map(normalize_location);
    }

    fill_numeric_median(&mut listings, |l| &mut l.price_clean);

    for listing in &mut listings {
        fill_text(&mut listing.primary_field);
        fill_text(&mut listing.price_raw);
        fill_text(&mut listing.location);
        fill_text(&mut listing.image_url);
    }

    listings.retain(|l| !is_blank(l));

    debug!("Cleaned {} listing(s) down to {}", before, listings.len());
    ListingCollection::with_listings(collection.mode, listings)
}

/// Digits of a displayed price as an integer; 0 when there are none or they
/// do not fit.
pub fn clean_price(raw: &str) -> u64 {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(0)
}

/// Trims and collapses inner whitespace runs to a single space
pub fn normalize_location(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Removes exact duplicates, keeping the first occurrence in place
fn dedup(listings: &[Listing]) -> Vec<Listing> {
    let mut seen = HashSet::with_capacity(listings.len());
    listings
        .iter()
        .filter(|l| seen.insert(*l))
        .cloned()
        .collect()
}

/// Median of the present values, rounded down between the two middles
fn median(values: &mut [u64]) -> Option<u64> {
    if values.is_empty() {
        return None;
    }
    values.sort_unstable();
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        Some(values[mid])
    } else {
        let (low, high) = (values[mid - 1], values[mid]);
        Some(low + (high - low) / 2)
    }
}

fn fill_numeric_median<G>(listings: &mut [Listing], mut column: G)
where
    G: FnMut(&mut Listing) -> &mut Option<u64>,
{
    let mut present: Vec<u64> = listings.iter_mut().filter_map(|l| *column(l)).collect();
    let Some(median) = median(&mut present) else {
        return;
    };
    for listing in listings.iter_mut() {
        column(listing).get_or_insert(median);
    }
}

fn fill_text(value: &mut Option<String>) {
    if value.is_none() {
        *value = Some(NOT_AVAILABLE.to_string());
    }
}

fn is_blank(listing: &Listing) -> bool {
    let no_text = listing.text_fields().into_iter().all(|field| {
        field
            .as_deref()
            .is_none_or(|v| v.trim().is_empty() || v == NOT_AVAILABLE)
    });
    no_text && listing.price_clean.unwrap_or(0) == 0
}

//! Data models for scraped animal listings and the categories they come from

use serde::{Deserialize, Serialize};

/// Sentinel written into text columns that have no value after cleaning
pub const NOT_AVAILABLE: &str = "N/A";

/// How the primary field of a card is obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtractionMode {
    /// Primary field is the card's own description text
    SimpleName,
    /// Primary field comes from the listing's detail page when the card links to one
    DetailLink,
}

impl ExtractionMode {
    /// CSV column header used for the primary field
    pub fn primary_column(self) -> &'static str {
        match self {
            Self::SimpleName => "Nom",
            Self::DetailLink => "Details",
        }
    }
}

/// The four animal categories listed on the site
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Dogs,
    Sheep,
    Poultry,
    Other,
}

impl Category {
    pub const ALL: [Self; 4] = [Self::Dogs, Self::Sheep, Self::Poultry, Self::Other];

    /// Short identifier used for file names and on the command line
    pub fn slug(self) -> &'static str {
        match self {
            Self::Dogs => "chiens",
            Self::Sheep => "moutons",
            Self::Poultry => "poules",
            Self::Other => "autres",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Dogs => "Chiens",
            Self::Sheep => "Moutons",
            Self::Poultry => "Poules/Lapins/Pigeons",
            Self::Other => "Autres animaux",
        }
    }

    /// Path of the category listing relative to the site origin
    pub fn path(self) -> &'static str {
        match self {
            Self::Dogs => "/categorie/chiens",
            Self::Sheep => "/categorie/moutons",
            Self::Poultry => "/categorie/poules-lapins-et-pigeons",
            Self::Other => "/categorie/autres-animaux",
        }
    }

    pub fn mode(self) -> ExtractionMode {
        match self {
            Self::Poultry => ExtractionMode::DetailLink,
            Self::Dogs | Self::Sheep | Self::Other => ExtractionMode::SimpleName,
        }
    }

    /// Name of the pre-scraped CSV file for this category
    pub fn data_file(self) -> String {
        format!("{}.csv", self.slug())
    }

    /// Name offered when the raw data of this category is downloaded
    pub fn raw_export_file(self) -> String {
        format!("donnees_{}_brutes.csv", self.slug())
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.slug().eq_ignore_ascii_case(slug.trim()))
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

/// One listing, scraped from a card or read from a CSV row.
///
/// Every field is optional until the collection has been cleaned: CSV cells
/// can be empty and an image element can lack its `src`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Listing {
    /// Name or details text, depending on the category's extraction mode
    pub primary_field: Option<String>,
    /// Price as displayed, currency included
    pub price_raw: Option<String>,
    /// Digits of `price_raw`, filled in by the cleaner
    pub price_clean: Option<u64>,
    pub location: Option<String>,
    pub image_url: Option<String>,
}

impl Listing {
    pub fn text_fields(&self) -> [&Option<String>; 4] {
        [
            &self.primary_field,
            &self.price_raw,
            &self.location,
            &self.image_url,
        ]
    }
}

/// Ordered listings from one scrape or load run of a single category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingCollection {
    pub mode: ExtractionMode,
    pub listings: Vec<Listing>,
}

impl ListingCollection {
    pub fn new(mode: ExtractionMode) -> Self {
        Self {
            mode,
            listings: Vec::new(),
        }
    }

    pub fn with_listings(mode: ExtractionMode, listings: Vec<Listing>) -> Self {
        Self { mode, listings }
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    pub fn push(&mut self, listing: Listing) {
        self.listings.push(listing);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Listing> {
        self.listings.iter()
    }
}

/// Absolute URL of a listing's detail page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailTarget {
    pub url: String,
}

/// Primary field of a card, either read directly or still to be fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimaryField {
    Text(String),
    Detail(DetailTarget),
}

/// Everything read from one card before any detail page is consulted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedCard {
    pub primary: PrimaryField,
    pub price_raw: String,
    pub location: String,
    pub image_url: Option<String>,
}

impl ExtractedCard {
    /// Builds the listing once the primary text is known
    pub fn into_listing(self, primary_text: String) -> Listing {
        Listing {
            primary_field: Some(primary_text),
            price_raw: Some(self.price_raw),
            price_clean: None,
            location: Some(self.location),
            image_url: self.image_url,
        }
    }
}

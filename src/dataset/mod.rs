//! Per-category CSV files: loading pre-scraped data and exporting collections.
//!
//! Input files come from the Web Scraper browser extension, one per category,
//! and may carry bookkeeping columns of that tool. Those are dropped on load.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::DatasetError;
use crate::models::{Category, ExtractionMode, Listing, ListingCollection};

/// Columns added by the scraping tool or pointing at detail pages, never data
pub const ARTIFACT_COLUMNS: [&str; 3] =
    ["web_scraper_order", "web_scraper_start_url", "lien_detail"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Primary,
    PriceRaw,
    PriceClean,
    Location,
    Image,
    Artifact,
    Unknown,
}

fn classify(header: &str) -> Column {
    let key = header.trim().to_lowercase().replace('-', "_");

    if ARTIFACT_COLUMNS.contains(&key.as_str()) {
        return Column::Artifact;
    }
    match key.as_str() {
        "nom" | "name" | "details" => Column::Primary,
        "prix" | "price" => Column::PriceRaw,
        "prix_nettoye" | "price_clean" => Column::PriceClean,
        "adresse" | "location" => Column::Location,
        "image_lien" | "image_url" | "image" => Column::Image,
        _ => Column::Unknown,
    }
}

/// Reads listings from CSV text with a header row. Empty cells are absent values.
pub fn read_collection<R: Read>(
    reader: R,
    mode: ExtractionMode,
) -> Result<ListingCollection, csv::Error> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let mut columns: Vec<Column> = Vec::new();
    let mut primary_seen = false;
    for header in rdr.headers()? {
        let column = match classify(header) {
            // the first name-like column wins
            Column::Primary if primary_seen => Column::Unknown,
            Column::Primary => {
                primary_seen = true;
                Column::Primary
            }
            other => other,
        };
        match column {
            Column::Artifact => debug!("Dropping tool column '{}'", header),
            Column::Unknown => debug!("Ignoring unrecognized column '{}'", header),
            _ => {}
        }
        columns.push(column);
    }

    let mut collection = ListingCollection::new(mode);
    for record in rdr.records() {
        let record = record?;
        let mut listing = Listing::default();

        for (column, cell) in columns.iter().zip(record.iter()) {
            if cell.is_empty() {
                continue;
            }
            let value = Some(cell.to_string());
            match column {
                Column::Primary => listing.primary_field = value,
                Column::PriceRaw => listing.price_raw = value,
                Column::PriceClean => listing.price_clean = cell.trim().parse().ok(),
                Column::Location => listing.location = value,
                Column::Image => listing.image_url = value,
                Column::Artifact | Column::Unknown => {}
            }
        }

        collection.push(listing);
    }

    Ok(collection)
}

/// Loads `<data_dir>/<slug>.csv`
pub fn load_category(
    data_dir: &Path,
    category: Category,
) -> Result<ListingCollection, DatasetError> {
    let path = data_dir.join(category.data_file());

    let file = File::open(&path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            DatasetError::MissingFile { path: path.clone() }
        } else {
            DatasetError::Io {
                path: path.clone(),
                source,
            }
        }
    })?;

    let collection =
        read_collection(file, category.mode()).map_err(|source| DatasetError::Csv {
            path: path.clone(),
            source,
        })?;

    info!(
        "Loaded {} listing(s) for {} from {}",
        collection.len(),
        category,
        path.display()
    );
    Ok(collection)
}

/// Result of loading every category's file
#[derive(Debug, Default)]
pub struct LoadedCategories {
    pub entries: Vec<(Category, Option<ListingCollection>)>,
    /// Categories whose file does not exist
    pub missing: Vec<Category>,
    /// Categories whose file exists but could not be read
    pub failed: Vec<(Category, DatasetError)>,
}

impl LoadedCategories {
    pub fn get(&self, category: Category) -> Option<&ListingCollection> {
        self.entries
            .iter()
            .find(|(c, _)| *c == category)
            .and_then(|(_, collection)| collection.as_ref())
    }

    /// Why an existing file of `category` could not be read
    pub fn failure(&self, category: Category) -> Option<&DatasetError> {
        self.failed
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, error)| error)
    }

    /// Warning to show when some files are absent
    pub fn missing_warning(&self, data_dir: &Path) -> Option<String> {
        if self.missing.is_empty() {
            return None;
        }
        let names: Vec<&str> = self.missing.iter().map(|c| c.slug()).collect();
        Some(format!(
            "Missing files: {}. Scrape these categories with Web Scraper and place the CSV files in '{}'.",
            names.join(", "),
            data_dir.display()
        ))
    }
}

/// Loads all four categories; a missing or broken file only affects its own category
pub fn load_all(data_dir: &Path) -> LoadedCategories {
    let mut loaded = LoadedCategories::default();

    for category in Category::ALL {
        match load_category(data_dir, category) {
            Ok(collection) => loaded.entries.push((category, Some(collection))),
            Err(DatasetError::MissingFile { .. }) => {
                loaded.missing.push(category);
                loaded.entries.push((category, None));
            }
            Err(e) => {
                warn!("Could not load {}: {}", category, e);
                loaded.failed.push((category, e));
                loaded.entries.push((category, None));
            }
        }
    }

    if let Some(warning) = loaded.missing_warning(data_dir) {
        warn!("{}", warning);
    }

    loaded
}

fn optional(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

/// Writes a collection as CSV with a header row and no index column
pub fn write_collection<W: Write>(
    collection: &ListingCollection,
    writer: W,
) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);

    wtr.write_record([
        collection.mode.primary_column(),
        "Prix",
        "Adresse",
        "Image_lien",
        "Prix_nettoye",
    ])?;

    for listing in collection.iter() {
        let price_clean = listing.price_clean.map(|p| p.to_string()).unwrap_or_default();
        wtr.write_record([
            optional(&listing.primary_field),
            optional(&listing.price_raw),
            optional(&listing.location),
            optional(&listing.image_url),
            price_clean.as_str(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// UTF-8 CSV bytes, ready to be offered as a download
pub fn to_csv_bytes(collection: &ListingCollection) -> Result<Vec<u8>, csv::Error> {
    let mut buffer = Vec::new();
    write_collection(collection, &mut buffer)?;
    Ok(buffer)
}

/// Writes a collection to `path`, creating parent directories as needed
pub fn export_to(path: &Path, collection: &ListingCollection) -> Result<PathBuf, DatasetError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|source| DatasetError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let file = File::create(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    write_collection(collection, file).map_err(|source| DatasetError::Csv {
        path: path.to_path_buf(),
        source,
    })?;

    info!("Wrote {} listing(s) to {}", collection.len(), path.display());
    Ok(path.to_path_buf())
}

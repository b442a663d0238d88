//! Per-category summaries shown by the dashboard view

use std::collections::HashMap;
use std::path::Path;

use serde::Serialize;

use crate::cleaner;
use crate::dataset::{self, LoadedCategories};
use crate::models::{Category, ListingCollection, NOT_AVAILABLE};

/// Bars shown in the price chart
pub const PRICE_SERIES_LIMIT: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricePoint {
    pub label: String,
    pub price: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationCount {
    pub location: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryDashboard {
    pub category: Category,
    pub listings: ListingCollection,
    /// First listings with a positive price, labelled by their primary field
    pub price_series: Vec<PricePoint>,
    /// Set when `price_series` was cut to [`PRICE_SERIES_LIMIT`]
    pub price_series_truncated: bool,
    /// Known locations, most frequent first
    pub location_counts: Vec<LocationCount>,
}

impl CategoryDashboard {
    /// Builds the dashboard of an already cleaned collection
    pub fn build(category: Category, listings: ListingCollection) -> Self {
        let (price_series, price_series_truncated) = price_series(&listings);
        let location_counts = location_counts(&listings);

        Self {
            category,
            listings,
            price_series,
            price_series_truncated,
            location_counts,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DashboardView {
    Ready(CategoryDashboard),
    NotFound {
        category: Category,
        file: String,
    },
    /// The file exists but could not be parsed
    Unreadable {
        category: Category,
        file: String,
        reason: String,
    },
}

impl DashboardView {
    pub fn category(&self) -> Category {
        match self {
            DashboardView::Ready(dashboard) => dashboard.category,
            DashboardView::NotFound { category, .. } => *category,
            DashboardView::Unreadable { category, .. } => *category,
        }
    }
}

/// Cleaned data of all four categories
#[derive(Debug)]
pub struct Dashboard {
    pub views: Vec<DashboardView>,
    pub loaded: LoadedCategories,
}

impl Dashboard {
    pub fn view(&self, category: Category) -> Option<&DashboardView> {
        self.views.iter().find(|v| v.category() == category)
    }
}

/// Loads and cleans every category file under `data_dir`
pub fn load_dashboard(data_dir: &Path) -> Dashboard {
    let loaded = dataset::load_all(data_dir);

    let views = Category::ALL
        .into_iter()
        .map(|category| {
            if let Some(raw) = loaded.get(category) {
                DashboardView::Ready(CategoryDashboard::build(category, cleaner::clean(raw)))
            } else if let Some(error) = loaded.failure(category) {
                DashboardView::Unreadable {
                    category,
                    file: category.data_file(),
                    reason: error.to_string(),
                }
            } else {
                DashboardView::NotFound {
                    category,
                    file: category.data_file(),
                }
            }
        })
        .collect();

    Dashboard { views, loaded }
}

fn price_series(listings: &ListingCollection) -> (Vec<PricePoint>, bool) {
    let mut priced = listings.iter().filter_map(|l| match l.price_clean {
        Some(price) if price > 0 => Some(PricePoint {
            label: l
                .primary_field
                .clone()
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            price,
        }),
        _ => None,
    });

    let series: Vec<PricePoint> = priced.by_ref().take(PRICE_SERIES_LIMIT).collect();
    let truncated = priced.next().is_some();
    (series, truncated)
}

fn location_counts(listings: &ListingCollection) -> Vec<LocationCount> {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();

    for location in listings.iter().filter_map(|l| l.location.as_deref()) {
        if location == NOT_AVAILABLE {
            continue;
        }
        let count = counts.entry(location).or_insert(0);
        if *count == 0 {
            order.push(location);
        }
        *count += 1;
    }

    let mut result: Vec<LocationCount> = order
        .into_iter()
        .map(|location| LocationCount {
            location: location.to_string(),
            count: counts[location],
        })
        .collect();
    // stable sort keeps first-seen order among ties
    result.sort_by(|a, b| b.count.cmp(&a.count));
    result
}

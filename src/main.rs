use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use coinafrique_scraper::config::Settings;
use coinafrique_scraper::dashboard::DashboardView;
use coinafrique_scraper::dataset;
use coinafrique_scraper::models::{Category, ListingCollection};
use coinafrique_scraper::pipeline::{HttpPipeline, ListingPipeline};
use coinafrique_scraper::scraper::{MAX_PAGES, ScrapeSession};

#[derive(Parser)]
#[command(author, version, about = "Scrape and clean animal listings from CoinAfrique Senegal")]
struct Args {
    /// Directory holding the pre-scraped <category>.csv files
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scrape a category and clean the result
    Scrape {
        /// chiens, moutons, poules or autres
        #[arg(short, long, value_parser = parse_category)]
        category: Category,

        /// Number of listing pages to scrape
        #[arg(
            short,
            long,
            default_value_t = 1,
            value_parser = clap::value_parser!(u32).range(1..=MAX_PAGES as i64)
        )]
        pages: u32,

        /// Write the cleaned listings to this CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write the listings as scraped to this CSV file
        #[arg(long)]
        raw_output: Option<PathBuf>,

        /// Print the cleaned listings as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the pre-scraped files as they are
    Raw {
        /// Write donnees_<category>_brutes.csv files into this directory
        #[arg(short, long)]
        export_dir: Option<PathBuf>,
    },
    /// Clean the pre-scraped files and summarize one category
    Dashboard {
        #[arg(short, long, value_parser = parse_category)]
        category: Category,

        /// Print the dashboard as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show where to leave feedback on the application
    Feedback,
}

/// Evaluation forms of the application
const FEEDBACK_FORMS: [(&str, &str); 2] = [
    ("Kobo Toolbox", "https://ee.kobotoolbox.org/x/PvlymFPC"),
    ("Google Forms", "https://forms.gle/g3ai6HqfGkWU5WzD9"),
];

fn parse_category(value: &str) -> Result<Category, String> {
    Category::from_slug(value).ok_or_else(|| {
        let known: Vec<&str> = Category::ALL.iter().map(|c| c.slug()).collect();
        format!("unknown category '{}', expected one of: {}", value, known.join(", "))
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut settings = Settings::from_env().context("Invalid scraper settings")?;
    if let Some(dir) = args.data_dir {
        settings.data_dir = dir;
    }

    let pipeline = ListingPipeline::new(settings)?;

    match args.command {
        Command::Scrape {
            category,
            pages,
            output,
            raw_output,
            json,
        } => scrape(&pipeline, category, pages, output, raw_output, json).await,
        Command::Raw { export_dir } => raw(&pipeline, export_dir),
        Command::Dashboard { category, json } => show_dashboard(&pipeline, category, json),
        Command::Feedback => {
            feedback();
            Ok(())
        }
    }
}

async fn scrape(
    pipeline: &HttpPipeline,
    category: Category,
    pages: u32,
    output: Option<PathBuf>,
    raw_output: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let session = ScrapeSession::for_category(category, pages)?;
    info!("Scraping {} ({} page(s))", category.label(), pages);

    let outcome = pipeline
        .scrape_and_clean(&session, |progress| {
            match progress.card {
                Some(card) => info!(
                    "Page {}/{} - listing {}/{} - {:.0}%",
                    progress.page,
                    progress.page_count,
                    card.index,
                    card.total,
                    progress.fraction() * 100.0
                ),
                None => info!(
                    "Page {}/{} done, {} listing(s) so far - {:.0}%",
                    progress.page,
                    progress.page_count,
                    progress.cards_found,
                    progress.fraction() * 100.0
                ),
            }
        })
        .await;

    for issue in &outcome.report.errors {
        match issue.card {
            None => error!("Page {}: {}", issue.page, issue.reason),
            Some(card) => warn!("Page {}, listing {}: {}", issue.page, card, issue.reason),
        }
    }

    if outcome.report.is_empty() {
        warn!("Nothing was scraped. The site may have changed its structure.");
        return Ok(());
    }

    info!(
        "Scraped {} listing(s), {} after cleaning, {} skipped",
        outcome.report.listings.len(),
        outcome.cleaned.len(),
        outcome.report.skipped_count
    );

    if let Some(path) = raw_output {
        dataset::export_to(&path, &outcome.report.listings)?;
    }
    if let Some(path) = output {
        dataset::export_to(&path, &outcome.cleaned)?;
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome.cleaned)?);
    } else {
        print_table(&outcome.cleaned, None);
    }

    Ok(())
}

fn raw(pipeline: &HttpPipeline, export_dir: Option<PathBuf>) -> Result<()> {
    let loaded = pipeline.load_raw();

    for (category, collection) in &loaded.entries {
        println!("== {} ==", category.label());
        let Some(collection) = collection else {
            match loaded.failure(*category) {
                Some(error) => println!("Could not read {}: {}", category.data_file(), error),
                None => println!(
                    "File '{}' not found in '{}'",
                    category.data_file(),
                    pipeline.settings().data_dir.display()
                ),
            }
            println!();
            continue;
        };

        print_table(collection, Some(10));
        println!("{} listing(s) found", collection.len());
        println!();

        if let Some(dir) = &export_dir {
            dataset::export_to(&dir.join(category.raw_export_file()), collection)?;
        }
    }

    Ok(())
}

fn show_dashboard(pipeline: &HttpPipeline, category: Category, json: bool) -> Result<()> {
    let dashboard = pipeline.dashboard();
    let view = dashboard
        .view(category)
        .context("dashboard has no view for this category")?;

    if json {
        println!("{}", serde_json::to_string_pretty(view)?);
        return Ok(());
    }

    match view {
        DashboardView::NotFound { file, .. } => {
            println!(
                "File '{}' not found in '{}'",
                file,
                pipeline.settings().data_dir.display()
            );
        }
        DashboardView::Unreadable { file, reason, .. } => {
            println!("Could not read {}: {}", file, reason);
        }
        DashboardView::Ready(summary) => {
            println!("== {} ==", category.label());
            print_table(&summary.listings, Some(20));

            println!();
            println!("Prices");
            if summary.price_series.is_empty() {
                println!("  no valid price to show");
            } else {
                if summary.price_series_truncated {
                    println!("  (first {} listings)", summary.price_series.len());
                }
                for point in &summary.price_series {
                    println!("  {:>12}  {}", point.price, point.label);
                }
            }

            println!();
            println!("Listings per location");
            if summary.location_counts.is_empty() {
                println!("  no valid location to show");
            }
            for entry in &summary.location_counts {
                println!("  {:>5}  {}", entry.count, entry.location);
            }
        }
    }

    Ok(())
}

fn feedback() {
    println!("Thanks for rating this scraper!");
    for (name, url) in FEEDBACK_FORMS {
        println!("  {:<14} {}", name, url);
    }
}

fn print_table(collection: &ListingCollection, limit: Option<usize>) {
    println!(
        "{:<40} | {:>14} | {:>10} | {:<25}",
        collection.mode.primary_column(),
        "Prix",
        "Prix_nettoye",
        "Adresse"
    );

    let shown = limit.unwrap_or(collection.len());
    for listing in collection.iter().take(shown) {
        println!(
            "{:<40} | {:>14} | {:>10} | {:<25}",
            truncate(listing.primary_field.as_deref().unwrap_or(""), 40),
            listing.price_raw.as_deref().unwrap_or(""),
            listing.price_clean.map(|p| p.to_string()).unwrap_or_default(),
            truncate(listing.location.as_deref().unwrap_or(""), 25),
        );
    }
    if collection.len() > shown {
        println!("... {} more", collection.len() - shown);
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
        cut.push('…');
        cut
    }
}

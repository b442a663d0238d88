use std::fs;
use std::path::{Path, PathBuf};

use coinafrique_scraper::dashboard::{DashboardView, load_dashboard};
use coinafrique_scraper::dataset::{self, load_all, load_category};
use coinafrique_scraper::error::DatasetError;
use coinafrique_scraper::models::{Category, ExtractionMode};

fn tmp_dir(name: &str) -> PathBuf {
    let mut p = std::env::temp_dir();
    p.push(format!("coinafrique_{}_{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&p);
    fs::create_dir_all(&p).unwrap();
    p
}

const CHIENS: &str = "\
web_scraper_order,web_scraper_start_url,Nom,Prix,Adresse,Image_lien
1-1,https://sn.coinafrique.com/categorie/chiens,Berger allemand,150 000 CFA,\" Dakar,  Sénégal \",https://images.coinafrique.com/1.jpg
1-2,https://sn.coinafrique.com/categorie/chiens,Berger allemand,150 000 CFA,\" Dakar,  Sénégal \",https://images.coinafrique.com/1.jpg
1-3,https://sn.coinafrique.com/categorie/chiens,Chiot caniche,Prix sur demande,Thiès,
";

const POULES: &str = "\
web_scraper_order,web_scraper_start_url,lien_detail,Details,Prix,Adresse,Image_lien
2-1,https://sn.coinafrique.com/categorie/poules-lapins-et-pigeons,https://sn.coinafrique.com/annonce/9,Poules pondeuses,3 500 CFA,Rufisque,https://images.coinafrique.com/9.jpg
";

const AUTRES: &str = "\
Nom,Prix,Adresse,Image_lien
Perroquet gris,75 000 CFA,Mbour,https://images.coinafrique.com/7.jpg
Tortue,,,
";

fn seed(dir: &Path) {
    fs::write(dir.join("chiens.csv"), CHIENS).unwrap();
    fs::write(dir.join("poules.csv"), POULES).unwrap();
    fs::write(dir.join("autres.csv"), AUTRES).unwrap();
}

#[test]
fn missing_file_only_affects_its_category() {
    let dir = tmp_dir("missing_moutons");
    seed(&dir);

    let loaded = load_all(&dir);

    assert_eq!(loaded.missing, [Category::Sheep]);
    assert!(loaded.failed.is_empty());
    let warning = loaded.missing_warning(&dir).unwrap();
    assert!(warning.contains("moutons"));
    assert!(!warning.contains("chiens"));

    assert!(loaded.get(Category::Sheep).is_none());
    assert_eq!(loaded.get(Category::Dogs).unwrap().len(), 3);
    assert_eq!(loaded.get(Category::Poultry).unwrap().len(), 1);
    assert_eq!(loaded.get(Category::Other).unwrap().len(), 2);
}

#[test]
fn load_category_reports_missing_file() {
    let dir = tmp_dir("missing_single");
    let err = load_category(&dir, Category::Sheep).unwrap_err();
    match err {
        DatasetError::MissingFile { path } => assert!(path.ends_with("moutons.csv")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn dashboard_shows_not_found_for_missing_category() {
    let dir = tmp_dir("dashboard");
    seed(&dir);

    let dashboard = load_dashboard(&dir);

    match dashboard.view(Category::Sheep).unwrap() {
        DashboardView::NotFound { file, .. } => assert_eq!(file, "moutons.csv"),
        other => panic!("expected not found, got {other:?}"),
    }

    let DashboardView::Ready(dogs) = dashboard.view(Category::Dogs).unwrap() else {
        panic!("dogs should be loaded");
    };
    // duplicate row removed, whitespace normalized, empty image filled
    assert_eq!(dogs.listings.len(), 2);
    assert_eq!(dogs.listings.listings[0].location.as_deref(), Some("Dakar, Sénégal"));
    assert_eq!(dogs.listings.listings[1].image_url.as_deref(), Some("N/A"));
    assert_eq!(dogs.price_series.len(), 1);
    assert_eq!(dogs.price_series[0].price, 150_000);

    let DashboardView::Ready(others) = dashboard.view(Category::Other).unwrap() else {
        panic!("others should be loaded");
    };
    let tortue = &others.listings.listings[1];
    assert_eq!(tortue.price_raw.as_deref(), Some("N/A"));
    assert_eq!(tortue.price_clean, Some(0));
    assert_eq!(tortue.location.as_deref(), Some("N/A"));
    assert_eq!(others.location_counts.len(), 1);
}

#[test]
fn unreadable_file_is_not_reported_missing() {
    let dir = tmp_dir("unreadable_chiens");
    seed(&dir);
    // Latin-1 bytes in a record, not valid UTF-8
    let latin1: &[u8] = b"Nom,Prix,Adresse,Image_lien\nB\xe9lier,1 CFA,Thi\xe8s,\n";
    fs::write(dir.join("chiens.csv"), latin1).unwrap();

    let dashboard = load_dashboard(&dir);

    assert_eq!(dashboard.loaded.missing, [Category::Sheep]);
    assert_eq!(dashboard.loaded.failed.len(), 1);
    assert!(matches!(
        dashboard.loaded.failure(Category::Dogs),
        Some(DatasetError::Csv { .. })
    ));
    let warning = dashboard.loaded.missing_warning(&dir).unwrap();
    assert!(!warning.contains("chiens"));

    match dashboard.view(Category::Dogs).unwrap() {
        DashboardView::Unreadable { file, reason, .. } => {
            assert_eq!(file, "chiens.csv");
            assert!(reason.starts_with("malformed CSV in"));
        }
        other => panic!("expected unreadable, got {other:?}"),
    }
    assert!(matches!(
        dashboard.view(Category::Sheep).unwrap(),
        DashboardView::NotFound { .. }
    ));
    assert!(matches!(
        dashboard.view(Category::Poultry).unwrap(),
        DashboardView::Ready(_)
    ));
    assert!(matches!(
        dashboard.view(Category::Other).unwrap(),
        DashboardView::Ready(_)
    ));
}

#[test]
fn raw_export_drops_tool_columns() {
    let dir = tmp_dir("raw_export");
    seed(&dir);

    let poules = load_category(&dir, Category::Poultry).unwrap();
    assert_eq!(poules.mode, ExtractionMode::DetailLink);

    let target = dir.join("export").join(Category::Poultry.raw_export_file());
    let out = dataset::export_to(&target, &poules).unwrap();
    let text = fs::read_to_string(out).unwrap();

    assert!(text.starts_with("Details,Prix,Adresse,Image_lien,Prix_nettoye\n"));
    assert!(!text.contains("web_scraper"));
    assert!(!text.contains("annonce/9"));
    assert!(text.contains("Poules pondeuses,3 500 CFA,Rufisque"));
}

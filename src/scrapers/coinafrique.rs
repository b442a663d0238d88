//! CoinAfrique Senegal site layout

use crate::models::Category;
use crate::traits::{SiteConfig, SiteSelectors};

pub const ORIGIN: &str = "https://sn.coinafrique.com";

/// Site configuration with the card and detail page selectors of CoinAfrique
pub fn site_config() -> SiteConfig {
    SiteConfig {
        origin: ORIGIN.to_string(),
        selectors: SiteSelectors {
            card_container: "div.col.s6.m4.l3".to_string(),
            description: "p.ad__card-description".to_string(),
            detail_link: "a.card-image.ad__card-image.waves-block.waves-light".to_string(),
            price: "p.ad__card-price".to_string(),
            location: "p.ad__card-location".to_string(),
            location_text: "span".to_string(),
            image: "img.ad__card-img".to_string(),
            detail_box: "div.ad__info__box.ad__info__box-descriptions".to_string(),
            detail_paragraph: "p".to_string(),
        },
    }
}

/// First listing page of a category
pub fn category_url(category: Category) -> String {
    format!("{ORIGIN}{}", category.path())
}

//! Listing card extraction

use scraper::{ElementRef, Html, Selector};

use crate::error::ExtractionError;
use crate::models::{DetailTarget, ExtractedCard, ExtractionMode, PrimaryField};
use crate::traits::{SiteConfig, SiteSelectors};

/// Compiled form of [`SiteSelectors`]
#[derive(Debug, Clone)]
pub struct CardSelectors {
    pub card: Selector,
    pub description: Selector,
    pub detail_link: Selector,
    pub price: Selector,
    pub location: Selector,
    pub location_text: Selector,
    pub image: Selector,
    pub detail_box: Selector,
    pub detail_paragraph: Selector,
}

impl CardSelectors {
    pub fn compile(selectors: &SiteSelectors) -> anyhow::Result<Self> {
        Ok(Self {
            card: parse_selector("card", &selectors.card_container)?,
            description: parse_selector("description", &selectors.description)?,
            detail_link: parse_selector("detail link", &selectors.detail_link)?,
            price: parse_selector("price", &selectors.price)?,
            location: parse_selector("location", &selectors.location)?,
            location_text: parse_selector("location text", &selectors.location_text)?,
            image: parse_selector("image", &selectors.image)?,
            detail_box: parse_selector("detail box", &selectors.detail_box)?,
            detail_paragraph: parse_selector("detail paragraph", &selectors.detail_paragraph)?,
        })
    }
}

fn parse_selector(name: &str, css: &str) -> anyhow::Result<Selector> {
    Selector::parse(css)
        .map_err(|e| anyhow::anyhow!("Failed to parse {} selector '{}': {:?}", name, css, e))
}

/// Markup of one card, detached from the page it was found on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardHandle {
    pub html: String,
}

impl CardHandle {
    pub fn new(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }
}

/// Reads cards and detail pages of one site
#[derive(Debug, Clone)]
pub struct CardExtractor {
    selectors: CardSelectors,
    origin: String,
}

impl CardExtractor {
    pub fn new(site: &SiteConfig) -> anyhow::Result<Self> {
        Ok(Self {
            selectors: CardSelectors::compile(&site.selectors)?,
            origin: site.origin.clone(),
        })
    }

    /// Every card of a listing page, in document order. A page without cards
    /// yields an empty vector.
    pub fn extract_cards(&self, document: &[u8]) -> Vec<CardHandle> {
        let html = String::from_utf8_lossy(document);
        let document = Html::parse_document(&html);

        document
            .select(&self.selectors.card)
            .map(|card| CardHandle::new(card.html()))
            .collect()
    }

    /// Reads the fields of one card.
    ///
    /// In [`ExtractionMode::DetailLink`] a card with a detail anchor yields
    /// [`PrimaryField::Detail`], and an anchor without `href` is an error.
    /// Cards without the anchor, and every card in simple mode, read the
    /// description paragraph.
    pub fn extract_listing(
        &self,
        card: &CardHandle,
        mode: ExtractionMode,
    ) -> Result<ExtractedCard, ExtractionError> {
        let fragment = Html::parse_fragment(&card.html);
        let card = fragment.root_element();

        let detail_link = match mode {
            ExtractionMode::DetailLink => card.select(&self.selectors.detail_link).next(),
            ExtractionMode::SimpleName => None,
        };

        let primary = match detail_link {
            Some(link) => {
                let href = link
                    .value()
                    .attr("href")
                    .ok_or(ExtractionError::MissingElement("detail link href"))?;
                PrimaryField::Detail(DetailTarget {
                    url: format!("{}{}", self.origin, href),
                })
            }
            None => {
                let text = self.first_text(card, &self.selectors.description, "description")?;
                PrimaryField::Text(text)
            }
        };

        let price_raw = self.first_text(card, &self.selectors.price, "price")?;

        let location = card
            .select(&self.selectors.location)
            .next()
            .ok_or(ExtractionError::MissingElement("location"))?;
        let location = self.first_text(location, &self.selectors.location_text, "location span")?;

        let image_url = card
            .select(&self.selectors.image)
            .next()
            .ok_or(ExtractionError::MissingElement("image"))?
            .value()
            .attr("src")
            .map(str::to_string);

        Ok(ExtractedCard {
            primary,
            price_raw,
            location,
            image_url,
        })
    }

    /// Second paragraph of a detail page's description box; the first one is
    /// the "Détails du produit" label.
    pub fn detail_description(
        &self,
        document: &[u8],
        url: &str,
    ) -> Result<String, ExtractionError> {
        let html = String::from_utf8_lossy(document);
        let document = Html::parse_document(&html);

        let description_box = document
            .select(&self.selectors.detail_box)
            .next()
            .ok_or_else(|| ExtractionError::MissingDetailBox { url: url.to_string() })?;

        let paragraphs: Vec<ElementRef> = description_box
            .select(&self.selectors.detail_paragraph)
            .collect();

        paragraphs
            .get(1)
            .map(|p| element_text(*p))
            .ok_or_else(|| ExtractionError::MissingDetailParagraph {
                url: url.to_string(),
                found: paragraphs.len(),
            })
    }

    fn first_text(
        &self,
        scope: ElementRef,
        selector: &Selector,
        name: &'static str,
    ) -> Result<String, ExtractionError> {
        scope
            .select(selector)
            .next()
            .map(element_text)
            .ok_or(ExtractionError::MissingElement(name))
    }
}

fn element_text(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

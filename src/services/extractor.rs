use thirtyfour::error::WebDriverResult;
use thirtyfour::{By, WebDriver, WebElement};

use crate::domain::{assemble_record, GpuRecord};

/// Container class identifying one product card on a listing page.
pub const CARD_CLASS: &str = "item-cell";

const TITLE_CLASS: &str = "item-title";
const PRICE_CLASS: &str = "price-current";
const SHIPPING_CLASS: &str = "price-ship";
const IMAGE_SELECTOR: &str = "a.item-img img";
const LAZY_IMAGE_ATTR: &str = "data-src";

/// Maps every card on the rendered page to a record or a skip. A failing
/// card never aborts the rest of the page.
pub async fn collect_cards(driver: &WebDriver, capture_images: bool) -> (Vec<GpuRecord>, u32) {
    let cards = match driver.find_all(By::ClassName(CARD_CLASS)).await {
        Ok(cards) => cards,
        Err(e) => {
            log::error!("Could not enumerate product cards: {:?}", e);
            return (vec![], 0);
        }
    };

    let mut records: Vec<GpuRecord> = vec![];
    let mut skipped = 0;

    for (idx, card) in cards.iter().enumerate() {
        match read_card(card, capture_images).await {
            Ok(Some(record)) => records.push(record),
            Ok(None) => {
                skipped += 1;
                log::error!("Skipped card {}: missing title or link", idx + 1);
            }
            Err(e) => {
                skipped += 1;
                log::error!("Skipped card {}: {:?}", idx + 1, e);
            }
        }
    }

    (records, skipped)
}

/// `Ok(None)` means the card lacks its required title/link element. Price,
/// shipping and image lookups degrade on their own without failing the card.
async fn read_card(card: &WebElement, capture_images: bool) -> WebDriverResult<Option<GpuRecord>> {
    let title_element = match card.find(By::ClassName(TITLE_CLASS)).await {
        Ok(element) => element,
        Err(_) => return Ok(None),
    };

    let title = title_element.text().await?;
    let link = title_element.attr("href").await?;

    let price = optional_text(card, PRICE_CLASS).await;
    let shipping = optional_text(card, SHIPPING_CLASS).await;
    let image_url = match capture_images {
        true => image_source(card).await,
        false => None,
    };

    Ok(assemble_record(&title, link, price, shipping, image_url))
}

async fn optional_text(card: &WebElement, class_name: &str) -> Option<String> {
    match card.find(By::ClassName(class_name)).await {
        Ok(element) => element
            .text()
            .await
            .ok()
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty()),
        Err(_) => None,
    }
}

async fn image_source(card: &WebElement) -> Option<String> {
    let image = card.find(By::Css(IMAGE_SELECTOR)).await.ok()?;

    let direct = image.attr("src").await.ok().flatten();
    let lazy = image.attr(LAZY_IMAGE_ATTR).await.ok().flatten();

    pick_image_source(direct, lazy)
}

/// Prefers the direct source attribute over the lazy-load one.
fn pick_image_source(direct: Option<String>, lazy: Option<String>) -> Option<String> {
    direct
        .filter(|src| !src.is_empty())
        .or_else(|| lazy.filter(|src| !src.is_empty()))
}

/// Placeholder for a legitimately absent optional field. Distinct from a
/// skipped card, which yields no record at all.
pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, PartialEq)]
pub struct GpuRecord {
    pub title: String,
    pub price: String,
    pub shipping: String,
    pub link: String,
    /// Empty when the card exposed no usable image source.
    pub image_url: String,
}

/// Builds a record from the raw pieces read off one card. Title and link are
/// required non-empty; price, shipping and image degrade independently.
pub fn assemble_record(
    title: &str,
    link: Option<String>,
    price: Option<String>,
    shipping: Option<String>,
    image_url: Option<String>,
) -> Option<GpuRecord> {
    let title = title.trim();
    if title.is_empty() {
        return None;
    }
    let link = link.filter(|l| !l.is_empty())?;

    Some(GpuRecord {
        title: title.to_string(),
        price: price.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        shipping: shipping.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        link,
        image_url: image_url.unwrap_or_default(),
    })
}

#[derive(Debug, Default)]
pub struct RunResult {
    /// Insertion order is page order, then card order within the page.
    pub records: Vec<GpuRecord>,
    pub skipped_cards: u32,
    pub skipped_pages: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_fields_degrade_to_sentinels() {
        let record = assemble_record("RTX 4080", Some("https://x/y".to_string()), None, None, None)
            .expect("title and link are present");

        assert_eq!(record.title, "RTX 4080");
        assert_eq!(record.price, NOT_AVAILABLE);
        assert_eq!(record.shipping, NOT_AVAILABLE);
        assert_eq!(record.link, "https://x/y");
        assert_eq!(record.image_url, "");
    }

    #[test]
    fn title_is_trimmed() {
        let record = assemble_record(
            "  GeForce RTX 4090  ",
            Some("https://x/z".to_string()),
            Some("$1,599.99".to_string()),
            Some("Free Shipping".to_string()),
            None,
        )
        .unwrap();

        assert_eq!(record.title, "GeForce RTX 4090");
        assert_eq!(record.price, "$1,599.99");
        assert_eq!(record.shipping, "Free Shipping");
    }

    #[test]
    fn blank_title_yields_no_record() {
        assert!(assemble_record("   ", Some("https://x/y".to_string()), None, None, None).is_none());
    }

    #[test]
    fn missing_link_yields_no_record() {
        assert!(assemble_record("RTX 4080", None, None, None, None).is_none());
        assert!(assemble_record("RTX 4080", Some(String::new()), None, None, None).is_none());
    }
}

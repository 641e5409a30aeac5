use std::time::Duration;

use reqwest::Client;
use rust_xlsxwriter::{Format, Image, ObjectMovement, Url, Workbook, Worksheet};

use crate::configuration::ExportSettings;
use crate::domain::{GpuRecord, NOT_AVAILABLE};
use crate::error::Result;

const LINK_COLUMNS: [&str; 4] = ["Title", "Price", "Shipping", "Link"];
const IMAGE_COLUMN: &str = "Image";

/// Serializes the aggregated records to a one-sheet spreadsheet. Per-image
/// failures fall back to writing the raw URL; only a destination write
/// failure is surfaced.
pub async fn export(records: &[GpuRecord], settings: &ExportSettings) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    write_header(worksheet, settings.embed_images)?;

    match settings.embed_images {
        false => write_link_rows(worksheet, records)?,
        true => {
            let client = Client::builder()
                .timeout(Duration::from_secs(settings.image_fetch_timeout_secs))
                .build()?;
            write_embedding_rows(worksheet, records, &client, settings.thumbnail_scale).await?;
        }
    }

    workbook.save(&settings.output_file)?;
    Ok(())
}

fn write_header(worksheet: &mut Worksheet, embed_images: bool) -> Result<()> {
    let bold = Format::new().set_bold();

    for (col, name) in LINK_COLUMNS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *name, &bold)?;
    }
    if embed_images {
        worksheet.write_string_with_format(0, LINK_COLUMNS.len() as u16, IMAGE_COLUMN, &bold)?;
    }

    worksheet.set_column_width(0, 60.0)?;
    worksheet.set_column_width(3, 45.0)?;
    Ok(())
}

fn write_link_rows(worksheet: &mut Worksheet, records: &[GpuRecord]) -> Result<()> {
    for (idx, record) in records.iter().enumerate() {
        let row = idx as u32 + 1;
        worksheet.write_string(row, 0, record.title.as_str())?;
        worksheet.write_string(row, 1, record.price.as_str())?;
        worksheet.write_string(row, 2, record.shipping.as_str())?;
        worksheet.write_string(row, 3, record.link.as_str())?;
    }
    Ok(())
}

async fn write_embedding_rows(
    worksheet: &mut Worksheet,
    records: &[GpuRecord],
    client: &Client,
    thumbnail_scale: f64,
) -> Result<()> {
    for (idx, record) in records.iter().enumerate() {
        let row = idx as u32 + 1;
        worksheet.write_string(row, 0, record.title.as_str())?;
        worksheet.write_string(row, 1, record.price.as_str())?;
        worksheet.write_string(row, 2, record.shipping.as_str())?;
        worksheet.write_url(row, 3, Url::new(record.link.as_str()))?;
        write_thumbnail(worksheet, row, 4, record, client, thumbnail_scale).await?;
    }
    Ok(())
}

async fn write_thumbnail(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    record: &GpuRecord,
    client: &Client,
    thumbnail_scale: f64,
) -> Result<()> {
    if record.image_url.is_empty() {
        worksheet.write_string(row, col, NOT_AVAILABLE)?;
        return Ok(());
    }

    let bytes = match fetch_image_bytes(client, &record.image_url).await {
        Some(bytes) => bytes,
        None => {
            worksheet.write_string(row, col, record.image_url.as_str())?;
            return Ok(());
        }
    };

    match Image::new_from_buffer(&bytes) {
        Ok(image) => {
            let image = image
                .set_scale_width(thumbnail_scale)
                .set_scale_height(thumbnail_scale)
                .set_object_movement(ObjectMovement::MoveAndSizeWithCells);
            worksheet.insert_image(row, col, &image)?;
        }
        Err(e) => {
            log::error!("Could not decode thumbnail for {}: {:?}", record.title, e);
            worksheet.write_string(row, col, record.image_url.as_str())?;
        }
    }

    Ok(())
}

async fn fetch_image_bytes(client: &Client, image_url: &str) -> Option<Vec<u8>> {
    let fetchable = url::Url::parse(image_url)
        .map(|parsed| matches!(parsed.scheme(), "http" | "https"))
        .unwrap_or(false);
    if !fetchable {
        log::error!("Unfetchable image url: {}", image_url);
        return None;
    }

    let response = match client.get(image_url).send().await {
        Ok(response) => response,
        Err(e) => {
            log::error!("Image fetch failed for {}: {:?}", image_url, e);
            return None;
        }
    };

    if !response.status().is_success() {
        log::error!(
            "Image fetch returned {} for {}",
            response.status(),
            image_url
        );
        return None;
    }

    match response.bytes().await {
        Ok(bytes) => Some(bytes.to_vec()),
        Err(e) => {
            log::error!("Image body read failed for {}: {:?}", image_url, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::assemble_record;

    fn sample_records() -> Vec<GpuRecord> {
        vec![
            assemble_record(
                "RTX 4080",
                Some("https://x/y".to_string()),
                Some("$999.99".to_string()),
                Some("Free Shipping".to_string()),
                None,
            )
            .unwrap(),
            assemble_record("RTX 4060", Some("https://x/z".to_string()), None, None, None).unwrap(),
        ]
    }

    #[tokio::test]
    async fn link_only_export_writes_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("gpus.xlsx");
        let settings = ExportSettings {
            output_file: output.to_string_lossy().into_owned(),
            embed_images: false,
            ..ExportSettings::default()
        };

        export(&sample_records(), &settings).await.unwrap();

        let written = std::fs::metadata(&output).unwrap();
        assert!(written.len() > 0);
    }

    #[tokio::test]
    async fn embedding_mode_survives_degraded_images() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("gpus.xlsx");
        let settings = ExportSettings {
            output_file: output.to_string_lossy().into_owned(),
            embed_images: true,
            ..ExportSettings::default()
        };

        // One record with no image at all, one whose source is not fetchable.
        let mut records = sample_records();
        records[1].image_url = "data:image/png;base64,AAAA".to_string();

        export(&records, &settings).await.unwrap();

        assert!(output.exists());
    }

    #[tokio::test]
    async fn unwritable_destination_is_fatal() {
        let settings = ExportSettings {
            output_file: "/no/such/dir/gpus.xlsx".to_string(),
            embed_images: false,
            ..ExportSettings::default()
        };

        assert!(export(&sample_records(), &settings).await.is_err());
    }

    #[tokio::test]
    async fn non_http_image_source_yields_no_bytes() {
        let client = Client::new();

        let bytes = fetch_image_bytes(&client, "data:image/png;base64,AAAA").await;

        assert!(bytes.is_none());
    }

    #[tokio::test]
    async fn unreachable_image_source_yields_no_bytes() {
        let client = Client::builder()
            .timeout(Duration::from_secs(2))
            .build()
            .unwrap();

        let bytes = fetch_image_bytes(&client, "http://127.0.0.1:1/thumb.png").await;

        assert!(bytes.is_none());
    }
}

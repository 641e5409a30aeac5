use anyhow::Context;
use env_logger::Env;
use quarry::configuration::get_configuration;
use quarry::services::{export, Harvester};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let configuration = get_configuration().expect("Failed to read configuration.");
    let export_settings = configuration.export.clone();

    let mut harvester = Harvester::new(configuration);
    let result = harvester.run().await;

    match result.records.is_empty() {
        true => log::info!("No GPUs found."),
        false => {
            export(&result.records, &export_settings)
                .await
                .with_context(|| format!("Failed to write {}", export_settings.output_file))?;
            log::info!(
                "Saved {} items to {}",
                result.records.len(),
                export_settings.output_file
            );
        }
    }

    log::info!(
        "Skipped {} cards and {} pages due to missing or malformed data",
        result.skipped_cards,
        result.skipped_pages
    );

    Ok(())
}

use std::time::Duration;

use rand::Rng;

use crate::configuration::Settings;
use crate::domain::RunResult;
use crate::services::{collect_cards, Droid, IdentityRotator, PageOutcome, CARD_CLASS};

/// Drives the page loop: draw identity, fetch, extract, pace, repeat. A
/// single page failing never aborts the run.
pub struct Harvester {
    settings: Settings,
    rotator: IdentityRotator,
    droid: Droid,
}

impl Harvester {
    pub fn new(settings: Settings) -> Self {
        let rotator =
            IdentityRotator::from_source(settings.harvest.identity_pool_source.as_deref());
        let droid = Droid::new(settings.webdriver.clone());

        Harvester {
            settings,
            rotator,
            droid,
        }
    }

    pub async fn run(&mut self) -> RunResult {
        let mut result = RunResult::default();
        let max_pages = self.settings.harvest.max_pages;

        for page in 1..=max_pages {
            let url = page_url(&self.settings.harvest.base_url, page);
            log::info!("Scraping page {}: {}", page, url);

            let identity = self.rotator.next();
            let capture_images = self.settings.export.embed_images;

            let outcome = self
                .droid
                .with_session(&identity, &url, CARD_CLASS, |driver| async move {
                    collect_cards(&driver, capture_images).await
                })
                .await;

            match outcome {
                Ok(PageOutcome::Rendered((records, skipped))) => {
                    log::info!(
                        "Found {} item blocks on page {}",
                        records.len() as u32 + skipped,
                        page
                    );
                    result.skipped_cards += skipped;
                    result.records.extend(records);
                }
                Ok(PageOutcome::TimedOut) => {
                    log::error!("Timeout loading page {}", page);
                    result.skipped_pages += 1;
                }
                Err(e) => {
                    log::error!("Skipped page {}: {:?}", page, e);
                    result.skipped_pages += 1;
                }
            }

            if page < max_pages {
                self.pace().await;
            }
        }

        result
    }

    async fn pace(&self) {
        let delay = pace_secs(
            self.settings.harvest.min_delay_secs,
            self.settings.harvest.max_delay_secs,
        );
        log::info!("Pacing {:.1}s before the next page", delay);
        tokio::time::sleep(Duration::from_secs_f64(delay)).await;
    }
}

fn page_url(template: &str, page: u32) -> String {
    template.replace("{page}", &page.to_string())
}

fn pace_secs(min_delay: f64, max_delay: f64) -> f64 {
    let delay = match max_delay > min_delay {
        true => rand::thread_rng().gen_range(min_delay..=max_delay),
        false => min_delay,
    };
    delay.max(0.0)
}

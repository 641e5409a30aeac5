use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub harvest: HarvestSettings,
    pub webdriver: WebdriverSettings,
    pub export: ExportSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HarvestSettings {
    /// Page URL template, `{page}` is replaced with the 1-based page index.
    pub base_url: String,
    pub max_pages: u32,
    pub min_delay_secs: f64,
    pub max_delay_secs: f64,
    /// Newline-delimited list of proxy addresses. Absent means direct connection.
    pub identity_pool_source: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WebdriverSettings {
    pub server_url: String,
    pub headless: bool,
    pub page_timeout_secs: u64,
    pub poll_interval_millis: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    pub output_file: String,
    pub embed_images: bool,
    pub image_fetch_timeout_secs: u64,
    pub thumbnail_scale: f64,
}

impl Default for HarvestSettings {
    fn default() -> Self {
        HarvestSettings {
            base_url: "https://www.newegg.com/p/pl?d=graphics+card&page={page}".to_string(),
            max_pages: 3,
            min_delay_secs: 2.0,
            max_delay_secs: 6.0,
            identity_pool_source: None,
        }
    }
}

impl Default for WebdriverSettings {
    fn default() -> Self {
        WebdriverSettings {
            server_url: "http://localhost:9515".to_string(),
            headless: false,
            page_timeout_secs: 15,
            poll_interval_millis: 500,
        }
    }
}

impl Default for ExportSettings {
    fn default() -> Self {
        ExportSettings {
            output_file: "newegg_gpus.xlsx".to_string(),
            embed_images: false,
            image_fetch_timeout_secs: 10,
            thumbnail_scale: 0.5,
        }
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    config::Config::builder()
        .add_source(config::File::with_name("harvest").required(false))
        .add_source(
            config::Environment::with_prefix("HARVEST")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()
}

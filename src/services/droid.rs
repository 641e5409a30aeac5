use std::future::Future;
use std::time::Duration;

use fake_user_agent::get_chrome_rua;
use thirtyfour::extensions::query::ElementQueryable;
use thirtyfour::{
    By, CapabilitiesHelper, ChromeCapabilities, ChromiumLikeCapabilities, DesiredCapabilities,
    Proxy, WebDriver,
};

use crate::configuration::WebdriverSettings;
use crate::error::Result;
use crate::services::Identity;

pub enum PageOutcome<T> {
    Rendered(T),
    TimedOut,
}

/// Spins up one masked browser session per page fetch and guarantees the
/// session is gone before the next page starts.
pub struct Droid {
    settings: WebdriverSettings,
}

impl Droid {
    pub fn new(settings: WebdriverSettings) -> Self {
        Droid { settings }
    }

    /// Navigates to `url`, waits until `ready_selector` matches at least one
    /// element, then hands the rendered page to `f`. The session is torn down
    /// on every exit path after creation: timeout, navigation failure, or a
    /// normal return from `f`.
    pub async fn with_session<F, Fut, T>(
        &self,
        identity: &Identity,
        url: &str,
        ready_selector: &str,
        f: F,
    ) -> Result<PageOutcome<T>>
    where
        F: FnOnce(WebDriver) -> Fut,
        Fut: Future<Output = T>,
    {
        let caps = self.masked_capabilities(identity)?;
        let driver = WebDriver::new(self.settings.server_url.as_str(), caps).await?;

        let outcome = match self.await_ready(&driver, url, ready_selector).await {
            Ok(true) => Ok(PageOutcome::Rendered(f(driver.clone()).await)),
            Ok(false) => Ok(PageOutcome::TimedOut),
            Err(e) => Err(e.into()),
        };

        if let Err(e) = driver.quit().await {
            log::error!("Failed to quit webdriver session: {:?}", e);
        }

        outcome
    }

    async fn await_ready(
        &self,
        driver: &WebDriver,
        url: &str,
        ready_selector: &str,
    ) -> thirtyfour::error::WebDriverResult<bool> {
        driver.goto(url).await?;

        driver
            .query(By::ClassName(ready_selector))
            .wait(
                Duration::from_secs(self.settings.page_timeout_secs),
                Duration::from_millis(self.settings.poll_interval_millis),
            )
            .exists()
            .await
    }

    fn masked_capabilities(
        &self,
        identity: &Identity,
    ) -> thirtyfour::error::WebDriverResult<ChromeCapabilities> {
        let mut caps = DesiredCapabilities::chrome();

        caps.add_arg("--start-maximized")?;
        caps.add_arg("--disable-blink-features=AutomationControlled")?;
        caps.add_experimental_option("excludeSwitches", ["enable-automation"])?;
        caps.add_arg(&format!("--user-agent={}", get_chrome_rua()))?;

        if self.settings.headless {
            caps.set_headless()?;
        }

        if let Identity::Proxy(address) = identity {
            let proxy = Proxy::Manual {
                ftp_proxy: None,
                http_proxy: Some(address.clone()),
                ssl_proxy: Some(address.clone()),
                socks_proxy: None,
                socks_version: None,
                socks_username: None,
                socks_password: None,
                no_proxy: None,
            };
            caps.set_proxy(proxy)?;
        }

        Ok(caps)
    }
}

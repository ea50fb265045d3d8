use std::time::Duration;

use thirtyfour::prelude::*;

/// Pool of WebDriver sessions sharing one automation server. One session per
/// concurrency slot; hits are assigned by index so concurrent hits never
/// share a session.
pub struct Droid {
    drivers: Vec<WebDriver>,
}

impl Droid {
    pub async fn launch(
        webdriver_url: &str,
        pool_size: usize,
        page_load_timeout: Duration,
    ) -> WebDriverResult<Self> {
        let pool_size = pool_size.max(1);
        let mut drivers = Vec::with_capacity(pool_size);

        for _ in 0..pool_size {
            let mut caps = DesiredCapabilities::chrome();
            caps.add_arg("--headless=new")?;
            // Subresources we never extract from; skipping them cuts page
            // load time and one whole class of navigation failures.
            caps.add_arg("--blink-settings=imagesEnabled=false")?;
            caps.add_arg("--disable-remote-fonts")?;
            caps.add_arg("--disable-gpu")?;

            let driver = WebDriver::new(webdriver_url, caps).await?;
            driver.set_page_load_timeout(page_load_timeout).await?;
            drivers.push(driver);
        }

        Ok(Droid { drivers })
    }

    /// Stable slot assignment: with `buffered(pool_size)` scheduling, any
    /// window of in-flight hits maps to distinct sessions.
    pub fn driver(&self, hit_index: usize) -> &WebDriver {
        &self.drivers[hit_index % self.drivers.len()]
    }

    pub fn pool_size(&self) -> usize {
        self.drivers.len()
    }

    /// Release every session. Called once after the whole batch, on success
    /// and failure paths alike.
    pub async fn quit(self) {
        for driver in self.drivers {
            if let Err(e) = driver.quit().await {
                log::error!("Failed to quit webdriver session: {}", e);
            }
        }
    }
}

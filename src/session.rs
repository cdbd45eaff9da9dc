use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use headless_chrome::{Browser, LaunchOptionsBuilder, Tab};
use log::{info, warn};

use crate::delay_manager;
use crate::site::{DetailStrategy, SiteConfig};

const LOAD_MORE_TIMEOUT: Duration = Duration::from_secs(5);

// The browser session is the one shared mutable resource of a run. The
// trait is the seam between the pipeline and the automation backend.
pub trait Session {
    fn scroll_to_bottom(&mut self) -> Result<()>;

    // Best effort: the control is optional and its absence is not an error.
    fn click_load_more(&mut self, selector: &str);

    // Content lazy-loads after a scroll with no completion signal, so the
    // pipeline settles before reading the page.
    fn settle_after_scroll(&mut self);

    fn page_source(&mut self) -> Result<String>;

    // Returns the detail page markup for one listing. Implementations must
    // leave the session back on the search results context on both success
    // and failure paths.
    fn fetch_detail(&mut self, url: &str) -> Result<String>;

    fn stop(self) -> Result<()>
    where
        Self: Sized;
}

pub struct ChromeSession {
    browser: Browser,
    tab: Arc<Tab>,
    results_url: String,
    detail_strategy: DetailStrategy,
}

impl ChromeSession {
    pub fn start(site: &SiteConfig, query: &str, location: &str, headless: bool) -> Result<Self> {
        let options = LaunchOptionsBuilder::default()
            .headless(headless)
            .window_size(Some((1920, 1080)))
            .ignore_certificate_errors(true)
            .build()
            .map_err(|err| anyhow!("failed to build browser launch options: {}", err))?;

        let browser = Browser::new(options).context("failed to launch browser")?;
        let tab = browser.new_tab().context("failed to open browser tab")?;

        let results_url = site.search_url(query, location);
        info!("Opening search results: {}", results_url);
        tab.navigate_to(&results_url)
            .and_then(|tab| tab.wait_until_navigated())
            .with_context(|| format!("failed to navigate to {}", results_url))?;

        Ok(ChromeSession {
            browser,
            tab,
            results_url,
            detail_strategy: site.detail_strategy,
        })
    }

    fn read_page(tab: &Tab, url: &str) -> Result<String> {
        tab.navigate_to(url)
            .and_then(|tab| tab.wait_until_navigated())
            .with_context(|| format!("failed to navigate to {}", url))?;
        delay_manager::random_detail_delay();
        tab.get_content().context("failed to read detail page content")
    }

    fn fetch_in_new_tab(&self, url: &str) -> Result<String> {
        let tab = self.browser.new_tab().context("failed to open detail tab")?;
        let content = Self::read_page(&tab, url);
        // The ephemeral tab must go away whether or not the read worked.
        if let Err(err) = tab.close_target() {
            warn!("Failed to close detail tab: {}", err);
        }
        content
    }

    fn fetch_in_place(&self, url: &str) -> Result<String> {
        let content = Self::read_page(&self.tab, url);
        self.tab
            .navigate_to(&self.results_url)
            .and_then(|tab| tab.wait_until_navigated())
            .context("failed to return to search results")?;
        content
    }
}

impl Session for ChromeSession {
    fn scroll_to_bottom(&mut self) -> Result<()> {
        self.tab
            .evaluate("window.scrollTo(0, document.body.scrollHeight);", false)
            .context("scroll script failed")?;
        Ok(())
    }

    fn click_load_more(&mut self, selector: &str) {
        match self
            .tab
            .wait_for_element_with_custom_timeout(selector, LOAD_MORE_TIMEOUT)
        {
            Ok(element) => {
                if let Err(err) = element.click() {
                    info!("Load-more control did not accept the click: {}", err);
                }
            }
            Err(err) => info!("No load-more control within {:?}: {}", LOAD_MORE_TIMEOUT, err),
        }
    }

    fn settle_after_scroll(&mut self) {
        delay_manager::random_page_delay();
    }

    fn page_source(&mut self) -> Result<String> {
        self.tab
            .get_content()
            .context("failed to read search results content")
    }

    fn fetch_detail(&mut self, url: &str) -> Result<String> {
        match self.detail_strategy {
            DetailStrategy::NewTab => self.fetch_in_new_tab(url),
            DetailStrategy::SameTab => self.fetch_in_place(url),
        }
    }

    fn stop(self) -> Result<()> {
        info!("Closing browser session.");
        drop(self.tab);
        drop(self.browser);
        Ok(())
    }
}

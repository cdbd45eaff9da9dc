use std::collections::HashSet;

use anyhow::Result;
use log::{info, warn};
use serde::Serialize;

use crate::extractor;
use crate::session::Session;
use crate::site::{MissingFieldPolicy, SiteConfig};

// The complete record handed to the report writer. A record only exists
// once all four required fields were extracted; the description may be
// absent when the detail page had no usable container.
#[derive(Debug, Clone, Serialize)]
pub struct JobRecord {
    pub title: String,
    pub company: String,
    pub location: String,
    pub link: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub pages: usize,
    pub max_jobs: Option<usize>,
    pub missing_field: MissingFieldPolicy,
}

impl Default for RunOptions {
    fn default() -> Self {
        RunOptions {
            pages: 1,
            max_jobs: None,
            missing_field: MissingFieldPolicy::default(),
        }
    }
}

// Strictly sequential: one scroll round per page, one detail fetch per new
// listing, no retries. Lazy loading re-presents earlier listings in the
// cumulative page source, so listings are deduplicated by apply link.
pub fn scrape_jobs<S: Session>(
    session: &mut S,
    site: &SiteConfig,
    opts: &RunOptions,
) -> Result<Vec<JobRecord>> {
    let mut jobs = Vec::new();
    let mut seen_links: HashSet<String> = HashSet::new();

    'pages: for page in 0..opts.pages {
        if at_cap(jobs.len(), opts.max_jobs) {
            break;
        }

        info!("Scrolling to bottom of page {}...", page + 1);
        session.scroll_to_bottom()?;
        if let Some(selector) = site.load_more_selector {
            session.click_load_more(selector);
        }
        session.settle_after_scroll();

        let html = session.page_source()?;
        let listings = extractor::extract_listings(&html, site, opts.missing_field)?;

        for listing in listings {
            if at_cap(jobs.len(), opts.max_jobs) {
                break 'pages;
            }
            if !seen_links.insert(listing.apply_link.clone()) {
                continue;
            }

            let description = match session.fetch_detail(&listing.apply_link) {
                Ok(detail_html) => extractor::extract_description(&detail_html, site),
                Err(err) => {
                    warn!("Failed to load detail view for \"{}\": {}", listing.title, err);
                    None
                }
            };
            if description.is_none() {
                warn!(
                    "No description found for \"{}\" at {}.",
                    listing.title, listing.company
                );
            }

            info!(
                "Scraped \"{}\" at {} in {}...",
                listing.title, listing.company, listing.location
            );
            jobs.push(JobRecord {
                title: listing.title,
                company: listing.company,
                location: listing.location,
                link: listing.apply_link,
                description,
            });
        }
    }

    info!("Collected {} job records.", jobs.len());
    Ok(jobs)
}

fn at_cap(count: usize, max_jobs: Option<usize>) -> bool {
    max_jobs.map_or(false, |cap| count >= cap)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DETAIL_WITH_DESC: &str = "<html><body>\
        <div class=\"job-desc\"><b>Remote</b><br/><ul><li>Python</li><li>SQL</li></ul></div>\
        </body></html>";
    const DETAIL_WITHOUT_DESC: &str = "<html><body><p>page moved</p></body></html>";

    struct FakeSession {
        sources: Vec<String>,
        detail_html: &'static str,
        cursor: usize,
        scrolls: usize,
        detail_fetches: usize,
    }

    impl FakeSession {
        fn new(sources: Vec<String>, detail_html: &'static str) -> Self {
            FakeSession {
                sources,
                detail_html,
                cursor: 0,
                scrolls: 0,
                detail_fetches: 0,
            }
        }
    }

    impl Session for FakeSession {
        fn scroll_to_bottom(&mut self) -> Result<()> {
            self.scrolls += 1;
            self.cursor += 1;
            Ok(())
        }

        fn click_load_more(&mut self, _selector: &str) {}

        fn settle_after_scroll(&mut self) {}

        fn page_source(&mut self) -> Result<String> {
            Ok(self.sources[self.cursor - 1].clone())
        }

        fn fetch_detail(&mut self, _url: &str) -> Result<String> {
            self.detail_fetches += 1;
            Ok(self.detail_html.to_string())
        }

        fn stop(self) -> Result<()> {
            Ok(())
        }
    }

    fn results_page(count: usize) -> String {
        let mut html = String::from("<html><body>");
        for i in 0..count {
            html.push_str(&format!(
                "<div class=\"cust-job-tuple\">\
                   <a class=\"title\" href=\"https://example.com/job/{i}\">Job {i}</a>\
                   <a class=\"comp-name\">Acme {i}</a>\
                   <span class=\"loc\">Pune</span>\
                 </div>"
            ));
        }
        html.push_str("</body></html>");
        html
    }

    fn opts(pages: usize, max_jobs: Option<usize>) -> RunOptions {
        RunOptions {
            pages,
            max_jobs,
            missing_field: MissingFieldPolicy::Skip,
        }
    }

    #[test]
    fn cap_limits_records_and_detail_fetches() {
        // Two scroll rounds of five listings each, capped at seven.
        let mut session = FakeSession::new(
            vec![results_page(5), results_page(10)],
            DETAIL_WITH_DESC,
        );
        let jobs =
            scrape_jobs(&mut session, &SiteConfig::naukri(), &opts(2, Some(7))).unwrap();

        assert_eq!(jobs.len(), 7);
        assert_eq!(session.scrolls, 2);
        assert_eq!(session.detail_fetches, 7);
    }

    #[test]
    fn cap_reached_at_page_boundary_suppresses_next_scroll() {
        let mut session = FakeSession::new(
            vec![results_page(5), results_page(10)],
            DETAIL_WITH_DESC,
        );
        let jobs =
            scrape_jobs(&mut session, &SiteConfig::naukri(), &opts(2, Some(5))).unwrap();

        assert_eq!(jobs.len(), 5);
        assert_eq!(session.scrolls, 1);
        assert_eq!(session.detail_fetches, 5);
    }

    #[test]
    fn without_cap_all_available_records_are_collected() {
        let mut session = FakeSession::new(
            vec![results_page(5), results_page(10)],
            DETAIL_WITH_DESC,
        );
        let jobs = scrape_jobs(&mut session, &SiteConfig::naukri(), &opts(2, None)).unwrap();

        assert_eq!(jobs.len(), 10);
        assert_eq!(session.detail_fetches, 10);
    }

    #[test]
    fn listings_already_seen_are_not_fetched_again() {
        let mut session = FakeSession::new(
            vec![results_page(5), results_page(5)],
            DETAIL_WITH_DESC,
        );
        let jobs = scrape_jobs(&mut session, &SiteConfig::naukri(), &opts(2, None)).unwrap();

        assert_eq!(jobs.len(), 5);
        assert_eq!(session.detail_fetches, 5);
    }

    #[test]
    fn missing_description_keeps_the_record_and_run_alive() {
        let mut session = FakeSession::new(vec![results_page(3)], DETAIL_WITHOUT_DESC);
        let jobs = scrape_jobs(&mut session, &SiteConfig::naukri(), &opts(1, None)).unwrap();

        assert_eq!(jobs.len(), 3);
        for job in &jobs {
            assert!(!job.title.is_empty());
            assert!(!job.company.is_empty());
            assert!(!job.location.is_empty());
            assert!(job.link.starts_with("https://example.com/job/"));
            assert_eq!(job.description, None);
        }
    }

    #[test]
    fn descriptions_carry_the_raw_fragment() {
        let mut session = FakeSession::new(vec![results_page(1)], DETAIL_WITH_DESC);
        let jobs = scrape_jobs(&mut session, &SiteConfig::naukri(), &opts(1, None)).unwrap();

        let description = jobs[0].description.as_deref().unwrap();
        assert!(description.contains("<b>Remote</b>"));
        assert!(description.contains("<li>Python</li>"));
    }
}

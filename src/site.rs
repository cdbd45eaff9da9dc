use crate::report::OutputMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailStrategy {
    /// Open the detail view in a fresh tab and close it afterwards.
    NewTab,
    /// Navigate the results tab itself, then navigate back.
    SameTab,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingFieldPolicy {
    /// Drop the defective listing with a warning and keep going.
    #[default]
    Skip,
    /// Propagate the extraction error and end the run.
    Abort,
}

// Everything site-specific lives here: selectors, the search URL template
// and the navigation/output conventions the site calls for. The scraping
// pipeline itself is generic over this record.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub key: &'static str,
    pub base_url: &'static str,
    pub search_template: &'static str,
    pub listing_selector: &'static str,
    pub title_selector: &'static str,
    pub company_selector: &'static str,
    pub location_selector: &'static str,
    pub link_selector: &'static str,
    pub description_selector: &'static str,
    pub load_more_selector: Option<&'static str>,
    pub detail_strategy: DetailStrategy,
    pub default_output: OutputMode,
}

impl SiteConfig {
    pub fn naukri() -> Self {
        SiteConfig {
            key: "naukri",
            base_url: "https://www.naukri.com",
            search_template: "https://www.naukri.com/hr-jobs-in-india?k={query}&l={location}",
            listing_selector: "div.cust-job-tuple",
            title_selector: "a.title",
            company_selector: "a.comp-name",
            location_selector: "span.loc",
            link_selector: "a.title",
            description_selector: "div.job-desc",
            load_more_selector: None,
            detail_strategy: DetailStrategy::NewTab,
            default_output: OutputMode::PerJob,
        }
    }

    pub fn linkedin() -> Self {
        SiteConfig {
            key: "linkedin",
            base_url: "https://www.linkedin.com",
            search_template: "https://www.linkedin.com/jobs/search/?keywords={query}&location={location}",
            listing_selector: "div.base-search-card",
            title_selector: "h3.base-search-card__title",
            company_selector: "h4.base-search-card__subtitle",
            location_selector: "span.job-search-card__location",
            link_selector: "a.base-card__full-link",
            description_selector: "div.description__text--rich",
            load_more_selector: Some("button.infinite-scroller__show-more-button"),
            detail_strategy: DetailStrategy::SameTab,
            default_output: OutputMode::Combined,
        }
    }

    pub fn search_url(&self, query: &str, location: &str) -> String {
        self.search_template
            .replace("{query}", &urlencoding::encode(query))
            .replace("{location}", &urlencoding::encode(location))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_url_interpolates_and_encodes() {
        let site = SiteConfig::linkedin();
        let url = site.search_url("HR Manager", "Pune, India");
        assert_eq!(
            url,
            "https://www.linkedin.com/jobs/search/?keywords=HR%20Manager&location=Pune%2C%20India"
        );
    }

    #[test]
    fn naukri_search_url_uses_query_params() {
        let site = SiteConfig::naukri();
        let url = site.search_url("HR", "IND");
        assert_eq!(url, "https://www.naukri.com/hr-jobs-in-india?k=HR&l=IND");
    }
}

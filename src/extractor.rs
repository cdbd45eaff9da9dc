use log::warn;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use url::Url;

use crate::site::{MissingFieldPolicy, SiteConfig};

// One job entry as it appears in the search results, before its detail
// page has been visited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawListing {
    pub title: String,
    pub company: String,
    pub location: String,
    pub apply_link: String,
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("listing {index} is missing required field `{field}`")]
    MissingField { index: usize, field: &'static str },
    #[error("invalid selector `{0}`")]
    BadSelector(String),
}

struct ListingSelectors {
    container: Selector,
    title: Selector,
    company: Selector,
    location: Selector,
    link: Selector,
}

impl ListingSelectors {
    fn compile(site: &SiteConfig) -> Result<Self, ExtractError> {
        Ok(ListingSelectors {
            container: parse_selector(site.listing_selector)?,
            title: parse_selector(site.title_selector)?,
            company: parse_selector(site.company_selector)?,
            location: parse_selector(site.location_selector)?,
            link: parse_selector(site.link_selector)?,
        })
    }
}

pub fn extract_listings(
    html: &str,
    site: &SiteConfig,
    policy: MissingFieldPolicy,
) -> Result<Vec<RawListing>, ExtractError> {
    let selectors = ListingSelectors::compile(site)?;
    let document = Html::parse_document(html);
    let mut listings = Vec::new();

    for (index, container) in document.select(&selectors.container).enumerate() {
        match extract_one(container, index, site, &selectors) {
            Ok(listing) => listings.push(listing),
            Err(err) => match policy {
                MissingFieldPolicy::Skip => warn!("Skipping listing: {}", err),
                MissingFieldPolicy::Abort => return Err(err),
            },
        }
    }

    Ok(listings)
}

fn extract_one(
    container: ElementRef<'_>,
    index: usize,
    site: &SiteConfig,
    selectors: &ListingSelectors,
) -> Result<RawListing, ExtractError> {
    let title = field_text(container, &selectors.title)
        .ok_or(ExtractError::MissingField { index, field: "title" })?;
    let company = field_text(container, &selectors.company)
        .ok_or(ExtractError::MissingField { index, field: "company" })?;
    let location = field_text(container, &selectors.location)
        .ok_or(ExtractError::MissingField { index, field: "location" })?;
    let href = container
        .select(&selectors.link)
        .next()
        .and_then(|el| el.value().attr("href"))
        .ok_or(ExtractError::MissingField { index, field: "apply_link" })?;

    Ok(RawListing {
        title,
        company,
        location,
        apply_link: absolute_link(href, site),
    })
}

// Locates the single description container on a detail page. An absent
// container is a recoverable condition, not an error: the caller records
// the description as missing and continues.
pub fn extract_description(html: &str, site: &SiteConfig) -> Option<String> {
    let selector = match parse_selector(site.description_selector) {
        Ok(selector) => selector,
        Err(err) => {
            warn!("{}", err);
            return None;
        }
    };

    let document = Html::parse_document(html);
    let container = document.select(&selector).next()?;
    let cleaned = container
        .inner_html()
        .replace("Show more", "")
        .replace("Show less", "")
        .trim()
        .to_string();

    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

fn parse_selector(raw: &str) -> Result<Selector, ExtractError> {
    Selector::parse(raw).map_err(|_| ExtractError::BadSelector(raw.to_string()))
}

fn field_text(container: ElementRef<'_>, selector: &Selector) -> Option<String> {
    let text = container
        .select(selector)
        .next()?
        .text()
        .collect::<String>()
        .trim()
        .to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn absolute_link(href: &str, site: &SiteConfig) -> String {
    if href.starts_with("http") {
        return href.to_string();
    }
    Url::parse(site.base_url)
        .ok()
        .and_then(|base| base.join(href).ok())
        .map(|url| url.to_string())
        .unwrap_or_else(|| href.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(title: &str, company: &str, location: &str, href: &str) -> String {
        format!(
            "<div class=\"cust-job-tuple\">\
               <a class=\"title\" href=\"{href}\">{title}</a>\
               <a class=\"comp-name\">{company}</a>\
               <span class=\"loc\">{location}</span>\
             </div>"
        )
    }

    fn page(listings: &[String]) -> String {
        format!("<html><body>{}</body></html>", listings.join(""))
    }

    #[test]
    fn extracts_listings_in_document_order() {
        let html = page(&[
            listing("HR Manager", "Acme", "Pune", "https://example.com/a"),
            listing("HR Lead", "Globex", "Delhi", "https://example.com/b"),
        ]);
        let listings =
            extract_listings(&html, &SiteConfig::naukri(), MissingFieldPolicy::Abort).unwrap();

        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].title, "HR Manager");
        assert_eq!(listings[0].company, "Acme");
        assert_eq!(listings[0].location, "Pune");
        assert_eq!(listings[0].apply_link, "https://example.com/a");
        assert_eq!(listings[1].title, "HR Lead");
    }

    #[test]
    fn relative_apply_links_become_absolute() {
        let html = page(&[listing("HR Manager", "Acme", "Pune", "/job-listings/hr-1")]);
        let listings =
            extract_listings(&html, &SiteConfig::naukri(), MissingFieldPolicy::Abort).unwrap();
        assert_eq!(listings[0].apply_link, "https://www.naukri.com/job-listings/hr-1");
    }

    #[test]
    fn skip_policy_drops_only_the_defective_listing() {
        let broken = "<div class=\"cust-job-tuple\">\
                        <a class=\"title\" href=\"https://example.com/x\">No Company</a>\
                        <span class=\"loc\">Pune</span>\
                      </div>"
            .to_string();
        let html = page(&[
            listing("HR Manager", "Acme", "Pune", "https://example.com/a"),
            broken,
            listing("HR Lead", "Globex", "Delhi", "https://example.com/b"),
        ]);

        let listings =
            extract_listings(&html, &SiteConfig::naukri(), MissingFieldPolicy::Skip).unwrap();
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[1].title, "HR Lead");
    }

    #[test]
    fn abort_policy_propagates_the_typed_error() {
        let broken = "<div class=\"cust-job-tuple\">\
                        <a class=\"comp-name\">Acme</a>\
                        <span class=\"loc\">Pune</span>\
                      </div>"
            .to_string();
        let html = page(&[broken]);

        let err = extract_listings(&html, &SiteConfig::naukri(), MissingFieldPolicy::Abort)
            .unwrap_err();
        assert!(matches!(
            err,
            ExtractError::MissingField { index: 0, field: "title" }
        ));
    }

    #[test]
    fn description_inner_html_is_returned() {
        let html = "<html><body>\
                      <div class=\"job-desc\"><b>Remote</b> role with <br/>benefits</div>\
                    </body></html>";
        let description = extract_description(html, &SiteConfig::naukri()).unwrap();
        assert!(description.contains("<b>Remote</b>"));
        assert!(description.contains("benefits"));
    }

    #[test]
    fn show_more_affordance_text_is_stripped() {
        let html = "<html><body>\
                      <div class=\"job-desc\">Great job Show more Show less</div>\
                    </body></html>";
        let description = extract_description(html, &SiteConfig::naukri()).unwrap();
        assert_eq!(description, "Great job");
    }

    #[test]
    fn missing_description_container_yields_none() {
        let html = "<html><body><p>nothing here</p></body></html>";
        assert_eq!(extract_description(html, &SiteConfig::naukri()), None);
    }
}

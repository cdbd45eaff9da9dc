pub mod delay_manager;
pub mod extractor;
pub mod logger;
pub mod normalizer;
pub mod report;
pub mod scraper;
pub mod session;
pub mod site;

// Exporting types for convenience
pub use crate::extractor::{ExtractError, RawListing};
pub use crate::report::OutputMode;
pub use crate::scraper::{scrape_jobs, JobRecord, RunOptions};
pub use crate::session::{ChromeSession, Session};
pub use crate::site::{DetailStrategy, MissingFieldPolicy, SiteConfig};

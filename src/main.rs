use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, ValueEnum};
use log::info;

use job_scraper::{
    logger, report, scrape_jobs, ChromeSession, MissingFieldPolicy, OutputMode, RunOptions,
    Session, SiteConfig,
};

#[derive(Parser)]
#[command(name = "job-scraper")]
#[command(about = "Scrape job listings from a job site into PDF reports")]
#[command(version)]
struct Cli {
    /// Job title or keywords to search for
    #[arg(short, long)]
    query: String,

    /// Location filter for the search
    #[arg(short, long)]
    location: String,

    /// Job site to scrape
    #[arg(long, value_enum, default_value = "naukri")]
    site: SiteArg,

    /// Number of scroll pages to collect
    #[arg(short, long, default_value_t = 1)]
    pages: usize,

    /// Cap on the total number of records collected
    #[arg(long)]
    max_jobs: Option<usize>,

    /// What to do with a listing that is missing a required field
    #[arg(long, value_enum, default_value = "skip")]
    on_missing_field: MissingFieldArg,

    /// Report layout (defaults to the site's usual one)
    #[arg(long, value_enum)]
    output: Option<OutputArg>,

    /// Also dump the collected records to this JSON file
    #[arg(long)]
    json: Option<PathBuf>,

    /// Run the browser without a visible window
    #[arg(long)]
    headless: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum SiteArg {
    Naukri,
    Linkedin,
}

#[derive(Clone, Copy, ValueEnum)]
enum MissingFieldArg {
    Skip,
    Abort,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputArg {
    PerJob,
    Combined,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let site = match cli.site {
        SiteArg::Naukri => SiteConfig::naukri(),
        SiteArg::Linkedin => SiteConfig::linkedin(),
    };

    logger::init(format!("scraping_{}.log", site.key))?;
    info!("Starting job scraper for {}...", site.key);

    let opts = RunOptions {
        pages: cli.pages,
        max_jobs: cli.max_jobs,
        missing_field: match cli.on_missing_field {
            MissingFieldArg::Skip => MissingFieldPolicy::Skip,
            MissingFieldArg::Abort => MissingFieldPolicy::Abort,
        },
    };

    let mut session = ChromeSession::start(&site, &cli.query, &cli.location, cli.headless)?;
    let jobs = match scrape_jobs(&mut session, &site, &opts) {
        Ok(jobs) => {
            session.stop()?;
            jobs
        }
        Err(err) => {
            let _ = session.stop();
            return Err(err);
        }
    };

    if let Some(path) = &cli.json {
        report::export_json(&jobs, path)?;
    }

    let mode = match cli.output {
        Some(OutputArg::PerJob) => OutputMode::PerJob,
        Some(OutputArg::Combined) => OutputMode::Combined,
        None => site.default_output,
    };
    match mode {
        OutputMode::Combined => {
            report::write_combined(&jobs, Path::new(report::COMBINED_FILE_NAME))?
        }
        OutputMode::PerJob => {
            let dir = report::write_per_job(&jobs, site.key)?;
            info!("Reports written to {:?}", dir);
        }
    }

    info!("Run complete: {} job records.", jobs.len());
    Ok(())
}

//! Command-line interface for the crawler.

use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::CrawlerConfig;
use crate::crawler::Crawler;
use crate::error::Result;
use crate::logging::init_logging;
use crate::types::{DataFile, RunMode, RunReport, YearOutcome};

/// Taiwan Holiday Crawler - Download government office calendars from data.gov.tw.
///
/// Without flags only the current and next year are downloaded.
#[derive(Parser)]
#[command(name = "taiwan-holiday-crawler")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Download every year listed on the portal
    #[arg(long)]
    pub all: bool,
}

impl Cli {
    #[must_use]
    pub fn mode(&self) -> RunMode {
        if self.all {
            RunMode::Backfill
        } else {
            RunMode::Maintenance
        }
    }
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = CrawlerConfig::from_env()?;
    init_logging(&config.log_file)?;
    crawl_command(cli.mode(), config)
}

/// Execute a crawl and print the outcome.
fn crawl_command(mode: RunMode, config: CrawlerConfig) -> Result<()> {
    match mode {
        RunMode::Backfill => println!("{} download all available years", style("Mode:").bold()),
        RunMode::Maintenance => {
            println!(
                "{} maintenance (current year + next year)",
                style("Mode:").bold()
            );
            println!(
                "{}",
                style("Hint: pass --all to download every available year").dim()
            );
        }
    }
    println!();

    let crawler = Crawler::new(config)?;

    let pb = ProgressBar::new_spinner();
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.set_message("Crawling data.gov.tw...");
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let report = crawler.run(mode, chrono::Local::now().date_naive());
    pb.finish_and_clear();
    let report = report?;

    print_report(&report);
    Ok(())
}

fn print_report(report: &RunReport) {
    if report.targets.is_fallback {
        println!(
            "{}",
            style("No years discovered; fell back to current and next year").yellow()
        );
    }

    for (year, outcome) in &report.outcomes {
        match outcome {
            YearOutcome::Fetched { path, rows, source } => println!(
                "  {} {year}: {} ({rows} rows, {} link)",
                style("✓").green(),
                path.display(),
                source.as_str()
            ),
            YearOutcome::Unresolved => println!(
                "  {} {year}: not available yet",
                style("-").yellow()
            ),
            YearOutcome::Failed { reason } => {
                println!("  {} {year}: {reason}", style("✗").red());
            }
        }
    }

    println!();
    println!(
        "{} {} / attempted {}",
        style("Succeeded:").green().bold(),
        report.succeeded(),
        report.attempted()
    );

    print_files("CSV files:", &report.csv_files);
    print_files("YAML files:", &report.yaml_files);
}

fn print_files(heading: &str, files: &[DataFile]) {
    if files.is_empty() {
        return;
    }
    println!("{}", style(heading).bold());
    for file in files {
        println!("  - {} ({} bytes)", file.name, file.size);
    }
}

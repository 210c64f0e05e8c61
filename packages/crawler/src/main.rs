//! CLI entry point for the crawler.

use taiwan_holiday_crawler::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

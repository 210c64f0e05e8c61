//! End-to-end integration tests for the crawler pipeline.
//!
//! Discovery is exercised against a captured listing page fixture; full runs
//! go against a local mock of the portal.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use taiwan_holiday_crawler::convert::YearCalendar;
use taiwan_holiday_crawler::discovery::{extract_year_links, select_target_years, validate_link};
use taiwan_holiday_crawler::summary::Summary;
use taiwan_holiday_crawler::types::LinkSource;
use taiwan_holiday_crawler::{
    Crawler, CrawlerConfig, FallbackUrls, RunMode, RunReport, ValidationResult, YearOutcome,
};

const HEADER: &str = "西元日期,星期,是否放假,備註";

const CALENDAR_TITLE_113: &str = "113年中華民國政府行政機關辦公日曆表";

/// Load fixture file content.
fn load_fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to load {}: {}", path.display(), e))
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn csv_body(rows: &[&str]) -> String {
    format!("{HEADER}\n{}\n", rows.join("\n"))
}

async fn mount(server: &MockServer, route: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .mount(server)
        .await;
}

/// Run the crawler on a blocking thread; the blocking HTTP client must not
/// live on the async runtime.
async fn run_crawler(config: CrawlerConfig, mode: RunMode, today: NaiveDate) -> RunReport {
    tokio::task::spawn_blocking(move || {
        Crawler::new(config)
            .expect("client")
            .run(mode, today)
            .expect("run")
    })
    .await
    .expect("crawler thread")
}

fn config_for(server: &MockServer, data_dir: &Path, fallbacks: FallbackUrls) -> CrawlerConfig {
    CrawlerConfig::builder()
        .listing_url(format!("{}/dataset/14718", server.uri()))
        .site_origin(server.uri())
        .data_dir(data_dir)
        .fallback_urls(fallbacks)
        .build()
}

fn primary_href(server: &MockServer, minguo: i32) -> String {
    format!(
        "{}/dgpa.gov.tw/FileConversion?filename=dgpa/files/{minguo}.csv&amp;nfix=&amp;name={minguo}年中華民國政府行政機關辦公日曆表.csv",
        server.uri()
    )
}

fn read_calendar(path: &Path) -> YearCalendar {
    serde_yaml::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

// --- Discovery against the listing fixture ---

#[test]
fn test_fixture_extraction() {
    let html = load_fixture("listing.html");
    let links = extract_year_links(&html, "https://data.gov.tw");

    assert_eq!(links.years_descending(), vec![2024, 2023]);

    let url_2024 = links.get(2024).unwrap();
    assert!(url_2024.starts_with("https://www.dgpa.gov.tw/FileConversion?"));
    assert!(url_2024.contains("&nfix=&name=113"));
    assert_eq!(
        links.get(2023),
        Some("https://data.gov.tw/dataset/14718/resource/112")
    );
}

#[test]
fn test_fixture_validation() {
    let html = load_fixture("listing.html");
    let links = extract_year_links(&html, "https://data.gov.tw");

    assert_eq!(
        validate_link(2024, links.get(2024).unwrap()),
        ValidationResult::Confirmed
    );
    assert_eq!(
        validate_link(2023, links.get(2023).unwrap()),
        ValidationResult::Unverifiable
    );
    assert_eq!(
        validate_link(2025, links.get(2024).unwrap()),
        ValidationResult::Mismatched
    );
}

#[test]
fn test_fixture_backfill_selection() {
    let html = load_fixture("listing.html");
    let links = extract_year_links(&html, "https://data.gov.tw");

    let targets = select_target_years(RunMode::Backfill, date(2025, 6, 1), &links);
    assert_eq!(targets.years, vec![2024, 2023]);

    let targets = select_target_years(RunMode::Maintenance, date(2025, 6, 1), &links);
    assert_eq!(targets.years, vec![2025, 2026]);
}

#[test]
fn test_single_primary_link_scenario() {
    let href = format!(
        "https://www.dgpa.gov.tw/FileConversion?filename=a.csv&name={CALENDAR_TITLE_113}.csv"
    );
    let html = format!(r#"<html><body><a href="{href}">下載</a></body></html>"#);
    let links = extract_year_links(&html, "https://data.gov.tw");

    assert_eq!(links.len(), 1);
    assert_eq!(links.get(2024), Some(href.as_str()));
    assert_eq!(validate_link(2024, &href), ValidationResult::Confirmed);
}

// --- Full runs against a mock portal ---

#[tokio::test(flavor = "multi_thread")]
async fn test_maintenance_run_discovered_and_fallback() {
    let server = MockServer::start().await;
    let data = TempDir::new().unwrap();

    let listing = format!(
        r#"<html><body><a href="{}">CSV</a></body></html>"#,
        primary_href(&server, 113)
    );
    mount(&server, "/dataset/14718", ResponseTemplate::new(200).set_body_string(listing)).await;
    mount(
        &server,
        "/dgpa.gov.tw/FileConversion",
        ResponseTemplate::new(200).set_body_string(csv_body(&[
            "20240101,一,2,元旦",
            "20240102,二,0,",
            "20240106,六,2,",
            "20240208,四,0,調整放假",
        ])),
    )
    .await;
    // 2025 only exists in the fallback table, served with a BOM and CRLF
    let body_2025 = format!("\u{feff}{HEADER}\r\n20250101,三,2,開國紀念日\r\n");
    mount(&server, "/files/2025.csv", ResponseTemplate::new(200).set_body_string(body_2025)).await;

    let fallbacks = FallbackUrls::new().with(2025, format!("{}/files/2025.csv", server.uri()));
    let config = config_for(&server, data.path(), fallbacks);
    let report = run_crawler(config, RunMode::Maintenance, date(2024, 6, 1)).await;

    assert_eq!(report.discovered, 1);
    assert_eq!(report.targets.years, vec![2024, 2025]);
    assert_eq!(report.succeeded(), 2);
    assert_eq!(report.attempted(), 2);

    let csv_2024 = data.path().join("taiwan_holidays_2024.csv");
    assert_eq!(
        report.outcomes[0],
        (
            2024,
            YearOutcome::Fetched {
                path: csv_2024.clone(),
                rows: 4,
                source: LinkSource::Discovered,
            }
        )
    );
    assert!(matches!(
        report.outcomes[1].1,
        YearOutcome::Fetched {
            source: LinkSource::Fallback,
            rows: 1,
            ..
        }
    ));

    let calendar = read_calendar(&data.path().join("taiwan_holidays_2024.yml"));
    assert_eq!(calendar.year, 2024);
    assert_eq!(calendar.holidays.len(), 2);
    assert_eq!(calendar.holidays[0].date, "2024-01-01");
    assert_eq!(calendar.holidays[0].weekday, "星期一");
    assert_eq!(calendar.holidays[0].name, "元旦");
    assert_eq!(calendar.holidays[1].name, "例假日");
    assert_eq!(calendar.special_working_days.len(), 1);
    assert_eq!(calendar.special_working_days[0].note, "調整放假");

    let calendar = read_calendar(&data.path().join("taiwan_holidays_2025.yml"));
    assert_eq!(calendar.holidays[0].name, "開國紀念日");

    let summary_path = report.summary.clone().unwrap();
    let summary: Summary = serde_yaml::from_str(&fs::read_to_string(&summary_path).unwrap()).unwrap();
    let years: Vec<(i32, usize, usize)> = summary
        .available_years
        .iter()
        .map(|y| (y.year, y.holidays_count, y.special_working_days_count))
        .collect();
    assert_eq!(years, vec![(2024, 2, 1), (2025, 1, 0)]);

    let csv_names: Vec<&str> = report.csv_files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(csv_names, vec!["taiwan_holidays_2024.csv", "taiwan_holidays_2025.csv"]);
    let yaml_names: Vec<&str> = report.yaml_files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(
        yaml_names,
        vec!["summary.yml", "taiwan_holidays_2024.yml", "taiwan_holidays_2025.yml"]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_backfill_run_with_mixed_outcomes() {
    let server = MockServer::start().await;
    let data = TempDir::new().unwrap();

    // 2024: primary link, fetch succeeds
    // 2023: root-relative secondary link, server returns 404
    // 2022: secondary link whose file name names another year
    let listing = format!(
        r#"<html><body>
            <a href="{primary}">CSV</a>
            <a href="/files/2023.csv">112年中華民國政府行政機關辦公日曆表 CSV</a>
            <a href="{origin}/files/other.csv?name=110年中華民國政府行政機關辦公日曆表.csv">111年中華民國政府行政機關辦公日曆表 CSV</a>
        </body></html>"#,
        primary = primary_href(&server, 113),
        origin = server.uri(),
    );
    mount(&server, "/dataset/14718", ResponseTemplate::new(200).set_body_string(listing)).await;
    mount(
        &server,
        "/dgpa.gov.tw/FileConversion",
        ResponseTemplate::new(200).set_body_string(csv_body(&["20240101,一,2,元旦"])),
    )
    .await;
    mount(&server, "/files/2023.csv", ResponseTemplate::new(404)).await;

    let config = config_for(&server, data.path(), FallbackUrls::new());
    let report = run_crawler(config, RunMode::Backfill, date(2024, 6, 1)).await;

    assert_eq!(report.discovered, 3);
    assert_eq!(report.targets.years, vec![2024, 2023, 2022]);
    assert!(!report.targets.is_fallback);

    assert!(report.outcomes[0].1.is_success());
    assert!(matches!(report.outcomes[1].1, YearOutcome::Failed { .. }));
    assert_eq!(report.outcomes[2].1, YearOutcome::Unresolved);
    assert_eq!(report.succeeded(), 1);
    assert_eq!(report.attempted(), 3);

    assert!(!data.path().join("taiwan_holidays_2023.csv").exists());
    assert!(!data.path().join("taiwan_holidays_2022.csv").exists());
    assert_eq!(report.converted, vec![data.path().join("taiwan_holidays_2024.yml")]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unreachable_listing_is_degraded_noop() {
    let server = MockServer::start().await;
    let data = TempDir::new().unwrap();
    let data_dir: PathBuf = data.path().join("data");

    mount(&server, "/dataset/14718", ResponseTemplate::new(500)).await;

    let config = config_for(&server, &data_dir, FallbackUrls::new());
    let report = run_crawler(config, RunMode::Backfill, date(2025, 6, 1)).await;

    assert_eq!(report.discovered, 0);
    assert!(report.targets.is_fallback);
    assert_eq!(report.targets.years, vec![2025, 2026]);
    assert!(report
        .outcomes
        .iter()
        .all(|(_, outcome)| *outcome == YearOutcome::Unresolved));
    assert_eq!(report.succeeded(), 0);
    assert!(report.summary.is_none());
    assert!(report.csv_files.is_empty());
    assert!(report.yaml_files.is_empty());
    assert!(data_dir.is_dir());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unreachable_listing_still_uses_fallbacks() {
    let server = MockServer::start().await;
    let data = TempDir::new().unwrap();

    mount(&server, "/dataset/14718", ResponseTemplate::new(503)).await;
    mount(
        &server,
        "/known/2025.csv",
        ResponseTemplate::new(200).set_body_string(csv_body(&["20250101,三,2,元旦"])),
    )
    .await;

    let fallbacks = FallbackUrls::new().with(2025, format!("{}/known/2025.csv", server.uri()));
    let config = config_for(&server, data.path(), fallbacks);
    let report = run_crawler(config, RunMode::Maintenance, date(2025, 3, 1)).await;

    assert_eq!(report.succeeded(), 1);
    assert_eq!(report.outcomes[1].1, YearOutcome::Unresolved);
    assert!(data.path().join("taiwan_holidays_2025.yml").exists());
    assert!(data.path().join("summary.yml").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_undecodable_download_fails_year() {
    let server = MockServer::start().await;
    let data = TempDir::new().unwrap();

    mount(&server, "/dataset/14718", ResponseTemplate::new(404)).await;
    mount(
        &server,
        "/known/2025.csv",
        ResponseTemplate::new(200).set_body_bytes(vec![0xFF, 0xFF, 0xFF]),
    )
    .await;

    let fallbacks = FallbackUrls::new().with(2025, format!("{}/known/2025.csv", server.uri()));
    let config = config_for(&server, data.path(), fallbacks);
    let report = run_crawler(config, RunMode::Maintenance, date(2025, 3, 1)).await;

    match &report.outcomes[0].1 {
        YearOutcome::Failed { reason } => assert!(reason.contains("Could not decode")),
        other => panic!("expected decode failure, got {other:?}"),
    }
    assert!(!data.path().join("taiwan_holidays_2025.csv").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_strict_validation_prefers_fallback() {
    let server = MockServer::start().await;
    let data = TempDir::new().unwrap();

    let listing = r#"<a href="/unverified/2025.csv">114年中華民國政府行政機關辦公日曆表 CSV</a>"#;
    mount(&server, "/dataset/14718", ResponseTemplate::new(200).set_body_string(listing)).await;
    mount(
        &server,
        "/unverified/2025.csv",
        ResponseTemplate::new(200).set_body_string(csv_body(&["20250101,三,2,錯誤"])),
    )
    .await;
    mount(
        &server,
        "/known/2025.csv",
        ResponseTemplate::new(200).set_body_string(csv_body(&["20250101,三,2,元旦"])),
    )
    .await;

    let fallbacks = FallbackUrls::new().with(2025, format!("{}/known/2025.csv", server.uri()));
    let mut config = config_for(&server, data.path(), fallbacks);
    config.strict_validation = true;
    let report = run_crawler(config, RunMode::Maintenance, date(2025, 3, 1)).await;

    assert!(matches!(
        report.outcomes[0].1,
        YearOutcome::Fetched {
            source: LinkSource::Fallback,
            ..
        }
    ));
    let calendar = read_calendar(&data.path().join("taiwan_holidays_2025.yml"));
    assert_eq!(calendar.holidays[0].name, "元旦");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_header_only_download_is_kept() {
    let server = MockServer::start().await;
    let data = TempDir::new().unwrap();

    mount(&server, "/dataset/14718", ResponseTemplate::new(404)).await;
    mount(
        &server,
        "/known/2025.csv",
        ResponseTemplate::new(200).set_body_string(format!("{HEADER}\n")),
    )
    .await;

    let fallbacks = FallbackUrls::new().with(2025, format!("{}/known/2025.csv", server.uri()));
    let config = config_for(&server, data.path(), fallbacks);
    let report = run_crawler(config, RunMode::Maintenance, date(2025, 3, 1)).await;

    assert!(matches!(
        report.outcomes[0].1,
        YearOutcome::Fetched { rows: 0, .. }
    ));
    let calendar = read_calendar(&data.path().join("taiwan_holidays_2025.yml"));
    assert!(calendar.holidays.is_empty());
    assert!(calendar.special_working_days.is_empty());
}

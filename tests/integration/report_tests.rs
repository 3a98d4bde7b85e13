use crate::create_test_config;
use rusqlite::Connection;
use std::io::Write;
use subprobe::config::load_config_with_hash;
use subprobe::input::load_domains;
use subprobe::output::{write_reports, CSV_HEADER};
use subprobe::probe::Dispatcher;
use tempfile::{NamedTempFile, TempDir};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_domain_file_to_reports() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><head><title>Welcome</title></head></html>"),
        )
        .mount(&server)
        .await;

    let mut list = NamedTempFile::new().unwrap();
    writeln!(list, "# targets").unwrap();
    writeln!(list, "{}", server.uri()).unwrap();
    writeln!(list).unwrap();
    writeln!(list, "bad!!domain").unwrap();
    let domains = load_domains(list.path()).unwrap();
    assert_eq!(domains.len(), 2);

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(2_000, 2);
    config.inspect.enabled = true;
    config.output.csv_path = Some(dir.path().join("results.csv"));
    config.output.html_path = Some(dir.path().join("report.html"));
    config.output.database_path = Some(dir.path().join("results.db"));
    config.output.xlsx_path = Some(dir.path().join("results.xlsx"));

    let report = Dispatcher::from_config(&config)
        .unwrap()
        .run(&domains)
        .await;
    write_reports(&config.output, &report, "testhash").unwrap();

    let csv = std::fs::read_to_string(dir.path().join("results.csv")).unwrap();
    let lines: Vec<_> = csv.lines().collect();
    assert_eq!(lines[0], CSV_HEADER.join(","));
    assert_eq!(lines.len(), 3);
    assert!(csv.contains(",Welcome,"));
    assert!(csv.contains("bad!!domain,invalid,0,"));

    let html = std::fs::read_to_string(dir.path().join("report.html")).unwrap();
    assert!(html.contains("Welcome"));
    assert!(html.contains("invalid domain"));

    let xlsx = std::fs::read(dir.path().join("results.xlsx")).unwrap();
    assert!(xlsx.starts_with(b"PK"));

    let conn = Connection::open(dir.path().join("results.db")).unwrap();
    let (hash, total): (String, i64) = conn
        .query_row("SELECT config_hash, total FROM runs", [], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })
        .unwrap();
    assert_eq!(hash, "testhash");
    assert_eq!(total, 2);
}

#[tokio::test]
async fn test_only_alive_reports() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(2_000, 2);
    config.output.csv_path = Some(dir.path().join("alive.csv"));
    config.output.only_alive = true;

    let domains = vec![server.uri(), "http://127.0.0.1:1".to_string()];
    let report = Dispatcher::from_config(&config)
        .unwrap()
        .run(&domains)
        .await;
    write_reports(&config.output, &report, "").unwrap();

    assert_eq!(report.summary.total, 2);
    let csv = std::fs::read_to_string(dir.path().join("alive.csv")).unwrap();
    assert_eq!(csv.lines().count(), 2);
    assert!(!csv.contains("127.0.0.1:1,"));
}

#[test]
fn test_config_file_drives_run_settings() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[probe]
concurrency = 7
timeout-ms = 1500
schemes = ["http"]

[inspect]
enabled = true

[[inspect.rule]]
page-type = "grafana"
pattern = "grafana"
target = "title"

[output]
only-alive = true
"#
    )
    .unwrap();

    let (config, hash) = load_config_with_hash(file.path()).unwrap();
    assert_eq!(hash.len(), 64);
    assert_eq!(config.probe.concurrency, 7);
    assert_eq!(config.inspect.rules.len(), 1);

    let dispatcher = Dispatcher::from_config(&config).unwrap();
    assert_eq!(dispatcher.concurrency(), 7);
}

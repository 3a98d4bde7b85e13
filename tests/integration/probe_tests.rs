use crate::create_test_config;
use std::time::{Duration, Instant};
use subprobe::config::{InspectConfig, ProbeConfig};
use subprobe::probe::{Dispatcher, HttpProber, Probe, ProbeResult};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LOGIN_PAGE: &str = r#"<html><head><title>Admin Login</title></head>
<body><form><input type="text" name="user"><input type="password" name="pw"></form></body></html>"#;

/// Starts a server answering every GET with the given status and body
async fn serve(status: u16, body: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(status)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(&server)
        .await;
    server
}

/// Host and port of a mock server without the scheme
fn authority(server: &MockServer) -> String {
    server.address().to_string()
}

fn find<'a>(results: &'a [ProbeResult], domain: &str) -> &'a ProbeResult {
    results
        .iter()
        .find(|r| r.domain == domain)
        .unwrap_or_else(|| panic!("no result for {}", domain))
}

#[tokio::test]
async fn test_alive_domain() {
    let server = serve(200, "<html><head><title>Home</title></head></html>").await;
    let prober = HttpProber::new(&ProbeConfig::default()).unwrap();

    let probed = prober.check(&server.uri()).await;

    assert!(probed.result.alive);
    assert_eq!(probed.result.status, 200);
    assert_eq!(probed.result.status_text, "200 OK");
    assert!(probed.result.message.is_empty());
    assert!(probed.body.unwrap().starts_with(b"<html>"));
}

#[tokio::test]
async fn test_body_skipped_without_inspection() {
    let server = serve(200, "<html><head><title>Home</title></head></html>").await;
    let prober = HttpProber::new(&ProbeConfig::default())
        .unwrap()
        .with_body(false);

    let probed = prober.check(&server.uri()).await;

    assert!(probed.result.alive);
    assert_eq!(probed.result.status, 200);
    assert!(probed.body.is_none());
}

#[tokio::test]
async fn test_error_status_is_dead() {
    let server = serve(404, "missing").await;
    let prober = HttpProber::new(&ProbeConfig::default()).unwrap();

    let probed = prober.check(&server.uri()).await;

    assert!(!probed.result.alive);
    assert_eq!(probed.result.status, 404);
    assert_eq!(probed.result.status_text, "404 Not Found");
    assert_eq!(probed.result.message, "HTTP 404");
    assert!(probed.body.is_none());
}

#[tokio::test]
async fn test_server_error_is_dead() {
    let server = serve(503, "").await;
    let prober = HttpProber::new(&ProbeConfig::default()).unwrap();

    let probed = prober.check(&server.uri()).await;

    assert!(!probed.result.alive);
    assert_eq!(probed.result.status, 503);
    assert_eq!(probed.result.message, "HTTP 503");
}

#[tokio::test]
async fn test_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let config = create_test_config(500, 1);
    let prober = HttpProber::new(&config.probe).unwrap();

    let start = Instant::now();
    let probed = prober.check(&server.uri()).await;
    let elapsed = start.elapsed();

    assert!(!probed.result.alive);
    assert_eq!(probed.result.status, 0);
    assert_eq!(probed.result.status_text, "unreachable");
    assert_eq!(probed.result.message, "timeout");
    assert!(elapsed < Duration::from_millis(1500), "took {:?}", elapsed);
    assert!(probed.result.response_time >= Duration::from_millis(400));
}

#[tokio::test]
async fn test_redirect_followed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/new"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(ResponseTemplate::new(200).set_body_string("moved here"))
        .mount(&server)
        .await;

    let prober = HttpProber::new(&ProbeConfig::default()).unwrap();
    let probed = prober.check(&format!("{}/old", server.uri())).await;

    assert!(probed.result.alive);
    assert_eq!(probed.result.status, 200);
    assert!(probed.result.final_url.unwrap().ends_with("/new"));
}

#[tokio::test]
async fn test_redirect_not_followed_is_alive() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/elsewhere"))
        .mount(&server)
        .await;

    let config = ProbeConfig {
        max_redirects: 0,
        ..ProbeConfig::default()
    };
    let prober = HttpProber::new(&config).unwrap();
    let probed = prober.check(&server.uri()).await;

    assert!(probed.result.alive);
    assert_eq!(probed.result.status, 302);
}

#[tokio::test]
async fn test_redirect_loop() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/loop"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/loop"))
        .mount(&server)
        .await;

    let config = ProbeConfig {
        max_redirects: 2,
        ..ProbeConfig::default()
    };
    let prober = HttpProber::new(&config).unwrap();
    let probed = prober.check(&format!("{}/loop", server.uri())).await;

    assert!(!probed.result.alive);
    assert_eq!(probed.result.message, "too many redirects");
}

#[tokio::test]
async fn test_https_falls_back_to_http() {
    let server = serve(200, "plain").await;
    let prober = HttpProber::new(&ProbeConfig::default()).unwrap();

    // No scheme: https is tried first and fails the handshake against a
    // plain-HTTP server, then http succeeds.
    let probed = prober.check(&authority(&server)).await;

    assert!(probed.result.alive, "message: {}", probed.result.message);
    assert!(probed.result.final_url.unwrap().starts_with("http://"));
}

#[tokio::test]
async fn test_explicit_https_does_not_fall_back() {
    let server = serve(200, "plain").await;
    let prober = HttpProber::new(&ProbeConfig::default()).unwrap();

    let probed = prober
        .check(&format!("https://{}", authority(&server)))
        .await;

    assert!(!probed.result.alive);
    assert_eq!(probed.result.status, 0);
    assert_eq!(probed.result.message, "tls error");
}

#[tokio::test]
#[ignore = "needs a DNS resolver"]
async fn test_unresolvable_domain() {
    let prober = HttpProber::new(&ProbeConfig::default()).unwrap();

    let probed = prober.check("no-such-host.invalid").await;

    assert!(!probed.result.alive);
    assert_eq!(probed.result.status, 0);
    assert_eq!(probed.result.message, "dns error");
}

#[tokio::test]
async fn test_connection_refused() {
    let prober = HttpProber::new(&ProbeConfig::default()).unwrap();

    let probed = prober.check("http://127.0.0.1:1").await;

    assert!(!probed.result.alive);
    assert_eq!(probed.result.status, 0);
    assert_eq!(probed.result.message, "connection refused");
}

#[tokio::test]
async fn test_title_and_page_type() {
    let server = serve(200, LOGIN_PAGE).await;
    let mut config = create_test_config(2_000, 2);
    config.inspect = InspectConfig {
        enabled: true,
        ..InspectConfig::default()
    };

    let dispatcher = Dispatcher::from_config(&config).unwrap();
    let report = dispatcher.run(&[server.uri()]).await;

    assert_eq!(report.results.len(), 1);
    let result = &report.results[0];
    assert!(result.alive);
    assert_eq!(result.title(), "Admin Login");
    assert_eq!(result.page_type(), "login page");
    assert_eq!(report.summary.page_types.get("login page"), Some(&1));
}

#[tokio::test]
async fn test_mixed_batch_scenario() {
    let ok = serve(200, "<html><head><title>OK</title></head></html>").await;

    let slow = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(10)))
        .mount(&slow)
        .await;

    let domains = vec![ok.uri(), slow.uri(), "bad!!domain".to_string()];
    let config = create_test_config(2_000, 2);
    let dispatcher = Dispatcher::from_config(&config).unwrap();

    let start = Instant::now();
    let report = dispatcher.run(&domains).await;
    let elapsed = start.elapsed();

    assert_eq!(report.results.len(), 3);
    assert!(elapsed < Duration::from_secs(4), "took {:?}", elapsed);

    let ok_result = find(&report.results, &ok.uri());
    assert!(ok_result.alive);
    assert!((200..400).contains(&ok_result.status));

    let slow_result = find(&report.results, &slow.uri());
    assert!(!slow_result.alive);
    assert_eq!(slow_result.message, "timeout");
    assert!(slow_result.response_time >= Duration::from_millis(1_800));
    assert!(slow_result.response_time < Duration::from_millis(3_000));

    let bad = find(&report.results, "bad!!domain");
    assert!(!bad.alive);
    assert_eq!(bad.message, "invalid domain");
    assert!(bad.response_time < Duration::from_millis(50));

    assert_eq!(report.summary.total, 3);
    assert_eq!(report.summary.alive, 1);
    assert_eq!(report.summary.dead, 2);
}

#[tokio::test]
async fn test_empty_batch() {
    let dispatcher = Dispatcher::from_config(&create_test_config(1_000, 4)).unwrap();
    let report = dispatcher.run(&[]).await;

    assert!(report.results.is_empty());
    assert_eq!(report.summary.total, 0);
}

#[tokio::test]
async fn test_duplicates_probed_once_each() {
    let server = serve(200, "ok").await;
    let domains = vec![server.uri(), server.uri(), server.uri()];

    let dispatcher = Dispatcher::from_config(&create_test_config(2_000, 3)).unwrap();
    let report = dispatcher.run(&domains).await;

    assert_eq!(report.results.len(), 3);
    assert!(report.results.iter().all(|r| r.alive));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
}

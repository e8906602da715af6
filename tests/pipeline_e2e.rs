//! End-to-end pipeline runs against a mocked NSE

use fnoscan::error::ErrorKind;
use fnoscan::options::OptionChainResult;
use fnoscan::{Config, MoversPipeline, OptionSide, ScanError};
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const EXPIRIES: [&str; 3] = ["30-Jan-2025", "27-Feb-2025", "27-Mar-2025"];

fn test_config(server: &MockServer) -> Config {
    Config {
        base_url: server.uri(),
        request_timeout_sec: 5,
        rate_limit_interval_ms: 0,
        max_concurrent_symbols: 2,
        ..Config::default()
    }
}

fn movers(rows: Value) -> Value {
    json!({ "NIFTY": { "data": [] }, "FOSec": { "data": rows } })
}

fn gainers() -> Value {
    movers(json!([
        {"symbol": "SBIN", "identifier": "State Bank of India", "open_price": 600.0, "low_price": 600.0, "high_price": 615.0, "ltp": 612.0, "perChange": 2.0},
        {"symbol": "TCS", "open_price": 3500.0, "low_price": 3500.0, "high_price": 3560.0, "ltp": 3550.0, "perChange": 1.4},
        {"symbol": "INFY", "open_price": 1501.0, "low_price": 1500.0, "high_price": 1530.0, "ltp": 1525.0, "perChange": 1.1}
    ]))
}

fn losers() -> Value {
    movers(json!([
        {"symbol": "HDFCBANK", "open_price": 1700.0, "low_price": 1660.0, "high_price": 1700.0, "ltp": 1665.0, "perChange": -2.1},
        {"symbol": "ITC", "open_price": 450.0, "low_price": 445.0, "high_price": 452.0, "ltp": 446.0, "perChange": -0.9}
    ]))
}

fn contract_info() -> Value {
    json!({ "expiryDates": EXPIRIES, "strikePrice": ["590", "600", "610"] })
}

fn option_chain(underlying: f64) -> Value {
    json!({
        "records": {
            "timestamp": "15-Jan-2025 15:30:00",
            "underlyingValue": underlying,
            "data": [
                {"strikePrice": underlying - 20.0, "CE": {"lastPrice": 25.0, "change": 3.0}, "PE": {"lastPrice": 2.0, "change": 0.5}},
                {"strikePrice": underlying - 10.0, "CE": {"lastPrice": 16.0, "change": -1.0}, "PE": {"lastPrice": 4.0, "change": 1.0}},
                {"strikePrice": underlying, "CE": {"lastPrice": 9.0, "change": 1.0}, "PE": {"lastPrice": 7.0, "change": -0.5}},
                {"strikePrice": underlying + 10.0, "CE": {"lastPrice": 4.5, "change": 0.0}},
                {"strikePrice": underlying + 20.0, "CE": {"lastPrice": 2.0, "change": 0.2}}
            ]
        }
    })
}

async fn mount_json(server: &MockServer, endpoint: &str, key: &str, value: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(endpoint))
        .and(query_param(key, value))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_root(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).insert_header("set-cookie", "nsit=abc123; Path=/"))
        .mount(server)
        .await;
}

/// Gainers SBIN + TCS, loser HDFCBANK; TCS contract-info is broken
async fn mount_market(server: &MockServer) {
    mount_market_with(
        server,
        ResponseTemplate::new(500).set_body_string("Internal Server Error"),
    )
    .await;
}

async fn mount_market_with(server: &MockServer, tcs_contract_info: ResponseTemplate) {
    mount_root(server).await;
    mount_json(server, "/api/live-analysis-variations", "index", "gainers", gainers()).await;
    mount_json(server, "/api/live-analysis-variations", "index", "loosers", losers()).await;

    mount_json(server, "/api/option-chain-contract-info", "symbol", "SBIN", contract_info()).await;
    mount_json(server, "/api/option-chain-contract-info", "symbol", "HDFCBANK", contract_info()).await;
    Mock::given(method("GET"))
        .and(path("/api/option-chain-contract-info"))
        .and(query_param("symbol", "TCS"))
        .respond_with(tcs_contract_info)
        .mount(server)
        .await;

    mount_json(server, "/api/option-chain-v3", "symbol", "SBIN", option_chain(610.0)).await;
    mount_json(server, "/api/option-chain-v3", "symbol", "HDFCBANK", option_chain(1670.0)).await;
}

fn resolved(result: &Option<OptionChainResult>) -> (&str, OptionSide, Vec<f64>) {
    match result {
        Some(OptionChainResult::Resolved { chain, side, nearest_strikes }) => (
            chain.expiry.as_str(),
            *side,
            nearest_strikes.iter().map(|s| s.strike).collect(),
        ),
        other => panic!("expected resolved option chain, got {:?}", other),
    }
}

#[tokio::test]
async fn test_movers_http_failure_aborts_run() {
    let server = MockServer::start().await;
    mount_root(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/live-analysis-variations"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .mount(&server)
        .await;

    let pipeline = MoversPipeline::new(test_config(&server));
    let err = pipeline.run(None).await.unwrap_err();

    assert!(err.is_fatal());
    assert!(matches!(err, ScanError::MoversUnavailable { .. }));
    assert_eq!(err.kind(), ErrorKind::HttpError);

    let report = err.report();
    assert_eq!(report.error, "gainers movers unavailable: HTTP 503");
    assert_eq!(report.details.as_deref(), Some("Service Unavailable"));
}

#[tokio::test]
async fn test_losers_decode_failure_aborts_run() {
    let server = MockServer::start().await;
    mount_root(&server).await;
    mount_json(&server, "/api/live-analysis-variations", "index", "gainers", gainers()).await;
    Mock::given(method("GET"))
        .and(path("/api/live-analysis-variations"))
        .and(query_param("index", "loosers"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>Access Denied</html>"))
        .mount(&server)
        .await;

    let pipeline = MoversPipeline::new(test_config(&server));
    let err = pipeline.run(None).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::DecodeError);
    assert!(err.to_string().starts_with("losers movers unavailable"));
    assert_eq!(err.details().as_deref(), Some("<html>Access Denied</html>"));
}

#[tokio::test]
async fn test_single_symbol_failure_is_scoped_to_its_row() {
    let server = MockServer::start().await;
    mount_market(&server).await;

    let pipeline = MoversPipeline::new(test_config(&server));
    let report = pipeline.run(None).await.unwrap();

    assert_eq!(report.available_expiries, EXPIRIES.to_vec());
    assert_eq!(report.selected_expiry.as_deref(), Some("30-Jan-2025"));

    // INFY opened above its low, ITC below its high
    let gainer_symbols: Vec<_> = report.gainers.iter().filter_map(|r| r.symbol.as_deref()).collect();
    assert_eq!(gainer_symbols, vec!["SBIN", "TCS"]);
    assert_eq!(report.losers.len(), 1);

    let (expiry, side, strikes) = resolved(&report.gainers[0].option_chain);
    assert_eq!(expiry, "30-Jan-2025");
    assert_eq!(side, OptionSide::CE);
    // CE legs with non-negative change, nearest 610 first, 600 excluded (falling)
    assert_eq!(strikes, vec![610.0, 620.0, 590.0, 630.0]);

    match &report.gainers[1].option_chain {
        Some(OptionChainResult::Failed { kind, error, expiry }) => {
            assert_eq!(*kind, ErrorKind::HttpError);
            assert_eq!(error, "HTTP 500");
            assert!(expiry.is_none());
        }
        other => panic!("expected TCS failure, got {:?}", other),
    }

    let (_, side, strikes) = resolved(&report.losers[0].option_chain);
    assert_eq!(side, OptionSide::PE);
    // PE legs opened at low: 1660 and 1650 (rising); 1670 fell
    assert_eq!(strikes, vec![1660.0, 1650.0]);

    assert_eq!(report.resolved_count(), 2);
    assert_eq!(report.failed_count(), 1);
}

#[tokio::test]
async fn test_movers_timeout_is_transport_error() {
    let server = MockServer::start().await;
    mount_root(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/live-analysis-variations"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(gainers())
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let config = Config {
        request_timeout_sec: 1,
        ..test_config(&server)
    };
    let pipeline = MoversPipeline::new(config);
    let err = pipeline.run(None).await.unwrap_err();

    assert!(err.is_fatal());
    assert_eq!(err.kind(), ErrorKind::TransportError);
    let details = err.details().unwrap_or_default();
    assert!(details.starts_with("timeout error"), "details: {}", details);
}

#[tokio::test]
async fn test_contract_info_timeout_is_scoped_to_its_row() {
    let server = MockServer::start().await;
    mount_market_with(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(contract_info())
            .set_delay(Duration::from_secs(3)),
    )
    .await;

    let config = Config {
        request_timeout_sec: 1,
        ..test_config(&server)
    };
    let pipeline = MoversPipeline::new(config);
    let report = pipeline.run(None).await.unwrap();

    match &report.gainers[1].option_chain {
        Some(OptionChainResult::Failed { kind, expiry, .. }) => {
            assert_eq!(*kind, ErrorKind::TransportError);
            assert!(expiry.is_none());
        }
        other => panic!("expected TCS timeout, got {:?}", other),
    }
    assert_eq!(report.resolved_count(), 2);
    assert_eq!(report.failed_count(), 1);
}

#[tokio::test]
async fn test_concurrent_rows_share_request_pacing() {
    let server = MockServer::start().await;
    mount_market(&server).await;

    let interval = Duration::from_millis(100);
    let config = Config {
        rate_limit_interval_ms: 100,
        max_concurrent_symbols: 4,
        ..test_config(&server)
    };

    let start = Instant::now();
    let pipeline = MoversPipeline::new(config);
    let report = pipeline.run(None).await.unwrap();
    let elapsed = start.elapsed();

    assert_eq!(report.resolved_count(), 2);

    // The warm-up GET of the site root is not rate limited
    let api_calls = server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path().starts_with("/api/"))
        .count() as u32;

    // movers x2, shared expiries, SBIN x2, TCS x1, HDFCBANK x2
    assert_eq!(api_calls, 8);
    assert!(
        elapsed >= interval * (api_calls - 1),
        "{} calls finished in {:?}",
        api_calls,
        elapsed
    );
}

#[tokio::test]
async fn test_valid_expiry_override_is_used() {
    let server = MockServer::start().await;
    mount_market(&server).await;

    let pipeline = MoversPipeline::new(test_config(&server));
    let report = pipeline.run(Some("27-Feb-2025")).await.unwrap();

    assert_eq!(report.selected_expiry.as_deref(), Some("27-Feb-2025"));
    let (expiry, _, _) = resolved(&report.gainers[0].option_chain);
    assert_eq!(expiry, "27-Feb-2025");
}

#[tokio::test]
async fn test_unknown_expiry_override_falls_back() {
    let server = MockServer::start().await;
    mount_market(&server).await;

    let pipeline = MoversPipeline::new(test_config(&server));
    let report = pipeline.run(Some("01-Jan-2099")).await.unwrap();

    assert_eq!(report.selected_expiry.as_deref(), Some("30-Jan-2025"));
    let (expiry, _, _) = resolved(&report.losers[0].option_chain);
    assert_eq!(expiry, "30-Jan-2025");
}

#[tokio::test]
async fn test_option_chain_failure_records_expiry() {
    let server = MockServer::start().await;
    mount_root(&server).await;
    mount_json(&server, "/api/live-analysis-variations", "index", "gainers", gainers()).await;
    mount_json(&server, "/api/live-analysis-variations", "index", "loosers", movers(json!([]))).await;
    Mock::given(method("GET"))
        .and(path("/api/option-chain-contract-info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(contract_info()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/option-chain-v3"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&server)
        .await;

    let pipeline = MoversPipeline::new(test_config(&server));
    let report = pipeline.run(None).await.unwrap();

    assert!(report.losers.is_empty());
    for row in &report.gainers {
        let result = row.option_chain.as_ref().unwrap();
        assert_eq!(result.error_kind(), Some(ErrorKind::HttpError));
        assert_eq!(result.expiry(), Some("30-Jan-2025"));
    }
}

#[tokio::test]
async fn test_empty_expiry_list_and_missing_symbol() {
    let server = MockServer::start().await;
    mount_root(&server).await;
    mount_json(
        &server,
        "/api/live-analysis-variations",
        "index",
        "gainers",
        movers(json!([
            {"identifier": "Unnamed", "open": 10.0, "low": 10.0},
            {"symbol": "NEWCO", "open": 20.0, "low": 20.0}
        ])),
    )
    .await;
    mount_json(&server, "/api/live-analysis-variations", "index", "loosers", json!({})).await;
    mount_json(
        &server,
        "/api/option-chain-contract-info",
        "symbol",
        "NEWCO",
        json!({"expiryDates": []}),
    )
    .await;

    let pipeline = MoversPipeline::new(test_config(&server));
    let report = pipeline.run(None).await.unwrap();

    assert!(report.available_expiries.is_empty());
    assert!(report.selected_expiry.is_none());
    assert_eq!(
        report.gainers[0].option_chain.as_ref().and_then(|r| r.error_kind()),
        Some(ErrorKind::NoSymbol)
    );
    assert_eq!(
        report.gainers[1].option_chain.as_ref().and_then(|r| r.error_kind()),
        Some(ErrorKind::NoExpiryDates)
    );
}

#[tokio::test]
async fn test_session_cookie_and_headers_are_sent() {
    let server = MockServer::start().await;
    mount_root(&server).await;

    // Only requests carrying the warm-up cookie and referer are served
    Mock::given(method("GET"))
        .and(path("/api/live-analysis-variations"))
        .and(header("cookie", "nsit=abc123"))
        .and(header("referer", "https://www.nseindia.com/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(movers(json!([]))))
        .mount(&server)
        .await;

    let pipeline = MoversPipeline::new(test_config(&server));
    let report = pipeline.run(None).await.unwrap();

    assert!(report.gainers.is_empty());
    assert!(report.losers.is_empty());
    assert!(report.available_expiries.is_empty());
}

#[tokio::test]
async fn test_report_serializes_for_presentation() {
    let server = MockServer::start().await;
    mount_market(&server).await;

    let pipeline = MoversPipeline::new(test_config(&server));
    let report = pipeline.run(None).await.unwrap();
    let json = serde_json::to_value(&report).unwrap();

    let sbin = &json["gainers"][0];
    assert_eq!(sbin["symbol"], "SBIN");
    assert_eq!(sbin["display_name"], "State Bank of India");
    assert_eq!(sbin["open_price"], 600.0);
    assert_eq!(sbin["option_chain"]["status"], "resolved");
    assert_eq!(sbin["option_chain"]["chain"]["expiry"], "30-Jan-2025");
    assert_eq!(sbin["option_chain"]["nearest_strikes"][0]["strike"], 610.0);
    assert_eq!(sbin["option_chain"]["nearest_strikes"][0]["open"], 8.0);
    let records = &sbin["option_chain"]["chain"]["records"];
    assert_eq!(records.as_array().map(Vec::len), Some(5));
    assert_eq!(records[0]["strike_price"], 590.0);
    assert_eq!(records[0]["call"]["lastPrice"], 25.0);
    assert!(records[3]["put"].is_null());

    assert_eq!(json["gainers"][1]["option_chain"]["status"], "failed");
    assert_eq!(json["selected_expiry"], "30-Jan-2025");
}

use std::fs;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ipsatrack::core::config::AppConfig;
use ipsatrack::core::display;
use ipsatrack::core::{RefreshOutcome, RefreshState};

mod test_utils {
    use super::*;

    pub const QUOTE_RESPONSE: &str = r#"{
        "chart": {
            "result": [{
                "meta": {
                    "regularMarketPrice": 6500.0,
                    "previousClose": 6400.0,
                    "currency": "CLP"
                }
            }]
        }
    }"#;

    pub const HISTORY_RESPONSE: &str = r#"{
        "chart": {
            "result": [{
                "meta": { "regularMarketPrice": 6500.0 },
                "timestamp": [1717372800, 1717459200, 1717545600],
                "indicators": { "quote": [{ "close": [6380.0, 6400.0, 6500.0] }] }
            }]
        }
    }"#;

    pub async fn mount_chart(server: &MockServer, symbol: &str, range: &str, status: u16, body: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/v8/finance/chart/{symbol}")))
            .and(query_param("range", range))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(server)
            .await;
    }

    pub async fn mount_rates(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/api-sbifv3/recursos_api/dolar"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"Dolares": [{"Valor": "950,00", "Fecha": "2024-06-05"}]}"#),
            )
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api-sbifv3/recursos_api/uf"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"UFs": [{"Valor": "38.000,00", "Fecha": "2024-06-05"}]}"#),
            )
            .mount(server)
            .await;
    }

    pub fn write_config(file: &tempfile::NamedTempFile, server_uri: &str, extra: &str) {
        let config_content = format!(
            r#"
providers:
  yahoo:
    base_url: {server_uri}
  cmf:
    base_url: {server_uri}
    api_key: "test-key"
symbol: "COPEC.SN"
days: 5
{extra}
"#
        );
        fs::write(file.path(), config_content).expect("Failed to write config file");
    }
}

use test_utils::*;

#[test_log::test(tokio::test)]
async fn test_show_flow_with_mock() {
    let server = MockServer::start().await;
    mount_chart(&server, "COPEC.SN", "1d", 200, QUOTE_RESPONSE).await;
    mount_chart(&server, "COPEC.SN", "5d", 200, HISTORY_RESPONSE).await;
    mount_rates(&server).await;

    let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    write_config(&config_file, &server.uri(), "");

    let result = ipsatrack::run_command(
        ipsatrack::AppCommand::Show {
            symbol: None,
            days: None,
        },
        Some(config_file.path().to_str().unwrap()),
    )
    .await;
    assert!(result.is_ok(), "Show failed with: {:?}", result.err());
}

#[test_log::test(tokio::test)]
async fn test_end_to_end_display_values() {
    let server = MockServer::start().await;
    mount_chart(&server, "COPEC.SN", "1d", 200, QUOTE_RESPONSE).await;
    mount_chart(&server, "COPEC.SN", "5d", 200, HISTORY_RESPONSE).await;
    mount_rates(&server).await;

    let config_file = tempfile::NamedTempFile::new().unwrap();
    write_config(&config_file, &server.uri(), "");
    let config = AppConfig::load_from_path(config_file.path()).unwrap();
    let dashboard = ipsatrack::build_dashboard(&config, None, None).unwrap();

    let outcome = dashboard.refresh().await;
    assert_eq!(outcome.state(), RefreshState::Success);
    let RefreshOutcome::Updated(result) = outcome else {
        panic!("expected an update");
    };

    let snapshot = display::snapshot(&result);
    assert!((snapshot.change.change.percent - 1.5625).abs() < 1e-9);
    assert!((snapshot.conversions.usd_value - 6.8421).abs() < 1e-4);
    assert!((snapshot.conversions.uf_value - 0.171053).abs() < 1e-6);
    assert_eq!(snapshot.main_value, "$6.500");
    assert_eq!(snapshot.conversions.uf, "0.171053 UF");
    assert_eq!(snapshot.chart.values, vec![6380.0, 6400.0, 6500.0]);
    assert!(!snapshot.chart.estimated);
}

#[test_log::test(tokio::test)]
async fn test_missing_history_shows_estimated_chart() {
    let server = MockServer::start().await;
    mount_chart(&server, "COPEC.SN", "1d", 200, QUOTE_RESPONSE).await;
    mount_chart(&server, "COPEC.SN", "5d", 500, "").await;
    mount_rates(&server).await;

    let config_file = tempfile::NamedTempFile::new().unwrap();
    write_config(&config_file, &server.uri(), "");
    let config = AppConfig::load_from_path(config_file.path()).unwrap();
    let dashboard = ipsatrack::build_dashboard(&config, None, None).unwrap();

    let outcome = dashboard.refresh().await;
    assert_eq!(outcome.state(), RefreshState::Degraded);
    let RefreshOutcome::Updated(result) = outcome else {
        panic!("expected an update");
    };
    assert!(result.is_simulated());
    assert_eq!(result.history.last().unwrap().value, 6500.0);
}

#[test_log::test(tokio::test)]
async fn test_strict_history_fails_show() {
    let server = MockServer::start().await;
    mount_chart(&server, "COPEC.SN", "1d", 200, QUOTE_RESPONSE).await;
    mount_chart(&server, "COPEC.SN", "5d", 500, "").await;
    mount_rates(&server).await;

    let config_file = tempfile::NamedTempFile::new().unwrap();
    write_config(&config_file, &server.uri(), "strict_history: true");

    let result = ipsatrack::run_command(
        ipsatrack::AppCommand::Show {
            symbol: None,
            days: None,
        },
        Some(config_file.path().to_str().unwrap()),
    )
    .await;
    let error = result.expect_err("strict history should fail the refresh");
    assert!(error.to_string().contains("Data unavailable"));
}

#[test_log::test(tokio::test)]
async fn test_quote_through_relay() {
    let server = MockServer::start().await;
    mount_chart(&server, "CCU.SN", "1d", 403, "").await;
    mount_chart(&server, "CCU.SN", "5d", 200, HISTORY_RESPONSE).await;
    mount_rates(&server).await;

    let quote_target = format!(
        "{}/v8/finance/chart/CCU.SN?interval=1d&range=1d",
        server.uri()
    );
    Mock::given(method("GET"))
        .and(path("/relay"))
        .and(query_param("url", quote_target.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_string(QUOTE_RESPONSE))
        .expect(1)
        .mount(&server)
        .await;

    let config_file = tempfile::NamedTempFile::new().unwrap();
    let relay = format!("relay:\n  base_url: {}/relay", server.uri());
    write_config(&config_file, &server.uri(), &relay);
    let config = AppConfig::load_from_path(config_file.path()).unwrap();
    let dashboard = ipsatrack::build_dashboard(&config, Some("CCU.SN"), None).unwrap();

    let outcome = dashboard.refresh().await;
    assert_eq!(outcome.state(), RefreshState::Success);
}

#[test_log::test(tokio::test)]
async fn test_quote_unavailable_fails_show() {
    let server = MockServer::start().await;
    mount_chart(&server, "COPEC.SN", "1d", 500, "").await;
    mount_chart(&server, "COPEC.SN", "5d", 200, HISTORY_RESPONSE).await;
    mount_rates(&server).await;

    let config_file = tempfile::NamedTempFile::new().unwrap();
    write_config(&config_file, &server.uri(), "");

    let result = ipsatrack::run_command(
        ipsatrack::AppCommand::Show {
            symbol: None,
            days: None,
        },
        Some(config_file.path().to_str().unwrap()),
    )
    .await;
    assert!(result.is_err());
}

#[test_log::test(tokio::test)]
async fn test_unknown_symbol_is_rejected() {
    let config_file = tempfile::NamedTempFile::new().unwrap();
    write_config(&config_file, "http://127.0.0.1:1", "");

    let result = ipsatrack::run_command(
        ipsatrack::AppCommand::Show {
            symbol: Some("AAPL".to_string()),
            days: None,
        },
        Some(config_file.path().to_str().unwrap()),
    )
    .await;
    assert!(result.unwrap_err().to_string().contains("Unknown symbol: AAPL"));
}

#[test]
fn test_missing_cmf_config_is_rejected() {
    let config: AppConfig = serde_yaml::from_str("symbol: \"^IPSA\"").unwrap();
    let result = ipsatrack::build_dashboard(&config, None, None);
    assert!(
        result
            .err()
            .expect("missing CMF config should fail")
            .to_string()
            .contains("CMF API key")
    );
}

#[test_log::test(tokio::test)]
async fn test_symbols_command_needs_no_config() {
    let result = ipsatrack::run_command(
        ipsatrack::AppCommand::Symbols,
        Some("/nonexistent/ipsatrack/config.yaml"),
    )
    .await;
    assert!(result.is_ok());
}

use std::fs;
use swiftfx::AppCommand;
use swiftfx::cli::convert::ConvertArgs;
use swiftfx::core::config::AppConfig;
use swiftfx::orchestrator::ConversionOrchestrator;
use tempfile::TempDir;
use tracing::info;

mod test_utils {
    use wiremock::matchers::{method, path, path_regex, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub const FIXER_SYMBOLS: &str = r#"{
        "success": true,
        "symbols": {"USD": "United States Dollar", "EUR": "Euro", "GBP": "British Pound Sterling"}
    }"#;

    pub const FIXER_LATEST: &str = r#"{
        "success": true,
        "timestamp": 1711704600,
        "base": "EUR",
        "date": "2024-03-29",
        "rates": {"USD": 1.1, "GBP": 0.85}
    }"#;

    pub const FIXER_HISTORICAL: &str = r#"{
        "success": true,
        "historical": true,
        "timestamp": 1711065600,
        "base": "EUR",
        "rates": {"USD": 1.08, "GBP": 0.86}
    }"#;

    pub const OXR_CURRENCIES: &str =
        r#"{"USD": "United States Dollar", "EUR": "Euro", "JPY": "Japanese Yen"}"#;

    pub const OXR_LATEST: &str = r#"{
        "timestamp": 1711704600,
        "base": "USD",
        "rates": {"EUR": 0.925, "JPY": 151.3}
    }"#;

    pub const OXR_HISTORICAL: &str = r#"{
        "timestamp": 1711065600,
        "base": "USD",
        "rates": {"EUR": 0.92, "JPY": 150.9}
    }"#;

    pub async fn create_fixer_mock_server() -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/symbols"))
            .and(query_param("access_key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_string(FIXER_SYMBOLS))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/latest"))
            .respond_with(ResponseTemplate::new(200).set_body_string(FIXER_LATEST))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path_regex(r"^/\d{4}-\d{2}-\d{2}$"))
            .respond_with(ResponseTemplate::new(200).set_body_string(FIXER_HISTORICAL))
            .mount(&mock_server)
            .await;

        mock_server
    }

    pub async fn create_oxr_mock_server() -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/currencies.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(OXR_CURRENCIES))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/latest.json"))
            .and(query_param("app_id", "test-app"))
            .respond_with(ResponseTemplate::new(200).set_body_string(OXR_LATEST))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path_regex(r"^/historical/\d{4}-\d{2}-\d{2}\.json$"))
            .respond_with(ResponseTemplate::new(200).set_body_string(OXR_HISTORICAL))
            .mount(&mock_server)
            .await;

        mock_server
    }

    pub fn fixer_config(base_url: &str) -> String {
        format!(
            r#"
provider: fixer
providers:
  fixer:
    base_url: "{base_url}"
    access_key: "test-key"
timeout_secs: 5
"#
        )
    }

    pub fn oxr_config(base_url: &str) -> String {
        format!(
            r#"
provider: open_exchange
providers:
  open_exchange:
    base_url: "{base_url}"
    app_id: "test-app"
base_currency: "EUR"
timeout_secs: 5
history:
  points: 3
  step_days: 7
"#
        )
    }
}

fn write_config(dir: &TempDir, content: &str) -> String {
    let path = dir.path().join("config.yaml");
    fs::write(&path, content).unwrap();
    path.to_string_lossy().into_owned()
}

fn orchestrator_for(config_path: &str) -> ConversionOrchestrator {
    let config = AppConfig::load_from_path(config_path).unwrap();
    let provider = swiftfx::providers::from_config(&config).unwrap();
    ConversionOrchestrator::new(provider, config.history, config.base_currency.as_deref())
}

#[test_log::test(tokio::test)]
async fn test_full_convert_flow_with_fixer_mock() {
    let mock_server = test_utils::create_fixer_mock_server().await;
    let temp_dir = TempDir::new().unwrap();
    let config_path = write_config(&temp_dir, &test_utils::fixer_config(&mock_server.uri()));

    let result = swiftfx::run_command(
        AppCommand::Convert(ConvertArgs {
            amount: "1,234.5".to_string(),
            from: None,
            to: "usd".to_string(),
            json: false,
        }),
        Some(&config_path),
    )
    .await;

    info!(?result, "Convert command finished");
    assert!(result.is_ok(), "Convert should succeed: {result:?}");
}

#[test_log::test(tokio::test)]
async fn test_fixer_orchestrator_state() {
    let mock_server = test_utils::create_fixer_mock_server().await;
    let temp_dir = TempDir::new().unwrap();
    let config_path = write_config(&temp_dir, &test_utils::fixer_config(&mock_server.uri()));
    let orchestrator = orchestrator_for(&config_path);

    orchestrator.initialize().await;
    orchestrator.set_amount_from("1234.5");
    let history = orchestrator.select_currency_to("USD");
    orchestrator.convert("EUR", "USD").await;
    history.await.unwrap();

    let state = orchestrator.snapshot();
    assert_eq!(state.currencies, vec!["EUR", "GBP", "USD"]);
    assert_eq!(state.selected_currency_from, "EUR");
    assert_eq!(state.amount_to, "1,357.95");
    assert_eq!(state.current_rate, Some(1.1));
    assert_eq!(state.history_points.len(), 5);
    assert!(state.history_points.windows(2).all(|w| w[0].date < w[1].date));
    assert!(state.history_points.iter().all(|p| (p.rate - 1.08).abs() < 1e-9));
    assert_eq!(state.error_message, None);
    assert!(!state.is_loading());
}

#[test_log::test(tokio::test)]
async fn test_oxr_cross_rate_through_usd_pivot() {
    let mock_server = test_utils::create_oxr_mock_server().await;
    let temp_dir = TempDir::new().unwrap();
    let config_path = write_config(&temp_dir, &test_utils::oxr_config(&mock_server.uri()));
    let orchestrator = orchestrator_for(&config_path);

    orchestrator.initialize().await;
    orchestrator.set_amount_from("100");
    let history = orchestrator.select_currency_to("JPY");
    orchestrator.convert("EUR", "JPY").await;
    history.await.unwrap();

    let state = orchestrator.snapshot();
    assert_eq!(state.selected_currency_from, "EUR");
    // 100 / 0.925 * 151.3
    assert_eq!(state.amount_to, "16,356.76");
    let rate = state.current_rate.unwrap();
    assert!((rate - 151.3 / 0.925).abs() < 1e-9);
    assert_eq!(state.history_points.len(), 3);
    assert!((state.history_points[0].rate - 150.9 / 0.92).abs() < 1e-9);
    assert_eq!(state.error_message, None);
}

#[test_log::test(tokio::test)]
async fn test_currencies_command_with_oxr_mock() {
    let mock_server = test_utils::create_oxr_mock_server().await;
    let temp_dir = TempDir::new().unwrap();
    let config_path = write_config(&temp_dir, &test_utils::oxr_config(&mock_server.uri()));

    let result = swiftfx::run_command(AppCommand::Currencies, Some(&config_path)).await;
    assert!(result.is_ok(), "Currencies should succeed: {result:?}");
}

#[test_log::test(tokio::test)]
async fn test_convert_rejects_unsupported_currency() {
    let mock_server = test_utils::create_fixer_mock_server().await;
    let temp_dir = TempDir::new().unwrap();
    let config_path = write_config(&temp_dir, &test_utils::fixer_config(&mock_server.uri()));

    let result = swiftfx::run_command(
        AppCommand::Convert(ConvertArgs {
            amount: "10".to_string(),
            from: None,
            to: "ZZZ".to_string(),
            json: true,
        }),
        Some(&config_path),
    )
    .await;

    let err = result.unwrap_err();
    assert!(err.to_string().contains("Unsupported currency: ZZZ"));
}

#[test_log::test(tokio::test)]
async fn test_convert_rejects_invalid_amount() {
    let mock_server = test_utils::create_fixer_mock_server().await;
    let temp_dir = TempDir::new().unwrap();
    let config_path = write_config(&temp_dir, &test_utils::fixer_config(&mock_server.uri()));

    let result = swiftfx::run_command(
        AppCommand::Convert(ConvertArgs {
            amount: "abc".to_string(),
            from: None,
            to: "USD".to_string(),
            json: false,
        }),
        Some(&config_path),
    )
    .await;

    assert_eq!(result.unwrap_err().to_string(), "Please enter a valid amount");
}

#[test_log::test(tokio::test)]
async fn test_provider_error_surfaces_from_command() {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/symbols"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"success": false, "error": {"code": 101, "type": "invalid_access_key",
                "info": "You have not supplied a valid API Access Key."}}"#,
        ))
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let config_path = write_config(&temp_dir, &test_utils::fixer_config(&mock_server.uri()));

    let err = swiftfx::run_command(AppCommand::Currencies, Some(&config_path))
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Could not load currencies: You have not supplied a valid API Access Key."
    );
}

#[test_log::test(tokio::test)]
async fn test_missing_provider_section_fails() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = write_config(&temp_dir, "provider: open_exchange\n");

    let err = swiftfx::run_command(AppCommand::Currencies, Some(&config_path))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("providers.open_exchange"));
}

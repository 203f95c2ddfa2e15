//! HTTP Backend Client
//!
//! Talks to the scanner service:
//!
//! - `POST /api/scanner/cached/run` for cache-accelerated scans
//! - `POST /api/validator/validate-signal` for signal validation

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use serde::Serialize;
use serde_json::Value;

use super::ScannerBackend;
use crate::config::BackendConfig;
use crate::error::{AdvisorError, Result};
use crate::model::{Direction, ScannerResult, SignalRequest, Timeframe, ValidationResult};
use crate::symbol::normalize_symbol;

const SCANNER_PATH: &str = "/api/scanner/cached/run";
const VALIDATOR_PATH: &str = "/api/validator/validate-signal";

#[derive(Serialize)]
struct ScanBody {
    timeframe: Timeframe,
    use_cache: bool,
    max_cache_age: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    min_confluence: Option<f64>,
}

#[derive(Serialize)]
struct ValidateBody<'a> {
    symbol: String,
    direction: Direction,
    #[serde(with = "rust_decimal::serde::float")]
    entry_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    stop_loss: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    take_profit: Decimal,
    timeframe: &'a str,
}

/// Backend client over HTTP
pub struct HttpBackendClient {
    client: Client,
    config: BackendConfig,
}

impl HttpBackendClient {
    pub fn new(config: BackendConfig) -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self { client, config })
    }

    pub const fn config(&self) -> &BackendConfig {
        &self.config
    }

    fn url(&self, path: &str) -> Result<String> {
        self.config
            .base_url
            .as_deref()
            .map(|base| format!("{base}{path}"))
            .ok_or_else(|| AdvisorError::Config("Backend URL not configured".into()))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.auth {
            Some(auth) => request.basic_auth(&auth.username, Some(auth.password.expose_secret())),
            None => request,
        }
    }

    /// POST a JSON body and return the parsed JSON reply
    async fn post<B: Serialize + Sync>(&self, path: &str, body: &B, timeout: Duration) -> Result<Value> {
        let url = self.url(path)?;
        let on_transport = |e: reqwest::Error| {
            if e.is_timeout() {
                AdvisorError::Timeout(timeout)
            } else {
                AdvisorError::Network(e)
            }
        };

        let response = self
            .authorize(self.client.post(&url))
            .timeout(timeout)
            .json(body)
            .send()
            .await
            .map_err(on_transport)?;

        let status = response.status();
        let text = response.text().await.map_err(on_transport)?;

        if !status.is_success() {
            return Err(AdvisorError::Http {
                status: status.as_u16(),
                message: text,
            });
        }

        Ok(serde_json::from_str(&text)?)
    }

    async fn scan(&self, timeframe: Timeframe) -> Result<ScannerResult> {
        let body = ScanBody {
            timeframe,
            use_cache: true,
            max_cache_age: self.config.max_cache_age,
            min_confluence: self.config.min_confluence,
        };

        tracing::debug!(%timeframe, "Running scanner");
        let data = self.post(SCANNER_PATH, &body, self.config.scanner_timeout).await?;
        let result = ScannerResult::from_response(timeframe, data);

        let execution_time = result
            .data
            .as_ref()
            .and_then(|d| d.get("execution_time"))
            .and_then(Value::as_f64)
            .unwrap_or_default();
        if result.cached == Some(true) {
            tracing::info!(%timeframe, execution_time, cache_age = ?result.cache_age, "Scanner cache hit");
        } else {
            tracing::info!(%timeframe, execution_time, "Scanner ran fresh and cached");
        }

        Ok(result)
    }

    async fn validate(&self, request: &SignalRequest) -> Result<Value> {
        let body = ValidateBody {
            symbol: normalize_symbol(&request.symbol),
            direction: request.direction,
            entry_price: request.entry_price,
            stop_loss: request.stop_loss,
            take_profit: request.take_profit,
            timeframe: request.timeframe.as_str(),
        };

        tracing::debug!(symbol = %body.symbol, direction = %body.direction, "Validating signal");
        self.post(VALIDATOR_PATH, &body, self.config.validator_timeout).await
    }
}

#[async_trait]
impl ScannerBackend for HttpBackendClient {
    async fn run_scanner(&self, timeframe: Timeframe) -> ScannerResult {
        match self.scan(timeframe).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(%timeframe, error = %e, timeout = e.is_timeout(), "Scanner call failed");
                ScannerResult::failure(&e)
            }
        }
    }

    async fn validate_signal(&self, request: &SignalRequest) -> ValidationResult {
        match self.validate(request).await {
            Ok(data) => ValidationResult::ok(data),
            Err(e) => {
                tracing::warn!(symbol = %request.symbol, error = %e, "Signal validation failed");
                ValidationResult::failure(&e)
            }
        }
    }

    fn name(&self) -> &str {
        "HTTP"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BasicAuth;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use wiremock::matchers::{body_json, body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> HttpBackendClient {
        HttpBackendClient::new(BackendConfig::new(server.uri())).unwrap()
    }

    fn btc_long() -> SignalRequest {
        SignalRequest {
            symbol: "BTCUSDT".into(),
            direction: Direction::Long,
            entry_price: dec!(97000.5),
            stop_loss: dec!(95000),
            take_profit: dec!(101000),
            timeframe: Timeframe::H1,
        }
    }

    #[tokio::test]
    async fn test_scanner_cache_hit() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(SCANNER_PATH))
            .and(body_json(json!({"timeframe": "1h", "use_cache": true, "max_cache_age": 5})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "cached": true,
                "execution_time": 0.08,
                "cache_age_seconds": 180,
                "signals": [{"symbol": "BTC/USDT", "confluence": 72}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = client_for(&server).run_scanner(Timeframe::H1).await;

        assert!(result.success);
        assert_eq!(result.timeframe, Some(Timeframe::H1));
        assert_eq!(result.cached, Some(true));
        assert_eq!(result.cache_age.as_deref(), Some("3m"));
        assert!(result.warning.is_some());
        assert_eq!(result.data.unwrap()["signals"][0]["confluence"], json!(72));
    }

    #[tokio::test]
    async fn test_scanner_fresh_run_has_no_warning() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(SCANNER_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "cached": false,
                "execution_time": 42.0,
                "signals": []
            })))
            .mount(&server)
            .await;

        let result = client_for(&server).run_scanner(Timeframe::M15).await;

        assert!(result.success);
        assert_eq!(result.cached, Some(false));
        assert_eq!(result.cache_age.as_deref(), Some("0s"));
        assert!(result.warning.is_none());
    }

    #[tokio::test]
    async fn test_scanner_sends_min_confluence() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(SCANNER_PATH))
            .and(body_json(json!({
                "timeframe": "4h",
                "use_cache": true,
                "max_cache_age": 10,
                "min_confluence": 65.0
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"cached": false})))
            .expect(1)
            .mount(&server)
            .await;

        let mut config = BackendConfig::new(server.uri());
        config.max_cache_age = 10;
        config.min_confluence = Some(65.0);
        let client = HttpBackendClient::new(config).unwrap();

        assert!(client.run_scanner(Timeframe::H4).await.success);
    }

    #[tokio::test]
    async fn test_scanner_timeout_is_flagged() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(SCANNER_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"cached": false}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let mut config = BackendConfig::new(server.uri());
        config.scanner_timeout = Duration::from_millis(100);
        let client = HttpBackendClient::new(config).unwrap();

        let result = client.run_scanner(Timeframe::H1).await;

        assert!(!result.success);
        assert_eq!(result.timeout, Some(true));
        assert!(result.error.unwrap().contains("timed out"));
    }

    #[tokio::test]
    async fn test_scanner_http_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(SCANNER_PATH))
            .respond_with(ResponseTemplate::new(503).set_body_string("scanner busy"))
            .mount(&server)
            .await;

        let result = client_for(&server).run_scanner(Timeframe::M30).await;

        assert!(!result.success);
        assert!(result.timeout.is_none());
        assert_eq!(result.error.as_deref(), Some("Backend returned 503: scanner busy"));
    }

    #[tokio::test]
    async fn test_unreachable_backend() {
        let client = HttpBackendClient::new(BackendConfig::new("http://127.0.0.1:1")).unwrap();

        let result = client.run_scanner(Timeframe::H1).await;

        assert!(!result.success);
        assert!(result.timeout.is_none());
        assert!(result.error.unwrap().starts_with("Network error"));
    }

    #[tokio::test]
    async fn test_missing_url_fails_without_network() {
        let client = HttpBackendClient::new(BackendConfig::default()).unwrap();

        let scan = client.run_scanner(Timeframe::H1).await;
        let validation = client.validate_signal(&btc_long()).await;

        let expected = Some("Configuration error: Backend URL not configured");
        assert_eq!(scan.error.as_deref(), expected);
        assert_eq!(validation.error.as_deref(), expected);
        assert!(!scan.success && !validation.success);
    }

    #[tokio::test]
    async fn test_validate_normalizes_symbol() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(VALIDATOR_PATH))
            .and(body_json(json!({
                "symbol": "BTC/USDT",
                "direction": "LONG",
                "entry_price": 97000.5,
                "stop_loss": 95000.0,
                "take_profit": 101000.0,
                "timeframe": "1h"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "valid": true,
                "score": 78,
                "risk_reward": 2.0
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = client_for(&server).validate_signal(&btc_long()).await;

        assert!(result.success);
        assert_eq!(result.data.unwrap()["score"], json!(78));
    }

    #[tokio::test]
    async fn test_validate_http_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(VALIDATOR_PATH))
            .respond_with(ResponseTemplate::new(422).set_body_string("unknown pair"))
            .mount(&server)
            .await;

        let result = client_for(&server).validate_signal(&btc_long()).await;

        assert!(!result.success);
        assert!(result.error.unwrap().contains("422"));
    }

    #[tokio::test]
    async fn test_basic_auth_sent_to_both_endpoints() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(header("authorization", "Basic dXNlcjpwYXNz"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"cached": false})))
            .expect(2)
            .mount(&server)
            .await;

        let config = BackendConfig::new(server.uri()).with_auth(BasicAuth::new("user", "pass"));
        let client = HttpBackendClient::new(config).unwrap();

        assert!(client.run_scanner(Timeframe::H1).await.success);
        assert!(client.validate_signal(&btc_long()).await.success);
    }

    #[tokio::test]
    async fn test_partial_body_keeps_timeframe() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(VALIDATOR_PATH))
            .and(body_partial_json(json!({"symbol": "PEPE/USDT", "direction": "SHORT", "timeframe": "15m"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"valid": false})))
            .expect(1)
            .mount(&server)
            .await;

        let request = SignalRequest {
            symbol: "PEPEUSDT".into(),
            direction: Direction::Short,
            timeframe: Timeframe::M15,
            ..btc_long()
        };

        assert!(client_for(&server).validate_signal(&request).await.success);
    }
}

//! Mock Backend
//!
//! For tests and demos. Serves canned results and records every call.

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::Mutex;

use super::ScannerBackend;
use crate::model::{ScannerResult, SignalRequest, Timeframe, ValidationResult};

/// A call received by the mock
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BackendCall {
    Scanner(Timeframe),
    Validate(SignalRequest),
}

/// Backend with canned replies
#[derive(Default)]
pub struct MockBackend {
    scanner: Option<ScannerResult>,
    validation: Option<ValidationResult>,
    calls: Mutex<Vec<BackendCall>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply to every scan with `result`
    #[must_use]
    pub fn with_scanner_result(mut self, result: ScannerResult) -> Self {
        self.scanner = Some(result);
        self
    }

    /// Reply to every validation with `result`
    #[must_use]
    pub fn with_validation_result(mut self, result: ValidationResult) -> Self {
        self.validation = Some(result);
        self
    }

    /// Calls received so far
    pub async fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().await.clone()
    }

    fn demo_scan(timeframe: Timeframe) -> ScannerResult {
        ScannerResult::from_response(
            timeframe,
            json!({
                "cached": false,
                "execution_time": 0.0,
                "signals": [
                    {
                        "symbol": "BTC/USDT",
                        "direction": "LONG",
                        "confluence": 74,
                        "price": 97500.0,
                        "stop_loss": 95800.0,
                        "take_profit": 101200.0
                    },
                    {
                        "symbol": "SOL/USDT",
                        "direction": "SHORT",
                        "confluence": 68,
                        "price": 195.4,
                        "stop_loss": 201.0,
                        "take_profit": 184.0
                    }
                ]
            }),
        )
    }

    fn demo_validation(request: &SignalRequest) -> ValidationResult {
        ValidationResult::ok(json!({
            "symbol": crate::symbol::normalize_symbol(&request.symbol),
            "direction": request.direction,
            "valid": true,
            "score": 70
        }))
    }
}

#[async_trait]
impl ScannerBackend for MockBackend {
    async fn run_scanner(&self, timeframe: Timeframe) -> ScannerResult {
        self.calls.lock().await.push(BackendCall::Scanner(timeframe));
        self.scanner
            .clone()
            .unwrap_or_else(|| Self::demo_scan(timeframe))
    }

    async fn validate_signal(&self, request: &SignalRequest) -> ValidationResult {
        self.calls.lock().await.push(BackendCall::Validate(request.clone()));
        self.validation
            .clone()
            .unwrap_or_else(|| Self::demo_validation(request))
    }

    fn name(&self) -> &str {
        "Mock"
    }
}

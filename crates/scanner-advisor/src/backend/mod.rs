//! Backend Integration
//!
//! The remote scanner and signal validator.

mod http;
mod mock;

pub use http::HttpBackendClient;
pub use mock::{BackendCall, MockBackend};

use async_trait::async_trait;

use crate::model::{ScannerResult, SignalRequest, Timeframe, ValidationResult};

/// Scanner backend
///
/// Implementations never fail: every error path is folded into a result
/// with `success: false`.
#[async_trait]
pub trait ScannerBackend: Send + Sync {
    /// Run the market scanner for a timeframe
    async fn run_scanner(&self, timeframe: Timeframe) -> ScannerResult;

    /// Validate one concrete signal
    async fn validate_signal(&self, request: &SignalRequest) -> ValidationResult;

    /// Backend name
    fn name(&self) -> &str;
}

//! Signal Validation Tool
//!
//! Checks one concrete trade idea against the validator's confluence
//! modules and backtests.

use std::sync::Arc;

use async_trait::async_trait;

use agent_core::{Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema, tool::ParameterSchema};

use crate::backend::ScannerBackend;
use crate::error::AdvisorError;
use crate::model::{Direction, SignalRequest, Timeframe};

pub const NAME: &str = "validate_signal";

/// Tool wrapping `ScannerBackend::validate_signal`
pub struct ValidateSignalTool {
    backend: Arc<dyn ScannerBackend>,
}

impl ValidateSignalTool {
    pub fn new(backend: Arc<dyn ScannerBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Tool for ValidateSignalTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: NAME.into(),
            description: "Validate a specific trading signal with the confluence modules and \
                backtesting. Use only when the user asks to validate a concrete signal."
                .into(),
            parameters: vec![
                ParameterSchema::new("symbol", "string", "Trading pair (e.g. BTCUSDT, no slash or dash)")
                    .required(),
                ParameterSchema::new("direction", "string", "Signal direction")
                    .required()
                    .one_of(Direction::ALL.map(Direction::as_str)),
                ParameterSchema::new("entry_price", "number", "Proposed entry price").required(),
                ParameterSchema::new("stop_loss", "number", "Stop loss price").required(),
                ParameterSchema::new("take_profit", "number", "Take profit price").required(),
                ParameterSchema::new("timeframe", "string", "Signal timeframe")
                    .one_of(Timeframe::ALL.map(Timeframe::as_str)),
            ],
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let request: SignalRequest = match serde_json::from_value(call.arguments.clone()) {
            Ok(request) => request,
            Err(e) => {
                let error = AdvisorError::InvalidArguments(e.to_string());
                return Ok(ToolResult::failure(NAME, error.to_string()));
            }
        };

        let result = self.backend.validate_signal(&request).await;
        Ok(ToolResult::from_payload(NAME, serde_json::to_value(result)?))
    }
}

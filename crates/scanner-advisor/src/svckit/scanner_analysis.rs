//! Scanner Analysis Tool
//!
//! Runs the cached market scanner for one timeframe.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use agent_core::{Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema, tool::ParameterSchema};

use crate::backend::ScannerBackend;
use crate::model::Timeframe;

pub const NAME: &str = "get_scanner_analysis";

/// Tool wrapping `ScannerBackend::run_scanner`
pub struct ScannerAnalysisTool {
    backend: Arc<dyn ScannerBackend>,
}

impl ScannerAnalysisTool {
    pub fn new(backend: Arc<dyn ScannerBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Tool for ScannerAnalysisTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: NAME.into(),
            description: "Run the market signal scanner on the backend with cache acceleration \
                (usually answers in under a second). Returns the best current opportunities with \
                confluence scores, current price, and suggested stop loss and take profit. \
                Call this FIRST to get real market data."
                .into(),
            parameters: vec![
                ParameterSchema::new("timeframe", "string", "Scanner timeframe")
                    .required()
                    .one_of(Timeframe::ALL.map(Timeframe::as_str)),
            ],
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let timeframe = match call.arguments.get("timeframe") {
            None | Some(Value::Null) => Timeframe::default(),
            Some(Value::String(s)) => match s.parse::<Timeframe>() {
                Ok(tf) => tf,
                Err(e) => return Ok(ToolResult::failure(NAME, e.to_string())),
            },
            Some(other) => {
                return Ok(ToolResult::failure(
                    NAME,
                    format!("Invalid arguments: timeframe must be a string, got {other}"),
                ));
            }
        };

        let result = self.backend.run_scanner(timeframe).await;
        Ok(ToolResult::from_payload(NAME, serde_json::to_value(result)?))
    }
}

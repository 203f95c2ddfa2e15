//! # scanner-advisor
//!
//! Market-scanner tools for the conversational trading assistant.
//!
//! ## Flow
//!
//! ```text
//! ┌──────────┐   tool call    ┌──────────────────────┐   HTTP    ┌───────────────┐
//! │  Agent   │───────────────▶│ get_scanner_analysis │──────────▶│   Scanner     │
//! │  loop    │                │ validate_signal      │           │   backend     │
//! │          │◀───────────────│                      │◀──────────│ (cached run)  │
//! └──────────┘ {success, ...} └──────────────────────┘           └───────────────┘
//! ```
//!
//! Backend failures never escape as errors. They come back as
//! `{success: false, error, timeout?}` payloads so the model can explain
//! them to the user. Cached scanner output carries a staleness `warning`
//! scaled to the timeframe.

pub mod backend;
pub mod config;
pub mod error;
pub mod model;
pub mod prompts;
pub mod staleness;
pub mod svckit;
pub mod symbol;

use std::sync::Arc;

use agent_core::ToolRegistry;

pub use backend::{HttpBackendClient, MockBackend, ScannerBackend};
pub use config::{BackendConfig, BasicAuth};
pub use error::{AdvisorError, Result};
pub use model::{Direction, ScannerResult, SignalRequest, Timeframe, ValidationResult};
pub use prompts::{ADVISOR_PROMPT, DAILY_PLAN_PROMPT, PLAN_PROMPT, scan_prompt};
pub use symbol::normalize_symbol;

/// Re-export tools for easy registration
pub mod tools {
    pub use crate::svckit::{ScannerAnalysisTool, ValidateSignalTool};
}

/// Registry with both backend tools, scanner first
pub fn scanner_tools(backend: Arc<dyn ScannerBackend>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(tools::ScannerAnalysisTool::new(Arc::clone(&backend)));
    registry.register(tools::ValidateSignalTool::new(backend));
    registry
}

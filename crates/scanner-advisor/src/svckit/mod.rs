//! Service Kit - Agent Tools
//!
//! Tools that expose the scanner backend to the model through
//! `agent_core::Tool`.

mod scanner_analysis;
mod validate_signal;

pub use scanner_analysis::ScannerAnalysisTool;
pub use validate_signal::ValidateSignalTool;

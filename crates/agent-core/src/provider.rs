//! LLM Provider Strategy Pattern
//!
//! Defines the interface the reasoning loop uses to obtain one model turn.
//! A provider receives the system instruction, the ordered history and the
//! tool declarations, and answers with a turn made of content blocks.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_core::provider::{CompletionRequest, GenerationOptions, LlmProvider};
//!
//! let provider = AnthropicProvider::from_env()?;
//! let completion = provider.complete(&CompletionRequest {
//!     system: "You are helpful.",
//!     messages: &history,
//!     tools: &registry.schemas(),
//!     options: &GenerationOptions::default(),
//! }).await?;
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::message::{ContentBlock, Message};
use crate::tool::{ToolCall, ToolSchema};

/// Default model identifier
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// Configuration for LLM generation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Model identifier
    pub model: String,

    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Temperature for sampling; provider default when unset
    #[serde(default)]
    pub temperature: Option<f32>,
}

const fn default_max_tokens() -> u32 {
    4096
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.into(),
            max_tokens: default_max_tokens(),
            temperature: None,
        }
    }
}

/// Everything a provider needs for one model call
#[derive(Clone, Copy, Debug)]
pub struct CompletionRequest<'a> {
    /// Fixed system instruction
    pub system: &'a str,

    /// Ordered conversation history
    pub messages: &'a [Message],

    /// Tool declarations
    pub tools: &'a [ToolSchema],

    /// Generation options
    pub options: &'a GenerationOptions,
}

/// Token usage statistics
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Why the model stopped generating
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    EndTurn,
    ToolUse,
    MaxTokens,
    StopSequence,
    #[serde(other)]
    Other,
}

/// One model turn
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Completion {
    /// Content blocks, in the order the model produced them
    pub content: Vec<ContentBlock>,

    /// Model that generated this response
    pub model: String,

    /// Stop reason reported by the provider
    pub stop_reason: Option<StopReason>,

    /// Token usage statistics (if available)
    pub usage: Option<TokenUsage>,
}

/// Classification of a model turn
#[derive(Clone, Debug, PartialEq)]
pub enum TurnKind {
    /// The model asked for one or more tools
    ToolRequested(Vec<ToolCall>),
    /// The model answered; the concatenated text
    Final(String),
}

impl Completion {
    /// Completion holding a single text block
    pub fn text(model: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::text(text)],
            model: model.into(),
            stop_reason: Some(StopReason::EndTurn),
            usage: None,
        }
    }

    /// Completion requesting the given tool calls
    pub fn tool_calls(model: impl Into<String>, calls: Vec<ToolCall>) -> Self {
        Self {
            content: calls
                .into_iter()
                .map(|c| ContentBlock::tool_use(c.id, c.name, c.arguments))
                .collect(),
            model: model.into(),
            stop_reason: Some(StopReason::ToolUse),
            usage: None,
        }
    }

    /// Classify the turn
    ///
    /// Any tool-use block makes the turn `ToolRequested`, because the next
    /// submission has to answer every invocation the history contains.
    pub fn kind(&self) -> TurnKind {
        let calls = ToolCall::from_blocks(&self.content);
        if !calls.is_empty() {
            return TurnKind::ToolRequested(calls);
        }

        if self.stop_reason == Some(StopReason::ToolUse) {
            tracing::warn!(model = %self.model, "tool_use stop reason without tool blocks");
        }

        let text = self
            .content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                ContentBlock::ToolUse { .. } | ContentBlock::ToolResult { .. } => None,
            })
            .collect();
        TurnKind::Final(text)
    }
}

/// Strategy trait for LLM providers
///
/// Implement this trait to add support for new LLM backends.
/// The agent works exclusively through this interface.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name for logs and health output
    fn name(&self) -> &str;

    /// Produce one model turn
    async fn complete(&self, request: &CompletionRequest<'_>) -> Result<Completion>;
}

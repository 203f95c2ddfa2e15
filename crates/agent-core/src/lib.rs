//! # agent-core
//!
//! Core agent logic: provider-agnostic LLM abstraction, tool registry and the
//! tool-calling loop that turns a user message into a final answer.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Agent                                 │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────┐  │
//! │  │  Reasoning  │  │    Tools    │  │   LlmProvider       │  │
//! │  │    Loop     │──│   Registry  │──│   (Strategy)        │  │
//! │  └──────┬──────┘  └─────────────┘  └─────────────────────┘  │
//! │         │                                                    │
//! │  ┌──────┴──────────────────────┐                             │
//! │  │ SessionStore + SessionLocks │  one history per identity   │
//! │  └─────────────────────────────┘                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Callers use [`Agent::exchange`] with an identity and a message, or
//! [`Agent::ask`] for a one-shot answer with an empty history.

pub mod error;
pub mod message;
pub mod mock;
pub mod provider;
pub mod reasoning;
pub mod session;
pub mod tool;

pub use error::{AgentError, Result};
pub use message::{Content, ContentBlock, Conversation, Message, Role};
pub use provider::{Completion, CompletionRequest, GenerationOptions, LlmProvider, StopReason, TurnKind};
pub use reasoning::{Agent, AgentBuilder, AgentConfig};
pub use session::{MemorySessionStore, Session, SessionId, SessionStore};
pub use tool::{Tool, ToolCall, ToolRegistry, ToolResult, ToolSchema};

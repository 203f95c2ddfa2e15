//! Scripted Provider
//!
//! For tests and demos. Replays a fixed queue of turns and records every
//! request it receives.

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::{AgentError, Result};
use crate::message::Message;
use crate::provider::{Completion, CompletionRequest, LlmProvider};

/// Snapshot of one model call
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub system: String,
    pub messages: Vec<Message>,
    pub tool_names: Vec<String>,
}

/// Provider that answers from a script
#[derive(Default)]
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Result<Completion>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedProvider {
    pub fn new(turns: impl IntoIterator<Item = Completion>) -> Self {
        Self {
            script: Mutex::new(turns.into_iter().map(Ok).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a turn
    pub async fn push(&self, turn: Completion) {
        self.script.lock().await.push_back(Ok(turn));
    }

    /// Queue a transport failure
    pub async fn push_error(&self, error: AgentError) {
        self.script.lock().await.push_back(Err(error));
    }

    /// Requests received so far
    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "Scripted"
    }

    async fn complete(&self, request: &CompletionRequest<'_>) -> Result<Completion> {
        self.requests.lock().await.push(RecordedRequest {
            system: request.system.to_string(),
            messages: request.messages.to_vec(),
            tool_names: request.tools.iter().map(|t| t.name.clone()).collect(),
        });

        self.script
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Err(AgentError::ProviderUnavailable("script exhausted".into())))
    }
}

//! Reasoning Loop
//!
//! Drives the tool-calling exchange with the model:
//!
//! ```text
//!  user text ──▶ AWAITING_MODEL ──final──▶ answer
//!                   ▲      │
//!                   │   tool_requested
//!                   │      ▼
//!                 DISPATCHING_TOOLS
//! ```
//!
//! Every round submits the full history. A tool round appends the assistant
//! turn and one user turn holding all results, correlated by id and in
//! request order. The number of model calls per exchange is bounded.

use std::sync::Arc;
use std::time::Duration;

use crate::error::{AgentError, Result};
use crate::message::Message;
use crate::provider::{CompletionRequest, GenerationOptions, LlmProvider, TurnKind};
use crate::session::{MemorySessionStore, SessionId, SessionLocks, SessionStore};
use crate::tool::{Tool, ToolCall, ToolRegistry, ToolResult};

/// Default bound on model calls per exchange
pub const DEFAULT_MAX_ROUNDS: usize = 8;

/// Agent configuration
#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// Fixed system instruction
    pub system_prompt: String,

    /// Maximum model calls per exchange
    pub max_rounds: usize,

    /// Generation options
    pub generation: GenerationOptions,

    /// Deadline for a whole exchange
    pub exchange_timeout: Option<Duration>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.into(),
            max_rounds: DEFAULT_MAX_ROUNDS,
            generation: GenerationOptions::default(),
            exchange_timeout: None,
        }
    }
}

const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant. Use the available tools when \
you need real data, and never invent tool results.";

/// The main Agent struct
pub struct Agent {
    provider: Arc<dyn LlmProvider>,
    tools: Arc<ToolRegistry>,
    store: Arc<dyn SessionStore>,
    locks: SessionLocks,
    config: AgentConfig,
}

impl Agent {
    /// Create a new agent
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        tools: Arc<ToolRegistry>,
        store: Arc<dyn SessionStore>,
        config: AgentConfig,
    ) -> Self {
        Self {
            provider,
            tools,
            store,
            locks: SessionLocks::new(),
            config,
        }
    }

    /// Create with an in-memory store and default configuration
    pub fn with_defaults(provider: Arc<dyn LlmProvider>, tools: Arc<ToolRegistry>) -> Self {
        Self::new(
            provider,
            tools,
            Arc::new(MemorySessionStore::new()),
            AgentConfig::default(),
        )
    }

    /// Answer `text` within the identity's conversation
    ///
    /// Exchanges for the same identity run one at a time. The messages the
    /// exchange produced are committed only when it succeeds; on any error the
    /// stored history is left as it was.
    pub async fn exchange(&self, id: &SessionId, text: &str) -> Result<String> {
        let guard = self.locks.acquire(id).await;
        let outcome = self.exchange_locked(id, text).await;
        drop(guard);
        self.locks.release().await;
        outcome
    }

    async fn exchange_locked(&self, id: &SessionId, text: &str) -> Result<String> {
        let mut history = self.store.get(id)?;
        let committed = history.len();

        let answer = self.run_with_deadline(&mut history, text).await?;

        self.store.append(id, history.split_off(committed))?;
        Ok(answer)
    }

    /// One-shot answer against an empty history that is then discarded
    pub async fn ask(&self, text: &str) -> Result<String> {
        let mut history = Vec::new();
        self.run_with_deadline(&mut history, text).await
    }

    /// Clear the identity's conversation
    pub async fn reset(&self, id: &SessionId) -> Result<()> {
        let guard = self.locks.acquire(id).await;
        let outcome = self.store.reset(id);
        drop(guard);
        self.locks.release().await;
        outcome
    }

    /// Snapshot of the identity's conversation
    pub fn history(&self, id: &SessionId) -> Result<Vec<Message>> {
        self.store.get(id)
    }

    async fn run_with_deadline(&self, history: &mut Vec<Message>, text: &str) -> Result<String> {
        match self.config.exchange_timeout {
            Some(limit) => tokio::time::timeout(limit, self.run(history, text))
                .await
                .map_err(|_| AgentError::Timeout(limit))?,
            None => self.run(history, text).await,
        }
    }

    /// Run the loop on `history`, appending the user text and every turn
    pub async fn run(&self, history: &mut Vec<Message>, text: &str) -> Result<String> {
        history.push(Message::user(text));

        let schemas = self.tools.schemas();

        for round in 1..=self.config.max_rounds {
            tracing::debug!(round, messages = history.len(), "Requesting model turn");

            let completion = self
                .provider
                .complete(&CompletionRequest {
                    system: &self.config.system_prompt,
                    messages: history.as_slice(),
                    tools: &schemas,
                    options: &self.config.generation,
                })
                .await?;

            match completion.kind() {
                TurnKind::Final(answer) if answer.trim().is_empty() => {
                    tracing::warn!(round, stop_reason = ?completion.stop_reason, "Model returned an empty turn");
                    return Err(AgentError::Provider("empty model turn".into()));
                }
                TurnKind::Final(answer) => {
                    history.push(Message::assistant_blocks(completion.content));
                    return Ok(answer);
                }
                TurnKind::ToolRequested(calls) => {
                    let results = self.dispatch_all(&calls).await;
                    verify_correlation(&calls, &results)?;

                    history.push(Message::assistant_blocks(completion.content));
                    history.push(Message::tool_results(
                        results.into_iter().map(ToolResult::into_block).collect(),
                    ));
                }
            }
        }

        tracing::warn!(max_rounds = self.config.max_rounds, "Tool loop did not converge");
        Err(AgentError::MaxRounds(self.config.max_rounds))
    }

    /// Execute calls sequentially, one result per call in request order
    async fn dispatch_all(&self, calls: &[ToolCall]) -> Vec<ToolResult> {
        let mut results = Vec::with_capacity(calls.len());
        for call in calls {
            tracing::debug!(tool = %call.name, id = %call.id, "Executing tool");
            let result = self.tools.dispatch(call).await;
            tracing::debug!(tool = %call.name, id = %call.id, success = result.success, "Tool finished");
            results.push(result);
        }
        results
    }

    /// Get the tool registry
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Get configuration
    pub const fn config(&self) -> &AgentConfig {
        &self.config
    }
}

/// Results must answer the calls one-to-one, by id and in order
pub fn verify_correlation(calls: &[ToolCall], results: &[ToolResult]) -> Result<()> {
    if calls.len() != results.len() {
        return Err(AgentError::Protocol(format!(
            "{} tool calls answered by {} results",
            calls.len(),
            results.len()
        )));
    }

    for (call, result) in calls.iter().zip(results) {
        if call.id != result.id {
            return Err(AgentError::Protocol(format!(
                "result '{}' does not answer call '{}'",
                result.id, call.id
            )));
        }
    }

    Ok(())
}

/// Builder for Agent configuration
pub struct AgentBuilder {
    provider: Option<Arc<dyn LlmProvider>>,
    tools: ToolRegistry,
    store: Option<Arc<dyn SessionStore>>,
    config: AgentConfig,
}

impl Default for AgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            tools: ToolRegistry::new(),
            store: None,
            config: AgentConfig::default(),
        }
    }

    #[must_use]
    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    #[must_use]
    pub fn tool<T: Tool + 'static>(mut self, tool: T) -> Self {
        self.tools.register(tool);
        self
    }

    #[must_use]
    pub fn tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    #[must_use]
    pub fn store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.store = Some(store);
        self
    }

    #[must_use]
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = prompt.into();
        self
    }

    #[must_use]
    pub fn generation(mut self, options: GenerationOptions) -> Self {
        self.config.generation = options;
        self
    }

    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.generation.model = model.into();
        self
    }

    #[must_use]
    pub const fn max_rounds(mut self, max: usize) -> Self {
        self.config.max_rounds = max;
        self
    }

    #[must_use]
    pub const fn exchange_timeout(mut self, limit: Duration) -> Self {
        self.config.exchange_timeout = Some(limit);
        self
    }

    pub fn build(self) -> Result<Agent> {
        let provider = self
            .provider
            .ok_or_else(|| AgentError::Config("Provider is required".into()))?;

        if self.config.max_rounds == 0 {
            return Err(AgentError::Config("max_rounds must be at least 1".into()));
        }

        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemorySessionStore::new()));

        Ok(Agent::new(provider, Arc::new(self.tools), store, self.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{ContentBlock, Role};
    use crate::mock::ScriptedProvider;
    use crate::provider::{Completion, StopReason};
    use crate::tool::{ParameterSchema, ToolSchema};
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Tool answering every call with a fixed payload
    struct StaticTool {
        name: &'static str,
        payload: Value,
    }

    #[async_trait]
    impl Tool for StaticTool {
        fn schema(&self) -> ToolSchema {
            ToolSchema {
                name: self.name.into(),
                description: "test tool".into(),
                parameters: vec![ParameterSchema::new("timeframe", "string", "tf").required()],
            }
        }

        async fn execute(&self, _call: &ToolCall) -> Result<ToolResult> {
            Ok(ToolResult::from_payload(self.name, self.payload.clone()))
        }
    }

    fn scanner_tool(payload: Value) -> StaticTool {
        StaticTool {
            name: "get_scanner_analysis",
            payload,
        }
    }

    fn scan_call(id: &str) -> ToolCall {
        ToolCall::new(id, "get_scanner_analysis", json!({"timeframe": "1h"}))
    }

    fn agent_with(provider: Arc<ScriptedProvider>, tool: StaticTool) -> Agent {
        AgentBuilder::new()
            .provider(provider)
            .tool(tool)
            .system_prompt("sys")
            .build()
            .unwrap()
    }

    /// Payload of the tool-result blocks of a message
    fn result_payloads(message: &Message) -> Vec<Value> {
        message
            .content
            .blocks()
            .into_iter()
            .filter_map(|block| match block {
                ContentBlock::ToolResult { content, .. } => serde_json::from_str(&content).ok(),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_tool_round_then_final() {
        let provider = Arc::new(ScriptedProvider::new([
            Completion::tool_calls("m", vec![scan_call("toolu_1")]),
            Completion::text("m", "Done"),
        ]));
        let agent = agent_with(
            Arc::clone(&provider),
            scanner_tool(json!({"success": true, "cached": true, "cache_age": "3m"})),
        );
        let id = SessionId::from_string("u1");

        let answer = agent.exchange(&id, "scan 1h").await.unwrap();

        assert_eq!(answer, "Done");
        let history = agent.history(&id).unwrap();
        assert_eq!(history.len(), 4);
        let roles: Vec<_> = history.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant, Role::User, Role::Assistant]);
        assert_eq!(history[1].content.tool_use_ids(), vec!["toolu_1"]);
        assert_eq!(history[2].content.tool_result_ids(), vec!["toolu_1"]);

        let requests = provider.requests().await;
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].system, "sys");
        assert_eq!(requests[0].tool_names, vec!["get_scanner_analysis"]);
        assert_eq!(requests[1].messages.len(), 3);
        assert_eq!(result_payloads(&requests[1].messages[2])[0]["cache_age"], "3m");
    }

    #[tokio::test]
    async fn test_timeout_result_is_not_fatal() {
        let provider = Arc::new(ScriptedProvider::new([
            Completion::tool_calls("m", vec![scan_call("toolu_1")]),
            Completion::text("m", "The scanner timed out, try 4h."),
        ]));
        let agent = agent_with(
            Arc::clone(&provider),
            scanner_tool(json!({"success": false, "error": "timed out", "timeout": true})),
        );

        let answer = agent
            .exchange(&SessionId::from_string("u1"), "scan")
            .await
            .unwrap();

        assert!(answer.contains("timed out"));
        let requests = provider.requests().await;
        let payload = &result_payloads(&requests[1].messages[2])[0];
        assert_eq!(payload["timeout"], true);
        assert_eq!(payload["success"], false);
    }

    #[tokio::test]
    async fn test_unknown_tool_continues() {
        let provider = Arc::new(ScriptedProvider::new([
            Completion::tool_calls("m", vec![ToolCall::new("toolu_x", "foo", json!({}))]),
            Completion::text("m", "Sorry, that tool does not exist."),
        ]));
        let agent = agent_with(Arc::clone(&provider), scanner_tool(json!({"success": true})));

        let answer = agent.ask("use foo").await.unwrap();

        assert_eq!(answer, "Sorry, that tool does not exist.");
        let requests = provider.requests().await;
        let payloads = result_payloads(&requests[1].messages[2]);
        assert_eq!(payloads, vec![json!({"success": false, "error": "Unknown tool: foo"})]);
    }

    #[tokio::test]
    async fn test_results_follow_request_order() {
        let provider = Arc::new(ScriptedProvider::new([
            Completion::tool_calls(
                "m",
                vec![
                    scan_call("a"),
                    ToolCall::new("b", "foo", json!({})),
                    scan_call("c"),
                ],
            ),
            Completion::text("m", "ok"),
        ]));
        let agent = agent_with(Arc::clone(&provider), scanner_tool(json!({"success": true})));

        agent.ask("go").await.unwrap();

        let requests = provider.requests().await;
        assert_eq!(requests[1].messages[2].content.tool_result_ids(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_max_rounds_leaves_history_untouched() {
        let provider = Arc::new(ScriptedProvider::new(
            (0..3).map(|i| Completion::tool_calls("m", vec![scan_call(&format!("t{i}"))])),
        ));
        let agent = AgentBuilder::new()
            .provider(provider)
            .tool(scanner_tool(json!({"success": true})))
            .max_rounds(3)
            .build()
            .unwrap();
        let id = SessionId::from_string("u1");

        let err = agent.exchange(&id, "loop forever").await.unwrap_err();

        assert!(matches!(err, AgentError::MaxRounds(3)));
        assert!(agent.history(&id).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_provider_failure_propagates_without_partial_turns() {
        let provider = Arc::new(ScriptedProvider::new([
            Completion::text("m", "first answer"),
            Completion::tool_calls("m", vec![scan_call("t1")]),
        ]));
        provider
            .push_error(AgentError::ProviderUnavailable("connection reset".into()))
            .await;
        let agent = agent_with(Arc::clone(&provider), scanner_tool(json!({"success": true})));
        let id = SessionId::from_string("u1");

        agent.exchange(&id, "hello").await.unwrap();
        let err = agent.exchange(&id, "scan").await.unwrap_err();

        assert!(matches!(err, AgentError::ProviderUnavailable(_)));
        let history = agent.history(&id).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].text(), "first answer");
    }

    #[tokio::test]
    async fn test_empty_final_turn_is_not_committed() {
        let provider = Arc::new(ScriptedProvider::new([
            Completion {
                content: vec![],
                model: "m".into(),
                stop_reason: Some(StopReason::EndTurn),
                usage: None,
            },
            Completion::text("m", "   "),
            Completion::text("m", "recovered"),
        ]));
        let agent = agent_with(Arc::clone(&provider), scanner_tool(json!({})));
        let id = SessionId::from_string("u1");

        let err = agent.exchange(&id, "hello").await.unwrap_err();
        assert!(matches!(err, AgentError::Provider(_)));
        assert!(agent.history(&id).unwrap().is_empty());

        assert!(agent.exchange(&id, "hello").await.is_err());
        assert!(agent.history(&id).unwrap().is_empty());

        assert_eq!(agent.exchange(&id, "hello again").await.unwrap(), "recovered");
        let sent = &provider.requests().await[2].messages;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].text(), "hello again");
        assert_eq!(agent.history(&id).unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_ask_does_not_touch_sessions() {
        let provider = Arc::new(ScriptedProvider::new([Completion::text("m", "plan")]));
        let store = Arc::new(MemorySessionStore::new());
        let agent = AgentBuilder::new()
            .provider(Arc::clone(&provider) as Arc<dyn LlmProvider>)
            .store(Arc::clone(&store) as Arc<dyn SessionStore>)
            .build()
            .unwrap();

        assert_eq!(agent.ask("daily plan").await.unwrap(), "plan");
        assert_eq!(store.len().unwrap(), 0);
        assert_eq!(provider.requests().await[0].messages.len(), 1);
    }

    #[tokio::test]
    async fn test_history_carries_into_next_exchange() {
        let provider = Arc::new(ScriptedProvider::new([
            Completion::text("m", "one"),
            Completion::text("m", "two"),
        ]));
        let agent = agent_with(Arc::clone(&provider), scanner_tool(json!({})));
        let id = SessionId::from_string("u1");

        agent.exchange(&id, "first").await.unwrap();
        agent.exchange(&id, "second").await.unwrap();

        let requests = provider.requests().await;
        let texts: Vec<_> = requests[1].messages.iter().map(Message::text).collect();
        assert_eq!(texts, vec!["first", "one", "second"]);

        agent.reset(&id).await.unwrap();
        assert!(agent.history(&id).unwrap().is_empty());
    }

    #[test]
    fn test_verify_correlation() {
        let calls = vec![scan_call("a"), scan_call("b")];
        let ok = vec![
            ToolResult::failure("x", "e").with_id("a"),
            ToolResult::failure("x", "e").with_id("b"),
        ];
        assert!(verify_correlation(&calls, &ok).is_ok());

        let swapped = vec![ok[1].clone(), ok[0].clone()];
        assert!(matches!(
            verify_correlation(&calls, &swapped),
            Err(AgentError::Protocol(_))
        ));
        assert!(matches!(
            verify_correlation(&calls, &ok[..1]),
            Err(AgentError::Protocol(_))
        ));
    }

    #[test]
    fn test_builder_requires_provider_and_rounds() {
        assert!(matches!(AgentBuilder::new().build(), Err(AgentError::Config(_))));

        let provider = Arc::new(ScriptedProvider::default());
        let result = AgentBuilder::new().provider(provider).max_rounds(0).build();
        assert!(matches!(result, Err(AgentError::Config(_))));
    }

    /// Stateless provider that yields between calls: a plain user message
    /// gets a tool call with a fresh id, a tool-result turn gets a final answer.
    struct SlowToolProvider {
        counter: AtomicUsize,
        delay: Duration,
    }

    #[async_trait]
    impl LlmProvider for SlowToolProvider {
        fn name(&self) -> &str {
            "slow"
        }

        async fn complete(&self, request: &CompletionRequest<'_>) -> Result<Completion> {
            tokio::time::sleep(self.delay).await;
            let last = request.messages.last().expect("history is never empty");
            if last.content.tool_result_ids().is_empty() {
                let n = self.counter.fetch_add(1, Ordering::SeqCst);
                Ok(Completion::tool_calls("slow", vec![scan_call(&format!("call-{n}"))]))
            } else {
                Ok(Completion::text("slow", "ok"))
            }
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_exchanges_same_identity() {
        let provider = Arc::new(SlowToolProvider {
            counter: AtomicUsize::new(0),
            delay: Duration::from_millis(10),
        });
        let agent = Arc::new(agent_with_provider(provider));
        let id = SessionId::from_string("shared");

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let agent = Arc::clone(&agent);
                let id = id.clone();
                tokio::spawn(async move { agent.exchange(&id, &format!("msg {i}")).await })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), "ok");
        }

        let history = agent.history(&id).unwrap();
        assert_eq!(history.len(), 16);
        for chunk in history.chunks(4) {
            assert!(chunk[0].content.tool_use_ids().is_empty());
            assert_eq!(chunk[0].role, Role::User);
            assert_eq!(chunk[1].content.tool_use_ids(), chunk[2].content.tool_result_ids());
            assert_eq!(chunk[3].text(), "ok");
        }
        assert_eq!(agent.locks.len().await, 0);
    }

    fn agent_with_provider(provider: Arc<SlowToolProvider>) -> Agent {
        AgentBuilder::new()
            .provider(provider)
            .tool(scanner_tool(json!({"success": true})))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_exchange_timeout() {
        let provider = Arc::new(SlowToolProvider {
            counter: AtomicUsize::new(0),
            delay: Duration::from_millis(500),
        });
        let agent = AgentBuilder::new()
            .provider(provider)
            .exchange_timeout(Duration::from_millis(50))
            .build()
            .unwrap();
        let id = SessionId::from_string("u1");

        let err = agent.exchange(&id, "hi").await.unwrap_err();

        assert!(matches!(err, AgentError::Timeout(limit) if limit == Duration::from_millis(50)));
        assert!(err.to_string().ends_with("50ms"));
        assert!(agent.history(&id).unwrap().is_empty());
        assert_eq!(agent.locks.len().await, 0);
    }
}

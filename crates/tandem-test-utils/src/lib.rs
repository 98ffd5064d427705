//! Shared test doubles and state fixtures for the Tandem crates.

use std::collections::VecDeque;
use std::sync::Mutex;

use futures::future::BoxFuture;
use futures::stream::BoxStream;
use futures::StreamExt;

use tandem_core::config::ModelConfig;
use tandem_core::error::{Result, TandemError};
use tandem_core::state::{AgentState, Step};
use tandem_core::traits::LlmClient;
use tandem_core::types::{
    ChatMessage, StopReason, StreamDelta, ToolChoice, ToolDefinition,
};

/// Everything a node sent to the model on one call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub messages: Vec<ChatMessage>,
    pub tools: Vec<ToolDefinition>,
    pub tool_choice: ToolChoice,
}

enum ScriptedReply {
    Deltas(Vec<StreamDelta>),
    Error(String),
}

/// Scripted LLM client.
///
/// Replies are consumed in order, one per call; a call past the end of the
/// script fails loudly. Every call is recorded for assertions.
pub struct MockLlmClient {
    replies: Mutex<VecDeque<ScriptedReply>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockLlmClient {
    fn with_script(replies: Vec<ScriptedReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// One plain-text reply.
    pub fn text_reply(text: impl Into<String>) -> Self {
        Self::with_script(vec![ScriptedReply::Deltas(vec![
            StreamDelta::TextDelta(text.into()),
            StreamDelta::Stop(StopReason::EndTurn),
        ])])
    }

    /// One reply carrying a single tool call, its input streamed in two
    /// JSON fragments the way real providers deliver it.
    pub fn tool_reply(id: impl Into<String>, name: impl Into<String>, input: serde_json::Value) -> Self {
        let json = input.to_string();
        let mut mid = json.len() / 2;
        while !json.is_char_boundary(mid) {
            mid += 1;
        }
        let (head, tail) = json.split_at(mid);
        Self::with_script(vec![ScriptedReply::Deltas(vec![
            StreamDelta::ToolUseStart {
                index: 0,
                id: id.into(),
                name: name.into(),
            },
            StreamDelta::ToolInputDelta {
                index: 0,
                delta: head.to_string(),
            },
            StreamDelta::ToolInputDelta {
                index: 0,
                delta: tail.to_string(),
            },
            StreamDelta::Stop(StopReason::ToolUse),
        ])])
    }

    /// A client whose next call fails at request time.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_script(vec![ScriptedReply::Error(message.into())])
    }

    /// Queue another scripted text reply after the existing ones.
    pub fn then_text_reply(self, text: impl Into<String>) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(ScriptedReply::Deltas(vec![
                StreamDelta::TextDelta(text.into()),
                StreamDelta::Stop(StopReason::EndTurn),
            ]));
        self
    }

    /// All calls made so far.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// The most recent call, if any.
    pub fn last_call(&self) -> Option<RecordedCall> {
        self.calls.lock().unwrap().last().cloned()
    }
}

impl LlmClient for MockLlmClient {
    fn chat_stream(
        &self,
        _config: &ModelConfig,
        messages: Vec<ChatMessage>,
        tools: &[ToolDefinition],
        tool_choice: ToolChoice,
    ) -> BoxFuture<'_, Result<BoxStream<'_, Result<StreamDelta>>>> {
        self.calls.lock().unwrap().push(RecordedCall {
            messages,
            tools: tools.to_vec(),
            tool_choice,
        });

        let reply = self.replies.lock().unwrap().pop_front();
        Box::pin(async move {
            match reply {
                Some(ScriptedReply::Deltas(deltas)) => {
                    let stream = futures::stream::iter(deltas.into_iter().map(Ok));
                    Ok(stream.boxed() as BoxStream<'_, Result<StreamDelta>>)
                }
                Some(ScriptedReply::Error(message)) => Err(TandemError::LlmRequest(message)),
                None => Err(TandemError::LlmRequest(
                    "mock script exhausted: unexpected extra call".into(),
                )),
            }
        })
    }
}

/// A state with one pending search step (raw results attached) and the
/// user's original query as the first message.
pub fn search_state() -> AgentState {
    let mut state = AgentState::default();
    state
        .messages
        .push(ChatMessage::user("When did Rust 1.0 ship?"));
    let mut step = Step::search("s1", "Search for the Rust 1.0 release date");
    step.search_result = Some(
        "Rust 1.0 was released on May 15, 2015. https://blog.rust-lang.org/2015/05/15/Rust-1.0.html"
            .to_string(),
    );
    state.steps.push(step);
    state
}

/// A short running conversation with no steps.
pub fn conversation_state() -> AgentState {
    let mut state = AgentState::default();
    state.messages.push(ChatMessage::user("hello"));
    state
        .messages
        .push(ChatMessage::assistant_text("Hi! What should I translate?"));
    state
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_records_and_replies() {
        let mock = MockLlmClient::text_reply("hola");
        let stream = mock
            .chat_stream(
                &ModelConfig::openai_default(),
                vec![ChatMessage::user("hello")],
                &[],
                ToolChoice::Auto,
            )
            .await
            .unwrap();

        let deltas: Vec<_> = stream.collect().await;
        assert_eq!(deltas.len(), 2);
        assert_eq!(mock.calls().len(), 1);
        assert_eq!(mock.last_call().unwrap().messages[0].text(), "hello");
    }

    #[tokio::test]
    async fn test_mock_exhaustion_errors() {
        let mock = MockLlmClient::text_reply("once");
        let _ = mock
            .chat_stream(&ModelConfig::openai_default(), vec![], &[], ToolChoice::Auto)
            .await
            .unwrap();
        let second = mock
            .chat_stream(&ModelConfig::openai_default(), vec![], &[], ToolChoice::Auto)
            .await;
        assert!(second.is_err());
    }
}

use futures::future::BoxFuture;
use futures::stream::BoxStream;

use crate::config::ModelConfig;
use crate::error::Result;
use crate::types::{ChatMessage, StreamDelta, ToolChoice, ToolDefinition};

/// Streaming LLM client, implemented per provider.
///
/// One request, one delta stream. Cancellation and timeouts belong to the
/// caller; the client neither retries nor falls back to another provider.
pub trait LlmClient: Send + Sync + 'static {
    /// Send a chat request and receive a stream of deltas.
    fn chat_stream(
        &self,
        config: &ModelConfig,
        messages: Vec<ChatMessage>,
        tools: &[ToolDefinition],
        tool_choice: ToolChoice,
    ) -> BoxFuture<'_, Result<BoxStream<'_, Result<StreamDelta>>>>;
}

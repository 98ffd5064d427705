use futures::stream::BoxStream;
use futures::StreamExt;
use tracing::debug;

use tandem_core::error::{Result, TandemError};
use tandem_core::types::{ChatMessage, ContentBlock, Role, StopReason, StreamDelta};

/// A fully assembled model reply.
#[derive(Debug, Clone)]
pub struct ChatReply {
    /// Assistant message with text and tool-use blocks in emission order.
    pub message: ChatMessage,
    pub stop_reason: Option<StopReason>,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

#[derive(Debug, Default)]
struct ToolUseAccumulator {
    id: String,
    name: String,
    input_json: String,
}

/// Drain a delta stream into one reply.
///
/// The workflow nodes are single-shot: one request, one resume. This fold is
/// where streamed tool-call fragments become a complete `tool_use` block;
/// fragments that never assemble into valid JSON fail with a decode error.
pub async fn collect_response(
    mut stream: BoxStream<'_, Result<StreamDelta>>,
) -> Result<ChatReply> {
    let mut text = String::new();
    let mut tool_uses: Vec<ToolUseAccumulator> = Vec::new();
    let mut stop_reason = None;
    let mut input_tokens = 0u64;
    let mut output_tokens = 0u64;

    while let Some(delta) = stream.next().await {
        match delta? {
            StreamDelta::TextDelta(chunk) => text.push_str(&chunk),
            StreamDelta::ToolUseStart { index, id, name } => {
                while tool_uses.len() <= index {
                    tool_uses.push(ToolUseAccumulator::default());
                }
                tool_uses[index].id = id;
                tool_uses[index].name = name;
            }
            StreamDelta::ToolInputDelta { index, delta } => {
                if let Some(acc) = tool_uses.get_mut(index) {
                    acc.input_json.push_str(&delta);
                }
            }
            StreamDelta::Stop(reason) => stop_reason = Some(reason),
            StreamDelta::Usage {
                input_tokens: i,
                output_tokens: o,
            } => {
                input_tokens += i;
                output_tokens += o;
            }
            StreamDelta::MessageId(id) => debug!(message_id = %id, "Model reply started"),
        }
    }

    let mut content = Vec::new();
    if !text.is_empty() {
        content.push(ContentBlock::Text { text });
    }
    for acc in tool_uses {
        if acc.name.is_empty() {
            continue; // start frame never arrived; nothing to assemble
        }
        let input: serde_json::Value = if acc.input_json.trim().is_empty() {
            serde_json::json!({})
        } else {
            serde_json::from_str(&acc.input_json).map_err(|e| {
                TandemError::Decode(format!(
                    "tool call '{}' produced invalid JSON input: {}",
                    acc.name, e
                ))
            })?
        };
        content.push(ContentBlock::ToolUse {
            id: acc.id,
            name: acc.name,
            input,
        });
    }

    Ok(ChatReply {
        message: ChatMessage {
            role: Role::Assistant,
            content,
            timestamp: Some(chrono::Utc::now()),
        },
        stop_reason,
        input_tokens,
        output_tokens,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    fn boxed(deltas: Vec<Result<StreamDelta>>) -> BoxStream<'static, Result<StreamDelta>> {
        stream::iter(deltas).boxed()
    }

    #[tokio::test]
    async fn test_collect_text_only() {
        let reply = collect_response(boxed(vec![
            Ok(StreamDelta::TextDelta("Hel".into())),
            Ok(StreamDelta::TextDelta("lo".into())),
            Ok(StreamDelta::Stop(StopReason::EndTurn)),
        ]))
        .await
        .unwrap();

        assert_eq!(reply.message.text(), "Hello");
        assert!(reply.message.tool_uses().is_empty());
        assert_eq!(reply.stop_reason, Some(StopReason::EndTurn));
    }

    #[tokio::test]
    async fn test_collect_assembles_tool_call() {
        let reply = collect_response(boxed(vec![
            Ok(StreamDelta::ToolUseStart {
                index: 0,
                id: "call-1".into(),
                name: "Translations".into(),
            }),
            Ok(StreamDelta::ToolInputDelta {
                index: 0,
                delta: "{\"translation_es\":\"hola\",".into(),
            }),
            Ok(StreamDelta::ToolInputDelta {
                index: 0,
                delta: "\"translation_fr\":\"bonjour\",\"translation_de\":\"hallo\"}".into(),
            }),
            Ok(StreamDelta::Stop(StopReason::ToolUse)),
        ]))
        .await
        .unwrap();

        let uses = reply.message.tool_uses();
        assert_eq!(uses.len(), 1);
        let (id, name, input) = uses[0];
        assert_eq!(id, "call-1");
        assert_eq!(name, "Translations");
        assert_eq!(input["translation_de"], "hallo");
    }

    #[tokio::test]
    async fn test_collect_rejects_malformed_tool_json() {
        let result = collect_response(boxed(vec![
            Ok(StreamDelta::ToolUseStart {
                index: 0,
                id: "call-1".into(),
                name: "Translations".into(),
            }),
            Ok(StreamDelta::ToolInputDelta {
                index: 0,
                delta: "{\"translation_es\":".into(),
            }),
        ]))
        .await;

        assert!(matches!(result, Err(TandemError::Decode(_))));
    }

    #[tokio::test]
    async fn test_collect_propagates_stream_error() {
        let result = collect_response(boxed(vec![
            Ok(StreamDelta::TextDelta("partial".into())),
            Err(TandemError::LlmStream("connection reset".into())),
        ]))
        .await;

        assert!(matches!(result, Err(TandemError::LlmStream(_))));
    }

    #[tokio::test]
    async fn test_collect_sums_usage() {
        let reply = collect_response(boxed(vec![
            Ok(StreamDelta::Usage {
                input_tokens: 10,
                output_tokens: 0,
            }),
            Ok(StreamDelta::TextDelta("ok".into())),
            Ok(StreamDelta::Usage {
                input_tokens: 0,
                output_tokens: 7,
            }),
        ]))
        .await
        .unwrap();

        assert_eq!(reply.input_tokens, 10);
        assert_eq!(reply.output_tokens, 7);
    }
}

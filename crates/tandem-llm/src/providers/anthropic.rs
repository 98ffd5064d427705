use futures::future::BoxFuture;
use futures::stream::{BoxStream, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::warn;

use tandem_core::config::ModelConfig;
use tandem_core::error::{Result, TandemError};
use tandem_core::traits::LlmClient;
use tandem_core::types::*;

use crate::streaming::{SseFrame, SseStream};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

pub struct AnthropicClient {
    http: Client,
}

impl AnthropicClient {
    pub fn new() -> Self {
        Self {
            http: Client::new(),
        }
    }
}

impl Default for AnthropicClient {
    fn default() -> Self {
        Self::new()
    }
}

// Anthropic API request types
#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    messages: Vec<ApiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    stream: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ApiTool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<serde_json::Value>,
}

#[derive(Serialize)]
struct ApiMessage {
    role: String,
    content: serde_json::Value,
}

#[derive(Serialize)]
struct ApiTool {
    name: String,
    description: String,
    input_schema: serde_json::Value,
}

// Anthropic API response types
#[derive(Deserialize, Debug)]
#[serde(tag = "type")]
#[allow(dead_code)]
enum SseData {
    #[serde(rename = "message_start")]
    MessageStart { message: MessageInfo },
    #[serde(rename = "content_block_start")]
    ContentBlockStart {
        index: usize,
        content_block: ContentBlockInfo,
    },
    #[serde(rename = "content_block_delta")]
    ContentBlockDelta { index: usize, delta: DeltaInfo },
    #[serde(rename = "content_block_stop")]
    ContentBlockStop { index: usize },
    #[serde(rename = "message_delta")]
    MessageDelta {
        delta: MessageDeltaInfo,
        usage: Option<UsageInfo>,
    },
    #[serde(rename = "message_stop")]
    MessageStop {},
    #[serde(rename = "ping")]
    Ping {},
    #[serde(rename = "error")]
    Error { error: ApiError },
}

#[derive(Deserialize, Debug)]
struct MessageInfo {
    id: String,
    usage: Option<UsageInfo>,
}

#[derive(Deserialize, Debug)]
struct UsageInfo {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
}

#[derive(Deserialize, Debug)]
#[serde(tag = "type")]
#[allow(dead_code)]
enum ContentBlockInfo {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "tool_use")]
    ToolUse { id: String, name: String },
}

#[derive(Deserialize, Debug)]
#[serde(tag = "type")]
enum DeltaInfo {
    #[serde(rename = "text_delta")]
    TextDelta { text: String },
    #[serde(rename = "input_json_delta")]
    InputJsonDelta { partial_json: String },
}

#[derive(Deserialize, Debug)]
struct MessageDeltaInfo {
    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ApiError {
    message: String,
}

fn convert_messages(messages: Vec<ChatMessage>) -> (Option<String>, Vec<ApiMessage>) {
    let mut system = None;
    let mut api_msgs = Vec::new();

    for msg in messages {
        match msg.role {
            Role::System => {
                system = Some(msg.text());
            }
            Role::User => {
                api_msgs.push(ApiMessage {
                    role: "user".to_string(),
                    content: convert_content_blocks(&msg.content),
                });
            }
            Role::Assistant => {
                api_msgs.push(ApiMessage {
                    role: "assistant".to_string(),
                    content: convert_content_blocks(&msg.content),
                });
            }
            Role::Tool => {
                // Tool results are sent as user messages in Anthropic API
                api_msgs.push(ApiMessage {
                    role: "user".to_string(),
                    content: convert_content_blocks(&msg.content),
                });
            }
        }
    }

    (system, api_msgs)
}

fn convert_content_blocks(blocks: &[ContentBlock]) -> serde_json::Value {
    if blocks.len() == 1 {
        if let ContentBlock::Text { text } = &blocks[0] {
            return serde_json::Value::String(text.clone());
        }
    }

    let api_blocks: Vec<serde_json::Value> = blocks
        .iter()
        .map(|b| match b {
            ContentBlock::Text { text } => serde_json::json!({
                "type": "text",
                "text": text,
            }),
            ContentBlock::ToolUse { id, name, input } => serde_json::json!({
                "type": "tool_use",
                "id": id,
                "name": name,
                "input": input,
            }),
            ContentBlock::ToolResult {
                tool_use_id,
                content,
                is_error,
            } => serde_json::json!({
                "type": "tool_result",
                "tool_use_id": tool_use_id,
                "content": content,
                "is_error": is_error,
            }),
        })
        .collect();

    serde_json::Value::Array(api_blocks)
}

fn convert_tool_choice(choice: &ToolChoice) -> Option<serde_json::Value> {
    match choice {
        ToolChoice::Auto => None,
        ToolChoice::Required(name) => Some(serde_json::json!({
            "type": "tool",
            "name": name,
        })),
    }
}

fn parse_frame(frame: SseFrame) -> Vec<Result<StreamDelta>> {
    let parsed: std::result::Result<SseData, _> = serde_json::from_str(&frame.data);
    let data = match parsed {
        Ok(data) => data,
        Err(e) => {
            warn!(data = %frame.data, error = %e, "Failed to parse SSE data");
            return Vec::new();
        }
    };

    match data {
        SseData::MessageStart { message } => {
            let mut deltas = vec![Ok(StreamDelta::MessageId(message.id))];
            if let Some(usage) = message.usage {
                deltas.push(Ok(StreamDelta::Usage {
                    input_tokens: usage.input_tokens,
                    output_tokens: usage.output_tokens,
                }));
            }
            deltas
        }
        SseData::ContentBlockStart {
            index,
            content_block,
        } => match content_block {
            ContentBlockInfo::Text { .. } => Vec::new(),
            ContentBlockInfo::ToolUse { id, name } => {
                vec![Ok(StreamDelta::ToolUseStart { index, id, name })]
            }
        },
        SseData::ContentBlockDelta { index, delta } => match delta {
            DeltaInfo::TextDelta { text } => vec![Ok(StreamDelta::TextDelta(text))],
            DeltaInfo::InputJsonDelta { partial_json } => {
                vec![Ok(StreamDelta::ToolInputDelta {
                    index,
                    delta: partial_json,
                })]
            }
        },
        SseData::MessageDelta { delta, usage } => {
            let mut deltas = Vec::new();
            if let Some(usage) = usage {
                deltas.push(Ok(StreamDelta::Usage {
                    input_tokens: usage.input_tokens,
                    output_tokens: usage.output_tokens,
                }));
            }
            let stop = match delta.stop_reason.as_deref() {
                Some("end_turn") => Some(StopReason::EndTurn),
                Some("tool_use") => Some(StopReason::ToolUse),
                Some("max_tokens") => Some(StopReason::MaxTokens),
                Some("stop_sequence") => Some(StopReason::StopSequence),
                _ => None,
            };
            if let Some(s) = stop {
                deltas.push(Ok(StreamDelta::Stop(s)));
            }
            deltas
        }
        SseData::ContentBlockStop { .. } | SseData::MessageStop {} | SseData::Ping {} => Vec::new(),
        SseData::Error { error } => vec![Err(TandemError::LlmStream(error.message))],
    }
}

impl LlmClient for AnthropicClient {
    fn chat_stream(
        &self,
        config: &ModelConfig,
        messages: Vec<ChatMessage>,
        tools: &[ToolDefinition],
        tool_choice: ToolChoice,
    ) -> BoxFuture<'_, Result<BoxStream<'_, Result<StreamDelta>>>> {
        let config = config.clone();
        let tools = tools.to_vec();

        Box::pin(async move {
            let api_key = config
                .api_key
                .as_deref()
                .ok_or_else(|| TandemError::Config("Anthropic API key not set".into()))?;

            let base_url = config.base_url.as_deref().unwrap_or(ANTHROPIC_API_URL);

            let (system, api_messages) = convert_messages(messages);

            let api_tools: Vec<ApiTool> = tools
                .iter()
                .map(|t| ApiTool {
                    name: t.name.clone(),
                    description: t.description.clone(),
                    input_schema: t.input_schema.clone(),
                })
                .collect();

            let body = AnthropicRequest {
                model: config.model_id.clone(),
                max_tokens: config.max_tokens,
                temperature: if config.temperature > 0.0 {
                    Some(config.temperature)
                } else {
                    None
                },
                messages: api_messages,
                system,
                stream: true,
                tools: api_tools,
                tool_choice: convert_tool_choice(&tool_choice),
            };

            let response = self
                .http
                .post(base_url)
                .header("x-api-key", api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .header("content-type", "application/json")
                .json(&body)
                .send()
                .await
                .map_err(|e| TandemError::LlmRequest(e.to_string()))?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "unknown error".to_string());
                return Err(TandemError::LlmRequest(format!("HTTP {}: {}", status, body)));
            }

            let sse_stream = SseStream::new(response.bytes_stream());
            let delta_stream =
                sse_stream.flat_map(|frame| futures::stream::iter(parse_frame(frame)));

            Ok(Box::pin(delta_stream) as BoxStream<'_, Result<StreamDelta>>)
        })
    }
}

use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::{debug, info};

use tandem_core::config::ModelConfig;
use tandem_core::error::{Result, TandemError};
use tandem_core::event::WorkflowEvent;
use tandem_core::state::{AgentState, Translations};
use tandem_core::traits::LlmClient;
use tandem_core::types::{ChatMessage, Role, ToolChoice, ToolDefinition};
use tandem_llm::collect_response;

use crate::graph::{customize_config, InvokeConfig, StateEmission, WorkflowNode};

/// Name of the structured-output tool the model is bound to.
pub const TRANSLATIONS_TOOL: &str = "Translations";

fn translations_tool() -> ToolDefinition {
    ToolDefinition {
        name: TRANSLATIONS_TOOL.to_string(),
        description: "Store translations of the text into Spanish, French and German.".to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "translation_es": {
                    "type": "string",
                    "description": "The text translated into Spanish"
                },
                "translation_fr": {
                    "type": "string",
                    "description": "The text translated into French"
                },
                "translation_de": {
                    "type": "string",
                    "description": "The text translated into German"
                }
            },
            "required": ["translation_es", "translation_fr", "translation_de"]
        }),
    }
}

/// Translates the pending input into Spanish, French and German via a
/// structured tool call.
///
/// The tool is forced unless the most recent message came from the user, so
/// a fresh user turn gets a free-form reply instead of a redundant forced
/// call. A structured payload is decoded strictly: all three translations
/// or a decode error, never a partial write.
pub struct TranslatorNode {
    llm: Arc<dyn LlmClient>,
    model: ModelConfig,
}

impl TranslatorNode {
    pub fn new(llm: Arc<dyn LlmClient>, model: ModelConfig) -> Self {
        Self { llm, model }
    }

    fn build_request(input: &str) -> ChatMessage {
        let mut text = String::from(
            "You are a helpful assistant that translates text to different languages \
             (Spanish, French and German).\n\
             Don't ask for confirmation before translating.",
        );
        if !input.is_empty() {
            text.push_str(&format!(
                "\nThe user is currently working on translating this text: \"{}\"",
                input
            ));
        }
        ChatMessage::user(text)
    }
}

impl WorkflowNode for TranslatorNode {
    fn name(&self) -> &str {
        "translate"
    }

    fn run(
        &self,
        mut state: AgentState,
        config: InvokeConfig,
    ) -> BoxFuture<'_, Result<AgentState>> {
        Box::pin(async move {
            // Opt into message streaming and intermediate emission of the
            // translations key for the UI-sync layer.
            let config = customize_config(
                &config,
                true,
                vec![StateEmission {
                    state_key: "translations".to_string(),
                    tool: TRANSLATIONS_TOOL.to_string(),
                }],
            );

            // A turn the user just took gets a free choice; anything else
            // must produce the structured payload.
            let tool_choice = match state.messages.last() {
                Some(m) if m.role == Role::User => ToolChoice::Auto,
                _ => ToolChoice::Required(TRANSLATIONS_TOOL.to_string()),
            };
            debug!(forced = tool_choice != ToolChoice::Auto, "Tool choice resolved");

            let request = Self::build_request(&state.input);

            // System messages and empty assistant turns confuse the
            // translation model; send the rest of the history as-is.
            let mut outbound: Vec<ChatMessage> = state
                .messages
                .iter()
                .filter(|m| m.role != Role::System && !m.is_empty_assistant())
                .cloned()
                .collect();
            outbound.push(request.clone());

            let stream = self
                .llm
                .chat_stream(&self.model, outbound, &[translations_tool()], tool_choice)
                .await?;
            let reply = collect_response(stream).await?;

            let mut appended = vec![request];

            if let Some(&(id, _, input)) = reply.message.tool_uses().first() {
                let translations: Translations =
                    serde_json::from_value(input.clone()).map_err(|e| {
                        TandemError::Decode(format!("translations payload: {}", e))
                    })?;
                info!("Structured translations received");

                if config.emits_state_key("translations") {
                    config.emit(WorkflowEvent::StateEmitted {
                        state_key: "translations".to_string(),
                        value: serde_json::to_value(&translations)?,
                    });
                }

                let ack = ChatMessage::tool_result(id, "Translated!", false);
                state.translations = Some(translations);
                state.input.clear();
                appended.push(reply.message.clone());
                appended.push(ack);
            } else {
                debug!("No structured payload; appending raw reply");
                appended.push(reply.message.clone());
            }

            if config.emit_messages {
                for message in &appended {
                    config.emit(WorkflowEvent::MessageAppended(message.clone()));
                }
            }
            state.append_messages(appended);

            Ok(state)
        })
    }
}

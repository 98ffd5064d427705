use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::{debug, info};

use tandem_core::config::ModelConfig;
use tandem_core::error::{Result, TandemError};
use tandem_core::state::{AgentState, StepKind, StepStatus};
use tandem_core::traits::LlmClient;
use tandem_core::types::{ChatMessage, ToolChoice};
use tandem_llm::collect_response;

use crate::graph::{InvokeConfig, WorkflowNode};

/// Summarizes the search results of the first pending step.
///
/// The step must be a search step; the node fails with an invalid-state
/// error (and leaves the state untouched) otherwise. On success the step's
/// result holds the markdown summary, its raw `search_result` is cleared
/// (the payload is consumed by the summary and would only bloat
/// checkpoints), and the next pending step, if any, gets its progress log
/// reset to a starting marker.
pub struct SummarizerNode {
    llm: Arc<dyn LlmClient>,
    model: ModelConfig,
}

impl SummarizerNode {
    pub fn new(llm: Arc<dyn LlmClient>, model: ModelConfig) -> Self {
        Self { llm, model }
    }

    fn build_instruction(step_json: &str) -> String {
        format!(
            r#"This step was just executed: {step_json}

This is the result of the search:

Please summarize ONLY the result of the search and include all relevant information from the search and reference links.
DO NOT INCLUDE ANY EXTRA INFORMATION. ALL OF THE INFORMATION YOU ARE LOOKING FOR IS IN THE SEARCH RESULTS.

DO NOT answer the user's query yet. Just summarize the search results.

Use markdown formatting and put the references inline and the links at the end.
Like this:
This is a sentence with a reference to a source [source 1][1] and another reference [source 2][2].
[1]: http://example.com/source1 "Title of Source 1"
[2]: http://example.com/source2 "Title of Source 2"
"#
        )
    }
}

impl WorkflowNode for SummarizerNode {
    fn name(&self) -> &str {
        "summarize"
    }

    fn run(
        &self,
        mut state: AgentState,
        _config: InvokeConfig,
    ) -> BoxFuture<'_, Result<AgentState>> {
        Box::pin(async move {
            let idx = state
                .first_pending()
                .ok_or_else(|| TandemError::InvalidState("no pending step found".into()))?;

            if state.steps[idx].kind != StepKind::Search {
                return Err(TandemError::InvalidState(format!(
                    "step '{}' is not a search step",
                    state.steps[idx].id
                )));
            }

            info!(step_id = %state.steps[idx].id, "Summarizing search step");

            let step_json = serde_json::to_string(&state.steps[idx])?;
            let instruction = Self::build_instruction(&step_json);

            // The original user query anchors the summary; the instruction
            // carries the serialized step with its raw search payload.
            let mut messages = Vec::with_capacity(2);
            if let Some(first) = state.messages.first() {
                messages.push(first.clone());
            }
            messages.push(ChatMessage::user(instruction));

            let stream = self
                .llm
                .chat_stream(&self.model, messages, &[], ToolChoice::Auto)
                .await?;
            let reply = collect_response(stream).await?;
            let summary = reply.message.text();
            debug!(chars = summary.len(), "Summary received");

            let step = &mut state.steps[idx];
            step.result = Some(summary);
            step.search_result = None;
            step.status = StepStatus::Complete;
            step.updates.push("Done.".to_string());

            if let Some(next) = state.first_pending() {
                state.steps[next].updates = vec!["Searching the web...".to_string()];
            }

            Ok(state)
        })
    }
}

use std::sync::Arc;

use tandem_core::event::{EventBus, WorkflowEvent};
use tandem_core::types::ThreadId;

/// A state key a node wants streamed out while (and after) it runs, together
/// with the structured tool the key's value is assembled from.
#[derive(Debug, Clone, PartialEq)]
pub struct StateEmission {
    pub state_key: String,
    pub tool: String,
}

/// Configuration for a single workflow invocation.
///
/// Identifies the conversation thread for checkpointing and carries the
/// emission options the UI-sync layer consumes. Nodes customize their own
/// copy via [`customize_config`]; the original stays untouched.
#[derive(Clone, Default)]
pub struct InvokeConfig {
    /// Conversation thread. Required for checkpointing; optional otherwise.
    pub thread_id: Option<ThreadId>,
    /// Emit every appended message as it is produced.
    pub emit_messages: bool,
    /// State keys to emit when their value changes.
    pub emit_state: Vec<StateEmission>,
    /// Event sink. Filled in by the graph runtime when unset.
    pub events: Option<Arc<EventBus>>,
}

impl InvokeConfig {
    pub fn with_thread(thread_id: ThreadId) -> Self {
        Self {
            thread_id: Some(thread_id),
            ..Self::default()
        }
    }

    /// Publish an event if a sink is attached. Fire-and-forget.
    pub fn emit(&self, event: WorkflowEvent) {
        if let Some(ref bus) = self.events {
            bus.publish(event);
        }
    }

    /// Whether this invocation opted into emitting the given state key.
    pub fn emits_state_key(&self, key: &str) -> bool {
        self.emit_state.iter().any(|e| e.state_key == key)
    }
}

impl std::fmt::Debug for InvokeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvokeConfig")
            .field("thread_id", &self.thread_id)
            .field("emit_messages", &self.emit_messages)
            .field("emit_state", &self.emit_state)
            .field("events", &self.events.is_some())
            .finish()
    }
}

/// Clone an invocation config with emission options layered on top.
///
/// This is how a node requests message streaming and intermediate-state
/// emission for its own model call without mutating the caller's config.
pub fn customize_config(
    config: &InvokeConfig,
    emit_messages: bool,
    emit_state: Vec<StateEmission>,
) -> InvokeConfig {
    let mut customized = config.clone();
    customized.emit_messages = emit_messages;
    customized.emit_state = emit_state;
    customized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_customize_leaves_original_untouched() {
        let base = InvokeConfig::with_thread(ThreadId::from_str("t1"));
        let customized = customize_config(
            &base,
            true,
            vec![StateEmission {
                state_key: "translations".into(),
                tool: "Translations".into(),
            }],
        );

        assert!(!base.emit_messages);
        assert!(base.emit_state.is_empty());
        assert!(customized.emit_messages);
        assert!(customized.emits_state_key("translations"));
        assert_eq!(customized.thread_id, base.thread_id);
    }

    #[test]
    fn test_emit_without_sink_is_ok() {
        let config = InvokeConfig::default();
        config.emit(WorkflowEvent::NodeFinished {
            node: "translate".into(),
            elapsed_ms: 1,
        });
    }
}

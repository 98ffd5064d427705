use crate::state::AgentState;
use crate::types::{ChatMessage, ThreadId};

/// Workflow event broadcast to all subscribers.
///
/// This is the surface an external UI-sync layer consumes. The runtime never
/// waits on subscribers; events are fire-and-forget.
#[derive(Debug, Clone)]
pub enum WorkflowEvent {
    /// A node began executing.
    NodeStarted {
        node: String,
        thread_id: Option<ThreadId>,
    },
    /// A node finished executing.
    NodeFinished { node: String, elapsed_ms: u64 },
    /// A message was appended to the conversation history.
    MessageAppended(ChatMessage),
    /// A state key changed and the node opted into emitting it.
    StateEmitted {
        state_key: String,
        value: serde_json::Value,
    },
    /// The whole workflow finished; the final state snapshot.
    WorkflowComplete {
        thread_id: Option<ThreadId>,
        state: Box<AgentState>,
    },
    /// A node failed; the workflow stops here.
    WorkflowError { node: String, error: String },
}

/// Event bus using tokio broadcast channel.
/// All subscribers receive all events.
pub struct EventBus {
    tx: tokio::sync::broadcast::Sender<WorkflowEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = tokio::sync::broadcast::channel(capacity);
        Self { tx }
    }

    pub fn publish(&self, event: WorkflowEvent) {
        // Ignore error if no receivers
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<WorkflowEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_reaches_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();
        bus.publish(WorkflowEvent::NodeStarted {
            node: "translate".into(),
            thread_id: None,
        });
        match rx.recv().await.unwrap() {
            WorkflowEvent::NodeStarted { node, .. } => assert_eq!(node, "translate"),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_publish_without_subscribers_is_ok() {
        let bus = EventBus::new(8);
        bus.publish(WorkflowEvent::NodeFinished {
            node: "summarize".into(),
            elapsed_ms: 3,
        });
    }
}

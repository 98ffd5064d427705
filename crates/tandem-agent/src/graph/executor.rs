use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info};

use tandem_core::error::{Result, TandemError};
use tandem_core::event::{EventBus, WorkflowEvent};
use tandem_core::state::AgentState;

use super::builder::END;
use super::invoke::InvokeConfig;
use super::node::WorkflowNode;
use crate::checkpoint::Checkpointer;

/// Compiled workflow: immutable, supports invoke only.
///
/// Walks the linear chain from the entry node. After each successful node the
/// state is checkpointed (when the invocation carries a thread id), so a
/// failure mid-chain leaves the last successfully mutated snapshot behind.
pub struct CompiledGraph {
    nodes: HashMap<String, Arc<dyn WorkflowNode>>,
    edges: HashMap<String, String>,
    entry: String,
    checkpointer: Option<Arc<dyn Checkpointer>>,
    events: Arc<EventBus>,
}

impl CompiledGraph {
    pub(crate) fn new(
        nodes: HashMap<String, Arc<dyn WorkflowNode>>,
        edges: HashMap<String, String>,
        entry: String,
        checkpointer: Option<Arc<dyn Checkpointer>>,
        events: Arc<EventBus>,
    ) -> Self {
        Self {
            nodes,
            edges,
            entry,
            checkpointer,
            events,
        }
    }

    /// The event bus the UI-sync layer subscribes to.
    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    /// Run the workflow to completion.
    pub async fn invoke(&self, state: AgentState, config: &InvokeConfig) -> Result<AgentState> {
        let mut config = config.clone();
        if config.events.is_none() {
            config.events = Some(self.events.clone());
        }

        let mut state = state;
        let mut current = self.entry.clone();

        loop {
            let node = self
                .nodes
                .get(&current)
                .ok_or_else(|| TandemError::Graph(format!("node '{}' not found", current)))?;

            info!(node = %current, thread_id = ?config.thread_id, "Executing workflow node");
            config.emit(WorkflowEvent::NodeStarted {
                node: current.clone(),
                thread_id: config.thread_id.clone(),
            });

            let started = Instant::now();
            state = match node.run(state, config.clone()).await {
                Ok(next_state) => next_state,
                Err(e) => {
                    error!(node = %current, error = %e, "Workflow node failed");
                    config.emit(WorkflowEvent::WorkflowError {
                        node: current.clone(),
                        error: e.to_string(),
                    });
                    return Err(e);
                }
            };
            let elapsed_ms = started.elapsed().as_millis() as u64;

            config.emit(WorkflowEvent::NodeFinished {
                node: current.clone(),
                elapsed_ms,
            });
            debug!(node = %current, elapsed_ms, "Node complete");

            if let (Some(cp), Some(thread)) = (&self.checkpointer, &config.thread_id) {
                cp.save(thread, &state).await?;
            }

            match self.edges.get(&current) {
                Some(next) if next.as_str() != END => current = next.clone(),
                _ => break,
            }
        }

        config.emit(WorkflowEvent::WorkflowComplete {
            thread_id: config.thread_id.clone(),
            state: Box::new(state.clone()),
        });

        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::BoxFuture;
    use tandem_core::types::{ChatMessage, ThreadId};

    use crate::checkpoint::MemorySaver;
    use crate::graph::builder::StateGraph;

    struct AppendNode {
        name: String,
        text: String,
    }

    impl WorkflowNode for AppendNode {
        fn name(&self) -> &str {
            &self.name
        }

        fn run(
            &self,
            mut state: AgentState,
            _config: InvokeConfig,
        ) -> BoxFuture<'_, Result<AgentState>> {
            let text = self.text.clone();
            Box::pin(async move {
                state.append_messages([ChatMessage::assistant_text(text)]);
                Ok(state)
            })
        }
    }

    struct FailingNode;

    impl WorkflowNode for FailingNode {
        fn name(&self) -> &str {
            "failing"
        }

        fn run(
            &self,
            _state: AgentState,
            _config: InvokeConfig,
        ) -> BoxFuture<'_, Result<AgentState>> {
            Box::pin(async move { Err(TandemError::InvalidState("boom".into())) })
        }
    }

    fn two_node_graph(checkpointer: Option<Arc<dyn Checkpointer>>) -> CompiledGraph {
        let mut graph = StateGraph::new();
        graph.add_node(
            "first",
            Arc::new(AppendNode {
                name: "first".into(),
                text: "one".into(),
            }),
        );
        graph.add_node(
            "second",
            Arc::new(AppendNode {
                name: "second".into(),
                text: "two".into(),
            }),
        );
        graph.set_entry_point("first");
        graph.add_edge("first", "second");
        graph.add_edge("second", END);
        match checkpointer {
            Some(cp) => graph.compile_with_checkpointer(cp).unwrap(),
            None => graph.compile().unwrap(),
        }
    }

    #[tokio::test]
    async fn test_linear_chain_runs_in_order() {
        let graph = two_node_graph(None);
        let state = graph
            .invoke(AgentState::default(), &InvokeConfig::default())
            .await
            .unwrap();
        let texts: Vec<String> = state.messages.iter().map(|m| m.text()).collect();
        assert_eq!(texts, vec!["one", "two"]);
    }

    #[tokio::test]
    async fn test_checkpoint_saved_after_each_node() {
        let saver = Arc::new(MemorySaver::new());
        let graph = two_node_graph(Some(saver.clone()));
        let thread = ThreadId::from_str("t-exec");

        graph
            .invoke(AgentState::default(), &InvokeConfig::with_thread(thread.clone()))
            .await
            .unwrap();

        let saved = saver.load_latest(&thread).await.unwrap().unwrap();
        assert_eq!(saved.messages.len(), 2);
    }

    #[tokio::test]
    async fn test_node_error_propagates_and_emits() {
        let mut graph = StateGraph::new();
        graph.add_node("failing", Arc::new(FailingNode));
        graph.set_entry_point("failing");
        graph.add_edge("failing", END);
        let compiled = graph.compile().unwrap();

        let mut rx = compiled.events().subscribe();
        let result = compiled
            .invoke(AgentState::default(), &InvokeConfig::default())
            .await;
        assert!(matches!(result, Err(TandemError::InvalidState(_))));

        // NodeStarted then WorkflowError, never WorkflowComplete
        let mut saw_error = false;
        while let Ok(event) = rx.try_recv() {
            match event {
                WorkflowEvent::WorkflowError { node, .. } => {
                    assert_eq!(node, "failing");
                    saw_error = true;
                }
                WorkflowEvent::WorkflowComplete { .. } => panic!("workflow should not complete"),
                _ => {}
            }
        }
        assert!(saw_error);
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_checkpoint() {
        let saver = Arc::new(MemorySaver::new());
        let mut graph = StateGraph::new();
        graph.add_node(
            "first",
            Arc::new(AppendNode {
                name: "first".into(),
                text: "one".into(),
            }),
        );
        graph.add_node("failing", Arc::new(FailingNode));
        graph.set_entry_point("first");
        graph.add_edge("first", "failing");
        graph.add_edge("failing", END);
        let compiled = graph.compile_with_checkpointer(saver.clone()).unwrap();

        let thread = ThreadId::from_str("t-fail");
        let result = compiled
            .invoke(AgentState::default(), &InvokeConfig::with_thread(thread.clone()))
            .await;
        assert!(result.is_err());

        // The checkpoint reflects the last node that succeeded
        let saved = saver.load_latest(&thread).await.unwrap().unwrap();
        assert_eq!(saved.messages.len(), 1);
        assert_eq!(saved.messages[0].text(), "one");
    }
}

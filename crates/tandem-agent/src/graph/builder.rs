use std::collections::HashMap;
use std::sync::Arc;

use tandem_core::error::{Result, TandemError};
use tandem_core::event::EventBus;

use super::executor::CompiledGraph;
use super::node::WorkflowNode;
use crate::checkpoint::Checkpointer;

/// Terminal edge target: the workflow ends after the source node.
pub const END: &str = "__end__";

/// Workflow graph builder.
///
/// Register nodes, pick an entry point, chain edges, then `compile` into an
/// executable graph. Compilation validates that every referenced node exists.
pub struct StateGraph {
    nodes: HashMap<String, Arc<dyn WorkflowNode>>,
    edges: HashMap<String, String>,
    entry: Option<String>,
}

impl StateGraph {
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            edges: HashMap::new(),
            entry: None,
        }
    }

    /// Register a node under a name. Replaces any node with the same name.
    pub fn add_node(&mut self, name: impl Into<String>, node: Arc<dyn WorkflowNode>) -> &mut Self {
        self.nodes.insert(name.into(), node);
        self
    }

    /// Set the node the workflow starts from.
    pub fn set_entry_point(&mut self, name: impl Into<String>) -> &mut Self {
        self.entry = Some(name.into());
        self
    }

    /// Add a directed edge. `to` may be [`END`].
    pub fn add_edge(&mut self, from: impl Into<String>, to: impl Into<String>) -> &mut Self {
        self.edges.insert(from.into(), to.into());
        self
    }

    /// Compile without persistence.
    pub fn compile(self) -> Result<CompiledGraph> {
        self.compile_inner(None)
    }

    /// Compile with a checkpointer; state is saved after every node when the
    /// invocation carries a thread id.
    pub fn compile_with_checkpointer(
        self,
        checkpointer: Arc<dyn Checkpointer>,
    ) -> Result<CompiledGraph> {
        self.compile_inner(Some(checkpointer))
    }

    fn compile_inner(self, checkpointer: Option<Arc<dyn Checkpointer>>) -> Result<CompiledGraph> {
        let entry = self
            .entry
            .ok_or_else(|| TandemError::Graph("entry point not set".into()))?;

        if !self.nodes.contains_key(&entry) {
            return Err(TandemError::Graph(format!(
                "entry node '{}' not registered",
                entry
            )));
        }

        for (from, to) in &self.edges {
            if !self.nodes.contains_key(from) {
                return Err(TandemError::Graph(format!(
                    "edge source '{}' not registered",
                    from
                )));
            }
            if to != END && !self.nodes.contains_key(to) {
                return Err(TandemError::Graph(format!(
                    "edge target '{}' not registered",
                    to
                )));
            }
        }

        Ok(CompiledGraph::new(
            self.nodes,
            self.edges,
            entry,
            checkpointer,
            Arc::new(EventBus::default()),
        ))
    }
}

impl Default for StateGraph {
    fn default() -> Self {
        Self::new()
    }
}

use futures::future::BoxFuture;

use tandem_core::error::Result;
use tandem_core::state::AgentState;

use super::invoke::InvokeConfig;

/// One step in a workflow: state in, state out.
///
/// Nodes receive a state snapshot by value and return a new snapshot; the
/// runtime owns the state between invocations. A node performs at most one
/// suspending model call. Errors are not handled inside the node; they
/// terminate the invocation and leave the last checkpointed state in place.
pub trait WorkflowNode: Send + Sync + 'static {
    /// Node name, unique within a graph.
    fn name(&self) -> &str;

    /// Execute the node.
    fn run(&self, state: AgentState, config: InvokeConfig) -> BoxFuture<'_, Result<AgentState>>;
}

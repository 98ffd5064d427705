//! Linear state graph: the glue between workflow nodes.
//!
//! A workflow is a chain of `WorkflowNode`s: each takes the conversation
//! state and an invocation config, performs one model call, and returns the
//! updated state. The `CompiledGraph` walks the chain from the entry node,
//! checkpoints after every node when a thread id is present, and publishes
//! `WorkflowEvent`s for an external UI-sync layer.
//!
//! There are no conditional edges, branches, or cycles; orchestration depth
//! lives in the external engine this runtime stands in for.

pub mod builder;
pub mod executor;
pub mod invoke;
pub mod node;

pub use builder::{StateGraph, END};
pub use executor::CompiledGraph;
pub use invoke::{customize_config, InvokeConfig, StateEmission};
pub use node::WorkflowNode;

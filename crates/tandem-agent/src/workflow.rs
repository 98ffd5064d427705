//! Canned workflow factories: one node, one edge to END, a memory saver.

use std::sync::Arc;

use tandem_core::config::ModelConfig;
use tandem_core::error::Result;
use tandem_core::traits::LlmClient;

use crate::checkpoint::{Checkpointer, MemorySaver};
use crate::graph::{CompiledGraph, StateGraph, END};
use crate::nodes::{SummarizerNode, TranslatorNode};

/// The translation workflow: a single translator node.
pub fn translation_workflow(
    llm: Arc<dyn LlmClient>,
    model: ModelConfig,
) -> Result<CompiledGraph> {
    translation_workflow_with(llm, model, Arc::new(MemorySaver::new()))
}

/// Translation workflow with a caller-supplied checkpointer.
pub fn translation_workflow_with(
    llm: Arc<dyn LlmClient>,
    model: ModelConfig,
    checkpointer: Arc<dyn Checkpointer>,
) -> Result<CompiledGraph> {
    let mut graph = StateGraph::new();
    graph.add_node("translate", Arc::new(TranslatorNode::new(llm, model)));
    graph.set_entry_point("translate");
    graph.add_edge("translate", END);
    graph.compile_with_checkpointer(checkpointer)
}

/// The research workflow: a single summarizer node.
pub fn research_workflow(llm: Arc<dyn LlmClient>, model: ModelConfig) -> Result<CompiledGraph> {
    research_workflow_with(llm, model, Arc::new(MemorySaver::new()))
}

/// Research workflow with a caller-supplied checkpointer.
pub fn research_workflow_with(
    llm: Arc<dyn LlmClient>,
    model: ModelConfig,
    checkpointer: Arc<dyn Checkpointer>,
) -> Result<CompiledGraph> {
    let mut graph = StateGraph::new();
    graph.add_node("summarize", Arc::new(SummarizerNode::new(llm, model)));
    graph.set_entry_point("summarize");
    graph.add_edge("summarize", END);
    graph.compile_with_checkpointer(checkpointer)
}

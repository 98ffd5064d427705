pub mod checkpoint;
pub mod graph;
pub mod nodes;
pub mod workflow;

pub use checkpoint::{Checkpointer, MemorySaver, SqliteSaver};
pub use graph::{
    customize_config, CompiledGraph, InvokeConfig, StateEmission, StateGraph, WorkflowNode, END,
};
pub use nodes::{SummarizerNode, TranslatorNode, TRANSLATIONS_TOOL};
pub use workflow::{
    research_workflow, research_workflow_with, translation_workflow, translation_workflow_with,
};

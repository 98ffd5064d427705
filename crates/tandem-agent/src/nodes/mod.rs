//! Workflow nodes. Each one is a leaf: the graph runtime hands it the
//! conversation state and an invocation config, it makes one model call, and
//! it hands back the updated state.

pub mod summarizer;
pub mod translator;

pub use summarizer::SummarizerNode;
pub use translator::{TranslatorNode, TRANSLATIONS_TOOL};

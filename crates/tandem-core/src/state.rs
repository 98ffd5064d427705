use serde::{Deserialize, Serialize};

use crate::types::ChatMessage;

/// Lifecycle of a workflow step.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    InProgress,
    Complete,
}

/// What kind of work a step represents. Only search steps can be
/// summarized; anything else is carried through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Search,
    Other,
}

impl StepKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::Other => "other",
        }
    }
}

impl Serialize for StepKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for StepKind {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        // Any kind this build does not know is carried through as Other
        let kind = String::deserialize(deserializer)?;
        Ok(match kind.as_str() {
            "search" => Self::Search,
            _ => Self::Other,
        })
    }
}

/// A single step in a research plan.
///
/// Steps are mutated in place by the summarizer; they are never recreated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub kind: StepKind,
    pub status: StepStatus,
    /// Markdown summary written by the summarizer once the step completes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    /// Raw search payload. Consumed (and cleared) by summarization.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_result: Option<String>,
    /// Ordered progress log lines shown to the user.
    #[serde(default)]
    pub updates: Vec<String>,
}

impl Step {
    pub fn search(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            kind: StepKind::Search,
            status: StepStatus::Pending,
            result: None,
            search_result: None,
            updates: Vec::new(),
        }
    }
}

/// Translations into the three fixed target languages.
///
/// Produced atomically by a single structured model call: either all three
/// fields decode or the node fails with a decode error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Translations {
    pub translation_es: String,
    pub translation_fr: String,
    pub translation_de: String,
}

/// Conversation state threaded through workflow nodes.
///
/// The state is owned by the graph runtime between invocations. Nodes take a
/// snapshot by value, return an updated snapshot, and never persist it
/// themselves. Message updates are appends via [`AgentState::append_messages`];
/// the returned snapshot replaces the input snapshot wholesale.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentState {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub steps: Vec<Step>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translations: Option<Translations>,
    /// Free text the user is currently working on.
    #[serde(default)]
    pub input: String,
}

impl AgentState {
    /// Index of the first step still pending, if any.
    pub fn first_pending(&self) -> Option<usize> {
        self.steps.iter().position(|s| s.status == StepStatus::Pending)
    }

    /// The documented merge point for node output: history only grows.
    pub fn append_messages(&mut self, messages: impl IntoIterator<Item = ChatMessage>) {
        self.messages.extend(messages);
    }
}

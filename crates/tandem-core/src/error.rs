use thiserror::Error;

#[derive(Debug, Error)]
pub enum TandemError {
    // State errors
    #[error("Invalid workflow state: {0}")]
    InvalidState(String),

    // LLM errors
    #[error("LLM request failed: {0}")]
    LlmRequest(String),

    #[error("LLM streaming error: {0}")]
    LlmStream(String),

    #[error("LLM provider not supported: {0}")]
    UnsupportedProvider(String),

    /// A structured tool payload that does not match the declared schema.
    /// Missing fields fail hard instead of producing a partial result.
    #[error("Structured output decode failed: {0}")]
    Decode(String),

    // Graph errors
    #[error("Graph error: {0}")]
    Graph(String),

    // Checkpoint errors
    #[error("Checkpoint error: {0}")]
    Checkpoint(String),

    // Config errors
    #[error("Config error: {0}")]
    Config(String),

    #[error("Config file not found: {0}")]
    ConfigNotFound(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TandemError>;

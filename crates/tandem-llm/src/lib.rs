pub mod providers;
pub mod response;
pub mod streaming;

use tandem_core::config::ModelConfig;
use tandem_core::error::{Result, TandemError};
use tandem_core::traits::LlmClient;

pub use providers::anthropic::AnthropicClient;
pub use providers::openai::OpenAiClient;
pub use response::{collect_response, ChatReply};

/// Create an LLM client for the configured provider.
///
/// Fails with `UnsupportedProvider` before any network traffic when the
/// selector names a provider this build does not know.
pub fn create_client(config: &ModelConfig) -> Result<Box<dyn LlmClient>> {
    match config.provider.as_str() {
        "openai" => Ok(Box::new(OpenAiClient::new())),
        "anthropic" | "claude" => Ok(Box::new(AnthropicClient::new())),
        other => Err(TandemError::UnsupportedProvider(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_client_known_providers() {
        assert!(create_client(&ModelConfig::openai_default()).is_ok());
        assert!(create_client(&ModelConfig::anthropic_default()).is_ok());

        let mut claude = ModelConfig::anthropic_default();
        claude.provider = "claude".to_string();
        assert!(create_client(&claude).is_ok());
    }

    #[test]
    fn test_create_client_unknown_provider() {
        let mut config = ModelConfig::openai_default();
        config.provider = "mistral".to_string();
        match create_client(&config) {
            Err(TandemError::UnsupportedProvider(p)) => assert_eq!(p, "mistral"),
            other => panic!("expected UnsupportedProvider, got {:?}", other.map(|_| ())),
        }
    }
}

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TandemError};

/// Top-level Tandem configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub model: ModelConfig,
    #[serde(default)]
    pub checkpoint: Option<CheckpointConfig>,
}

/// Model selection, passed explicitly to the client factory.
///
/// There is no process-wide provider switch: whoever constructs the nodes
/// decides which provider and model they talk to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    pub model_id: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_provider() -> String { "openai".to_string() }
fn default_max_tokens() -> u32 { 4096 }
fn default_temperature() -> f32 { 0.0 }

impl ModelConfig {
    /// The default provider and model.
    pub fn openai_default() -> Self {
        Self {
            provider: "openai".to_string(),
            model_id: "gpt-4o".to_string(),
            api_key: None,
            base_url: None,
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }

    /// The alternate provider and model.
    pub fn anthropic_default() -> Self {
        Self {
            provider: "anthropic".to_string(),
            model_id: "claude-3-5-sonnet-20240620".to_string(),
            api_key: None,
            base_url: None,
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

/// Durable checkpoint storage settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckpointConfig {
    /// Path to the SQLite checkpoint database. None = in-memory saver only.
    #[serde(default)]
    pub db_path: Option<String>,
}

impl AppConfig {
    /// Load config from a TOML file, with env var expansion.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|_| TandemError::ConfigNotFound(path.display().to_string()))?;

        // Expand ${ENV_VAR} references
        let expanded = expand_env_vars(&content);

        toml::from_str(&expanded).map_err(|e| TandemError::Config(e.to_string()))
    }
}

/// Expand `${ENV_VAR}` patterns in a string.
fn expand_env_vars(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' && chars.peek() == Some(&'{') {
            chars.next(); // consume '{'
            let mut var_name = String::new();
            for c in chars.by_ref() {
                if c == '}' {
                    break;
                }
                var_name.push(c);
            }
            match std::env::var(&var_name) {
                Ok(val) => result.push_str(&val),
                Err(_) => {
                    // Keep original if env var not set
                    result.push_str(&format!("${{{}}}", var_name));
                }
            }
        } else {
            result.push(c);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_env_vars() {
        std::env::set_var("TEST_TANDEM_VAR", "hello");
        let result = expand_env_vars("key = \"${TEST_TANDEM_VAR}\"");
        assert_eq!(result, "key = \"hello\"");
        std::env::remove_var("TEST_TANDEM_VAR");
    }

    #[test]
    fn test_expand_env_vars_missing() {
        let result = expand_env_vars("key = \"${NONEXISTENT_TANDEM_VAR}\"");
        assert_eq!(result, "key = \"${NONEXISTENT_TANDEM_VAR}\"");
    }

    #[test]
    fn test_model_config_defaults_from_minimal_toml() {
        let toml_str = r#"
[model]
model_id = "gpt-4o"
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.model.provider, "openai");
        assert_eq!(config.model.max_tokens, 4096);
        assert_eq!(config.model.temperature, 0.0);
        assert!(config.model.api_key.is_none());
        assert!(config.checkpoint.is_none());
    }

    #[test]
    fn test_full_config() {
        let toml_str = r#"
[model]
provider = "anthropic"
model_id = "claude-3-5-sonnet-20240620"
api_key = "sk-test"
max_tokens = 2048

[checkpoint]
db_path = "/tmp/tandem-checkpoints.db"
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.model.provider, "anthropic");
        assert_eq!(config.model.max_tokens, 2048);
        assert_eq!(
            config.checkpoint.unwrap().db_path.as_deref(),
            Some("/tmp/tandem-checkpoints.db")
        );
    }

    #[test]
    fn test_presets() {
        assert_eq!(ModelConfig::openai_default().model_id, "gpt-4o");
        assert_eq!(
            ModelConfig::anthropic_default().model_id,
            "claude-3-5-sonnet-20240620"
        );
    }
}

//! Config loading and provider selection behavior.

use std::io::Write;

use tandem_core::config::{AppConfig, ModelConfig};
use tandem_core::error::TandemError;
use tandem_llm::create_client;

#[test]
fn loads_config_with_env_expansion() {
    std::env::set_var("TANDEM_TEST_KEY", "sk-from-env");

    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[model]
provider = "anthropic"
model_id = "claude-3-5-sonnet-20240620"
api_key = "${{TANDEM_TEST_KEY}}"
"#
    )
    .unwrap();

    let config = AppConfig::load(file.path()).unwrap();
    assert_eq!(config.model.provider, "anthropic");
    assert_eq!(config.model.api_key.as_deref(), Some("sk-from-env"));

    std::env::remove_var("TANDEM_TEST_KEY");
}

#[test]
fn missing_config_file_is_reported() {
    let result = AppConfig::load(std::path::Path::new("/nonexistent/tandem.toml"));
    assert!(matches!(result, Err(TandemError::ConfigNotFound(_))));
}

#[test]
fn unsupported_provider_fails_before_any_network_call() {
    let mut config = ModelConfig::openai_default();
    config.provider = "watsonx".to_string();

    match create_client(&config) {
        Err(TandemError::UnsupportedProvider(provider)) => assert_eq!(provider, "watsonx"),
        _ => panic!("expected an UnsupportedProvider error"),
    }
}

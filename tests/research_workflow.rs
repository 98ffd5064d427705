//! End-to-end runs of the research (summarizer) workflow.

use std::sync::Arc;

use tandem_agent::{research_workflow, InvokeConfig};
use tandem_core::config::ModelConfig;
use tandem_core::error::TandemError;
use tandem_core::state::{Step, StepStatus};
use tandem_test_utils::{search_state, MockLlmClient};

#[tokio::test]
async fn summarizes_first_pending_step() {
    let mock = Arc::new(MockLlmClient::text_reply(
        "Rust 1.0 shipped on May 15, 2015 [source 1][1].\n\n[1]: https://blog.rust-lang.org \"Rust Blog\"",
    ));
    let graph = research_workflow(mock, ModelConfig::anthropic_default()).unwrap();

    let mut state = search_state();
    state.steps.push(Step::search("s2", "Search for Rust 2015 edition details"));

    let state = graph
        .invoke(state, &InvokeConfig::default())
        .await
        .unwrap();

    assert_eq!(state.steps[0].status, StepStatus::Complete);
    assert!(!state.steps[0].result.as_deref().unwrap().is_empty());
    assert!(state.steps[0].search_result.is_none());
    assert_eq!(
        state.steps[1].updates,
        vec!["Searching the web...".to_string()]
    );
}

#[tokio::test]
async fn fails_when_no_step_is_pending() {
    let mock = Arc::new(MockLlmClient::text_reply("unused"));
    let graph = research_workflow(mock.clone(), ModelConfig::anthropic_default()).unwrap();

    let mut state = search_state();
    state.steps[0].status = StepStatus::Complete;

    let result = graph.invoke(state, &InvokeConfig::default()).await;
    assert!(matches!(result, Err(TandemError::InvalidState(_))));
    assert!(mock.calls().is_empty());
}

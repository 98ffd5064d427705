//! End-to-end runs of the translation workflow against a scripted model.

use std::sync::Arc;

use tandem_agent::{
    translation_workflow, translation_workflow_with, Checkpointer, InvokeConfig, MemorySaver,
};
use tandem_core::config::ModelConfig;
use tandem_core::state::AgentState;
use tandem_core::types::{ChatMessage, Role, ThreadId, ToolChoice};
use tandem_test_utils::MockLlmClient;

fn payload() -> serde_json::Value {
    serde_json::json!({
        "translation_es": "buenas noches",
        "translation_fr": "bonne nuit",
        "translation_de": "gute nacht"
    })
}

#[tokio::test]
async fn translates_pending_input_end_to_end() {
    let mock = Arc::new(MockLlmClient::tool_reply("call-1", "Translations", payload()));
    let graph = translation_workflow(mock.clone(), ModelConfig::openai_default()).unwrap();

    let mut state = AgentState::default();
    state.input = "good night".into();

    let state = graph
        .invoke(state, &InvokeConfig::default())
        .await
        .unwrap();

    let t = state.translations.unwrap();
    assert_eq!(t.translation_es, "buenas noches");
    assert_eq!(t.translation_fr, "bonne nuit");
    assert_eq!(t.translation_de, "gute nacht");
    assert!(state.input.is_empty());

    // With no prior user turn the tool call was forced
    assert_eq!(
        mock.last_call().unwrap().tool_choice,
        ToolChoice::Required("Translations".into())
    );
}

#[tokio::test]
async fn free_form_reply_after_user_turn() {
    let mock = Arc::new(MockLlmClient::text_reply("Sure, what text?"));
    let graph = translation_workflow(mock.clone(), ModelConfig::openai_default()).unwrap();

    let mut state = AgentState::default();
    state.messages.push(ChatMessage::user("can you translate for me?"));

    let state = graph
        .invoke(state, &InvokeConfig::default())
        .await
        .unwrap();

    assert_eq!(mock.last_call().unwrap().tool_choice, ToolChoice::Auto);
    assert!(state.translations.is_none());

    // History gained exactly the synthesized request and the raw reply
    assert_eq!(state.messages.len(), 3);
    assert_eq!(state.messages[1].role, Role::User);
    assert_eq!(state.messages[2].text(), "Sure, what text?");
}

#[tokio::test]
async fn checkpoints_final_state_for_thread() {
    let mock = Arc::new(MockLlmClient::tool_reply("call-1", "Translations", payload()));
    let saver = Arc::new(MemorySaver::new());
    let graph =
        translation_workflow_with(mock, ModelConfig::openai_default(), saver.clone()).unwrap();

    let thread = ThreadId::from_str("conversation-1");
    let mut state = AgentState::default();
    state.input = "good night".into();

    graph
        .invoke(state, &InvokeConfig::with_thread(thread.clone()))
        .await
        .unwrap();

    let saved = saver.load_latest(&thread).await.unwrap().unwrap();
    assert!(saved.translations.is_some());
    assert_eq!(saved.messages.len(), 3);
}

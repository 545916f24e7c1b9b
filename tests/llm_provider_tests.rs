mod common;

use axum::http::StatusCode;
use common::FakeLlm;
use inventory_lib::llm_engine::{
    CompletionRequest, LlmEngine, LlmError, LlmProvider, LlmSettings, ProviderType,
};

async fn engine_for(provider: ProviderType, llm: &FakeLlm) -> LlmEngine {
    let url = common::spawn(llm.router()).await;
    LlmEngine::from_settings(&LlmSettings {
        provider,
        base_url: Some(url),
        api_key: Some("sk-test".to_string()),
        model: "formula-model".to_string(),
        timeout_secs: 5,
        referer: None,
        app_title: None,
    })
    .unwrap()
}

fn request(query: &str) -> CompletionRequest {
    CompletionRequest::single_prompt(format!("Query: \"{}\"\n\nFormula:", query))
        .with_max_tokens(750)
        .with_temperature(0.3)
}

#[tokio::test]
async fn test_openai_compatible_completion() {
    let llm = FakeLlm::default().reply("rings", "FIND(\"rn\", LOWER({Design}))");
    let engine = engine_for(ProviderType::OpenAi, &llm).await;

    let response = engine.complete(request("rings")).await.unwrap();
    assert_eq!(response.content, "FIND(\"rn\", LOWER({Design}))");
    assert_eq!(response.model, "formula-model");
    assert_eq!(response.prompt_tokens, Some(900));
    assert!(!response.truncated);

    let headers = llm.last_headers.lock().unwrap().clone().unwrap();
    assert!(headers.get("http-referer").is_none());
}

#[tokio::test]
async fn test_ollama_completion() {
    let llm = FakeLlm::default().reply("pendants", "FIND(\"nt\", LOWER({Design}))");
    let engine = engine_for(ProviderType::Ollama, &llm).await;
    assert_eq!(engine.provider_name(), "ollama");

    let response = engine.complete(request("pendants")).await.unwrap();
    assert_eq!(response.content, "FIND(\"nt\", LOWER({Design}))");
    assert_eq!(response.completion_tokens, Some(40));
    assert_eq!(response.finish_reason.as_deref(), Some("stop"));

    let sent = llm.last_body.lock().unwrap().clone().unwrap();
    assert_eq!(sent["stream"], false);
    assert_eq!(sent["options"]["num_predict"], 750);
}

#[tokio::test]
async fn test_status_errors_are_classified() {
    let llm = FakeLlm::default().failing(StatusCode::TOO_MANY_REQUESTS);
    let engine = engine_for(ProviderType::OpenRouter, &llm).await;
    assert!(matches!(
        engine.complete(request("rings")).await,
        Err(LlmError::RateLimited(_))
    ));

    let llm = FakeLlm::default().failing(StatusCode::UNAUTHORIZED);
    let engine = engine_for(ProviderType::OpenRouter, &llm).await;
    assert!(matches!(
        engine.complete(request("rings")).await,
        Err(LlmError::AuthenticationFailed(_))
    ));
}

#[tokio::test]
async fn test_unreachable_provider() {
    let engine = LlmEngine::from_settings(&LlmSettings {
        provider: ProviderType::Ollama,
        base_url: Some(common::closed_url().await),
        model: "llama3.2".to_string(),
        timeout_secs: 5,
        ..LlmSettings::default()
    })
    .unwrap();
    assert!(matches!(
        engine.complete(request("rings")).await,
        Err(LlmError::ProviderUnavailable(_))
    ));
}

use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use transcript_server::application::ports::{LlmClient, LlmClientError};
use transcript_server::infrastructure::llm::OpenAiChatClient;
use transcript_server::presentation::config::LlmSettings;

#[derive(Clone, Default)]
struct Captured {
    body: Arc<Mutex<Option<Value>>>,
    authorization: Arc<Mutex<Option<String>>>,
}

async fn spawn_mock(status: StatusCode, reply: Value) -> (String, Captured) {
    let captured = Captured::default();

    let chat = {
        let reply = reply.clone();
        move |State(captured): State<Captured>, headers: HeaderMap, Json(body): Json<Value>| {
            let reply = reply.clone();
            async move {
                *captured.body.lock().unwrap() = Some(body);
                *captured.authorization.lock().unwrap() = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                (status, Json(reply)).into_response()
            }
        }
    };

    let models = move || {
        let reply = reply.clone();
        async move { (status, Json(reply)).into_response() }
    };

    let app = Router::new()
        .route("/v1/chat/completions", post(chat))
        .route("/v1/models", get(models))
        .with_state(captured.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}/v1", addr), captured)
}

fn settings(base_url: &str, api_key: &str) -> LlmSettings {
    LlmSettings {
        base_url: base_url.to_string(),
        api_key: api_key.to_string(),
        model: "llama3.2".to_string(),
        temperature: 0.3,
        max_tokens: 200,
        request_timeout_secs: 5,
    }
}

fn completion(content: Value) -> Value {
    json!({
        "choices": [
            { "index": 0, "message": { "role": "assistant", "content": content } }
        ]
    })
}

#[tokio::test]
async fn given_successful_completion_when_completing_then_returns_trimmed_content() {
    let (base_url, _) = spawn_mock(StatusCode::OK, completion(json!("  Hello, world.\n"))).await;
    let client = OpenAiChatClient::new(&settings(&base_url, "ollama"));

    let result = client.complete("Clean up.", "um hello world").await.unwrap();

    assert_eq!(result, "Hello, world.");
}

#[tokio::test]
async fn given_completion_request_when_sent_then_body_carries_prompt_and_sampling_settings() {
    let (base_url, captured) = spawn_mock(StatusCode::OK, completion(json!("ok"))).await;
    let client = OpenAiChatClient::new(&settings(&base_url, "ollama"));

    client.complete("Clean up.", "raw words").await.unwrap();

    let body = captured.body.lock().unwrap().clone().unwrap();
    assert_eq!(body["model"], "llama3.2");
    assert_eq!(body["max_tokens"], 200);
    let temperature = body["temperature"].as_f64().unwrap();
    assert!((temperature - 0.3).abs() < 1e-6);
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][0]["content"], "Clean up.");
    assert_eq!(body["messages"][1]["role"], "user");
    assert_eq!(body["messages"][1]["content"], "raw words");
}

#[tokio::test]
async fn given_api_key_when_completing_then_sends_bearer_auth() {
    let (base_url, captured) = spawn_mock(StatusCode::OK, completion(json!("ok"))).await;
    let client = OpenAiChatClient::new(&settings(&base_url, "sk-test"));

    client.complete("p", "t").await.unwrap();

    assert_eq!(
        captured.authorization.lock().unwrap().as_deref(),
        Some("Bearer sk-test")
    );
}

#[tokio::test]
async fn given_empty_api_key_when_completing_then_sends_no_authorization() {
    let (base_url, captured) = spawn_mock(StatusCode::OK, completion(json!("ok"))).await;
    let client = OpenAiChatClient::new(&settings(&base_url, ""));

    client.complete("p", "t").await.unwrap();

    assert!(captured.authorization.lock().unwrap().is_none());
}

#[tokio::test]
async fn given_trailing_slash_in_base_url_when_completing_then_still_reaches_endpoint() {
    let (base_url, _) = spawn_mock(StatusCode::OK, completion(json!("ok"))).await;
    let client = OpenAiChatClient::new(&settings(&format!("{}/", base_url), "ollama"));

    let result = client.complete("p", "t").await;

    assert_eq!(result.unwrap(), "ok");
}

#[tokio::test]
async fn given_server_error_when_completing_then_returns_api_request_failed_with_status() {
    let (base_url, _) = spawn_mock(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({"error": "model not loaded"}),
    )
    .await;
    let client = OpenAiChatClient::new(&settings(&base_url, "ollama"));

    let result = client.complete("p", "t").await;

    match result {
        Err(LlmClientError::ApiRequestFailed(message)) => {
            assert!(message.contains("500"));
            assert!(message.contains("model not loaded"));
        }
        other => panic!("expected ApiRequestFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn given_rate_limit_when_completing_then_returns_rate_limited() {
    let (base_url, _) = spawn_mock(StatusCode::TOO_MANY_REQUESTS, json!({})).await;
    let client = OpenAiChatClient::new(&settings(&base_url, "ollama"));

    let result = client.complete("p", "t").await;

    assert!(matches!(result, Err(LlmClientError::RateLimited)));
}

#[tokio::test]
async fn given_empty_choices_when_completing_then_returns_invalid_response() {
    let (base_url, _) = spawn_mock(StatusCode::OK, json!({"choices": []})).await;
    let client = OpenAiChatClient::new(&settings(&base_url, "ollama"));

    let result = client.complete("p", "t").await;

    assert!(matches!(result, Err(LlmClientError::InvalidResponse(_))));
}

#[tokio::test]
async fn given_null_content_when_completing_then_returns_invalid_response() {
    let (base_url, _) = spawn_mock(StatusCode::OK, completion(Value::Null)).await;
    let client = OpenAiChatClient::new(&settings(&base_url, "ollama"));

    let result = client.complete("p", "t").await;

    assert!(matches!(result, Err(LlmClientError::InvalidResponse(_))));
}

#[tokio::test]
async fn given_model_list_when_listing_models_then_returns_ids() {
    let (base_url, _) = spawn_mock(
        StatusCode::OK,
        json!({"object": "list", "data": [{"id": "llama3.2"}, {"id": "qwen2.5"}]}),
    )
    .await;
    let client = OpenAiChatClient::new(&settings(&base_url, "ollama"));

    let models = client.list_models().await.unwrap();

    assert_eq!(models, vec!["llama3.2".to_string(), "qwen2.5".to_string()]);
}

#[tokio::test]
async fn given_unreachable_server_when_listing_models_then_returns_api_request_failed() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let client = OpenAiChatClient::new(&settings(&format!("http://{}/v1", addr), "ollama"));

    let result = client.list_models().await;

    assert!(matches!(result, Err(LlmClientError::ApiRequestFailed(_))));
}

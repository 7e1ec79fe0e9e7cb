#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::Request;

use transcript_server::application::ports::{
    LlmClient, LlmClientError, TranscriptionEngine, TranscriptionError,
};
use transcript_server::application::services::TranscriptionService;
use transcript_server::domain::SystemPrompt;
use transcript_server::presentation::config::default_builder;
use transcript_server::presentation::{AppState, ServiceSlot, Settings, create_router};

pub const DEFAULT_PROMPT: &str = "Clean up this transcript.";
pub const BOUNDARY: &str = "test-boundary-7MA4YWxkTrZu0gW";

#[derive(Debug, Clone)]
pub struct SeenAudio {
    pub path: PathBuf,
    pub existed: bool,
    pub bytes: Vec<u8>,
}

pub struct MockTranscriptionEngine {
    result: Result<String, String>,
    seen: Mutex<Vec<SeenAudio>>,
}

impl MockTranscriptionEngine {
    pub fn returning(text: &str) -> Arc<Self> {
        Arc::new(Self {
            result: Ok(text.to_string()),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            result: Err(message.to_string()),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn seen(&self) -> Vec<SeenAudio> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl TranscriptionEngine for MockTranscriptionEngine {
    async fn transcribe(&self, audio_path: &Path) -> Result<String, TranscriptionError> {
        self.seen.lock().unwrap().push(SeenAudio {
            path: audio_path.to_path_buf(),
            existed: audio_path.exists(),
            bytes: std::fs::read(audio_path).unwrap_or_default(),
        });

        self.result
            .clone()
            .map_err(TranscriptionError::TranscriptionFailed)
    }

    fn model_name(&self) -> &str {
        "mock-whisper"
    }
}

pub struct MockLlmClient {
    reply: Option<String>,
    models_reachable: bool,
    models_hang: bool,
    calls: Mutex<Vec<(String, String)>>,
}

impl MockLlmClient {
    pub fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(reply.to_string()),
            models_reachable: true,
            models_hang: false,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn unreachable() -> Arc<Self> {
        Arc::new(Self {
            reply: None,
            models_reachable: false,
            models_hang: false,
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Model listing never completes, like a host that drops packets.
    pub fn hanging() -> Arc<Self> {
        Arc::new(Self {
            reply: Some(String::new()),
            models_reachable: true,
            models_hang: true,
            calls: Mutex::new(Vec::new()),
        })
    }

    /// (system_prompt, text) pairs in call order.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, system_prompt: &str, text: &str) -> Result<String, LlmClientError> {
        self.calls
            .lock()
            .unwrap()
            .push((system_prompt.to_string(), text.to_string()));

        self.reply
            .clone()
            .ok_or_else(|| LlmClientError::ApiRequestFailed("connection refused".to_string()))
    }

    async fn list_models(&self) -> Result<Vec<String>, LlmClientError> {
        if self.models_hang {
            std::future::pending::<()>().await;
        }
        if self.models_reachable {
            Ok(vec!["llama3.2".to_string()])
        } else {
            Err(LlmClientError::ApiRequestFailed("connection refused".to_string()))
        }
    }
}

pub fn test_settings() -> Settings {
    default_builder()
        .unwrap()
        .build()
        .unwrap()
        .try_deserialize()
        .unwrap()
}

pub fn service(
    engine: Arc<MockTranscriptionEngine>,
    llm: Arc<MockLlmClient>,
) -> TranscriptionService {
    TranscriptionService::new(engine, llm, SystemPrompt::new(DEFAULT_PROMPT))
}

pub fn ready_app(engine: Arc<MockTranscriptionEngine>, llm: Arc<MockLlmClient>) -> Router {
    ready_app_with_settings(engine, llm, test_settings())
}

pub fn ready_app_with_settings(
    engine: Arc<MockTranscriptionEngine>,
    llm: Arc<MockLlmClient>,
    settings: Settings,
) -> Router {
    let slot = ServiceSlot::ready(service(engine, llm));
    create_router(AppState::new(slot, settings))
}

pub fn initializing_app() -> Router {
    create_router(AppState::new(ServiceSlot::new(), test_settings()))
}

/// Builds a `multipart/form-data` body holding one file part.
pub fn multipart_body(field: &str, filename: Option<&str>, data: &[u8]) -> Vec<u8> {
    let disposition = match filename {
        Some(name) => format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, name
        ),
        None => format!("Content-Disposition: form-data; name=\"{}\"\r\n", field),
    };

    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(disposition.as_bytes());
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn transcribe_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/transcribe")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

pub fn clean_request(json: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/clean")
        .header("content-type", "application/json")
        .body(Body::from(json.to_string()))
        .unwrap()
}

pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

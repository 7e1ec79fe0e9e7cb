use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use transcript_server::application::services::TranscriptionService;
use transcript_server::domain::SystemPrompt;
use transcript_server::infrastructure::audio::audio_decoder::check_ffmpeg_binary;
use transcript_server::infrastructure::audio::{CandleWhisperEngine, WhisperDevice};
use transcript_server::infrastructure::llm::OpenAiChatClient;
use transcript_server::infrastructure::observability::{TracingConfig, init_tracing};
use transcript_server::infrastructure::prompt::load_system_prompt;
use transcript_server::presentation::config::load_settings;
use transcript_server::presentation::{
    AppState, Environment, ServiceSlot, Settings, create_router,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let environment = Environment::from_env().map_err(anyhow::Error::msg)?;
    let settings = load_settings(environment).context("Failed to load settings")?;

    init_tracing(&TracingConfig::new(environment, &settings.logging));

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .context("Invalid server address")?;

    let default_prompt =
        load_system_prompt(&settings.prompt.path).context("Failed to load system prompt")?;

    let slot = ServiceSlot::new();
    let state = AppState::new(slot.clone(), settings.clone());
    let router = create_router(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        environment = %environment,
        whisper_model = %settings.whisper.model,
        llm_model = %settings.llm.model,
        "Listening, models are loading"
    );

    let server = async {
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("Server error")
    };

    let startup = async {
        let service = build_service(&settings, default_prompt).await?;
        tracing::info!("Ready");
        slot.activate(service).await;
        anyhow::Ok(())
    };

    tokio::pin!(server);
    tokio::select! {
        result = &mut server => return result,
        result = startup => result?,
    }
    server.await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn build_service(
    settings: &Settings,
    default_prompt: SystemPrompt,
) -> anyhow::Result<TranscriptionService> {
    let whisper = settings.whisper.clone();
    let device = WhisperDevice::try_from(whisper.device.as_str()).map_err(anyhow::Error::msg)?;
    let engine = tokio::task::spawn_blocking(move || {
        if let Err(e) = check_ffmpeg_binary() {
            tracing::warn!(error = %e, "ffmpeg unavailable, WebM/Opus uploads will fail");
        }
        CandleWhisperEngine::new(&whisper.model, whisper.language(), device)
    })
    .await
    .context("Whisper loader panicked")?
    .context("Failed to load Whisper model")?;

    tracing::info!(base_url = %settings.llm.base_url, "Connecting to LLM");
    let llm_client = OpenAiChatClient::new(&settings.llm);

    Ok(TranscriptionService::new(
        Arc::new(engine),
        Arc::new(llm_client),
        default_prompt,
    ))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

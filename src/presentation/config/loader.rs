use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File};

use super::{Environment, Settings};

/// Variable names the service has always honored; they override every other source.
const LEGACY_OVERRIDES: [(&str, &str); 5] = [
    ("WHISPER_MODEL", "whisper.model"),
    ("LLM_BASE_URL", "llm.base_url"),
    ("LLM_API_KEY", "llm.api_key"),
    ("LLM_MODEL", "llm.model"),
    ("SERVER_PORT", "server.port"),
];

/// Loads settings from `.env`, `appsettings.<env>.toml`, `APP_*` variables
/// and the legacy variable names, in increasing priority.
pub fn load_settings(environment: Environment) -> Result<Settings, ConfigError> {
    dotenvy::dotenv().ok();

    let builder = default_builder()?
        .add_source(
            File::with_name(&format!("appsettings.{}", environment.as_str())).required(false),
        )
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("cors.allowed_origins")
                .try_parsing(true),
        );

    with_legacy_overrides(builder, |name| std::env::var(name).ok())?
        .build()?
        .try_deserialize()
}

pub fn default_builder() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8000)?
        .set_default("whisper.model", "base.en")?
        .set_default("whisper.language", "en")?
        .set_default("whisper.device", "auto")?
        .set_default("llm.base_url", "http://localhost:11434/v1")?
        .set_default("llm.api_key", "ollama")?
        .set_default("llm.model", "llama3.2")?
        .set_default("llm.temperature", 0.3)?
        .set_default("llm.max_tokens", 200)?
        .set_default("llm.request_timeout_secs", 120)?
        .set_default("prompt.path", "system_prompt.txt")?
        .set_default(
            "cors.allowed_origins",
            vec!["http://localhost:3000", "http://localhost:5173"],
        )?
        .set_default("upload.max_bytes", 100 * 1024 * 1024)?
        .set_default("logging.json", false)
}

pub fn with_legacy_overrides<F>(
    mut builder: ConfigBuilder<DefaultState>,
    lookup: F,
) -> Result<ConfigBuilder<DefaultState>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    for (variable, key) in LEGACY_OVERRIDES {
        let value = lookup(variable).filter(|v| !v.trim().is_empty());
        builder = builder.set_override_option(key, value)?;
    }
    Ok(builder)
}

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::whisper::{self as m, Config};
use hf_hub::api::sync::Api;
use hf_hub::{Repo, RepoType};
use tokenizers::Tokenizer;

use crate::application::ports::{TranscriptionEngine, TranscriptionError};
use crate::domain::WhisperModelId;

use super::audio_decoder::decode_audio_file;
use super::mel_filters::mel_filters;

const MAX_DECODE_TOKENS: usize = 224;

/// Where inference runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhisperDevice {
    Cpu,
    Auto,
}

impl TryFrom<&str> for WhisperDevice {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "cpu" => Ok(Self::Cpu),
            "auto" => Ok(Self::Auto),
            other => Err(format!("Invalid whisper device: {}. Expected: cpu or auto", other)),
        }
    }
}

pub struct CandleWhisperEngine {
    model_id: WhisperModelId,
    inner: Arc<WhisperRuntime>,
}

struct WhisperRuntime {
    model: Mutex<m::model::Whisper>,
    tokenizer: Tokenizer,
    config: Config,
    device: Device,
    dtype: DType,
    mel_filters: Vec<f32>,
    prompt_tokens: Vec<u32>,
    eot_token: u32,
}

impl CandleWhisperEngine {
    /// Downloads (or reuses the cached) checkpoint and loads it. Blocking.
    pub fn new(
        model_name: &str,
        language: Option<&str>,
        device: WhisperDevice,
    ) -> Result<Self, TranscriptionError> {
        let model_id = WhisperModelId::resolve(model_name);
        let device = Self::select_device(device)?;
        let dtype = Self::select_dtype(&device);

        tracing::info!(
            device = ?device,
            model = %model_id,
            "Loading Whisper model"
        );

        let api = Api::new().map_err(|e| TranscriptionError::ModelLoadFailed(e.to_string()))?;
        let repo = api.repo(Repo::new(model_id.as_str().to_string(), RepoType::Model));

        let fetch = |file: &str| {
            repo.get(file)
                .map_err(|e| TranscriptionError::ModelLoadFailed(format!("{}: {}", file, e)))
        };
        let config_path = fetch("config.json")?;
        let tokenizer_path = fetch("tokenizer.json")?;
        let weights_path = fetch("model.safetensors")?;

        let config_contents = std::fs::read_to_string(&config_path)
            .map_err(|e| TranscriptionError::ModelLoadFailed(format!("read config: {}", e)))?;
        let config: Config = serde_json::from_str(&config_contents)
            .map_err(|e| TranscriptionError::ModelLoadFailed(format!("parse config: {}", e)))?;

        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| TranscriptionError::ModelLoadFailed(format!("tokenizer: {}", e)))?;

        let language = if model_id.is_english_only() {
            None
        } else {
            language
        };
        let prompt_tokens = prompt_tokens(&tokenizer, language)?;
        let eot_token = token_id(&tokenizer, m::EOT_TOKEN)?;

        let mel_filters = mel_filters(config.num_mel_bins, m::N_FFT, m::SAMPLE_RATE as u32);

        // SAFETY: safetensors files are memory-mapped read-only
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path], dtype, &device)
                .map_err(|e| TranscriptionError::ModelLoadFailed(format!("weights: {}", e)))?
        };

        let model = m::model::Whisper::load(&vb, config.clone())
            .map_err(|e| TranscriptionError::ModelLoadFailed(format!("model: {}", e)))?;

        tracing::info!(model = %model_id, "Whisper model loaded");

        Ok(Self {
            model_id,
            inner: Arc::new(WhisperRuntime {
                model: Mutex::new(model),
                tokenizer,
                config,
                device,
                dtype,
                mel_filters,
                prompt_tokens,
                eot_token,
            }),
        })
    }

    pub fn select_device(device: WhisperDevice) -> Result<Device, TranscriptionError> {
        match device {
            WhisperDevice::Cpu => Ok(Device::Cpu),
            WhisperDevice::Auto if candle_core::utils::cuda_is_available() => Device::new_cuda(0)
                .map_err(|e| TranscriptionError::ModelLoadFailed(format!("cuda: {}", e))),
            WhisperDevice::Auto if candle_core::utils::metal_is_available() => {
                Device::new_metal(0)
                    .map_err(|e| TranscriptionError::ModelLoadFailed(format!("metal: {}", e)))
            }
            WhisperDevice::Auto => Ok(Device::Cpu),
        }
    }

    pub fn select_dtype(device: &Device) -> DType {
        if device.is_cpu() { m::DTYPE } else { DType::F16 }
    }
}

#[async_trait]
impl TranscriptionEngine for CandleWhisperEngine {
    async fn transcribe(&self, audio_path: &Path) -> Result<String, TranscriptionError> {
        let runtime = Arc::clone(&self.inner);
        let path: PathBuf = audio_path.to_path_buf();

        tokio::task::spawn_blocking(move || runtime.transcribe_file(&path))
            .await
            .map_err(|e| TranscriptionError::TranscriptionFailed(format!("worker: {}", e)))?
    }

    fn model_name(&self) -> &str {
        self.model_id.as_str()
    }
}

impl WhisperRuntime {
    fn transcribe_file(&self, path: &Path) -> Result<String, TranscriptionError> {
        let pcm = decode_audio_file(path)?;

        let mut model = self
            .model
            .lock()
            .map_err(|_| TranscriptionError::TranscriptionFailed("model lock poisoned".into()))?;

        let mut segments: Vec<String> = Vec::new();

        for (i, chunk) in pcm.chunks(m::N_SAMPLES).enumerate() {
            let mel = mel_window(&self.config, chunk, &self.mel_filters, &self.device, self.dtype)?;

            tracing::debug!(segment = i, "Transcribing audio segment");
            let text = self.decode_segment(&mut model, &mel)?;
            if !text.is_empty() {
                segments.push(text);
            }
        }

        let transcript = segments.join(" ").trim().to_string();

        tracing::info!(
            segments = segments.len(),
            chars = transcript.len(),
            "Audio transcription completed"
        );

        Ok(transcript)
    }

    fn decode_segment(
        &self,
        model: &mut m::model::Whisper,
        mel: &Tensor,
    ) -> Result<String, TranscriptionError> {
        let generated = greedy_decode(
            model,
            mel,
            &self.prompt_tokens,
            self.eot_token,
            &self.device,
            MAX_DECODE_TOKENS,
        )?;

        let text = self
            .tokenizer
            .decode(&generated, true)
            .map_err(|e| TranscriptionError::TranscriptionFailed(format!("detokenize: {}", e)))?;

        Ok(text.trim().to_string())
    }
}

/// Log-mel input for one window of at most `N_SAMPLES` samples, shaped
/// `(1, n_mels, N_FRAMES)`. Short windows are zero padded.
fn mel_window(
    config: &Config,
    samples: &[f32],
    filters: &[f32],
    device: &Device,
    dtype: DType,
) -> Result<Tensor, TranscriptionError> {
    let mut padded = samples.to_vec();
    padded.resize(m::N_SAMPLES, 0.0);

    let mel_data = m::audio::pcm_to_mel(config, &padded, filters);
    let n_mel = config.num_mel_bins;
    let n_frames = mel_data.len() / n_mel;

    // pcm_to_mel appends padding frames past the window; the encoder only
    // has positions for N_FRAMES
    Tensor::from_vec(mel_data, (1, n_mel, n_frames), device)
        .and_then(|t| t.narrow(2, 0, m::N_FRAMES.min(n_frames)))
        .and_then(|t| t.to_dtype(dtype))
        .map_err(|e| TranscriptionError::TranscriptionFailed(format!("mel tensor: {}", e)))
}

/// Greedy decode of one window. Each window starts from the bare prompt,
/// so no text is carried over from the previous one.
fn greedy_decode(
    model: &mut m::model::Whisper,
    mel: &Tensor,
    prompt_tokens: &[u32],
    eot_token: u32,
    device: &Device,
    max_tokens: usize,
) -> Result<Vec<u32>, TranscriptionError> {
    let failed = |e: candle_core::Error| TranscriptionError::TranscriptionFailed(e.to_string());

    let audio_features = model
        .encoder
        .forward(mel, true)
        .map_err(|e| TranscriptionError::TranscriptionFailed(format!("encoder: {}", e)))?;

    let mut tokens = prompt_tokens.to_vec();
    let mut generated: Vec<u32> = Vec::new();

    for step in 0..max_tokens {
        let token_tensor = Tensor::new(tokens.as_slice(), device)
            .and_then(|t| t.unsqueeze(0))
            .map_err(failed)?;

        let decoder_output = model
            .decoder
            .forward(&token_tensor, &audio_features, step == 0)
            .map_err(|e| TranscriptionError::TranscriptionFailed(format!("decoder: {}", e)))?;

        let logits = model
            .decoder
            .final_linear(&decoder_output.squeeze(0).map_err(failed)?)
            .map_err(|e| TranscriptionError::TranscriptionFailed(format!("linear: {}", e)))?;

        let seq_len = logits.dim(0).map_err(failed)?;
        let next_token = logits
            .get(seq_len - 1)
            .and_then(|l| l.argmax(0))
            .and_then(|t| t.to_scalar::<u32>())
            .map_err(failed)?;

        if next_token == eot_token {
            break;
        }

        tokens.push(next_token);
        generated.push(next_token);
    }

    model.reset_kv_cache();

    Ok(generated)
}

fn prompt_tokens(
    tokenizer: &Tokenizer,
    language: Option<&str>,
) -> Result<Vec<u32>, TranscriptionError> {
    let mut tokens = vec![token_id(tokenizer, m::SOT_TOKEN)?];
    if let Some(lang) = language {
        let lang_token = format!("<|{}|>", lang);
        tokens.push(token_id(tokenizer, &lang_token).map_err(|_| {
            TranscriptionError::ModelLoadFailed(format!("unsupported language: {}", lang))
        })?);
    }
    tokens.push(token_id(tokenizer, m::TRANSCRIBE_TOKEN)?);
    tokens.push(token_id(tokenizer, m::NO_TIMESTAMPS_TOKEN)?);
    Ok(tokens)
}

fn token_id(tokenizer: &Tokenizer, token: &str) -> Result<u32, TranscriptionError> {
    tokenizer.token_to_id(token).ok_or_else(|| {
        TranscriptionError::TranscriptionFailed(format!("token not found: {}", token))
    })
}

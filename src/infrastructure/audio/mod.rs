pub mod audio_decoder;
mod candle_whisper_engine;
mod mel_filters;

pub use candle_whisper_engine::{CandleWhisperEngine, WhisperDevice};

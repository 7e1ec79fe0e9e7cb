use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;
use std::process::Command;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::application::ports::TranscriptionError;

pub const TARGET_SAMPLE_RATE: u32 = 16_000;

const RESAMPLE_CHUNK: usize = 1024;

/// Decodes an audio file into 16 kHz mono PCM. Containers symphonia cannot
/// read (WebM/Opus browser recordings) go through ffmpeg instead.
pub fn decode_audio_file(path: &Path) -> Result<Vec<f32>, TranscriptionError> {
    match decode_with_symphonia(path) {
        Err(TranscriptionError::UnsupportedFormat(reason)) => {
            tracing::debug!(path = %path.display(), reason = %reason, "Falling back to ffmpeg");
            decode_with_ffmpeg(path, &reason)
        }
        other => other,
    }
}

/// Fails when no `ffmpeg` binary is on `PATH`.
pub fn check_ffmpeg_binary() -> Result<(), TranscriptionError> {
    let output = Command::new("ffmpeg")
        .arg("-version")
        .output()
        .map_err(|e| TranscriptionError::UnsupportedFormat(format!("ffmpeg not found: {}", e)))?;

    if output.status.success() {
        Ok(())
    } else {
        Err(TranscriptionError::UnsupportedFormat(
            "ffmpeg -version failed".to_string(),
        ))
    }
}

fn decode_with_ffmpeg(path: &Path, symphonia_reason: &str) -> Result<Vec<f32>, TranscriptionError> {
    let sample_rate = TARGET_SAMPLE_RATE.to_string();
    let output = Command::new("ffmpeg")
        .arg("-nostdin")
        .args(["-hide_banner", "-loglevel", "error", "-i"])
        .arg(path)
        .args(["-vn", "-ac", "1", "-ar", &sample_rate, "-f", "f32le", "-"])
        .output()
        .map_err(|e| match e.kind() {
            ErrorKind::NotFound => TranscriptionError::UnsupportedFormat(format!(
                "{} (ffmpeg is not installed)",
                symphonia_reason
            )),
            _ => TranscriptionError::DecodingFailed(format!("ffmpeg: {}", e)),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(TranscriptionError::DecodingFailed(format!(
            "ffmpeg: {}",
            stderr.trim()
        )));
    }

    let samples: Vec<f32> = output
        .stdout
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect();

    if samples.is_empty() {
        return Err(TranscriptionError::DecodingFailed(
            "no audio samples decoded".to_string(),
        ));
    }

    tracing::debug!(
        samples = samples.len(),
        duration_secs = samples.len() as f32 / TARGET_SAMPLE_RATE as f32,
        "Audio decoded with ffmpeg"
    );

    Ok(samples)
}

fn decode_with_symphonia(path: &Path) -> Result<Vec<f32>, TranscriptionError> {
    let file = File::open(path)
        .map_err(|e| TranscriptionError::DecodingFailed(format!("open {}: {}", path.display(), e)))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| TranscriptionError::UnsupportedFormat(format!("probe: {}", e)))?;

    let mut format = probed.format;

    let track = format
        .default_track()
        .ok_or_else(|| TranscriptionError::DecodingFailed("no audio track found".to_string()))?;

    let track_id = track.id;
    let codec_params = track.codec_params.clone();
    let source_rate = codec_params
        .sample_rate
        .ok_or_else(|| TranscriptionError::DecodingFailed("unknown sample rate".to_string()))?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| TranscriptionError::UnsupportedFormat(format!("codec: {}", e)))?;

    let mut mono: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(symphonia::core::errors::Error::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => {
                return Err(TranscriptionError::DecodingFailed(format!("packet: {}", e)));
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(symphonia::core::errors::Error::DecodeError(e)) => {
                tracing::warn!(error = %e, "Skipping corrupt audio frame");
                continue;
            }
            Err(e) => {
                return Err(TranscriptionError::DecodingFailed(format!("decode: {}", e)));
            }
        };

        let spec = *decoded.spec();
        let frames = decoded.frames();
        if frames == 0 {
            continue;
        }

        let mut sample_buf = SampleBuffer::<f32>::new(frames as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);
        downmix_into(sample_buf.samples(), spec.channels.count(), &mut mono);
    }

    if mono.is_empty() {
        return Err(TranscriptionError::DecodingFailed(
            "no audio samples decoded".to_string(),
        ));
    }

    if source_rate != TARGET_SAMPLE_RATE {
        mono = resample(&mono, source_rate, TARGET_SAMPLE_RATE)?;
    }

    tracing::debug!(
        samples = mono.len(),
        duration_secs = mono.len() as f32 / TARGET_SAMPLE_RATE as f32,
        source_rate,
        "Audio decoded to 16kHz mono PCM"
    );

    Ok(mono)
}

/// Averages interleaved frames into a single channel.
pub fn downmix_into(interleaved: &[f32], channels: usize, out: &mut Vec<f32>) {
    if channels <= 1 {
        out.extend_from_slice(interleaved);
        return;
    }
    out.extend(
        interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32),
    );
}

fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>, TranscriptionError> {
    use rubato::{
        Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
    };

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let ratio = to_rate as f64 / from_rate as f64;

    let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, RESAMPLE_CHUNK, 1)
        .map_err(|e| TranscriptionError::DecodingFailed(format!("resampler init: {}", e)))?;

    let mut output = Vec::with_capacity((samples.len() as f64 * ratio) as usize + RESAMPLE_CHUNK);

    for chunk in samples.chunks(RESAMPLE_CHUNK) {
        let mut input = chunk.to_vec();
        input.resize(RESAMPLE_CHUNK, 0.0);

        let result = resampler
            .process(&[input], None)
            .map_err(|e| TranscriptionError::DecodingFailed(format!("resample: {}", e)))?;

        if let Some(channel) = result.first() {
            output.extend_from_slice(channel);
        }
    }

    // zero padding of the last chunk produces a tail past the real signal
    output.truncate((samples.len() as f64 * ratio) as usize);

    Ok(output)
}

//! Slaney-style mel filter banks matching the ones Whisper was trained with
//! (`librosa.filters.mel(sr=16000, n_fft=400, norm="slaney")`).

const MIN_LOG_HZ: f64 = 1000.0;
const LINEAR_STEP_HZ: f64 = 200.0 / 3.0;

/// Returns `n_mels` rows of `n_fft / 2 + 1` weights, row-major.
pub fn mel_filters(n_mels: usize, n_fft: usize, sample_rate: u32) -> Vec<f32> {
    let n_freqs = n_fft / 2 + 1;
    let sample_rate = sample_rate as f64;

    let fft_freqs: Vec<f64> = (0..n_freqs)
        .map(|k| k as f64 * sample_rate / n_fft as f64)
        .collect();

    let mel_min = hz_to_mel(0.0);
    let mel_max = hz_to_mel(sample_rate / 2.0);
    let mel_points: Vec<f64> = (0..n_mels + 2)
        .map(|i| mel_to_hz(mel_min + (mel_max - mel_min) * i as f64 / (n_mels + 1) as f64))
        .collect();

    let mut filters = vec![0f32; n_mels * n_freqs];

    for m in 0..n_mels {
        let (left, center, right) = (mel_points[m], mel_points[m + 1], mel_points[m + 2]);
        let norm = 2.0 / (right - left);

        for (k, &freq) in fft_freqs.iter().enumerate() {
            let rising = (freq - left) / (center - left);
            let falling = (right - freq) / (right - center);
            let weight = rising.min(falling).max(0.0);
            filters[m * n_freqs + k] = (weight * norm) as f32;
        }
    }

    filters
}

fn log_step() -> f64 {
    6.4f64.ln() / 27.0
}

fn hz_to_mel(hz: f64) -> f64 {
    if hz >= MIN_LOG_HZ {
        MIN_LOG_HZ / LINEAR_STEP_HZ + (hz / MIN_LOG_HZ).ln() / log_step()
    } else {
        hz / LINEAR_STEP_HZ
    }
}

fn mel_to_hz(mel: f64) -> f64 {
    let min_log_mel = MIN_LOG_HZ / LINEAR_STEP_HZ;
    if mel >= min_log_mel {
        MIN_LOG_HZ * (log_step() * (mel - min_log_mel)).exp()
    } else {
        LINEAR_STEP_HZ * mel
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_whisper_parameters_when_building_filters_then_shape_is_mels_by_freq_bins() {
        let filters = mel_filters(80, 400, 16_000);
        assert_eq!(filters.len(), 80 * 201);
    }

    #[test]
    fn given_filters_when_inspected_then_every_band_has_positive_weight() {
        let filters = mel_filters(128, 400, 16_000);
        for band in filters.chunks(201) {
            assert!(band.iter().all(|w| *w >= 0.0));
            assert!(band.iter().any(|w| *w > 0.0));
        }
    }

    #[test]
    fn given_mel_scale_when_round_tripping_frequency_then_value_is_preserved() {
        for hz in [0.0, 440.0, 1000.0, 4000.0, 8000.0] {
            assert!((mel_to_hz(hz_to_mel(hz)) - hz).abs() < 1e-6);
        }
    }
}

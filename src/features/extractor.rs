//! Feature Extractor: PCM → MFCC Feature Matrix.

use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

use crate::audio::PcmBuffer;
use crate::config::ExtractorConfig;

use super::mel::{build_mel_filterbank, dct_ii, hann_window};
use super::matrix::FeatureMatrix;

/// Extract z-normalized MFCCs from `pcm` using `config`.
///
/// Frames are Hann-windowed, power-spectrum-mapped onto a mel filterbank,
/// log-compressed, and DCT-II compressed to `config.n_mfcc` coefficients
/// (including the retained DC/energy term).
pub fn extract(pcm: &PcmBuffer, config: &ExtractorConfig) -> FeatureMatrix {
    let window_size = config.window_samples();
    let hop_size = config.hop_samples();

    if pcm.samples.len() < window_size || window_size == 0 {
        return FeatureMatrix::from_frames(Vec::new(), config.n_mfcc, config.hop_seconds());
    }

    let window = hann_window(window_size);
    let mel_filters = build_mel_filterbank(window_size, config.sample_rate, config.n_mels);

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(window_size);
    let n_bins = window_size / 2 + 1;

    let n_frames = (pcm.samples.len() - window_size) / hop_size + 1;
    let mut frames = Vec::with_capacity(n_frames);

    for frame_idx in 0..n_frames {
        let start = frame_idx * hop_size;
        let windowed: Vec<Complex<f32>> = (0..window_size)
            .map(|i| Complex::new(pcm.samples[start + i] * window[i], 0.0))
            .collect();

        let mut buf = windowed;
        fft.process(&mut buf);

        let power: Vec<f32> = buf[..n_bins].iter().map(|c| c.norm_sqr()).collect();

        let mut log_mel = Vec::with_capacity(config.n_mels);
        for filter in &mel_filters {
            let energy: f32 = filter.iter().zip(power.iter()).map(|(&w, &p)| w * p).sum();
            log_mel.push((energy + 1e-10).ln());
        }

        let mut mfcc = dct_ii(&log_mel, config.n_mfcc);
        mfcc.truncate(config.n_mfcc);
        mfcc.resize(config.n_mfcc, 0.0);
        frames.push(mfcc);
    }

    let mut matrix = FeatureMatrix::from_frames(frames, config.n_mfcc, config.hop_seconds());
    matrix.z_normalize();
    matrix
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn sine_pcm(freq: f32, seconds: f32, sample_rate: u32) -> PcmBuffer {
        let n = (sample_rate as f32 * seconds) as usize;
        let samples = (0..n)
            .map(|i| (2.0 * PI * freq * i as f32 / sample_rate as f32).sin() * 0.5)
            .collect();
        PcmBuffer::new(samples, sample_rate)
    }

    #[test]
    fn row_count_matches_invariant_formula() {
        let config = ExtractorConfig::default();
        let pcm = sine_pcm(440.0, 5.0, config.sample_rate);
        let matrix = extract(&pcm, &config);

        let w = config.window_samples();
        let hop = config.hop_samples();
        let expected = (pcm.samples.len() - w) / hop + 1;
        assert_eq!(matrix.n_frames(), expected);
        assert_eq!(matrix.dim(), config.n_mfcc);
    }

    #[test]
    fn determinism_across_runs() {
        let config = ExtractorConfig::default();
        let pcm = sine_pcm(220.0, 2.0, config.sample_rate);
        let a = extract(&pcm, &config);
        let b = extract(&pcm, &config);
        for r in 0..a.n_frames() {
            for c in 0..a.dim() {
                assert_eq!(a.row(r)[c], b.row(r)[c]);
            }
        }
    }

    #[test]
    fn too_short_pcm_yields_empty_matrix() {
        let config = ExtractorConfig::default();
        let pcm = PcmBuffer::new(vec![0.0; 10], config.sample_rate);
        let matrix = extract(&pcm, &config);
        assert!(matrix.is_empty());
    }
}

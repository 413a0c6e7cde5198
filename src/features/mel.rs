//! Mel filterbank construction and DCT-II compression, the building blocks
//! of the MFCC pipeline.

use std::f32::consts::PI;

/// Triangular mel filterbank: `n_mels` filters, each spanning
/// `n_bins = fft_size / 2 + 1` linear-frequency bins over `[0, sample_rate/2]`.
pub fn build_mel_filterbank(fft_size: usize, sample_rate: u32, n_mels: usize) -> Vec<Vec<f32>> {
    let n_bins = fft_size / 2 + 1;
    let f_max = sample_rate as f32 / 2.0;

    let hz_to_mel = |f: f32| -> f32 { 2595.0 * (1.0 + f / 700.0).log10() };
    let mel_to_hz = |m: f32| -> f32 { 700.0 * (10.0_f32.powf(m / 2595.0) - 1.0) };

    let mel_min = hz_to_mel(0.0);
    let mel_max = hz_to_mel(f_max);

    let mel_points: Vec<f32> = (0..n_mels + 2)
        .map(|i| mel_min + (mel_max - mel_min) * i as f32 / (n_mels + 1) as f32)
        .collect();

    let bin_points: Vec<f32> = mel_points
        .iter()
        .map(|&m| mel_to_hz(m) * fft_size as f32 / sample_rate as f32)
        .collect();

    let mut filters = Vec::with_capacity(n_mels);
    for i in 0..n_mels {
        let mut filter = vec![0.0f32; n_bins];
        let left = bin_points[i];
        let center = bin_points[i + 1];
        let right = bin_points[i + 2];

        for (j, slot) in filter.iter_mut().enumerate() {
            let jf = j as f32;
            if jf >= left && jf <= center && (center - left) > 1e-10 {
                *slot = (jf - left) / (center - left);
            } else if jf > center && jf <= right && (right - center) > 1e-10 {
                *slot = (right - jf) / (right - center);
            }
        }
        filters.push(filter);
    }

    filters
}

/// Periodic Hann window of the given length.
pub fn hann_window(n: usize) -> Vec<f32> {
    if n <= 1 {
        return vec![1.0; n];
    }
    (0..n)
        .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f32 / (n - 1) as f32).cos()))
        .collect()
}

/// Type-II DCT, truncated to the first `n_out` coefficients (including the
/// retained DC term at `k = 0`).
pub fn dct_ii(input: &[f32], n_out: usize) -> Vec<f32> {
    let n = input.len();
    (0..n_out)
        .map(|k| {
            input
                .iter()
                .enumerate()
                .map(|(i, &x)| x * (PI * k as f32 * (2.0 * i as f32 + 1.0) / (2.0 * n as f32)).cos())
                .sum()
        })
        .collect()
}

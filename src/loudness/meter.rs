//! BS.1770-4 integrated loudness measurement.

use crate::error::DuckError;

use super::biquad::BiquadCascade;

const BLOCK_SECONDS: f64 = 0.4;
const STEP_SECONDS: f64 = 0.1; // 400ms blocks, 75% overlap
const ABSOLUTE_GATE_LUFS: f64 = -70.0;
const RELATIVE_GATE_OFFSET_LU: f64 = -10.0;

fn block_loudness(mean_square: f64) -> f64 {
    -0.691 + 10.0 * mean_square.max(1e-12).log10()
}

/// Integrated loudness (LUFS) of `samples` at `sample_rate`, per BS.1770-4
/// K-weighting and two-stage gating.
///
/// Returns `LoudnessUndefined` when the interval is shorter than the 400ms
/// gating window, or when every block falls below the absolute gate (e.g.
/// near-silence), since no defined measurement exists in either case.
pub fn integrated_loudness(samples: &[f32], sample_rate: u32) -> Result<f32, DuckError> {
    let block_size = (BLOCK_SECONDS * sample_rate as f64).round() as usize;
    let step_size = (STEP_SECONDS * sample_rate as f64).round() as usize;

    if samples.len() < block_size || block_size == 0 {
        return Err(DuckError::LoudnessUndefined);
    }

    let mut cascade = BiquadCascade::k_weighting(sample_rate as f64);
    let weighted = cascade.process(samples);

    let mut block_mean_squares = Vec::new();
    let mut start = 0;
    while start + block_size <= weighted.len() {
        let block = &weighted[start..start + block_size];
        let ms: f64 = block.iter().map(|&v| v * v).sum::<f64>() / block_size as f64;
        block_mean_squares.push(ms);
        start += step_size;
    }

    let absolute_gated: Vec<f64> = block_mean_squares
        .iter()
        .copied()
        .filter(|&ms| block_loudness(ms) >= ABSOLUTE_GATE_LUFS)
        .collect();

    if absolute_gated.is_empty() {
        return Err(DuckError::LoudnessUndefined);
    }

    let mean_abs_gated = absolute_gated.iter().sum::<f64>() / absolute_gated.len() as f64;
    let relative_gate = block_loudness(mean_abs_gated) + RELATIVE_GATE_OFFSET_LU;

    let relative_gated: Vec<f64> = absolute_gated
        .iter()
        .copied()
        .filter(|&ms| block_loudness(ms) >= relative_gate)
        .collect();

    if relative_gated.is_empty() {
        return Err(DuckError::LoudnessUndefined);
    }

    let mean_final = relative_gated.iter().sum::<f64>() / relative_gated.len() as f64;
    Ok(block_loudness(mean_final) as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn sine(freq: f32, seconds: f32, sample_rate: u32, amplitude: f32) -> Vec<f32> {
        let n = (sample_rate as f32 * seconds) as usize;
        (0..n)
            .map(|i| amplitude * (2.0 * PI * freq * i as f32 / sample_rate as f32).sin())
            .collect()
    }

    #[test]
    fn full_scale_997hz_sine_is_near_minus_3_lufs() {
        let samples = sine(997.0, 3.0, 48000, 1.0);
        let lufs = integrated_loudness(&samples, 48000).unwrap();
        assert!((lufs - (-3.01)).abs() < 1.0, "got {lufs}");
    }

    #[test]
    fn interval_shorter_than_400ms_is_undefined() {
        let samples = sine(1000.0, 0.1, 22050, 0.5);
        let err = integrated_loudness(&samples, 22050).unwrap_err();
        assert!(matches!(err, DuckError::LoudnessUndefined));
    }

    #[test]
    fn quieter_sine_yields_lower_lufs_than_louder_sine() {
        let loud = sine(1000.0, 2.0, 22050, 0.5);
        let quiet = sine(1000.0, 2.0, 22050, 0.05);
        let loud_lufs = integrated_loudness(&loud, 22050).unwrap();
        let quiet_lufs = integrated_loudness(&quiet, 22050).unwrap();
        assert!(quiet_lufs < loud_lufs);
    }

    #[test]
    fn silence_is_undefined() {
        let samples = vec![0.0f32; 22050 * 2];
        let err = integrated_loudness(&samples, 22050).unwrap_err();
        assert!(matches!(err, DuckError::LoudnessUndefined));
    }
}

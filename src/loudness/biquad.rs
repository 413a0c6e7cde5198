//! Biquad filter stage, Direct Form II Transposed, composed into the
//! two-stage K-weighting cascade used by the Loudness Meter.

/// Biquad filter coefficients.
#[derive(Debug, Clone, Copy)]
pub struct BiquadCoeffs {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a1: f64,
    pub a2: f64,
}

/// Per-stream filter state (Direct Form II Transposed delay elements).
#[derive(Debug, Clone, Copy, Default)]
pub struct BiquadState {
    z1: f64,
    z2: f64,
}

impl BiquadCoeffs {
    /// BS.1770-4 pre-filter stage 1: a high-shelf approximating the
    /// acoustic effect of the head, parameterized for an arbitrary
    /// sample rate via the standard bilinear-transform re-derivation.
    pub fn k_weighting_shelf(sample_rate: f64) -> Self {
        let f0 = 1681.974_450_955_533_2;
        let gain_db = 3.999_843_853_97;
        let q = 0.707_175_236_955_419_6;

        let k = (std::f64::consts::PI * f0 / sample_rate).tan();
        let vh = 10.0_f64.powf(gain_db / 20.0);
        let vb = vh.powf(0.499_666_774_154_541_6);

        let a0 = 1.0 + k / q + k * k;
        Self {
            b0: (vh + vb * k / q + k * k) / a0,
            b1: 2.0 * (k * k - vh) / a0,
            b2: (vh - vb * k / q + k * k) / a0,
            a1: 2.0 * (k * k - 1.0) / a0,
            a2: (1.0 - k / q + k * k) / a0,
        }
    }

    /// BS.1770-4 pre-filter stage 2: a high-pass removing sub-sonic energy.
    pub fn k_weighting_highpass(sample_rate: f64) -> Self {
        let f0 = 38.135_470_876_139_82;
        let q = 0.500_327_037_323_877_3;

        let k = (std::f64::consts::PI * f0 / sample_rate).tan();
        let a0 = 1.0 + k / q + k * k;
        Self {
            b0: 1.0,
            b1: -2.0,
            b2: 1.0,
            a1: 2.0 * (k * k - 1.0) / a0,
            a2: (1.0 - k / q + k * k) / a0,
        }
    }

    #[inline]
    fn process_sample(&self, input: f64, state: &mut BiquadState) -> f64 {
        let output = self.b0 * input + state.z1;
        state.z1 = self.b1 * input - self.a1 * output + state.z2;
        state.z2 = self.b2 * input - self.a2 * output;
        output
    }
}

/// Cascade of biquad stages applied in sequence to a single-channel signal.
pub struct BiquadCascade {
    coeffs: Vec<BiquadCoeffs>,
    states: Vec<BiquadState>,
}

impl BiquadCascade {
    pub fn new(coeffs: Vec<BiquadCoeffs>) -> Self {
        let states = vec![BiquadState::default(); coeffs.len()];
        Self { coeffs, states }
    }

    /// The BS.1770-4 K-weighting pre-filter: shelf stage then high-pass stage.
    pub fn k_weighting(sample_rate: f64) -> Self {
        Self::new(vec![
            BiquadCoeffs::k_weighting_shelf(sample_rate),
            BiquadCoeffs::k_weighting_highpass(sample_rate),
        ])
    }

    pub fn process(&mut self, samples: &[f32]) -> Vec<f64> {
        let mut buf: Vec<f64> = samples.iter().map(|&s| s as f64).collect();
        for (stage, state) in self.coeffs.iter().zip(self.states.iter_mut()) {
            for sample in buf.iter_mut() {
                *sample = stage.process_sample(*sample, state);
            }
        }
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dc_input_settles_near_zero_after_highpass_stage() {
        let mut cascade = BiquadCascade::k_weighting(48000.0);
        let input = vec![1.0f32; 4000];
        let output = cascade.process(&input);
        let tail_mean: f64 = output[3000..].iter().sum::<f64>() / 1000.0;
        assert!(tail_mean.abs() < 0.05, "DC did not settle: {tail_mean}");
    }

    #[test]
    fn cascade_is_stable_for_white_noise_like_input() {
        let mut cascade = BiquadCascade::k_weighting(22050.0);
        let input: Vec<f32> = (0..5000)
            .map(|i| ((i * 2654435761u32) % 1000) as f32 / 500.0 - 1.0)
            .collect();
        let output = cascade.process(&input);
        assert!(output.iter().all(|v| v.is_finite()));
    }
}

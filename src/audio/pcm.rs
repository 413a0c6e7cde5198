/// Mono PCM samples at a fixed analysis sample rate.
///
/// Invariant: every sample lies in `[-1.0, 1.0]` after normalization, and
/// `samples.len()` is bounded by `duration_seconds() * sample_rate`.
#[derive(Debug, Clone)]
pub struct PcmBuffer {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl PcmBuffer {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn duration_seconds(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Samples covering `[start_s, end_s)`, clamped to the buffer's extent.
    pub fn slice_seconds(&self, start_s: f64, end_s: f64) -> &[f32] {
        let sr = self.sample_rate as f64;
        let start = ((start_s.max(0.0)) * sr).round() as usize;
        let end = ((end_s.max(0.0)) * sr).round() as usize;
        let start = start.min(self.samples.len());
        let end = end.min(self.samples.len()).max(start);
        &self.samples[start..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_matches_sample_count() {
        let pcm = PcmBuffer::new(vec![0.0; 22050], 22050);
        assert!((pcm.duration_seconds() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn slice_seconds_clamps_to_extent() {
        let pcm = PcmBuffer::new(vec![1.0; 22050], 22050);
        let s = pcm.slice_seconds(0.5, 10.0);
        assert_eq!(s.len(), 22050 / 2);
    }
}

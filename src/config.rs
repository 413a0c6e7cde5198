use std::time::Duration;

/// Analysis sample rate, in Hz. Fixed across the whole pipeline: the ingestor
/// resamples to it, the extractor windows against it, and a stored
/// fingerprint is only usable if it was built at the same rate.
pub const DEFAULT_SAMPLE_RATE: u32 = 22050;

/// Parameters for the Feature Extractor. Threaded explicitly into every
/// extraction call rather than read from process-global state, so that
/// concurrent batch workers never race on configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractorConfig {
    pub sample_rate: u32,
    pub window_ms: f32,
    pub hop_ms: f32,
    pub n_mels: usize,
    pub n_mfcc: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            window_ms: 25.0,
            hop_ms: 20.0,
            n_mels: 40,
            n_mfcc: 20,
        }
    }
}

impl ExtractorConfig {
    pub fn window_samples(&self) -> usize {
        ((self.window_ms / 1000.0) * self.sample_rate as f32).round() as usize
    }

    pub fn hop_samples(&self) -> usize {
        ((self.hop_ms / 1000.0) * self.sample_rate as f32).round() as usize
    }

    pub fn hop_seconds(&self) -> f64 {
        self.hop_ms as f64 / 1000.0
    }
}

/// Parameters for the two-pass Matcher search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatcherConfig {
    pub stride: usize,
    pub top_k: usize,
    pub min_score: f32,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            stride: 25,
            top_k: 8,
            min_score: 0.55,
        }
    }
}

/// Deadlines for the external subprocess boundaries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubprocessConfig {
    pub decode_timeout: Duration,
    pub render_timeout: Duration,
}

impl Default for SubprocessConfig {
    fn default() -> Self {
        Self {
            decode_timeout: Duration::from_secs(10 * 60),
            render_timeout: Duration::from_secs(30 * 60),
        }
    }
}

/// The full configuration record threaded through a single request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineConfig {
    pub extractor: ExtractorConfig,
    pub matcher: MatcherConfig,
    pub subprocess: SubprocessConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            extractor: ExtractorConfig::default(),
            matcher: MatcherConfig::default(),
            subprocess: SubprocessConfig::default(),
        }
    }
}

use thiserror::Error;

/// Stage a subprocess or pipeline step was running in when it failed.
///
/// Used to annotate `TimeoutError` so callers know which boundary timed out
/// without having to parse the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Decode,
    Render,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Decode => write!(f, "decode"),
            Stage::Render => write!(f, "render"),
        }
    }
}

#[derive(Error, Debug)]
pub enum DuckError {
    #[error("failed to decode audio: {0}")]
    DecodeError(String),

    #[error("reference fingerprint is incompatible with the current extractor: {0}")]
    FingerprintIncompatible(String),

    #[error("reference fingerprint is empty")]
    FingerprintEmpty,

    #[error("no intro match found (best score {best_score:.3} < min_score {min_score:.3})")]
    NoMatch { best_score: f32, min_score: f32 },

    #[error("loudness undefined: interval shorter than the 400ms gating window")]
    LoudnessUndefined,

    #[error("invalid interval: {0}")]
    InvalidInterval(String),

    #[error("renderer subprocess failed: {0}")]
    RendererError(String),

    #[error("{stage} subprocess exceeded its deadline")]
    TimeoutError { stage: Stage },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DuckError>;

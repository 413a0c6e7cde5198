//! JSON report schema, serialized exactly as documented for `--report-json`.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionSource {
    Fingerprint,
    Manual,
}

#[derive(Debug, Clone, Serialize)]
pub struct DetectedInterval {
    pub start: f64,
    pub end: f64,
    pub score: f32,
    pub source: DetectionSource,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoudnessReport {
    pub episode_lufs: Option<f32>,
    pub intro_lufs_before: Option<f32>,
    pub intro_lufs_after: Option<f32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub input: String,
    pub output: String,
    pub detected: DetectedInterval,
    pub loudness: LoudnessReport,
    pub envelope: Vec<(f64, f32)>,
    pub duration_seconds: f64,
}

impl Report {
    pub fn to_json_string(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

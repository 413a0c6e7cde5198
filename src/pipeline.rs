//! Single-episode orchestration: ingest -> features -> match -> meter ->
//! plan -> synthesize. The core never invokes the renderer itself.

use crate::audio;
use crate::config::PipelineConfig;
use crate::error::DuckError;
use crate::features;
use crate::filtergraph::{self, FiltergraphPlan};
use crate::fingerprint::ReferenceFingerprint;
use crate::loudness;
use crate::matcher;
use crate::planner::{self, GainEnvelope, PlanParams};
use crate::report::DetectionSource;
use crate::request::ProcessingRequest;

/// Everything a caller needs to render the duck and emit a report.
pub struct PipelineOutcome {
    pub source: DetectionSource,
    pub intro_start: f64,
    pub intro_end: f64,
    pub match_score: f32,
    pub episode_lufs: Option<f32>,
    pub intro_lufs_before: Option<f32>,
    pub envelope: GainEnvelope,
    pub filtergraph: FiltergraphPlan,
    pub duration_seconds: f64,
}

/// Run the core pipeline for one episode.
///
/// `reference` is required unless `request.manual_interval` is set; a
/// manual interval bypasses the matcher entirely.
pub async fn run(
    request: &ProcessingRequest,
    reference: Option<&ReferenceFingerprint>,
    config: &PipelineConfig,
) -> Result<PipelineOutcome, DuckError> {
    tracing::info!(episode = %request.episode_path.display(), "ingesting episode");
    let pcm = audio::ingest(&request.episode_path, config.extractor.sample_rate, &config.subprocess).await?;
    let duration = pcm.duration_seconds();

    let (intro_start, intro_end, match_score, source) = match request.manual_interval {
        Some(interval) => (interval.start, interval.end, 1.0, DetectionSource::Manual),
        None => {
            let reference = reference.ok_or_else(|| {
                DuckError::InvalidInterval("no manual interval and no reference fingerprint provided".into())
            })?;

            tracing::debug!("extracting candidate features");
            let candidate = features::extract(&pcm, &config.extractor);
            let reference_features = reference.feature_matrix();

            tracing::debug!("matching against reference fingerprint");
            let result = matcher::find_match(&candidate, &reference_features, &config.matcher)?;
            (result.start, result.end, result.score, DetectionSource::Fingerprint)
        }
    };

    tracing::debug!(intro_start, intro_end, "measuring loudness");
    let episode_lufs = loudness::integrated_loudness(&pcm.samples, pcm.sample_rate).ok();
    let intro_slice = pcm.slice_seconds(intro_start, intro_end);
    let intro_lufs_before = loudness::integrated_loudness(intro_slice, pcm.sample_rate).ok();

    let plan_params = PlanParams {
        intro_start,
        intro_end,
        episode_duration: duration,
        intro_loudness: intro_lufs_before,
        mode: request.mode,
        fade_seconds: request.fade_seconds,
        duck_db: request.duck_db,
        target_lufs: request.target_lufs,
    };
    tracing::debug!("planning gain envelope");
    let envelope = planner::plan(plan_params)?;

    tracing::debug!("synthesizing filtergraph");
    let plan = filtergraph::synthesize(&envelope, duration);

    Ok(PipelineOutcome {
        source,
        intro_start,
        intro_end,
        match_score,
        episode_lufs,
        intro_lufs_before,
        envelope,
        filtergraph: plan,
        duration_seconds: duration,
    })
}

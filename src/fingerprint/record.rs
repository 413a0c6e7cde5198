//! The Reference Fingerprint record and its versioned on-disk envelope.

use serde::{Deserialize, Serialize};

use crate::features::FeatureMatrix;

pub const CURRENT_VERSION: u32 = 1;

/// A persisted reference fingerprint: the feature matrix of a known intro
/// plus the metadata needed to validate compatibility and to report on a
/// match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceFingerprint {
    /// Row-major `[n_frames, n_mfcc]` feature matrix.
    pub features: Vec<f32>,
    pub n_frames: usize,
    pub sample_rate: u32,
    pub hop_length: usize,
    pub n_mfcc: usize,
    pub start_time: f32,
    pub end_time: f32,
    pub label: String,
}

impl ReferenceFingerprint {
    pub fn from_feature_matrix(
        matrix: &FeatureMatrix,
        sample_rate: u32,
        hop_length: usize,
        start_time: f32,
        end_time: f32,
        label: String,
    ) -> Self {
        let n_frames = matrix.n_frames();
        let n_mfcc = matrix.dim();
        let mut features = Vec::with_capacity(n_frames * n_mfcc);
        for r in 0..n_frames {
            features.extend(matrix.row(r).iter().copied());
        }
        Self {
            features,
            n_frames,
            sample_rate,
            hop_length,
            n_mfcc,
            start_time,
            end_time,
            label,
        }
    }

    /// Reconstruct the feature matrix, `hop_seconds` derived from
    /// `hop_length / sample_rate`.
    pub fn feature_matrix(&self) -> FeatureMatrix {
        let hop_seconds = self.hop_length as f64 / self.sample_rate as f64;
        let frames: Vec<Vec<f32>> = self
            .features
            .chunks_exact(self.n_mfcc)
            .map(|c| c.to_vec())
            .collect();
        FeatureMatrix::from_frames(frames, self.n_mfcc, hop_seconds)
    }
}

/// Versioned envelope around a `ReferenceFingerprint`, so that future field
/// additions can be migrated by bumping `CURRENT_VERSION` rather than
/// breaking existing fingerprint files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FingerprintFile {
    pub version: u32,
    pub record: ReferenceFingerprint,
}

impl FingerprintFile {
    pub fn wrap(record: ReferenceFingerprint) -> Self {
        Self {
            version: CURRENT_VERSION,
            record,
        }
    }
}

//! Save/load a Reference Fingerprint, with compatibility validation against
//! the current Feature Extractor configuration.

use std::path::Path;

use crate::config::ExtractorConfig;
use crate::error::DuckError;

use super::record::{FingerprintFile, ReferenceFingerprint, CURRENT_VERSION};

pub fn save(path: &Path, record: &ReferenceFingerprint) -> Result<(), DuckError> {
    let file = FingerprintFile::wrap(record.clone());
    let bytes = bincode::serialize(&file)
        .map_err(|e| DuckError::FingerprintIncompatible(format!("encode failed: {e}")))?;
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Load a fingerprint and validate it against `config`. Newer container
/// versions than this build knows about are rejected the same way an
/// incompatible parameter set is.
pub fn load(path: &Path, config: &ExtractorConfig) -> Result<ReferenceFingerprint, DuckError> {
    let bytes = std::fs::read(path)?;
    let file: FingerprintFile = bincode::deserialize(&bytes)
        .map_err(|e| DuckError::FingerprintIncompatible(format!("decode failed: {e}")))?;

    if file.version > CURRENT_VERSION {
        return Err(DuckError::FingerprintIncompatible(format!(
            "fingerprint container version {} is newer than supported version {}",
            file.version, CURRENT_VERSION
        )));
    }

    check_compatible(&file.record, config)?;
    Ok(file.record)
}

pub fn check_compatible(record: &ReferenceFingerprint, config: &ExtractorConfig) -> Result<(), DuckError> {
    if record.n_frames == 0 {
        return Err(DuckError::FingerprintEmpty);
    }
    if record.sample_rate != config.sample_rate {
        return Err(DuckError::FingerprintIncompatible(format!(
            "sample rate {} does not match extractor sample rate {}",
            record.sample_rate, config.sample_rate
        )));
    }
    if record.n_mfcc != config.n_mfcc {
        return Err(DuckError::FingerprintIncompatible(format!(
            "dimension {} does not match extractor dimension {}",
            record.n_mfcc, config.n_mfcc
        )));
    }
    if record.hop_length != config.hop_samples() {
        return Err(DuckError::FingerprintIncompatible(format!(
            "hop length {} does not match extractor hop length {}",
            record.hop_length,
            config.hop_samples()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureMatrix;

    fn sample_record(config: &ExtractorConfig) -> ReferenceFingerprint {
        let frames = vec![vec![0.0; config.n_mfcc]; 10];
        let matrix = FeatureMatrix::from_frames(frames, config.n_mfcc, config.hop_seconds());
        ReferenceFingerprint::from_feature_matrix(
            &matrix,
            config.sample_rate,
            config.hop_samples(),
            0.0,
            0.2,
            "test-intro".into(),
        )
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fp.bin");
        let config = ExtractorConfig::default();
        let record = sample_record(&config);

        save(&path, &record).unwrap();
        let loaded = load(&path, &config).unwrap();
        assert_eq!(loaded.n_frames, record.n_frames);
        assert_eq!(loaded.label, "test-intro");
    }

    #[test]
    fn mismatched_sample_rate_is_incompatible() {
        let config = ExtractorConfig::default();
        let mut other = config;
        other.sample_rate = 44100;
        let record = sample_record(&other);

        let err = check_compatible(&record, &config).unwrap_err();
        assert!(matches!(err, DuckError::FingerprintIncompatible(_)));
    }

    #[test]
    fn empty_fingerprint_is_rejected() {
        let config = ExtractorConfig::default();
        let matrix = FeatureMatrix::from_frames(Vec::new(), config.n_mfcc, config.hop_seconds());
        let record = ReferenceFingerprint::from_feature_matrix(
            &matrix,
            config.sample_rate,
            config.hop_samples(),
            0.0,
            0.0,
            "empty".into(),
        );
        let err = check_compatible(&record, &config).unwrap_err();
        assert!(matches!(err, DuckError::FingerprintEmpty));
    }
}

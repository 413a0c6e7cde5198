//! Two-pass fingerprint matcher: locate the reference intro's offset inside
//! a candidate episode's feature matrix.

use crate::config::MatcherConfig;
use crate::error::DuckError;
use crate::features::FeatureMatrix;

/// Result of a successful match: seconds from episode start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchResult {
    pub start: f64,
    pub end: f64,
    pub score: f32,
    pub best_offset_frames: usize,
}

fn cosine(a: ndarray::ArrayView1<f32>, b: ndarray::ArrayView1<f32>) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(&x, &y)| x * y).sum();
    let norm_a = a.iter().map(|&x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|&x| x * x).sum::<f32>().sqrt();
    if norm_a < 1e-12 || norm_b < 1e-12 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// `s(k)`: mean cosine similarity between `reference` and the `reference`-length
/// window of `candidate` starting at frame `k`.
fn score_at(candidate: &FeatureMatrix, reference: &FeatureMatrix, k: usize) -> f32 {
    let n_r = reference.n_frames();
    let total: f32 = (0..n_r)
        .map(|i| cosine(reference.row(i), candidate.row(k + i)))
        .sum();
    total / n_r as f32
}

/// Locate `reference` inside `candidate` via a coarse-then-refine search.
///
/// Returns `FingerprintEmpty` if the reference is empty, `NoMatch` if the
/// candidate is shorter than the reference or the best score falls below
/// `config.min_score`.
pub fn find_match(
    candidate: &FeatureMatrix,
    reference: &FeatureMatrix,
    config: &MatcherConfig,
) -> Result<MatchResult, DuckError> {
    let n_r = reference.n_frames();
    if n_r == 0 {
        return Err(DuckError::FingerprintEmpty);
    }

    let n_c = candidate.n_frames();
    if n_c < n_r {
        return Err(DuckError::NoMatch {
            best_score: 0.0,
            min_score: config.min_score,
        });
    }

    let max_offset = n_c - n_r;
    let stride = config.stride.max(1);

    // Coarse pass: evaluate every stride-th offset, keep the top K.
    let mut coarse: Vec<(usize, f32)> = (0..=max_offset)
        .step_by(stride)
        .map(|k| (k, score_at(candidate, reference, k)))
        .collect();
    coarse.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap().then(a.0.cmp(&b.0)));
    coarse.truncate(config.top_k.max(1));

    // Refine pass: search +/- stride around each coarse candidate.
    let mut best_offset = 0usize;
    let mut best_score = f32::NEG_INFINITY;
    for &(k_c, _) in &coarse {
        let lo = k_c.saturating_sub(stride);
        let hi = (k_c + stride).min(max_offset);
        for k in lo..=hi {
            let s = score_at(candidate, reference, k);
            if s > best_score || (s == best_score && k < best_offset) {
                best_score = s;
                best_offset = k;
            }
        }
    }

    let confidence = (best_score + 1.0) / 2.0;
    if confidence < config.min_score {
        return Err(DuckError::NoMatch {
            best_score: confidence,
            min_score: config.min_score,
        });
    }

    let start = best_offset as f64 * reference.hop_seconds;
    let end = (best_offset + n_r) as f64 * reference.hop_seconds;

    Ok(MatchResult {
        start,
        end,
        score: confidence,
        best_offset_frames: best_offset,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix_from_rows(rows: Vec<Vec<f32>>, dim: usize) -> FeatureMatrix {
        FeatureMatrix::from_frames(rows, dim, 0.02)
    }

    #[test]
    fn empty_reference_is_fingerprint_empty() {
        let reference = matrix_from_rows(Vec::new(), 4);
        let candidate = matrix_from_rows(vec![vec![1.0; 4]; 10], 4);
        let err = find_match(&candidate, &reference, &MatcherConfig::default()).unwrap_err();
        assert!(matches!(err, DuckError::FingerprintEmpty));
    }

    #[test]
    fn shorter_candidate_than_reference_is_no_match() {
        let reference = matrix_from_rows(vec![vec![1.0; 4]; 20], 4);
        let candidate = matrix_from_rows(vec![vec![1.0; 4]; 5], 4);
        let err = find_match(&candidate, &reference, &MatcherConfig::default()).unwrap_err();
        assert!(matches!(err, DuckError::NoMatch { .. }));
    }

    #[test]
    fn exact_embedded_reference_is_found_at_correct_offset() {
        let mut config = MatcherConfig::default();
        config.stride = 3;
        config.top_k = 4;

        let intro: Vec<Vec<f32>> = (0..15)
            .map(|i| vec![(i as f32).sin(), (i as f32 * 0.5).cos(), i as f32 * 0.1])
            .collect();
        let reference = matrix_from_rows(intro.clone(), 3);

        let mut episode = vec![vec![0.0, 1.0, -1.0]; 40];
        for (i, row) in intro.iter().enumerate() {
            episode[17 + i] = row.clone();
        }
        let candidate = matrix_from_rows(episode, 3);

        let result = find_match(&candidate, &reference, &config).unwrap();
        assert_eq!(result.best_offset_frames, 17);
        assert!(result.score > 0.95);
    }

    #[test]
    fn dissimilar_candidate_fails_min_score_gate() {
        let mut config = MatcherConfig::default();
        config.min_score = 0.9;

        let reference = matrix_from_rows(vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0]], 2);
        let candidate = matrix_from_rows(vec![vec![-1.0, 0.3], vec![0.2, -1.0], vec![-1.0, -1.0], vec![0.5, 0.5]], 2);
        let err = find_match(&candidate, &reference, &config).unwrap_err();
        assert!(matches!(err, DuckError::NoMatch { .. }));
    }
}

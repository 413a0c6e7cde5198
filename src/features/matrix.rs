use ndarray::{Array2, Axis};

/// Ordered sequence of feature frames for an entire audio stream: rows are
/// frames, columns are feature dimensions. `hop_seconds` gives each row's
/// timestamp as `row_index * hop_seconds`.
#[derive(Debug, Clone)]
pub struct FeatureMatrix {
    data: Array2<f32>,
    pub hop_seconds: f64,
}

impl FeatureMatrix {
    pub fn from_frames(frames: Vec<Vec<f32>>, dim: usize, hop_seconds: f64) -> Self {
        let n_frames = frames.len();
        let mut data = Array2::zeros((n_frames, dim));
        for (i, frame) in frames.into_iter().enumerate() {
            debug_assert_eq!(frame.len(), dim, "feature frame has wrong dimension");
            data.row_mut(i).assign(&ndarray::arr1(&frame));
        }
        Self { data, hop_seconds }
    }

    pub fn n_frames(&self) -> usize {
        self.data.nrows()
    }

    pub fn dim(&self) -> usize {
        self.data.ncols()
    }

    pub fn is_empty(&self) -> bool {
        self.n_frames() == 0
    }

    pub fn row(&self, i: usize) -> ndarray::ArrayView1<f32> {
        self.data.row(i)
    }

    pub fn as_array(&self) -> &Array2<f32> {
        &self.data
    }

    pub fn duration_seconds(&self) -> f64 {
        self.n_frames() as f64 * self.hop_seconds
    }

    /// z-normalize each column in place: subtract the column mean, divide by
    /// the column stddev, falling back to stddev = 1.0 when it is below
    /// `1e-6`.
    pub fn z_normalize(&mut self) {
        for mut col in self.data.axis_iter_mut(Axis(1)) {
            let n = col.len() as f32;
            if n == 0.0 {
                continue;
            }
            let mean = col.iter().sum::<f32>() / n;
            let variance = col.iter().map(|&v| (v - mean).powi(2)).sum::<f32>() / n;
            let stddev = variance.sqrt();
            let stddev = if stddev < 1e-6 { 1.0 } else { stddev };
            for v in col.iter_mut() {
                *v = (*v - mean) / stddev;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn z_normalize_zero_means_unit_variance() {
        let frames = vec![vec![1.0, 10.0], vec![2.0, 10.0], vec![3.0, 10.0]];
        let mut m = FeatureMatrix::from_frames(frames, 2, 0.02);
        m.z_normalize();

        for col_idx in 0..2 {
            let col: Vec<f32> = (0..m.n_frames()).map(|r| m.row(r)[col_idx]).collect();
            let mean = col.iter().sum::<f32>() / col.len() as f32;
            assert!(mean.abs() < 1e-3, "mean {mean} not near zero");
        }
        // Column 0 had real variance: stddev forced to ~1.
        let col0: Vec<f32> = (0..m.n_frames()).map(|r| m.row(r)[0]).collect();
        let var0 = col0.iter().map(|v| v * v).sum::<f32>() / col0.len() as f32;
        assert!((var0.sqrt() - 1.0).abs() < 1e-3);

        // Column 1 was constant: stddev forced to 1.0, values collapse to 0.
        let col1: Vec<f32> = (0..m.n_frames()).map(|r| m.row(r)[1]).collect();
        assert!(col1.iter().all(|&v| v.abs() < 1e-6));
    }

    #[test]
    fn duration_matches_frame_count_times_hop() {
        let frames = vec![vec![0.0; 4]; 100];
        let m = FeatureMatrix::from_frames(frames, 4, 0.02);
        assert!((m.duration_seconds() - 2.0).abs() < 1e-9);
    }
}

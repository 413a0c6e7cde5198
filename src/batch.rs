//! Batch driver: enumerate recognized media files in a directory and run
//! `process` on each as an independent task, aggregating a final exit code.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::task::JoinSet;

use crate::config::PipelineConfig;
use crate::fingerprint::ReferenceFingerprint;
use crate::pipeline::{self, PipelineOutcome};
use crate::request::ProcessingRequest;

const RECOGNIZED_EXTENSIONS: &[&str] = &["mkv", "mp4", "m4v", "avi", "mov"];

pub fn is_recognized_media(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| RECOGNIZED_EXTENSIONS.iter().any(|&e| e.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// Enumerate `dir` for recognized media files, optionally recursing into
/// subdirectories.
pub fn enumerate_media(dir: &Path, recursive: bool) -> std::io::Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    let mut stack = vec![dir.to_path_buf()];

    while let Some(current) = stack.pop() {
        for entry in std::fs::read_dir(&current)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_dir() {
                if recursive {
                    stack.push(path);
                }
            } else if is_recognized_media(&path) {
                found.push(path);
            }
        }
    }

    found.sort();
    Ok(found)
}

pub struct BatchItemResult {
    pub path: PathBuf,
    pub outcome: Result<PipelineOutcome, crate::error::DuckError>,
}

/// Run `process` for every item in `episodes`, as independent tasks in a
/// bounded `JoinSet`.
pub async fn run_batch(
    episodes: Vec<PathBuf>,
    build_request: impl Fn(&Path) -> ProcessingRequest,
    reference: Option<Arc<ReferenceFingerprint>>,
    config: Arc<PipelineConfig>,
) -> Vec<BatchItemResult> {
    let mut tasks = JoinSet::new();

    for path in episodes {
        let request = build_request(&path);
        let reference = reference.clone();
        let config = config.clone();
        tasks.spawn(async move {
            let outcome = pipeline::run(&request, reference.as_deref(), &config).await;
            BatchItemResult { path, outcome }
        });
    }

    let mut results = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(item) => results.push(item),
            Err(join_err) => {
                tracing::error!("batch task panicked: {join_err}");
            }
        }
    }

    results
}

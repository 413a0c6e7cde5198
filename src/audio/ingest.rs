//! Audio Ingestor: decode an episode to mono PCM at the analysis sample rate.
//!
//! The actual codec work and resampling happens in the external decode
//! subprocess (ffmpeg); this module only probes the channel layout, builds
//! the explicit equal-weight downmix expression, and parses the raw PCM that
//! comes back.

use std::path::Path;
use std::time::Duration;

use crate::config::SubprocessConfig;
use crate::error::{DuckError, Stage};
use crate::subprocess;

use super::pcm::PcmBuffer;

/// Probe the first audio stream's channel count with ffprobe.
///
/// Returns `DecodeError` if the file has no audio stream.
async fn probe_channels(path: &Path, timeout: Duration) -> Result<u32, DuckError> {
    let path_str = path.to_string_lossy();
    let out = subprocess::run(
        "ffprobe",
        &[
            "-v",
            "error",
            "-select_streams",
            "a:0",
            "-show_entries",
            "stream=channels",
            "-of",
            "csv=p=0",
            &path_str,
        ],
        timeout,
        Stage::Decode,
        DuckError::DecodeError,
    )
    .await?;

    let text = String::from_utf8_lossy(&out.stdout);
    let channels: u32 = text
        .trim()
        .parse()
        .map_err(|_| DuckError::DecodeError(format!("no audio stream found in {}", path.display())))?;

    if channels == 0 {
        return Err(DuckError::DecodeError(format!(
            "no audio stream found in {}",
            path.display()
        )));
    }

    Ok(channels)
}

/// Build an explicit equal-weight downmix `pan` filter for `channels` input
/// channels, matching "downmix by equal-weight sum then scale by
/// 1/channels".
fn equal_weight_pan_filter(channels: u32) -> String {
    let weight = 1.0 / channels as f64;
    let terms: Vec<String> = (0..channels)
        .map(|c| format!("{weight:.6}*c{c}"))
        .collect();
    format!("pan=mono|c0={}", terms.join("+"))
}

/// Decode `path` to mono PCM at `sample_rate` Hz via an ffmpeg subprocess.
pub async fn ingest(
    path: &Path,
    sample_rate: u32,
    subprocess_cfg: &SubprocessConfig,
) -> Result<PcmBuffer, DuckError> {
    if !path.exists() {
        return Err(DuckError::DecodeError(format!(
            "file not found: {}",
            path.display()
        )));
    }

    let channels = probe_channels(path, subprocess_cfg.decode_timeout).await?;
    let pan_filter = equal_weight_pan_filter(channels);
    let path_str = path.to_string_lossy();
    let sr_str = sample_rate.to_string();

    let out = subprocess::run(
        "ffmpeg",
        &[
            "-v",
            "error",
            "-i",
            &path_str,
            "-map",
            "0:a:0",
            "-vn",
            "-sn",
            "-af",
            &pan_filter,
            "-ar",
            &sr_str,
            "-f",
            "f32le",
            "pipe:1",
        ],
        subprocess_cfg.decode_timeout,
        Stage::Decode,
        DuckError::DecodeError,
    )
    .await?;

    let samples = bytes_to_f32(&out.stdout);
    if samples.is_empty() {
        return Err(DuckError::DecodeError(format!(
            "decoded zero samples from {}",
            path.display()
        )));
    }

    Ok(PcmBuffer::new(samples, sample_rate))
}

fn bytes_to_f32(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

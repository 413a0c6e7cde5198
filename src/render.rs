//! CLI-side renderer subprocess invocation. Reuses the same `subprocess`
//! abstraction as the Ingestor; the core never calls this itself.

use std::path::Path;

use crate::config::SubprocessConfig;
use crate::error::{DuckError, Stage};
use crate::filtergraph::FiltergraphPlan;
use crate::subprocess;

pub async fn render(
    input: &Path,
    output: &Path,
    plan: &FiltergraphPlan,
    subprocess_cfg: &SubprocessConfig,
) -> Result<(), DuckError> {
    let input_str = input.to_string_lossy();
    let output_str = output.to_string_lossy();

    let mut args: Vec<&str> = vec!["-y", "-i", &input_str, "-af", &plan.volume_filter];
    args.extend_from_slice(&plan.video_codec_copy);
    args.extend_from_slice(&plan.subtitle_codec_copy);
    args.push(&output_str);

    subprocess::run(
        "ffmpeg",
        &args,
        subprocess_cfg.render_timeout,
        Stage::Render,
        DuckError::RendererError,
    )
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filtergraph;
    use crate::planner::GainEnvelope;

    #[tokio::test]
    async fn missing_binary_surfaces_as_renderer_error() {
        // ffmpeg is assumed present in CI images; this exercises the error
        // path via a nonexistent input instead of stubbing the binary.
        let envelope = GainEnvelope {
            breakpoints: vec![(0.0, 0.0)],
        };
        let plan = filtergraph::synthesize(&envelope, 1.0);
        let err = render(
            Path::new("/nonexistent/input.mkv"),
            Path::new("/tmp/introfade-render-test-output.mkv"),
            &plan,
            &SubprocessConfig::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, DuckError::RendererError(_) | DuckError::TimeoutError { .. }));
    }
}

//! Filtergraph Synthesizer: turn a Gain Envelope into an ffmpeg `volume`
//! filter expression for the external renderer.

use crate::planner::GainEnvelope;

/// Everything the renderer needs to apply a duck: the audio filter
/// expression plus the pass-through directives for the other streams.
#[derive(Debug, Clone, PartialEq)]
pub struct FiltergraphPlan {
    /// A full `volume=eval=frame:volume='...'` filter expression.
    pub volume_filter: String,
    pub duration_seconds: f64,
    /// `-c:v copy`, as separate argv tokens.
    pub video_codec_copy: [&'static str; 2],
    /// `-c:s copy`, as separate argv tokens.
    pub subtitle_codec_copy: [&'static str; 2],
}

fn segment_amplitude_expr(t0: f64, g0: f32, t1: f64, g1: f32) -> String {
    let db_expr = format!("({g0})+(({g1})-({g0}))*(t-({t0}))/(({t1})-({t0}))");
    format!("pow(10,({db_expr})/20)")
}

fn hold_amplitude_expr(gain_db: f32) -> String {
    format!("pow(10,({gain_db})/20)")
}

/// Build the nested `if(between(t,a,b), ..., ...)` expression that evaluates
/// to `10^(envelope(t)/20)` at any playback time `t`.
fn build_volume_expr(envelope: &GainEnvelope) -> String {
    let points = &envelope.breakpoints;
    if points.is_empty() {
        return "1.0".to_string();
    }
    if points.len() == 1 {
        return hold_amplitude_expr(points[0].1);
    }

    let (_, last_g) = points[points.len() - 1];
    let mut expr = hold_amplitude_expr(last_g);
    for w in points.windows(2).rev() {
        let (t0, g0) = w[0];
        let (t1, g1) = w[1];
        let amp = segment_amplitude_expr(t0, g0, t1, g1);
        expr = format!("if(between(t,{t0},{t1}),{amp},{expr})");
    }
    let (first_t, first_g) = points[0];
    format!("if(lt(t,{first_t}),{},{expr})", hold_amplitude_expr(first_g))
}

/// Serialize `envelope` into a `FiltergraphPlan` covering `duration_seconds`
/// of audio.
pub fn synthesize(envelope: &GainEnvelope, duration_seconds: f64) -> FiltergraphPlan {
    let expr = build_volume_expr(envelope);
    FiltergraphPlan {
        volume_filter: format!("volume=eval=frame:volume='{expr}'"),
        duration_seconds,
        video_codec_copy: ["-c:v", "copy"],
        subtitle_codec_copy: ["-c:s", "copy"],
    }
}

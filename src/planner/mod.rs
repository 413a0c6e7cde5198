//! Gain Planner: turn a detected interval and loudness measurements into a
//! piecewise-linear Gain Envelope with click-free fades.

use crate::error::DuckError;

const MIN_FADE_SECONDS: f64 = 0.02;
const TARGET_LUFS_CLAMP: (f32, f32) = (-24.0, 0.0);

/// Plateau used when `target_lufs` mode falls back to `fixed_db` (intro
/// loudness undefined) and no `duck_db` was supplied to fall back to.
const DEFAULT_FALLBACK_DUCK_DB: f32 = -10.0;

/// How the plateau gain of the duck is chosen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mode {
    FixedDb,
    TargetLufs,
}

/// A piecewise-linear gain curve: `(t_i, gain_db_i)` with strictly
/// increasing `t_i`. Outside the first/last breakpoint the gain holds at
/// the endpoint value.
#[derive(Debug, Clone, PartialEq)]
pub struct GainEnvelope {
    pub breakpoints: Vec<(f64, f32)>,
}

impl GainEnvelope {
    /// Linear interpolation between breakpoints, held flat outside the range.
    pub fn value_at(&self, t: f64) -> f32 {
        let points = &self.breakpoints;
        if points.is_empty() {
            return 0.0;
        }
        if t <= points[0].0 {
            return points[0].1;
        }
        if t >= points[points.len() - 1].0 {
            return points[points.len() - 1].1;
        }
        for w in points.windows(2) {
            let (t0, g0) = w[0];
            let (t1, g1) = w[1];
            if t >= t0 && t <= t1 {
                let frac = (t - t0) / (t1 - t0);
                return g0 + (g1 - g0) * frac as f32;
            }
        }
        points[points.len() - 1].1
    }
}

/// Parameters accepted by [`plan`], mirroring the Processing Request fields
/// that feed the planner.
#[derive(Debug, Clone, Copy)]
pub struct PlanParams {
    pub intro_start: f64,
    pub intro_end: f64,
    pub episode_duration: f64,
    pub intro_loudness: Option<f32>,
    pub mode: Mode,
    pub fade_seconds: f64,
    pub duck_db: Option<f32>,
    pub target_lufs: Option<f32>,
}

fn validate_bounds(params: &PlanParams) -> Result<(), DuckError> {
    if params.fade_seconds < MIN_FADE_SECONDS {
        return Err(DuckError::InvalidInterval(format!(
            "fade of {}s is below the {}s minimum required to avoid clicks",
            params.fade_seconds, MIN_FADE_SECONDS
        )));
    }
    if params.intro_start < 0.0 {
        return Err(DuckError::InvalidInterval("intro_start is negative".into()));
    }
    if params.intro_start >= params.intro_end {
        return Err(DuckError::InvalidInterval(
            "intro_start must be strictly before intro_end".into(),
        ));
    }
    if params.intro_end > params.episode_duration {
        return Err(DuckError::InvalidInterval(
            "intro_end exceeds the episode duration".into(),
        ));
    }
    Ok(())
}

fn plateau_for(params: &PlanParams) -> Result<f32, DuckError> {
    match params.mode {
        Mode::FixedDb => {
            let db = params
                .duck_db
                .ok_or_else(|| DuckError::InvalidInterval("fixed_db mode requires duck_db".into()))?;
            if db > 0.0 {
                return Err(DuckError::InvalidInterval(format!(
                    "duck_db {db} is positive (amplifying); boost is not supported"
                )));
            }
            Ok(db)
        }
        Mode::TargetLufs => match params.intro_loudness {
            None => plateau_for(&PlanParams {
                mode: Mode::FixedDb,
                duck_db: Some(params.duck_db.unwrap_or(DEFAULT_FALLBACK_DUCK_DB)),
                ..*params
            }),
            Some(intro_lufs) => {
                let target = params.target_lufs.ok_or_else(|| {
                    DuckError::InvalidInterval("target_lufs mode requires target_lufs".into())
                })?;
                let raw = target - intro_lufs;
                Ok(raw.clamp(TARGET_LUFS_CLAMP.0, TARGET_LUFS_CLAMP.1))
            }
        },
    }
}

/// Build the Gain Envelope for `params`.
///
/// Falls back to `fixed_db` when `target_lufs` mode is requested but the
/// intro's loudness is undefined, producing the same envelope `fixed_db`
/// would for the same `duck_db`. If no `duck_db` was supplied either (the
/// caller only gave `target_lufs`), `DEFAULT_FALLBACK_DUCK_DB` is used so
/// the fallback still produces a plan instead of failing.
pub fn plan(params: PlanParams) -> Result<GainEnvelope, DuckError> {
    validate_bounds(&params)?;
    let plateau = plateau_for(&params)?;

    let mut points: Vec<(f64, f32)> = vec![(0.0, 0.0)];
    push_distinct(&mut points, (params.intro_start, 0.0));

    let interval = params.intro_end - params.intro_start;
    if 2.0 * params.fade_seconds >= interval {
        let midpoint = (params.intro_start + params.intro_end) / 2.0;
        push_distinct(&mut points, (midpoint, plateau));
    } else {
        push_distinct(&mut points, (params.intro_start + params.fade_seconds, plateau));
        push_distinct(&mut points, (params.intro_end - params.fade_seconds, plateau));
    }
    push_distinct(&mut points, (params.intro_end, 0.0));

    Ok(GainEnvelope { breakpoints: points })
}

fn push_distinct(points: &mut Vec<(f64, f32)>, point: (f64, f32)) {
    if let Some(last) = points.last() {
        if point.0 <= last.0 {
            return;
        }
    }
    points.push(point);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_params() -> PlanParams {
        PlanParams {
            intro_start: 10.0,
            intro_end: 40.0,
            episode_duration: 1200.0,
            intro_loudness: None,
            mode: Mode::FixedDb,
            fade_seconds: 0.5,
            duck_db: Some(-10.0),
            target_lufs: None,
        }
    }

    #[test]
    fn fixed_db_plateau_matches_duck_db() {
        let envelope = plan(base_params()).unwrap();
        let plateau_points: Vec<f32> = envelope.breakpoints.iter().map(|&(_, g)| g).collect();
        assert!(plateau_points.contains(&-10.0));
    }

    #[test]
    fn positive_duck_db_is_rejected() {
        let mut params = base_params();
        params.duck_db = Some(5.0);
        let err = plan(params).unwrap_err();
        assert!(matches!(err, DuckError::InvalidInterval(_)));
    }

    #[test]
    fn target_lufs_mode_clamps_to_range() {
        let mut params = base_params();
        params.mode = Mode::TargetLufs;
        params.intro_loudness = Some(-5.0);
        params.target_lufs = Some(-60.0); // would need -55dB, clamp to -24
        let envelope = plan(params).unwrap();
        let plateau = envelope
            .breakpoints
            .iter()
            .map(|&(_, g)| g)
            .fold(f32::INFINITY, f32::min);
        assert_eq!(plateau, -24.0);
    }

    #[test]
    fn target_lufs_falls_back_to_fixed_db_when_intro_loudness_undefined() {
        let mut fixed = base_params();
        fixed.mode = Mode::FixedDb;
        let fixed_envelope = plan(fixed).unwrap();

        let mut target = base_params();
        target.mode = Mode::TargetLufs;
        target.intro_loudness = None;
        target.target_lufs = Some(-23.0);
        let target_envelope = plan(target).unwrap();

        assert_eq!(fixed_envelope, target_envelope);
    }

    #[test]
    fn target_lufs_fallback_without_duck_db_still_yields_a_plan() {
        let mut params = base_params();
        params.mode = Mode::TargetLufs;
        params.intro_loudness = None;
        params.duck_db = None;
        params.target_lufs = Some(-23.0);

        let envelope = plan(params).unwrap();
        let plateau = envelope
            .breakpoints
            .iter()
            .map(|&(_, g)| g)
            .fold(f32::INFINITY, f32::min);
        assert_eq!(plateau, DEFAULT_FALLBACK_DUCK_DB);
    }

    #[test]
    fn overlapping_fades_collapse_to_single_midpoint() {
        let mut params = base_params();
        params.intro_start = 0.0;
        params.intro_end = 0.5;
        params.fade_seconds = 0.4; // 2*0.4 = 0.8 >= 0.5
        let envelope = plan(params).unwrap();
        // (0,0) collapses into the interval-start point, leaving 3 breakpoints.
        assert_eq!(envelope.breakpoints.len(), 3);
        assert_eq!(envelope.breakpoints[1].0, 0.25);
    }

    #[test]
    fn envelope_endpoints_are_zero_db() {
        let envelope = plan(base_params()).unwrap();
        assert_eq!(envelope.value_at(0.0), 0.0);
        assert_eq!(envelope.value_at(1200.0), 0.0);
    }

    #[test]
    fn fade_below_minimum_is_invalid() {
        let mut params = base_params();
        params.fade_seconds = 0.001;
        let err = plan(params).unwrap_err();
        assert!(matches!(err, DuckError::InvalidInterval(_)));
    }

    #[test]
    fn intro_end_beyond_episode_duration_is_invalid() {
        let mut params = base_params();
        params.intro_end = 2000.0;
        let err = plan(params).unwrap_err();
        assert!(matches!(err, DuckError::InvalidInterval(_)));
    }
}

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};

use introfade::config::PipelineConfig;
use introfade::error::DuckError;
use introfade::planner::Mode;
use introfade::report::{DetectedInterval, LoudnessReport, Report};
use introfade::request::{ManualInterval, ProcessingRequest};
use introfade::{batch, fingerprint, pipeline, preset, render, timecode};

#[derive(Parser)]
#[command(name = "introfade", version, about = "Detect and duck TV episode intros")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Detect the intro, plan a duck, and render the output file.
    Process(ProcessArgs),
    /// Run detection only; print the result and write no file.
    Analyze(AnalyzeArgs),
    /// Apply `process` to every recognized media file in a directory.
    Batch(BatchArgs),
}

#[derive(Args)]
struct ProcessArgs {
    file: PathBuf,

    #[arg(long)]
    preset: Option<String>,
    #[arg(long)]
    fingerprint: Option<PathBuf>,
    #[arg(long, default_value = "presets")]
    presets_dir: PathBuf,

    #[arg(long)]
    intro_start: Option<String>,
    #[arg(long)]
    intro_end: Option<String>,

    #[arg(long)]
    duck_db: Option<f32>,
    #[arg(long)]
    target_intro_lufs: Option<f32>,
    #[arg(long)]
    fade: Option<f64>,

    #[arg(long)]
    report_json: Option<PathBuf>,
    #[arg(long)]
    require_match: bool,

    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct AnalyzeArgs {
    file: PathBuf,
    #[arg(long)]
    preset: String,
    #[arg(long, default_value = "presets")]
    presets_dir: PathBuf,
}

#[derive(Args)]
struct BatchArgs {
    dir: PathBuf,
    #[arg(long)]
    preset: String,
    #[arg(long, default_value = "presets")]
    presets_dir: PathBuf,
    #[arg(long)]
    recursive: bool,
}

const EXIT_OK: u8 = 0;
const EXIT_GENERIC: u8 = 1;
const EXIT_NO_MATCH: u8 = 2;
const EXIT_INVALID_ARGS: u8 = 3;
const EXIT_EXTERNAL_TOOL: u8 = 4;

fn exit_code_for(err: &DuckError) -> u8 {
    match err {
        DuckError::NoMatch { .. } => EXIT_NO_MATCH,
        DuckError::InvalidInterval(_) => EXIT_INVALID_ARGS,
        DuckError::DecodeError(_) | DuckError::RendererError(_) | DuckError::TimeoutError { .. } => {
            EXIT_EXTERNAL_TOOL
        }
        DuckError::FingerprintIncompatible(_) | DuckError::FingerprintEmpty | DuckError::LoudnessUndefined => {
            EXIT_GENERIC
        }
        DuckError::Io(_) => EXIT_GENERIC,
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();
}

/// Build a `ProcessingRequest` and resolve the reference fingerprint path,
/// from either `--fingerprint` or `--preset`.
fn resolve_request(args: &ProcessArgs) -> Result<(ProcessingRequest, Option<PathBuf>), DuckError> {
    let mut duck_db = args.duck_db;
    let mut fade_seconds = args.fade;
    let mut target_lufs = args.target_intro_lufs;
    let mut fingerprint_path = args.fingerprint.clone();

    if fingerprint_path.is_none() {
        if let Some(name) = &args.preset {
            let resolved = preset::load(&args.presets_dir, name)?;
            fingerprint_path = Some(resolved.fingerprint_path);
            duck_db = duck_db.or(Some(resolved.duck_db));
            fade_seconds = fade_seconds.or(Some(resolved.fade_seconds as f64));
            target_lufs = target_lufs.or(resolved.target_lufs);
        }
    }
    let fade_seconds = fade_seconds.unwrap_or(0.5);

    if duck_db.is_some() && target_lufs.is_some() {
        return Err(DuckError::InvalidInterval(
            "--duck-db and --target-intro-lufs are mutually exclusive".into(),
        ));
    }

    let manual_interval = match (&args.intro_start, &args.intro_end) {
        (Some(start), Some(end)) => Some(ManualInterval {
            start: timecode::parse_timecode(start)?,
            end: timecode::parse_timecode(end)?,
        }),
        (None, None) => None,
        _ => {
            return Err(DuckError::InvalidInterval(
                "--intro-start and --intro-end must be given together".into(),
            ))
        }
    };

    let mode = if target_lufs.is_some() {
        Mode::TargetLufs
    } else {
        Mode::FixedDb
    };

    let request = ProcessingRequest {
        episode_path: args.file.clone(),
        fingerprint_path: fingerprint_path.clone(),
        mode,
        duck_db,
        target_lufs,
        fade_seconds,
        manual_interval,
        require_match: args.require_match,
    };

    Ok((request, fingerprint_path))
}

async fn run_process(args: ProcessArgs) -> Result<u8, DuckError> {
    let config = PipelineConfig::default();
    let (request, fingerprint_path) = resolve_request(&args)?;

    let reference = match &fingerprint_path {
        Some(path) => Some(fingerprint::load(path, &config.extractor)?),
        None if request.manual_interval.is_some() => None,
        None => {
            return Err(DuckError::InvalidInterval(
                "no --preset, --fingerprint, or manual interval was given".into(),
            ))
        }
    };

    let outcome = pipeline::run(&request, reference.as_ref(), &config).await?;

    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&args.file));
    render::render(&args.file, &output_path, &outcome.filtergraph, &config.subprocess).await?;

    if let Some(report_path) = &args.report_json {
        let report = Report {
            input: args.file.display().to_string(),
            output: output_path.display().to_string(),
            detected: DetectedInterval {
                start: outcome.intro_start,
                end: outcome.intro_end,
                score: outcome.match_score,
                source: outcome.source,
            },
            loudness: LoudnessReport {
                episode_lufs: outcome.episode_lufs,
                intro_lufs_before: outcome.intro_lufs_before,
                intro_lufs_after: None,
            },
            envelope: outcome.envelope.breakpoints.clone(),
            duration_seconds: outcome.duration_seconds,
        };
        let json = report
            .to_json_string()
            .map_err(|e| DuckError::InvalidInterval(format!("failed to serialize report: {e}")))?;
        std::fs::write(report_path, json)?;
    }

    Ok(EXIT_OK)
}

async fn run_analyze(args: AnalyzeArgs) -> Result<u8, DuckError> {
    let config = PipelineConfig::default();
    let preset = preset::load(&args.presets_dir, &args.preset)?;
    let reference = fingerprint::load(&preset.fingerprint_path, &config.extractor)?;

    let request = ProcessingRequest {
        episode_path: args.file.clone(),
        fingerprint_path: Some(preset.fingerprint_path.clone()),
        mode: Mode::FixedDb,
        duck_db: Some(preset.duck_db),
        target_lufs: preset.target_lufs,
        fade_seconds: preset.fade_seconds as f64,
        manual_interval: None,
        require_match: false,
    };

    match pipeline::run(&request, Some(&reference), &config).await {
        Ok(outcome) => {
            println!(
                "intro detected: {:.3}s - {:.3}s (score {:.3})",
                outcome.intro_start, outcome.intro_end, outcome.match_score
            );
            Ok(EXIT_OK)
        }
        Err(DuckError::NoMatch { best_score, min_score }) => {
            println!("no intro match found (best score {best_score:.3} < {min_score:.3})");
            Ok(EXIT_NO_MATCH)
        }
        Err(err) => Err(err),
    }
}

async fn run_batch(args: BatchArgs) -> Result<u8, DuckError> {
    let config = Arc::new(PipelineConfig::default());
    let preset = preset::load(&args.presets_dir, &args.preset)?;
    let reference = Arc::new(fingerprint::load(&preset.fingerprint_path, &config.extractor)?);

    let episodes = batch::enumerate_media(&args.dir, args.recursive)?;
    if episodes.is_empty() {
        tracing::warn!(dir = %args.dir.display(), "no recognized media files found");
    }

    let preset = Arc::new(preset);
    let build_request = {
        let preset = preset.clone();
        move |path: &std::path::Path| ProcessingRequest {
            episode_path: path.to_path_buf(),
            fingerprint_path: Some(preset.fingerprint_path.clone()),
            mode: Mode::FixedDb,
            duck_db: Some(preset.duck_db),
            target_lufs: preset.target_lufs,
            fade_seconds: preset.fade_seconds as f64,
            manual_interval: None,
            require_match: false,
        }
    };

    let results = batch::run_batch(episodes, build_request, Some(reference), config.clone()).await;

    let mut had_failure = false;
    for item in &results {
        match &item.outcome {
            Ok(outcome) => {
                let output_path = default_output_path(&item.path);
                if let Err(err) = render::render(&item.path, &output_path, &outcome.filtergraph, &config.subprocess).await {
                    tracing::error!(path = %item.path.display(), "render failed: {err}");
                    had_failure = true;
                }
            }
            Err(DuckError::NoMatch { .. }) => {
                tracing::info!(path = %item.path.display(), "no intro match, skipping");
            }
            Err(err) => {
                tracing::error!(path = %item.path.display(), "processing failed: {err}");
                had_failure = true;
            }
        }
    }

    Ok(if had_failure { EXIT_GENERIC } else { EXIT_OK })
}

fn default_output_path(input: &std::path::Path) -> PathBuf {
    let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("output");
    let ext = input.extension().and_then(|s| s.to_str()).unwrap_or("mkv");
    input.with_file_name(format!("{stem}.ducked.{ext}"))
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Process(args) => run_process(args).await,
        Command::Analyze(args) => run_analyze(args).await,
        Command::Batch(args) => run_batch(args).await,
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            tracing::error!("{err}");
            ExitCode::from(exit_code_for(&err))
        }
    }
}

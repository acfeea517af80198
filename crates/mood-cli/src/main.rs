mod capture;
mod classifier;
mod config;
mod popup;
mod render;
mod session;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use mood_core::{COMPLIMENTS, Emotion, FrameSize, Monitor, Stabilizer, TieBreak, catalog};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::capture::DirectorySource;
use crate::classifier::{AnyClassifier, HttpClassifier, ScriptedClassifier};
use crate::config::{Config, DEFAULT_CLASSIFIER_URL, PopupBackend};
use crate::popup::AnyNotifier;
use crate::render::{QuitSignal, TerminalSurface};
use crate::session::{Exit, Session};

#[derive(Parser)]
#[command(name = "moodwatch", about = "Webcam emotion monitor with supportive popups")]
struct Cli {
    /// Path to a TOML config file (defaults to $MOODWATCH_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch a frame stream and react to the stable emotion
    Run(RunArgs),

    /// Print the stable emotion after each label in a sequence
    Smooth {
        /// Raw labels, oldest first
        #[arg(required = true)]
        labels: Vec<String>,

        /// Tie-break rule between equally frequent labels
        #[arg(long, value_enum)]
        tie_break: Option<TieBreakArg>,
    },

    /// List the compliment catalog and which emotions draw from it
    Catalog,
}

#[derive(clap::Args)]
struct RunArgs {
    /// Directory of frame images to replay in name order
    #[arg(long)]
    frames: Option<PathBuf>,

    /// Base URL of the facial-analysis service
    #[arg(long)]
    classifier_url: Option<String>,

    /// JSON-lines file of canned analysis responses (replaces the service)
    #[arg(long, conflicts_with = "classifier_url")]
    script: Option<PathBuf>,

    /// Frames per second to pace the replay at (0 = as fast as possible)
    #[arg(long)]
    fps: Option<f64>,

    /// Restart from the first frame when the directory is exhausted
    #[arg(long = "loop")]
    looping: bool,

    /// Where popups go
    #[arg(long, value_enum)]
    popup: Option<PopupBackend>,

    /// Seed for trigger and message randomness
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum TieBreakArg {
    MostRecent,
    FirstSeen,
}

impl From<TieBreakArg> for TieBreak {
    fn from(arg: TieBreakArg) -> Self {
        match arg {
            TieBreakArg::MostRecent => TieBreak::MostRecent,
            TieBreakArg::FirstSeen => TieBreak::FirstSeen,
        }
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Run(args) => cmd_run(&cli, args).await,
        Commands::Smooth { labels, tie_break } => cmd_smooth(&cli, labels, *tie_break),
        Commands::Catalog => cmd_catalog(),
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    Config::load(cli.config.as_deref()).context("failed to load configuration")
}

fn open_classifier(config: &Config, args: &RunArgs) -> Result<AnyClassifier> {
    let script = args.script.as_deref().or(if args.classifier_url.is_some() {
        None
    } else {
        config.classifier.script.as_deref()
    });

    if let Some(path) = script {
        return Ok(AnyClassifier::Scripted(ScriptedClassifier::open(path)?));
    }

    let url = args
        .classifier_url
        .as_deref()
        .or(config.classifier.url.as_deref())
        .unwrap_or(DEFAULT_CLASSIFIER_URL);
    let http = HttpClassifier::new(
        url,
        &config.classifier.detector_backend,
        Duration::from_secs(config.classifier.timeout_secs),
    )?;
    Ok(AnyClassifier::Http(http))
}

async fn cmd_run(cli: &Cli, args: &RunArgs) -> Result<()> {
    let config = load_config(cli)?;

    let Some(frames_dir) = args.frames.as_deref().or(config.capture.frames.as_deref()) else {
        bail!("no frame source: pass --frames or set [capture].frames");
    };
    let fps = args.fps.unwrap_or(config.capture.fps);
    let looping = args.looping || config.capture.looping;
    let size = FrameSize::new(config.capture.width, config.capture.height);

    let source = open_source(frames_dir, fps, looping, size)?;
    let classifier = open_classifier(&config, args)?;
    let notifier = AnyNotifier::for_backend(args.popup.unwrap_or(config.popup.backend));
    let rng = match args.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_os_rng(),
    };

    println!("Press 'q' then Enter to quit");
    let session = Session {
        source,
        classifier,
        surface: TerminalSurface::new(std::io::stdout(), QuitSignal::listen()),
        monitor: Monitor::new(&config.tuning),
        rng,
        notifier: &notifier,
    };
    let summary = session.run().await?;

    let reason = match summary.exit {
        Exit::Quit => "quit",
        Exit::EndOfStream => "end of stream",
    };
    println!(
        "stopped ({reason}): frames={}, samples={}, failures={}, popups={}",
        summary.frames, summary.samples, summary.failures, summary.popups
    );
    Ok(())
}

fn open_source(dir: &Path, fps: f64, looping: bool, size: FrameSize) -> Result<DirectorySource> {
    let source = DirectorySource::open(dir, fps, looping, size).context("could not access camera")?;
    tracing::debug!("{} frames queued", source.frame_count());
    Ok(source)
}

fn cmd_smooth(cli: &Cli, labels: &[String], tie_break: Option<TieBreakArg>) -> Result<()> {
    let config = load_config(cli)?;
    let tie_break = tie_break.map(TieBreak::from).unwrap_or(config.tuning.tie_break);
    let mut stabilizer = Stabilizer::new(config.tuning.history_length, tie_break);

    for raw in labels {
        let label: Emotion = raw.parse().with_context(|| format!("bad label '{raw}'"))?;
        let stable = stabilizer.observe(label);
        println!("{label:<8} -> {stable}");
    }
    Ok(())
}

fn cmd_catalog() -> Result<()> {
    for (idx, message) in COMPLIMENTS.iter().enumerate() {
        let used_by: Vec<&str> = Emotion::ALL
            .into_iter()
            .filter(|e| catalog::slice_for(*e).contains(&idx))
            .map(Emotion::as_str)
            .collect();
        println!("{idx}  {message}  [{}]", used_by.join(", "));
    }
    Ok(())
}

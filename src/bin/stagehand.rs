use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "stagehand", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the resolved timeline as JSON.
    Resolve(ResolveArgs),
    /// Print every element's property values at one instant.
    Sample(SampleArgs),
    /// Print one JSON line per frame over a single cycle.
    Trace(TraceArgs),
    /// Print the static end-state summary.
    Summary(SummaryArgs),
}

#[derive(Parser, Debug)]
struct ResolveArgs {
    /// Input document JSON (scene + sequence).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Seed for randomized geometry (overrides the document).
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Parser, Debug)]
struct SampleArgs {
    /// Input document JSON (scene + sequence).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Seconds into the first cycle.
    #[arg(long)]
    at: f64,

    /// Seed for randomized geometry (overrides the document).
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Parser, Debug)]
struct TraceArgs {
    /// Input document JSON (scene + sequence).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Frames per second.
    #[arg(long, default_value_t = 30.0)]
    fps: f64,

    /// Seed for randomized geometry (overrides the document).
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Parser, Debug)]
struct SummaryArgs {
    /// Input document JSON (scene + sequence).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Print JSON instead of text lines.
    #[arg(long)]
    json: bool,
}

/// A scene and the sequence that animates it.
#[derive(serde::Deserialize, Debug)]
struct Document {
    scene: stagehand::Scene,
    sequence: stagehand::SequenceDef,
    #[serde(default)]
    opts: stagehand::MountOpts,
}

fn main() -> anyhow::Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .try_init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Resolve(args) => cmd_resolve(args),
        Command::Sample(args) => cmd_sample(args),
        Command::Trace(args) => cmd_trace(args),
        Command::Summary(args) => cmd_summary(args),
    }
}

fn read_document(path: &Path) -> anyhow::Result<Document> {
    let f = File::open(path).with_context(|| format!("open document '{}'", path.display()))?;
    let r = BufReader::new(f);
    let doc: Document = serde_json::from_reader(r).with_context(|| "parse document JSON")?;
    doc.sequence.validate()?;
    Ok(doc)
}

fn animated_opts(doc: &Document, seed: Option<u64>) -> stagehand::MountOpts {
    stagehand::MountOpts {
        static_render: false,
        seed: seed.unwrap_or(doc.opts.seed),
        overlap: doc.opts.overlap,
    }
}

/// Mount paused at rest so frames can be rendered by seeking.
fn mount_paused(doc: &mut Document, seed: Option<u64>) -> anyhow::Result<stagehand::Sequencer> {
    let opts = animated_opts(doc, seed);
    let presentation = stagehand::mount(
        &doc.sequence,
        &mut doc.scene,
        &stagehand::FixedMotion(true),
        &opts,
    )
    .with_context(|| format!("mount sequence '{}'", doc.sequence.name))?;
    match presentation {
        stagehand::Presentation::Animated(seq) => Ok(seq),
        stagehand::Presentation::Static(_) => anyhow::bail!("static presentation (bug)"),
    }
}

fn cmd_resolve(args: ResolveArgs) -> anyhow::Result<()> {
    let mut doc = read_document(&args.in_path)?;
    let seq = mount_paused(&mut doc, args.seed)?;

    let out = serde_json::to_string_pretty(seq.timeline().as_ref())
        .with_context(|| "serialize timeline")?;
    println!("{out}");
    Ok(())
}

fn cmd_sample(args: SampleArgs) -> anyhow::Result<()> {
    let mut doc = read_document(&args.in_path)?;
    let mut seq = mount_paused(&mut doc, args.seed)?;
    seq.seek(args.at);
    seq.tick(0.0, &mut doc.scene);

    let out = serde_json::to_string_pretty(&doc.scene.snapshot()).with_context(|| "serialize values")?;
    println!("{out}");
    Ok(())
}

#[derive(serde::Serialize)]
struct TraceLine<'a> {
    frame: u64,
    time: f64,
    values: &'a indexmap::IndexMap<stagehand::ElementId, indexmap::IndexMap<String, f64>>,
}

fn cmd_trace(args: TraceArgs) -> anyhow::Result<()> {
    if !(args.fps.is_finite() && args.fps > 0.0) {
        anyhow::bail!("--fps must be a positive number, got {}", args.fps);
    }
    let mut doc = read_document(&args.in_path)?;
    let mut seq = mount_paused(&mut doc, args.seed)?;

    let duration = seq.timeline().duration();
    let frames = (duration * args.fps).round() as u64;
    for frame in 0..=frames {
        let time = (frame as f64 / args.fps).min(duration);
        seq.seek(time);
        seq.tick(0.0, &mut doc.scene);
        let snapshot = doc.scene.snapshot();
        let line = TraceLine {
            frame,
            time,
            values: &snapshot,
        };
        println!(
            "{}",
            serde_json::to_string(&line).with_context(|| "serialize frame")?
        );
    }
    Ok(())
}

fn cmd_summary(args: SummaryArgs) -> anyhow::Result<()> {
    let doc = read_document(&args.in_path)?;
    let summary = stagehand::StaticSummary::for_definition(&doc.sequence, &doc.scene, &doc.opts);
    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).with_context(|| "serialize summary")?
        );
    } else {
        print!("{}", summary.describe());
    }
    Ok(())
}

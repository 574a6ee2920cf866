use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "testcard", version)]
struct Cli {
    /// Log output format.
    #[arg(long, value_enum, global = true, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render every frame of a project into a directory.
    Run(RunArgs),
    /// Render a single frame to one file.
    Frame(FrameArgs),
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Project JSON.
    #[arg(long)]
    config: PathBuf,

    /// Output directory.
    #[arg(long)]
    out: PathBuf,

    /// Widget handlers allowed to run at once.
    #[arg(long, default_value_t = 1)]
    runners: usize,

    /// Names the manifest and metadata files. Defaults to a timestamp.
    #[arg(long)]
    run_id: Option<String>,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Project JSON.
    #[arg(long)]
    config: PathBuf,

    /// Frame index (0-based).
    #[arg(long, default_value_t = 0)]
    frame: u64,

    /// Output file; the extension picks the encoder.
    #[arg(long)]
    out: PathBuf,

    #[arg(long, default_value_t = 1)]
    runners: usize,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);
    match cli.cmd {
        Command::Run(args) => cmd_run(args),
        Command::Frame(args) => cmd_frame(args),
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Pretty => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn load_engine(config: &Path, opts: testcard::RunnerOpts) -> anyhow::Result<testcard::Engine> {
    let mut engine = testcard::Engine::from_path(config)
        .with_context(|| format!("load project '{}'", config.display()))?
        .with_opts(opts);
    testcard::widgets::register_builtins(engine.registry_mut());
    engine.use_middleware([
        testcard::handler::middleware::trace_spans(),
        testcard::handler::middleware::logger(),
    ]);
    Ok(engine)
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let engine = load_engine(
        &args.config,
        testcard::RunnerOpts {
            runner_count: args.runners,
            run_id: args.run_id,
        },
    )?;
    let report = engine
        .run(&args.out)
        .with_context(|| format!("run into '{}'", args.out.display()))?;

    let errors = report.error_count();
    eprintln!(
        "run {}: {} frames, {} errors",
        report.run_id,
        report.frames.len(),
        errors
    );
    if errors > 0 {
        anyhow::bail!("{errors} widget or save errors");
    }
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let engine = load_engine(
        &args.config,
        testcard::RunnerOpts {
            runner_count: args.runners,
            run_id: None,
        },
    )?;
    let frame = testcard::FrameIndex(args.frame);
    let (canvas, outcome) = engine.render_frame(frame)?;
    for failed in outcome.errors() {
        eprintln!("{} ({}): {}", failed.full_name, failed.status, failed.message);
    }

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    engine
        .save_canvas(&args.out, &canvas)
        .with_context(|| format!("write '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

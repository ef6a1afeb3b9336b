use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use flybase_expression::config::{ConfigLoader, Overrides, ResolvedConfig};
use flybase_expression::error::ExpressionError;
use flybase_expression::output::JsonOutput;
use flybase_expression::pipeline::Converter;
use flybase_expression::resolver::FileIdResolver;
use flybase_expression::sink::{JsonLinesSink, MemorySink, Sink};
use flybase_expression::tsv::FileSource;

#[derive(Parser)]
#[command(name = "fbexpr")]
#[command(about = "Convert modENCODE FlyBase expression dumps to normalized observation records")]
#[command(version, author)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Run the conversion and write the output file")]
    Convert(RunArgs),
    #[command(about = "Run the full pipeline in memory without writing output")]
    Check(RunArgs),
}

#[derive(Args, Clone)]
struct RunArgs {
    #[arg(long)]
    config: Option<String>,

    #[arg(long)]
    scores: Option<String>,

    #[arg(long)]
    stages: Option<String>,

    #[arg(long)]
    levels: Option<String>,

    #[arg(long)]
    resolver: Option<String>,

    #[arg(long)]
    out: Option<String>,

    #[arg(long)]
    dry_run: bool,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(error) = report.downcast_ref::<ExpressionError>() {
            return ExitCode::from(map_exit_code(error));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &ExpressionError) -> u8 {
    match error {
        ExpressionError::MissingConfig
        | ExpressionError::ConfigRead(_)
        | ExpressionError::ConfigParse(_)
        | ExpressionError::ConfigMissingPath(_) => 2,
        ExpressionError::SourceOpen { .. }
        | ExpressionError::SourceRead { .. }
        | ExpressionError::Sink(_)
        | ExpressionError::Filesystem(_) => 3,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Convert(args) => {
            let dry_run = args.dry_run;
            let config = resolve(&args)?;
            if dry_run {
                run_in_memory(&config)
            } else {
                run_to_file(&config)
            }
        }
        Commands::Check(args) => {
            let config = resolve(&args)?;
            run_in_memory(&config)
        }
    }
}

fn resolve(args: &RunArgs) -> miette::Result<ResolvedConfig> {
    let overrides = Overrides {
        scores: args.scores.clone(),
        stages: args.stages.clone(),
        levels: args.levels.clone(),
        resolver: args.resolver.clone(),
        out: args.out.clone(),
    };
    ConfigLoader::resolve(args.config.as_deref(), &overrides).into_diagnostic()
}

fn run_to_file(config: &ResolvedConfig) -> miette::Result<()> {
    let sink = JsonLinesSink::create(&config.out).into_diagnostic()?;
    let (sink, stats) = convert(config, sink)?;
    let written = sink.finish().into_diagnostic()?;
    tracing::info!(entities = written, out = %config.out, "output written");
    JsonOutput::print_stats(&stats).into_diagnostic()?;
    Ok(())
}

fn run_in_memory(config: &ResolvedConfig) -> miette::Result<()> {
    let (_, stats) = convert(config, MemorySink::new())?;
    JsonOutput::print_stats(&stats).into_diagnostic()?;
    Ok(())
}

fn convert<S: Sink>(
    config: &ResolvedConfig,
    sink: S,
) -> miette::Result<(S, flybase_expression::pipeline::RunStats)> {
    let resolver = match &config.resolver {
        Some(path) => {
            let mut source = FileSource::open(path).into_diagnostic()?;
            Some(FileIdResolver::load(&mut source).into_diagnostic()?)
        }
        None => None,
    };

    let mut stages = FileSource::open(&config.stages).into_diagnostic()?;
    let mut levels = FileSource::open(&config.levels).into_diagnostic()?;
    let mut converter =
        Converter::new(resolver, sink, &mut stages, &mut levels).into_diagnostic()?;

    let mut scores = FileSource::open(&config.scores).into_diagnostic()?;
    converter.run(&mut scores).into_diagnostic()?;
    Ok(converter.finish())
}

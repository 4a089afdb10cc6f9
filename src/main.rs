use anyhow::Result;
use clap::Parser;
use teams_callflow::cli::{AppContext, Cli, Commands};
use tracing_subscriber::EnvFilter;

/// Log to stderr; CALLFLOW_LOG wins over --verbose
fn init_logging(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("CALLFLOW_LOG")
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Build a context once, pass everywhere
    let ctx = AppContext {
        quiet: cli.quiet,
        no_color: cli.no_color,
        dry_run: cli.dry_run,
    };

    match cli.command {
        Commands::Report(args) => teams_callflow::report_run(args, &ctx),
        Commands::Resolve(args) => teams_callflow::resolve_run(args, &ctx),
        Commands::Flow(args) => teams_callflow::flow_run(args, &ctx),
        Commands::Analyze(args) => teams_callflow::analyze_run(args, &ctx),
        Commands::Pdf(args) => teams_callflow::pdf_run(args, &ctx),
        Commands::Init(args) => teams_callflow::infra::config::init(args, &ctx),
        Commands::Completions(args) => teams_callflow::completion::run(args, &ctx),
    }
}

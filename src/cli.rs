use clap::{Args, Parser, Subcommand, ValueEnum};
use owo_colors::OwoColorize;
use std::path::PathBuf;

/// Shared application context for global flags
#[derive(Clone, Debug, Default)]
pub struct AppContext {
    pub quiet: bool,    // global --quiet
    pub no_color: bool, // global --no-color
    pub dry_run: bool,  // global --dry-run
}

impl AppContext {
    /// Green text unless --no-color
    pub fn ok(&self, text: &str) -> String {
        if self.no_color { text.to_string() } else { text.green().to_string() }
    }

    /// Yellow text unless --no-color
    pub fn warn(&self, text: &str) -> String {
        if self.no_color { text.to_string() } else { text.yellow().to_string() }
    }

    /// Red text unless --no-color
    pub fn err(&self, text: &str) -> String {
        if self.no_color { text.to_string() } else { text.red().to_string() }
    }

    /// Bold text unless --no-color
    pub fn strong(&self, text: &str) -> String {
        if self.no_color { text.to_string() } else { text.bold().to_string() }
    }
}

#[derive(Parser)]
#[command(name = "callflow")]
#[command(
    about = "Reconstruct Microsoft Teams phone number call flows from tenant exports and render call flow maps"
)]
#[command(version, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Suppress progress bars and non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Show what would be done without executing
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Enable debug logging (CALLFLOW_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate HTML call flow maps (and optionally PDFs) for every number
    Report(ReportArgs),

    /// Print the resolved phone number table
    Resolve(ResolveArgs),

    /// Print the call flow of one number as a tree
    Flow(FlowArgs),

    /// Find transfer loops and unreachable queues or attendants
    Analyze(AnalyzeArgs),

    /// Convert generated HTML pages to PDF
    Pdf(PdfArgs),

    /// Initialize a callflow.toml config file
    Init(InitArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Location of the collected tenant exports
#[derive(Debug, Clone, Args)]
pub struct DataArgs {
    /// Directory containing VoiceRouting.json, CallQueues.json, ...
    #[arg(short, long, default_value = ".")]
    pub data: PathBuf,
}

#[derive(Debug, Parser)]
pub struct ReportArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Output directory for the run folder
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Also convert the pages to PDF
    #[arg(long)]
    pub pdf: bool,

    /// Add passthrough voice, policy, emergency and compliance settings to the dashboard
    #[arg(long)]
    pub detailed: bool,

    /// Only include numbers containing any of these substrings (comma separated)
    #[arg(short, long, value_delimiter = ',')]
    pub numbers: Vec<String>,

    /// Print a JSON summary of the run instead of human text
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Parser)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Only include numbers containing any of these substrings (comma separated)
    #[arg(short, long, value_delimiter = ',')]
    pub numbers: Vec<String>,

    /// Emit JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Parser)]
pub struct FlowArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Phone number to trace (any format; digits are matched)
    pub number: String,

    /// Emit the steps as JSON instead of a tree
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Parser)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Emit JSON instead of human text
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Parser)]
pub struct PdfArgs {
    /// HTML file or directory of HTML files
    pub input: Option<PathBuf>,

    /// Output directory (default: <input parent>/PDF)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Only check that a headless browser is available
    #[arg(long)]
    pub check: bool,
}

#[derive(Parser)]
pub struct InitArgs {
    /// Directory to initialize config in
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Overwrite existing config file
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[derive(Parser)]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,

    /// Output directory; if omitted and --stdout not set, prints error
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Print completion script to stdout instead of a file
    #[arg(long)]
    pub stdout: bool,
}

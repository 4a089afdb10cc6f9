use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::cli::{AppContext, InitArgs};

/// Config file names searched in the working directory, first hit wins
const CONFIG_FILES: [&str; 4] = ["callflow.toml", "callflow.yaml", "callflow.json", ".callflow.toml"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config
{
    /// Per-domain JSON document names inside the data directory
    pub data_files: DataFiles,

    /// Report output settings
    pub report: ReportConfig,

    /// PDF conversion settings
    pub pdf: PdfConfig,
}

/// File names of the collected per-domain exports.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataFiles
{
    pub voice_routing: String,
    pub user_settings: String,
    pub call_queues: String,
    pub auto_attendants: String,
    pub calling_policies: String,
    pub emergency: String,
    pub compliance: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig
{
    /// Title shown on every generated page
    pub title: String,

    /// Run directory prefix, e.g. `CallFlowMaps_20250926_161304`
    pub output_prefix: String,

    /// chrono format string for the run directory suffix
    pub timestamp_format: String,

    /// Tenant label shown in page headers
    pub tenant_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig
{
    /// Explicit browser executable; skips the PATH search
    pub browser: Option<PathBuf>,

    /// Executable names searched on PATH, in order
    pub candidates: Vec<String>,
}

impl Default for DataFiles
{
    fn default() -> Self
    {
        Self {
            voice_routing: "VoiceRouting.json".to_string(),
            user_settings: "UserSettings.json".to_string(),
            call_queues: "CallQueues.json".to_string(),
            auto_attendants: "AutoAttendants.json".to_string(),
            calling_policies: "CallingPolicies.json".to_string(),
            emergency: "EmergencySettings.json".to_string(),
            compliance: "ComplianceSettings.json".to_string(),
        }
    }
}

impl Default for ReportConfig
{
    fn default() -> Self
    {
        Self {
            title: "Teams Call Flow Map".to_string(),
            output_prefix: "CallFlowMaps".to_string(),
            timestamp_format: "%Y%m%d_%H%M%S".to_string(),
            tenant_name: None,
        }
    }
}

impl Default for PdfConfig
{
    fn default() -> Self
    {
        Self {
            browser: None,
            candidates: vec![
                "chromium".to_string(),
                "chromium-browser".to_string(),
                "google-chrome".to_string(),
                "google-chrome-stable".to_string(),
                "microsoft-edge".to_string(),
                "msedge".to_string(),
            ],
        }
    }
}

pub fn load_config() -> Result<Config>
{
    let mut builder = config::Config::builder();

    // Load from config files in priority order
    for path in &CONFIG_FILES
    {
        if Path::new(path).exists()
        {
            builder = builder.add_source(config::File::with_name(path));
            break;
        }
    }

    // Add environment variables with CALLFLOW_ prefix, e.g. CALLFLOW_REPORT__TITLE
    builder = builder.add_source(
        config::Environment::with_prefix("CALLFLOW")
            .prefix_separator("_")
            .separator("__"),
    );

    let cfg = builder
        .build()
        .context("Failed to load configuration")?;
    let parsed: Config = cfg
        .try_deserialize()
        .context("Failed to parse configuration")?;

    Ok(parsed)
}

pub fn init(
    args: InitArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let config_path = args
        .path
        .join("callflow.toml");

    if config_path.exists() && !args.force
    {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    let config = Config::default();
    let toml_string =
        toml::to_string_pretty(&config).context("Failed to serialize default config")?;

    if ctx.dry_run
    {
        if !ctx.quiet
        {
            println!("DRY RUN: would write {}", config_path.display());
        }
        return Ok(());
    }

    std::fs::write(&config_path, toml_string).context("Failed to write config file")?;

    if !ctx.quiet
    {
        println!("Created config file at {}", config_path.display());
    }
    Ok(())
}

//! `callflow report`: full report run into a timestamped folder.
//!
//! Layout of one run:
//! ```text
//! <output>/<prefix>_<timestamp>/
//!     Individual/CallFlow_<digits>.html
//!     Individual/<queue handle>.html
//!     Summary/Dashboard.html
//!     Data/call_flows.json
//!     PDF/                       (with --pdf)
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::cli::{AppContext, DataArgs, ReportArgs};
use crate::core::report::{ReportModel, assemble};
use crate::core::snapshot::TenantSnapshot;
use crate::infra::config::{Config, load_config};
use crate::infra::io::{expand_path, write_text};
use crate::render::html::{
    DASHBOARD_FILE, INDIVIDUAL_DIR, PageMeta, SUMMARY_DIR, flow_page_name, render_dashboard,
    render_flow_page, render_queue_page,
};
use crate::render::pdf::{PDF_DIR, PdfConverter, html_files};

/// Machine-readable export folder
pub const DATA_DIR: &str = "Data";
pub const EXPORT_FILE: &str = "call_flows.json";

/// Result of one run, printed with --json
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RunSummary
{
    run_dir: PathBuf,
    numbers: usize,
    standalone_queues: usize,
    pages: usize,
    pdfs: usize,
    menu_loops: usize,
    unreachable: usize,
}

/// Load config (defaults on failure) and the snapshot for a data directory.
pub(crate) fn load_inputs(data: &DataArgs) -> Result<(Config, TenantSnapshot)>
{
    let config = load_config().unwrap_or_else(|e| {
        warn!("{e:#}; using default configuration");
        Config::default()
    });
    let data_dir = expand_path(&data.data)?;
    let snapshot = TenantSnapshot::load(&data_dir, &config.data_files)
        .with_context(|| format!("Failed to load tenant data from {}", data_dir.display()))?;

    if snapshot.is_empty()
    {
        warn!("no tenant exports found in {}", data_dir.display());
    }

    Ok((config, snapshot))
}

#[instrument(skip_all, fields(data = %args.data.data.display()))]
pub fn run(
    args: ReportArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let (config, snapshot) = load_inputs(&args.data)?;
    let model = assemble(&snapshot, &args.numbers);

    let run_name = run_folder_name(
        &config.report.output_prefix,
        &config.report.timestamp_format,
        &model.generated_at,
    )?;
    let run_dir = expand_path(&args.output)?.join(run_name);

    if ctx.dry_run
    {
        if !ctx.quiet
        {
            println!("{}", ctx.warn("DRY RUN: Would generate:"));
            println!("  Run folder: {}", run_dir.display());
            println!("  Number pages: {}", model.flows.len());
            println!("  Standalone queue pages: {}", model.queue_flows.len());
            println!("  Dashboard: {}/{}", SUMMARY_DIR, DASHBOARD_FILE);
            println!("  PDF: {}", if args.pdf { "yes" } else { "no" });
        }
        return Ok(());
    }

    let meta = PageMeta {
        title: config.report.title.clone(),
        tenant_name: config.report.tenant_name.clone(),
        generated_at: model.generated_at,
    };
    let detailed = if args.detailed { snapshot.detailed_sections() } else { Vec::new() };

    let pages = write_pages(&model, &meta, &detailed, &run_dir, ctx)?;
    write_export(&model, &run_dir)?;

    let pdfs = if args.pdf { write_pdfs(&config, &run_dir, ctx) } else { 0 };

    info!(run_dir = %run_dir.display(), pages, pdfs, "report run complete");

    let summary = RunSummary {
        run_dir: run_dir.clone(),
        numbers: model.flows.len(),
        standalone_queues: model.queue_flows.len(),
        pages,
        pdfs,
        menu_loops: model.graph.menu_loops.len(),
        unreachable: model.graph.unreachable.len(),
    };

    if args.json
    {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }
    else if !ctx.quiet
    {
        print_summary(&summary, ctx);
    }

    Ok(())
}

/// `<prefix>_<timestamp>`; rejects strftime patterns chrono cannot render.
fn run_folder_name(
    prefix: &str,
    timestamp_format: &str,
    at: &DateTime<Local>,
) -> Result<String>
{
    if StrftimeItems::new(timestamp_format).any(|item| matches!(item, Item::Error))
    {
        anyhow::bail!("Invalid report.timestamp_format: {timestamp_format:?}");
    }

    Ok(format!("{prefix}_{}", at.format(timestamp_format)))
}

/// Progress bar for page and PDF batches; hidden under --quiet.
pub(crate) fn progress_bar(
    len: usize,
    ctx: &AppContext,
) -> ProgressBar
{
    if ctx.quiet
    {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len as u64);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb
}

/// Write every page; returns how many were written.
fn write_pages(
    model: &ReportModel,
    meta: &PageMeta,
    detailed: &[(&str, serde_json::Value)],
    run_dir: &Path,
    ctx: &AppContext,
) -> Result<usize>
{
    let individual = run_dir.join(INDIVIDUAL_DIR);
    let total = model.flows.len() + model.queue_flows.len() + 1;
    let progress = progress_bar(total, ctx);

    for flow in &model.flows
    {
        let path = individual.join(format!("{}.html", flow_page_name(&flow.assignment.number)));
        write_text(&path, &render_flow_page(flow, model, meta))?;
        progress.set_message(flow.assignment.number.clone());
        progress.inc(1);
    }

    for queue in &model.queue_flows
    {
        let path = individual.join(format!("{}.html", queue.file_handle));
        write_text(&path, &render_queue_page(queue, meta))?;
        progress.set_message(queue.queue_name.clone());
        progress.inc(1);
    }

    let dashboard = run_dir
        .join(SUMMARY_DIR)
        .join(DASHBOARD_FILE);
    write_text(&dashboard, &render_dashboard(model, meta, detailed))?;
    progress.inc(1);

    progress.finish_with_message("Pages written");
    Ok(total)
}

fn write_export(
    model: &ReportModel,
    run_dir: &Path,
) -> Result<()>
{
    let json = serde_json::to_string_pretty(model).context("Failed to serialize call flows")?;
    write_text(run_dir.join(DATA_DIR).join(EXPORT_FILE), &json)
}

/// Convert Individual/ and Summary/ into PDF/. A missing browser only warns.
fn write_pdfs(
    config: &Config,
    run_dir: &Path,
    ctx: &AppContext,
) -> usize
{
    let converter = match PdfConverter::locate(&config.pdf)
    {
        Ok(c) => c,
        Err(e) =>
        {
            warn!("{e}");
            if !ctx.quiet
            {
                eprintln!("{} {e}; HTML pages were still written", ctx.warn("PDF skipped:"));
            }
            return 0;
        }
    };

    let files: Vec<PathBuf> = [INDIVIDUAL_DIR, SUMMARY_DIR]
        .iter()
        .filter_map(|dir| html_files(&run_dir.join(dir)).ok())
        .flatten()
        .collect();

    let progress = progress_bar(files.len(), ctx);
    let generated = converter.convert_all(&files, &run_dir.join(PDF_DIR), &progress);
    progress.finish_with_message("PDFs written");
    generated.len()
}

fn print_summary(
    summary: &RunSummary,
    ctx: &AppContext,
)
{
    println!("{} {}", ctx.ok("✓ Report written to"), summary.run_dir.display());
    println!("  Phone numbers:      {}", summary.numbers);
    println!("  Standalone queues:  {}", summary.standalone_queues);
    println!("  Pages:              {}", summary.pages);
    if summary.pdfs > 0
    {
        println!("  PDFs:               {}", summary.pdfs);
    }
    if summary.menu_loops > 0 || summary.unreachable > 0
    {
        println!(
            "  {} {} transfer loop(s), {} unreachable resource(s); see the dashboard",
            ctx.warn("!"),
            summary.menu_loops,
            summary.unreachable
        );
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn run_folder_uses_prefix_and_timestamp()
    {
        let at = Local
            .with_ymd_and_hms(2025, 9, 26, 16, 13, 4)
            .single()
            .expect("unambiguous local time");

        assert_eq!(
            run_folder_name("CallFlowMaps", "%Y%m%d_%H%M%S", &at).unwrap(),
            "CallFlowMaps_20250926_161304"
        );
    }

    #[test]
    fn quiet_runs_hide_the_progress_bar()
    {
        let quiet = AppContext {
            quiet: true,
            ..Default::default()
        };
        assert!(progress_bar(3, &quiet).is_hidden());
        assert_eq!(progress_bar(3, &AppContext::default()).length(), Some(3));
    }

    #[test]
    fn bad_timestamp_format_is_rejected()
    {
        let at = Local::now();
        assert!(run_folder_name("CallFlowMaps", "%Q", &at).is_err());
    }
}

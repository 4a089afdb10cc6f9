//! `callflow pdf`: convert report pages to PDF.

use anyhow::{Result, bail};
use miette::Diagnostic;
use tracing::instrument;

use crate::cli::{AppContext, PdfArgs};
use crate::cli_ext::report_cmd::progress_bar;
use crate::infra::config::load_config;
use crate::infra::io::expand_path;
use crate::render::pdf::{PdfConverter, PdfError, default_output_dir, html_files, is_html};

/// Print the diagnostic help line, then hand the error to anyhow.
fn diagnose(
    err: PdfError,
    ctx: &AppContext,
) -> anyhow::Error
{
    if !ctx.quiet
        && let Some(help) = err.help()
    {
        eprintln!("{} {help}", ctx.warn("help:"));
    }
    err.into()
}

#[instrument(skip_all)]
pub fn run(
    args: PdfArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let config = load_config().unwrap_or_default();

    if args.check || args.input.is_none()
    {
        let converter = PdfConverter::locate(&config.pdf).map_err(|e| diagnose(e, ctx))?;
        if !ctx.quiet
        {
            println!("{} {}", ctx.ok("✓ Headless browser:"), converter.browser().display());
        }
        if args.input.is_none()
        {
            return Ok(());
        }
    }

    let Some(input) = args.input
    else
    {
        return Ok(());
    };
    let input = expand_path(&input)?;
    if !input.exists()
    {
        return Err(diagnose(PdfError::InputNotFound(input), ctx));
    }

    let out_dir = match &args.output
    {
        Some(dir) => expand_path(dir)?,
        None => default_output_dir(&input),
    };

    let files = if input.is_dir()
    {
        html_files(&input).map_err(|e| diagnose(e, ctx))?
    }
    else if is_html(&input)
    {
        vec![input.clone()]
    }
    else
    {
        return Err(diagnose(PdfError::InvalidInput(input), ctx));
    };

    if ctx.dry_run
    {
        if !ctx.quiet
        {
            println!("{}", ctx.warn("DRY RUN: Would convert:"));
            for f in &files
            {
                println!("  {}", f.display());
            }
            println!("  Output: {}", out_dir.display());
        }
        return Ok(());
    }

    let converter = PdfConverter::locate(&config.pdf).map_err(|e| diagnose(e, ctx))?;

    let progress = progress_bar(files.len(), ctx);
    let generated = converter.convert_all(&files, &out_dir, &progress);
    progress.finish_and_clear();

    if generated.is_empty()
    {
        bail!("No PDFs were generated from {}", input.display());
    }

    if !ctx.quiet
    {
        println!(
            "{} {} of {} PDF files in {}",
            ctx.ok("✓ Generated"),
            generated.len(),
            files.len(),
            out_dir.display()
        );
        for pdf in &generated
        {
            if let Some(name) = pdf.file_name()
            {
                println!("  • {}", name.to_string_lossy());
            }
        }
    }

    Ok(())
}

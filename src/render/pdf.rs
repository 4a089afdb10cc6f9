//! HTML → PDF conversion through a headless Chromium-family browser.
//!
//! Page size and margins come from the pages' own `@page` rule, so the
//! browser is only asked to print without its header and footer.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use ignore::WalkBuilder;
use indicatif::ProgressBar;
use miette::Diagnostic;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::infra::config::PdfConfig;

/// Folder created next to the input when no output directory is given
pub const PDF_DIR: &str = "PDF";

#[derive(Debug, Diagnostic, thiserror::Error)]
pub enum PdfError
{
    #[error("no headless browser found (searched: {})", .searched.join(", "))]
    #[diagnostic(
        code(callflow::pdf::browser_not_found),
        help("install Chromium, Google Chrome or Microsoft Edge, or set `browser` under [pdf] in callflow.toml")
    )]
    BrowserNotFound
    {
        searched: Vec<String>,
    },

    #[error("input path does not exist: {0}")]
    #[diagnostic(code(callflow::pdf::input_not_found))]
    InputNotFound(PathBuf),

    #[error("not an HTML file or directory: {0}")]
    #[diagnostic(code(callflow::pdf::invalid_input), help("pass a .html file or a folder containing .html files"))]
    InvalidInput(PathBuf),

    #[error("no HTML files found in {0}")]
    #[diagnostic(
        code(callflow::pdf::no_html_files),
        help("point at the Individual or Summary folder of a report run")
    )]
    NoHtmlFiles(PathBuf),

    #[error("{browser} failed to convert {input}: {reason}")]
    #[diagnostic(code(callflow::pdf::conversion_failed))]
    ConversionFailed
    {
        browser: PathBuf,
        input: PathBuf,
        reason: String,
    },

    #[error("I/O error on {path}: {source}")]
    #[diagnostic(code(callflow::pdf::io))]
    Io
    {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// `<input parent>/PDF`
pub fn default_output_dir(input: &Path) -> PathBuf
{
    input
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(PDF_DIR)
}

/// `*.html` files directly inside `dir`, sorted by name.
pub fn html_files(dir: &Path) -> Result<Vec<PathBuf>, PdfError>
{
    if !dir.is_dir()
    {
        return Err(PdfError::InputNotFound(dir.to_path_buf()));
    }

    let mut files: Vec<PathBuf> = WalkBuilder::new(dir)
        .max_depth(Some(1))
        .standard_filters(false)
        .build()
        .filter_map(Result::ok)
        .filter(|entry| {
            entry
                .file_type()
                .is_some_and(|ft| ft.is_file())
        })
        .map(|entry| entry.into_path())
        .filter(|path| is_html(path))
        .collect();

    if files.is_empty()
    {
        return Err(PdfError::NoHtmlFiles(dir.to_path_buf()));
    }

    files.sort();
    Ok(files)
}

pub fn is_html(path: &Path) -> bool
{
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("html") || e.eq_ignore_ascii_case("htm"))
}

/// `file://` URL for an existing local file.
pub fn file_url(path: &Path) -> Result<String, PdfError>
{
    let absolute = dunce::canonicalize(path).map_err(|source| PdfError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    Url::from_file_path(&absolute)
        .map(String::from)
        .map_err(|()| PdfError::InvalidInput(absolute))
}

/// Resolved browser executable plus conversion operations.
#[derive(Debug, Clone)]
pub struct PdfConverter
{
    browser: PathBuf,
}

impl PdfConverter
{
    /// Use the configured browser, else the first candidate found on PATH.
    pub fn locate(config: &PdfConfig) -> Result<Self, PdfError>
    {
        if let Some(browser) = &config.browser
        {
            let found = if browser.is_file() { Some(browser.clone()) } else { which::which(browser).ok() };
            return found
                .map(|browser| Self { browser })
                .ok_or_else(|| PdfError::BrowserNotFound {
                    searched: vec![browser.display().to_string()],
                });
        }

        config
            .candidates
            .iter()
            .find_map(|name| which::which(name).ok())
            .map(|browser| {
                debug!(browser = %browser.display(), "located headless browser");
                Self { browser }
            })
            .ok_or_else(|| PdfError::BrowserNotFound {
                searched: config.candidates.clone(),
            })
    }

    pub fn browser(&self) -> &Path
    {
        &self.browser
    }

    /// Print one HTML file to `<out_dir>/<stem>.pdf`.
    #[instrument(skip(self), fields(browser = %self.browser.display()))]
    pub fn convert_file(
        &self,
        html: &Path,
        out_dir: &Path,
    ) -> Result<PathBuf, PdfError>
    {
        fs::create_dir_all(out_dir).map_err(|source| PdfError::Io {
            path: out_dir.to_path_buf(),
            source,
        })?;

        let stem = html
            .file_stem()
            .ok_or_else(|| PdfError::InvalidInput(html.to_path_buf()))?;
        let output = out_dir.join(stem).with_extension("pdf");
        let url = file_url(html)?;

        let result = Command::new(&self.browser)
            .arg("--headless")
            .arg("--disable-gpu")
            .arg("--no-pdf-header-footer")
            .arg(format!("--print-to-pdf={}", output.display()))
            .arg(&url)
            .output()
            .map_err(|source| PdfError::Io {
                path: self.browser.clone(),
                source,
            })?;

        if !result.status.success()
        {
            return Err(self.failed(html, format!("exit status {}", result.status)));
        }
        if !output.is_file()
        {
            return Err(self.failed(html, "no PDF was written".to_string()));
        }

        debug!(output = %output.display(), "converted");
        Ok(output)
    }

    fn failed(
        &self,
        html: &Path,
        reason: String,
    ) -> PdfError
    {
        PdfError::ConversionFailed {
            browser: self.browser.clone(),
            input: html.to_path_buf(),
            reason,
        }
    }

    /// Convert each file; failures are logged and skipped.
    pub fn convert_all(
        &self,
        files: &[PathBuf],
        out_dir: &Path,
        progress: &ProgressBar,
    ) -> Vec<PathBuf>
    {
        let mut generated = Vec::with_capacity(files.len());

        for html in files
        {
            progress.set_message(
                html.file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default(),
            );
            match self.convert_file(html, out_dir)
            {
                Ok(pdf) => generated.push(pdf),
                Err(e) => warn!("{e}; skipping"),
            }
            progress.inc(1);
        }

        info!(generated = generated.len(), total = files.len(), "PDF batch finished");
        generated
    }

    /// Convert every `*.html` directly inside `dir`.
    pub fn convert_dir(
        &self,
        dir: &Path,
        out_dir: &Path,
    ) -> Result<Vec<PathBuf>, PdfError>
    {
        let files = html_files(dir)?;
        Ok(self.convert_all(&files, out_dir, &ProgressBar::hidden()))
    }
}

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

/// Byte-order mark written by Windows PowerShell's `Out-File`
const UTF8_BOM: char = '\u{feff}';

/// Read a text file, dropping a leading UTF-8 BOM if present.
pub fn read_text_lossy_bom<P: AsRef<Path>>(path: P) -> std::io::Result<String> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;

    Ok(match content.strip_prefix(UTF8_BOM) {
        Some(rest) => rest.to_string(),
        None => content,
    })
}

/// Parse a JSON document from text that may carry a BOM.
/// Blank documents (an empty export) parse as `None`.
pub fn parse_json_document<T: DeserializeOwned>(text: &str) -> serde_json::Result<Option<T>> {
    let body = text.trim_start_matches(UTF8_BOM).trim();
    if body.is_empty() {
        return Ok(None);
    }

    serde_json::from_str(body).map(Some)
}

/// Write a text file, creating parent directories first.
pub fn write_text<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

/// Expand `~` and `$VAR` in a user-supplied path.
pub fn expand_path(path: &Path) -> Result<PathBuf> {
    let raw = path.to_string_lossy();
    let expanded = shellexpand::full(&raw)
        .with_context(|| format!("Failed to expand path {}", raw))?;

    Ok(PathBuf::from(expanded.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_bom_is_stripped() {
        let doc: Option<Value> = parse_json_document("\u{feff}{\"a\": 1}").unwrap();
        assert_eq!(doc.unwrap()["a"], 1);
    }

    #[test]
    fn test_blank_document_is_absent() {
        let doc: Option<Value> = parse_json_document(" \n").unwrap();
        assert!(doc.is_none());
    }

    #[test]
    fn test_write_text_creates_parents() -> Result<()> {
        let tmp = tempfile::TempDir::new()?;
        let target = tmp.path().join("a/b/c.txt");

        write_text(&target, "hello")?;
        assert_eq!(read_text_lossy_bom(&target)?, "hello");
        Ok(())
    }

    #[test]
    fn test_expand_plain_path_is_unchanged() -> Result<()> {
        let p = expand_path(Path::new("data/tenant"))?;
        assert_eq!(p, PathBuf::from("data/tenant"));
        Ok(())
    }
}

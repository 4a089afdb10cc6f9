//! Filepath: src/infra/utils.rs
//! Utility helpers organized by small, focused structs.
//! All functions are associated fns to keep call sites
//! ergonomic, testable, and discoverable.

use itertools::Itertools;

/// HTML text helpers
pub struct HtmlUtils;

impl HtmlUtils
{
    /// Escape text for inclusion in HTML element content or a
    /// double-quoted attribute value
    pub fn escape(text: &str) -> String
    {
        // Pre-allocate with a little headroom for entities
        let mut out = String::with_capacity(text.len() + 16);

        for ch in text.chars()
        {
            match ch
            {
                '&' => out.push_str("&amp;"),
                '<' => out.push_str("&lt;"),
                '>' => out.push_str("&gt;"),
                '"' => out.push_str("&quot;"),
                '\'' => out.push_str("&#39;"),
                _ => out.push(ch),
            }
        }

        out
    }
}

/// Name and file-handle helpers
pub struct NameUtils;

impl NameUtils
{
    /// Reduce a display name to a filesystem-safe slug made of
    /// ASCII alphanumerics joined by single underscores
    pub fn slug(name: &str) -> String
    {
        let slug = name
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|part| !part.is_empty())
            .join("_");

        // Never hand back an empty handle
        if slug.is_empty() { "unnamed".to_string() } else { slug }
    }

    /// Return the value if present and non-blank, else the fallback
    pub fn or_fallback<'a>(
        value: Option<&'a str>,
        fallback: &'a str,
    ) -> &'a str
    {
        value
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(fallback)
    }
}

/// Human-readable formatting helpers
pub struct TextUtils;

impl TextUtils
{
    /// "1 option", "3 options"
    pub fn plural(
        count: usize,
        noun: &str,
    ) -> String
    {
        if count == 1 { format!("1 {noun}") } else { format!("{count} {noun}s") }
    }

    /// "On"/"Off" for optional flags, "Not set" when absent
    pub fn on_off(flag: Option<bool>) -> &'static str
    {
        match flag
        {
            Some(true) => "On",
            Some(false) => "Off",
            None => "Not set",
        }
    }
}

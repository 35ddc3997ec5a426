//! Export download helpers: file naming and writing the payload to disk.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::{Error, Result};

/// Build the default file name used when the server suggests none.
#[must_use]
pub fn default_export_file_name(date: NaiveDate) -> String {
    format!("diaries-export-{}.json", date.format("%Y-%m-%d"))
}

/// Extract the suggested file name from a `Content-Disposition` header.
///
/// Understands `filename="..."`, RFC 5987 `filename*=UTF-8''...` and bare
/// `filename=...` parameters, preferring the extended form. Any directory
/// components are stripped.
pub fn filename_from_content_disposition(header: &str) -> Option<String> {
    static EXTENDED: OnceLock<Regex> = OnceLock::new();
    static QUOTED: OnceLock<Regex> = OnceLock::new();
    static BARE: OnceLock<Regex> = OnceLock::new();

    let extended = EXTENDED.get_or_init(|| {
        Regex::new(r"(?i)filename\*\s*=\s*[A-Za-z0-9_-]+'[^']*'([^;\s]+)").expect("valid regex")
    });
    let quoted =
        QUOTED.get_or_init(|| Regex::new(r#"(?i)filename\s*=\s*"([^"]+)""#).expect("valid regex"));
    let bare =
        BARE.get_or_init(|| Regex::new(r"(?i)filename\s*=\s*([^;\s]+)").expect("valid regex"));

    let candidate = extended
        .captures(header)
        .and_then(|captures| urlencoding::decode(&captures[1]).ok().map(|name| name.into_owned()))
        .or_else(|| quoted.captures(header).map(|captures| captures[1].to_string()))
        .or_else(|| bare.captures(header).map(|captures| captures[1].to_string()))?;

    sanitize_file_name(&candidate)
}

/// Reduce a server-provided name to a plain file name.
fn sanitize_file_name(raw: &str) -> Option<String> {
    let last_segment = raw.rsplit(['/', '\\']).next().unwrap_or(raw).trim();
    if last_segment.is_empty() || last_segment == "." || last_segment == ".." {
        return None;
    }
    Some(last_segment.to_string())
}

/// Write `bytes` to `dir/file_name`, creating the directory if needed.
pub fn save_export(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
    let file_name = sanitize_file_name(file_name)
        .ok_or_else(|| Error::InvalidInput(format!("Invalid export file name: {file_name}")))?;
    std::fs::create_dir_all(dir)?;
    let path = dir.join(file_name);
    std::fs::write(&path, bytes)?;
    Ok(path)
}

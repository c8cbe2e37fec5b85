// src/file.rs

use std::{
    fs,
    io,
    path::{Path, PathBuf},
};

use chrono::NaiveDate;

/// Resolve a user-supplied output path. Empty → `default_filename` in the
/// working directory; a directory (existing, or hinted by a trailing
/// separator) → `default_filename` inside it; anything else is a file path.
pub fn resolve_out_path(user_o: &str, default_filename: &str) -> io::Result<PathBuf> {
    if user_o.trim().is_empty() {
        return Ok(PathBuf::from(default_filename));
    }
    let p = PathBuf::from(normalize_separators(user_o.trim()));
    if looks_like_dir_hint(&p) || p.is_dir() {
        ensure_directory(&p)?;
        Ok(p.join(default_filename))
    } else {
        Ok(p)
    }
}

/// `<prefix>_<MMDD>.<ext>`, the naming the daily job-search runs use.
pub fn dated_filename(prefix: &str, date: NaiveDate, ext: &str) -> String {
    format!("{prefix}_{}.{ext}", date.format("%m%d"))
}

pub fn normalize_separators(p: &str) -> String {
    let sep = std::path::MAIN_SEPARATOR;
    p.chars().map(|c| if c == '/' || c == '\\' { sep } else { c }).collect()
}

pub fn ensure_directory(dir: &Path) -> io::Result<()> {
    if dir.exists() && !dir.is_dir() {
        return Err(io::Error::other(format!(
            "Path exists but is not a directory: {}",
            dir.display()
        )));
    }
    if !dir.exists() { fs::create_dir_all(dir)?; }
    Ok(())
}

pub fn ensure_parent(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_directory(parent)?;
        }
    }
    Ok(())
}

pub fn looks_like_dir_hint(p: &Path) -> bool {
    let s = p.to_string_lossy();
    s.ends_with('/') || s.ends_with('\\')
}

/// Missing and zero-length files both count as "no store yet".
pub fn is_absent_or_empty(path: &Path) -> bool {
    match fs::metadata(path) {
        Ok(m) => m.len() == 0,
        Err(_) => true,
    }
}

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveTime};

use crate::foundation::error::{CapsuleError, CapsuleResult};

/// All `.png` files directly inside `dir`, sorted by file name.
///
/// A directory that does not exist yields an empty list.
pub fn list_screenshots(dir: impl AsRef<Path>) -> CapsuleResult<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(CapsuleError::io(dir, e)),
    };

    let mut out = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| CapsuleError::io(dir, e))?.path();
        let is_png = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("png"));
        if is_png && path.is_file() {
            out.push(path);
        }
    }
    out.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(out)
}

/// Keep at most `max` items, spread evenly from first to last.
pub fn pick_evenly<T: Clone>(items: &[T], max: usize) -> Vec<T> {
    let n = items.len();
    if n <= max {
        return items.to_vec();
    }
    match max {
        0 => Vec::new(),
        1 => vec![items[0].clone()],
        _ => (0..max)
            .map(|i| items[i * (n - 1) / (max - 1)].clone())
            .collect(),
    }
}

/// Human-readable `YYYY-MM-DD` label for a timestamp-like stem.
///
/// The stem's digits are read as `YYYYMMDD` followed by an optional `hh`, `hhmm` or
/// `hhmmss`. Anything else falls back to the stem itself.
pub fn snapshot_label(stem: &str) -> String {
    let digits: String = stem.chars().filter(char::is_ascii_digit).collect();
    snapshot_date(&digits)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| stem.to_string())
}

fn snapshot_date(digits: &str) -> Option<NaiveDate> {
    if !(8..=14).contains(&digits.len()) {
        return None;
    }
    let (date, time) = digits.split_at(8);
    let date = NaiveDate::parse_from_str(date, "%Y%m%d").ok()?;
    if !time.is_empty() {
        if time.len() % 2 != 0 {
            return None;
        }
        NaiveTime::parse_from_str(&format!("{time:0<6}"), "%H%M%S").ok()?;
    }
    Some(date)
}

#[cfg(test)]
#[path = "../../tests/unit/snapshot/discover.rs"]
mod tests;

use std::path::Path;

use crate::ravg::*;

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

pub fn make_default_id(path: &str) -> impl Fn(usize) -> String {
    let simplified_file_name = simplify_file_name(path);
    move |lineno| format!("{}-{:08}", simplified_file_name, lineno)
}

/// An empty cell is a missing score, anything else must be a number.
pub fn parse_score(s: &str, lineno: usize) -> BCliResult<Option<f64>> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let x = trimmed.parse::<f64>().ok().context(ParsingScoreSnafu {
        lineno,
        content: s.to_string(),
    })?;
    Ok(Some(x))
}

pub fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Finds the position of a column in a header row.
pub fn column_index(header: &[String], column: &str) -> Option<usize> {
    header.iter().position(|h| h.trim() == column)
}

/// Finds the position of a mandatory column in a header row.
pub fn required_column_index(header: &[String], column: &str, path: &str) -> BCliResult<usize> {
    let idx = column_index(header, column).context(MissingColumnSnafu { column, path })?;
    Ok(idx)
}

//! Shared helpers for the workspace's integration tests: readable diffs,
//! chunk plans for streaming-equivalence checks, TOML fixture corpora, and
//! generated inputs for scaling tests.

pub mod chunks;
pub mod fixtures;
pub mod perf;

pub use chunks::{ChunkPlan, chunk_plans};
pub use fixtures::{Case, CaseStatus, Corpus, load_corpus};

/// Escape control characters and quotes so a failing line prints on one row.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            ch if ch < ' ' => {
                use std::fmt::Write;
                let _ = write!(&mut out, "\\u{{{:02X}}}", ch as u32);
            }
            _ => out.push(ch),
        }
    }
    out
}

/// Render the first mismatching region of two line lists.
pub fn diff_lines(expected: &[String], actual: &[String]) -> String {
    use std::fmt::Write;

    const MISSING: &str = "<missing>";
    let max = expected.len().max(actual.len());
    let line = |lines: &[String], i: usize| lines.get(i).map(String::as_str).unwrap_or(MISSING).to_string();
    let mut out = String::new();

    match (0..max).find(|&i| line(expected, i) != line(actual, i)) {
        Some(i) => {
            let start = i.saturating_sub(2);
            let end = (i + 3).min(max);
            let _ = writeln!(&mut out, "first mismatch at line {} (showing {}..={}):", i + 1, start + 1, end);
            for idx in start..end {
                let marker = if idx == i { ">" } else { " " };
                let _ = writeln!(&mut out, "{marker} {:>4}  expected: {}", idx + 1, escape_text(&line(expected, idx)));
                let _ = writeln!(&mut out, "{marker} {:>4}    actual: {}", idx + 1, escape_text(&line(actual, idx)));
            }
        }
        None => {
            let _ = writeln!(&mut out, "no differing lines");
        }
    }
    let _ = writeln!(&mut out, "expected {} lines, actual {} lines", expected.len(), actual.len());
    out
}

/// Split markup into one line per tag boundary so [`diff_lines`] points at the
/// element that differs rather than at a single long line.
pub fn markup_lines(markup: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for ch in markup.chars() {
        if ch == '<' && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        current.push(ch);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

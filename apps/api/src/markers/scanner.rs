//! Marker scanner: splits a flat text bundle into named virtual files.
//!
//! A marker is a line of the form `//<FS> name <FS>//` (a single space after the
//! leading `//` is also accepted), where `<FS>` is ASCII 0x1C. Every line after a
//! marker belongs to that marker until the next marker or end of input. Lines
//! before the first marker are discarded.

use tracing::debug;

use crate::markers::models::{Marker, Scan, ScanError};
use crate::markers::path_guard::check_path;

/// ASCII "File Separator", the sentinel framing each marker's filename.
pub const FS: char = '\u{1C}';

/// Returns the filename announced by `line`, or `None` if the line is not a marker.
pub fn parse_marker_line(line: &str) -> Option<&str> {
    let line = line.trim_end_matches(|c: char| c == '\r' || c == ' ' || c == '\t');

    let rest = line.strip_prefix("//")?;
    let rest = rest.strip_prefix(' ').unwrap_or(rest);
    let rest = rest.strip_prefix(FS)?.strip_prefix(' ')?;
    let inner = rest.strip_suffix("//")?.strip_suffix(FS)?.strip_suffix(' ')?;

    let name = inner.trim();
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Formats a marker line for `filename`.
pub fn marker_line(filename: &str) -> String {
    format!("//{FS} {filename} {FS}//")
}

struct OpenMarker<'a> {
    filename: &'a str,
    start_line: usize,
    lines: Vec<&'a str>,
}

impl OpenMarker<'_> {
    fn close(self) -> Marker {
        let end_line = self.start_line + self.lines.len() - 1;
        Marker {
            filename: self.filename.to_string(),
            content: self.lines.join("\n"),
            start_line: self.start_line,
            end_line,
        }
    }
}

/// Scans `text` in a single pass.
///
/// Marker lines whose filename fails the path guard are reported as [`ScanError`]s
/// and the section that follows them is dropped rather than folded into the
/// previous marker.
pub fn scan(text: &str) -> Scan {
    let mut markers = Vec::new();
    let mut errors = Vec::new();
    let mut current: Option<OpenMarker<'_>> = None;

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;

        let Some(filename) = parse_marker_line(line) else {
            if let Some(open) = current.as_mut() {
                open.lines.push(line);
            }
            continue;
        };

        if let Some(open) = current.take() {
            markers.push(open.close());
        }

        match check_path(filename) {
            Ok(()) => {
                current = Some(OpenMarker {
                    filename,
                    start_line: line_no + 1,
                    lines: Vec::new(),
                });
            }
            Err(reason) => {
                debug!(line = line_no, filename, "rejected marker: {reason}");
                errors.push(ScanError {
                    line: line_no,
                    message: format!("Unsafe file path '{filename}': {reason}"),
                });
            }
        }
    }

    if let Some(open) = current.take() {
        markers.push(open.close());
    }

    Scan { markers, errors }
}

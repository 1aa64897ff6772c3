use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// One named section produced by the scanner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    pub filename: String,
    pub content: String,
    /// 1-based line of the first content line (the line after the marker).
    pub start_line: usize,
    /// 1-based line of the last content line; `start_line - 1` when the section is empty.
    pub end_line: usize,
}

impl Marker {
    pub fn line_count(&self) -> usize {
        (self.end_line + 1).saturating_sub(self.start_line)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanError {
    pub line: usize,
    pub message: String,
}

/// Raw scanner output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scan {
    pub markers: Vec<Marker>,
    pub errors: Vec<ScanError>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub total_markers: usize,
    pub total_files: usize,
    pub total_bytes: usize,
    pub errors: Vec<ScanError>,
    pub markers: Vec<Marker>,
}

impl ExtractionResult {
    pub fn from_scan(scan: Scan) -> Self {
        let distinct: HashSet<&str> = scan.markers.iter().map(|m| m.filename.as_str()).collect();
        let total_files = distinct.len();
        let total_bytes = scan.markers.iter().map(|m| m.content.len()).sum();

        Self {
            total_markers: scan.markers.len(),
            total_files,
            total_bytes,
            errors: scan.errors,
            markers: scan.markers,
        }
    }

    pub fn total_lines(&self) -> usize {
        self.markers.iter().map(Marker::line_count).sum()
    }

    pub fn stats(&self) -> ProjectStats {
        ProjectStats {
            total_markers: self.total_markers,
            total_files: self.total_files,
            total_bytes: self.total_bytes,
            total_lines: self.total_lines(),
            errors: self.errors.clone(),
        }
    }

    pub fn files(&self) -> Vec<ProjectFile> {
        self.markers.iter().map(ProjectFile::from).collect()
    }
}

/// JSON projection of a marker returned by the extraction endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectFile {
    pub path: String,
    pub content: String,
    pub size: usize,
    pub lines: usize,
}

impl From<&Marker> for ProjectFile {
    fn from(marker: &Marker) -> Self {
        Self {
            path: marker.filename.clone(),
            content: marker.content.clone(),
            size: marker.content.len(),
            lines: marker.line_count(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStats {
    pub total_markers: usize,
    pub total_files: usize,
    pub total_bytes: usize,
    pub total_lines: usize,
    pub errors: Vec<ScanError>,
}

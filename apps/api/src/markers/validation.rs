use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::markers::models::{ExtractionResult, ProjectStats, Scan};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    NoMarkers,
    UnsafePath,
    DuplicateFile,
    EmptyFile,
    UnknownExtension,
    MissingPackageJson,
    MissingReadme,
    MissingEntryFile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub kind: IssueKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub stats: ProjectStats,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
    pub suggestions: Vec<String>,
    pub files: Vec<String>,
}

const KNOWN_EXTENSIONS: &[&str] = &[
    "js", "jsx", "mjs", "cjs", "ts", "tsx", "json", "html", "htm", "css", "scss", "sass",
    "less", "md", "mdx", "txt", "svg", "xml", "yml", "yaml", "toml", "ini", "env", "sh",
    "py", "rs", "go", "java", "kt", "rb", "php", "c", "h", "cpp", "hpp", "cs", "swift",
    "sql", "graphql", "vue", "svelte", "astro", "lock", "csv",
];

const KNOWN_BARE_NAMES: &[&str] = &[
    "Dockerfile",
    "Makefile",
    "Procfile",
    "LICENSE",
    "README",
    ".gitignore",
    ".dockerignore",
    ".npmrc",
    ".nvmrc",
    ".prettierrc",
    ".eslintrc",
    ".env",
    ".env.example",
    ".env.local",
];

const SCRIPT_EXTENSIONS: &[&str] = &["js", "jsx", "mjs", "cjs", "ts", "tsx"];

const ENTRY_STEMS: &[&str] = &[
    "index",
    "main",
    "app",
    "server",
    "src/index",
    "src/main",
    "src/app",
    "pages/index",
    "app/page",
];

/// Runs the heuristic checks over an already-scanned bundle.
pub fn validate_scan(scan: Scan) -> ValidationReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut suggestions = Vec::new();

    for scan_error in &scan.errors {
        errors.push(ValidationIssue {
            kind: IssueKind::UnsafePath,
            file: None,
            line: Some(scan_error.line),
            message: scan_error.message.clone(),
        });
    }

    let result = ExtractionResult::from_scan(scan);

    if result.markers.is_empty() {
        errors.push(ValidationIssue {
            kind: IssueKind::NoMarkers,
            file: None,
            line: None,
            message: "No file markers found in the provided code".to_string(),
        });
        suggestions.push(
            "Start every file with a marker line of the form //<FS> path/to/file <FS>// (FS = 0x1C)."
                .to_string(),
        );
    }

    // First marker line per filename, to report duplicates against.
    let mut first_seen: HashMap<&str, usize> = HashMap::new();
    let mut files: Vec<String> = Vec::new();
    for marker in &result.markers {
        let marker_line = marker.start_line - 1;
        match first_seen.get(marker.filename.as_str()) {
            Some(&first_line) => errors.push(ValidationIssue {
                kind: IssueKind::DuplicateFile,
                file: Some(marker.filename.clone()),
                line: Some(marker_line),
                message: format!(
                    "Duplicate file '{}' (first declared on line {}, again on line {})",
                    marker.filename, first_line, marker_line
                ),
            }),
            None => {
                first_seen.insert(marker.filename.as_str(), marker_line);
                files.push(marker.filename.clone());
            }
        }

        if marker.content.trim().is_empty() {
            warnings.push(ValidationIssue {
                kind: IssueKind::EmptyFile,
                file: Some(marker.filename.clone()),
                line: Some(marker_line),
                message: format!("File '{}' has no content", marker.filename),
            });
        }

        if !has_known_extension(&marker.filename) {
            warnings.push(ValidationIssue {
                kind: IssueKind::UnknownExtension,
                file: Some(marker.filename.clone()),
                line: Some(marker_line),
                message: format!("File '{}' has an unrecognized extension", marker.filename),
            });
        }
    }

    if !files.is_empty() {
        let has_scripts = files
            .iter()
            .any(|f| extension(f).is_some_and(|e| SCRIPT_EXTENSIONS.contains(&e.as_str())));
        if has_scripts && !files.iter().any(|f| f == "package.json") {
            warnings.push(ValidationIssue {
                kind: IssueKind::MissingPackageJson,
                file: None,
                line: None,
                message: "JavaScript/TypeScript sources found but no package.json".to_string(),
            });
            suggestions
                .push("Add a package.json listing dependencies and npm scripts.".to_string());
        }

        if !files.iter().any(|f| is_readme(f)) {
            warnings.push(ValidationIssue {
                kind: IssueKind::MissingReadme,
                file: None,
                line: None,
                message: "No README file found".to_string(),
            });
            suggestions.push(
                "Add a README.md describing what the project does and how to run it.".to_string(),
            );
        }

        if !files.iter().any(|f| is_entry_file(f)) {
            warnings.push(ValidationIssue {
                kind: IssueKind::MissingEntryFile,
                file: None,
                line: None,
                message: "No entry file (index, main, app, server) found".to_string(),
            });
            suggestions.push(
                "Add an entry point such as index.js, src/main.ts or app/page.tsx.".to_string(),
            );
        }
    }

    ValidationReport {
        valid: errors.is_empty(),
        stats: result.stats(),
        errors,
        warnings,
        suggestions,
        files,
    }
}

pub fn validate_code(code: &str) -> ValidationReport {
    validate_scan(crate::markers::scanner::scan(code))
}

/// Lowercased extension of the last path segment, if any.
fn extension(path: &str) -> Option<String> {
    let name = file_name(path);
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn has_known_extension(path: &str) -> bool {
    let name = file_name(path);
    if KNOWN_BARE_NAMES.contains(&name) {
        return true;
    }
    extension(path).is_some_and(|e| KNOWN_EXTENSIONS.contains(&e.as_str()))
}

fn is_readme(path: &str) -> bool {
    let name = file_name(path).to_ascii_lowercase();
    name == "readme" || name.starts_with("readme.")
}

fn is_entry_file(path: &str) -> bool {
    let lowered = path.to_ascii_lowercase();
    let stem = match lowered.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => return false,
    };
    ENTRY_STEMS.contains(&stem)
}

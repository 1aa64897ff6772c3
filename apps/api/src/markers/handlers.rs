//! Axum route handlers for bundle extraction and validation.

use std::path::Path;

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::archive::{pack_markers, Compression};
use crate::errors::AppError;
use crate::extract::AppJson;
use crate::markers::models::{ExtractionResult, ProjectFile, ProjectStats};
use crate::markers::path_guard::check_path;
use crate::markers::scanner::scan;
use crate::markers::validation::{validate_code, ValidationReport};
use crate::state::AppState;

const DEFAULT_AI_PROJECT_NAME: &str = "ai-project";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ProjectQuery {
    pub project: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExtractProjectRequest {
    pub project_file: Option<String>,
    pub format: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExtractAiProjectRequest {
    pub code: Option<String>,
    pub format: Option<String>,
    pub project_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ValidateCodeRequest {
    pub code: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResponse {
    pub success: bool,
    pub project_name: String,
    pub stats: ProjectStats,
    pub files: Vec<ProjectFile>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Zip,
}

impl OutputFormat {
    pub fn parse(value: Option<&str>) -> Result<Self, AppError> {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            None | Some("") | Some("json") => Ok(OutputFormat::Json),
            Some("zip") => Ok(OutputFormat::Zip),
            Some(other) => Err(AppError::bad_request(
                "invalidFormat",
                format!("Unsupported format '{other}'; expected 'json' or 'zip'"),
            )),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/extract-project?project=<filename>
pub async fn handle_get_project(
    State(state): State<AppState>,
    Query(query): Query<ProjectQuery>,
) -> Result<Response, AppError> {
    let project = required(query.project, "missingProject", "Query parameter 'project' is required")?;
    extract_from_file(&state, &project, OutputFormat::Json).await
}

/// POST /api/extract-project
pub async fn handle_extract_project(
    State(state): State<AppState>,
    AppJson(request): AppJson<ExtractProjectRequest>,
) -> Result<Response, AppError> {
    let project = required(
        request.project_file,
        "missingProjectFile",
        "Field 'projectFile' is required",
    )?;
    let format = OutputFormat::parse(request.format.as_deref())?;
    extract_from_file(&state, &project, format).await
}

/// POST /api/extract-ai-project
///
/// Same extraction as the file-backed endpoint, applied to inline code.
pub async fn handle_extract_ai_project(
    State(state): State<AppState>,
    AppJson(request): AppJson<ExtractAiProjectRequest>,
) -> Result<Response, AppError> {
    let code = required(request.code, "missingCode", "Field 'code' is required")?;
    let format = OutputFormat::parse(request.format.as_deref())?;
    let project_name = request
        .project_name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_AI_PROJECT_NAME.to_string());

    let result = ExtractionResult::from_scan(scan(&code));
    if result.markers.is_empty() {
        return Err(AppError::bad_request(
            "noMarkersFound",
            "No file markers found in the provided code",
        ));
    }

    info!(
        project = %project_name,
        markers = result.total_markers,
        bytes = result.total_bytes,
        ?format,
        "extracted inline bundle"
    );

    respond(result, format, &project_name, state.config.zip_compression).await
}

/// POST /api/validate-ai-code
pub async fn handle_validate_code(
    AppJson(request): AppJson<ValidateCodeRequest>,
) -> Result<Json<ValidationReport>, AppError> {
    let code = required(request.code, "missingCode", "Field 'code' is required")?;
    let report = tokio::task::spawn_blocking(move || validate_code(&code))
        .await
        .map_err(|e| AppError::Internal(e.into()))?;
    info!(
        valid = report.valid,
        errors = report.errors.len(),
        warnings = report.warnings.len(),
        "validated inline bundle"
    );
    Ok(Json(report))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

fn required(value: Option<String>, code: &'static str, message: &str) -> Result<String, AppError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::bad_request(code, message))
}

async fn extract_from_file(
    state: &AppState,
    project: &str,
    format: OutputFormat,
) -> Result<Response, AppError> {
    let text = read_project_file(&state.config.projects_dir, project).await?;
    let result = ExtractionResult::from_scan(scan(&text));
    let project_name = project_stem(project);

    if !result.errors.is_empty() {
        warn!(
            project,
            rejected = result.errors.len(),
            "bundle contains unsafe marker paths"
        );
    }
    info!(
        project,
        markers = result.total_markers,
        bytes = result.total_bytes,
        ?format,
        "extracted project file"
    );

    respond(result, format, &project_name, state.config.zip_compression).await
}

/// Reads `<dir>/<name>` after running the path guard on `name`.
pub async fn read_project_file(dir: &Path, name: &str) -> Result<String, AppError> {
    check_path(name).map_err(|reason| {
        AppError::bad_request("invalidProject", format!("Invalid project name '{name}': {reason}"))
    })?;

    let path = dir.join(name);
    match tokio::fs::read_to_string(&path).await {
        Ok(text) => Ok(text),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(AppError::NotFound(format!(
            "Project file '{name}' not found"
        ))),
        Err(e) => Err(AppError::Internal(
            anyhow::Error::new(e).context(format!("Failed to read {}", path.display())),
        )),
    }
}

fn project_stem(project: &str) -> String {
    Path::new(project)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(project)
        .to_string()
}

/// Restricts a download name to `[A-Za-z0-9._-]` so it is safe inside a header.
pub fn sanitize_download_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '-'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "project".to_string()
    } else {
        cleaned.to_string()
    }
}

async fn respond(
    result: ExtractionResult,
    format: OutputFormat,
    project_name: &str,
    compression: Compression,
) -> Result<Response, AppError> {
    match format {
        OutputFormat::Json => Ok(Json(ExtractionResponse {
            success: true,
            project_name: project_name.to_string(),
            stats: result.stats(),
            files: result.files(),
        })
        .into_response()),
        OutputFormat::Zip => {
            let markers = result.markers;
            // Deflating is CPU-bound; keep it off the async workers.
            let bytes = tokio::task::spawn_blocking(move || pack_markers(&markers, compression))
                .await
                .map_err(|e| AppError::Internal(e.into()))??;

            let disposition = format!(
                "attachment; filename=\"{}.zip\"",
                sanitize_download_name(project_name)
            );
            Ok((
                [
                    (header::CONTENT_TYPE, "application/zip".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                Bytes::from(bytes),
            )
                .into_response())
        }
    }
}

pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::contact::handlers as contact;
use crate::markers::handlers as markers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_body_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Bundle extraction
        .route(
            "/api/extract-project",
            get(markers::handle_get_project).post(markers::handle_extract_project),
        )
        .route(
            "/api/extract-ai-project",
            post(markers::handle_extract_ai_project),
        )
        .route("/api/validate-ai-code", post(markers::handle_validate_code))
        // Contact form
        .route("/api/contact", post(contact::handle_contact))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::archive::{reader::read_archive, Compression};
    use crate::config::{Config, MailConfig};
    use crate::mailer::{MailError, Mailer, OutgoingEmail};
    use crate::markers::scanner::marker_line;

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<OutgoingEmail>>,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, email: &OutgoingEmail) -> Result<String, MailError> {
            let mut sent = self.sent.lock().unwrap();
            sent.push(email.clone());
            Ok(format!("msg-{}", sent.len()))
        }
    }

    struct FailingMailer;

    #[async_trait]
    impl Mailer for FailingMailer {
        async fn send(&self, _email: &OutgoingEmail) -> Result<String, MailError> {
            Err(MailError::Provider {
                status: 403,
                message: "domain not verified".to_string(),
            })
        }
    }

    fn test_config(projects_dir: &Path, with_mail: bool) -> Config {
        Config {
            port: 0,
            rust_log: "debug".to_string(),
            projects_dir: projects_dir.to_path_buf(),
            max_body_bytes: 1024 * 1024,
            zip_compression: Compression::Deflate,
            mail: with_mail.then(|| MailConfig {
                resend_api_key: "re_test".to_string(),
                to_email: "owner@example.com".to_string(),
                from_email: "Site <noreply@example.com>".to_string(),
            }),
        }
    }

    fn app(projects_dir: &Path) -> Router {
        build_router(AppState {
            config: test_config(projects_dir, false),
            mailer: None,
        })
    }

    fn app_with_mailer(mailer: Arc<dyn Mailer>) -> Router {
        build_router(AppState {
            config: test_config(Path::new("."), true),
            mailer: Some(mailer),
        })
    }

    fn bundle(parts: &[(&str, &str)]) -> String {
        parts
            .iter()
            .map(|(name, body)| format!("{}\n{}", marker_line(name), body))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_bytes(response: Response) -> Vec<u8> {
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    async fn body_json(response: Response) -> Value {
        serde_json::from_slice(&body_bytes(response).await).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let response = app(dir.path()).oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    // ── extract-ai-project ────────────────────────────────────────────────

    #[tokio::test]
    async fn test_extract_ai_project_json() {
        let dir = tempfile::tempdir().unwrap();
        let code = bundle(&[("a.txt", "x\ny"), ("src/b.js", "let b = 1;")]);
        let response = app(dir.path())
            .oneshot(post_json("/api/extract-ai-project", json!({ "code": code })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["projectName"], "ai-project");
        assert_eq!(body["stats"]["totalMarkers"], 2);
        assert_eq!(body["stats"]["totalBytes"], 3 + 10);
        assert_eq!(body["files"][0]["path"], "a.txt");
        assert_eq!(body["files"][0]["content"], "x\ny");
        assert_eq!(body["files"][0]["size"], 3);
        assert_eq!(body["files"][0]["lines"], 2);
    }

    #[tokio::test]
    async fn test_extract_ai_project_zip() {
        let dir = tempfile::tempdir().unwrap();
        let code = bundle(&[("index.html", "<h1>hi</h1>"), ("css/site.css", "body {}")]);
        let response = app(dir.path())
            .oneshot(post_json(
                "/api/extract-ai-project",
                json!({ "code": code, "format": "zip", "projectName": "My App" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/zip");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"My-App.zip\""
        );
        let entries = read_archive(&body_bytes(response).await).unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["index.html", "css/site.css"]);
        assert_eq!(entries[1].data, b"body {}");
    }

    #[tokio::test]
    async fn test_extract_ai_project_requires_code() {
        let dir = tempfile::tempdir().unwrap();
        let response = app(dir.path())
            .oneshot(post_json("/api/extract-ai-project", json!({ "code": "  " })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "missingCode");
    }

    #[tokio::test]
    async fn test_extract_ai_project_without_markers() {
        let dir = tempfile::tempdir().unwrap();
        let response = app(dir.path())
            .oneshot(post_json(
                "/api/extract-ai-project",
                json!({ "code": "console.log('no markers');" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["code"], "noMarkersFound");
    }

    #[tokio::test]
    async fn test_extract_ai_project_rejects_unknown_format() {
        let dir = tempfile::tempdir().unwrap();
        let code = bundle(&[("a.txt", "x")]);
        let response = app(dir.path())
            .oneshot(post_json(
                "/api/extract-ai-project",
                json!({ "code": code, "format": "tar" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["code"], "invalidFormat");
    }

    // ── extract-project ───────────────────────────────────────────────────

    fn write_project(dir: &Path, name: &str, text: &str) {
        std::fs::write(dir.join(name), text).unwrap();
    }

    #[tokio::test]
    async fn test_get_project_json() {
        let dir = tempfile::tempdir().unwrap();
        write_project(
            dir.path(),
            "portfolio.txt",
            &format!("header\n{}", bundle(&[("README.md", "# Portfolio")])),
        );

        let response = app(dir.path())
            .oneshot(get("/api/extract-project?project=portfolio.txt"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["projectName"], "portfolio");
        assert_eq!(body["stats"]["totalFiles"], 1);
        assert_eq!(body["files"][0]["path"], "README.md");
        assert_eq!(body["files"][0]["content"], "# Portfolio");
    }

    #[tokio::test]
    async fn test_get_project_missing_param() {
        let dir = tempfile::tempdir().unwrap();
        let response = app(dir.path())
            .oneshot(get("/api/extract-project"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["code"], "missingProject");
    }

    #[tokio::test]
    async fn test_get_project_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let response = app(dir.path())
            .oneshot(get("/api/extract-project?project=absent.txt"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_get_project_traversal_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let response = app(dir.path())
            .oneshot(get("/api/extract-project?project=..%2Fsecret.txt"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["code"], "invalidProject");
    }

    #[tokio::test]
    async fn test_get_project_without_markers_is_empty_success() {
        let dir = tempfile::tempdir().unwrap();
        write_project(dir.path(), "plain.txt", "nothing to see");
        let response = app(dir.path())
            .oneshot(get("/api/extract-project?project=plain.txt"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["stats"]["totalMarkers"], 0);
        assert!(body["files"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_post_project_zip() {
        let dir = tempfile::tempdir().unwrap();
        write_project(
            dir.path(),
            "site.bundle",
            &bundle(&[("a.txt", "first"), ("a.txt", "second"), ("b.txt", "b")]),
        );

        let response = app(dir.path())
            .oneshot(post_json(
                "/api/extract-project",
                json!({ "projectFile": "site.bundle", "format": "zip" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"site.zip\""
        );
        let entries = read_archive(&body_bytes(response).await).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].data, b"second");
    }

    #[tokio::test]
    async fn test_post_project_requires_project_file() {
        let dir = tempfile::tempdir().unwrap();
        let response = app(dir.path())
            .oneshot(post_json("/api/extract-project", json!({ "format": "json" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["code"], "missingProjectFile");
    }

    // ── validate-ai-code ──────────────────────────────────────────────────

    #[tokio::test]
    async fn test_validate_code_reports_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let code = bundle(&[("README.md", "a"), ("main.py", "1"), ("main.py", "2")]);
        let response = app(dir.path())
            .oneshot(post_json("/api/validate-ai-code", json!({ "code": code })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["valid"], false);
        assert_eq!(body["errors"][0]["kind"], "duplicate_file");
        assert_eq!(body["stats"]["totalMarkers"], 3);
        assert_eq!(body["stats"]["totalFiles"], 2);
    }

    // ── contact ───────────────────────────────────────────────────────────

    fn contact_body() -> Value {
        json!({
            "name": "Ana",
            "email": "ana@example.com",
            "subject": "Project",
            "message": "Hello there",
            "language": "en"
        })
    }

    #[tokio::test]
    async fn test_contact_missing_field() {
        let mut body = contact_body();
        body.as_object_mut().unwrap().remove("message");
        let response = app_with_mailer(Arc::new(RecordingMailer::default()))
            .oneshot(post_json("/api/contact", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "allFieldsRequired");
        assert_eq!(body["error"]["message"], "All fields are required");
    }

    #[tokio::test]
    async fn test_contact_invalid_email_localized() {
        let mut body = contact_body();
        body["email"] = json!("ana@example");
        body["language"] = json!("es");
        let response = app_with_mailer(Arc::new(RecordingMailer::default()))
            .oneshot(post_json("/api/contact", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "invalidEmail");
        assert_eq!(
            body["error"]["message"],
            "Por favor, introduce un correo electrónico válido"
        );
    }

    #[tokio::test]
    async fn test_contact_without_mail_provider() {
        let dir = tempfile::tempdir().unwrap();
        let response = app(dir.path())
            .oneshot(post_json("/api/contact", contact_body()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await["error"]["message"],
            "Email service not configured"
        );
    }

    #[tokio::test]
    async fn test_contact_sends_two_emails() {
        let mailer = Arc::new(RecordingMailer::default());
        let response = app_with_mailer(mailer.clone())
            .oneshot(post_json("/api/contact", contact_body()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["success"], true);

        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].to, "owner@example.com");
        assert_eq!(sent[0].reply_to.as_deref(), Some("ana@example.com"));
        assert!(sent[0].text.contains("Hello there"));
        assert_eq!(sent[1].to, "ana@example.com");
        assert_eq!(sent[1].subject, "Thanks for your message");
    }

    #[tokio::test]
    async fn test_contact_provider_failure_is_500() {
        let response = app_with_mailer(Arc::new(FailingMailer))
            .oneshot(post_json("/api/contact", contact_body()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "MAIL_ERROR");
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_contact_wrong_field_type_uses_error_envelope() {
        let mailer = Arc::new(RecordingMailer::default());
        let mut body = contact_body();
        body["name"] = json!(5);
        let response = app_with_mailer(mailer.clone())
            .oneshot(post_json("/api/contact", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "invalidRequest");
        assert!(mailer.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_json_uses_error_envelope() {
        let dir = tempfile::tempdir().unwrap();
        let request = Request::builder()
            .method("POST")
            .uri("/api/validate-ai-code")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"code\": "))
            .unwrap();
        let response = app(dir.path()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["code"], "invalidRequest");
    }

    #[tokio::test]
    async fn test_missing_content_type_uses_error_envelope() {
        let dir = tempfile::tempdir().unwrap();
        let request = Request::builder()
            .method("POST")
            .uri("/api/extract-ai-project")
            .body(Body::from(json!({ "code": "x" }).to_string()))
            .unwrap();
        let response = app(dir.path()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "invalidRequest");
    }

    #[tokio::test]
    async fn test_oversized_body_is_413_with_envelope() {
        let dir = tempfile::tempdir().unwrap();
        let code = "a".repeat(2 * 1024 * 1024);
        let response = app(dir.path())
            .oneshot(post_json("/api/extract-ai-project", json!({ "code": code })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body_json(response).await["error"]["code"], "payloadTooLarge");
    }
}

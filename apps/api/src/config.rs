use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use crate::archive::Compression;

const DEFAULT_MAX_BODY_BYTES: usize = 5 * 1024 * 1024;
const DEFAULT_FROM_EMAIL: &str = "Portfolio <onboarding@resend.dev>";

/// Application configuration loaded from environment variables.
/// Fails at startup if a present variable cannot be parsed.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Directory that `project` / `projectFile` names are resolved against.
    pub projects_dir: PathBuf,
    pub max_body_bytes: usize,
    pub zip_compression: Compression,
    pub mail: Option<MailConfig>,
}

/// Settings for the transactional email provider. Absent when no API key is set.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub resend_api_key: String,
    pub to_email: String,
    pub from_email: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            projects_dir: std::env::var("PROJECTS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("projects")),
            max_body_bytes: match std::env::var("MAX_BODY_BYTES") {
                Ok(v) => v
                    .parse::<usize>()
                    .context("MAX_BODY_BYTES must be a positive integer")?,
                Err(_) => DEFAULT_MAX_BODY_BYTES,
            },
            zip_compression: parse_compression(
                &std::env::var("ZIP_COMPRESSION").unwrap_or_else(|_| "deflate".to_string()),
            )?,
            mail: mail_config_from_env()?,
        })
    }
}

fn mail_config_from_env() -> Result<Option<MailConfig>> {
    let api_key = match std::env::var("RESEND_API_KEY") {
        Ok(key) if !key.trim().is_empty() => key,
        _ => return Ok(None),
    };

    Ok(Some(MailConfig {
        resend_api_key: api_key,
        to_email: require_env("CONTACT_TO_EMAIL")?,
        from_email: std::env::var("CONTACT_FROM_EMAIL")
            .unwrap_or_else(|_| DEFAULT_FROM_EMAIL.to_string()),
    }))
}

pub fn parse_compression(value: &str) -> Result<Compression> {
    match value.trim().to_ascii_lowercase().as_str() {
        "deflate" | "deflated" => Ok(Compression::Deflate),
        "stored" | "store" | "none" => Ok(Compression::Stored),
        other => bail!("ZIP_COMPRESSION must be 'deflate' or 'stored', got '{other}'"),
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

mod archive;
mod config;
mod contact;
mod errors;
mod extract;
mod mailer;
mod markers;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::mailer::{Mailer, ResendMailer};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on unparseable env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting bundle API v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Projects directory: {} (zip compression: {:?}, body limit: {} bytes)",
        config.projects_dir.display(),
        config.zip_compression,
        config.max_body_bytes
    );

    // Initialize mail provider
    let mailer: Option<Arc<dyn Mailer>> = match &config.mail {
        Some(mail_config) => {
            let mailer = ResendMailer::new(mail_config).context("Failed to build mail client")?;
            info!("Mail provider initialized (Resend, notifying {})", mail_config.to_email);
            Some(Arc::new(mailer) as Arc<dyn Mailer>)
        }
        None => {
            warn!("RESEND_API_KEY not set; /api/contact will answer 500");
            None
        }
    };

    let state = AppState {
        config: config.clone(),
        mailer,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the portfolio domains are final

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

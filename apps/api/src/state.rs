use std::sync::Arc;

use crate::config::Config;
use crate::mailer::Mailer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Outbound mail provider. `None` when `RESEND_API_KEY` is not set; the contact
    /// endpoint then answers 500 "Email service not configured".
    pub mailer: Option<Arc<dyn Mailer>>,
}

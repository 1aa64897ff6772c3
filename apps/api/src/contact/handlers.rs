use axum::{extract::State, Json};
use serde::Serialize;
use tracing::info;

use crate::contact::messages::{confirmation_body, confirmation_subject, Language, MessageKey};
use crate::contact::validation::{validate_contact, ContactForm, ContactRequest};
use crate::errors::AppError;
use crate::extract::AppJson;
use crate::mailer::OutgoingEmail;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub success: bool,
    pub message: String,
}

/// POST /api/contact
///
/// Validates the form, then sends a notification to the site owner and a
/// confirmation to the sender. Either send failing fails the request.
pub async fn handle_contact(
    State(state): State<AppState>,
    AppJson(request): AppJson<ContactRequest>,
) -> Result<Json<ContactResponse>, AppError> {
    let lang = Language::from_tag(request.language.as_deref());

    let form = validate_contact(&request)
        .map_err(|key| AppError::bad_request(key.code(), key.text(lang)))?;

    let (mailer, mail_config) = match (&state.mailer, &state.config.mail) {
        (Some(mailer), Some(mail_config)) => (mailer, mail_config),
        _ => return Err(AppError::MailNotConfigured),
    };

    let notification = owner_notification(&form, &mail_config.to_email);
    let notification_id = mailer.send(&notification).await?;

    let confirmation = sender_confirmation(&form, lang);
    let confirmation_id = mailer.send(&confirmation).await?;

    info!(
        %notification_id,
        %confirmation_id,
        ?lang,
        "contact message delivered"
    );

    Ok(Json(ContactResponse {
        success: true,
        message: MessageKey::MessageSent.text(lang).to_string(),
    }))
}

fn owner_notification(form: &ContactForm, owner_email: &str) -> OutgoingEmail {
    OutgoingEmail {
        to: owner_email.to_string(),
        subject: format!("New contact message: {}", form.subject),
        text: format!(
            "Name: {}\nEmail: {}\nSubject: {}\n\n{}\n",
            form.name, form.email, form.subject, form.message
        ),
        reply_to: Some(form.email.clone()),
    }
}

fn sender_confirmation(form: &ContactForm, lang: Language) -> OutgoingEmail {
    OutgoingEmail {
        to: form.email.clone(),
        subject: confirmation_subject(lang).to_string(),
        text: confirmation_body(lang, &form.name, &form.subject, &form.message),
        reply_to: None,
    }
}

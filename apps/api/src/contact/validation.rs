use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;

use crate::contact::messages::MessageKey;

/// Contact form body. Fields are optional so that a missing field is reported
/// as `allFieldsRequired` rather than as a JSON rejection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContactRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
    pub language: Option<String>,
}

/// A contact request that passed validation, with surrounding whitespace trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

pub fn validate_contact(req: &ContactRequest) -> Result<ContactForm, MessageKey> {
    let field = |v: &Option<String>| v.as_deref().map(str::trim).unwrap_or_default().to_string();

    let form = ContactForm {
        name: field(&req.name),
        email: field(&req.email),
        subject: field(&req.subject),
        message: field(&req.message),
    };

    if form.name.is_empty()
        || form.email.is_empty()
        || form.subject.is_empty()
        || form.message.is_empty()
    {
        return Err(MessageKey::AllFieldsRequired);
    }

    if !is_valid_email(&form.email) {
        return Err(MessageKey::InvalidEmail);
    }

    Ok(form)
}

static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"))
        .is_match(email)
}

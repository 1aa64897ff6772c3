//! Contact form: field validation, localized replies, two outbound emails per request.

pub mod handlers;
pub mod messages;
pub mod validation;

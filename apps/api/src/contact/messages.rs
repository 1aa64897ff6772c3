#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Language {
    #[default]
    En,
    Es,
}

impl Language {
    /// Parses a language tag such as `es`, `es-MX` or `EN`; unknown tags fall back to English.
    pub fn from_tag(tag: Option<&str>) -> Self {
        let primary = tag
            .unwrap_or_default()
            .split(|c: char| c == '-' || c == '_')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match primary.as_str() {
            "es" => Language::Es,
            _ => Language::En,
        }
    }
}

/// Keys of the messages the contact endpoint returns to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKey {
    AllFieldsRequired,
    InvalidEmail,
    MessageSent,
}

impl MessageKey {
    /// Stable code surfaced in error bodies.
    pub fn code(self) -> &'static str {
        match self {
            MessageKey::AllFieldsRequired => "allFieldsRequired",
            MessageKey::InvalidEmail => "invalidEmail",
            MessageKey::MessageSent => "messageSent",
        }
    }

    pub fn text(self, lang: Language) -> &'static str {
        match (self, lang) {
            (MessageKey::AllFieldsRequired, Language::En) => "All fields are required",
            (MessageKey::AllFieldsRequired, Language::Es) => "Todos los campos son obligatorios",
            (MessageKey::InvalidEmail, Language::En) => "Please enter a valid email address",
            (MessageKey::InvalidEmail, Language::Es) => {
                "Por favor, introduce un correo electrónico válido"
            }
            (MessageKey::MessageSent, Language::En) => {
                "Thanks for reaching out! Your message has been sent."
            }
            (MessageKey::MessageSent, Language::Es) => {
                "¡Gracias por escribir! Tu mensaje ha sido enviado."
            }
        }
    }
}

pub fn confirmation_subject(lang: Language) -> &'static str {
    match lang {
        Language::En => "Thanks for your message",
        Language::Es => "Gracias por tu mensaje",
    }
}

pub fn confirmation_body(lang: Language, name: &str, subject: &str, message: &str) -> String {
    match lang {
        Language::En => format!(
            "Hi {name},\n\nThanks for getting in touch. I received your message about \"{subject}\" and will reply as soon as I can.\n\nYour message:\n{message}\n"
        ),
        Language::Es => format!(
            "Hola {name},\n\nGracias por escribirme. He recibido tu mensaje sobre \"{subject}\" y te responderé lo antes posible.\n\nTu mensaje:\n{message}\n"
        ),
    }
}

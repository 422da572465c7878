//! Outgoing email: delivery transports and localized templates

mod mailer;
mod templates;

pub use mailer::{mailer_from_config, LogMailer, MailError, Mailer, OutgoingEmail, SmtpMailer};
pub use templates::{render_email, EmailTemplate, RenderedEmail, TemplateError, APP_NAME};

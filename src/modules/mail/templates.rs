//! Localized HTML email templates.
//!
//! Templates live in `templates/emails/` and are compiled into the binary.
//! Every body extends `layout.html.jinja`; HTML auto-escaping is always on, so
//! user supplied text (rejection reasons) can be passed as-is.

use minijinja::{AutoEscape, Environment};
use serde::Serialize;
use std::sync::OnceLock;
use thiserror::Error;

use crate::shared::i18n::Locale;

/// Brand name shown in every email
pub const APP_NAME: &str = "Haux Alerte";

static TEMPLATE_ENV: OnceLock<Environment<'static>> = OnceLock::new();

const TEMPLATES: &[(&str, &str)] = &[
    (
        "layout.html.jinja",
        include_str!("../../../templates/emails/layout.html.jinja"),
    ),
    (
        "fr/magic_link.html.jinja",
        include_str!("../../../templates/emails/fr/magic_link.html.jinja"),
    ),
    (
        "en/magic_link.html.jinja",
        include_str!("../../../templates/emails/en/magic_link.html.jinja"),
    ),
    (
        "fr/report_approved.html.jinja",
        include_str!("../../../templates/emails/fr/report_approved.html.jinja"),
    ),
    (
        "en/report_approved.html.jinja",
        include_str!("../../../templates/emails/en/report_approved.html.jinja"),
    ),
    (
        "fr/report_rejected.html.jinja",
        include_str!("../../../templates/emails/fr/report_rejected.html.jinja"),
    ),
    (
        "en/report_rejected.html.jinja",
        include_str!("../../../templates/emails/en/report_rejected.html.jinja"),
    ),
    (
        "fr/new_report.html.jinja",
        include_str!("../../../templates/emails/fr/new_report.html.jinja"),
    ),
    (
        "en/new_report.html.jinja",
        include_str!("../../../templates/emails/en/new_report.html.jinja"),
    ),
];

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template '{0}' not found")]
    NotFound(String),

    #[error("Failed to render template: {0}")]
    RenderError(String),
}

/// Transactional emails sent by the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailTemplate {
    MagicLink,
    ReportApproved,
    ReportRejected,
    NewReport,
}

impl EmailTemplate {
    fn file_stem(self) -> &'static str {
        match self {
            EmailTemplate::MagicLink => "magic_link",
            EmailTemplate::ReportApproved => "report_approved",
            EmailTemplate::ReportRejected => "report_rejected",
            EmailTemplate::NewReport => "new_report",
        }
    }

    pub fn template_name(self, locale: Locale) -> String {
        format!("{}/{}.html.jinja", locale.as_str(), self.file_stem())
    }

    pub fn subject(self, locale: Locale) -> String {
        match (self, locale) {
            (EmailTemplate::MagicLink, Locale::Fr) => {
                format!("Votre lien de connexion à {}", APP_NAME)
            }
            (EmailTemplate::MagicLink, Locale::En) => format!("Your sign-in link for {}", APP_NAME),
            (EmailTemplate::ReportApproved, Locale::Fr) => {
                "Votre signalement a été approuvé !".to_string()
            }
            (EmailTemplate::ReportApproved, Locale::En) => {
                "Your report has been approved!".to_string()
            }
            (EmailTemplate::ReportRejected, Locale::Fr) => {
                "Votre signalement a été rejeté".to_string()
            }
            (EmailTemplate::ReportRejected, Locale::En) => {
                "Your report has been rejected".to_string()
            }
            (EmailTemplate::NewReport, Locale::Fr) => {
                format!("Nouveau signalement sur {}", APP_NAME)
            }
            (EmailTemplate::NewReport, Locale::En) => format!("New report on {}", APP_NAME),
        }
    }
}

/// Subject and HTML body ready to hand to a mailer
#[derive(Debug, Clone)]
pub struct RenderedEmail {
    pub subject: String,
    pub html: String,
}

fn init_environment() -> Environment<'static> {
    let mut env = Environment::new();
    env.set_auto_escape_callback(|_| AutoEscape::Html);
    env.add_global("app_name", APP_NAME);

    for (name, source) in TEMPLATES {
        if let Err(e) = env.add_template(name, source) {
            tracing::warn!("Failed to load email template {}: {}", name, e);
        }
    }

    env
}

fn get_environment() -> &'static Environment<'static> {
    TEMPLATE_ENV.get_or_init(init_environment)
}

#[derive(Serialize)]
struct LocalizedContext<'a, C: Serialize> {
    locale: &'static str,
    #[serde(flatten)]
    inner: &'a C,
}

/// Render one of the application emails in the given locale
pub fn render_email<C: Serialize>(
    template: EmailTemplate,
    locale: Locale,
    ctx: &C,
) -> Result<RenderedEmail, TemplateError> {
    let name = template.template_name(locale);
    let tmpl = get_environment()
        .get_template(&name)
        .map_err(|_| TemplateError::NotFound(name.clone()))?;

    let html = tmpl
        .render(LocalizedContext {
            locale: locale.as_str(),
            inner: ctx,
        })
        .map_err(|e| TemplateError::RenderError(e.to_string()))?;

    Ok(RenderedEmail {
        subject: template.subject(locale),
        html,
    })
}

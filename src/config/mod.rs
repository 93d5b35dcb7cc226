//! Environment-derived configuration, read once at process start.
//!
//! Absence of email/bot credentials degrades those channels to logged no-ops;
//! absence of the admin seed skips seeding. Neither is a startup failure.

use figment::{Figment, providers::Env};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Admin credential seed; both must be set for the seed to run.
    pub admin_email: Option<String>,
    pub admin_pass: Option<String>,

    /// Secret for the private session cookies. When unset, an ephemeral key is
    /// generated at boot and sessions do not survive a restart.
    pub session_secret: Option<String>,

    /// Brevo transactional email credentials.
    pub brevo_api_key: Option<String>,
    pub sender_email: Option<String>,

    /// Telegram bot credentials. Numeric chat ids are common, so the field
    /// tolerates both string and integer env values.
    pub bot_token: Option<String>,
    #[serde(default, deserialize_with = "string_or_int")]
    pub chat_id: Option<String>,

    #[serde(default = "default_database_url")]
    pub database_url: String,

    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,

    #[serde(default = "default_pdf_dir")]
    pub pdf_dir: String,

    #[serde(default = "default_clinic_name")]
    pub clinic_name: String,

    #[serde(default = "default_loglevel")]
    pub loglevel: String,
}

fn string_or_int<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }
    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    }))
}

fn default_database_url() -> String {
    "sqlite:labdesk.db".to_string()
}

fn default_listen_addr() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_upload_dir() -> String {
    "uploads".to_string()
}

fn default_pdf_dir() -> String {
    "pdfs".to_string()
}

fn default_clinic_name() -> String {
    "Labdesk Diagnostics".to_string()
}

fn default_loglevel() -> String {
    "info".to_string()
}

impl Config {
    /// Extract the configuration from the process environment.
    pub fn from_env() -> Result<Self, figment::Error> {
        Figment::new().merge(Env::raw()).extract()
    }

    /// Both Brevo credentials present.
    pub fn email_configured(&self) -> bool {
        self.brevo_api_key.is_some() && self.sender_email.is_some()
    }

    /// Both Telegram credentials present.
    pub fn chat_configured(&self) -> bool {
        self.bot_token.is_some() && self.chat_id.is_some()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            admin_email: None,
            admin_pass: None,
            session_secret: None,
            brevo_api_key: None,
            sender_email: None,
            bot_token: None,
            chat_id: None,
            database_url: default_database_url(),
            listen_addr: default_listen_addr(),
            upload_dir: default_upload_dir(),
            pdf_dir: default_pdf_dir(),
            clinic_name: default_clinic_name(),
            loglevel: default_loglevel(),
        }
    }
}

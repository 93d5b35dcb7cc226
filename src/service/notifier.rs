//! Fire-and-forget outbound notifications.
//!
//! One mpsc channel feeds one worker task; handlers enqueue and return
//! immediately. Failures are logged and dropped. There is no retry, no
//! backoff and no dead-letter anywhere in this pipeline.

use crate::api::brevo::{BrevoApi, OutboundEmail};
use crate::api::telegram::TelegramApi;
use crate::config::Config;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};

#[derive(Debug)]
pub enum NotificationJob {
    Email(OutboundEmail),
    ChatAlert { text: String },
}

/// Cheap, cloneable enqueue side of the notification pipeline.
#[derive(Clone)]
pub struct NotifierHandle {
    tx: mpsc::UnboundedSender<NotificationJob>,
    email_enabled: bool,
    chat_enabled: bool,
}

impl NotifierHandle {
    /// Build the channel pair. Used by [`Notifier::spawn`]; tests use it to
    /// keep the receiver and observe what the handlers enqueue.
    pub fn channel(
        email_enabled: bool,
        chat_enabled: bool,
    ) -> (Self, mpsc::UnboundedReceiver<NotificationJob>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                tx,
                email_enabled,
                chat_enabled,
            },
            rx,
        )
    }

    pub fn email_enabled(&self) -> bool {
        self.email_enabled
    }

    pub fn chat_enabled(&self) -> bool {
        self.chat_enabled
    }

    /// Enqueue one email. Never blocks; a closed worker is logged and ignored.
    pub fn send_email(&self, email: OutboundEmail) {
        if self.tx.send(NotificationJob::Email(email)).is_err() {
            warn!("notification worker gone; dropping email job");
        }
    }

    /// Enqueue one chat alert.
    pub fn send_alert(&self, text: impl Into<String>) {
        let job = NotificationJob::ChatAlert { text: text.into() };
        if self.tx.send(job).is_err() {
            warn!("notification worker gone; dropping chat alert");
        }
    }
}

struct NotifierSettings {
    brevo_api_key: Option<String>,
    sender_email: Option<String>,
    sender_name: String,
    bot_token: Option<String>,
    chat_id: Option<String>,
}

pub struct Notifier;

impl Notifier {
    /// Build the shared HTTP client, spawn the worker and return the handle.
    pub fn spawn(config: &Config) -> NotifierHandle {
        let client = reqwest::Client::builder()
            .user_agent("labdesk-notifier/1.0")
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(15))
            .build()
            .expect("FATAL: initialize notifier HTTP client failed");

        let settings = NotifierSettings {
            brevo_api_key: config.brevo_api_key.clone(),
            sender_email: config.sender_email.clone(),
            sender_name: config.clinic_name.clone(),
            bot_token: config.bot_token.clone(),
            chat_id: config.chat_id.clone(),
        };

        if !config.email_configured() {
            warn!("email credentials not configured; email channel is a no-op");
        }
        if !config.chat_configured() {
            warn!("chat credentials not configured; alert channel is a no-op");
        }

        let (handle, rx) = NotifierHandle::channel(config.email_configured(), config.chat_configured());
        tokio::spawn(worker(client, settings, rx));
        handle
    }
}

async fn worker(
    client: reqwest::Client,
    settings: NotifierSettings,
    mut rx: mpsc::UnboundedReceiver<NotificationJob>,
) {
    info!("notification worker started");
    while let Some(job) = rx.recv().await {
        match job {
            NotificationJob::Email(email) => {
                let (Some(api_key), Some(sender)) =
                    (&settings.brevo_api_key, &settings.sender_email)
                else {
                    info!(to = %email.to, "email channel not configured; dropping message");
                    continue;
                };
                match BrevoApi::send_email(&client, api_key, sender, &settings.sender_name, &email)
                    .await
                {
                    Ok(status) => {
                        info!(to = %email.to, subject = %email.subject, %status, "email submitted")
                    }
                    Err(e) => warn!(to = %email.to, error = %e, "email send failed"),
                }
            }
            NotificationJob::ChatAlert { text } => {
                let (Some(token), Some(chat_id)) = (&settings.bot_token, &settings.chat_id) else {
                    info!("chat channel not configured; dropping alert");
                    continue;
                };
                match TelegramApi::send_message(&client, token, chat_id, &text).await {
                    Ok(status) => info!(%status, "chat alert submitted"),
                    Err(e) => warn!(error = %e, "chat alert failed"),
                }
            }
        }
    }
    info!("notification worker stopped");
}

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::StatusCode;
use serde_json::{Value, json};

const BREVO_SEND_URL: &str = "https://api.brevo.com/v3/smtp/email";

/// One transactional email, ready for the Brevo API.
#[derive(Debug, Clone)]
pub struct OutboundEmail {
    pub to: String,
    pub to_name: String,
    pub subject: String,
    pub html: String,
    pub attachment: Option<EmailAttachment>,
}

#[derive(Debug, Clone)]
pub struct EmailAttachment {
    pub filename: String,
    pub content: Vec<u8>,
}

pub struct BrevoApi;

impl BrevoApi {
    /// Submit one email to the Brevo transactional endpoint. Returns the
    /// upstream status; delivery is not confirmed beyond acceptance.
    pub async fn send_email(
        client: &reqwest::Client,
        api_key: &str,
        sender_email: &str,
        sender_name: &str,
        email: &OutboundEmail,
    ) -> Result<StatusCode, reqwest::Error> {
        let mut payload: Value = json!({
            "sender": { "email": sender_email, "name": sender_name },
            "to": [ { "email": email.to, "name": email.to_name } ],
            "subject": email.subject,
            "htmlContent": email.html,
        });

        if let Some(attachment) = &email.attachment {
            payload["attachment"] = json!([{
                "content": STANDARD.encode(&attachment.content),
                "name": attachment.filename,
            }]);
        }

        let resp = client
            .post(BREVO_SEND_URL)
            .header("accept", "application/json")
            .header("api-key", api_key)
            .json(&payload)
            .send()
            .await?;
        Ok(resp.status())
    }
}

use reqwest::StatusCode;

pub struct TelegramApi;

impl TelegramApi {
    /// Post one plain-text message to the bot's chat. Returns the upstream
    /// status; the bot API's own response body is not inspected.
    pub async fn send_message(
        client: &reqwest::Client,
        bot_token: &str,
        chat_id: &str,
        text: &str,
    ) -> Result<StatusCode, reqwest::Error> {
        let url = format!("https://api.telegram.org/bot{bot_token}/sendMessage");
        let resp = client
            .post(url)
            .form(&[("chat_id", chat_id), ("text", text)])
            .send()
            .await?;
        Ok(resp.status())
    }
}
